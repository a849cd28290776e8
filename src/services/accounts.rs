//! User directory and credit management.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::client::ApiClient;
use crate::errors::AppError;
use crate::models::user::{AddCredits, UpdateUser, User};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CreditTier {
    High,
    Medium,
    Low,
}

impl CreditTier {
    pub fn for_balance(credits: f64) -> Self {
        if credits >= 50.0 {
            Self::High
        } else if credits >= 20.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserEntry {
    #[serde(flatten)]
    pub user: User,
    pub credit_tier: CreditTier,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDirectory {
    pub users: Vec<UserEntry>,
    pub total_users: usize,
    pub total_credits: f64,
}

pub fn build_directory(users: Vec<User>) -> UserDirectory {
    let total_credits = users.iter().map(|u| u.credits).sum();
    let total_users = users.len();
    let users = users
        .into_iter()
        .map(|user| UserEntry {
            credit_tier: CreditTier::for_balance(user.credits),
            user,
        })
        .collect();

    UserDirectory {
        users,
        total_users,
        total_credits,
    }
}

pub async fn list(client: &ApiClient) -> Result<UserDirectory, AppError> {
    let users = client.list_users().await?;
    Ok(build_directory(users))
}

/// Validate and forward a user edit.
pub async fn update(client: &ApiClient, id: &str, body: &UpdateUser) -> Result<User, AppError> {
    body.validate()?;
    let user = client.update_user(id, body).await?;
    tracing::info!(user_id = %id, credits = user.credits, "User updated");
    Ok(user)
}

/// Add a positive amount to a user's balance.
pub async fn add_credits(client: &ApiClient, id: &str, body: &AddCredits) -> Result<User, AppError> {
    body.validate()?;

    let users = client.list_users().await?;
    let current = users
        .iter()
        .find(|u| u.id == id)
        .ok_or_else(|| AppError::NotFound(format!("User '{id}' not found")))?;

    let update = UpdateUser::with_added_credits(current, body.amount);
    let user = client.update_user(id, &update).await?;
    tracing::info!(user_id = %id, added = body.amount, credits = user.credits, "Credits added");
    Ok(user)
}
