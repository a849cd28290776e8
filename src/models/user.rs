//! RFID card holder model and credit adjustments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Vending machine user identified by an RFID tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub rfid_tag: String,
    #[serde(default)]
    pub credits: f64,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for `PUT /users/:id`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateUser {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub rfid_tag: String,
    #[validate(range(min = 0.0))]
    pub credits: f64,
}

impl UpdateUser {
    /// Current user fields with `amount` added to the balance.
    pub fn with_added_credits(user: &User, amount: f64) -> Self {
        Self {
            name: user.name.clone(),
            rfid_tag: user.rfid_tag.clone(),
            credits: user.credits + amount,
        }
    }
}

/// Top-up request body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddCredits {
    #[validate(range(exclusive_min = 0.0))]
    pub amount: f64,
}
