//! User directory routes.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::errors::{ApiResponse, AppError};
use crate::models::user::{AddCredits, UpdateUser, User};
use crate::services::accounts::{self, UserDirectory};
use crate::AppState;

/// GET /api/v1/users: users with credit tiers.
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UserDirectory>>, AppError> {
    let directory = accounts::list(&state.client).await?;
    Ok(ApiResponse::success(directory))
}

/// PUT /api/v1/users/:id: edit name, RFID tag, and credits.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateUser>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let user = accounts::update(&state.client, &id, &body).await?;
    Ok(ApiResponse::success(user))
}

/// POST /api/v1/users/:id/credits: top up a balance.
pub async fn add_credits(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AddCredits>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let user = accounts::add_credits(&state.client, &id, &body).await?;
    Ok(ApiResponse::success(user))
}
