//! Product inventory routes.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::errors::{ApiResponse, AppError};
use crate::models::product::{Product, UpdateProduct};
use crate::services::inventory::{self, InventoryFilters, InventoryView};
use crate::AppState;

/// GET /api/v1/products: inventory with stock indicators.
pub async fn list(
    State(state): State<AppState>,
    Query(filters): Query<InventoryFilters>,
) -> Result<Json<ApiResponse<InventoryView>>, AppError> {
    let view = inventory::list(&state.client, &filters, &state.config.policy).await?;
    Ok(ApiResponse::success(view))
}

/// PUT /api/v1/products/:id: edit name, price, stock, and slot.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateProduct>,
) -> Result<Json<ApiResponse<Product>>, AppError> {
    let product = inventory::update(&state.client, &id, &body, &state.config.policy).await?;
    Ok(ApiResponse::success(product))
}

/// POST /api/v1/products/:id/restock: fill the slot to capacity.
pub async fn restock(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Product>>, AppError> {
    let product = inventory::restock(&state.client, &id, &state.config.policy).await?;
    Ok(ApiResponse::success(product))
}
