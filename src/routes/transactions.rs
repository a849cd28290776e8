//! Transaction history routes.

use axum::{
    extract::{Query, State},
    Json,
};

use crate::errors::{ApiResponse, AppError};
use crate::models::pagination::OrdersQuery;
use crate::services::transactions::{self, TransactionPage};
use crate::AppState;

/// GET /api/v1/transactions: one page of orders with joined details.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<ApiResponse<TransactionPage>>, AppError> {
    let page = transactions::get_page(&state.client, &query, &state.config.policy).await?;
    Ok(ApiResponse::success(page))
}
