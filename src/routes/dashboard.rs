//! Dashboard routes: aggregated statistics for the overview page.

use axum::{
    extract::{Query, State},
    Json,
};

use crate::errors::{ApiResponse, AppError};
use crate::services::dashboard::{self, DashboardQuery, DashboardView};
use crate::services::snapshot::SnapshotMeta;
use crate::AppState;

/// GET /api/v1/dashboard: overview for `range` (today, week, month).
pub async fn overview(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<ApiResponse<DashboardView>>, AppError> {
    let view = dashboard::get_view(&state, &query).await;
    Ok(ApiResponse::success(view))
}

/// POST /api/v1/dashboard/refresh: refetch products, orders, and users.
pub async fn refresh(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SnapshotMeta>>, AppError> {
    let meta = dashboard::refresh(&state).await;
    Ok(ApiResponse::success(meta))
}
