//! Dashboard overview assembled from the latest snapshot.

use chrono::{Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::config::AnalyticsPolicy;
use crate::models::analytics::{
    DailyBucket, DataQuality, HourlyBucket, ProductSalesEntry, ResolvedOrder, StatusBreakdown,
    SummaryStats, TimeRange,
};
use crate::services::analytics;
use crate::services::snapshot::{Snapshot, SnapshotMeta};
use crate::AppState;

/// Number of newest transactions listed on the overview.
const RECENT_TRANSACTIONS: usize = 5;

/// Query parameters for the overview.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub range: TimeRange,
}

/// Product flagged for replenishment.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LowStockItem {
    pub id: String,
    pub name: String,
    pub stock: i64,
    pub slot_number: i64,
}

/// Everything the overview page renders.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub range: TimeRange,
    pub summary: SummaryStats,
    pub hourly: Vec<HourlyBucket>,
    pub daily: Vec<DailyBucket>,
    pub top_products: Vec<ProductSalesEntry>,
    pub status: StatusBreakdown,
    pub peak_hour: Option<HourlyBucket>,
    pub low_stock_items: Vec<LowStockItem>,
    pub recent_transactions: Vec<ResolvedOrder>,
    pub data_quality: DataQuality,
    pub snapshot: SnapshotMeta,
}

/// Build the overview from a snapshot.
///
/// The summary covers every fetched order; hourly, top products, status, and peak hour use
/// orders inside `range`; the daily series always covers the configured window.
pub fn build_view<Tz: TimeZone>(
    snapshot: &Snapshot,
    policy: &AnalyticsPolicy,
    range: TimeRange,
    today: NaiveDate,
    tz: &Tz,
) -> DashboardView {
    let resolved = analytics::resolve_orders(&snapshot.orders, &snapshot.products, &snapshot.users);
    let in_range = analytics::filter_by_range(&resolved, range, today, tz);
    let hourly = analytics::bucket_by_hour(&in_range, policy.hour_range, tz);

    let low_stock_items = snapshot
        .products
        .iter()
        .filter(|p| analytics::is_low_stock(p.stock, policy.low_stock_threshold))
        .map(|p| LowStockItem {
            id: p.id.clone(),
            name: p.name.clone(),
            stock: p.stock,
            slot_number: p.slot_number,
        })
        .collect();

    DashboardView {
        range,
        summary: analytics::summarize(
            &snapshot.products,
            &resolved,
            &snapshot.users,
            policy.low_stock_threshold,
            today,
            tz,
        ),
        peak_hour: analytics::peak_hour(&hourly),
        hourly,
        daily: analytics::bucket_by_day(&resolved, policy.daily_window_days, today, tz),
        top_products: analytics::top_products_by_sales(&in_range, policy.top_products_limit),
        status: analytics::status_breakdown(&in_range),
        low_stock_items,
        recent_transactions: analytics::recent_orders(&resolved, RECENT_TRANSACTIONS),
        data_quality: analytics::data_quality(&resolved, snapshot.skipped_orders),
        snapshot: snapshot.meta(),
    }
}

/// Overview in the process-local time zone, computed from a fresh fetch of the vending API.
pub async fn get_view(state: &AppState, query: &DashboardQuery) -> DashboardView {
    let policy = &state.config.policy;
    let snapshot = state.snapshots.refresh(&state.client, policy).await;

    let today = Local::now().date_naive();
    build_view(&snapshot, policy, query.range, today, &Local)
}

/// Force a refresh and report what was fetched.
pub async fn refresh(state: &AppState) -> SnapshotMeta {
    state
        .snapshots
        .refresh(&state.client, &state.config.policy)
        .await
        .meta()
}
