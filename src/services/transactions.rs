//! Paginated transaction history with joined product and user details.

use serde::Serialize;

use crate::client::{ApiClient, OrdersPage};
use crate::config::AnalyticsPolicy;
use crate::errors::AppError;
use crate::models::analytics::{DataQuality, ResolvedOrder};
use crate::models::pagination::{OrdersQuery, PageInfo};
use crate::models::product::Product;
use crate::models::user::User;
use crate::services::analytics;

#[derive(Debug, Clone, Serialize)]
pub struct TransactionPage {
    pub lines: Vec<ResolvedOrder>,
    pub pagination: PageInfo,
    /// Revenue of the orders on this page.
    pub page_revenue: f64,
    pub units_sold: u64,
    pub data_quality: DataQuality,
}

pub fn build_page(page: OrdersPage, products: &[Product], users: &[User]) -> TransactionPage {
    let lines = analytics::resolve_orders(&page.orders, products, users);
    TransactionPage {
        page_revenue: lines.iter().map(ResolvedOrder::revenue).sum(),
        units_sold: lines.iter().map(|l| u64::from(l.quantity)).sum(),
        data_quality: analytics::data_quality(&lines, page.skipped),
        lines,
        pagination: page.pagination,
    }
}

/// Fetch one page of orders. The product and user catalogs are only used to resolve bare ids,
/// so a failure there degrades to unresolved references instead of failing the page.
pub async fn get_page(
    client: &ApiClient,
    query: &OrdersQuery,
    policy: &AnalyticsPolicy,
) -> Result<TransactionPage, AppError> {
    let page = query.current_page();
    let limit = query.limit(policy.orders_page_limit);

    let (orders, products, users) = tokio::join!(
        client.list_orders(page, limit),
        client.list_products(),
        client.list_users(),
    );

    let orders = orders?;
    let products = products.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Product catalog unavailable for transaction join");
        Vec::new()
    });
    let users = users.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "User list unavailable for transaction join");
        Vec::new()
    });

    Ok(build_page(orders, &products, &users))
}
