//! Product inventory listing, edits, and restocking.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::client::ApiClient;
use crate::config::AnalyticsPolicy;
use crate::errors::AppError;
use crate::models::product::{Product, UpdateProduct};
use crate::services::analytics;

/// Filters for the product list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryFilters {
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    Low,
    InStock,
    Full,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryItem {
    #[serde(flatten)]
    pub product: Product,
    pub low_stock: bool,
    pub stock_level: StockLevel,
    /// Slot fill, 0-100.
    pub fill_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryView {
    pub items: Vec<InventoryItem>,
    pub total_products: usize,
    pub low_stock_count: usize,
    pub total_stock_value: f64,
}

/// Decorate products with stock indicators. Totals cover every product, not only matches.
pub fn build_view(
    products: &[Product],
    filters: &InventoryFilters,
    policy: &AnalyticsPolicy,
) -> InventoryView {
    let needle = filters
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let items = products
        .iter()
        .filter(|p| match &needle {
            Some(needle) => p.name.to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .map(|p| InventoryItem {
            product: p.clone(),
            low_stock: analytics::is_low_stock(p.stock, policy.low_stock_threshold),
            stock_level: stock_level(p.stock, policy),
            fill_percent: fill_percent(p.stock, policy.stock_capacity_max),
        })
        .collect();

    InventoryView {
        items,
        total_products: products.len(),
        low_stock_count: products
            .iter()
            .filter(|p| analytics::is_low_stock(p.stock, policy.low_stock_threshold))
            .count(),
        total_stock_value: products.iter().map(|p| p.stock as f64 * p.price).sum(),
    }
}

fn stock_level(stock: i64, policy: &AnalyticsPolicy) -> StockLevel {
    if analytics::is_low_stock(stock, policy.low_stock_threshold) {
        StockLevel::Low
    } else if stock >= policy.stock_capacity_max {
        StockLevel::Full
    } else {
        StockLevel::InStock
    }
}

fn fill_percent(stock: i64, capacity: i64) -> f64 {
    if capacity <= 0 {
        return 0.0;
    }
    (stock as f64 / capacity as f64 * 100.0).clamp(0.0, 100.0)
}

/// Reject stock values the slot cannot physically hold.
pub fn check_capacity(stock: i64, policy: &AnalyticsPolicy) -> Result<(), AppError> {
    if stock > policy.stock_capacity_max {
        return Err(AppError::Validation(format!(
            "stock {stock} exceeds slot capacity {}",
            policy.stock_capacity_max
        )));
    }
    Ok(())
}

/// List products from the vending API.
pub async fn list(
    client: &ApiClient,
    filters: &InventoryFilters,
    policy: &AnalyticsPolicy,
) -> Result<InventoryView, AppError> {
    let products = client.list_products().await?;
    Ok(build_view(&products, filters, policy))
}

/// Validate and forward a product edit.
pub async fn update(
    client: &ApiClient,
    id: &str,
    body: &UpdateProduct,
    policy: &AnalyticsPolicy,
) -> Result<Product, AppError> {
    body.validate()?;
    check_capacity(body.stock, policy)?;

    let product = client.update_product(id, body).await?;
    tracing::info!(product_id = %id, stock = product.stock, "Product updated");
    Ok(product)
}

/// Fill a slot to capacity.
pub async fn restock(
    client: &ApiClient,
    id: &str,
    policy: &AnalyticsPolicy,
) -> Result<Product, AppError> {
    let products = client.list_products().await?;
    let current = products
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Product '{id}' not found")))?;

    let body = UpdateProduct::restocked(current, policy.stock_capacity_max);
    let product = client.update_product(id, &body).await?;
    tracing::info!(product_id = %id, stock = product.stock, "Product restocked");
    Ok(product)
}
