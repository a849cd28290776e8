//! Derived dashboard models. Recomputed from the current snapshot on every refresh.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::order::OrderStatus;

/// Placeholder shown for a product or user an order could not be joined with.
pub const UNRESOLVED_LABEL: &str = "N/A";

/// Outcome of joining an order with a related record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RefStatus {
    Resolved,
    Unresolved,
}

/// Order joined with its product and user at retrieval time.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResolvedOrder {
    pub id: String,
    pub product_name: String,
    pub slot_number: Option<i64>,
    pub unit_price: f64,
    pub user_name: String,
    pub rfid_tag: Option<String>,
    pub quantity: u32,
    pub status: OrderStatus,
    pub device_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub product_ref: RefStatus,
    pub user_ref: RefStatus,
}

impl ResolvedOrder {
    /// `unit_price × quantity` using the product price at retrieval time.
    pub fn revenue(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HourlyBucket {
    pub hour: u32,
    pub hour_label: String,
    pub transaction_count: u64,
    pub revenue_sum: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub date_label: String,
    pub revenue_sum: f64,
    pub transaction_count: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProductSalesEntry {
    pub product_name: String,
    pub units_sold: u64,
    pub revenue_sum: f64,
    /// Set when the entry groups orders whose product could not be resolved.
    pub unresolved_reference: bool,
}

/// Headline figures for the stat cards.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SummaryStats {
    pub total_revenue: f64,
    pub total_transactions: u64,
    pub low_stock_count: u64,
    pub total_products: u64,
    pub today_revenue: f64,
    pub average_order_value: f64,
    pub total_users: u64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct StatusBreakdown {
    pub pending: u64,
    pub dispensed: u64,
    pub failed: u64,
    /// Orders whose status the dashboard does not recognise.
    pub unknown: u64,
    /// Dispensed orders as a percentage of all orders.
    pub success_rate: f64,
}

/// Counts of orders whose references could not be joined.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DataQuality {
    pub unresolved_products: u64,
    pub unresolved_users: u64,
    /// Order records the vending API returned that could not be decoded.
    pub skipped_orders: u64,
}

/// Dashboard time window.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    #[default]
    Today,
    Week,
    Month,
}
