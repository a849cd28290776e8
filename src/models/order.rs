//! Vending order (transaction) model as returned by `GET /orders`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    /// Older firmware reports a completed vend as `success`.
    #[serde(alias = "success")]
    Dispensed,
    Failed,
    #[serde(other)]
    Unknown,
}

/// A reference that the API either populated with the related document or left as a bare id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Reference<T> {
    Populated(T),
    Id(String),
}

impl<T> Reference<T> {
    pub fn populated(&self) -> Option<&T> {
        match self {
            Reference::Populated(doc) => Some(doc),
            Reference::Id(_) => None,
        }
    }
}

/// Product fields embedded in a populated order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub slot_number: Option<i64>,
}

/// User fields embedded in a populated order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserRef {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub rfid_tag: Option<String>,
}

impl Reference<ProductRef> {
    pub fn id(&self) -> Option<&str> {
        match self {
            Reference::Populated(doc) => doc.id.as_deref(),
            Reference::Id(id) => Some(id),
        }
    }
}

impl Reference<UserRef> {
    pub fn id(&self) -> Option<&str> {
        match self {
            Reference::Populated(doc) => doc.id.as_deref(),
            Reference::Id(id) => Some(id),
        }
    }
}

/// Read-only order record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, rename = "userId")]
    pub user: Option<Reference<UserRef>>,
    #[serde(default, rename = "productId")]
    pub product: Option<Reference<ProductRef>>,
    #[serde(default = "default_quantity", deserialize_with = "lenient_quantity")]
    pub quantity: u32,
    pub status: OrderStatus,
    #[serde(default)]
    pub device_response: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn default_quantity() -> u32 {
    1
}

/// Accepts positive integers and numeric strings; anything else counts as a single unit.
fn lenient_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let parsed = match &value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f > 0.0).map(|f| f as u64)),
        serde_json::Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(parsed
        .filter(|q| *q > 0)
        .and_then(|q| u32::try_from(q).ok())
        .unwrap_or_else(default_quantity))
}

/// Decode order records one at a time.
///
/// A record that is not a valid order is logged and skipped so it cannot take the rest of the
/// page down with it. Returns the decoded orders and the number skipped.
pub fn parse_records(records: Vec<serde_json::Value>) -> (Vec<Order>, u64) {
    let mut orders = Vec::with_capacity(records.len());
    let mut skipped = 0;

    for record in records {
        let id = record
            .get("_id")
            .or_else(|| record.get("id"))
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);
        match serde_json::from_value::<Order>(record) {
            Ok(order) => orders.push(order),
            Err(e) => {
                tracing::warn!(order_id = ?id, error = %e, "Skipping malformed order record");
                skipped += 1;
            }
        }
    }

    (orders, skipped)
}
