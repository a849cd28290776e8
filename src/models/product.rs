//! Vending slot product model and edit payloads.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Product loaded into a vending slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub slot_number: i64,
}

/// Full replacement payload for `PUT /products/:id`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(range(min = 0))]
    pub stock: i64,
    #[validate(range(min = 1))]
    pub slot_number: i64,
}

impl UpdateProduct {
    /// Copy of the product's current fields with the stock replaced.
    pub fn restocked(product: &Product, stock: i64) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price,
            stock,
            slot_number: product.slot_number,
        }
    }
}
