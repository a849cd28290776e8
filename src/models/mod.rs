//! Wire models for the vending API and derived dashboard models.

pub mod analytics;
pub mod envelope;
pub mod order;
pub mod pagination;
pub mod product;
pub mod user;
