//! Business logic services.

pub mod accounts;
pub mod analytics;
pub mod dashboard;
pub mod inventory;
pub mod snapshot;
pub mod transactions;
