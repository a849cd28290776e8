//! Pagination primitives for the transactions list.

use serde::{Deserialize, Serialize};

use crate::config::MAX_ORDERS_PAGE_LIMIT;

/// Pagination query parameters accepted by `GET /api/v1/transactions`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrdersQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl OrdersQuery {
    pub fn limit(&self, default_limit: u32) -> u32 {
        self.limit
            .unwrap_or(default_limit)
            .clamp(1, MAX_ORDERS_PAGE_LIMIT)
    }

    pub fn current_page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }
}

/// Pagination block returned by the vending API alongside a page of orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub total_orders: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl PageInfo {
    /// Single-page fallback used when the API omits the pagination block.
    pub fn fallback(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            total_pages: 1,
            total_orders: 0,
            has_next_page: false,
            has_prev_page: false,
        }
    }
}
