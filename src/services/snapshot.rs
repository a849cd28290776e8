//! Fetch-all of products, orders, and users, guarded against stale overwrites.
//!
//! Each refresh takes a ticket from a monotonic sequence. A snapshot is only stored when its
//! ticket is still the latest one issued, so a slow refresh can never replace the result of a
//! refresh that started after it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::client::{ApiClient, ClientResult, OrderHistory};
use crate::config::AnalyticsPolicy;
use crate::models::order::Order;
use crate::models::product::Product;
use crate::models::user::User;

/// Raw lists fetched together in one refresh.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub sequence: u64,
    pub fetched_at: DateTime<Utc>,
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    pub users: Vec<User>,
    /// Order records dropped because they could not be decoded.
    pub skipped_orders: u64,
    /// Sources whose fetch failed and were replaced by an empty list. `orders(partial)` means
    /// the order walk stopped after a later page failed.
    pub degraded: Vec<String>,
}

impl Snapshot {
    pub fn meta(&self) -> SnapshotMeta {
        SnapshotMeta {
            sequence: self.sequence,
            fetched_at: self.fetched_at,
            products: self.products.len(),
            orders: self.orders.len(),
            users: self.users.len(),
            degraded: self.degraded.clone(),
        }
    }
}

/// Snapshot summary attached to dashboard responses.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SnapshotMeta {
    pub sequence: u64,
    pub fetched_at: DateTime<Utc>,
    pub products: usize,
    pub orders: usize,
    pub users: usize,
    pub degraded: Vec<String>,
}

/// Monotonic refresh ticket source.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    /// Issue the next ticket. Tickets start at 1.
    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    pub fn is_latest(&self, ticket: u64) -> bool {
        self.latest() == ticket
    }
}

/// Latest accepted snapshot shared across requests.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    sequencer: RequestSequencer,
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a refresh and return its ticket.
    pub fn begin(&self) -> u64 {
        self.sequencer.issue()
    }

    /// Store `snapshot` if `ticket` is still the latest issued. Returns whether it was accepted.
    pub async fn commit(&self, ticket: u64, mut snapshot: Snapshot) -> bool {
        let mut current = self.current.write().await;
        if !self.sequencer.is_latest(ticket) {
            tracing::debug!(
                sequence = ticket,
                latest = self.sequencer.latest(),
                "Discarding stale snapshot"
            );
            return false;
        }
        snapshot.sequence = ticket;
        *current = Some(Arc::new(snapshot));
        true
    }

    pub async fn latest(&self) -> Option<Arc<Snapshot>> {
        self.current.read().await.clone()
    }

    /// Fetch a fresh snapshot, commit it, and return the newest accepted one.
    ///
    /// Every dashboard read goes through here, so figures always reflect the vending API at
    /// request time; the stored snapshot only arbitrates between overlapping refreshes.
    ///
    /// When a newer refresh was issued while this one was in flight, the newer result is
    /// returned if it has already landed; otherwise this refresh's own data is returned without
    /// being stored.
    pub async fn refresh(&self, client: &ApiClient, policy: &AnalyticsPolicy) -> Arc<Snapshot> {
        let ticket = self.begin();
        let mut snapshot = fetch_snapshot(client, policy).await;

        snapshot.sequence = ticket;
        if self.commit(ticket, snapshot.clone()).await {
            tracing::info!(
                sequence = ticket,
                products = snapshot.products.len(),
                orders = snapshot.orders.len(),
                users = snapshot.users.len(),
                "Snapshot refreshed"
            );
        }

        match self.latest().await {
            Some(latest) if latest.sequence >= ticket => latest,
            _ => Arc::new(snapshot),
        }
    }

}

/// Fetch products, all orders, and users concurrently.
///
/// A failed source degrades to an empty list and is recorded in `degraded`; it never blocks
/// the other two.
pub async fn fetch_snapshot(client: &ApiClient, policy: &AnalyticsPolicy) -> Snapshot {
    let (products, orders, users) = tokio::join!(
        client.list_products(),
        client.list_all_orders(policy.orders_page_limit, policy.orders_fetch_max_pages),
        client.list_users(),
    );

    let mut degraded = Vec::new();
    let products = or_degraded("products", products, &mut degraded);
    let history: OrderHistory = or_degraded("orders", orders, &mut degraded);
    if history.partial {
        degraded.push("orders(partial)".to_string());
    }
    let users = or_degraded("users", users, &mut degraded);

    Snapshot {
        sequence: 0,
        fetched_at: Utc::now(),
        products,
        orders: history.orders,
        users,
        skipped_orders: history.skipped,
        degraded,
    }
}

fn or_degraded<T: Default>(source: &str, result: ClientResult<T>, degraded: &mut Vec<String>) -> T {
    match result {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(source, error = %e, "Fetch failed; continuing with empty list");
            degraded.push(source.to_string());
            T::default()
        }
    }
}
