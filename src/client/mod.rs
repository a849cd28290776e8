//! HTTP client for the vending machine REST API.

mod error;

pub use error::{ClientError, ClientResult};

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::models::envelope::{UpstreamEnvelope, UpstreamErrorBody};
use crate::models::order::{self, Order};
use crate::models::pagination::PageInfo;
use crate::models::product::{Product, UpdateProduct};
use crate::models::user::{UpdateUser, User};

/// One page of orders with its pagination block.
#[derive(Debug, Clone)]
pub struct OrdersPage {
    pub orders: Vec<Order>,
    pub pagination: PageInfo,
    /// Records on this page that could not be decoded.
    pub skipped: u64,
}

/// Every order page that could be read.
#[derive(Debug, Clone, Default)]
pub struct OrderHistory {
    pub orders: Vec<Order>,
    pub skipped: u64,
    /// Set when a page after the first failed and the walk stopped early.
    pub partial: bool,
}

#[derive(Debug, Deserialize)]
struct OrdersData {
    #[serde(default)]
    orders: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pagination: Option<PageInfo>,
}

/// Client for the vending API (`/products`, `/orders`, `/users`).
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<UpstreamEnvelope<T>> {
        tracing::debug!(path, "GET vending API");
        let response = self.client.get(self.url(path)).send().await?;
        Self::handle_response(response).await
    }

    async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<UpstreamEnvelope<T>> {
        tracing::debug!(path, "PUT vending API");
        let response = self.client.put(self.url(path)).json(body).send().await?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        response: Response,
    ) -> ClientResult<UpstreamEnvelope<T>> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            let message = serde_json::from_str::<UpstreamErrorBody>(&text)
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| {
                    if text.is_empty() {
                        status.canonical_reason().unwrap_or("error").to_string()
                    } else {
                        text
                    }
                });
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response.json().await.map_err(Into::into)
    }

    /// Unwrap `data` from a successful envelope.
    fn into_data<T>(envelope: UpstreamEnvelope<T>, action: &str) -> ClientResult<T> {
        if !envelope.success {
            return Err(ClientError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| format!("Failed to {action}")),
            ));
        }
        envelope.data.ok_or(ClientError::MissingData)
    }

    /// `GET /products`
    pub async fn list_products(&self) -> ClientResult<Vec<Product>> {
        let envelope = self.get("/products").await?;
        Self::into_data(envelope, "fetch products")
    }

    /// `GET /users`
    pub async fn list_users(&self) -> ClientResult<Vec<User>> {
        let envelope = self.get("/users").await?;
        Self::into_data(envelope, "fetch users")
    }

    /// `GET /orders?page=&limit=`
    pub async fn list_orders(&self, page: u32, limit: u32) -> ClientResult<OrdersPage> {
        let envelope = self
            .get::<OrdersData>(&format!("/orders?page={page}&limit={limit}"))
            .await?;
        let data = Self::into_data(envelope, "fetch orders")?;
        let (orders, skipped) = order::parse_records(data.orders.unwrap_or_default());
        Ok(OrdersPage {
            orders,
            pagination: data
                .pagination
                .unwrap_or_else(|| PageInfo::fallback(page, limit)),
            skipped,
        })
    }

    /// Walk order pages from the first until the API reports no next page or `max_pages` is hit.
    ///
    /// Only a failure on the first page is an error. A later failure keeps what was read and
    /// marks the history partial.
    pub async fn list_all_orders(&self, page_limit: u32, max_pages: u32) -> ClientResult<OrderHistory> {
        let mut history = OrderHistory::default();
        let mut page = 1;

        loop {
            let batch = match self.list_orders(page, page_limit).await {
                Ok(batch) => batch,
                Err(e) if page > 1 => {
                    tracing::warn!(page, error = %e, "Order page failed; keeping earlier pages");
                    history.partial = true;
                    break;
                }
                Err(e) => return Err(e),
            };
            history.orders.extend(batch.orders);
            history.skipped += batch.skipped;

            if !batch.pagination.has_next_page {
                break;
            }
            if page >= max_pages {
                tracing::warn!(
                    max_pages,
                    total_orders = batch.pagination.total_orders,
                    "Order history truncated at page cap"
                );
                break;
            }
            page += 1;
        }

        Ok(history)
    }

    /// `PUT /products/:id`
    pub async fn update_product(&self, id: &str, body: &UpdateProduct) -> ClientResult<Product> {
        let envelope = self.put(&format!("/products/{id}"), body).await?;
        Self::into_data(envelope, "update product")
    }

    /// `PUT /users/:id`
    pub async fn update_user(&self, id: &str, body: &UpdateUser) -> ClientResult<User> {
        let envelope = self.put(&format!("/users/{id}"), body).await?;
        Self::into_data(envelope, "update user")
    }

    /// Cheap reachability check against the product catalog.
    pub async fn ping(&self) -> ClientResult<()> {
        let response = self.client.get(self.url("/products")).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ClientError::Status {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("error").to_string(),
            })
        }
    }
}
