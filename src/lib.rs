pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use client::ApiClient;
use services::snapshot::SnapshotStore;

/// Shared application state passed to all Axum handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub client: ApiClient,
    pub config: config::AppConfig,
    pub snapshots: Arc<SnapshotStore>,
}

impl AppState {
    pub fn new(config: config::AppConfig) -> Result<Self, client::ClientError> {
        let client = ApiClient::new(
            config.api_base_url.clone(),
            std::time::Duration::from_secs(config.api_timeout_secs),
        )?;
        Ok(Self {
            client,
            config,
            snapshots: Arc::new(SnapshotStore::new()),
        })
    }
}
