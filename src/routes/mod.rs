//! Route definitions for the vending dashboard API.

pub mod dashboard;
pub mod health;
pub mod products;
pub mod transactions;
pub mod users;

use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Assemble the full router with CORS, compression, and request tracing.
pub fn router(state: AppState) -> Router {
    let cors = match state.config.frontend_url.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(e) => {
            tracing::warn!(error = %e, "Invalid FRONTEND_URL; allowing any origin");
            CorsLayer::permissive()
        }
    };

    let dashboard_routes = Router::new()
        .route("/dashboard", get(dashboard::overview))
        .route("/dashboard/refresh", post(dashboard::refresh));

    let product_routes = Router::new()
        .route("/products", get(products::list))
        .route("/products/{id}", put(products::update))
        .route("/products/{id}/restock", post(products::restock));

    let user_routes = Router::new()
        .route("/users", get(users::list))
        .route("/users/{id}", put(users::update))
        .route("/users/{id}/credits", post(users::add_credits));

    let transaction_routes = Router::new().route("/transactions", get(transactions::list));

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api/v1", dashboard_routes)
        .nest("/api/v1", product_routes)
        .nest("/api/v1", user_routes)
        .nest("/api/v1", transaction_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        .with_state(state)
}
