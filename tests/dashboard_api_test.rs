//! End-to-end tests: a mock vending API and the dashboard service on random local ports.
//!
//! Run with: `cargo test --test dashboard_api_test`

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode as AxumStatus;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Local, Utc};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use vendash::config::{AnalyticsPolicy, AppConfig};
use vendash::AppState;

/// In-memory stand-in for the vending API collections.
#[derive(Default)]
struct MockData {
    products: Vec<Value>,
    orders: Vec<Value>,
    users: Vec<Value>,
}

type Shared = Arc<Mutex<MockData>>;

/// Midday of the local calendar day, so local-time bucketing cannot cross a day or month edge.
fn local_midday() -> String {
    Local::now()
        .date_naive()
        .and_hms_opt(12, 0, 0)
        .unwrap()
        .and_local_timezone(Local)
        .earliest()
        .unwrap()
        .with_timezone(&Utc)
        .to_rfc3339()
}

fn seed() -> MockData {
    let now = local_midday();
    MockData {
        products: vec![
            json!({"_id": "p1", "name": "Mask (Surgical)", "price": 10, "stock": 2, "slotNumber": 1}),
            json!({"_id": "p2", "name": "Alcohol Spray", "price": 25, "stock": 8, "slotNumber": 2}),
            json!({"_id": "p3", "name": "Wet Wipes", "price": 15, "stock": 10, "slotNumber": 3}),
        ],
        users: vec![
            json!({"_id": "u1", "name": "Juan Dela Cruz", "rfid_tag": "A1B2C3", "credits": 60}),
            json!({"_id": "u2", "name": "Maria Santos", "rfid_tag": "D4E5F6", "credits": 15}),
        ],
        orders: vec![
            json!({
                "_id": "o1",
                "userId": {"_id": "u1", "name": "Juan Dela Cruz", "rfid_tag": "A1B2C3"},
                "productId": {"_id": "p1", "name": "Mask (Surgical)", "price": 10, "slotNumber": 1},
                "quantity": 2, "status": "dispensed", "deviceResponse": "OK", "createdAt": now
            }),
            json!({"_id": "o2", "userId": "u2", "productId": "p2", "quantity": 1,
                   "status": "dispensed", "createdAt": now}),
            json!({
                "_id": "o3",
                "userId": "u1",
                "productId": {"_id": "p3", "name": "Wet Wipes", "price": 15, "slotNumber": 3},
                "quantity": "3", "status": "pending", "createdAt": now
            }),
            json!({"_id": "o4", "userId": null, "productId": null, "status": "failed",
                   "deviceResponse": "Motor jam", "createdAt": now}),
            json!({"_id": "o5", "userId": "u1", "productId": "deleted", "quantity": 1,
                   "status": "dispensed", "createdAt": now}),
        ],
    }
}

async fn mock_products(State(data): State<Shared>) -> Json<Value> {
    let data = data.lock().unwrap();
    Json(json!({"success": true, "data": data.products}))
}

async fn mock_users(State(data): State<Shared>) -> Json<Value> {
    let data = data.lock().unwrap();
    Json(json!({"success": true, "data": data.users}))
}

async fn mock_orders(
    State(data): State<Shared>,
    Query(params): Query<HashMap<String, u32>>,
) -> Json<Value> {
    let data = data.lock().unwrap();
    let page = params.get("page").copied().unwrap_or(1).max(1);
    let limit = params.get("limit").copied().unwrap_or(20).max(1);
    let total = data.orders.len() as u32;
    let total_pages = total.div_ceil(limit).max(1);
    let start = ((page - 1) * limit) as usize;
    let orders: Vec<Value> = data
        .orders
        .iter()
        .skip(start)
        .take(limit as usize)
        .cloned()
        .collect();

    Json(json!({
        "success": true,
        "data": {
            "orders": orders,
            "pagination": {
                "page": page,
                "limit": limit,
                "totalPages": total_pages,
                "totalOrders": total,
                "hasNextPage": page < total_pages,
                "hasPrevPage": page > 1
            }
        }
    }))
}

async fn mock_update_product(
    State(data): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> (AxumStatus, Json<Value>) {
    let mut data = data.lock().unwrap();
    match data.products.iter_mut().find(|p| p["_id"] == id.as_str()) {
        Some(product) => {
            for key in ["name", "price", "stock", "slotNumber"] {
                product[key] = body[key].clone();
            }
            (AxumStatus::OK, Json(json!({"success": true, "data": product.clone()})))
        }
        None => (
            AxumStatus::NOT_FOUND,
            Json(json!({"success": false, "message": "Product not found"})),
        ),
    }
}

async fn mock_update_user(
    State(data): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> (AxumStatus, Json<Value>) {
    let mut data = data.lock().unwrap();
    match data.users.iter_mut().find(|u| u["_id"] == id.as_str()) {
        Some(user) => {
            for key in ["name", "rfid_tag", "credits"] {
                user[key] = body[key].clone();
            }
            user["updatedAt"] = json!(Utc::now().to_rfc3339());
            (AxumStatus::OK, Json(json!({"success": true, "data": user.clone()})))
        }
        None => (
            AxumStatus::NOT_FOUND,
            Json(json!({"success": false, "message": "User not found"})),
        ),
    }
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    addr
}

/// Start the mock vending API, returning its `/api` base URL and shared data.
async fn start_mock_api() -> (String, Shared) {
    let data: Shared = Arc::new(Mutex::new(seed()));
    let api = Router::new()
        .route("/api/products", get(mock_products))
        .route("/api/products/{id}", axum::routing::put(mock_update_product))
        .route("/api/users", get(mock_users))
        .route("/api/users/{id}", axum::routing::put(mock_update_user))
        .route("/api/orders", get(mock_orders))
        .with_state(data.clone());

    let addr = serve(api).await;
    (format!("http://{addr}/api"), data)
}

fn test_config(api_base_url: String) -> AppConfig {
    AppConfig {
        api_base_url,
        api_timeout_secs: 5,
        host: "127.0.0.1".to_string(),
        port: 0,
        frontend_url: "http://localhost:5173".to_string(),
        policy: AnalyticsPolicy {
            // Small pages force the dashboard to walk the order history.
            orders_page_limit: 2,
            ..AnalyticsPolicy::default()
        },
    }
}

/// Start the dashboard service against `api_base_url`.
async fn start_server(api_base_url: String) -> String {
    let state = AppState::new(test_config(api_base_url)).expect("state");
    let addr = serve(vendash::routes::router(state)).await;

    // Wait briefly for server readiness
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    format!("http://{addr}")
}

/// Helper: extract `data` from the API envelope, panic with message on error.
fn extract_data(body: &Value) -> &Value {
    if let Some(err) = body.get("error").filter(|e| !e.is_null()) {
        panic!(
            "API error: {}: {}",
            err["code"].as_str().unwrap_or("?"),
            err["message"].as_str().unwrap_or("?"),
        );
    }
    body.get("data").expect("missing 'data' field")
}

async fn get_json(client: &Client, url: String) -> Value {
    client.get(url).send().await.unwrap().json().await.unwrap()
}

#[tokio::test]
async fn health_probes_report_vending_api() {
    let (api, _data) = start_mock_api().await;
    let base = start_server(api).await;
    let client = Client::new();

    let resp = client.get(format!("{base}/health/live")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let ready = get_json(&client, format!("{base}/health/ready")).await;
    assert_eq!(extract_data(&ready)["vending_api"], "connected");
}

#[tokio::test]
async fn dashboard_aggregates_all_order_pages() {
    let (api, _data) = start_mock_api().await;
    let base = start_server(api).await;
    let client = Client::new();

    let body = get_json(&client, format!("{base}/api/v1/dashboard?range=month")).await;
    let view = extract_data(&body);

    let summary = &view["summary"];
    assert_eq!(summary["total_transactions"], 5);
    assert_eq!(summary["total_revenue"].as_f64().unwrap(), 20.0 + 25.0 + 45.0);
    assert_eq!(summary["average_order_value"].as_f64().unwrap(), 18.0);
    assert_eq!(summary["low_stock_count"], 1);
    assert_eq!(summary["total_products"], 3);
    assert_eq!(summary["total_users"], 2);

    assert_eq!(view["hourly"].as_array().unwrap().len(), 12);
    let daily = view["daily"].as_array().unwrap();
    assert_eq!(daily.len(), 7);
    let daily_revenue: f64 = daily.iter().map(|d| d["revenue_sum"].as_f64().unwrap()).sum();
    assert_eq!(daily_revenue, 90.0);

    assert_eq!(view["data_quality"]["unresolved_products"], 2);
    assert_eq!(view["data_quality"]["unresolved_users"], 1);
    assert_eq!(view["low_stock_items"][0]["name"], "Mask (Surgical)");
    assert_eq!(view["status"]["dispensed"], 3);
    assert_eq!(view["top_products"][0]["product_name"], "Wet Wipes");
    assert_eq!(view["top_products"][0]["units_sold"], 3);
    assert_eq!(view["recent_transactions"].as_array().unwrap().len(), 5);
    assert_eq!(view["snapshot"]["orders"], 5);
    assert!(view["snapshot"]["degraded"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn dashboard_refresh_advances_sequence() {
    let (api, _data) = start_mock_api().await;
    let base = start_server(api).await;
    let client = Client::new();

    let first: Value = client
        .post(format!("{base}/api/v1/dashboard/refresh"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let second: Value = client
        .post(format!("{base}/api/v1/dashboard/refresh"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let first_seq = extract_data(&first)["sequence"].as_u64().unwrap();
    let second_seq = extract_data(&second)["sequence"].as_u64().unwrap();
    assert!(second_seq > first_seq);

    // Every dashboard read fetches again rather than serving a stored snapshot.
    let read = get_json(&client, format!("{base}/api/v1/dashboard")).await;
    assert_eq!(extract_data(&read)["snapshot"]["sequence"].as_u64().unwrap(), second_seq + 1);
}

#[tokio::test]
async fn dashboard_degrades_when_vending_api_is_down() {
    let base = start_server("http://127.0.0.1:9/api".to_string()).await;
    let client = Client::new();

    let body = get_json(&client, format!("{base}/api/v1/dashboard")).await;
    let view = extract_data(&body);

    assert_eq!(view["summary"]["total_transactions"], 0);
    assert_eq!(view["summary"]["average_order_value"].as_f64().unwrap(), 0.0);
    assert_eq!(view["hourly"].as_array().unwrap().len(), 12);
    assert_eq!(view["daily"].as_array().unwrap().len(), 7);
    assert_eq!(
        view["snapshot"]["degraded"],
        json!(["products", "orders", "users"])
    );

    let products = client.get(format!("{base}/api/v1/products")).send().await.unwrap();
    assert_eq!(products.status(), StatusCode::BAD_GATEWAY);
    let body: Value = products.json().await.unwrap();
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn product_edit_and_restock() {
    let (api, data) = start_mock_api().await;
    let base = start_server(api).await;
    let client = Client::new();

    let list = get_json(&client, format!("{base}/api/v1/products?search=mask")).await;
    let inventory = extract_data(&list);
    assert_eq!(inventory["items"].as_array().unwrap().len(), 1);
    assert_eq!(inventory["items"][0]["stock_level"], "low");
    assert_eq!(inventory["total_stock_value"].as_f64().unwrap(), 20.0 + 200.0 + 150.0);

    // Above slot capacity
    let resp = client
        .put(format!("{base}/api/v1/products/p2"))
        .json(&json!({"name": "Alcohol Spray", "price": 25, "stock": 11, "slotNumber": 2}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let resp: Value = client
        .put(format!("{base}/api/v1/products/p2"))
        .json(&json!({"name": "Alcohol Spray", "price": 30, "stock": 6, "slotNumber": 2}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(extract_data(&resp)["price"].as_f64().unwrap(), 30.0);

    let resp: Value = client
        .post(format!("{base}/api/v1/products/p1/restock"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(extract_data(&resp)["stock"], 10);
    assert_eq!(data.lock().unwrap().products[0]["stock"], 10);

    let missing = client
        .post(format!("{base}/api/v1/products/nope/restock"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let upstream_missing = client
        .put(format!("{base}/api/v1/products/nope"))
        .json(&json!({"name": "Ghost", "price": 1, "stock": 1, "slotNumber": 9}))
        .send()
        .await
        .unwrap();
    assert_eq!(upstream_missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn user_credits_and_validation() {
    let (api, _data) = start_mock_api().await;
    let base = start_server(api).await;
    let client = Client::new();

    let list = get_json(&client, format!("{base}/api/v1/users")).await;
    let directory = extract_data(&list);
    assert_eq!(directory["total_credits"].as_f64().unwrap(), 75.0);
    assert_eq!(directory["users"][0]["credit_tier"], "high");
    assert_eq!(directory["users"][1]["credit_tier"], "low");

    let resp: Value = client
        .post(format!("{base}/api/v1/users/u2/credits"))
        .json(&json!({"amount": 10}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(extract_data(&resp)["credits"].as_f64().unwrap(), 25.0);

    let rejected = client
        .post(format!("{base}/api/v1/users/u2/credits"))
        .json(&json!({"amount": 0}))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);

    let negative = client
        .put(format!("{base}/api/v1/users/u1"))
        .json(&json!({"name": "Juan Dela Cruz", "rfid_tag": "A1B2C3", "credits": -1}))
        .send()
        .await
        .unwrap();
    assert_eq!(negative.status(), StatusCode::BAD_REQUEST);

    let unknown = client
        .post(format!("{base}/api/v1/users/ghost/credits"))
        .json(&json!({"amount": 5}))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn transactions_page_joins_references() {
    let (api, _data) = start_mock_api().await;
    let base = start_server(api).await;
    let client = Client::new();

    let body = get_json(&client, format!("{base}/api/v1/transactions?page=2&limit=2")).await;
    let page = extract_data(&body);

    let lines = page["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["id"], "o3");
    assert_eq!(lines[0]["quantity"], 3);
    assert_eq!(lines[0]["user_name"], "Juan Dela Cruz");
    assert_eq!(lines[1]["product_name"], "N/A");
    assert_eq!(lines[1]["product_ref"], "unresolved");
    assert_eq!(lines[1]["quantity"], 1);
    assert_eq!(page["page_revenue"].as_f64().unwrap(), 45.0);
    assert_eq!(page["units_sold"], 4);
    assert_eq!(page["pagination"]["totalOrders"], 5);
    assert_eq!(page["pagination"]["hasNextPage"], true);
}

#[tokio::test]
async fn dashboard_reflects_restock_immediately() {
    let (api, _data) = start_mock_api().await;
    let base = start_server(api).await;
    let client = Client::new();

    let before = get_json(&client, format!("{base}/api/v1/dashboard")).await;
    assert_eq!(extract_data(&before)["summary"]["low_stock_count"], 1);

    let resp = client
        .post(format!("{base}/api/v1/products/p1/restock"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let after = get_json(&client, format!("{base}/api/v1/dashboard?range=week")).await;
    let view = extract_data(&after);
    assert_eq!(view["summary"]["low_stock_count"], 0);
    assert!(view["low_stock_items"].as_array().unwrap().is_empty());
    assert!(
        view["snapshot"]["sequence"].as_u64().unwrap()
            > extract_data(&before)["snapshot"]["sequence"].as_u64().unwrap()
    );
}

#[tokio::test]
async fn dashboard_keeps_history_around_malformed_orders() {
    let (api, data) = start_mock_api().await;
    {
        let mut data = data.lock().unwrap();
        let now = local_midday();
        data.orders.push(json!({"_id": "o6", "userId": "u2", "productId": "p2", "quantity": 1,
                                "status": "success", "createdAt": now}));
        data.orders.push(json!({"_id": "o7", "userId": "u2", "productId": "p2", "status": "dispensed"}));
    }
    let base = start_server(api).await;
    let client = Client::new();

    let body = get_json(&client, format!("{base}/api/v1/dashboard?range=month")).await;
    let view = extract_data(&body);

    assert_eq!(view["summary"]["total_transactions"], 6);
    assert_eq!(view["summary"]["total_revenue"].as_f64().unwrap(), 90.0 + 25.0);
    assert_eq!(view["status"]["dispensed"], 4);
    assert_eq!(view["data_quality"]["skipped_orders"], 1);
    assert!(view["snapshot"]["degraded"].as_array().unwrap().is_empty());
}
