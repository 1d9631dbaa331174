use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::*;

const TEST_KEY: &str = "test-admin-key";

fn app_with(auth: AuthState, rate_limit: RateLimitState) -> Router {
    let catalog = Catalog::seed().expect("seed catalog");
    build_app(AppState::new(catalog), auth, rate_limit)
}

fn app() -> Router {
    app_with(
        AuthState::from_keys(TEST_KEY, false).expect("auth"),
        RateLimitState::new(120, Duration::from_secs(60)),
    )
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn admin(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {TEST_KEY}"));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn ids(items: &Value) -> Vec<String> {
    items
        .as_array()
        .expect("array")
        .iter()
        .map(|p| p["id"].as_str().expect("id").to_string())
        .collect()
}

fn draft_body() -> Value {
    json!({
        "name": "Bamboo Cutting Board",
        "description": "Sturdy bamboo board with a juice groove.",
        "price": "34.50",
        "category": "Kitchen",
        "stock": 8
    })
}

// -------------------------------------------------------------------------
// Helpers
// -------------------------------------------------------------------------

#[test]
fn normalize_limit_applies_defaults_and_bounds() {
    assert_eq!(normalize_limit(None), 50);
    assert_eq!(normalize_limit(Some(0)), 1);
    assert_eq!(normalize_limit(Some(1_000)), 200);
    assert_eq!(normalize_limit(Some(25)), 25);
}

#[test]
fn api_error_validation_error_maps_to_bad_request() {
    let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn map_catalog_error_picks_codes() {
    let not_found = map_catalog_error("r".into(), &CatalogError::NotFound("9".into()));
    assert_eq!(not_found.error.code, "not_found");

    let duplicate = map_catalog_error("r".into(), &CatalogError::DuplicateId("9".into()));
    assert_eq!(duplicate.error.code, "conflict");

    let invalid = map_catalog_error(
        "r".into(),
        &CatalogError::Validation {
            field: "name",
            reason: "product name is required".into(),
        },
    );
    assert_eq!(invalid.error.code, "validation_error");
    assert!(invalid.error.message.contains("product name is required"));
}

// -------------------------------------------------------------------------
// Public routes
// -------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_product_count() {
    let (status, json) = send(&app(), get("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["products"], 12);
    assert!(json["meta"]["request_id"].is_string());
}

#[tokio::test]
async fn request_id_header_is_echoed() {
    let request = Request::builder()
        .uri("/api/v1/health")
        .header("x-request-id", "req-abc")
        .body(Body::empty())
        .expect("request");
    let response = app().oneshot(request).await.expect("response");
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("req-abc")
    );
}

#[tokio::test]
async fn list_products_without_params_returns_whole_catalog() {
    let (status, json) = send(&app(), get("/api/v1/products")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total"], 12);
    assert_eq!(
        ids(&json["data"]["items"]),
        (1..=12).map(|n| n.to_string()).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn list_products_filters_by_category_case_insensitively() {
    let (_, json) = send(&app(), get("/api/v1/products?category=electronics")).await;
    assert_eq!(ids(&json["data"]["items"]), vec!["1", "5"]);
}

#[tokio::test]
async fn list_products_sorts_by_price() {
    let (_, json) = send(&app(), get("/api/v1/products?sort=price-asc")).await;
    let items = &json["data"]["items"];
    assert_eq!(items[0]["name"], "Handcrafted Ceramic Mug");
    assert_eq!(items[0]["price"], "24.99");
    assert_eq!(items[11]["name"], "Wireless Bluetooth Headphones");
}

#[tokio::test]
async fn list_products_unknown_sort_keeps_catalog_order() {
    let (status, json) = send(&app(), get("/api/v1/products?sort=bestselling")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json["data"]["items"])[..3], ["1", "2", "3"]);
}

#[tokio::test]
async fn list_products_combines_search_price_and_flags() {
    let (_, json) = send(
        &app(),
        get("/api/v1/products?search=bluetooth&max_price=100&in_stock=true&featured=true"),
    )
    .await;
    assert_eq!(ids(&json["data"]["items"]), vec!["5"]);
}

#[tokio::test]
async fn list_products_inverted_price_range_is_empty_not_error() {
    let (status, json) = send(&app(), get("/api/v1/products?min_price=100&max_price=10")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total"], 0);
    assert!(json["data"]["items"].as_array().expect("items").is_empty());
}

#[tokio::test]
async fn list_products_limit_truncates_items_but_not_total() {
    let (_, json) = send(&app(), get("/api/v1/products?limit=2")).await;
    assert_eq!(json["data"]["total"], 12);
    assert_eq!(ids(&json["data"]["items"]), vec!["1", "2"]);
}

#[tokio::test]
async fn list_products_rejects_malformed_price() {
    let (status, _) = send(&app(), get("/api/v1/products?min_price=cheap")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn featured_products_in_catalog_order() {
    let (_, json) = send(&app(), get("/api/v1/products/featured")).await;
    assert_eq!(ids(&json["data"]), vec!["1", "2", "5", "9", "11"]);
}

#[tokio::test]
async fn product_detail_includes_stock_status_and_related() {
    let (status, json) = send(&app(), get("/api/v1/products/10")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["product"]["name"], "Smart LED Desk Lamp");
    assert_eq!(json["data"]["stock_status"]["status"], "in_stock");
    assert_eq!(ids(&json["data"]["related"]), vec!["11", "12"]);
}

#[tokio::test]
async fn product_detail_unknown_id_is_not_found() {
    let (status, json) = send(&app(), get("/api/v1/products/404")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn categories_list_counts_in_first_seen_order() {
    let (_, json) = send(&app(), get("/api/v1/categories")).await;
    assert_eq!(
        json["data"],
        json!([
            { "name": "Electronics", "count": 2 },
            { "name": "Fitness", "count": 2 },
            { "name": "Clothing", "count": 2 },
            { "name": "Kitchen", "count": 2 },
            { "name": "Accessories", "count": 1 },
            { "name": "Home", "count": 3 }
        ])
    );
}

#[tokio::test]
async fn category_products_match_name_case_insensitively() {
    let (status, json) = send(&app(), get("/api/v1/categories/HOME/products")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json["data"]), vec!["10", "11", "12"]);
}

#[tokio::test]
async fn category_products_unknown_category_is_empty() {
    let (status, json) = send(&app(), get("/api/v1/categories/Garden/products")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["data"].as_array().expect("data").is_empty());
}

// -------------------------------------------------------------------------
// Admin routes
// -------------------------------------------------------------------------

#[tokio::test]
async fn admin_requires_bearer_token() {
    let (status, json) = send(&app(), get("/api/v1/admin/products")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn admin_rejects_wrong_token() {
    let request = Request::builder()
        .uri("/api/v1/admin/products")
        .header(header::AUTHORIZATION, "Bearer not-the-key")
        .body(Body::empty())
        .expect("request");
    let (status, _) = send(&app(), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_open_when_auth_disabled() {
    let app = app_with(
        AuthState::from_keys("", true).expect("auth"),
        RateLimitState::new(120, Duration::from_secs(60)),
    );
    let (status, _) = send(&app, get("/api/v1/admin/products")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_list_is_ordered_by_name() {
    let (status, json) = send(&app(), admin("GET", "/api/v1/admin/products", None)).await;
    assert_eq!(status, StatusCode::OK);
    let items = json["data"].as_array().expect("items");
    assert_eq!(items.len(), 12);
    assert_eq!(items[0]["name"], "Handcrafted Ceramic Mug");
    assert_eq!(items[11]["name"], "Yoga Mat");
}

#[tokio::test]
async fn admin_create_then_public_read() {
    let app = app();
    let (status, json) = send(
        &app,
        admin("POST", "/api/v1/admin/products", Some(draft_body())),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = json["data"]["id"].as_str().expect("id").to_string();
    assert_eq!(json["data"]["price"], "34.50");
    assert_eq!(json["data"]["reviews"], 0);
    assert!(json["data"].get("updated_at").is_none());

    let (status, json) = send(&app, get(&format!("/api/v1/products/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["product"]["name"], "Bamboo Cutting Board");
    assert_eq!(json["data"]["stock_status"]["status"], "low_stock");
    assert_eq!(json["data"]["stock_status"]["remaining"], 8);
    assert_eq!(ids(&json["data"]["related"]), vec!["4", "7"]);

    let (_, json) = send(&app, get("/api/v1/health")).await;
    assert_eq!(json["data"]["products"], 13);
}

#[tokio::test]
async fn admin_create_invalid_draft_is_validation_error() {
    let app = app();
    let mut body = draft_body();
    body["description"] = json!("short");
    let (status, json) = send(&app, admin("POST", "/api/v1/admin/products", Some(body))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");

    let (_, json) = send(&app, get("/api/v1/health")).await;
    assert_eq!(json["data"]["products"], 12);
}

#[tokio::test]
async fn admin_update_replaces_editable_fields() {
    let app = app();
    let mut body = draft_body();
    body["name"] = json!("Professional Chef's Knife (8 inch)");
    body["stock"] = json!(0);
    let (status, json) = send(&app, admin("PUT", "/api/v1/admin/products/4", Some(body))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["id"], "4");
    assert_eq!(json["data"]["reviews"], 201);
    assert!(json["data"]["updated_at"].is_string());

    let (_, json) = send(&app, get("/api/v1/products/4")).await;
    assert_eq!(json["data"]["product"]["name"], "Professional Chef's Knife (8 inch)");
    assert_eq!(json["data"]["stock_status"]["status"], "out_of_stock");
}

#[tokio::test]
async fn admin_update_unknown_id_is_not_found() {
    let (status, json) = send(
        &app(),
        admin("PUT", "/api/v1/admin/products/404", Some(draft_body())),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn admin_delete_removes_product() {
    let app = app();
    let (status, json) = send(&app, admin("DELETE", "/api/v1/admin/products/7", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["deleted"], true);

    let (status, _) = send(&app, get("/api/v1/products/7")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, admin("DELETE", "/api/v1/admin/products/7", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_rate_limit_applies_per_window() {
    let app = app_with(
        AuthState::from_keys(TEST_KEY, false).expect("auth"),
        RateLimitState::new(1, Duration::from_secs(60)),
    );
    let (status, _) = send(&app, admin("GET", "/api/v1/admin/products", None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&app, admin("GET", "/api/v1/admin/products", None)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["error"]["code"], "rate_limited");

    let (status, _) = send(&app, get("/api/v1/products")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_rate_limit_is_per_key_and_skips_rejected_tokens() {
    let app = app_with(
        AuthState::from_keys("key-one,key-two", false).expect("auth"),
        RateLimitState::new(1, Duration::from_secs(60)),
    );
    let with_token = |token: &str| {
        Request::builder()
            .uri("/api/v1/admin/products")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .expect("request")
    };

    let (status, _) = send(&app, with_token("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, with_token("key-one")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, with_token("key-one")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let (status, _) = send(&app, with_token("key-two")).await;
    assert_eq!(status, StatusCode::OK);
}
