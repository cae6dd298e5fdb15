// Each integration test file is a separate binary; helpers not used in every
// binary would otherwise trigger dead_code warnings from clippy.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use wishlist_server::{
    fetch::{FetchClient, DEFAULT_TIMEOUT},
    handlers,
    state::AppState,
};

/// Build the full application router over an in-memory store.
///
/// Private hosts are allowed so items can point at a local mock server.
pub fn create_test_app() -> Router {
    create_app_with(AppState::in_memory(test_fetcher(), true))
}

/// Same as [`create_test_app`] but with the private-address guard enabled.
pub fn create_guarded_app() -> Router {
    create_app_with(AppState::in_memory(test_fetcher(), false))
}

pub fn create_app_with(state: AppState) -> Router {
    handlers::routes().with_state(state)
}

pub fn test_fetcher() -> Arc<FetchClient> {
    Arc::new(FetchClient::bot(DEFAULT_TIMEOUT).expect("fetch client"))
}

/// Generate a session key that is unique per test invocation.
pub fn unique_key() -> String {
    format!("key-{}", uuid::Uuid::new_v4().simple())
}

// ── Request helpers ──────────────────────────────────────────────────────────

pub async fn post_json_authed(
    app: Router,
    uri: &str,
    key: &str,
    body: Value,
) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {key}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

pub async fn post_no_body_authed(app: Router, uri: &str, key: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {key}"))
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

pub async fn post_json_no_auth(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

pub async fn put_json_authed(
    app: Router,
    uri: &str,
    key: &str,
    body: Value,
) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {key}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

pub async fn get_authed(app: Router, uri: &str, key: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {key}"))
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

pub async fn get_no_auth(app: Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

// ── Scenario helpers ─────────────────────────────────────────────────────────

/// Create a wishlist owned by `key` and return the full response body,
/// including the generated password.
pub async fn create_wishlist(app: Router, key: &str, name: &str) -> Value {
    let (status, body) = post_json_authed(app, "/wishlist", key, json!({ "name": name })).await;
    assert_eq!(
        status,
        StatusCode::CREATED,
        "setup create_wishlist failed: {body}"
    );
    body
}

/// Add an item to a wishlist from `url` and return the full response body.
pub async fn create_item(app: Router, key: &str, wishlist_id: &str, url: &str) -> Value {
    let uri = format!("/item/{wishlist_id}");
    let (status, body) = post_json_authed(app, &uri, key, json!({ "url": url })).await;
    assert_eq!(status, StatusCode::CREATED, "setup create_item failed: {body}");
    body
}

/// A product page with a complete set of Open Graph tags.
pub const PRODUCT_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Shop</title>
  <meta property="og:title" content="Blue Kettle">
  <meta property="og:description" content="A kettle that is blue">
  <meta property="og:image" content="https://cdn.example/kettle.png">
  <link rel="icon" href="/favicon.ico">
</head>
<body><h1>Blue Kettle</h1></body>
</html>"#;
