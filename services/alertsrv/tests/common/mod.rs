//! Shared helpers for alertsrv integration tests

#![allow(dead_code)]

use std::sync::Arc;

use alertsrv::{
    api::create_router, config::AlertConfig, store::MemoryAlertStore, AlertStore, AppState,
    NewAlert,
};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

/// Router backed by a fresh in-memory store
pub fn create_test_router() -> (Router, Arc<dyn AlertStore>) {
    let store: Arc<dyn AlertStore> = Arc::new(MemoryAlertStore::new());
    let mut config = AlertConfig::default();
    config.storage.url = "memory://".to_string();
    let app = create_router(AppState::new(store.clone(), config));
    (app, store)
}

/// Seed `count` Tourist alerts for `country`
pub async fn seed(store: &Arc<dyn AlertStore>, country: &str, count: usize) {
    for i in 0..count {
        store
            .create(NewAlert::new(country, format!("City {}", i), "Tourist"))
            .await
            .unwrap();
    }
}

/// Send a request and decode the response body as JSON
pub async fn json_request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, _, body) = raw_request(app, method, uri, body.map(|v| v.to_string())).await;
    (status, body)
}

/// Like [`json_request`] but also returns the headers and takes a raw body
pub async fn raw_request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<String>,
) -> (StatusCode, axum::http::HeaderMap, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map(Body::from).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let body: Value = if body_bytes.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, headers, body)
}
