#![cfg(feature = "http-api")]

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use dmxflow_control::{CatalogServer, CatalogServerConfig};
use dmxflow_core::{FixtureCatalog, FixtureDefinition};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn server() -> CatalogServer {
    let mut catalog = FixtureCatalog::new();
    catalog.insert(FixtureDefinition::rgb_par());
    catalog.insert(FixtureDefinition::generic_dimmer());
    CatalogServer::new(CatalogServerConfig::default(), Arc::new(catalog))
}

async fn get(uri: &str) -> (StatusCode, Value) {
    let response = server()
        .router()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_list_fixtures() {
    let (status, json) = get("/fixtures").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
    assert_eq!(json["data"][0]["manufacturer"], "Generic");
    assert_eq!(json["data"][0]["modes"][0]["name"], "3 Channel");
}

#[tokio::test]
async fn test_get_fixture() {
    let (status, json) = get("/fixtures/Generic/RGB%20Par").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["type"], "ColorChanger");

    let (status, json) = get("/fixtures/Generic/Moving%20Head").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert!(json.get("data").is_none());
}

#[tokio::test]
async fn test_status() {
    let (status, json) = get("/api/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["fixture_definitions"], 2);
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let response = server()
        .router()
        .oneshot(
            Request::builder()
                .uri("/fixtures")
                .header("Origin", "http://example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|h| h.to_str().ok()),
        Some("*")
    );
}
