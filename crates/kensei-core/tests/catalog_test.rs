//! Integration tests for the trophy catalog cache
//!
//! Run with: cargo test --test catalog_test

use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kensei_core::catalog::TrophyCatalog;
use kensei_core::core::error::AppError;

const CATALOG_BODY: &str = r#"{
    "wave-50": {"name": "Выжить 50 волн", "emoji": "🌊", "description": ["Режим выживания", "50 волн подряд"]},
    "no-emoji": {"name": "Plain"}
}"#;

async fn mock_catalog(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path("/trophies.json"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body.to_string()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn fetches_and_parses_catalog() {
    let server = MockServer::start().await;
    mock_catalog(&server, 200, CATALOG_BODY).await;

    let catalog = TrophyCatalog::new(format!("{}/trophies.json", server.uri()));

    let info = catalog.get("wave-50").await.unwrap().unwrap();
    assert_eq!(info.name, "Выжить 50 волн");
    assert_eq!(info.emoji, "🌊");
    assert_eq!(info.description.len(), 2);

    // Optional fields default
    let plain = catalog.get("no-emoji").await.unwrap().unwrap();
    assert_eq!(plain.emoji, "");
    assert!(plain.description.is_empty());

    // Unknown id is not an error
    assert!(catalog.get("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn fresh_cache_is_served_without_refetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trophies.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CATALOG_BODY.to_string()))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = TrophyCatalog::with_ttl(format!("{}/trophies.json", server.uri()), Duration::from_secs(3600));

    catalog.get("wave-50").await.unwrap();
    catalog.get("wave-50").await.unwrap();
    catalog.get("missing").await.unwrap();
    // .expect(1) on the mock verifies a single upstream hit on drop
}

#[tokio::test]
async fn stale_cache_is_served_when_refresh_fails() {
    let server = MockServer::start().await;
    mock_catalog(&server, 200, CATALOG_BODY).await;

    // TTL zero: every get refreshes
    let catalog = TrophyCatalog::with_ttl(format!("{}/trophies.json", server.uri()), Duration::ZERO);

    // Warm the cache
    assert!(catalog.get("wave-50").await.unwrap().is_some());

    // Upstream starts failing — stale data keeps being served
    server.reset().await;
    mock_catalog(&server, 500, "").await;

    let info = catalog.get("wave-50").await.unwrap().unwrap();
    assert_eq!(info.name, "Выжить 50 волн");
}

#[tokio::test]
async fn cold_cache_failure_is_a_dependency_error() {
    let server = MockServer::start().await;
    mock_catalog(&server, 500, "").await;

    let catalog = TrophyCatalog::new(format!("{}/trophies.json", server.uri()));

    assert!(matches!(catalog.get("wave-50").await, Err(AppError::Dependency(_))));
}
