//! End-to-end tests for the catalog service.
//!
//! These run the demo rating-data and movie-info providers and the catalog
//! router on local ports, then query the catalog over HTTP.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use providers::{ProviderIndex, movies_router, ratings_router};
use server::{AppState, FAILURES_HEADER, FailurePolicy, UpstreamConfig, router};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

async fn spawn(router: Router) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test service");
    let addr = listener.local_addr().expect("Failed to get local address");
    let handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test service failed");
    });
    (format!("http://{}", addr), handle)
}

/// Movie provider that stalls on one item
fn slow_movies_router(index: Arc<ProviderIndex>, slow_id: &'static str, delay: Duration) -> Router {
    Router::new().route(
        "/movie/{item_id}",
        get(move |Path(item_id): Path<String>| {
            let index = index.clone();
            async move {
                if item_id == slow_id {
                    tokio::time::sleep(delay).await;
                }
                index
                    .get_item(&item_id)
                    .cloned()
                    .map(Json)
                    .ok_or(StatusCode::NOT_FOUND)
            }
        }),
    )
}

struct TestStack {
    catalog_addr: String,
    handles: Vec<JoinHandle<()>>,
}

impl TestStack {
    async fn start(movies: Router, policy: FailurePolicy, request_timeout_ms: u64) -> Self {
        let index = Arc::new(ProviderIndex::demo());
        let (ratings_addr, ratings_handle) = spawn(ratings_router(index)).await;
        let (movies_addr, movies_handle) = spawn(movies).await;

        let upstream = UpstreamConfig {
            ratings_urls: vec![ratings_addr],
            movies_urls: vec![movies_addr],
            connect_timeout_ms: 1000,
            request_timeout_ms,
            failure_policy: policy,
        };
        let aggregator = upstream
            .build_aggregator()
            .expect("Failed to build aggregator");
        let (catalog_addr, catalog_handle) = spawn(router(AppState::new(aggregator))).await;

        Self {
            catalog_addr,
            handles: vec![ratings_handle, movies_handle, catalog_handle],
        }
    }

    async fn demo(policy: FailurePolicy) -> Self {
        Self::start(movies_router(Arc::new(ProviderIndex::demo())), policy, 2000).await
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        reqwest::get(format!("{}{}", self.catalog_addr, path))
            .await
            .expect("Request to catalog service failed")
    }
}

impl Drop for TestStack {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

#[tokio::test]
async fn test_catalog_for_user_with_ratings() {
    let stack = TestStack::demo(FailurePolicy::FailFast).await;

    let response = stack.get("/catalog/u1").await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert!(response.headers().get(FAILURES_HEADER).is_none());

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!([
            {"name": "Alpha", "desc": "desc", "rating": 4},
            {"name": "Beta", "desc": "desc", "rating": 3},
            {"name": "Gamma", "desc": "desc", "rating": 2}
        ])
    );
}

#[tokio::test]
async fn test_catalog_for_user_without_ratings_is_empty() {
    let stack = TestStack::demo(FailurePolicy::FailFast).await;

    let response = stack.get("/catalog/u0").await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let stack = TestStack::demo(FailurePolicy::FailFast).await;

    let response = stack.get("/catalog/u404").await;
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn test_slow_item_fails_whole_catalog_under_fail_fast() {
    let index = Arc::new(ProviderIndex::demo());
    let movies = slow_movies_router(index, "m2", Duration::from_millis(600));
    let stack = TestStack::start(movies, FailurePolicy::FailFast, 100).await;

    let response = stack.get("/catalog/u1").await;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_GATEWAY);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "upstream_unavailable");
}

#[tokio::test]
async fn test_slow_item_becomes_placeholder_under_degrade() {
    let index = Arc::new(ProviderIndex::demo());
    let movies = slow_movies_router(index, "m2", Duration::from_millis(600));
    let stack = TestStack::start(movies, FailurePolicy::Placeholder, 100).await;

    let response = stack.get("/catalog/u1").await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(
        response.headers().get(FAILURES_HEADER).unwrap().to_str().unwrap(),
        "1"
    );

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!([
            {"name": "Alpha", "desc": "desc", "rating": 4},
            {"name": "m2", "desc": "unavailable", "rating": 3},
            {"name": "Gamma", "desc": "desc", "rating": 2}
        ])
    );
}

#[tokio::test]
async fn test_report_lists_failures_by_position() {
    let index = Arc::new(ProviderIndex::demo());
    let movies = slow_movies_router(index, "m2", Duration::from_millis(600));
    let stack = TestStack::start(movies, FailurePolicy::Omit, 100).await;

    let response = stack.get("/catalog/u1/report").await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["entries"].as_array().unwrap().len(), 2);
    assert_eq!(
        body["failures"],
        serde_json::json!([{
            "index": 1,
            "itemId": "m2",
            "kind": "upstream_unavailable",
            "message": body["failures"][0]["message"].clone()
        }])
    );
}

#[tokio::test]
async fn test_missing_item_metadata_under_fail_fast() {
    // m1 is unknown to this movie provider
    let mut index = ProviderIndex::new();
    index.insert_item(catalog_types::Item::new("m2", "Beta"));
    index.insert_item(catalog_types::Item::new("m3", "Gamma"));
    let stack = TestStack::start(movies_router(Arc::new(index)), FailurePolicy::FailFast, 2000).await;

    let response = stack.get("/catalog/u1").await;
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let stack = TestStack::demo(FailurePolicy::FailFast).await;

    let response = stack.get("/health").await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");
}
