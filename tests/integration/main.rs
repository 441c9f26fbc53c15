//! Integration tests against a fake Graphite backend.
//!
//! Each test starts its own backend on an ephemeral port, so tests can run
//! in parallel.

mod backend;

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use pretty_assertions::assert_eq;
use tokio_test::assert_ok;
use tower::ServiceExt;

use umpire::api::{create_router, AppState};
use umpire::check::{CheckBody, CheckRequest, Evaluator, Outcome};
use umpire::config::Config;
use umpire::error::FetchError;
use umpire::graphite::{GraphiteClient, MetricSource};

use backend::{closed_port_url, Behavior, FakeGraphite};

const THREE_POINTS: &str = r#"[{"target": "app.latency", "datapoints": [[2.0, 1700000000], [null, 1700000060], [4.0, 1700000120], [6.0, 1700000180]]}]"#;

fn client(url: &str) -> GraphiteClient {
    assert_ok!(GraphiteClient::new(&Config::with_graphite_url(url)))
}

fn client_with_timeout(url: &str, timeout_ms: u64) -> GraphiteClient {
    let config = Config {
        backend_timeout_ms: timeout_ms,
        ..Config::with_graphite_url(url)
    };
    assert_ok!(GraphiteClient::new(&config))
}

async fn get(source: GraphiteClient, uri: &str) -> (StatusCode, String) {
    let app = create_router(AppState::new(Evaluator::new(Arc::new(source))), false);
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn fetch_returns_values_in_order_without_nulls() {
    let backend = FakeGraphite::with_body(THREE_POINTS).await;

    let values = client(&backend.url).fetch("app.latency", 300).await;
    assert_eq!(values, Ok(vec![2.0, 4.0, 6.0]));
}

#[tokio::test]
async fn fetch_sends_render_query() {
    let backend = FakeGraphite::with_body(THREE_POINTS).await;

    assert_ok!(client(&backend.url).fetch("sumSeries(app.*.hits)", 120).await);

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["target"], "sumSeries(app.*.hits)");
    assert_eq!(requests[0]["format"], "json");
    assert_eq!(requests[0]["from"], "-120s");
}

#[tokio::test]
async fn fetch_empty_response_is_not_found() {
    let backend = FakeGraphite::with_body("[]").await;

    let result = client(&backend.url).fetch("app.gone", 60).await;
    assert_eq!(result, Err(FetchError::MetricNotFound));
}

#[tokio::test]
async fn fetch_series_without_points_is_empty_success() {
    let backend = FakeGraphite::with_body(r#"[{"target": "app.idle", "datapoints": [[null, 1], [null, 2]]}]"#).await;

    let result = client(&backend.url).fetch("app.idle", 60).await;
    assert_eq!(result, Ok(vec![]));
}

#[tokio::test]
async fn fetch_error_status_is_unavailable_without_retry() {
    let backend = FakeGraphite::start(Behavior::Status(StatusCode::INTERNAL_SERVER_ERROR)).await;

    let result = client(&backend.url).fetch("app.latency", 60).await;
    assert!(matches!(result, Err(FetchError::MetricServiceUnavailable { .. })));
    assert_eq!(backend.requests().len(), 1);
}

#[tokio::test]
async fn fetch_timeout_is_unavailable() {
    let backend = FakeGraphite::start(Behavior::Slow(Duration::from_millis(500))).await;

    let result = client_with_timeout(&backend.url, 50).fetch("app.latency", 60).await;
    assert_eq!(
        result,
        Err(FetchError::MetricServiceUnavailable {
            reason: "request timed out".to_string()
        })
    );
}

#[tokio::test]
async fn fetch_connection_refused_is_unavailable() {
    let url = closed_port_url().await;

    let result = client(&url).fetch("app.latency", 60).await;
    assert!(matches!(result, Err(FetchError::MetricServiceUnavailable { .. })));
}

#[tokio::test]
async fn fetch_malformed_body_is_unclassified() {
    let backend = FakeGraphite::with_body("<html>oops</html>").await;

    let result = client(&backend.url).fetch("app.latency", 60).await;
    assert!(matches!(result, Err(FetchError::MalformedResponse(_))));
}

#[tokio::test]
async fn evaluator_averages_backend_values() {
    let backend = FakeGraphite::with_body(THREE_POINTS).await;
    let evaluator = Evaluator::new(Arc::new(client(&backend.url)));

    let result = evaluator
        .evaluate(&CheckRequest::new("app.latency", 300).min(1.0).max(10.0))
        .await;
    assert_eq!(result.outcome, Outcome::ThresholdPass);
    assert_eq!(result.body, CheckBody::Value { value: 4.0 });
}

#[tokio::test]
async fn check_endpoint_end_to_end() {
    let backend = FakeGraphite::with_body(THREE_POINTS).await;

    let (status, body) = get(client(&backend.url), "/check?metric=app.latency&min=1&max=10&range=300").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "{\"value\":4.0}\n");

    let (status, body) = get(client(&backend.url), "/check?metric=app.latency&max=3&range=300").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "{\"value\":4.0}\n");
}

#[tokio::test]
async fn check_endpoint_is_idempotent() {
    let backend = FakeGraphite::with_body(THREE_POINTS).await;
    let uri = "/check?metric=app.latency&max=3&range=300";

    let first = get(client(&backend.url), uri).await;
    let second = get(client(&backend.url), uri).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn check_endpoint_maps_backend_failures() {
    let backend = FakeGraphite::with_body("[]").await;
    let (status, body) = get(client(&backend.url), "/check?metric=app.gone&max=3&range=60").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "{\"error\":\"metric not found\"}\n");

    let backend = FakeGraphite::start(Behavior::Status(StatusCode::BAD_GATEWAY)).await;
    let (status, _) = get(client(&backend.url), "/check?metric=app.latency&max=3&range=60").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let backend = FakeGraphite::with_body("{\"not\": \"a list\"}").await;
    let (status, body) = get(client(&backend.url), "/check?metric=app.latency&max=3&range=60").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "{\"error\":\"internal server error\"}\n");
}

#[tokio::test]
async fn health_does_not_touch_backend() {
    let backend = FakeGraphite::with_body(THREE_POINTS).await;

    let (status, body) = get(client(&backend.url), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "{\"health\":\"ok\"}\n");
    assert!(backend.requests().is_empty());
}
