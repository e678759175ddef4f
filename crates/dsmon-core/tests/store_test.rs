#![allow(clippy::unwrap_used)]
// Integration tests for the stores and dashboard using wiremock.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dsmon_api::{ApiClient, ClientConfig, Error as ApiError};
use dsmon_core::{
    CoreError, Dashboard, DashboardConfig, FetchOrdering, FetchOutcome, FetchStatus,
    MetricsStore,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Arc<ApiClient>) {
    let server = MockServer::start().await;
    let config = ClientConfig::new(Url::parse(&server.uri()).unwrap());
    let client = ApiClient::with_credential(&config, None).unwrap();
    (server, Arc::new(client))
}

fn metrics_body(name: &str) -> serde_json::Value {
    json!([{ "name": name, "value": 1 }])
}

async fn wait_for_requests(server: &MockServer, count: usize) {
    for _ in 0..200 {
        if server.received_requests().await.unwrap().len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("server never saw {count} requests");
}

// ── Metrics store ───────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_replaces_state() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "cpu", "value": 42}])))
        .mount(&server)
        .await;

    let store = MetricsStore::new(client);
    let outcome = store.fetch_metrics().await.unwrap();

    assert_eq!(outcome, FetchOutcome::Applied);
    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].as_json(), &json!({"name": "cpu", "value": 42}));
    assert!(store.last_updated().is_some());
    assert_eq!(store.status(), FetchStatus::Idle);
}

#[tokio::test]
async fn test_fetch_uses_client_credential() {
    let (server, client) = setup().await;
    client.set_token("abc").unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/metrics"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    MetricsStore::new(client).fetch_metrics().await.unwrap();
}

#[tokio::test]
async fn test_failed_fetch_keeps_state() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(metrics_body("before")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/metrics"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&server)
        .await;

    let store = MetricsStore::new(client);
    store.fetch_metrics().await.unwrap();
    let updated = store.last_updated();

    let err = store.fetch_metrics().await.unwrap_err();
    assert!(
        matches!(err, CoreError::Api(ApiError::Status { status: 503, .. })),
        "expected the client's status error, got: {err:?}"
    );
    assert_eq!(store.snapshot()[0].name(), Some("before"));
    assert_eq!(store.last_updated(), updated);
    assert_eq!(store.status(), FetchStatus::Idle);
}

#[tokio::test]
async fn test_unreachable_server_yields_transport_error() {
    let config = ClientConfig::new(Url::parse("http://127.0.0.1:9").unwrap());
    let client = Arc::new(ApiClient::with_credential(&config, None).unwrap());
    let store = MetricsStore::new(client);

    let err = store.fetch_metrics().await.unwrap_err();
    assert!(matches!(err, CoreError::Api(ApiError::Transport(_))));
    assert!(store.snapshot().is_empty());
}

/// First request is slow, second is fast. Returns the final snapshot name
/// and the outcomes of (first, second).
async fn race(ordering: FetchOrdering) -> (String, FetchOutcome, FetchOutcome) {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/metrics"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(metrics_body("first"))
                .set_delay(Duration::from_millis(300)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(metrics_body("second")))
        .mount(&server)
        .await;

    let store = Arc::new(MetricsStore::with_ordering(client, ordering));

    let slow = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.fetch_metrics().await })
    };
    wait_for_requests(&server, 1).await;
    assert_eq!(store.status(), FetchStatus::Fetching);

    let second = store.fetch_metrics().await.unwrap();
    assert_eq!(store.snapshot()[0].name(), Some("second"));
    let first = slow.await.unwrap().unwrap();

    let name = store.snapshot()[0].name().unwrap().to_owned();
    (name, first, second)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_completion_order_wins_by_default() {
    let (name, first, second) = race(FetchOrdering::CompletionOrder).await;
    assert_eq!(name, "first");
    assert_eq!(first, FetchOutcome::Applied);
    assert_eq!(second, FetchOutcome::Applied);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_latest_issued_discards_stale_response() {
    let (name, first, second) = race(FetchOrdering::LatestIssued).await;
    assert_eq!(name, "second");
    assert_eq!(first, FetchOutcome::Superseded);
    assert_eq!(second, FetchOutcome::Applied);
}

#[tokio::test]
async fn test_subscribers_see_new_snapshot() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(metrics_body("mem")))
        .mount(&server)
        .await;

    let store = MetricsStore::new(client);
    let mut sub = store.subscribe();
    assert!(sub.current().is_empty());

    store.fetch_metrics().await.unwrap();
    let snap = sub.changed().await.unwrap();
    assert_eq!(snap[0].name(), Some("mem"));
}

// ── Dashboard ───────────────────────────────────────────────────────

fn fast_config() -> DashboardConfig {
    DashboardConfig {
        clock_interval: Duration::from_millis(20),
        metrics_interval: Duration::from_millis(50),
        ordering: FetchOrdering::default(),
    }
}

#[tokio::test]
async fn test_dashboard_polls_metrics_and_ticks_clock() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(metrics_body("disk")))
        .mount(&server)
        .await;

    let dash = Dashboard::new(client, fast_config()).unwrap();
    let metrics = dash.metrics().subscribe().into_stream();
    let clock = dash.clock().subscribe().into_stream();
    dash.start().await;

    // First item of a watch stream is the current value.
    let snaps: Vec<_> = tokio::time::timeout(Duration::from_secs(5), metrics.take(2).collect())
        .await
        .unwrap();
    assert_eq!(snaps[1][0].name(), Some("disk"));

    let ticks: Vec<_> = tokio::time::timeout(Duration::from_secs(5), clock.take(3).collect())
        .await
        .unwrap();
    assert!(ticks[2] > ticks[0]);

    dash.shutdown().await;
    assert!(!dash.is_running().await);
}

#[tokio::test]
async fn test_dashboard_keeps_polling_after_failure() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/metrics"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(metrics_body("recovered")))
        .mount(&server)
        .await;

    let dash = Dashboard::new(client, fast_config()).unwrap();
    let mut sub = dash.metrics().subscribe();
    dash.start().await;

    let snap = tokio::time::timeout(Duration::from_secs(5), sub.changed())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snap[0].name(), Some("recovered"));
    assert!(server.received_requests().await.unwrap().len() >= 3);

    dash.shutdown().await;
}

#[tokio::test]
async fn test_refresh_now() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(metrics_body("net")))
        .expect(1)
        .mount(&server)
        .await;

    let dash = Dashboard::new(client, DashboardConfig::default()).unwrap();
    let before = dash.clock().now();

    let outcome = dash.refresh_now().await.unwrap();
    assert_eq!(outcome, FetchOutcome::Applied);
    assert_eq!(dash.metrics().snapshot()[0].name(), Some("net"));
    assert!(dash.clock().now() >= before);
}
