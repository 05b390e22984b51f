use futures::StreamExt;
use layerview_store::EntityStore;
use layerview_sync::{
    spawn_controller, ApiConfig, ApplicationSource, ControllerConfig, EventType, FrameDecoder,
    HttpSource, SyncError, WatchEvent,
};
use layerview_types::{Application, HealthStatusCode, ResourceNode, ResourceTree};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source_for(server: &MockServer) -> HttpSource {
    HttpSource::new(ApiConfig::new(server.uri())).unwrap()
}

fn stream_body(events: Vec<WatchEvent>) -> String {
    events.iter().map(|e| e.to_frame().unwrap()).collect()
}

// ── Config ──────────────────────────────────────────────────────

#[test]
fn api_config_defaults() {
    let cfg = ApiConfig::default();
    assert_eq!(cfg.base_url, "http://localhost:8080");
    assert!(cfg.token.is_none());
    assert_eq!(cfg.request_timeout, Duration::from_secs(30));
}

#[test]
fn api_config_partial_json() {
    let cfg: ApiConfig =
        serde_json::from_str(r#"{"base_url":"https://argo.example","token":"t0k"}"#).unwrap();
    assert_eq!(cfg.base_url, "https://argo.example");
    assert_eq!(cfg.token.as_deref(), Some("t0k"));
    assert_eq!(cfg.request_timeout, Duration::from_secs(30));
}

// ── Listing ─────────────────────────────────────────────────────

#[tokio::test]
async fn list_applications_parses_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/applications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "metadata": {"name": "postgres", "labels": {"jeebon.ai/category": "database"}},
                    "status": {"sync": {"status": "Synced"}, "health": {"status": "Healthy"}}
                },
                {"metadata": {"name": "keycloak"}},
                {"metadata": {"name": ""}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let apps = source_for(&server).list_applications().await.unwrap();
    let names: Vec<&str> = apps.iter().map(|a| a.name()).collect();
    assert_eq!(names, vec!["postgres", "keycloak"]);
    assert_eq!(apps[0].category(), "database");
    assert_eq!(apps[0].health_status(), HealthStatusCode::Healthy);
    assert_eq!(apps[1].category(), "uncategorized");
}

#[tokio::test]
async fn list_applications_null_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/applications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": null})))
        .mount(&server)
        .await;

    let apps = source_for(&server).list_applications().await.unwrap();
    assert!(apps.is_empty());
}

#[tokio::test]
async fn bearer_token_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/applications"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let source =
        HttpSource::new(ApiConfig::new(server.uri()).with_token("secret-token")).unwrap();
    assert!(source.list_applications().await.unwrap().is_empty());
}

#[tokio::test]
async fn trailing_slash_in_base_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/applications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let source = HttpSource::new(ApiConfig::new(format!("{}/", server.uri()))).unwrap();
    tokio_test::assert_ok!(source.list_applications().await);
}

#[tokio::test]
async fn non_success_status_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/applications"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = source_for(&server).list_applications().await.unwrap_err();
    assert!(matches!(err, SyncError::HttpStatus(503)));
    assert!(err.is_transport());
}

#[tokio::test]
async fn unreachable_backend_is_network_error() {
    let source = HttpSource::new(ApiConfig::new("http://127.0.0.1:1")).unwrap();
    let err = source.list_applications().await.unwrap_err();
    assert!(matches!(err, SyncError::Network(_)));
}

// ── Stream ──────────────────────────────────────────────────────

#[tokio::test]
async fn open_stream_yields_decodable_chunks() {
    let server = MockServer::start().await;
    let body = stream_body(vec![
        WatchEvent::added(Application::new("a").with_category("auth")),
        WatchEvent::deleted(Application::new("b")),
    ]);
    Mock::given(method("GET"))
        .and(path("/api/v1/stream/applications"))
        .and(header("accept", "text/event-stream"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(body),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut stream = source_for(&server).open_stream().await.unwrap();
    let mut decoder = FrameDecoder::new();
    let mut events = Vec::new();
    while let Some(chunk) = stream.next().await {
        events.extend(decoder.push(&chunk.unwrap()));
    }

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].application.name(), "a");
    assert_eq!(events[1].kind, EventType::Deleted);
}

#[tokio::test]
async fn open_stream_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/stream/applications"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = source_for(&server).open_stream().await.err().unwrap();
    assert!(matches!(err, SyncError::HttpStatus(401)));
}

// ── Resource tree ───────────────────────────────────────────────

#[tokio::test]
async fn resource_tree_passes_namespace() {
    let server = MockServer::start().await;
    let tree = ResourceTree {
        nodes: vec![
            ResourceNode::new("Deployment", "api").with_health(HealthStatusCode::Healthy),
            ResourceNode::new("Service", "api"),
        ],
        orphaned_nodes: vec![],
    };
    Mock::given(method("GET"))
        .and(path("/api/v1/applications/api/resource-tree"))
        .and(query_param("appNamespace", "argocd"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&tree))
        .expect(1)
        .mount(&server)
        .await;

    let fetched = source_for(&server).resource_tree("api", "argocd").await.unwrap();
    assert_eq!(fetched, tree);
}

#[tokio::test]
async fn resource_tree_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/applications/ghost/resource-tree"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = source_for(&server).resource_tree("ghost", "argocd").await.unwrap_err();
    assert!(matches!(err, SyncError::HttpStatus(404)));
}

// ── Controller over HTTP ────────────────────────────────────────

#[tokio::test]
async fn controller_ingests_http_stream_and_reconnects_on_eof() {
    let server = MockServer::start().await;
    let body = stream_body(vec![
        WatchEvent::added(Application::new("postgres").with_category("database")),
        WatchEvent::added(Application::new("vault").with_category("secrets")),
    ]);
    Mock::given(method("GET"))
        .and(path("/api/v1/stream/applications"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let config = ControllerConfig {
        base_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
        cold_start_list: false,
        poll_interval: None,
    };
    let handle = spawn_controller(Arc::new(source_for(&server)), EntityStore::new(), config);
    let mut rx = handle.subscribe();

    let view = tokio::time::timeout(
        Duration::from_secs(5),
        rx.wait_for(|v| v.snapshot.total() == 2),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();
    assert!(view.snapshot.contains_category("database"));
    assert!(view.snapshot.contains_category("secrets"));

    // The body ends after two frames, so the controller keeps reconnecting.
    tokio::time::timeout(
        Duration::from_secs(5),
        rx.wait_for(|v| v.last_error.as_deref() == Some("stream closed")),
    )
    .await
    .unwrap()
    .unwrap();

    handle.stop().await.unwrap();
    let requests = server.received_requests().await.unwrap();
    assert!(requests.len() >= 2);
}
