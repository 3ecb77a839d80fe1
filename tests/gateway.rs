//! Integration tests for the HTTP surface using wiremock as the upstream
//! AI gateway.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, header as mock_header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use aura::db;
use aura::settings::AppSettings;
use aura::state::AppState;

const SSE_BODY: &str = "data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n\n\
data: {\"choices\":[{\"delta\":{\"content\":\" world\"}}]}\n\n\
data: [DONE]\n";

struct TestBackend {
    app: axum::Router,
    // Held so the database directory outlives the router.
    _dir: tempfile::TempDir,
}

fn test_backend(gateway_uri: &str, api_key: Option<&str>) -> TestBackend {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path: PathBuf = dir.path().join("aura.sqlite3");
    {
        let conn = db::open_db(&db_path).expect("open db");
        db::init_db(&conn).expect("init db");
    }

    let mut settings = AppSettings::default();
    settings.gateway.url = format!("{}/v1/chat/completions", gateway_uri);

    let state = Arc::new(AppState::new(
        settings,
        api_key.map(str::to_string),
        db_path,
    ));

    TestBackend {
        app: aura::api::router(state),
        _dir: dir,
    }
}

fn chat_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn chat_streams_gateway_body_verbatim() {
    let gateway = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(mock_header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "stream": true,
            "model": "google/gemini-2.5-flash",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(SSE_BODY, "text/event-stream"))
        .expect(1)
        .mount(&gateway)
        .await;

    let backend = test_backend(&gateway.uri(), Some("test-key"));
    let response = backend
        .app
        .oneshot(chat_request(json!({
            "messages": [{"role": "user", "content": "hi"}]
        })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    assert_eq!(bytes.as_ref(), SSE_BODY.as_bytes());
}

#[tokio::test]
async fn chat_injects_system_prompt_and_chart_tool() {
    let gateway = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(SSE_BODY, "text/event-stream"))
        .mount(&gateway)
        .await;

    let backend = test_backend(&gateway.uri(), Some("test-key"));
    backend
        .app
        .oneshot(chat_request(json!({
            "messages": [{"role": "user", "content": "plot my sales"}]
        })))
        .await
        .expect("response");

    let requests = gateway.received_requests().await.expect("recorded");
    let sent: Value = serde_json::from_slice(&requests[0].body).expect("gateway body");

    let messages = sent["messages"].as_array().expect("messages");
    assert_eq!(messages[0]["role"], "system");
    assert!(messages[0]["content"]
        .as_str()
        .unwrap()
        .contains("You are AURA"));
    assert_eq!(messages[1]["content"], "plot my sales");

    let tools = sent["tools"].as_array().expect("tools");
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0]["function"]["name"], "create_chart");
    assert_eq!(sent["stream"], true);
}

#[tokio::test]
async fn upstream_429_maps_to_rate_limit_message() {
    let gateway = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&gateway)
        .await;

    let backend = test_backend(&gateway.uri(), Some("test-key"));
    let response = backend
        .app
        .oneshot(chat_request(json!({"messages": []})))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Rate limits exceeded, please try again later." })
    );
}

#[tokio::test]
async fn upstream_402_maps_to_payment_message() {
    let gateway = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(402))
        .mount(&gateway)
        .await;

    let backend = test_backend(&gateway.uri(), Some("test-key"));
    let response = backend
        .app
        .oneshot(chat_request(json!({"messages": []})))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Payment required, please add funds to your workspace." })
    );
}

#[tokio::test]
async fn other_upstream_failures_collapse_to_gateway_error() {
    let gateway = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream exploded"))
        .mount(&gateway)
        .await;

    let backend = test_backend(&gateway.uri(), Some("test-key"));
    let response = backend
        .app
        .oneshot(chat_request(json!({"messages": []})))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await, json!({ "error": "AI gateway error" }));
}

#[tokio::test]
async fn missing_api_key_is_a_500_with_message() {
    let gateway = MockServer::start().await;
    let backend = test_backend(&gateway.uri(), None);

    let response = backend
        .app
        .oneshot(chat_request(json!({"messages": []})))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "AURA_API_KEY is not configured" })
    );
}

#[tokio::test]
async fn preflight_gets_cors_headers() {
    let gateway = MockServer::start().await;
    let backend = test_backend(&gateway.uri(), Some("test-key"));

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/chat")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .expect("request");

    let response = backend.app.oneshot(request).await.expect("response");

    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
    let allowed = response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
        .expect("allow-headers")
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(allowed.contains("content-type"));
    assert!(allowed.contains("x-device-id"));
}

// ─── Conversation CRUD ──────────────────────────────────────────────────────

fn crud_request(
    method_name: &str,
    uri: &str,
    device: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method_name).uri(uri);
    if let Some(device) = device {
        builder = builder.header("x-device-id", device);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

async fn create_conversation(app: &axum::Router, device: &str) -> String {
    let response = app
        .clone()
        .oneshot(crud_request("POST", "/api/conversations", Some(device), None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn conversation_round_trip() {
    let gateway = MockServer::start().await;
    let backend = test_backend(&gateway.uri(), Some("test-key"));
    let app = &backend.app;

    let conversation = create_conversation(app, "device-a").await;

    let response = app
        .clone()
        .oneshot(crud_request(
            "POST",
            &format!("/api/conversations/{conversation}/messages"),
            Some("device-a"),
            Some(json!({
                "role": "assistant",
                "content": "Here is your chart.",
                "chart": {"type": "bar", "data": [{"name": "Jan", "value": 10}]},
            })),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(crud_request(
            "GET",
            &format!("/api/conversations/{conversation}/messages"),
            Some("device-a"),
            None,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let rows = body_json(response).await;
    assert_eq!(rows[0]["content"], "Here is your chart.");
    assert_eq!(rows[0]["chart"]["type"], "bar");

    let response = app
        .clone()
        .oneshot(crud_request("GET", "/api/conversations", Some("device-a"), None))
        .await
        .expect("response");
    let listed = body_json(response).await;
    assert_eq!(listed[0]["id"].as_str().unwrap(), conversation);
    assert_eq!(listed[0]["preview"], "Here is your chart.");
}

#[tokio::test]
async fn conversations_are_scoped_to_the_device() {
    let gateway = MockServer::start().await;
    let backend = test_backend(&gateway.uri(), Some("test-key"));
    let app = &backend.app;

    let conversation = create_conversation(app, "device-a").await;

    let response = app
        .clone()
        .oneshot(crud_request(
            "GET",
            &format!("/api/conversations/{conversation}/messages"),
            Some("device-b"),
            None,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(crud_request("GET", "/api/conversations", Some("device-b"), None))
        .await
        .expect("response");
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn missing_device_header_is_rejected() {
    let gateway = MockServer::start().await;
    let backend = test_backend(&gateway.uri(), Some("test-key"));

    let response = backend
        .app
        .oneshot(crud_request("POST", "/api/conversations", None, None))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rename_and_delete() {
    let gateway = MockServer::start().await;
    let backend = test_backend(&gateway.uri(), Some("test-key"));
    let app = &backend.app;

    let conversation = create_conversation(app, "device-a").await;

    let response = app
        .clone()
        .oneshot(crud_request(
            "PATCH",
            &format!("/api/conversations/{conversation}"),
            Some("device-a"),
            Some(json!({"title": "Q3 planning"})),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(crud_request("GET", "/api/conversations", Some("device-a"), None))
        .await
        .expect("response");
    assert_eq!(body_json(response).await[0]["title"], "Q3 planning");

    let response = app
        .clone()
        .oneshot(crud_request(
            "DELETE",
            &format!("/api/conversations/{conversation}"),
            Some("device-a"),
            None,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(crud_request("GET", "/api/conversations", Some("device-a"), None))
        .await
        .expect("response");
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn invalid_role_is_rejected() {
    let gateway = MockServer::start().await;
    let backend = test_backend(&gateway.uri(), Some("test-key"));
    let app = &backend.app;

    let conversation = create_conversation(app, "device-a").await;

    let response = app
        .clone()
        .oneshot(crud_request(
            "POST",
            &format!("/api/conversations/{conversation}/messages"),
            Some("device-a"),
            Some(json!({"role": "system", "content": "nope"})),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let gateway = MockServer::start().await;
    let backend = test_backend(&gateway.uri(), Some("test-key"));

    let response = backend
        .app
        .oneshot(crud_request("GET", "/health", None, None))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}
