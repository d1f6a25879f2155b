//! Integration tests for build-client
//!
//! These tests serve a fake Build API with axum and drive it through the
//! client, checking URLs, headers and envelope handling end to end.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Request, State};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use build_client::testing::{TestServer, TEST_API_KEY};
use build_client::{
    ApiError, BuildClient, BuildClientError, CallContext, CancellationToken, ClientConfig,
    CodeRevisionLong, CodeTarget, Device, Model, PollCursor,
};

// =============================================================================
// Fake Build API
// =============================================================================

#[derive(Debug, Clone)]
struct RecordedRequest {
    method: Method,
    path: String,
    authorization: Option<String>,
    content_type: Option<String>,
}

#[derive(Default)]
struct FakeState {
    next_model: u32,
    models: BTreeMap<String, Value>,
    devices: BTreeMap<String, Value>,
    revisions: BTreeMap<String, Vec<Value>>,
    requests: Vec<RecordedRequest>,
}

#[derive(Clone, Default)]
struct Fake(Arc<Mutex<FakeState>>);

impl Fake {
    fn seeded() -> Self {
        let fake = Fake::default();
        {
            let mut state = fake.0.lock().unwrap();
            state.devices.insert(
                "dev1".to_string(),
                json!({
                    "id": "dev1",
                    "name": "porch light",
                    "model_id": "",
                    "powerstate": "online",
                    "rssi": -58,
                    "agent_id": "agent1",
                    "agent_status": "online"
                }),
            );
            state.devices.insert(
                "dev2".to_string(),
                json!({"id": "dev2", "name": "garage", "powerstate": "offline"}),
            );
        }
        fake
    }

    fn requests(&self) -> Vec<RecordedRequest> {
        self.0.lock().unwrap().requests.clone()
    }

    fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("no request recorded")
    }
}

fn ok(payload: Value) -> (StatusCode, Json<Value>) {
    let mut body = payload;
    body["success"] = json!(true);
    (StatusCode::OK, Json(body))
}

fn failure(status: StatusCode, code: &str, short: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({
            "success": false,
            "error": {
                "code": code,
                "message_short": short,
                "message_full": format!("{} (full)", short)
            }
        })),
    )
}

async fn record(State(fake): State<Fake>, request: Request, next: Next) -> Response {
    // Borrows of the request must end before the await
    let recorded = {
        let header = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };
        RecordedRequest {
            method: request.method().clone(),
            path: request.uri().path().to_string(),
            authorization: header("authorization"),
            content_type: header("content-type"),
        }
    };
    fake.0.lock().unwrap().requests.push(recorded);
    next.run(request).await
}

async fn list_models(State(fake): State<Fake>) -> impl IntoResponse {
    let state = fake.0.lock().unwrap();
    let models: Vec<Value> = state.models.values().cloned().collect();
    ok(json!({ "models": models }))
}

async fn create_model(State(fake): State<Fake>, Json(body): Json<Value>) -> impl IntoResponse {
    let mut state = fake.0.lock().unwrap();
    state.next_model += 1;
    let id = format!("model{}", state.next_model);
    let model = json!({"id": id, "name": body["name"]});
    state.models.insert(id, model.clone());
    ok(json!({ "model": model }))
}

async fn get_model(State(fake): State<Fake>, Path(id): Path<String>) -> impl IntoResponse {
    let state = fake.0.lock().unwrap();
    match state.models.get(&id) {
        Some(model) => ok(json!({ "model": model })),
        None => failure(StatusCode::NOT_FOUND, "ModelNotFound", "not found"),
    }
}

async fn update_model(
    State(fake): State<Fake>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let mut state = fake.0.lock().unwrap();
    match state.models.get_mut(&id) {
        Some(model) => {
            model["name"] = body["name"].clone();
            ok(json!({ "model": model.clone() }))
        }
        None => failure(StatusCode::NOT_FOUND, "ModelNotFound", "not found"),
    }
}

async fn delete_model(State(fake): State<Fake>, Path(id): Path<String>) -> impl IntoResponse {
    let mut state = fake.0.lock().unwrap();
    match state.models.remove(&id) {
        Some(_) => ok(json!({})),
        None => failure(StatusCode::NOT_FOUND, "ModelNotFound", "model not found"),
    }
}

async fn restart_model(State(fake): State<Fake>, Path(id): Path<String>) -> impl IntoResponse {
    let state = fake.0.lock().unwrap();
    if state.models.contains_key(&id) {
        ok(json!({}))
    } else {
        (StatusCode::OK, Json(json!({"success": false})))
    }
}

async fn list_revisions(State(fake): State<Fake>, Path(id): Path<String>) -> impl IntoResponse {
    let state = fake.0.lock().unwrap();
    let revisions: Vec<Value> = state
        .revisions
        .get(&id)
        .map(|revs| {
            revs.iter()
                .map(|r| {
                    json!({
                        "version": r["version"],
                        "created_at": r["created_at"],
                        "release_notes": r["release_notes"]
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    ok(json!({ "revisions": revisions }))
}

async fn create_revision(
    State(fake): State<Fake>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let device_code = body["device_code"].as_str().unwrap_or_default();
    if device_code.contains("syntax error") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "error": {
                    "code": "CompileFailed",
                    "message_short": "compile failed",
                    "message_full": "Device code failed to compile",
                    "details": {
                        "device_errors": [{"row": 3, "column": 14, "error": "expected ';'"}],
                        "agent_errors": {"row": 1, "column": 1, "error": "unknown identifier 'http'"}
                    }
                }
            })),
        );
    }

    let mut state = fake.0.lock().unwrap();
    let revisions = state.revisions.entry(id).or_default();
    let revision = json!({
        "version": revisions.len() + 1,
        "created_at": "2026-01-01T00:00:00Z",
        "device_code": body["device_code"],
        "agent_code": body["agent_code"],
        "release_notes": body["release_notes"].as_str().unwrap_or_default()
    });
    revisions.push(revision.clone());
    ok(json!({ "revision": revision }))
}

async fn get_revision(
    State(fake): State<Fake>,
    Path((id, version)): Path<(String, usize)>,
) -> impl IntoResponse {
    let state = fake.0.lock().unwrap();
    match state
        .revisions
        .get(&id)
        .and_then(|revs| revs.get(version.wrapping_sub(1)))
    {
        Some(revision) => ok(json!({ "revision": revision })),
        None => failure(StatusCode::NOT_FOUND, "RevisionNotFound", "no such revision"),
    }
}

async fn list_devices(State(fake): State<Fake>) -> impl IntoResponse {
    let state = fake.0.lock().unwrap();
    let devices: Vec<Value> = state.devices.values().cloned().collect();
    ok(json!({ "devices": devices }))
}

async fn get_device(State(fake): State<Fake>, Path(id): Path<String>) -> impl IntoResponse {
    let state = fake.0.lock().unwrap();
    match state.devices.get(&id) {
        Some(device) => ok(json!({ "device": device })),
        None => failure(StatusCode::NOT_FOUND, "DeviceNotFound", "device not found"),
    }
}

async fn update_device(
    State(fake): State<Fake>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let mut state = fake.0.lock().unwrap();
    match state.devices.get_mut(&id) {
        Some(device) => {
            if let Some(fields) = body.as_object() {
                for (key, value) in fields {
                    device[key.as_str()] = value.clone();
                }
            }
            ok(json!({ "device": device.clone() }))
        }
        None => failure(StatusCode::NOT_FOUND, "DeviceNotFound", "device not found"),
    }
}

async fn delete_device(State(fake): State<Fake>, Path(id): Path<String>) -> impl IntoResponse {
    let mut state = fake.0.lock().unwrap();
    match state.devices.remove(&id) {
        Some(_) => ok(json!({})),
        None => failure(StatusCode::NOT_FOUND, "DeviceNotFound", "device not found"),
    }
}

async fn restart_device(State(fake): State<Fake>, Path(id): Path<String>) -> impl IntoResponse {
    let state = fake.0.lock().unwrap();
    if state.devices.contains_key(&id) {
        ok(json!({}))
    } else {
        failure(StatusCode::NOT_FOUND, "DeviceNotFound", "device dev404 is offline")
    }
}

async fn device_logs(Path(id): Path<String>) -> impl IntoResponse {
    ok(json!({
        "logs": [{"timestamp": "t1", "type": "status", "message": "online"}],
        "poll_url": format!("/v4/devices/{}/logs/123", id)
    }))
}

async fn continue_logs(Path((id, seq)): Path<(String, u32)>) -> impl IntoResponse {
    ok(json!({
        "logs": [
            {"timestamp": format!("t{}a", seq), "type": "server.log", "message": format!("batch {}", seq)},
            {"timestamp": format!("t{}b", seq), "type": "server.log", "message": "second line"}
        ],
        "poll_url": format!("/v4/devices/{}/logs/{}", id, seq + 1)
    }))
}

fn fake_build_api(fake: Fake) -> Router {
    Router::new()
        .route("/v4/models", get(list_models).post(create_model))
        .route(
            "/v4/models/{id}",
            get(get_model).put(update_model).delete(delete_model),
        )
        .route("/v4/models/{id}/restart", post(restart_model))
        .route(
            "/v4/models/{id}/revisions",
            get(list_revisions).post(create_revision),
        )
        .route("/v4/models/{id}/revisions/{version}", get(get_revision))
        .route("/v4/devices", get(list_devices))
        .route(
            "/v4/devices/{id}",
            get(get_device).put(update_device).delete(delete_device),
        )
        .route("/v4/devices/{id}/restart", post(restart_device))
        .route("/v4/devices/{id}/logs", get(device_logs))
        .route("/v4/devices/{id}/logs/{seq}", get(continue_logs))
        .layer(middleware::from_fn_with_state(fake.clone(), record))
        .with_state(fake)
}

// =============================================================================
// Test Helpers
// =============================================================================

async fn create_test_server() -> (TestServer, Fake) {
    let fake = Fake::seeded();
    let server = TestServer::start(fake_build_api(fake.clone()))
        .await
        .expect("Failed to start test server");
    (server, fake)
}

async fn start_router(router: Router) -> TestServer {
    TestServer::start(router)
        .await
        .expect("Failed to start test server")
}

// =============================================================================
// Transport Tests
// =============================================================================

#[tokio::test]
async fn test_every_request_is_authenticated() {
    let (server, fake) = create_test_server().await;

    server.client.list_models().await.unwrap();
    server
        .client
        .create_model(&Model::named("foo"))
        .await
        .unwrap();
    server.client.get_device("dev1").await.unwrap();

    // base64("test-api-key")
    let expected = "Basic dGVzdC1hcGkta2V5";
    assert_eq!(TEST_API_KEY, "test-api-key");

    let requests = fake.requests();
    assert_eq!(requests.len(), 3);
    for request in &requests {
        assert_eq!(request.authorization.as_deref(), Some(expected));
        assert_eq!(request.content_type.as_deref(), Some("application/json"));
    }
}

#[tokio::test]
async fn test_gateway_timeout_wins_over_body() {
    let router = Router::new().route(
        "/v4/models",
        get(|| async {
            (
                StatusCode::GATEWAY_TIMEOUT,
                Json(json!({"models": [], "success": true})),
            )
        }),
    );
    let server = start_router(router).await;

    let err = server.client.list_models().await.unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_non_json_body_is_decode_error() {
    let router = Router::new().route(
        "/v4/devices",
        get(|| async { (StatusCode::BAD_GATEWAY, "<html>bad gateway</html>") }),
    );
    let server = start_router(router).await;

    let err = server.client.list_devices().await.unwrap_err();
    assert!(matches!(err, BuildClientError::Decode { status: 502, .. }));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let (server, _fake) = create_test_server().await;
    let client = server.client.clone();
    server.shutdown().await;

    let err = client.list_models().await.unwrap_err();
    assert!(matches!(err, BuildClientError::Transport(_)));
}

#[tokio::test]
async fn test_deadline_aborts_call() {
    let router = Router::new().route(
        "/v4/models",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({"models": [], "success": true}))
        }),
    );
    let server = start_router(router).await;

    let ctx = CallContext::new().with_timeout(Duration::from_millis(50));
    let err = server
        .client
        .with_context(ctx)
        .list_models()
        .await
        .unwrap_err();
    assert!(matches!(err, BuildClientError::DeadlineExceeded));
}

#[tokio::test]
async fn test_cancellation_aborts_call() {
    let router = Router::new().route(
        "/v4/devices",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({"devices": [], "success": true}))
        }),
    );
    let server = start_router(router).await;

    let token = CancellationToken::new();
    let client = server
        .client
        .with_context(CallContext::new().with_cancellation(token.clone()));

    let call = tokio::spawn(async move { client.list_devices().await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    token.cancel();

    let err = call.await.unwrap().unwrap_err();
    assert!(matches!(err, BuildClientError::Cancelled));
}

#[tokio::test]
async fn test_context_does_not_leak_to_parent_client() {
    let (server, _fake) = create_test_server().await;

    let token = CancellationToken::new();
    token.cancel();
    let cancelled = server
        .client
        .with_context(CallContext::new().with_cancellation(token));

    assert!(matches!(
        cancelled.list_models().await,
        Err(BuildClientError::Cancelled)
    ));
    assert!(server.client.list_models().await.is_ok());
}

// =============================================================================
// Model Tests
// =============================================================================

#[tokio::test]
async fn test_model_lifecycle() {
    let (server, fake) = create_test_server().await;

    let created = server
        .client
        .create_model(&Model::named("foo"))
        .await
        .unwrap();
    assert_eq!(created.id, "model1");
    assert_eq!(created.name, "foo");
    assert!(created.devices.is_empty());

    let request = fake.last_request();
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/v4/models");

    let renamed = server
        .client
        .update_model(&created.id, &Model::named("bar"))
        .await
        .unwrap();
    assert_eq!(renamed.id, "model1");
    assert_eq!(renamed.name, "bar");
    assert_eq!(fake.last_request().method, Method::PUT);

    let fetched = server.client.get_model("model1").await.unwrap();
    assert_eq!(fetched, renamed);

    let models = server.client.list_models().await.unwrap();
    assert_eq!(models.len(), 1);

    server.client.delete_model("model1").await.unwrap();
    let request = fake.last_request();
    assert_eq!(request.method, Method::DELETE);
    assert_eq!(request.path, "/v4/models/model1");

    assert!(server.client.list_models().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_missing_model_is_api_error() {
    let (server, _fake) = create_test_server().await;

    let err = server.client.get_model("x").await.unwrap_err();
    let api = err.api_error().expect("expected an API error");
    assert_eq!(api.code, "ModelNotFound");
    assert_eq!(api.message_short, "not found");
    assert_eq!(api.message_full, "not found (full)");
}

#[tokio::test]
async fn test_delete_failure_is_generic() {
    let (server, _fake) = create_test_server().await;

    let err = server.client.delete_model("missing").await.unwrap_err();
    assert_eq!(err.api_error(), Some(&ApiError::generic()));
}

#[tokio::test]
async fn test_restart_model_devices() {
    let (server, fake) = create_test_server().await;
    let model = server
        .client
        .create_model(&Model::named("fleet"))
        .await
        .unwrap();

    server.client.restart_model_devices(&model.id).await.unwrap();
    let request = fake.last_request();
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/v4/models/model1/restart");

    let err = server
        .client
        .restart_model_devices("missing")
        .await
        .unwrap_err();
    assert_eq!(err.api_error(), Some(&ApiError::generic()));
}

// =============================================================================
// Code Revision Tests
// =============================================================================

#[tokio::test]
async fn test_revision_upload_and_fetch() {
    let (server, fake) = create_test_server().await;
    let model = server
        .client
        .create_model(&Model::named("fw"))
        .await
        .unwrap();

    let first = server
        .client
        .update_revision(
            &model.id,
            &CodeRevisionLong::upload("server.log(1);", "// agent").with_release_notes("first"),
        )
        .await
        .unwrap();
    assert_eq!(first.version, Some(1));
    assert_eq!(fake.last_request().path, "/v4/models/model1/revisions");

    let second = server
        .client
        .update_revision(&model.id, &CodeRevisionLong::upload("server.log(2);", ""))
        .await
        .unwrap();
    assert_eq!(second.version, Some(2));

    let listed = server.client.list_revisions(&model.id).await.unwrap();
    let versions: Vec<u32> = listed.iter().map(|r| r.version).collect();
    assert_eq!(versions, vec![1, 2]);
    assert_eq!(listed[0].release_notes, "first");

    let fetched = server.client.get_revision(&model.id, 1).await.unwrap();
    assert_eq!(fetched.device_code.as_deref(), Some("server.log(1);"));
    assert_eq!(fake.last_request().path, "/v4/models/model1/revisions/1");
}

#[tokio::test]
async fn test_revision_compile_errors() {
    let (server, _fake) = create_test_server().await;

    let err = server
        .client
        .update_revision(
            "model1",
            &CodeRevisionLong::upload("syntax error here", "http.onrequest()"),
        )
        .await
        .unwrap_err();

    let api = err.api_error().expect("expected an API error");
    assert_eq!(api.code, "CompileFailed");

    let diagnostics: Vec<_> = api.diagnostics().collect();
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics[0].0, CodeTarget::Device);
    assert_eq!(diagnostics[0].1.row, 3);
    assert_eq!(diagnostics[0].1.column, 14);
    assert_eq!(diagnostics[1].0, CodeTarget::Agent);
    assert_eq!(diagnostics[1].1.error, "unknown identifier 'http'");
}

#[tokio::test]
async fn test_missing_revision() {
    let (server, _fake) = create_test_server().await;

    let err = server.client.get_revision("model1", 9).await.unwrap_err();
    assert_eq!(err.api_error().unwrap().message_short, "no such revision");
}

// =============================================================================
// Device Tests
// =============================================================================

#[tokio::test]
async fn test_list_and_get_devices() {
    let (server, _fake) = create_test_server().await;

    let devices = server.client.list_devices().await.unwrap();
    assert_eq!(devices.len(), 2);

    let device = server.client.get_device("dev1").await.unwrap();
    assert_eq!(device.name.as_deref(), Some("porch light"));
    assert_eq!(device.power_state.as_deref(), Some("online"));
    assert_eq!(device.rssi, Some(-58));
    assert_eq!(device.assigned_model(), None);

    let garage = server.client.get_device("dev2").await.unwrap();
    assert!(garage.agent_id.is_none());
}

#[tokio::test]
async fn test_assign_device_to_model() {
    let (server, fake) = create_test_server().await;

    let device = server
        .client
        .update_device("dev1", &Device::assign_to("model7"))
        .await
        .unwrap();
    assert_eq!(device.assigned_model(), Some("model7"));
    // Unset fields were not sent, so the name survives
    assert_eq!(device.name.as_deref(), Some("porch light"));

    let request = fake.last_request();
    assert_eq!(request.method, Method::PUT);
    assert_eq!(request.path, "/v4/devices/dev1");
}

#[tokio::test]
async fn test_delete_device() {
    let (server, _fake) = create_test_server().await;

    server.client.delete_device("dev2").await.unwrap();
    assert_eq!(server.client.list_devices().await.unwrap().len(), 1);

    let err = server.client.delete_device("dev2").await.unwrap_err();
    assert_eq!(err.api_error(), Some(&ApiError::generic()));
}

#[tokio::test]
async fn test_restart_device() {
    let (server, fake) = create_test_server().await;

    server.client.restart_device("dev1").await.unwrap();
    let request = fake.last_request();
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/v4/devices/dev1/restart");

    // The server's message is not surfaced for restarts
    let err = server.client.restart_device("dev404").await.unwrap_err();
    let api = err.api_error().unwrap();
    assert_eq!(api, &ApiError::generic());
    assert!(!api.message_short.contains("dev404"));
}

// =============================================================================
// Log Polling Tests
// =============================================================================

#[tokio::test]
async fn test_get_device_logs() {
    let (server, fake) = create_test_server().await;

    let batch = server.client.get_device_logs("dev1").await.unwrap();
    assert_eq!(batch.entries.len(), 1);
    assert_eq!(batch.entries[0].timestamp, "t1");
    assert_eq!(batch.entries[0].log_type, "status");
    assert_eq!(batch.entries[0].message, "online");
    assert_eq!(batch.poll_url.as_str(), "/v4/devices/dev1/logs/123");
    assert_eq!(fake.last_request().path, "/v4/devices/dev1/logs");
}

#[tokio::test]
async fn test_continue_logs_with_and_without_slash() {
    let (server, fake) = create_test_server().await;

    for cursor in ["/v4/devices/dev1/logs/123", "v4/devices/dev1/logs/123"] {
        let batch = server
            .client
            .continue_device_logs(&PollCursor::new(cursor))
            .await
            .unwrap();
        assert_eq!(batch.entries[0].message, "batch 123");
        assert_eq!(batch.poll_url.as_str(), "/v4/devices/dev1/logs/124");

        let request = fake.last_request();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "/v4/devices/dev1/logs/123");
    }
}

#[tokio::test]
async fn test_cursor_resolves_against_base_host() {
    // API calls and poll cursors go to different servers
    let api_fake = Fake::seeded();
    let api_server = start_router(fake_build_api(api_fake.clone())).await;
    let base_fake = Fake::seeded();
    let base_server = start_router(fake_build_api(base_fake.clone())).await;

    let config = ClientConfig::builder()
        .api_url(format!("{}/v4/", api_server.base_url()))
        .base_url(base_server.base_url())
        .build();
    let client = BuildClient::with_config("key", config).unwrap();

    let first = client.get_device_logs("dev1").await.unwrap();
    client.continue_device_logs(&first.poll_url).await.unwrap();

    let api_paths: Vec<String> = api_fake.requests().into_iter().map(|r| r.path).collect();
    let base_paths: Vec<String> = base_fake.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(api_paths, vec!["/v4/devices/dev1/logs"]);
    assert_eq!(base_paths, vec!["/v4/devices/dev1/logs/123"]);
}

#[tokio::test]
async fn test_log_session_follows_cursor() {
    let (server, fake) = create_test_server().await;
    let mut session = server.client.log_session("dev1");

    let first = session.next_batch().await.unwrap();
    assert_eq!(first.entries.len(), 1);
    assert_eq!(
        session.cursor().map(|c| c.as_str()),
        Some("/v4/devices/dev1/logs/123")
    );

    let second = session.next_batch().await.unwrap();
    assert_eq!(second.entries.len(), 2);
    let third = session.next_batch().await.unwrap();
    assert_eq!(third.entries[0].message, "batch 124");

    let paths: Vec<String> = fake.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(
        paths,
        vec![
            "/v4/devices/dev1/logs",
            "/v4/devices/dev1/logs/123",
            "/v4/devices/dev1/logs/124",
        ]
    );
}

#[tokio::test]
async fn test_log_session_keeps_cursor_on_error() {
    let router = Router::new()
        .route(
            "/v4/devices/{id}/logs",
            get(|| async {
                Json(json!({"logs": [], "poll_url": "/v4/devices/dev1/logs/1", "success": true}))
            }),
        )
        .route(
            "/v4/devices/{id}/logs/{seq}",
            get(|| async { (StatusCode::GATEWAY_TIMEOUT, "") }),
        );
    let server = start_router(router).await;
    let mut session = server.client.log_session("dev1");

    session.next_batch().await.unwrap();
    let err = session.next_batch().await.unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(
        session.cursor().map(|c| c.as_str()),
        Some("/v4/devices/dev1/logs/1")
    );
}

#[tokio::test]
async fn test_log_failure_envelope() {
    let router = Router::new().route(
        "/v4/devices/{id}/logs",
        get(|| async { failure(StatusCode::OK, "DeviceNotFound", "device not found") }),
    );
    let server = start_router(router).await;

    let err = server.client.get_device_logs("nope").await.unwrap_err();
    assert_eq!(err.api_error().unwrap().message_short, "device not found");
}

#[tokio::test]
async fn test_headers_include_json_content_type_on_bodies() {
    let (server, fake) = create_test_server().await;
    server
        .client
        .update_device("dev2", &Device::rename("shed"))
        .await
        .unwrap();

    let request = fake.last_request();
    assert_eq!(request.method, Method::PUT);
    assert_eq!(request.content_type.as_deref(), Some("application/json"));
}
