//! Integration tests for the ASR-GoT HTTP API.
//!
//! Uses axum-test to drive the router without binding a socket.

// Auth tests hold a std MutexGuard across awaits to serialize env var changes.
#![allow(clippy::unwrap_used, clippy::panic, clippy::await_holding_lock)]

use asrgot::api::{AppState, HashResponse, HealthResponse, create_router};
use asrgot_core::ResearchSession;
use axum::http::{HeaderValue, StatusCode, header};
use axum_test::TestServer;
use serde_json::{Value, json};
use std::sync::Mutex;

/// Serializes tests that read or write `ASRGOT_API_KEY`.
static AUTH_TEST_MUTEX: Mutex<()> = Mutex::new(());

const TASK: &str = "Investigate the role of skin microbiome in disease";

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

struct TestGuard {
    _guard: std::sync::MutexGuard<'static, ()>,
}

impl Drop for TestGuard {
    fn drop(&mut self) {
        // SAFETY: env access is serialized by AUTH_TEST_MUTEX.
        unsafe { std::env::remove_var("ASRGOT_API_KEY") };
    }
}

fn lock() -> std::sync::MutexGuard<'static, ()> {
    AUTH_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner())
}

/// Server over a fresh session, without authentication.
fn create_test_server() -> (TestServer, TestGuard) {
    let guard = lock();
    // SAFETY: env access is serialized by AUTH_TEST_MUTEX.
    unsafe { std::env::remove_var("ASRGOT_API_KEY") };
    let router = create_router(AppState::new(ResearchSession::new()));
    (TestServer::new(router).unwrap(), TestGuard { _guard: guard })
}

/// Server requiring `api_key`; the guard clears the key on drop.
fn create_auth_test_server(api_key: &str) -> (TestServer, TestGuard) {
    let guard = lock();
    // SAFETY: env access is serialized by AUTH_TEST_MUTEX.
    unsafe { std::env::set_var("ASRGOT_API_KEY", api_key) };
    let router = create_router(AppState::new(ResearchSession::new()));
    (TestServer::new(router).unwrap(), TestGuard { _guard: guard })
}

async fn initialize(server: &TestServer) -> Value {
    let response = server
        .post("/initialize")
        .json(&json!({
            "task_description": TASK,
            "initial_confidence": [0.8, 0.7, 0.9, 0.6]
        }))
        .await;
    response.assert_status_ok();
    response.json()
}

async fn decompose(server: &TestServer) -> Value {
    let response = server.post("/decompose").json(&json!({})).await;
    response.assert_status_ok();
    response.json()
}

// =============================================================================
// HEALTH
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (server, _guard) = create_test_server();

    let response = server.get("/health").await;
    response.assert_status_ok();

    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// STAGE PIPELINE
// =============================================================================

#[tokio::test]
async fn test_initialize_creates_root() {
    let (server, _guard) = create_test_server();

    let body = initialize(&server).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["operation"], "initialize");
    assert_eq!(body["current_stage"], 1);
    assert_eq!(body["root_node_id"], "n0");
    assert_eq!(body["initial_confidence"], json!([0.8, 0.7, 0.9, 0.6]));
}

#[tokio::test]
async fn test_full_pipeline() {
    let (server, _guard) = create_test_server();

    initialize(&server).await;

    let body = decompose(&server).await;
    assert_eq!(body["current_stage"], 2);
    assert_eq!(body["dimension_node_ids"].as_array().map(Vec::len), Some(7));
    assert_eq!(body["dimension_node_ids"][0], "2.1");

    let response = server
        .post("/hypotheses")
        .json(&json!({
            "dimension_node_id": "2.6",
            "hypotheses": ["H1 text", "H2 text", "H3 text"]
        }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["current_stage"], 3);
    assert_eq!(body["hypotheses_created"], 3);

    let summary: Value = server.get("/summary").await.json();
    assert_eq!(summary["graph_state"]["vertices_count"], 11);
    assert_eq!(summary["graph_state"]["edges_count"], 10);
    assert_eq!(summary["graph_state"]["current_stage"], 3);

    let stage: Value = server.get("/stage").await.json();
    assert_eq!(stage["current_stage"], 3);
    assert_eq!(stage["next_operation"], "integrate_evidence");
    assert_eq!(stage["next_operation_available"], false);
    assert_eq!(stage["trace"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn test_decompose_before_initialize_is_conflict() {
    let (server, _guard) = create_test_server();

    let response = server.post("/decompose").json(&json!({})).await;
    response.assert_status(StatusCode::CONFLICT);

    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error_kind"], "wrong_stage");
    assert_eq!(body["current_stage"], 0);
}

#[tokio::test]
async fn test_short_description_is_bad_request() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/initialize")
        .json(&json!({ "task_description": "short" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error_kind"], "invalid_parameter");
    assert_eq!(body["validation"]["field"], "task_description");
    assert_eq!(body["recovery_attempted"], true);
}

#[tokio::test]
async fn test_unknown_dimension_is_not_found() {
    let (server, _guard) = create_test_server();
    initialize(&server).await;
    decompose(&server).await;

    let response = server
        .post("/hypotheses")
        .json(&json!({
            "dimension_node_id": "2.99",
            "hypotheses": ["H1 text", "H2 text", "H3 text"]
        }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let body: Value = response.json();
    assert_eq!(body["error_kind"], "missing_node");
    assert_eq!(body["current_stage"], 2);
}

// =============================================================================
// EXPORT & HASH
// =============================================================================

#[tokio::test]
async fn test_export_json_and_yaml() {
    let (server, _guard) = create_test_server();
    initialize(&server).await;

    let response = server.post("/export").json(&json!({ "format": "json" })).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["format"], "json");
    let document: Value = serde_json::from_str(body["content"].as_str().unwrap()).unwrap();
    assert_eq!(document["nodes"].as_array().map(Vec::len), Some(1));

    let response = server.post("/export").json(&json!({ "format": "yaml" })).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["content"].as_str().unwrap().contains(TASK));
}

#[tokio::test]
async fn test_export_unknown_format_is_bad_request() {
    let (server, _guard) = create_test_server();

    let response = server.post("/export").json(&json!({ "format": "xml" })).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["validation"]["field"], "format");
}

#[tokio::test]
async fn test_hash_is_stable_across_reads() {
    let (server, _guard) = create_test_server();
    initialize(&server).await;

    let first: HashResponse = server.get("/hash").await.json();
    let second: HashResponse = server.get("/hash").await.json();

    assert!(first.success);
    assert_eq!(first.algorithm, "blake3");
    assert_eq!(first.hash.as_ref().map(String::len), Some(64));
    assert_eq!(first.hash, second.hash);
    assert_eq!(first.node_count, 1);
}

#[tokio::test]
async fn test_parameters_catalog() {
    let (server, _guard) = create_test_server();

    let body: Value = server.get("/parameters").await.json();
    assert_eq!(body["count"], 28);
    assert_eq!(body["parameters"][27]["code"], "P1.27");
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

#[tokio::test]
async fn test_404_on_unknown_endpoint() {
    let (server, _guard) = create_test_server();
    server.get("/unknown").await.assert_status_not_found();
}

#[tokio::test]
async fn test_method_not_allowed() {
    let (server, _guard) = create_test_server();
    let response = server.post("/health").await;
    assert_eq!(response.status_code().as_u16(), 405);
}

#[tokio::test]
async fn test_invalid_json_body() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/initialize")
        .text("not valid json")
        .content_type("application/json")
        .await;
    assert!(response.status_code().is_client_error());
}

// =============================================================================
// AUTHENTICATION
// =============================================================================

#[tokio::test]
async fn test_auth_valid_bearer_token() {
    let api_key = "test-secret-key-12345";
    let (server, _guard) = create_auth_test_server(api_key);

    let response = server
        .get("/stage")
        .add_header(
            header::AUTHORIZATION,
            format!("Bearer {api_key}").parse::<HeaderValue>().unwrap(),
        )
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_auth_valid_raw_token() {
    let api_key = "test-raw-key-67890";
    let (server, _guard) = create_auth_test_server(api_key);

    let response = server
        .get("/stage")
        .add_header(header::AUTHORIZATION, api_key.parse::<HeaderValue>().unwrap())
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_auth_invalid_token_rejected() {
    let (server, _guard) = create_auth_test_server("correct-key");

    let response = server
        .post("/initialize")
        .add_header(
            header::AUTHORIZATION,
            "Bearer wrong-key".parse::<HeaderValue>().unwrap(),
        )
        .json(&json!({ "task_description": TASK }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_missing_header_rejected() {
    let (server, _guard) = create_auth_test_server("correct-key");
    server.get("/summary").await.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_health_always_open() {
    let (server, _guard) = create_auth_test_server("correct-key");
    server.get("/health").await.assert_status_ok();
}
