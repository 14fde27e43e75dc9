//! # API Endpoint Handlers
//!
//! Mutating operations take the session's write lock; reports take the
//! read lock. Every operation answers with its `OperationResult` and a status
//! derived from the error kind.

use super::{
    AppState,
    types::{ExportRequest, HashResponse, HealthResponse, ParametersResponse, status_for},
};
use asrgot_core::{DecomposeRequest, HypothesesRequest, InitializeRequest, export::graph_checksum};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// STAGE OPERATIONS
// =============================================================================

/// Stage 1: create the root node.
pub async fn initialize_handler(
    State(state): State<AppState>,
    Json(request): Json<InitializeRequest>,
) -> impl IntoResponse {
    let result = state.session.write().await.initialize(&request);
    (status_for(&result), Json(result))
}

/// Stage 2: create the dimension nodes.
pub async fn decompose_handler(
    State(state): State<AppState>,
    Json(request): Json<DecomposeRequest>,
) -> impl IntoResponse {
    let result = state.session.write().await.decompose(&request);
    (status_for(&result), Json(result))
}

/// Stage 3: attach hypotheses to one dimension.
pub async fn hypotheses_handler(
    State(state): State<AppState>,
    Json(request): Json<HypothesesRequest>,
) -> impl IntoResponse {
    let result = state.session.write().await.generate_hypotheses(&request);
    (status_for(&result), Json(result))
}

// =============================================================================
// REPORTS
// =============================================================================

/// Graph summary.
pub async fn summary_handler(State(state): State<AppState>) -> impl IntoResponse {
    let result = state.session.read().await.summary();
    (status_for(&result), Json(result))
}

/// Export the graph.
pub async fn export_handler(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> impl IntoResponse {
    let result = state.session.read().await.export(&request.format);
    (status_for(&result), Json(result))
}

/// Stage table and transition trace.
pub async fn stage_handler(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.session.read().await.stage_report();
    (StatusCode::OK, Json(report))
}

/// Framework parameter catalog.
pub async fn parameters_handler() -> impl IntoResponse {
    Json(ParametersResponse::current())
}

// =============================================================================
// HASH HANDLER
// =============================================================================

/// BLAKE3 checksum of the graph, stable across exports.
pub async fn hash_handler(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;
    match graph_checksum(session.graph(), session.cursor()) {
        Ok(hash) => (
            StatusCode::OK,
            Json(HashResponse::success(
                hash,
                session.graph().node_count(),
                session.graph().edge_count(),
                session.stage().index(),
            )),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(HashResponse::error(format!("Hash failed: {e}"))),
        ),
    }
}
