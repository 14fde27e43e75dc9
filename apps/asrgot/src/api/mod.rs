//! # ASR-GoT HTTP API Module
//!
//! HTTP REST API over one shared [`ResearchSession`], built on axum.
//!
//! ## Endpoints
//!
//! - `POST /initialize` - Stage 1, create the root node
//! - `POST /decompose` - Stage 2, create dimension nodes
//! - `POST /hypotheses` - Stage 3, attach hypotheses to a dimension
//! - `GET /summary` - Graph summary
//! - `POST /export` - Export as JSON or YAML
//! - `GET /stage` - Stage table, next operation and transition trace
//! - `GET /parameters` - Framework parameter catalog
//! - `GET /hash` - BLAKE3 checksum of the graph
//! - `GET /health` - Health check
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `ASRGOT_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `ASRGOT_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `ASRGOT_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod types;

pub use auth::get_api_key_from_env;
pub use middleware::{create_rate_limiter, get_rate_limit_from_env};
pub use handlers::{
    decompose_handler, export_handler, hash_handler, health_handler, hypotheses_handler,
    initialize_handler, parameters_handler, stage_handler, summary_handler,
};
pub use types::{
    ExportRequest, HashResponse, HealthResponse, ParametersResponse, status_for, status_for_kind,
};

use asrgot_core::{AsrGotError, ResearchSession};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Request bodies above this size are rejected.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<RwLock<ResearchSession>>,
}

impl AppState {
    #[must_use]
    pub fn new(session: ResearchSession) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build the CORS layer from `ASRGOT_CORS_ORIGINS`.
///
/// `*` allows every origin, a comma-separated list allows those origins, and
/// an unset or unusable value falls back to localhost.
fn build_cors_layer() -> CorsLayer {
    match std::env::var("ASRGOT_CORS_ORIGINS").ok().as_deref() {
        Some("*") => {
            tracing::warn!("CORS: allowing all origins (ASRGOT_CORS_ORIGINS=*)");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .filter_map(|o| match o.parse::<HeaderValue>() {
                    Ok(value) => {
                        tracing::info!("CORS: allowing origin {}", o);
                        Some(value)
                    }
                    Err(e) => {
                        tracing::warn!("CORS: invalid origin '{}': {}", o, e);
                        None
                    }
                })
                .collect();

            if allowed.is_empty() {
                tracing::warn!("CORS: no valid origins in ASRGOT_CORS_ORIGINS, using localhost");
                build_localhost_cors()
            } else {
                restricted_cors(allowed)
            }
        }
        None => build_localhost_cors(),
    }
}

fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();
    restricted_cors(origins)
}

fn restricted_cors(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the router with every endpoint and middleware.
///
/// Middleware, outer to inner: tracing, CORS, body limit, rate limiting
/// (when enabled), authentication (when `ASRGOT_API_KEY` is set).
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/stage", get(handlers::stage_handler))
        .route("/parameters", get(handlers::parameters_handler))
        .route("/summary", get(handlers::summary_handler))
        .route("/hash", get(handlers::hash_handler))
        .route("/initialize", post(handlers::initialize_handler))
        .route("/decompose", post(handlers::decompose_handler))
        .route("/hypotheses", post(handlers::hypotheses_handler))
        .route("/export", post(handlers::export_handler));

    if get_api_key_from_env().is_some() {
        tracing::info!("API key authentication enabled");
        router = router.layer(axum_middleware::from_fn(auth::api_key_auth_middleware));
    } else {
        tracing::warn!(
            "API key authentication disabled; set ASRGOT_API_KEY to require a bearer token"
        );
    }

    let rate_limit = get_rate_limit_from_env();
    if rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
        router = router.layer(axum_middleware::from_fn_with_state(
            create_rate_limiter(rate_limit),
            middleware::rate_limit_middleware,
        ));
    } else {
        tracing::info!("Rate limiting disabled");
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer())
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Bind `addr` and serve the API until the process stops.
pub async fn run_server(addr: &str, session: ResearchSession) -> Result<(), AsrGotError> {
    let router = create_router(AppState::new(session));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AsrGotError::IoError(format!("Bind failed: {e}")))?;

    tracing::info!("ASR-GoT HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AsrGotError::IoError(format!("Server error: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
