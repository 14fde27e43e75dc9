//! # API Request/Response Types
//!
//! JSON structures specific to the HTTP API. Operation requests and results
//! are the engine's own types (`InitializeRequest`, `OperationResult`, ...).

use asrgot_core::parameters::{CATALOG_VERSION, ParameterInfo, catalog};
use asrgot_core::{ErrorKind, OperationResult};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// EXPORT REQUEST
// =============================================================================

/// Export request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
    #[serde(default = "default_export_format")]
    pub format: String,
}

impl Default for ExportRequest {
    fn default() -> Self {
        Self {
            format: default_export_format(),
        }
    }
}

fn default_export_format() -> String {
    "json".to_string()
}

// =============================================================================
// PARAMETERS RESPONSE
// =============================================================================

/// The framework parameter catalog.
#[derive(Debug, Clone, Serialize)]
pub struct ParametersResponse {
    pub catalog_version: String,
    pub count: usize,
    pub parameters: Vec<ParameterInfo>,
}

impl ParametersResponse {
    /// The full catalog.
    #[must_use]
    pub fn current() -> Self {
        let parameters = catalog();
        Self {
            catalog_version: CATALOG_VERSION.to_string(),
            count: parameters.len(),
            parameters,
        }
    }
}

// =============================================================================
// HASH RESPONSE
// =============================================================================

/// BLAKE3 checksum of the graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashResponse {
    pub success: bool,
    pub algorithm: String,
    pub hash: Option<String>,
    pub node_count: usize,
    pub edge_count: usize,
    pub current_stage: u8,
    pub error: Option<String>,
}

impl HashResponse {
    /// Create a successful response.
    #[must_use]
    pub fn success(hash: String, node_count: usize, edge_count: usize, current_stage: u8) -> Self {
        Self {
            success: true,
            algorithm: "blake3".to_string(),
            hash: Some(hash),
            node_count,
            edge_count,
            current_stage,
            error: None,
        }
    }

    /// Create an error response.
    #[must_use]
    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            algorithm: "blake3".to_string(),
            hash: None,
            node_count: 0,
            edge_count: 0,
            current_stage: 0,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// STATUS MAPPING
// =============================================================================

/// HTTP status for an error kind.
#[must_use]
pub fn status_for_kind(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidParameter => StatusCode::BAD_REQUEST,
        ErrorKind::WrongStage => StatusCode::CONFLICT,
        ErrorKind::MissingNode => StatusCode::NOT_FOUND,
        ErrorKind::Internal | ErrorKind::Critical => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// HTTP status for an operation result.
#[must_use]
pub fn status_for<T>(result: &OperationResult<T>) -> StatusCode {
    match result.error_kind {
        None => StatusCode::OK,
        Some(kind) => status_for_kind(kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_distinct_statuses() {
        assert_eq!(status_for_kind(ErrorKind::InvalidParameter), StatusCode::BAD_REQUEST);
        assert_eq!(status_for_kind(ErrorKind::WrongStage), StatusCode::CONFLICT);
        assert_eq!(status_for_kind(ErrorKind::MissingNode), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for_kind(ErrorKind::Critical),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn parameters_response_lists_catalog() {
        let response = ParametersResponse::current();
        assert_eq!(response.count, 28);
        assert_eq!(response.parameters[0].code, "P1.0");
    }
}
