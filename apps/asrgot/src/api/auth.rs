//! # Authentication
//!
//! Optional bearer-token check for the ASR-GoT HTTP API.
//!
//! When `ASRGOT_API_KEY` is set, every route except `/health` requires
//! `Authorization: Bearer <key>`; a bare key without the prefix is accepted too.

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

/// The configured key, or `None` when `ASRGOT_API_KEY` is unset or empty.
pub fn get_api_key_from_env() -> Option<String> {
    std::env::var("ASRGOT_API_KEY").ok().filter(|k| !k.is_empty())
}

/// Compare two keys in time independent of where they differ.
///
/// Both sides are zero-padded to a common length before `ct_eq`.
fn keys_match(provided: &[u8], expected: &[u8]) -> bool {
    let len = provided.len().max(expected.len());
    let mut lhs = vec![0u8; len];
    let mut rhs = vec![0u8; len];
    lhs[..provided.len()].copy_from_slice(provided);
    rhs[..expected.len()].copy_from_slice(expected);
    let equal: bool = lhs.ct_eq(&rhs).into();
    equal && provided.len() == expected.len()
}

/// Reject requests without the configured key.
pub async fn api_key_auth_middleware(
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    let Some(expected) = get_api_key_from_env() else {
        return Ok(next.run(request).await);
    };

    if request.uri().path() == "/health" {
        return Ok(next.run(request).await);
    }

    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.strip_prefix("Bearer ").unwrap_or(v));

    match provided {
        Some(key) if keys_match(key.as_bytes(), expected.as_bytes()) => Ok(next.run(request).await),
        Some(_) => {
            tracing::warn!(
                event = "auth_failure",
                reason = "invalid_api_key",
                path = %request.uri().path(),
                "Rejected request with invalid API key"
            );
            Err((StatusCode::UNAUTHORIZED, "Unauthorized"))
        }
        None => {
            tracing::warn!(
                event = "auth_failure",
                reason = "missing_authorization_header",
                path = %request.uri().path(),
                "Rejected request without Authorization header"
            );
            Err((StatusCode::UNAUTHORIZED, "Unauthorized"))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
