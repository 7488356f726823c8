//! Bearer token authentication middleware
//!
//! Applied as a route layer, so unknown paths answer 404 before any
//! credential check. Signed firmware downloads are routed outside it.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::state::StubState;

/// Require `Authorization: Bearer <token>` with the configured token
pub async fn require_bearer(
    State(state): State<StubState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|token| token == state.config().token);

    match provided {
        Some(true) => Ok(next.run(request).await),
        Some(false) => {
            tracing::warn!(path = %request.uri().path(), "Invalid bearer token");
            Err(ApiError::Unauthorized("invalid or expired token".to_string()))
        }
        None => {
            tracing::warn!(
                path = %request.uri().path(),
                "Missing or malformed Authorization header"
            );
            Err(ApiError::Unauthorized("missing bearer token".to_string()))
        }
    }
}
