//! Signed firmware download handler

use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::error::ApiError;
use crate::signing;
use crate::state::StubState;

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    pub id: Option<String>,
    pub exp: Option<String>,
    pub sig: Option<String>,
}

fn required<T: std::str::FromStr>(name: &str, value: Option<&str>) -> Result<T, ApiError> {
    value
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| ApiError::BadRequest(format!("missing or invalid '{}'", name)))
}

/// GET /api/fota/firmware/download/{file}?id&exp&sig
///
/// Checked in order: parameters present (400), file known (404), link not
/// expired (401), signature valid (403).
pub async fn firmware_download(
    State(state): State<StubState>,
    Path(file): Path<String>,
    Query(params): Query<DownloadParams>,
) -> Result<Response, ApiError> {
    let id: u64 = required("id", params.id.as_deref())?;
    let exp: i64 = required("exp", params.exp.as_deref())?;
    let sig: String = required("sig", params.sig.as_deref())?;

    let firmware = state
        .file(&file)
        .ok_or_else(|| ApiError::NotFound(format!("no firmware file {}", file)))?;

    if exp <= chrono::Utc::now().timestamp() {
        return Err(ApiError::Unauthorized("download link expired".to_string()));
    }
    if !signing::verify(&state.config().signing_key, &file, id, exp, &sig) {
        return Err(ApiError::Forbidden("signature verification failed".to_string()));
    }

    tracing::debug!(%file, id, bytes = firmware.content.len(), "Serving firmware");
    Ok(([(CONTENT_TYPE, "application/octet-stream")], firmware.content.clone()).into_response())
}
