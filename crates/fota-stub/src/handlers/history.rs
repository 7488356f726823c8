//! Device history handler

use axum::extract::{Path, State};
use axum::Json;
use fota_core::HistoryEntry;

use crate::error::ApiError;
use crate::state::StubState;

/// GET /api/fota/device/{uid}/history
pub async fn device_history(
    State(state): State<StubState>,
    Path(uid): Path<String>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    if state.device(&uid).is_none() {
        return Err(ApiError::NotFound(format!("unknown device {}", uid)));
    }
    let entries = state
        .jobs()
        .history(&uid)
        .map(<[HistoryEntry]>::to_vec)
        .unwrap_or_default();
    Ok(Json(entries))
}
