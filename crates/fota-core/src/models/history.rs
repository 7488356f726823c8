//! Device firmware history

use serde::{Deserialize, Serialize};

/// One entry of `GET /api/fota/device/{uid}/history`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub previous_firmware_version: String,
    pub current_firmware_version: String,
    pub updated_by: String,
    pub firmware_type: String,
    pub updated_time: String,
    pub status: String,
}
