//! Device-level models: available updates and bulk-create results

use serde::{Deserialize, Serialize};

use super::id::numeric_id;
use super::job::BulkJob;

/// Reason the service reports for an offline device
pub const REASON_DEVICE_OFFLINE: &str = "DEVICE_OFFLINE";

/// One row of `GET /api/fota/available_updates`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableUpdateDevice {
    pub uid: String,
    pub serial: String,
    pub label: String,
    pub is_online: bool,
    pub in_service: bool,
    pub device_type: String,
    pub country: String,
    pub available_updates: Vec<AvailableUpdate>,
    pub selectable: bool,
    pub selectable_reason: String,
}

impl AvailableUpdateDevice {
    /// A device that cannot be selected must say why
    pub fn selectable_reason_consistent(&self) -> bool {
        self.selectable || !self.selectable_reason.is_empty()
    }

    /// Update ids offered for this device, in response order
    pub fn update_ids(&self) -> Vec<u64> {
        self.available_updates.iter().map(|u| u.id).collect()
    }
}

/// Firmware update offered for a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableUpdate {
    #[serde(deserialize_with = "numeric_id")]
    pub id: u64,
    pub version: String,
    #[serde(rename = "type")]
    pub update_type: String,
    pub selectable: bool,
}

/// Pre-flight checks the service ran before queueing a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckDetail {
    pub is_online: bool,
    pub is_in_service: bool,
    pub is_key_switch_operational: bool,
}

/// Device entry in the `POST /api/fota/jobs/bulk` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDevice {
    pub uid: String,
    pub serial: String,
    #[serde(default)]
    pub key_switch_state: i64,
    pub is_online: bool,
    pub in_service: bool,
    #[serde(rename = "type")]
    pub device_type: String,
    pub country: String,
    #[serde(default)]
    pub main_hardware: String,
    #[serde(default)]
    pub main_firmware: String,
    pub check_detail: CheckDetail,
    pub check_passed: bool,
    pub jobs: Vec<BulkJob>,
}
