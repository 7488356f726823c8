//! Paginated listings: available updates and jobs

use std::cmp::Ordering;

use axum::extract::{Query, State};
use axum::Json;
use fota_core::{AvailableUpdateDevice, JobRecord};

use crate::error::ApiError;
use crate::pagination::ListParams;
use crate::state::{StubDevice, StubState};

/// Sortable fields of `available_updates`; the first is the default
pub const DEVICE_SORT_FIELDS: &[&str] = &["uid", "serial", "label", "deviceType", "country"];

/// Sortable fields of `jobs`; the first is the default
pub const JOB_SORT_FIELDS: &[&str] = &[
    "id",
    "created_at",
    "updated_at",
    "serial",
    "uid",
    "state",
    "version",
];

fn device_row(device: &StubDevice) -> AvailableUpdateDevice {
    AvailableUpdateDevice {
        uid: device.uid.clone(),
        serial: device.serial.clone(),
        label: device.label.clone(),
        is_online: device.online,
        in_service: device.in_service,
        device_type: device.device_type.clone(),
        country: device.country.clone(),
        available_updates: device.updates.clone(),
        selectable: device.selectable(),
        selectable_reason: device.selectable_reason().to_string(),
    }
}

fn device_field<'a>(row: &'a AvailableUpdateDevice, field: &str) -> &'a str {
    match field {
        "serial" => &row.serial,
        "label" => &row.label,
        "deviceType" => &row.device_type,
        "country" => &row.country,
        _ => &row.uid,
    }
}

fn compare_jobs(a: &JobRecord, b: &JobRecord, field: &str) -> Ordering {
    let by_field = match field {
        "created_at" => a.created_at.cmp(&b.created_at),
        "updated_at" => a.updated_at.cmp(&b.updated_at),
        "serial" => a.serial.cmp(&b.serial),
        "uid" => a.uid.cmp(&b.uid),
        "state" => a.state.as_str().cmp(b.state.as_str()),
        "version" => a.version.cmp(&b.version),
        _ => Ordering::Equal,
    };
    by_field.then_with(|| a.id.cmp(&b.id))
}

/// GET /api/fota/available_updates
pub async fn available_updates(
    State(state): State<StubState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<AvailableUpdateDevice>>, ApiError> {
    let request = params.validate(DEVICE_SORT_FIELDS)?;

    let rows: Vec<AvailableUpdateDevice> = state
        .devices()
        .iter()
        .filter(|d| request.matches(&[d.uid.as_str(), d.serial.as_str()]))
        .map(device_row)
        .collect();

    let rows = request.apply(rows, |a, b| {
        device_field(a, &request.sort)
            .cmp(device_field(b, &request.sort))
            .then_with(|| a.uid.cmp(&b.uid))
    });
    Ok(Json(rows))
}

/// GET /api/fota/jobs
pub async fn list_jobs(
    State(state): State<StubState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<JobRecord>>, ApiError> {
    let request = params.validate(JOB_SORT_FIELDS)?;

    let records: Vec<JobRecord> = state
        .jobs()
        .records()
        .filter(|job| request.matches(&[job.uid.as_str(), job.serial.as_str()]))
        .cloned()
        .collect();

    let records = request.apply(records, |a, b| compare_jobs(a, b, &request.sort));
    Ok(Json(records))
}
