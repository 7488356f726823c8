//! Job creation and job actions

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use fota_core::{
    AvailableUpdate, BulkDevice, BulkJob, CheckDetail, JobActionResult, JobState, JobSummary,
    UpdateJobsResponse,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::{StubDevice, StubState};
use crate::store::JobStore;

// Request bodies take strictly numeric ids; a string id is a 400.

#[derive(Debug, Deserialize)]
pub struct BulkBody {
    pub updates: Vec<u64>,
}

#[derive(Debug, Deserialize)]
pub struct JobIdsBody {
    pub job_ids: Vec<u64>,
}

#[derive(Debug, Deserialize)]
pub struct RetryBody {
    pub jobs: Vec<u64>,
}

fn non_empty(ids: &[u64], field: &str) -> Result<(), ApiError> {
    if ids.is_empty() {
        return Err(ApiError::BadRequest(format!("'{}' must not be empty", field)));
    }
    Ok(())
}

fn ensure_known(store: &JobStore, ids: &[u64]) -> Result<(), ApiError> {
    match ids.iter().find(|id| store.get(**id).is_none()) {
        Some(id) => Err(ApiError::NotFound(format!("unknown job {}", id))),
        None => Ok(()),
    }
}

/// Which state a job action reports back
#[derive(Clone, Copy)]
enum Report {
    /// The state the job is in after the action
    After,
    /// The state the job was in when the action was applied
    Before,
}

fn apply_action(
    store: &mut JobStore,
    ids: &[u64],
    eligible: impl Fn(&JobState) -> bool,
    next: JobState,
    report: Report,
) -> Vec<JobActionResult> {
    ids.iter()
        .filter_map(|&id| {
            let current = store.get(id)?.record.clone();
            if !eligible(&current.state) {
                return Some(JobActionResult {
                    id: current.id,
                    uid: current.uid,
                    state: current.state,
                    successful: false,
                });
            }
            let previous = store.transition(id, next.clone())?;
            let state = match report {
                Report::After => next.clone(),
                Report::Before => previous,
            };
            Some(JobActionResult {
                id: current.id,
                uid: current.uid,
                state,
                successful: true,
            })
        })
        .collect()
}

fn bulk_device(device: &StubDevice, jobs: Vec<BulkJob>) -> BulkDevice {
    BulkDevice {
        uid: device.uid.clone(),
        serial: device.serial.clone(),
        key_switch_state: device.key_switch_state,
        is_online: device.online,
        in_service: device.in_service,
        device_type: device.device_type.clone(),
        country: device.country.clone(),
        main_hardware: device.main_hardware.clone(),
        main_firmware: device.main_firmware.clone(),
        check_detail: CheckDetail {
            is_online: device.online,
            is_in_service: device.in_service,
            is_key_switch_operational: true,
        },
        check_passed: device.selectable(),
        jobs,
    }
}

/// POST /api/fota/jobs/bulk
///
/// One entry per device, in the order the devices first appear in
/// `updates`. Devices failing the pre-flight check get no jobs.
pub async fn bulk_create(
    State(state): State<StubState>,
    payload: Result<Json<BulkBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<BulkDevice>>), ApiError> {
    let Json(body) = payload?;
    non_empty(&body.updates, "updates")?;

    let mut grouped: Vec<(&StubDevice, Vec<&AvailableUpdate>)> = Vec::new();
    for update_id in &body.updates {
        let (device, update) = state
            .device_for_update(*update_id)
            .ok_or_else(|| ApiError::BadRequest(format!("unknown update {}", update_id)))?;
        match grouped.iter_mut().find(|(d, _)| d.uid == device.uid) {
            Some((_, updates)) => updates.push(update),
            None => grouped.push((device, vec![update])),
        }
    }

    let mut store = state.jobs();
    let devices = grouped
        .into_iter()
        .map(|(device, updates)| {
            let jobs = if device.selectable() {
                updates
                    .into_iter()
                    .map(|update| {
                        let job = store.create(
                            state.new_job_template(device, &update.version),
                            &update.update_type,
                        );
                        BulkJob {
                            id: job.record.id,
                            uid: job.record.uid,
                            state: job.record.state,
                            component: job.component,
                            version: job.record.version,
                        }
                    })
                    .collect()
            } else {
                Vec::new()
            };
            bulk_device(device, jobs)
        })
        .collect();

    Ok((StatusCode::CREATED, Json(devices)))
}

/// POST /api/fota/jobs/downloaded/cancel
pub async fn cancel_downloaded(
    State(state): State<StubState>,
    payload: Result<Json<JobIdsBody>, JsonRejection>,
) -> Result<Json<Vec<JobActionResult>>, ApiError> {
    let Json(body) = payload?;
    non_empty(&body.job_ids, "job_ids")?;

    let mut store = state.jobs();
    ensure_known(&store, &body.job_ids)?;
    Ok(Json(apply_action(
        &mut store,
        &body.job_ids,
        |s| matches!(s, JobState::DownloadQueued | JobState::DownloadReady),
        JobState::DownloadReady,
        Report::After,
    )))
}

/// POST /api/fota/jobs/update
pub async fn update_jobs(
    State(state): State<StubState>,
    payload: Result<Json<JobIdsBody>, JsonRejection>,
) -> Result<Json<UpdateJobsResponse>, ApiError> {
    let Json(body) = payload?;
    non_empty(&body.job_ids, "job_ids")?;

    let mut store = state.jobs();
    ensure_known(&store, &body.job_ids)?;
    let jobs = apply_action(
        &mut store,
        &body.job_ids,
        |s| *s == JobState::DownloadReady,
        JobState::UpdateQueued,
        Report::After,
    )
    .into_iter()
    .map(|r| JobSummary {
        id: r.id,
        uid: r.uid,
        state: r.state,
    })
    .collect();
    Ok(Json(UpdateJobsResponse { jobs }))
}

/// POST /api/fota/jobs/cancel
///
/// Each result reports the state the job had when it was cancelled.
pub async fn cancel_jobs(
    State(state): State<StubState>,
    payload: Result<Json<JobIdsBody>, JsonRejection>,
) -> Result<Json<Vec<JobActionResult>>, ApiError> {
    let Json(body) = payload?;
    non_empty(&body.job_ids, "job_ids")?;

    let mut store = state.jobs();
    ensure_known(&store, &body.job_ids)?;
    Ok(Json(apply_action(
        &mut store,
        &body.job_ids,
        |s| s.can_transition_to(&JobState::Cancel),
        JobState::Cancel,
        Report::Before,
    )))
}

/// POST /api/fota/jobs/retry
pub async fn retry_jobs(
    State(state): State<StubState>,
    payload: Result<Json<RetryBody>, JsonRejection>,
) -> Result<Json<Vec<JobActionResult>>, ApiError> {
    let Json(body) = payload?;
    non_empty(&body.jobs, "jobs")?;

    let mut store = state.jobs();
    ensure_known(&store, &body.jobs)?;
    Ok(Json(apply_action(
        &mut store,
        &body.jobs,
        |s| *s == JobState::Error,
        JobState::UpdateQueued,
        Report::After,
    )))
}
