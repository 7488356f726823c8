//! Job models and the client-side view of the job state machine

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::id::JobId;

/// Lifecycle state of a firmware job as reported by the server.
///
/// ```text
/// DownloadQueued -> DownloadReady -> UpdateQueued -> Installed | Error
/// DownloadReady | UpdateQueued | Installed -> Cancel
/// Error -> UpdateQueued (retry)
/// ```
///
/// States the harness does not know are kept verbatim in [`JobState::Other`]
/// so drift in the service shows up as an assertion failure instead of a
/// decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobState {
    DownloadQueued,
    DownloadReady,
    UpdateQueued,
    Installed,
    Error,
    Cancel,
    Other(String),
}

impl JobState {
    /// All states known to the harness, in lifecycle order
    pub const KNOWN: [JobState; 6] = [
        JobState::DownloadQueued,
        JobState::DownloadReady,
        JobState::UpdateQueued,
        JobState::Installed,
        JobState::Error,
        JobState::Cancel,
    ];

    /// Wire representation
    pub fn as_str(&self) -> &str {
        match self {
            JobState::DownloadQueued => "DownloadQueued",
            JobState::DownloadReady => "DownloadReady",
            JobState::UpdateQueued => "UpdateQueued",
            JobState::Installed => "Installed",
            JobState::Error => "Error",
            JobState::Cancel => "Cancel",
            JobState::Other(s) => s,
        }
    }

    /// `Cancel` is the only state nothing leaves
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Cancel)
    }

    /// Whether the install attempt has produced an outcome
    pub fn is_install_outcome(&self) -> bool {
        matches!(self, JobState::Installed | JobState::Error)
    }

    /// Whether the server may move a job from `self` to `next`.
    ///
    /// Staying in the same state is not a transition and returns `false`.
    pub fn can_transition_to(&self, next: &JobState) -> bool {
        use JobState::*;
        matches!(
            (self, next),
            (DownloadQueued, DownloadReady)
                | (DownloadReady, UpdateQueued)
                | (DownloadReady, Cancel)
                | (UpdateQueued, Installed)
                | (UpdateQueued, Error)
                | (UpdateQueued, Cancel)
                | (Installed, Cancel)
                | (Error, UpdateQueued)
        )
    }

    /// Whether `next` is reachable from `self` through zero or more transitions
    pub fn can_reach(&self, next: &JobState) -> bool {
        if self == next {
            return true;
        }
        let mut frontier = vec![self.clone()];
        let mut seen = vec![self.clone()];
        while let Some(state) = frontier.pop() {
            for candidate in JobState::KNOWN.iter() {
                if state.can_transition_to(candidate) && !seen.contains(candidate) {
                    if candidate == next {
                        return true;
                    }
                    seen.push(candidate.clone());
                    frontier.push(candidate.clone());
                }
            }
        }
        false
    }
}

impl From<String> for JobState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "DownloadQueued" => JobState::DownloadQueued,
            "DownloadReady" => JobState::DownloadReady,
            "UpdateQueued" => JobState::UpdateQueued,
            "Installed" => JobState::Installed,
            "Error" => JobState::Error,
            "Cancel" => JobState::Cancel,
            _ => JobState::Other(s),
        }
    }
}

impl From<JobState> for String {
    fn from(state: JobState) -> Self {
        state.as_str().to_string()
    }
}

impl FromStr for JobState {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(JobState::from(s.to_string()))
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of `GET /api/fota/jobs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub created_at: String,
    pub created_by: String,
    pub uid: String,
    pub state: JobState,
    pub updated_at: String,
    #[serde(rename = "FirmwarePath")]
    pub firmware_path: String,
    pub serial: String,
    pub label: String,
    pub is_online: bool,
    pub version: String,
    pub error_code: String,
}

/// Job entry nested in a bulk-create response device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkJob {
    pub id: JobId,
    pub uid: String,
    pub state: JobState,
    #[serde(default)]
    pub component: String,
    #[serde(default)]
    pub version: String,
}

/// Per-job outcome of cancel, downloaded-cancel and retry calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobActionResult {
    pub id: JobId,
    pub uid: String,
    pub state: JobState,
    pub successful: bool,
}

/// Job entry of the `jobs/update` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: JobId,
    pub uid: String,
    pub state: JobState,
}

/// Response of `POST /api/fota/jobs/update`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateJobsResponse {
    pub jobs: Vec<JobSummary>,
}

/// Body of `POST /api/fota/jobs/bulk`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkRequest {
    pub updates: Vec<u64>,
}

/// Body of the update, cancel and downloaded-cancel calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobIdsRequest {
    pub job_ids: Vec<JobId>,
}

/// Body of `POST /api/fota/jobs/retry`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryRequest {
    pub jobs: Vec<JobId>,
}
