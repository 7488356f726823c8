//! Bounded polling for asynchronous job transitions

use std::time::Duration;

use fota_core::{JobId, JobRecord, JobState};
use tracing::{debug, info, instrument};

use crate::client::FotaClient;
use crate::error::{FotaClientError, Result};

/// Backoff schedule for [`FotaClient::wait_for_job_state`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// First sleep between observations
    pub initial: Duration,
    /// Upper bound for the doubling sleep
    pub max_interval: Duration,
    /// Give up after this long
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(250),
            max_interval: Duration::from_secs(5),
            timeout: Duration::from_secs(120),
        }
    }
}

impl PollConfig {
    /// Tight schedule for an in-process service
    pub fn fast() -> Self {
        Self {
            initial: Duration::from_millis(20),
            max_interval: Duration::from_millis(200),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    fn next_interval(&self, current: Duration) -> Duration {
        (current * 2).min(self.max_interval)
    }
}

impl FotaClient {
    /// Observe a job until it is in one of `targets`.
    ///
    /// Fails early when the job reaches a state from which none of the
    /// targets is reachable, and with [`FotaClientError::Timeout`] when the
    /// deadline passes first.
    #[instrument(skip(self, config))]
    pub async fn wait_for_job_state(
        &self,
        uid: &str,
        job_id: JobId,
        targets: &[JobState],
        config: &PollConfig,
    ) -> Result<JobRecord> {
        let start = tokio::time::Instant::now();
        let mut interval = config.initial;
        let mut last_state = "<not listed>".to_string();

        loop {
            if let Some(job) = self.find_job(uid, job_id).await? {
                if targets.contains(&job.state) {
                    info!(state = %job.state, elapsed = ?start.elapsed(), "Job reached state");
                    return Ok(job);
                }
                if !targets.iter().any(|t| job.state.can_reach(t)) {
                    return Err(FotaClientError::UnreachableState {
                        job_id,
                        state: job.state,
                        wanted: join_states(targets),
                    });
                }
                last_state = job.state.to_string();
            }

            if start.elapsed() > config.timeout {
                return Err(FotaClientError::Timeout {
                    job_id,
                    last_state,
                    waited: start.elapsed(),
                });
            }
            debug!(state = %last_state, ?interval, "Waiting for job");
            tokio::time::sleep(interval).await;
            interval = config.next_interval(interval);
        }
    }
}

fn join_states(states: &[JobState]) -> String {
    states
        .iter()
        .map(JobState::as_str)
        .collect::<Vec<_>>()
        .join(" | ")
}
