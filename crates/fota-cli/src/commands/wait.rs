//! Wait command - block until a job reaches a state

use anyhow::{Context, Result};
use fota_client::{FotaClient, JobId, JobState, PollConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::output::{JobRow, OutputContext};

/// Poll a job until it is in one of `targets`
pub async fn wait(
    client: &FotaClient,
    uid: &str,
    job_id: JobId,
    targets: &[JobState],
    timeout: Duration,
    ctx: &OutputContext,
) -> Result<()> {
    let wanted = targets
        .iter()
        .map(JobState::as_str)
        .collect::<Vec<_>>()
        .join(" | ");

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {elapsed} {msg}")
            .context("Invalid progress template")?,
    );
    spinner.set_message(format!("Waiting for job {} to reach {}", job_id, wanted));
    if !ctx.quiet {
        spinner.enable_steady_tick(Duration::from_millis(100));
    }

    let outcome = client
        .wait_for_job_state(uid, job_id, targets, &PollConfig::default().with_timeout(timeout))
        .await;

    match outcome {
        Ok(job) => {
            spinner.finish_and_clear();
            ctx.print(&[JobRow::from(&job)]);
            ctx.success(&format!("Job {} is {}", job.id, job.state));
            Ok(())
        }
        Err(e) => {
            spinner.abandon_with_message(format!("Job {} did not reach {}", job_id, wanted));
            Err(e.into())
        }
    }
}
