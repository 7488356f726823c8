//! Job-changing commands: bulk create, update, cancel, retry

use anyhow::{bail, Result};
use fota_client::{FotaClient, JobId};
use fota_core::JobActionResult;

use crate::output::{ActionRow, BulkRow, OutputContext};

/// Create jobs for the given update ids
pub async fn bulk(client: &FotaClient, update_ids: &[u64], ctx: &OutputContext) -> Result<()> {
    let devices = client.bulk_create(update_ids).await?;
    let rows: Vec<BulkRow> = devices.iter().flat_map(BulkRow::from_device).collect();
    let created = devices.iter().map(|d| d.jobs.len()).sum::<usize>();

    ctx.print(&rows);
    ctx.success(&format!(
        "Created {} job(s) on {} device(s)",
        created,
        devices.len()
    ));
    Ok(())
}

/// Send downloaded jobs back to the ready state
pub async fn cancel_downloaded(
    client: &FotaClient,
    job_ids: &[JobId],
    ctx: &OutputContext,
) -> Result<()> {
    let results = client.cancel_downloaded(job_ids).await?;
    report(&results, ctx)
}

/// Start installing downloaded jobs
pub async fn update(client: &FotaClient, job_ids: &[JobId], ctx: &OutputContext) -> Result<()> {
    let response = client.update_jobs(job_ids).await?;
    let rows: Vec<ActionRow> = response.jobs.iter().map(ActionRow::from).collect();
    ctx.print(&rows);
    Ok(())
}

/// Cancel jobs
pub async fn cancel(client: &FotaClient, job_ids: &[JobId], ctx: &OutputContext) -> Result<()> {
    let results = client.cancel_jobs(job_ids).await?;
    report(&results, ctx)
}

/// Retry failed jobs
pub async fn retry(client: &FotaClient, job_ids: &[JobId], ctx: &OutputContext) -> Result<()> {
    let results = client.retry_jobs(job_ids).await?;
    report(&results, ctx)
}

fn report(results: &[JobActionResult], ctx: &OutputContext) -> Result<()> {
    let rows: Vec<ActionRow> = results.iter().map(ActionRow::from).collect();
    ctx.print(&rows);

    let failed = results.iter().filter(|r| !r.successful).count();
    if failed > 0 {
        bail!("{} of {} job(s) were not changed", failed, results.len());
    }
    Ok(())
}
