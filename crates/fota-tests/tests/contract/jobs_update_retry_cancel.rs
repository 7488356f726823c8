//! Contract scenarios for the job actions: update, cancel and retry
//!
//! Run with: cargo test -p fota-tests --test contract jobs_update_retry_cancel::

use anyhow::Context;
use fota_client::{ApiErrorKind, Auth, JobId, JobState};
use fota_core::{paths, DeviceFixture};
use fota_tests::{run_scenario, TestContext};
use pretty_assertions::assert_eq;
use serde_json::json;
use tracing::{info, warn};

/// Drive a fresh job on `device` to an install outcome
async fn install(ctx: &TestContext, device: &DeviceFixture) -> anyhow::Result<(JobId, JobState)> {
    let job_id = ctx.create_job(device).await?;
    ctx.wait_for(device, job_id, &[JobState::DownloadReady]).await?;

    let response = ctx.client.update_jobs(&[job_id]).await?;
    let queued = response
        .jobs
        .iter()
        .find(|j| j.id == job_id)
        .with_context(|| format!("job {} missing from update response", job_id))?;
    assert_eq!(queued.uid, device.uid);
    assert_eq!(queued.state, JobState::UpdateQueued);

    let outcome = ctx
        .wait_for(device, job_id, &[JobState::Installed, JobState::Error])
        .await?;
    info!(%job_id, state = %outcome.state, "Install finished");
    Ok((job_id, outcome.state))
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn test_full_lifecycle() {
    run_scenario("job_lifecycle", async {
        let ctx = TestContext::new().await?;
        let device = ctx.device(&ctx.fixtures.scenarios().lifecycle_device)?;

        let (job_id, outcome) = install(&ctx, device).await?;
        assert_eq!(outcome, JobState::Installed, "job {} did not install", job_id);

        let results = ctx.client.cancel_jobs(&[job_id]).await?;
        let result = results
            .iter()
            .find(|r| r.id == job_id)
            .with_context(|| format!("job {} missing from cancel response", job_id))?;
        assert!(result.successful);
        // Cancel reports the state the job was cancelled from
        assert_eq!(result.state, JobState::Installed);

        ctx.wait_for(device, job_id, &[JobState::Cancel]).await?;
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_cancelled_job_is_not_updated() {
    run_scenario("job_update_after_cancel", async {
        let ctx = TestContext::new().await?;
        if ctx.is_live() {
            info!("Updating a cancelled job is only pinned down against the stub");
            return Ok(());
        }
        let device = ctx.device(&ctx.fixtures.scenarios().lifecycle_device)?;
        let job_id = ctx.create_job(device).await?;
        let job = ctx.wait_for(device, job_id, &[JobState::DownloadReady]).await?;

        // Cancelled jobs can no longer be updated
        ctx.client.cancel_jobs(&[job.id]).await?;
        ctx.wait_for(device, job_id, &[JobState::Cancel]).await?;

        let response = ctx.client.update_jobs(&[job_id]).await?;
        let summary = response
            .jobs
            .iter()
            .find(|j| j.id == job_id)
            .with_context(|| format!("job {} missing from update response", job_id))?;
        assert_ne!(summary.state, JobState::UpdateQueued);
        Ok(())
    })
    .await;
}

// =============================================================================
// Retry
// =============================================================================

#[tokio::test]
async fn test_retry_failed_install() {
    run_scenario("job_retry", async {
        let ctx = TestContext::new().await?;
        let device = ctx.device(&ctx.fixtures.scenarios().retry_device)?;

        let (job_id, outcome) = install(&ctx, device).await?;
        if outcome != JobState::Error {
            warn!(%job_id, state = %outcome, "Install did not fail, nothing to retry");
            anyhow::ensure!(ctx.is_live(), "stub install of {} should fail", device.uid);
            return Ok(());
        }

        let results = ctx.client.retry_jobs(&[job_id]).await?;
        assert_eq!(results.len(), 1);
        assert!(results[0].successful, "retry of {} was refused", job_id);
        assert_eq!(results[0].uid, device.uid);
        assert_eq!(results[0].state, JobState::UpdateQueued);
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_retry_body_uses_jobs_key() {
    run_scenario("job_retry_wrong_key", async {
        let ctx = TestContext::new().await?;
        let response = ctx
            .client
            .post(paths::JOBS_RETRY, &json!({ "job_ids": [1] }), &ctx.auth())
            .await?;
        assert_eq!(response.kind(), Some(ApiErrorKind::BadRequest));
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_retry_unknown_route() {
    run_scenario("job_retry_unknown_route", async {
        let ctx = TestContext::new().await?;
        let response = ctx
            .client
            .post("/api/fota/job/retry", &json!({ "jobs": [1] }), &ctx.auth())
            .await?;
        assert_eq!(response.kind(), Some(ApiErrorKind::NotFound));
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_retry_bad_body_with_bad_token() {
    run_scenario("job_retry_bad_body_bad_token", async {
        let ctx = TestContext::new().await?;
        // Credentials are checked before the body
        let response = ctx
            .client
            .post(paths::JOBS_RETRY, &json!({ "jobs": "all" }), &ctx.wrong_token())
            .await?;
        assert_eq!(response.kind(), Some(ApiErrorKind::AuthRequired));

        let response = ctx
            .client
            .post(paths::JOBS_RETRY, &json!({ "jobs": [1] }), &Auth::Empty)
            .await?;
        assert_eq!(response.kind(), Some(ApiErrorKind::AuthRequired));
        Ok(())
    })
    .await;
}

// =============================================================================
// Gating shared by the action endpoints
// =============================================================================

const ACTIONS: [(&str, &str); 3] = [
    (paths::JOBS_UPDATE, "job_ids"),
    (paths::JOBS_CANCEL, "job_ids"),
    (paths::JOBS_RETRY, "jobs"),
];

#[tokio::test]
async fn test_rejected_credentials() {
    run_scenario("job_actions_rejected_credentials", async {
        let ctx = TestContext::new().await?;
        for (path, key) in ACTIONS {
            let body = json!({ key: [1] });
            for (label, auth) in ctx.rejected_auths() {
                let response = ctx.client.post(path, &body, &auth).await?;
                assert_eq!(
                    response.kind(),
                    Some(ApiErrorKind::AuthRequired),
                    "{} with {} answered {}",
                    path,
                    label,
                    response.status()
                );
            }
        }
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_wrong_verb() {
    run_scenario("job_actions_wrong_verb", async {
        let ctx = TestContext::new().await?;
        for (path, key) in ACTIONS {
            let response = ctx
                .client
                .delete(path, &json!({ key: [1] }), &ctx.auth())
                .await?;
            assert_eq!(
                response.kind(),
                Some(ApiErrorKind::MethodNotAllowed),
                "DELETE {} answered {}",
                path,
                response.status()
            );
        }
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_string_ids_are_rejected() {
    run_scenario("job_actions_string_ids", async {
        let ctx = TestContext::new().await?;
        for (path, key) in ACTIONS {
            let response = ctx
                .client
                .post(path, &json!({ key: ["1"] }), &ctx.auth())
                .await?;
            assert_eq!(
                response.kind(),
                Some(ApiErrorKind::BadRequest),
                "{} answered {}",
                path,
                response.status()
            );
        }
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_unknown_job_is_not_found() {
    run_scenario("job_actions_unknown_job", async {
        let ctx = TestContext::new().await?;
        if ctx.is_live() {
            info!("Unknown job ids are only pinned down against the stub");
            return Ok(());
        }
        for (path, key) in ACTIONS {
            let response = ctx
                .client
                .post(path, &json!({ key: [999_999_999u64] }), &ctx.auth())
                .await?;
            assert_eq!(response.kind(), Some(ApiErrorKind::NotFound), "{}", path);
        }
        Ok(())
    })
    .await;
}
