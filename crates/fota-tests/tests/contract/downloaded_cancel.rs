//! Contract scenarios for `POST /api/fota/jobs/downloaded/cancel`
//!
//! Run with: cargo test -p fota-tests --test contract downloaded_cancel::

use fota_client::{ApiErrorKind, JobState};
use fota_core::paths;
use fota_tests::{run_scenario, TestContext};
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn test_created_job_returns_to_download_ready() {
    run_scenario("downloaded_cancel_round_trip", async {
        let ctx = TestContext::new().await?;
        let device = ctx.device(&ctx.fixtures.scenarios().downloaded_cancel_device)?;
        let job_id = ctx.create_job(device).await?;

        let results = ctx.client.cancel_downloaded(&[job_id]).await?;
        assert_eq!(results.len(), 1);
        for result in &results {
            assert!(result.successful, "job {} was refused", result.id);
            assert_eq!(result.id, job_id);
            assert_eq!(result.uid, device.uid);
            assert_eq!(result.state, JobState::DownloadReady);
        }

        ctx.client.cancel_jobs(&[job_id]).await?;
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_empty_job_list_is_rejected() {
    run_scenario("downloaded_cancel_empty_list", async {
        let ctx = TestContext::new().await?;
        let response = ctx
            .client
            .post(paths::JOBS_DOWNLOADED_CANCEL, &json!({ "job_ids": [] }), &ctx.auth())
            .await?;
        assert_eq!(response.kind(), Some(ApiErrorKind::BadRequest));
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_rejected_credentials() {
    run_scenario("downloaded_cancel_rejected_credentials", async {
        let ctx = TestContext::new().await?;
        let body = json!({ "job_ids": [1] });
        for (label, auth) in ctx.rejected_auths() {
            let response = ctx
                .client
                .post(paths::JOBS_DOWNLOADED_CANCEL, &body, &auth)
                .await?;
            assert_eq!(
                response.kind(),
                Some(ApiErrorKind::AuthRequired),
                "{} answered {}",
                label,
                response.status()
            );
        }
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_wrong_verb() {
    run_scenario("downloaded_cancel_wrong_verb", async {
        let ctx = TestContext::new().await?;
        let response = ctx
            .client
            .delete(paths::JOBS_DOWNLOADED_CANCEL, &json!({ "job_ids": [1] }), &ctx.auth())
            .await?;
        assert_eq!(response.kind(), Some(ApiErrorKind::MethodNotAllowed));
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_unknown_route() {
    run_scenario("downloaded_cancel_unknown_route", async {
        let ctx = TestContext::new().await?;
        let response = ctx
            .client
            .post("/api/fota/jobs/download/cancel", &json!({ "job_ids": [1] }), &ctx.auth())
            .await?;
        assert_eq!(response.kind(), Some(ApiErrorKind::NotFound));
        Ok(())
    })
    .await;
}
