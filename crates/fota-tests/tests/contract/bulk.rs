//! Contract scenarios for `POST /api/fota/jobs/bulk`
//!
//! Run with: cargo test -p fota-tests --test contract bulk::

use anyhow::Context;
use fota_client::{ApiErrorKind, JobId, JobState, Method};
use fota_core::{paths, BulkDevice};
use fota_tests::{run_scenario, TestContext};
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn test_single_device() {
    run_scenario("bulk_single_device", async {
        let ctx = TestContext::new().await?;
        let expected = ctx.device(&ctx.fixtures.scenarios().bulk_single_device)?;

        let response = ctx
            .client
            .post(paths::JOBS_BULK, &json!({ "updates": [expected.update_id] }), &ctx.auth())
            .await?;
        assert_eq!(response.status(), 201, "{}", response.text_preview());

        let devices: Vec<BulkDevice> = response.json()?;
        assert_eq!(devices.len(), 1, "one device per distinct uid");
        let device = &devices[0];

        assert_eq!(device.uid, expected.uid);
        assert_eq!(device.serial, expected.serial);
        assert_eq!(device.key_switch_state, expected.key_switch_state);
        assert_eq!(device.is_online, expected.online);
        assert_eq!(device.in_service, expected.in_service);
        assert_eq!(device.device_type, expected.device_type);
        assert_eq!(device.country, expected.country);
        assert_eq!(device.main_hardware, expected.main_hardware);
        assert_eq!(device.main_firmware, expected.main_firmware);
        assert!(device.check_passed, "pre-flight checks failed: {:?}", device.check_detail);
        assert!(device.check_detail.is_online);
        assert!(device.check_detail.is_in_service);

        let job = device.jobs.first().context("no job created")?;
        assert_eq!(job.uid, expected.uid);
        assert_eq!(job.state, JobState::DownloadQueued);
        assert!(!job.component.is_empty(), "job without component");
        assert!(!job.version.is_empty(), "job without version");

        let cleaned = ctx.cancel_created(expected, job.id).await?;
        assert_eq!(cleaned.state, JobState::Cancel);
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_queued_job_for_downloaded_cancel_device() {
    run_scenario("bulk_downloaded_cancel_device", async {
        let ctx = TestContext::new().await?;
        let device = ctx.device(&ctx.fixtures.scenarios().downloaded_cancel_device)?;

        let response = ctx
            .client
            .post(paths::JOBS_BULK, &json!({ "updates": [device.update_id] }), &ctx.auth())
            .await?;
        assert_eq!(response.status(), 201, "{}", response.text_preview());

        let created: Vec<BulkDevice> = response.json()?;
        let entry = created
            .iter()
            .find(|d| d.uid == device.uid)
            .with_context(|| format!("{} missing from bulk response", device.uid))?;
        let job = entry.jobs.first().context("no job created")?;
        assert_eq!(job.uid, device.uid);
        assert_eq!(job.state, JobState::DownloadQueued);

        let cleaned = ctx.cancel_created(device, job.id).await?;
        assert_eq!(cleaned.state, JobState::Cancel);
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_multiple_devices() {
    run_scenario("bulk_multiple_devices", async {
        let ctx = TestContext::new().await?;
        let expected = ctx.fixtures.bulk_multi_devices()?;
        let update_ids: Vec<u64> = expected.iter().map(|d| d.update_id).collect();

        let devices = ctx.client.bulk_create(&update_ids).await?;
        assert_eq!(devices.len(), expected.len());

        let mut created: Vec<JobId> = Vec::new();
        for fixture in expected.iter().copied() {
            let device = devices
                .iter()
                .find(|d| d.uid == fixture.uid)
                .with_context(|| format!("{} missing from bulk response", fixture.uid))?;
            anyhow::ensure!(!device.jobs.is_empty(), "no job for {}", fixture.uid);
            for job in &device.jobs {
                assert_eq!(job.uid, device.uid, "job {} under the wrong device", job.id);
                assert_eq!(job.state, JobState::DownloadQueued, "job {}", job.id);
                created.push(job.id);
            }
            // Queued downloads cannot be cancelled
            for job in &device.jobs {
                ctx.wait_for(fixture, job.id, &[JobState::DownloadReady]).await?;
            }
        }

        let cancelled = ctx.client.cancel_jobs(&created).await?;
        assert_eq!(cancelled.len(), created.len());
        for result in &cancelled {
            assert!(result.successful, "job {} was not cancelled", result.id);
        }
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_string_ids_are_rejected() {
    run_scenario("bulk_string_ids", async {
        let ctx = TestContext::new().await?;
        let device = ctx.device(&ctx.fixtures.scenarios().bulk_single_device)?;
        let response = ctx
            .client
            .post(
                paths::JOBS_BULK,
                &json!({ "updates": [device.update_id.to_string()] }),
                &ctx.auth(),
            )
            .await?;
        assert_eq!(response.kind(), Some(ApiErrorKind::BadRequest));
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_rejected_credentials() {
    run_scenario("bulk_rejected_credentials", async {
        let ctx = TestContext::new().await?;
        let device = ctx.device(&ctx.fixtures.scenarios().bulk_single_device)?;
        let body = json!({ "updates": [device.update_id] });

        for (label, auth) in ctx.rejected_auths() {
            let response = ctx.client.post(paths::JOBS_BULK, &body, &auth).await?;
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
    run_scenario("bulk_wrong_verb", async {
        let ctx = TestContext::new().await?;
        let response = ctx
            .client
            .request(Method::GET, paths::JOBS_BULK, &[], None, &ctx.auth())
            .await?;
        assert_eq!(response.kind(), Some(ApiErrorKind::MethodNotAllowed));
        Ok(())
    })
    .await;
}
