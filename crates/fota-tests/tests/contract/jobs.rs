//! Contract scenarios for `GET /api/fota/jobs`
//!
//! Run with: cargo test -p fota-tests --test contract jobs::

use std::collections::HashSet;

use anyhow::Context;
use fota_client::{ApiErrorKind, Auth, JobId, JobRecord, ListQuery, Method, SortDir};
use fota_core::contract::JOB_FIELDS;
use fota_core::paths;
use fota_tests::{ensure_fields, run_scenario, TestContext};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::Value;

async fn list_raw(ctx: &TestContext, query: &ListQuery) -> anyhow::Result<Vec<Value>> {
    let response = ctx.client.get(paths::JOBS, query.pairs(), &ctx.auth()).await?;
    anyhow::ensure!(
        response.status() == 200,
        "expected 200 for {:?}, got {}: {}",
        query.pairs(),
        response.status(),
        response.text_preview()
    );
    Ok(response.json()?)
}

// =============================================================================
// Pagination
// =============================================================================

#[rstest]
#[case(1)]
#[case(199)]
#[case(200)]
#[tokio::test]
async fn test_per_page_within_limit(#[case] per_page: u32) {
    run_scenario("jobs_per_page_within_limit", async {
        let ctx = TestContext::new().await?;
        let jobs = list_raw(&ctx, &ListQuery::paged(1, per_page)).await?;
        assert_eq!(jobs.len(), per_page as usize, "records for per_page={}", per_page);
        Ok(())
    })
    .await;
}

#[rstest]
#[case::per_page_over_limit(&[("per_page", "201")])]
#[case::negative_per_page(&[("per_page", "-1")])]
#[case::negative_page(&[("page", "-1")])]
#[case::bad_sort_and_dir(&[("sort", "-1"), ("sort_dir", "asdc")])]
#[case::bad_search_and_dir(&[("search", "-1"), ("sort_dir", "-1")])]
#[tokio::test]
async fn test_invalid_query_is_rejected(#[case] params: &[(&str, &str)]) {
    run_scenario("jobs_invalid_query", async {
        let ctx = TestContext::new().await?;
        let query = params
            .iter()
            .fold(ListQuery::paged(1, 20), |q, (k, v)| q.raw(k, v));
        let response = ctx.client.get(paths::JOBS, query.pairs(), &ctx.auth()).await?;
        assert_eq!(
            response.kind(),
            Some(ApiErrorKind::BadRequest),
            "{:?} answered {}: {}",
            params,
            response.status(),
            response.text_preview()
        );
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_pages_are_disjoint() {
    run_scenario("jobs_pages_are_disjoint", async {
        let ctx = TestContext::new().await?;
        let ids = |jobs: Vec<JobRecord>| -> HashSet<JobId> { jobs.into_iter().map(|j| j.id).collect() };
        let first = ids(ctx.client.list_jobs(&ListQuery::paged(1, 20)).await?);
        let second = ids(ctx.client.list_jobs(&ListQuery::paged(2, 20)).await?);

        assert_eq!(first.len(), 20);
        assert_eq!(second.len(), 20);
        let shared: Vec<&JobId> = first.intersection(&second).collect();
        assert!(shared.is_empty(), "job ids on both pages: {:?}", shared);
        Ok(())
    })
    .await;
}

// =============================================================================
// Sorting
// =============================================================================

#[tokio::test]
async fn test_sort_direction_changes_leading_job() {
    run_scenario("jobs_sort_direction", async {
        let ctx = TestContext::new().await?;
        let query = ListQuery::paged(1, 20).sort("serial");

        let asc = ctx.client.list_jobs(&query.clone().sort_dir(SortDir::Asc)).await?;
        let desc = ctx.client.list_jobs(&query.sort_dir(SortDir::Desc)).await?;

        let asc_first = asc.first().context("ascending page is empty")?;
        let desc_first = desc.first().context("descending page is empty")?;
        assert_ne!(
            asc_first.uid, desc_first.uid,
            "asc and desc by serial start with the same device"
        );
        Ok(())
    })
    .await;
}

// =============================================================================
// Field contracts
// =============================================================================

#[tokio::test]
async fn test_field_types() {
    run_scenario("jobs_field_types", async {
        let ctx = TestContext::new().await?;
        let offline = ctx.device(&ctx.fixtures.scenarios().offline_device)?;

        let jobs = list_raw(&ctx, &ListQuery::paged(1, 20).search(&offline.uid)).await?;
        let first = jobs
            .first()
            .with_context(|| format!("no jobs listed for {}", offline.uid))?;
        ensure_fields(&format!("job of {}", offline.uid), first, JOB_FIELDS)?;

        // The typed model must accept what the contract accepts
        let record: JobRecord = serde_json::from_value(first.clone())?;
        assert_eq!(record.uid, offline.uid);
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_reference_job() {
    run_scenario("jobs_reference_job", async {
        let ctx = TestContext::new().await?;
        let reference = &ctx.fixtures.scenarios().reference_job;
        let device = ctx.device(&reference.device)?;

        let job = ctx
            .client
            .find_job(&device.uid, JobId(reference.id))
            .await?
            .with_context(|| format!("job {} not listed for {}", reference.id, device.uid))?;

        assert_eq!(job.created_by, reference.created_by);
        assert_eq!(job.state, reference.state);
        assert_eq!(job.firmware_path, reference.firmware_path);
        assert_eq!(job.serial, reference.serial);
        assert_eq!(job.label, reference.label);
        assert_eq!(job.is_online, reference.is_online);
        assert_eq!(job.version, reference.version);
        assert_eq!(job.error_code, reference.error_code);
        Ok(())
    })
    .await;
}

// =============================================================================
// Auth gating and routing
// =============================================================================

#[tokio::test]
async fn test_rejected_credentials() {
    run_scenario("jobs_rejected_credentials", async {
        let ctx = TestContext::new().await?;
        let query = ListQuery::paged(1, 20);
        for (label, auth) in ctx.rejected_auths() {
            let response = ctx.client.get(paths::JOBS, query.pairs(), &auth).await?;
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
    run_scenario("jobs_wrong_verb", async {
        let ctx = TestContext::new().await?;
        let response = ctx
            .client
            .request(Method::PUT, paths::JOBS, &[], None, &ctx.auth())
            .await?;
        assert_eq!(response.kind(), Some(ApiErrorKind::MethodNotAllowed));
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_unknown_route() {
    run_scenario("jobs_unknown_route", async {
        let ctx = TestContext::new().await?;
        let response = ctx.client.get("/api/fota/job", &[], &Auth::None).await?;
        assert_eq!(response.kind(), Some(ApiErrorKind::NotFound));
        Ok(())
    })
    .await;
}
