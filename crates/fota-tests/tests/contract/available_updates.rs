//! Contract scenarios for `GET /api/fota/available_updates`
//!
//! Run with: cargo test -p fota-tests --test contract available_updates::

use std::collections::HashSet;

use anyhow::Context;
use fota_client::{ApiErrorKind, Auth, ListQuery, Method, SortDir};
use fota_core::contract::{AVAILABLE_UPDATE_DEVICE_FIELDS, AVAILABLE_UPDATE_FIELDS};
use fota_core::{paths, AvailableUpdateDevice, REASON_DEVICE_OFFLINE};
use fota_tests::{ensure_fields, run_scenario, TestContext};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::Value;

async fn list(ctx: &TestContext, query: &ListQuery) -> anyhow::Result<Vec<Value>> {
    let response = ctx
        .client
        .get(paths::AVAILABLE_UPDATES, query.pairs(), &ctx.auth())
        .await?;
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
#[case(199)]
#[case(200)]
#[tokio::test]
async fn test_per_page_within_limit(#[case] per_page: u32) {
    run_scenario("available_updates_per_page_within_limit", async {
        let ctx = TestContext::new().await?;
        let devices = list(&ctx, &ListQuery::paged(1, per_page)).await?;
        assert_eq!(devices.len(), per_page as usize, "records for per_page={}", per_page);
        Ok(())
    })
    .await;
}

#[rstest]
#[case::per_page_over_limit("per_page", "201")]
#[case::negative_per_page("per_page", "-1")]
#[case::negative_page("page", "-1")]
#[case::bad_sort("sort", "-1")]
#[case::bad_sort_dir("sort_dir", "asdc")]
#[tokio::test]
async fn test_invalid_query_is_rejected(#[case] key: &str, #[case] value: &str) {
    run_scenario("available_updates_invalid_query", async {
        let ctx = TestContext::new().await?;
        let query = ListQuery::paged(1, 20).raw(key, value);
        let response = ctx
            .client
            .get(paths::AVAILABLE_UPDATES, query.pairs(), &ctx.auth())
            .await?;
        assert_eq!(
            response.kind(),
            Some(ApiErrorKind::BadRequest),
            "{}={} answered {}: {}",
            key,
            value,
            response.status(),
            response.text_preview()
        );
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_second_page() {
    run_scenario("available_updates_second_page", async {
        let ctx = TestContext::new().await?;
        let devices = list(&ctx, &ListQuery::paged(2, 20)).await?;
        assert_eq!(devices.len(), 20);
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_pages_are_disjoint() {
    run_scenario("available_updates_pages_are_disjoint", async {
        let ctx = TestContext::new().await?;
        let uids = |devices: Vec<AvailableUpdateDevice>| -> HashSet<String> {
            devices.into_iter().map(|d| d.uid).collect()
        };
        let first = uids(ctx.client.list_available_updates(&ListQuery::paged(1, 20)).await?);
        let second = uids(ctx.client.list_available_updates(&ListQuery::paged(2, 20)).await?);

        assert_eq!(first.len(), 20);
        assert_eq!(second.len(), 20);
        let shared: Vec<&String> = first.intersection(&second).collect();
        assert!(shared.is_empty(), "uids on both pages: {:?}", shared);
        Ok(())
    })
    .await;
}

// =============================================================================
// Sorting
// =============================================================================

#[tokio::test]
async fn test_sort_direction_changes_leading_device() {
    run_scenario("available_updates_sort_direction", async {
        let ctx = TestContext::new().await?;
        let query = ListQuery::paged(1, 20).sort("serial");

        let asc = ctx
            .client
            .list_available_updates(&query.clone().sort_dir(SortDir::Asc))
            .await?;
        let desc = ctx
            .client
            .list_available_updates(&query.sort_dir(SortDir::Desc))
            .await?;

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
    run_scenario("available_updates_field_types", async {
        let ctx = TestContext::new().await?;
        let devices = list(&ctx, &ListQuery::paged(1, 50)).await?;
        anyhow::ensure!(!devices.is_empty(), "no devices listed");

        for device in &devices {
            let uid = device["uid"].as_str().unwrap_or("<no uid>");
            ensure_fields(&format!("device {}", uid), device, AVAILABLE_UPDATE_DEVICE_FIELDS)?;
            for update in device["availableUpdates"].as_array().into_iter().flatten() {
                ensure_fields(
                    &format!("available update of {}", uid),
                    update,
                    AVAILABLE_UPDATE_FIELDS,
                )?;
            }
        }
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_unselectable_devices_give_a_reason() {
    run_scenario("available_updates_selectable_reason", async {
        let ctx = TestContext::new().await?;
        let devices = ctx
            .client
            .list_available_updates(&ListQuery::paged(1, 200))
            .await?;

        let inconsistent: Vec<&str> = devices
            .iter()
            .filter(|d| !d.selectable_reason_consistent())
            .map(|d| d.uid.as_str())
            .collect();
        assert!(
            inconsistent.is_empty(),
            "unselectable devices without selectableReason: {:?}",
            inconsistent
        );
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_offline_device_is_not_selectable() {
    run_scenario("available_updates_offline_device", async {
        let ctx = TestContext::new().await?;
        let offline = ctx.device(&ctx.fixtures.scenarios().offline_device)?;

        let devices = ctx
            .client
            .list_available_updates(&ListQuery::paged(1, 20).search(&offline.uid))
            .await?;
        let device = devices
            .iter()
            .find(|d| d.uid == offline.uid)
            .with_context(|| format!("{} not listed", offline.uid))?;

        assert!(!device.is_online);
        assert!(!device.selectable);
        assert_eq!(device.selectable_reason, REASON_DEVICE_OFFLINE);
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_device_attributes() {
    run_scenario("available_updates_device_attributes", async {
        let ctx = TestContext::new().await?;
        let expected = ctx.device(&ctx.fixtures.scenarios().attributes_device)?;

        let devices = ctx
            .client
            .list_available_updates(&ListQuery::paged(1, 20).search(&expected.uid))
            .await?;
        let device = devices
            .iter()
            .find(|d| d.uid == expected.uid)
            .with_context(|| format!("{} not listed", expected.uid))?;

        assert_eq!(device.serial, expected.serial);
        assert_eq!(device.device_type, expected.device_type);
        assert_eq!(device.country, expected.country);
        assert_eq!(device.is_online, expected.online);
        assert!(device.selectable);
        assert_eq!(device.available_updates, expected.available_updates);
        Ok(())
    })
    .await;
}

// =============================================================================
// Auth gating and routing
// =============================================================================

#[tokio::test]
async fn test_rejected_credentials() {
    run_scenario("available_updates_rejected_credentials", async {
        let ctx = TestContext::new().await?;
        let query = ListQuery::paged(1, 20);
        for (label, auth) in ctx.rejected_auths() {
            let response = ctx
                .client
                .get(paths::AVAILABLE_UPDATES, query.pairs(), &auth)
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
    run_scenario("available_updates_wrong_verb", async {
        let ctx = TestContext::new().await?;
        let response = ctx
            .client
            .request(Method::POST, paths::AVAILABLE_UPDATES, &[], None, &ctx.auth())
            .await?;
        assert_eq!(response.kind(), Some(ApiErrorKind::MethodNotAllowed));
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_unknown_route() {
    run_scenario("available_updates_unknown_route", async {
        let ctx = TestContext::new().await?;
        let response = ctx
            .client
            .get("/api/fota/available_update", &[], &Auth::Empty)
            .await?;
        assert_eq!(response.kind(), Some(ApiErrorKind::NotFound));
        Ok(())
    })
    .await;
}
