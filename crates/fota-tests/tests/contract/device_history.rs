//! Contract scenarios for `GET /api/fota/device/{uid}/history`
//!
//! Run with: cargo test -p fota-tests --test contract device_history::

use fota_client::{ApiErrorKind, Method};
use fota_core::contract::HISTORY_FIELDS;
use fota_core::paths;
use fota_tests::{ensure_fields, run_scenario, TestContext};
use pretty_assertions::assert_eq;
use serde_json::Value;

#[tokio::test]
async fn test_history_entries() {
    run_scenario("device_history_entries", async {
        let ctx = TestContext::new().await?;
        let device = ctx.device(&ctx.fixtures.scenarios().history_device)?;

        let response = ctx
            .client
            .get(&paths::device_history(&device.uid), &[], &ctx.auth())
            .await?;
        assert_eq!(response.status(), 200, "{}", response.text_preview());

        let entries: Vec<Value> = response.json()?;
        anyhow::ensure!(!entries.is_empty(), "no history for {}", device.uid);
        for (i, entry) in entries.iter().enumerate() {
            ensure_fields(&format!("history entry {} of {}", i, device.uid), entry, HISTORY_FIELDS)?;
        }

        // Typed decoding agrees with the field contract
        let typed = ctx.client.device_history(&device.uid).await?;
        assert_eq!(typed.len(), entries.len());
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_rejected_credentials() {
    run_scenario("device_history_rejected_credentials", async {
        let ctx = TestContext::new().await?;
        let device = ctx.device(&ctx.fixtures.scenarios().history_device)?;
        let path = paths::device_history(&device.uid);

        for (label, auth) in ctx.rejected_auths() {
            let response = ctx.client.get(&path, &[], &auth).await?;
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
    run_scenario("device_history_wrong_verb", async {
        let ctx = TestContext::new().await?;
        let device = ctx.device(&ctx.fixtures.scenarios().history_device)?;
        let response = ctx
            .client
            .request(
                Method::POST,
                &paths::device_history(&device.uid),
                &[],
                Some(&serde_json::json!({})),
                &ctx.auth(),
            )
            .await?;
        assert_eq!(response.kind(), Some(ApiErrorKind::MethodNotAllowed));
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_unknown_route() {
    run_scenario("device_history_unknown_route", async {
        let ctx = TestContext::new().await?;
        let device = ctx.device(&ctx.fixtures.scenarios().history_device)?;
        let path = format!("/api/fota/devices/{}/history", device.uid);
        let response = ctx.client.get(&path, &[], &ctx.auth()).await?;
        assert_eq!(response.kind(), Some(ApiErrorKind::NotFound));
        Ok(())
    })
    .await;
}
