//! Contract scenarios for signed firmware downloads
//!
//! Run with: cargo test -p fota-tests --test contract firmware_download::

use fota_client::ApiErrorKind;
use fota_core::SignedDownload;
use fota_tests::{run_scenario, TestContext};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_valid_link_serves_firmware() {
    run_scenario("firmware_download_valid", async {
        let ctx = TestContext::new().await?;
        let Some(link) = ctx.fresh_download()? else {
            return Ok(());
        };

        let firmware = ctx.client.download_firmware(&link).await?;
        anyhow::ensure!(!firmware.is_empty(), "{} downloaded empty", link.file);
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_missing_id_is_bad_request() {
    run_scenario("firmware_download_missing_id", async {
        let ctx = TestContext::new().await?;
        let link = ctx.signed_download()?.without_id();

        let response = ctx.client.download_raw(&link).await?;
        assert_eq!(response.kind(), Some(ApiErrorKind::BadRequest), "{}", response.text_preview());
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_expired_link_is_unauthorized() {
    run_scenario("firmware_download_expired", async {
        let ctx = TestContext::new().await?;
        let expired_exp = ctx.fixtures.scenarios().download.expired_exp;
        let link = ctx.signed_download()?.with_exp(expired_exp);
        assert!(link.is_expired_at(chrono::Utc::now().timestamp()));

        let response = ctx.client.download_raw(&link).await?;
        assert_eq!(response.kind(), Some(ApiErrorKind::AuthRequired), "{}", response.text_preview());
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_tampered_signature_is_forbidden() {
    run_scenario("firmware_download_tampered_sig", async {
        let ctx = TestContext::new().await?;
        let Some(link) = ctx.fresh_download()? else {
            return Ok(());
        };
        let link = link.with_tampered_sig();

        let response = ctx.client.download_raw(&link).await?;
        assert_eq!(response.kind(), Some(ApiErrorKind::Forbidden), "{}", response.text_preview());
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_unknown_file_is_not_found() {
    run_scenario("firmware_download_unknown_file", async {
        let ctx = TestContext::new().await?;
        let valid = ctx.signed_download()?;
        let link = SignedDownload {
            file: format!("missing-{}", valid.file),
            ..valid
        };

        let response = ctx.client.download_raw(&link).await?;
        assert_eq!(response.kind(), Some(ApiErrorKind::NotFound), "{}", response.text_preview());
        Ok(())
    })
    .await;
}
