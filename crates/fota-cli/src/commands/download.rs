//! Download command - fetch a signed firmware binary

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use fota_client::FotaClient;
use fota_core::SignedDownload;
use std::path::Path;

use crate::output::OutputContext;

/// Download `link` and write it to `dest` (or the link's file name)
pub async fn download(
    client: &FotaClient,
    link: &SignedDownload,
    dest: Option<&Path>,
    ctx: &OutputContext,
) -> Result<()> {
    if let Some(exp) = stale_expiry(link, Utc::now()) {
        ctx.warn(&format!(
            "Link expired at {}, the service will likely refuse it",
            exp.to_rfc3339()
        ));
    }

    let bytes = client
        .download_firmware(link)
        .await
        .with_context(|| format!("Failed to download {}", link.file))?;

    let dest = dest.unwrap_or_else(|| Path::new(&link.file));
    std::fs::write(dest, &bytes)
        .with_context(|| format!("Failed to write {}", dest.display()))?;

    ctx.success(&format!("Saved {} bytes to {}", bytes.len(), dest.display()));
    Ok(())
}

/// The link's expiry, if it is not after `now`
fn stale_expiry(link: &SignedDownload, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if !link.is_expired_at(now.timestamp()) {
        return None;
    }
    link.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
}
