//! Login command - obtain and store a bearer token

use anyhow::{Context, Result};
use fota_core::token::redact;
use fota_session::{HarnessConfig, Session};
use std::path::Path;

use crate::config::Config;
use crate::output::OutputContext;

/// Log in through the browser flow (or accept a pre-issued token) and save
/// the token to the CLI config file
pub async fn login(
    server: &str,
    harness: &HarnessConfig,
    config: &Config,
    config_path: &Path,
    print: bool,
    ctx: &OutputContext,
) -> Result<()> {
    let source = harness
        .token_source()
        .context("Login needs FOTA_USERNAME and FOTA_PASSWORD (or FOTA_TOKEN)")?;

    ctx.info(&format!("Logging in to {} via {}...", server, source.describe()));
    let session = Session::bootstrap(server, source.as_ref())
        .await
        .context("Login failed")?;

    let updated = Config {
        server: Some(server.to_string()),
        token: Some(session.token().to_string()),
        ..config.clone()
    };
    updated.save_to(config_path)?;

    if print {
        println!("{}", session.token());
    } else {
        ctx.success(&format!(
            "Logged in, token {} saved to {}",
            redact(session.token()),
            config_path.display()
        ));
    }
    Ok(())
}
