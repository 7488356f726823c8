//! fota-stubd - standalone FOTA stub service
//!
//! Serves the stub over TCP so `fota-cli` and manual tooling can be pointed
//! at it.
//!
//! Usage:
//!   fota-stubd [OPTIONS] [fixtures.yaml]
//!
//! Options:
//!   --port <port>     Listen port (default 18090)
//!   --token <token>   Bearer token to accept (default stub-token)
//!   --fail <uid>      Make installs on this device end in Error
//!
//! Without a fixture file the embedded fixtures are served.

use std::net::SocketAddr;

use anyhow::Context;
use fota_core::FixtureRegistry;
use fota_stub::{create_router, StubConfig, StubState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PORT: u16 = 18090;

/// Parsed command-line arguments
struct Args {
    fixtures_path: Option<String>,
    port: u16,
    token: Option<String>,
    failing: Vec<String>,
}

fn parse_args() -> anyhow::Result<Args> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut result = Args {
        fixtures_path: None,
        port: DEFAULT_PORT,
        token: None,
        failing: Vec::new(),
    };

    let mut i = 0;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "--port" | "-p" => {
                let port = value.context("Missing argument for --port")?;
                result.port = port.parse().with_context(|| format!("Invalid port: {}", port))?;
                i += 2;
            }
            "--token" | "-t" => {
                result.token = Some(value.context("Missing argument for --token")?.clone());
                i += 2;
            }
            "--fail" => {
                result.failing.push(value.context("Missing argument for --fail")?.clone());
                i += 2;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            arg if !arg.starts_with('-') => {
                result.fixtures_path = Some(arg.to_string());
                i += 1;
            }
            _ => {
                tracing::warn!("Unknown argument: {}", args[i]);
                i += 1;
            }
        }
    }

    Ok(result)
}

fn print_help() {
    eprintln!(
        r#"fota-stubd - standalone FOTA stub service

Usage: fota-stubd [OPTIONS] [fixtures.yaml]

Options:
  -p, --port <port>     Listen port (default {DEFAULT_PORT})
  -t, --token <token>   Bearer token to accept (default stub-token)
      --fail <uid>      Make installs on this device end in Error
                        Can be specified multiple times
  -h, --help            Print this help message

Examples:
  fota-stubd
  fota-cli --server http://127.0.0.1:{DEFAULT_PORT} --token stub-token jobs
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fota_stubd=info,fota_stub=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = parse_args()?;

    let fixtures = match &args.fixtures_path {
        Some(path) => {
            tracing::info!("Loading fixtures from: {}", path);
            FixtureRegistry::from_file(path)?
        }
        None => FixtureRegistry::load_default()?,
    };

    let mut config = StubConfig::default();
    if let Some(token) = args.token {
        config = config.with_token(token);
    }
    for uid in args.failing {
        config = config.failing(uid);
    }

    let state = StubState::seeded(&fixtures, config);
    tracing::info!(
        fixtures = fixtures.name(),
        devices = state.devices().len(),
        "Stub state ready"
    );

    let app = create_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}
