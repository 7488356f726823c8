//! FOTA CLI - Command-line tool for the FOTA management API
//!
//! Inspect devices, jobs and history, and drive jobs through their
//! lifecycle against a live service or the stub.

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fota_client::{FotaClient, JobId, JobState};
use fota_core::SignedDownload;
use fota_session::HarnessConfig;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::commands::list::ListArgs;
use crate::config::Config;
use crate::output::{OutputContext, OutputFormat};

#[derive(Parser)]
#[command(name = "fota-cli")]
#[command(author, version, about = "FOTA management API CLI")]
#[command(propagate_version = true)]
struct Cli {
    /// Service base URL
    #[arg(short, long, env = "FOTA_BASE_URL")]
    server: Option<String>,

    /// Bearer token (overrides the one saved by `login`)
    #[arg(short, long, env = "FOTA_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Configuration file path
    #[arg(short, long, env = "FOTA_CLI_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Minimal output (for scripting)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in through the web console and save the token
    Login {
        /// Print the full token to stdout
        #[arg(long)]
        print: bool,
    },

    /// List devices with their available updates
    Updates {
        #[command(flatten)]
        list: ListArgs,
    },

    /// List firmware jobs
    Jobs {
        #[command(flatten)]
        list: ListArgs,
    },

    /// Show the firmware history of a device
    History {
        /// Device UID
        uid: String,
    },

    /// Create jobs for one or more update ids
    Bulk {
        /// Update id(s), as listed by `updates`
        #[arg(required = true)]
        update_ids: Vec<u64>,
    },

    /// Return downloaded jobs to DownloadReady
    CancelDownloaded {
        #[arg(required = true)]
        job_ids: Vec<JobId>,
    },

    /// Start installing downloaded jobs
    Update {
        #[arg(required = true)]
        job_ids: Vec<JobId>,
    },

    /// Cancel jobs
    Cancel {
        #[arg(required = true)]
        job_ids: Vec<JobId>,
    },

    /// Retry jobs that ended in Error
    Retry {
        #[arg(required = true)]
        job_ids: Vec<JobId>,
    },

    /// Wait until a job reaches one of the given states
    Wait {
        /// Device UID the job belongs to
        uid: String,

        /// Job id
        job_id: JobId,

        /// Target state(s), e.g. Installed Error
        #[arg(required = true, value_parser = parse_state)]
        states: Vec<JobState>,

        /// Give up after this many seconds
        #[arg(long, default_value = "120")]
        timeout: u64,
    },

    /// Download a firmware binary from a signed link
    Download {
        /// Firmware file name
        file: String,

        #[arg(long)]
        id: u64,

        /// Expiry (unix seconds)
        #[arg(long)]
        exp: i64,

        #[arg(long)]
        sig: String,

        /// Destination path (defaults to the file name)
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("fota_cli=debug,fota_client=debug,fota_session=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    // Load config file
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };
    let config = if config_path.exists() {
        Config::load_from(&config_path)?
    } else {
        Config::default()
    };

    // Merge CLI args with config
    let merged = config.merge_with_args(cli.server.as_deref(), cli.token.as_deref(), cli.no_color);
    let format = match (&cli.output, config.output.as_deref()) {
        (OutputFormat::Table, Some("json")) => OutputFormat::Json,
        (OutputFormat::Table, Some("csv")) => OutputFormat::Csv,
        (format, _) => *format,
    };
    let ctx = OutputContext::new(format, merged.no_color, cli.quiet);

    match &cli.command {
        Commands::Login { print } => {
            let server = merged.server()?;
            let mut harness = HarnessConfig::load().context("Invalid harness configuration")?;
            harness.base_url = Some(server.to_string());
            if let Some(token) = &cli.token {
                harness.token = Some(token.clone());
            }
            commands::login(server, &harness, &config, &config_path, *print, &ctx).await?;
        }

        Commands::Updates { list } => {
            let client = create_client(&merged)?;
            commands::updates(&client, list, &ctx).await?;
        }

        Commands::Jobs { list } => {
            let client = create_client(&merged)?;
            commands::jobs(&client, list, &ctx).await?;
        }

        Commands::History { uid } => {
            let client = create_client(&merged)?;
            commands::history(&client, uid, &ctx).await?;
        }

        Commands::Bulk { update_ids } => {
            let client = create_client(&merged)?;
            commands::bulk(&client, update_ids, &ctx).await?;
        }

        Commands::CancelDownloaded { job_ids } => {
            let client = create_client(&merged)?;
            commands::cancel_downloaded(&client, job_ids, &ctx).await?;
        }

        Commands::Update { job_ids } => {
            let client = create_client(&merged)?;
            commands::update(&client, job_ids, &ctx).await?;
        }

        Commands::Cancel { job_ids } => {
            let client = create_client(&merged)?;
            commands::cancel(&client, job_ids, &ctx).await?;
        }

        Commands::Retry { job_ids } => {
            let client = create_client(&merged)?;
            commands::retry(&client, job_ids, &ctx).await?;
        }

        Commands::Wait {
            uid,
            job_id,
            states,
            timeout,
        } => {
            let client = create_client(&merged)?;
            commands::wait(
                &client,
                uid,
                *job_id,
                states,
                Duration::from_secs(*timeout),
                &ctx,
            )
            .await?;
        }

        Commands::Download {
            file,
            id,
            exp,
            sig,
            out,
        } => {
            // Signed links carry their own authorization
            let client = FotaClient::new(merged.server()?).context("Failed to create FOTA client")?;
            let link = SignedDownload::new(file.as_str(), *id, *exp, sig.as_str());
            commands::download(&client, &link, out.as_deref(), &ctx).await?;
        }
    }

    Ok(())
}

/// Create an authenticated FOTA client
fn create_client(merged: &config::MergedConfig) -> Result<FotaClient> {
    FotaClient::with_bearer_token(merged.server()?, merged.token()?)
        .context("Failed to create FOTA client")
}

/// Accept only the job states the service is known to report
fn parse_state(value: &str) -> std::result::Result<JobState, String> {
    JobState::KNOWN
        .iter()
        .find(|s| s.as_str().eq_ignore_ascii_case(value))
        .cloned()
        .ok_or_else(|| {
            let known: Vec<&str> = JobState::KNOWN.iter().map(JobState::as_str).collect();
            format!("unknown state '{}', expected one of: {}", value, known.join(", "))
        })
}
