//! FOTA Client Library
//!
//! Typed and raw HTTP access to the FOTA management API, built for contract
//! testing: every raw call takes explicit [`Auth`] so credentials can be
//! omitted or corrupted on purpose, and every answer is captured as an
//! [`ApiResponse`] before any decoding.
//!
//! # Example
//!
//! ```rust,no_run
//! use fota_client::{FotaClient, ListQuery, SortDir};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = FotaClient::with_bearer_token("https://sam-staging.example.com", "token")?;
//!
//!     let jobs = client
//!         .list_jobs(&ListQuery::paged(1, 10).sort("serial").sort_dir(SortDir::Asc))
//!         .await?;
//!     println!("{} jobs", jobs.len());
//!     Ok(())
//! }
//! ```

mod auth;
mod client;
mod error;
mod poll;
mod query;
mod response;
pub mod testing;

pub use auth::Auth;
pub use client::FotaClient;
pub use error::{FotaClientError, Result};
pub use poll::PollConfig;
pub use query::{ListQuery, SortDir};
pub use response::ApiResponse;
pub use reqwest::Method;

// Re-export core types for convenience
pub use fota_core::{ApiErrorKind, JobId, JobRecord, JobState};
