//! Error types for FOTA client operations

use std::time::Duration;

use fota_core::{ApiErrorKind, JobId, JobState};
use thiserror::Error;

/// Result type alias for FOTA client operations
pub type Result<T> = std::result::Result<T, FotaClientError>;

/// Errors that can occur during FOTA client operations
#[derive(Error, Debug)]
pub enum FotaClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Service answered with a non-success status
    #[error("{kind} ({status}): {message}")]
    Api {
        kind: ApiErrorKind,
        status: u16,
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Header value could not be encoded
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    /// Job did not reach a wanted state in time
    #[error("job {job_id} still {last_state} after {waited:?}")]
    Timeout {
        job_id: JobId,
        last_state: String,
        waited: Duration,
    },

    /// Job reached a state it can no longer leave towards the wanted ones
    #[error("job {job_id} reached {state}, which cannot lead to {wanted}")]
    UnreachableState {
        job_id: JobId,
        state: JobState,
        wanted: String,
    },
}

impl FotaClientError {
    /// Create an API error from status code and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            kind: ApiErrorKind::from_status(status),
            status,
            message: message.into(),
        }
    }

    /// Classification of the service's answer, for API errors
    pub fn kind(&self) -> Option<ApiErrorKind> {
        match self {
            Self::Api { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
