//! Error types for configuration and session bootstrap

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors loading the harness configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{var} must be a whole number of seconds, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("missing required setting: {0}")]
    Missing(&'static str),
}

/// Errors obtaining a bearer token
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("timed out after {waited:?} waiting for {what}")]
    Timeout { what: &'static str, waited: Duration },

    #[error("no response matching '{0}' was observed")]
    NoTokenResponse(String),

    #[error("token response is not JSON: {0}")]
    InvalidJson(String),

    #[error("token response has no access_token")]
    MissingAccessToken,

    #[error("invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("bootstrap task failed: {0}")]
    Runtime(String),
}

impl From<chromiumoxide::error::CdpError> for BootstrapError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        BootstrapError::Browser(err.to_string())
    }
}
