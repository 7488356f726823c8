//! Session bootstrap for the FOTA contract harness
//!
//! Reads [`HarnessConfig`] from a TOML file and the environment, obtains a
//! bearer token once per process through a [`TokenSource`] (a headless
//! browser login or a pre-issued token) and shares the resulting
//! [`Session`] read-only through a [`SessionCell`].

pub mod browser;
pub mod config;
mod error;
mod session;
mod source;

pub use browser::{BrowserLogin, Credentials};
pub use config::{HarnessConfig, LoginConfig, LoginSelectors};
pub use error::{BootstrapError, ConfigError};
pub use session::{Session, SessionCell, SessionResult};
pub use source::{StaticToken, TokenSource};
