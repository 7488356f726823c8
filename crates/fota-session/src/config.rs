//! Harness configuration
//!
//! Settings come from an optional TOML file named by `FOTA_CONFIG`, then the
//! environment on top of it. Only `FOTA_`-prefixed variables are read, so
//! the shell's own `USERNAME` or `TOKEN` never leak into a login.
//!
//! ```toml
//! base_url = "https://sam-staging.example.com"
//! username = "ci-bot"
//! company_code = "ditst"
//! scenario_timeout_secs = 180
//!
//! [login]
//! page_timeout_secs = 300
//! chrome_path = "/usr/bin/chromium"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use fota_core::token::redact;
use serde::Deserialize;

use crate::browser::{BrowserLogin, Credentials};
use crate::error::ConfigError;
use crate::source::{StaticToken, TokenSource};

/// Names the optional TOML config file
pub const CONFIG_ENV: &str = "FOTA_CONFIG";

/// Tenant code used when none is configured
pub const DEFAULT_COMPANY_CODE: &str = "ditst";

const BASE_URL_VAR: &str = "FOTA_BASE_URL";
const USERNAME_VAR: &str = "FOTA_USERNAME";
const PASSWORD_VAR: &str = "FOTA_PASSWORD";
const TOKEN_VAR: &str = "FOTA_TOKEN";
const COMPANY_CODE_VAR: &str = "FOTA_COMPANY_CODE";
const FIXTURES_VAR: &str = fota_core::fixtures::FIXTURES_ENV;
const LOGIN_TIMEOUT_VAR: &str = "FOTA_LOGIN_TIMEOUT_SECS";
const SCENARIO_TIMEOUT_VAR: &str = "FOTA_SCENARIO_TIMEOUT_SECS";
const CHROME_PATH_VAR: &str = "FOTA_CHROME_PATH";

/// Everything the harness needs to reach a live service
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Live service base URL; `None` means stub mode
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub company_code: String,
    /// Pre-issued bearer token, skips the browser login
    pub token: Option<String>,
    /// Fixture YAML overriding the embedded set
    pub fixtures: Option<PathBuf>,
    pub scenario_timeout_secs: u64,
    pub login: LoginConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            username: None,
            password: None,
            company_code: DEFAULT_COMPANY_CODE.to_string(),
            token: None,
            fixtures: None,
            scenario_timeout_secs: 120,
            login: LoginConfig::default(),
        }
    }
}

impl fmt::Debug for HarnessConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarnessConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("company_code", &self.company_code)
            .field("token", &self.token.as_deref().map(redact))
            .field("fixtures", &self.fixtures)
            .field("scenario_timeout_secs", &self.scenario_timeout_secs)
            .field("login", &self.login)
            .finish()
    }
}

/// Browser login settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoginConfig {
    /// Page load budget
    pub page_timeout_secs: u64,
    /// How long to wait for the token response after submitting the form
    pub token_timeout_secs: u64,
    /// URL fragment identifying the token response
    pub token_path: String,
    /// Chromium executable; autodetected when unset
    pub chrome_path: Option<PathBuf>,
    pub headless: bool,
    pub selectors: LoginSelectors,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            page_timeout_secs: 600,
            token_timeout_secs: 60,
            token_path: "/token".to_string(),
            chrome_path: None,
            headless: true,
            selectors: LoginSelectors::default(),
        }
    }
}

impl LoginConfig {
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn token_timeout(&self) -> Duration {
        Duration::from_secs(self.token_timeout_secs)
    }
}

/// CSS selectors of the login form
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoginSelectors {
    pub username: String,
    pub password: String,
    pub company_code: String,
    /// Terms checkbox that must be ticked before signing in
    pub consent: String,
    /// Visible text of the submit button
    pub submit_label: String,
}

impl Default for LoginSelectors {
    fn default() -> Self {
        Self {
            username: "input[placeholder='Username']".to_string(),
            password: "input[placeholder='Password']".to_string(),
            company_code: "input[placeholder='Company code']".to_string(),
            consent: ".checkbox-check".to_string(),
            submit_label: "Sign in".to_string(),
        }
    }
}

impl HarnessConfig {
    /// Load from `FOTA_CONFIG` (if set) and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` in place of the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match non_empty(&lookup, &[CONFIG_ENV]) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay environment values; unset or blank variables leave the
    /// current value alone
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = non_empty(&lookup, &[BASE_URL_VAR]) {
            self.base_url = Some(v);
        }
        if let Some(v) = non_empty(&lookup, &[USERNAME_VAR]) {
            self.username = Some(v);
        }
        if let Some(v) = non_empty(&lookup, &[PASSWORD_VAR]) {
            self.password = Some(v);
        }
        if let Some(v) = non_empty(&lookup, &[TOKEN_VAR]) {
            self.token = Some(v);
        }
        if let Some(v) = non_empty(&lookup, &[COMPANY_CODE_VAR]) {
            self.company_code = v;
        }
        if let Some(v) = non_empty(&lookup, &[FIXTURES_VAR]) {
            self.fixtures = Some(PathBuf::from(v));
        }
        if let Some(v) = non_empty(&lookup, &[CHROME_PATH_VAR]) {
            self.login.chrome_path = Some(PathBuf::from(v));
        }
        if let Some(v) = non_empty(&lookup, &[LOGIN_TIMEOUT_VAR]) {
            self.login.page_timeout_secs = parse_secs(LOGIN_TIMEOUT_VAR, &v)?;
        }
        if let Some(v) = non_empty(&lookup, &[SCENARIO_TIMEOUT_VAR]) {
            self.scenario_timeout_secs = parse_secs(SCENARIO_TIMEOUT_VAR, &v)?;
        }
        Ok(())
    }

    /// A live run needs a base URL; everything else falls back to the stub
    pub fn is_live(&self) -> bool {
        self.base_url.is_some()
    }

    pub fn scenario_timeout(&self) -> Duration {
        Duration::from_secs(self.scenario_timeout_secs)
    }

    pub fn require_base_url(&self) -> Result<&str, ConfigError> {
        self.base_url
            .as_deref()
            .ok_or(ConfigError::Missing("FOTA_BASE_URL"))
    }

    /// Login form values
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let username = self
            .username
            .clone()
            .ok_or(ConfigError::Missing("FOTA_USERNAME"))?;
        let password = self
            .password
            .clone()
            .ok_or(ConfigError::Missing("FOTA_PASSWORD"))?;
        Ok(Credentials::new(username, password, &self.company_code))
    }

    /// The configured way of obtaining a token: the pre-issued one if set,
    /// otherwise a browser login against the base URL
    pub fn token_source(&self) -> Result<Arc<dyn TokenSource>, ConfigError> {
        if let Some(token) = &self.token {
            return Ok(Arc::new(StaticToken::new(token.clone())));
        }
        let base_url = self.require_base_url()?;
        Ok(Arc::new(BrowserLogin::new(
            base_url,
            self.credentials()?,
            self.login.clone(),
        )))
    }
}

fn non_empty<F>(lookup: &F, names: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    names
        .iter()
        .filter_map(|name| lookup(name))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

fn parse_secs(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidNumber {
        var,
        value: value.to_string(),
    })
}
