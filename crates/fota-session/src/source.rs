//! Ways of obtaining a bearer token

use async_trait::async_trait;

use crate::error::BootstrapError;

/// Something that can produce a bearer token for the FOTA API
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Obtain a fresh token
    async fn obtain(&self) -> Result<String, BootstrapError>;

    /// Short label for logs
    fn describe(&self) -> &'static str;
}

/// A token issued out of band (CI secret, CLI flag, stub service)
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StaticToken")
            .field(&fota_core::token::redact(&self.0))
            .finish()
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn obtain(&self) -> Result<String, BootstrapError> {
        if self.0.trim().is_empty() {
            return Err(BootstrapError::MissingAccessToken);
        }
        Ok(self.0.clone())
    }

    fn describe(&self) -> &'static str {
        "static token"
    }
}
