//! The shared, read-only session and its one-time bootstrap

use std::fmt;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use fota_client::FotaClient;
use fota_core::token::redact;
use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::oneshot;
use tracing::{error, info};

use crate::error::BootstrapError;
use crate::source::TokenSource;

/// Bearer token plus the service it was issued for
#[derive(Clone)]
pub struct Session {
    token: String,
    base_url: String,
    obtained_at: DateTime<Utc>,
}

impl Session {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: base_url.into(),
            obtained_at: Utc::now(),
        }
    }

    /// Obtain a token from `source` for `base_url`
    pub async fn bootstrap(
        base_url: &str,
        source: &dyn TokenSource,
    ) -> Result<Self, BootstrapError> {
        url::Url::parse(base_url)?;
        let token = source.obtain().await?;
        Ok(Self::new(base_url, token))
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn obtained_at(&self) -> DateTime<Utc> {
        self.obtained_at
    }

    /// A client for this session's service whose typed helpers send the token
    pub fn client(&self) -> fota_client::Result<FotaClient> {
        FotaClient::with_bearer_token(&self.base_url, &self.token)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &redact(&self.token))
            .field("base_url", &self.base_url)
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

/// Outcome of the one bootstrap attempt, shared by every caller
pub type SessionResult = Result<Arc<Session>, Arc<BootstrapError>>;

type PendingSession = Shared<BoxFuture<'static, SessionResult>>;

/// Process-wide slot holding the one bootstrap attempt.
///
/// The first caller starts the bootstrap on its own thread and runtime;
/// every caller, concurrent or later, awaits that same attempt. Dropping a
/// waiting caller (a scenario timeout, a test runtime shutting down) leaves
/// the attempt running, so no second login is ever started. A failure is
/// remembered too.
#[derive(Default)]
pub struct SessionCell {
    inner: OnceLock<PendingSession>,
}

impl SessionCell {
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    pub async fn get_or_bootstrap(
        &self,
        base_url: &str,
        source: Arc<dyn TokenSource>,
    ) -> SessionResult {
        let pending = self
            .inner
            .get_or_init(|| start_bootstrap(base_url.to_string(), source))
            .clone();
        pending.await
    }

    /// The stored result, if the bootstrap has finished
    pub fn get(&self) -> Option<SessionResult> {
        self.inner.get().and_then(|pending| pending.peek().cloned())
    }
}

fn start_bootstrap(base_url: String, source: Arc<dyn TokenSource>) -> PendingSession {
    let (tx, rx) = oneshot::channel();
    let spawned = std::thread::Builder::new()
        .name("session-bootstrap".to_string())
        .spawn(move || {
            let result = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime.block_on(bootstrap_logged(&base_url, source.as_ref())),
                Err(e) => Err(Arc::new(BootstrapError::Runtime(e.to_string()))),
            };
            let _ = tx.send(result);
        })
        .map(drop);

    async move {
        if let Err(e) = spawned {
            return Err(Arc::new(BootstrapError::Runtime(e.to_string())));
        }
        match rx.await {
            Ok(result) => result,
            Err(_) => Err(Arc::new(BootstrapError::Runtime(
                "bootstrap thread exited without a result".to_string(),
            ))),
        }
    }
    .boxed()
    .shared()
}

async fn bootstrap_logged(base_url: &str, source: &dyn TokenSource) -> SessionResult {
    info!(source = source.describe(), base_url, "Bootstrapping session");
    match Session::bootstrap(base_url, source).await {
        Ok(session) => {
            info!(token = %redact(session.token()), "Session ready");
            Ok(Arc::new(session))
        }
        Err(e) => {
            error!(error = %e, "Session bootstrap failed");
            Err(Arc::new(e))
        }
    }
}
