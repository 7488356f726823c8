//! In-process FOTA service for client and contract tests
//!
//! Serves an axum router (normally the `fota-stub` service) on an ephemeral
//! loopback port and hands out clients for it, with or without a bearer
//! token. The service stops when the [`TestServer`] is dropped.

use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::{FotaClient, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// A FOTA service running on `127.0.0.1` for the lifetime of this value
///
/// ```ignore
/// use fota_client::testing::TestServer;
/// use fota_stub::{create_router, StubConfig, StubState};
///
/// let state = StubState::seeded(&fixtures, StubConfig::default().with_token("t"));
/// let server = TestServer::start(create_router(state)).await?;
/// let jobs = server.client_with_token("t").list_jobs(&ListQuery::paged(1, 10)).await?;
/// ```
pub struct TestServer {
    base_url: String,
    anonymous: FotaClient,
    stop: Option<oneshot::Sender<()>>,
}

impl TestServer {
    /// Bind an ephemeral port and start serving `router` in the background
    pub async fn start(router: axum::Router) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let base_url = format!("http://{}", listener.local_addr()?);
        let anonymous = FotaClient::with_config(&base_url, REQUEST_TIMEOUT, CONNECT_TIMEOUT)?;

        let (stop, stopped) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let served = axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = stopped.await;
                })
                .await;
            if let Err(e) = served {
                warn!(error = %e, "Test server stopped with an error");
            }
        });
        debug!(%base_url, "Test server listening");

        Ok(Self {
            base_url,
            anonymous,
            stop: Some(stop),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Client whose typed helpers send no credentials
    pub fn anonymous_client(&self) -> FotaClient {
        self.anonymous.clone()
    }

    /// Client whose typed helpers send `token` as a bearer token
    pub fn client_with_token(&self, token: &str) -> FotaClient {
        self.anonymous.clone().with_token(token)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}
