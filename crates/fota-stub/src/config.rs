//! Stub service configuration

use std::collections::HashSet;
use std::time::Duration;

/// Behaviour knobs of the stub service
#[derive(Debug, Clone)]
pub struct StubConfig {
    /// The only bearer token the stub accepts
    pub token: String,
    /// Key for signed download links
    pub signing_key: String,
    /// Time a queued download takes to become ready
    pub download_delay: Duration,
    /// Time a queued install takes to resolve
    pub install_delay: Duration,
    /// Devices whose installs end in `Error`
    pub failing_uids: HashSet<String>,
    /// Generated devices added to the fixture devices
    pub filler_devices: usize,
    /// Reported as `created_by` / `updatedBy`
    pub operator: String,
}

impl Default for StubConfig {
    fn default() -> Self {
        Self {
            token: "stub-token".to_string(),
            signing_key: "stub-signing-key".to_string(),
            download_delay: Duration::from_millis(50),
            install_delay: Duration::from_millis(100),
            failing_uids: HashSet::new(),
            filler_devices: 240,
            operator: "Super User".to_string(),
        }
    }
}

impl StubConfig {
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Make installs on `uid` fail
    pub fn failing(mut self, uid: impl Into<String>) -> Self {
        self.failing_uids.insert(uid.into());
        self
    }

    pub fn with_delays(mut self, download: Duration, install: Duration) -> Self {
        self.download_delay = download;
        self.install_delay = install;
        self
    }
}
