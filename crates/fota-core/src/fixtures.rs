//! Fixture registry: known devices, update mappings and scenario assignments
//!
//! Fixtures are a YAML document. The staging set is embedded in the crate;
//! `FOTA_FIXTURES` points at a replacement file for another tenant.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::models::{AvailableUpdate, JobState, SignedDownload};

/// Environment variable naming an alternative fixture file
pub const FIXTURES_ENV: &str = "FOTA_FIXTURES";

const EMBEDDED: &str = include_str!("../fixtures/staging.yaml");

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixtures: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid fixture YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("duplicate device key: {0}")]
    DuplicateKey(String),

    #[error("duplicate device uid: {0}")]
    DuplicateUid(String),

    #[error("{context} refers to unknown device '{key}'")]
    UnknownDevice { context: String, key: String },

    #[error("{second} mutates device '{key}', already assigned to {first}")]
    SharedDevice {
        key: String,
        first: &'static str,
        second: &'static str,
    },
}

fn default_true() -> bool {
    true
}

fn default_device_type() -> String {
    "zkl-3000-rc".to_string()
}

fn default_country() -> String {
    "NL".to_string()
}

/// A device known to exist in the target tenant, with the attributes the
/// scenarios expect the service to report for it
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceFixture {
    pub key: String,
    pub uid: String,
    pub serial: String,
    /// Update offered for this device, used by bulk job creation
    pub update_id: u64,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_device_type")]
    pub device_type: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_true")]
    pub online: bool,
    #[serde(default = "default_true")]
    pub in_service: bool,
    #[serde(default)]
    pub key_switch_state: i64,
    #[serde(default)]
    pub main_hardware: String,
    #[serde(default)]
    pub main_firmware: String,
    /// Expected `availableUpdates`, in order; empty means unchecked
    #[serde(default)]
    pub available_updates: Vec<AvailableUpdate>,
}

/// Expected values of a historical job that the service never mutates
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReferenceJob {
    pub device: String,
    pub id: u64,
    pub created_by: String,
    pub state: JobState,
    pub firmware_path: String,
    pub serial: String,
    pub label: String,
    pub is_online: bool,
    pub version: String,
    pub error_code: String,
}

/// A signed download link known to be valid, plus an expiry in the past
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DownloadFixture {
    #[serde(flatten)]
    pub link: SignedDownload,
    pub expired_exp: i64,
}

/// Which device each scenario works on, by fixture key
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScenarioFixtures {
    pub offline_device: String,
    pub attributes_device: String,
    pub history_device: String,
    pub bulk_single_device: String,
    pub bulk_multi_devices: Vec<String>,
    pub downloaded_cancel_device: String,
    pub lifecycle_device: String,
    pub retry_device: String,
    pub reference_job: ReferenceJob,
    pub download: DownloadFixture,
}

impl ScenarioFixtures {
    fn device_refs(&self) -> Vec<(&'static str, &str)> {
        let mut refs = vec![
            ("offline_device", self.offline_device.as_str()),
            ("attributes_device", self.attributes_device.as_str()),
            ("history_device", self.history_device.as_str()),
            ("bulk_single_device", self.bulk_single_device.as_str()),
            ("downloaded_cancel_device", self.downloaded_cancel_device.as_str()),
            ("lifecycle_device", self.lifecycle_device.as_str()),
            ("retry_device", self.retry_device.as_str()),
            ("reference_job.device", self.reference_job.device.as_str()),
        ];
        refs.extend(
            self.bulk_multi_devices
                .iter()
                .map(|key| ("bulk_multi_devices", key.as_str())),
        );
        refs
    }

    /// Devices of the scenarios that create or change jobs
    fn mutating_refs(&self) -> Vec<(&'static str, &str)> {
        let mut refs = vec![
            ("bulk_single_device", self.bulk_single_device.as_str()),
            ("downloaded_cancel_device", self.downloaded_cancel_device.as_str()),
            ("lifecycle_device", self.lifecycle_device.as_str()),
            ("retry_device", self.retry_device.as_str()),
        ];
        refs.extend(
            self.bulk_multi_devices
                .iter()
                .map(|key| ("bulk_multi_devices", key.as_str())),
        );
        refs
    }

    /// Every mutating scenario must own its devices, so scenarios running in
    /// parallel against one service never race on a device's jobs
    fn check_disjoint(&self) -> Result<(), FixtureError> {
        let mut owners: HashMap<&str, &'static str> = HashMap::new();
        for (context, key) in self.mutating_refs() {
            match owners.insert(key, context) {
                Some(first) if first != context => {
                    return Err(FixtureError::SharedDevice {
                        key: key.to_string(),
                        first,
                        second: context,
                    })
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct FixtureFile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    versions: BTreeMap<String, String>,
    devices: Vec<DeviceFixture>,
    scenarios: ScenarioFixtures,
}

/// Immutable, validated fixture set
#[derive(Debug, Clone)]
pub struct FixtureRegistry {
    name: String,
    versions: BTreeMap<String, String>,
    devices: Vec<DeviceFixture>,
    by_uid: HashMap<String, usize>,
    by_key: HashMap<String, usize>,
    scenarios: ScenarioFixtures,
}

impl FixtureRegistry {
    /// Parse and validate a fixture document
    pub fn from_yaml(yaml: &str) -> Result<Self, FixtureError> {
        let file: FixtureFile = serde_yaml::from_str(yaml)?;

        let mut by_uid = HashMap::new();
        let mut by_key = HashMap::new();
        for (index, device) in file.devices.iter().enumerate() {
            if by_key.insert(device.key.clone(), index).is_some() {
                return Err(FixtureError::DuplicateKey(device.key.clone()));
            }
            if by_uid.insert(device.uid.clone(), index).is_some() {
                return Err(FixtureError::DuplicateUid(device.uid.clone()));
            }
        }

        for (context, key) in file.scenarios.device_refs() {
            if !by_key.contains_key(key) {
                return Err(FixtureError::UnknownDevice {
                    context: context.to_string(),
                    key: key.to_string(),
                });
            }
        }
        file.scenarios.check_disjoint()?;

        let registry = Self {
            name: file.name.unwrap_or_else(|| "unnamed".to_string()),
            versions: file.versions,
            devices: file.devices,
            by_uid,
            by_key,
            scenarios: file.scenarios,
        };
        debug!(
            name = %registry.name,
            devices = registry.devices.len(),
            "Loaded fixtures"
        );
        Ok(registry)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// The staging fixture set compiled into the crate
    pub fn embedded() -> Result<Self, FixtureError> {
        Self::from_yaml(EMBEDDED)
    }

    /// Load from `FOTA_FIXTURES` when set, otherwise the embedded set
    pub fn load_default() -> Result<Self, FixtureError> {
        match std::env::var(FIXTURES_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim()),
            _ => Self::embedded(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn devices(&self) -> &[DeviceFixture] {
        &self.devices
    }

    /// Find a device by uid
    pub fn lookup(&self, uid: &str) -> Option<&DeviceFixture> {
        self.by_uid.get(uid).map(|&i| &self.devices[i])
    }

    /// Update id configured for a device uid
    pub fn update_id_for(&self, uid: &str) -> Option<u64> {
        self.lookup(uid).map(|d| d.update_id)
    }

    /// Find a device by fixture key, e.g. `Mitra_device_7420`
    pub fn device(&self, key: &str) -> Option<&DeviceFixture> {
        self.by_key.get(key).map(|&i| &self.devices[i])
    }

    /// Like [`device`](Self::device) but reports unknown keys as an error
    pub fn require_device(&self, key: &str) -> Result<&DeviceFixture, FixtureError> {
        self.device(key).ok_or_else(|| FixtureError::UnknownDevice {
            context: "lookup".to_string(),
            key: key.to_string(),
        })
    }

    /// Version string by symbolic name, e.g. `V1_2_0_rc1`
    pub fn version(&self, key: &str) -> Option<&str> {
        self.versions.get(key).map(String::as_str)
    }

    pub fn scenarios(&self) -> &ScenarioFixtures {
        &self.scenarios
    }

    /// Resolve a scenario assignment to its device
    pub fn scenario_device(&self, key: &str) -> Result<&DeviceFixture, FixtureError> {
        self.require_device(key)
    }

    /// Devices of the multi-device bulk scenario, in assignment order
    pub fn bulk_multi_devices(&self) -> Result<Vec<&DeviceFixture>, FixtureError> {
        self.scenarios
            .bulk_multi_devices
            .iter()
            .map(|key| self.require_device(key))
            .collect()
    }

    /// Uids the registry knows, for disjointness checks
    pub fn uids(&self) -> HashSet<&str> {
        self.devices.iter().map(|d| d.uid.as_str()).collect()
    }
}
