//! Shared state of the stub service

use std::collections::HashMap;
use std::sync::Arc;

use fota_core::{
    AvailableUpdate, DeviceFixture, FixtureRegistry, HistoryEntry, JobId, JobRecord, JobState,
    SignedDownload, REASON_DEVICE_OFFLINE,
};
use parking_lot::{Mutex, MutexGuard};

use crate::config::StubConfig;
use crate::signing;
use crate::store::JobStore;

const RC1: &str = "1.2.0-rc.1";
const BASE_FIRMWARE: &str = "1.1.0";
const COMPONENT: &str = "nmdi";
const FIRST_JOB_ID: u64 = 5000;

/// Reason reported for a device that is online but out of service
pub const REASON_NOT_IN_SERVICE: &str = "DEVICE_NOT_IN_SERVICE";

/// A device as the stub serves it
#[derive(Debug, Clone)]
pub struct StubDevice {
    pub uid: String,
    pub serial: String,
    pub label: String,
    pub device_type: String,
    pub country: String,
    pub online: bool,
    pub in_service: bool,
    pub key_switch_state: i64,
    pub main_hardware: String,
    pub main_firmware: String,
    pub updates: Vec<AvailableUpdate>,
}

impl StubDevice {
    fn from_fixture(fixture: &DeviceFixture) -> Self {
        let updates = if fixture.available_updates.is_empty() {
            vec![AvailableUpdate {
                id: fixture.update_id,
                version: RC1.to_string(),
                update_type: COMPONENT.to_string(),
                selectable: fixture.online && fixture.in_service,
            }]
        } else {
            fixture.available_updates.clone()
        };
        Self {
            uid: fixture.uid.clone(),
            serial: fixture.serial.clone(),
            label: fixture.label.clone(),
            device_type: fixture.device_type.clone(),
            country: fixture.country.clone(),
            online: fixture.online,
            in_service: fixture.in_service,
            key_switch_state: fixture.key_switch_state,
            main_hardware: fixture.main_hardware.clone(),
            main_firmware: fixture.main_firmware.clone(),
            updates,
        }
    }

    fn filler(index: usize) -> Self {
        let online = index % 7 != 3;
        Self {
            uid: format!("200fc1{:026}", index),
            serial: format!("Stub Device {:03}", index),
            label: String::new(),
            device_type: "zkl-3000-rc".to_string(),
            country: if index % 2 == 0 { "NL" } else { "BE" }.to_string(),
            online,
            in_service: true,
            key_switch_state: 1,
            main_hardware: "1.2".to_string(),
            main_firmware: "1.3.1".to_string(),
            updates: vec![AvailableUpdate {
                id: 7_000_000 + index as u64,
                version: RC1.to_string(),
                update_type: COMPONENT.to_string(),
                selectable: online,
            }],
        }
    }

    pub fn selectable(&self) -> bool {
        self.online && self.in_service
    }

    /// Empty when the device is selectable
    pub fn selectable_reason(&self) -> &'static str {
        if !self.online {
            REASON_DEVICE_OFFLINE
        } else if !self.in_service {
            REASON_NOT_IN_SERVICE
        } else {
            ""
        }
    }

    fn job_template(&self, version: &str, operator: &str) -> JobRecord {
        JobRecord {
            id: JobId(0),
            created_at: String::new(),
            created_by: operator.to_string(),
            uid: self.uid.clone(),
            state: JobState::DownloadQueued,
            updated_at: String::new(),
            firmware_path: String::new(),
            serial: self.serial.clone(),
            label: self.label.clone(),
            is_online: self.online,
            version: version.to_string(),
            error_code: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FirmwareFile {
    pub id: u64,
    pub content: bytes::Bytes,
}

struct Inner {
    config: StubConfig,
    devices: Vec<StubDevice>,
    by_uid: HashMap<String, usize>,
    by_update: HashMap<u64, (usize, AvailableUpdate)>,
    files: HashMap<String, FirmwareFile>,
    store: Mutex<JobStore>,
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct StubState {
    inner: Arc<Inner>,
}

impl StubState {
    /// Build a stub serving the fixture devices plus generated filler
    /// devices, each with one historical job
    pub fn seeded(fixtures: &FixtureRegistry, config: StubConfig) -> Self {
        let mut devices: Vec<StubDevice> =
            fixtures.devices().iter().map(StubDevice::from_fixture).collect();
        devices.extend((0..config.filler_devices).map(StubDevice::filler));

        let mut store = JobStore::new(FIRST_JOB_ID);
        let reference = &fixtures.scenarios().reference_job;
        if let Some(device) = fixtures.device(&reference.device) {
            store.seed(
                JobRecord {
                    id: JobId(reference.id),
                    created_at: "2024-04-02T09:12:00Z".to_string(),
                    created_by: reference.created_by.clone(),
                    uid: device.uid.clone(),
                    state: reference.state.clone(),
                    updated_at: "2024-04-02T09:30:00Z".to_string(),
                    firmware_path: reference.firmware_path.clone(),
                    serial: reference.serial.clone(),
                    label: reference.label.clone(),
                    is_online: reference.is_online,
                    version: reference.version.clone(),
                    error_code: reference.error_code.clone(),
                },
                COMPONENT,
            );
        }

        for (index, device) in devices.iter().enumerate() {
            let mut record = device.job_template(RC1, &config.operator);
            record.id = JobId(reference.id + 100 + index as u64);
            record.state = JobState::Installed;
            record.created_at = format!("2024-05-{:02}T08:00:00Z", index % 28 + 1);
            record.updated_at = format!("2024-05-{:02}T08:{:02}:00Z", index % 28 + 1, index % 60);
            store.seed(record, COMPONENT);

            let firmware = if device.main_firmware.is_empty() {
                BASE_FIRMWARE
            } else {
                device.main_firmware.as_str()
            };
            store.seed_history(
                &device.uid,
                vec![HistoryEntry {
                    previous_firmware_version: BASE_FIRMWARE.to_string(),
                    current_firmware_version: firmware.to_string(),
                    updated_by: config.operator.clone(),
                    firmware_type: COMPONENT.to_string(),
                    updated_time: "2024-05-01 08:00:00".to_string(),
                    status: JobState::Installed.to_string(),
                }],
                firmware,
            );
        }

        let by_uid = devices
            .iter()
            .enumerate()
            .map(|(i, d)| (d.uid.clone(), i))
            .collect();
        let by_update = devices
            .iter()
            .enumerate()
            .flat_map(|(i, d)| d.updates.iter().map(move |u| (u.id, (i, u.clone()))))
            .collect();

        let download = &fixtures.scenarios().download.link;
        let mut files = HashMap::new();
        files.insert(
            download.file.clone(),
            FirmwareFile {
                id: download.id.unwrap_or(1),
                content: bytes::Bytes::from(format!("firmware image {}\n", download.file)),
            },
        );

        tracing::debug!(devices = devices.len(), "Stub state seeded");

        Self {
            inner: Arc::new(Inner {
                config,
                devices,
                by_uid,
                by_update,
                files,
                store: Mutex::new(store),
            }),
        }
    }

    pub fn config(&self) -> &StubConfig {
        &self.inner.config
    }

    pub fn devices(&self) -> &[StubDevice] {
        &self.inner.devices
    }

    pub fn device(&self, uid: &str) -> Option<&StubDevice> {
        self.inner.by_uid.get(uid).map(|&i| &self.inner.devices[i])
    }

    pub(crate) fn device_for_update(&self, update_id: u64) -> Option<(&StubDevice, &AvailableUpdate)> {
        self.inner
            .by_update
            .get(&update_id)
            .map(|(i, update)| (&self.inner.devices[*i], update))
    }

    pub(crate) fn new_job_template(&self, device: &StubDevice, version: &str) -> JobRecord {
        device.job_template(version, &self.inner.config.operator)
    }

    pub(crate) fn file(&self, name: &str) -> Option<&FirmwareFile> {
        self.inner.files.get(name)
    }

    /// Lock the job store after applying due transitions
    pub(crate) fn jobs(&self) -> MutexGuard<'_, JobStore> {
        let mut store = self.inner.store.lock();
        store.advance(&self.inner.config);
        store
    }

    /// Current state of a job, for tests and tooling
    pub fn job_state(&self, id: JobId) -> Option<JobState> {
        self.jobs().get(id.0).map(|job| job.record.state.clone())
    }

    /// Sign a link to a served firmware file
    pub fn sign_download(&self, file: &str, exp: i64) -> Option<SignedDownload> {
        let firmware = self.file(file)?;
        let sig = signing::sign(&self.inner.config.signing_key, file, firmware.id, exp);
        Some(SignedDownload::new(file, firmware.id, exp, sig))
    }
}
