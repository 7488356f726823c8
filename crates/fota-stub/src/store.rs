//! Job store with time-driven progression
//!
//! Queued jobs do not move on their own; every access first calls
//! [`JobStore::advance`], which applies whatever transitions have come due
//! since the previous access.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use fota_core::{HistoryEntry, JobId, JobRecord, JobState};

use crate::config::StubConfig;

pub(crate) fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn history_time() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[derive(Debug, Clone)]
pub(crate) struct StoredJob {
    pub record: JobRecord,
    /// Firmware component, e.g. `nmdi`
    pub component: String,
    changed: Instant,
}

#[derive(Debug)]
pub(crate) struct JobStore {
    jobs: BTreeMap<u64, StoredJob>,
    next_id: u64,
    history: HashMap<String, Vec<HistoryEntry>>,
    firmware: HashMap<String, String>,
}

impl JobStore {
    pub fn new(first_id: u64) -> Self {
        Self {
            jobs: BTreeMap::new(),
            next_id: first_id,
            history: HashMap::new(),
            firmware: HashMap::new(),
        }
    }

    /// Add a pre-existing job
    pub fn seed(&mut self, record: JobRecord, component: &str) {
        self.jobs.insert(
            record.id.0,
            StoredJob {
                record,
                component: component.to_string(),
                changed: Instant::now(),
            },
        );
    }

    pub fn seed_history(&mut self, uid: &str, entries: Vec<HistoryEntry>, firmware: &str) {
        self.history.insert(uid.to_string(), entries);
        self.firmware.insert(uid.to_string(), firmware.to_string());
    }

    /// Queue a download for one device
    pub fn create(&mut self, template: JobRecord, component: &str) -> StoredJob {
        let id = self.next_id;
        self.next_id += 1;
        let now = timestamp();
        let record = JobRecord {
            id: JobId(id),
            state: JobState::DownloadQueued,
            created_at: now.clone(),
            updated_at: now,
            ..template
        };
        let job = StoredJob {
            record,
            component: component.to_string(),
            changed: Instant::now(),
        };
        self.jobs.insert(id, job.clone());
        job
    }

    /// Apply every transition that has come due
    pub fn advance(&mut self, config: &StubConfig) {
        let now = Instant::now();
        let JobStore {
            jobs,
            history,
            firmware,
            ..
        } = self;

        for job in jobs.values_mut() {
            let (due, next) = match job.record.state {
                JobState::DownloadQueued => (config.download_delay, JobState::DownloadReady),
                JobState::UpdateQueued if config.failing_uids.contains(&job.record.uid) => {
                    (config.install_delay, JobState::Error)
                }
                JobState::UpdateQueued => (config.install_delay, JobState::Installed),
                _ => continue,
            };
            if now.duration_since(job.changed) < due {
                continue;
            }

            if next.is_install_outcome() {
                let previous = firmware
                    .get(&job.record.uid)
                    .cloned()
                    .unwrap_or_default();
                let current = if next == JobState::Installed {
                    job.record.version.clone()
                } else {
                    previous.clone()
                };
                history
                    .entry(job.record.uid.clone())
                    .or_default()
                    .push(HistoryEntry {
                        previous_firmware_version: previous,
                        current_firmware_version: current.clone(),
                        updated_by: config.operator.clone(),
                        firmware_type: job.component.clone(),
                        updated_time: history_time(),
                        status: next.to_string(),
                    });
                firmware.insert(job.record.uid.clone(), current);
                if next == JobState::Error {
                    job.record.error_code = "INSTALL_FAILED".to_string();
                }
            }

            tracing::debug!(job = job.record.id.0, from = %job.record.state, to = %next, "Job advanced");
            job.record.state = next;
            job.record.updated_at = timestamp();
            job.changed = now;
        }
    }

    pub fn get(&self, id: u64) -> Option<&StoredJob> {
        self.jobs.get(&id)
    }

    /// Move a job to `next`, returning the state it left
    pub fn transition(&mut self, id: u64, next: JobState) -> Option<JobState> {
        let job = self.jobs.get_mut(&id)?;
        let previous = std::mem::replace(&mut job.record.state, next);
        if job.record.state == JobState::UpdateQueued {
            job.record.error_code.clear();
        }
        job.record.updated_at = timestamp();
        job.changed = Instant::now();
        Some(previous)
    }

    pub fn records(&self) -> impl Iterator<Item = &JobRecord> {
        self.jobs.values().map(|job| &job.record)
    }

    pub fn history(&self, uid: &str) -> Option<&[HistoryEntry]> {
        self.history.get(uid).map(Vec::as_slice)
    }
}
