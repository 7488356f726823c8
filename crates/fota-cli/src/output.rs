//! Output formatting for fota-cli (table, json, csv)

use clap::ValueEnum;
use colored::Colorize;
use fota_core::{
    AvailableUpdateDevice, BulkDevice, HistoryEntry, JobActionResult, JobRecord, JobSummary,
};
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

/// Context for output rendering
pub struct OutputContext {
    pub format: OutputFormat,
    pub quiet: bool,
}

impl OutputContext {
    pub fn new(format: OutputFormat, no_color: bool, quiet: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { format, quiet }
    }

    /// Print a success message (unless in quiet mode)
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg.green());
        }
    }

    /// Print an info message (unless in quiet mode)
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg);
        }
    }

    pub fn warn(&self, msg: &str) {
        eprintln!("{}", msg.yellow());
    }

    /// Print data in the configured format
    pub fn print<T: Tabled + Serialize>(&self, data: &[T]) {
        match self.format {
            OutputFormat::Table => {
                if data.is_empty() {
                    if !self.quiet {
                        println!("No data");
                    }
                } else {
                    println!("{}", Table::new(data));
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(data).unwrap_or_else(|_| "[]".to_string())
                );
            }
            OutputFormat::Csv => println!("{}", to_csv(data)),
        }
    }
}

/// Render rows as CSV, columns named after the first row's keys
fn to_csv<T: Serialize>(data: &[T]) -> String {
    let rows: Vec<serde_json::Map<String, serde_json::Value>> = data
        .iter()
        .filter_map(|item| match serde_json::to_value(item) {
            Ok(serde_json::Value::Object(map)) => Some(map),
            _ => None,
        })
        .collect();
    let Some(first) = rows.first() else {
        return String::new();
    };

    let headers: Vec<&String> = first.keys().collect();
    let mut lines = vec![headers
        .iter()
        .map(|h| h.as_str())
        .collect::<Vec<_>>()
        .join(",")];
    for row in &rows {
        let values: Vec<String> = headers
            .iter()
            .map(|h| match row.get(h.as_str()) {
                Some(serde_json::Value::String(s)) => escape_csv(s),
                Some(other) => escape_csv(&other.to_string()),
                None => String::new(),
            })
            .collect();
        lines.push(values.join(","));
    }
    lines.join("\n")
}

/// Escape a value for CSV output
fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn yes_no(value: bool) -> String {
    if value { "Yes" } else { "No" }.to_string()
}

fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

// =============================================================================
// Display types for various commands
// =============================================================================

/// Device row for the updates command
#[derive(Debug, Tabled, Serialize)]
pub struct DeviceRow {
    #[tabled(rename = "UID")]
    pub uid: String,
    #[tabled(rename = "Serial")]
    pub serial: String,
    #[tabled(rename = "Type")]
    pub device_type: String,
    #[tabled(rename = "Online")]
    pub online: String,
    #[tabled(rename = "Selectable")]
    pub selectable: String,
    #[tabled(rename = "Updates")]
    pub updates: String,
}

impl From<&AvailableUpdateDevice> for DeviceRow {
    fn from(d: &AvailableUpdateDevice) -> Self {
        let selectable = if d.selectable {
            yes_no(true)
        } else {
            format!("No ({})", d.selectable_reason)
        };
        Self {
            uid: d.uid.clone(),
            serial: d.serial.clone(),
            device_type: d.device_type.clone(),
            online: yes_no(d.is_online),
            selectable,
            updates: d
                .available_updates
                .iter()
                .map(|u| format!("{}:{}", u.id, u.version))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// Job row for the jobs command
#[derive(Debug, Tabled, Serialize)]
pub struct JobRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "UID")]
    pub uid: String,
    #[tabled(rename = "Serial")]
    pub serial: String,
    #[tabled(rename = "State")]
    pub state: String,
    #[tabled(rename = "Version")]
    pub version: String,
    #[tabled(rename = "Updated")]
    pub updated_at: String,
    #[tabled(rename = "Error")]
    pub error_code: String,
}

impl From<&JobRecord> for JobRow {
    fn from(j: &JobRecord) -> Self {
        Self {
            id: j.id.to_string(),
            uid: j.uid.clone(),
            serial: j.serial.clone(),
            state: j.state.to_string(),
            version: j.version.clone(),
            updated_at: j.updated_at.clone(),
            error_code: or_dash(&j.error_code),
        }
    }
}

/// History row for the history command
#[derive(Debug, Tabled, Serialize)]
pub struct HistoryRow {
    #[tabled(rename = "Time")]
    pub updated_time: String,
    #[tabled(rename = "From")]
    pub previous: String,
    #[tabled(rename = "To")]
    pub current: String,
    #[tabled(rename = "Type")]
    pub firmware_type: String,
    #[tabled(rename = "By")]
    pub updated_by: String,
    #[tabled(rename = "Status")]
    pub status: String,
}

impl From<&HistoryEntry> for HistoryRow {
    fn from(h: &HistoryEntry) -> Self {
        Self {
            updated_time: h.updated_time.clone(),
            previous: or_dash(&h.previous_firmware_version),
            current: h.current_firmware_version.clone(),
            firmware_type: h.firmware_type.clone(),
            updated_by: h.updated_by.clone(),
            status: h.status.clone(),
        }
    }
}

/// One created job per row for the bulk command
#[derive(Debug, Tabled, Serialize)]
pub struct BulkRow {
    #[tabled(rename = "UID")]
    pub uid: String,
    #[tabled(rename = "Serial")]
    pub serial: String,
    #[tabled(rename = "Checks")]
    pub check_passed: String,
    #[tabled(rename = "Job")]
    pub job_id: String,
    #[tabled(rename = "Component")]
    pub component: String,
    #[tabled(rename = "Version")]
    pub version: String,
    #[tabled(rename = "State")]
    pub state: String,
}

impl BulkRow {
    /// One row per job, or a single job-less row for a device that got none
    pub fn from_device(d: &BulkDevice) -> Vec<Self> {
        if d.jobs.is_empty() {
            return vec![Self {
                uid: d.uid.clone(),
                serial: d.serial.clone(),
                check_passed: yes_no(d.check_passed),
                job_id: "-".to_string(),
                component: "-".to_string(),
                version: "-".to_string(),
                state: "-".to_string(),
            }];
        }
        d.jobs
            .iter()
            .map(|j| Self {
                uid: d.uid.clone(),
                serial: d.serial.clone(),
                check_passed: yes_no(d.check_passed),
                job_id: j.id.to_string(),
                component: or_dash(&j.component),
                version: or_dash(&j.version),
                state: j.state.to_string(),
            })
            .collect()
    }
}

/// Per-job outcome of update, cancel and retry
#[derive(Debug, Tabled, Serialize)]
pub struct ActionRow {
    #[tabled(rename = "Job")]
    pub id: String,
    #[tabled(rename = "UID")]
    pub uid: String,
    #[tabled(rename = "State")]
    pub state: String,
    #[tabled(rename = "Successful")]
    pub successful: String,
}

impl From<&JobActionResult> for ActionRow {
    fn from(r: &JobActionResult) -> Self {
        Self {
            id: r.id.to_string(),
            uid: r.uid.clone(),
            state: r.state.to_string(),
            successful: yes_no(r.successful),
        }
    }
}

impl From<&JobSummary> for ActionRow {
    fn from(s: &JobSummary) -> Self {
        Self {
            id: s.id.to_string(),
            uid: s.uid.clone(),
            state: s.state.to_string(),
            successful: "-".to_string(),
        }
    }
}
