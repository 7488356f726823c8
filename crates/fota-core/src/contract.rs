//! Field presence and type contracts for JSON records
//!
//! Scenarios check raw `serde_json::Value` records against these tables so a
//! single missing or mistyped field is reported by name, rather than as an
//! opaque decode error from the typed models.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

/// Expected JSON type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Bool,
    Number,
    /// JSON number or a string holding an unsigned integer
    NumericId,
    /// String that parses as a date/time
    Timestamp,
    Array,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::String => "string",
            FieldType::Bool => "boolean",
            FieldType::Number => "number",
            FieldType::NumericId => "numeric id",
            FieldType::Timestamp => "timestamp",
            FieldType::Array => "array",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
}

const fn field(name: &'static str, ty: FieldType) -> FieldSpec {
    FieldSpec { name, ty }
}

pub const JOB_FIELDS: &[FieldSpec] = &[
    field("id", FieldType::NumericId),
    field("created_at", FieldType::Timestamp),
    field("created_by", FieldType::String),
    field("uid", FieldType::String),
    field("state", FieldType::String),
    field("updated_at", FieldType::Timestamp),
    field("FirmwarePath", FieldType::String),
    field("serial", FieldType::String),
    field("label", FieldType::String),
    field("is_online", FieldType::Bool),
    field("version", FieldType::String),
    field("error_code", FieldType::String),
];

pub const AVAILABLE_UPDATE_DEVICE_FIELDS: &[FieldSpec] = &[
    field("uid", FieldType::String),
    field("serial", FieldType::String),
    field("label", FieldType::String),
    field("isOnline", FieldType::Bool),
    field("inService", FieldType::Bool),
    field("deviceType", FieldType::String),
    field("country", FieldType::String),
    field("availableUpdates", FieldType::Array),
    field("selectable", FieldType::Bool),
    field("selectableReason", FieldType::String),
];

pub const AVAILABLE_UPDATE_FIELDS: &[FieldSpec] = &[
    field("id", FieldType::NumericId),
    field("version", FieldType::String),
    field("type", FieldType::String),
    field("selectable", FieldType::Bool),
];

pub const HISTORY_FIELDS: &[FieldSpec] = &[
    field("previousFirmwareVersion", FieldType::String),
    field("currentFirmwareVersion", FieldType::String),
    field("updatedBy", FieldType::String),
    field("firmwareType", FieldType::String),
    field("updatedTime", FieldType::String),
    field("status", FieldType::String),
];

/// A field that is missing or has the wrong type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub expected: FieldType,
    /// Literal value found, or `<missing>`
    pub actual: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "field `{}`: expected {}, got {}",
            self.field, self.expected, self.actual
        )
    }
}

/// Parse the timestamp formats the service emits
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn matches(ty: FieldType, value: &Value) -> bool {
    match ty {
        FieldType::String => value.is_string(),
        FieldType::Bool => value.is_boolean(),
        FieldType::Number => value.is_number(),
        FieldType::NumericId => match value {
            Value::Number(n) => n.is_u64(),
            Value::String(s) => !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()),
            _ => false,
        },
        FieldType::Timestamp => value.as_str().and_then(parse_timestamp).is_some(),
        FieldType::Array => value.is_array(),
    }
}

/// Check `record` against `specs`, returning every violation
pub fn check_fields(record: &Value, specs: &[FieldSpec]) -> Vec<Violation> {
    specs
        .iter()
        .filter_map(|spec| match record.get(spec.name) {
            None => Some(Violation {
                field: spec.name,
                expected: spec.ty,
                actual: "<missing>".to_string(),
            }),
            Some(value) if !matches(spec.ty, value) => Some(Violation {
                field: spec.name,
                expected: spec.ty,
                actual: value.to_string(),
            }),
            Some(_) => None,
        })
        .collect()
}
