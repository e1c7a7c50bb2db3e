//! Payloads exchanged with the remote punch API.

use super::location::GeoFix;
use super::punch::PunchRecord;
use super::punch_type::PunchType;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Timestamp layout used on the wire: ISO-8601 without zone designator.
/// The value is always UTC.
pub const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PunchSubmissionItem {
    pub instant: String,
    #[serde(rename = "type")]
    pub kind: PunchType,
    pub longitude: f64,
    pub latitude: f64,
    pub precision: f64,
    pub reason_code: String,
}

impl PunchSubmissionItem {
    pub fn from_record(record: &PunchRecord, reason_code: &str) -> Self {
        let fix = record.location.unwrap_or(GeoFix::new(0.0, 0.0, 0.0));
        Self {
            instant: format_instant(&record.time),
            kind: record.kind,
            longitude: fix.longitude,
            latitude: fix.latitude,
            precision: fix.precision,
            reason_code: reason_code.to_string(),
        }
    }
}

/// Batch body of `POST /punches`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PunchSubmission {
    pub list_of_punches: Vec<PunchSubmissionItem>,
}

impl PunchSubmission {
    pub fn from_records(records: &[PunchRecord], reason_code: &str) -> Self {
        Self {
            list_of_punches: records
                .iter()
                .map(|r| PunchSubmissionItem::from_record(r, reason_code))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.list_of_punches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list_of_punches.is_empty()
    }
}

/// One entry of `GET /punches?employeeId=…`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemotePunch {
    #[serde(deserialize_with = "deserialize_instant")]
    pub instant: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: PunchType,
}

impl RemotePunch {
    pub fn new(kind: PunchType, instant: DateTime<Utc>) -> Self {
        Self { instant, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub employee_id: i64,
}

pub fn format_instant(t: &DateTime<Utc>) -> String {
    t.naive_utc().format(INSTANT_FORMAT).to_string()
}

/// Accepts both `2025-03-03T08:00:00.000` and `2025-03-03T08:00:00Z`.
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|n| n.and_utc())
}

fn deserialize_instant<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_instant(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid instant: {raw}")))
}
