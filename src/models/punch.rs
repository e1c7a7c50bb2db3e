use super::location::{GeoFix, UNKNOWN_PLACE};
use super::punch_type::PunchType;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the pending / today buffers.
///
/// Stored as JSON objects of the shape
/// `{"type":"IN","time":"2025-03-03T08:00:00Z","placeName":"…","longitude":…,"latitude":…,"precision":…}`.
/// The coordinates are absent when no reading was available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PunchRecord {
    #[serde(rename = "type")]
    pub kind: PunchType,
    pub time: DateTime<Utc>,
    #[serde(rename = "placeName", default = "unknown_place")]
    pub place_name: String,
    #[serde(flatten)]
    pub location: Option<GeoFix>,
}

fn unknown_place() -> String {
    UNKNOWN_PLACE.to_string()
}

impl PunchRecord {
    pub fn new(kind: PunchType, time: DateTime<Utc>) -> Self {
        Self {
            kind,
            time,
            place_name: unknown_place(),
            location: None,
        }
    }

    pub fn with_location(mut self, fix: Option<GeoFix>, place_name: impl Into<String>) -> Self {
        self.location = fix;
        self.place_name = place_name.into();
        self
    }

    pub fn local_date(&self, offset: &FixedOffset) -> NaiveDate {
        self.time.with_timezone(offset).date_naive()
    }
}

/// Attendance flag and the time of the punch that set it.
///
/// Always read and written as a pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PunchState {
    pub is_punched_in: bool,
    pub punch_time: Option<DateTime<Utc>>,
}

/// Marker written at sign-in / sign-out, used to detect sessions that ended
/// without a clean sign-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMarker {
    LoggedIn,
    LoggedOut,
}

impl LogMarker {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogMarker::LoggedIn => "logged in",
            LogMarker::LoggedOut => "logged out",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "logged in" => Some(LogMarker::LoggedIn),
            "logged out" => Some(LogMarker::LoggedOut),
            _ => None,
        }
    }
}
