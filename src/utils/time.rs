//! Time utilities: parsing HH:MM, display formats, duration formatting.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, FixedOffset, NaiveTime, Utc};

/// Display format of punch times (`03/14/2025 08:30:00`).
pub const PUNCH_TIME_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

pub fn parse_time(t: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(t, "%H:%M").ok()
}

pub fn parse_time_strict(t: &str) -> AppResult<NaiveTime> {
    parse_time(t).ok_or_else(|| AppError::InvalidTime(t.to_string()))
}

pub fn format_punch_time(t: &DateTime<Utc>, offset: &FixedOffset) -> String {
    t.with_timezone(offset).format(PUNCH_TIME_FORMAT).to_string()
}

/// `7h 5m 3s`
pub fn format_hms(total_seconds: i64) -> String {
    let sign = if total_seconds < 0 { "-" } else { "" };
    let s = total_seconds.abs();
    format!("{}{}h {}m {}s", sign, s / 3600, (s % 3600) / 60, s % 60)
}
