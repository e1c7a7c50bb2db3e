//! Weekly aggregation of remote punch history.

use super::timeline::{Pair, build_timeline};
use crate::models::remote::RemotePunch;
use crate::utils::date::{week_days, week_start};
use chrono::{FixedOffset, NaiveDate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayTotal {
    pub day: NaiveDate,
    pub pairs: Vec<Pair>,
    pub total_seconds: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyReport {
    pub week_start: NaiveDate,
    /// Monday to Sunday, always seven entries.
    pub days: Vec<DayTotal>,
    pub total_seconds: i64,
    /// A trailing IN without OUT, excluded from totals.
    pub open_in: bool,
}

/// Report for the week (Monday..Sunday) containing `any_day`.
///
/// Only punches whose local day falls inside the week are considered.
/// Durations are attributed to the day of the IN.
pub fn weekly_report(
    punches: &[RemotePunch],
    any_day: NaiveDate,
    offset: &FixedOffset,
) -> WeeklyReport {
    let monday = week_start(any_day);
    let days = week_days(monday);
    let sunday = days[days.len() - 1];

    let in_week: Vec<RemotePunch> = punches
        .iter()
        .filter(|p| {
            let d = p.instant.with_timezone(offset).date_naive();
            d >= monday && d <= sunday
        })
        .cloned()
        .collect();

    let timeline = build_timeline(&in_week);

    let days: Vec<DayTotal> = days
        .into_iter()
        .map(|day| {
            let pairs: Vec<Pair> = timeline
                .pairs
                .iter()
                .filter(|p| p.day(offset) == day)
                .cloned()
                .collect();
            let total_seconds = pairs.iter().map(|p| p.duration_seconds).sum();
            DayTotal {
                day,
                pairs,
                total_seconds,
            }
        })
        .collect();

    WeeklyReport {
        week_start: monday,
        total_seconds: days.iter().map(|d| d.total_seconds).sum(),
        days,
        open_in: timeline.open_in.is_some(),
    }
}
