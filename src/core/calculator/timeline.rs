use crate::models::punch_type::PunchType;
use crate::models::remote::RemotePunch;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// A completed IN/OUT pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_seconds: i64,
}

impl Pair {
    /// Calendar day the pair is attributed to: the day of the IN.
    pub fn day(&self, offset: &FixedOffset) -> NaiveDate {
        self.start.with_timezone(offset).date_naive()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Timeline {
    pub pairs: Vec<Pair>,
    /// IN still waiting for its OUT at the end of the sequence.
    pub open_in: Option<DateTime<Utc>>,
    /// OUT records with no IN before them.
    pub dropped_outs: usize,
    pub total_worked_seconds: i64,
}

/// Pair punches in chronological order.
///
/// A second IN replaces an unmatched one, an OUT without an open IN is
/// dropped, and a trailing IN is left open (not counted).
pub fn build_timeline(punches: &[RemotePunch]) -> Timeline {
    let mut sorted = punches.to_vec();
    sorted.sort_by_key(|p| p.instant);

    let mut tl = Timeline::default();

    for p in &sorted {
        match p.kind {
            PunchType::In => {
                if let Some(prev) = tl.open_in {
                    tracing::debug!(%prev, replaced_by = %p.instant, "unmatched IN replaced");
                }
                tl.open_in = Some(p.instant);
            }
            PunchType::Out => match tl.open_in.take() {
                Some(start) => {
                    let duration = (p.instant - start).num_seconds();
                    tl.total_worked_seconds += duration;
                    tl.pairs.push(Pair {
                        start,
                        end: p.instant,
                        duration_seconds: duration,
                    });
                }
                None => tl.dropped_outs += 1,
            },
        }
    }

    tl
}
