use crate::core::calculator::weekly::{WeeklyReport, weekly_report};
use crate::core::context::AppContext;
use crate::core::session::Session;
use crate::errors::AppResult;
use crate::utils::table::{Column, Table};
use crate::utils::time::format_hms;
use chrono::{FixedOffset, NaiveDate};
use csv::Writer;
use std::path::Path;

pub struct ReportLogic;

impl ReportLogic {
    /// Fetch the remote history and aggregate the week containing `any_day`.
    pub fn weekly(ctx: &AppContext, session: &Session, any_day: NaiveDate) -> AppResult<WeeklyReport> {
        let employee_id = session.employee_id()?;
        let punches = ctx.api.fetch_history(&session.token, employee_id)?;
        tracing::debug!(employee_id, count = punches.len(), "history fetched");
        Ok(weekly_report(&punches, any_day, &ctx.clock.offset()))
    }

    pub fn render(report: &WeeklyReport, offset: &FixedOffset) -> String {
        let mut table = Table::new(vec![
            Column::new("Day", 16),
            Column::new("IN", 9),
            Column::new("OUT", 9),
            Column::new("Worked", 12),
        ]);

        for day in &report.days {
            let label = day.day.format("%a %Y-%m-%d").to_string();
            if day.pairs.is_empty() {
                table.add_row(vec![label, "-".into(), "-".into(), format_hms(0)]);
                continue;
            }
            for (i, p) in day.pairs.iter().enumerate() {
                table.add_row(vec![
                    if i == 0 { label.clone() } else { String::new() },
                    p.start.with_timezone(offset).format("%H:%M:%S").to_string(),
                    p.end.with_timezone(offset).format("%H:%M:%S").to_string(),
                    format_hms(p.duration_seconds),
                ]);
            }
            if day.pairs.len() > 1 {
                table.add_row(vec![
                    String::new(),
                    String::new(),
                    "total".into(),
                    format_hms(day.total_seconds),
                ]);
            }
        }

        let mut out = table.render();
        out.push_str(&format!("\nWeek total: {}\n", format_hms(report.total_seconds)));
        if report.open_in {
            out.push_str("Open IN without OUT not counted.\n");
        }
        out
    }

    /// One line per pair; days without work are omitted.
    pub fn write_csv(path: &Path, report: &WeeklyReport, offset: &FixedOffset) -> AppResult<()> {
        let mut wtr = Writer::from_path(path)?;

        wtr.write_record(["date", "in", "out", "seconds", "worked"])?;

        for day in &report.days {
            for p in &day.pairs {
                wtr.write_record(&[
                    day.day.format("%Y-%m-%d").to_string(),
                    p.start.with_timezone(offset).to_rfc3339(),
                    p.end.with_timezone(offset).to_rfc3339(),
                    p.duration_seconds.to_string(),
                    format_hms(p.duration_seconds),
                ])?;
            }
        }

        wtr.flush()?;
        Ok(())
    }
}
