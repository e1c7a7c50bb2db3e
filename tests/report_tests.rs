use chrono::{FixedOffset, NaiveDate};
use rpunch::core::calculator::timeline::build_timeline;
use rpunch::core::calculator::weekly::weekly_report;
use rpunch::core::report::ReportLogic;
use rpunch::errors::AppError;
use rpunch::models::punch_type::PunchType::{In, Out};
use rpunch::models::remote::RemotePunch;
use std::env;
use std::fs;

mod common;
use common::{Harness, t};

fn p(kind: rpunch::models::punch_type::PunchType, at: &str) -> RemotePunch {
    RemotePunch::new(kind, t(at))
}

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Week of 2025-03-03 (Monday).
fn week_of_punches() -> Vec<RemotePunch> {
    vec![
        p(In, "2025-03-03T08:00:00Z"),
        p(Out, "2025-03-03T12:00:00Z"),
        p(In, "2025-03-03T13:00:00Z"),
        p(Out, "2025-03-03T17:30:00Z"),
        p(In, "2025-03-04T09:00:00Z"),
        p(Out, "2025-03-04T17:00:00Z"),
        // night shift crossing midnight: counted on Wednesday
        p(In, "2025-03-05T23:00:00Z"),
        p(Out, "2025-03-06T01:00:00Z"),
        // trailing IN without OUT
        p(In, "2025-03-07T09:00:00Z"),
    ]
}

#[test]
fn weekly_totals_follow_the_in_day() {
    let report = weekly_report(&week_of_punches(), day("2025-03-05"), &utc());

    assert_eq!(report.week_start, day("2025-03-03"));
    assert_eq!(report.days.len(), 7);

    let totals: Vec<i64> = report.days.iter().map(|d| d.total_seconds).collect();
    assert_eq!(
        totals,
        vec![8 * 3600 + 1800, 8 * 3600, 2 * 3600, 0, 0, 0, 0]
    );
    assert_eq!(report.total_seconds, 18 * 3600 + 1800);
    assert!(report.open_in);
}

#[test]
fn unmatched_out_is_dropped_and_double_in_replaced() {
    let tl = build_timeline(&[
        p(Out, "2025-03-03T07:00:00Z"),
        p(In, "2025-03-03T08:00:00Z"),
        p(In, "2025-03-03T09:00:00Z"),
        p(Out, "2025-03-03T10:00:00Z"),
    ]);

    assert_eq!(tl.dropped_outs, 1);
    assert_eq!(tl.pairs.len(), 1);
    assert_eq!(tl.pairs[0].start, t("2025-03-03T09:00:00Z"));
    assert_eq!(tl.total_worked_seconds, 3600);
    assert_eq!(tl.open_in, None);
}

#[test]
fn history_order_does_not_matter() {
    let mut shuffled = week_of_punches();
    shuffled.reverse();
    let a = weekly_report(&week_of_punches(), day("2025-03-03"), &utc());
    let b = weekly_report(&shuffled, day("2025-03-03"), &utc());
    assert_eq!(a, b);
}

#[test]
fn punches_outside_the_week_are_ignored() {
    let mut punches = week_of_punches();
    punches.push(p(In, "2025-03-10T08:00:00Z"));
    punches.push(p(Out, "2025-03-10T16:00:00Z"));

    let report = weekly_report(&punches, day("2025-03-09"), &utc());
    assert_eq!(report.total_seconds, 18 * 3600 + 1800);

    let next = weekly_report(&punches, day("2025-03-10"), &utc());
    assert_eq!(next.total_seconds, 8 * 3600);
    assert!(!next.open_in);
}

#[test]
fn local_offset_moves_work_to_the_local_day() {
    let cet = FixedOffset::east_opt(3600).unwrap();
    let punches = vec![
        p(In, "2025-03-03T23:30:00Z"), // Tuesday 00:30 at UTC+1
        p(Out, "2025-03-04T03:30:00Z"),
    ];
    let report = weekly_report(&punches, day("2025-03-04"), &cet);
    assert_eq!(report.days[0].total_seconds, 0);
    assert_eq!(report.days[1].total_seconds, 4 * 3600);
}

#[test]
fn report_uses_the_session_history() {
    let h = Harness::new();
    *h.api.history.borrow_mut() = week_of_punches();

    let report = ReportLogic::weekly(&h.ctx, &h.session("alice"), day("2025-03-06")).unwrap();
    assert_eq!(report.total_seconds, 18 * 3600 + 1800);

    let text = ReportLogic::render(&report, &utc());
    assert!(text.contains("Week total: 18h 30m 0s"));
    assert!(text.contains("Open IN without OUT not counted."));
}

#[test]
fn report_needs_an_employee_id() {
    let h = Harness::new();
    let mut session = h.session("alice");
    session.employee_id = None;

    let err = ReportLogic::weekly(&h.ctx, &session, day("2025-03-06")).unwrap_err();
    assert!(matches!(err, AppError::MissingEmployeeId(_)));
}

#[test]
fn csv_export_has_one_line_per_pair() {
    let report = weekly_report(&week_of_punches(), day("2025-03-03"), &utc());
    let mut path = env::temp_dir();
    path.push("weekly_report_rpunch.csv");
    fs::remove_file(&path).ok();

    ReportLogic::write_csv(&path, &report, &utc()).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "date,in,out,seconds,worked");
    assert_eq!(lines.len(), 1 + 4);
    assert!(lines[1].starts_with("2025-03-03,"));
    assert!(lines[1].ends_with(",14400,4h 0m 0s"));
    assert!(lines[4].starts_with("2025-03-05,"));
}
