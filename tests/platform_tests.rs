use rpunch::config::Config;
use rpunch::db::log::load_log;
use rpunch::models::location::GeoFix;
use rpunch::models::notification::{Notification, NotificationKind};
use rpunch::models::punch_type::PunchType;
use rpunch::models::remote::{RemotePunch, format_instant, parse_instant};
use rpunch::platform::connectivity::authority_of;
use rpunch::platform::location::{LocationProvider, StoredLocation};
use rpunch::platform::notifier::{ConsoleNotifier, Notifier};

mod common;
use common::{Harness, t};

#[test]
fn authority_fills_in_default_ports() {
    assert_eq!(
        authority_of("https://api.example.com/v1").as_deref(),
        Some("api.example.com:443")
    );
    assert_eq!(
        authority_of("http://localhost:8080/api").as_deref(),
        Some("localhost:8080")
    );
    assert_eq!(
        authority_of("http://user@10.0.0.1?x=1").as_deref(),
        Some("10.0.0.1:80")
    );
    assert_eq!(authority_of("ftp://example.com"), None);
    assert_eq!(authority_of("http://"), None);
}

#[test]
fn instants_are_sent_without_zone() {
    let at = t("2025-03-03T08:15:30.250Z");
    assert_eq!(format_instant(&at), "2025-03-03T08:15:30.250");
    assert_eq!(parse_instant("2025-03-03T08:15:30.250"), Some(at));
    assert_eq!(parse_instant("2025-03-03T08:15:30.250Z"), Some(at));
    assert_eq!(parse_instant("not a time"), None);
}

#[test]
fn history_entries_deserialize() {
    let raw = r#"[{"instant":"2025-03-03T08:00:00.000","type":"IN"},
                  {"instant":"2025-03-03T12:00:00Z","type":"OUT"}]"#;
    let punches: Vec<RemotePunch> = serde_json::from_str(raw).unwrap();
    assert_eq!(
        punches,
        vec![
            RemotePunch::new(PunchType::In, t("2025-03-03T08:00:00Z")),
            RemotePunch::new(PunchType::Out, t("2025-03-03T12:00:00Z")),
        ]
    );
}

#[test]
fn punch_type_parsing_is_lenient() {
    assert_eq!(PunchType::from_str_loose("IN"), Some(PunchType::In));
    assert_eq!(PunchType::from_str_loose("out"), Some(PunchType::Out));
    assert_eq!(PunchType::from_str_loose("x"), None);
}

#[test]
fn stored_location_defaults_to_available() {
    let h = Harness::new();
    let loc = StoredLocation::new(h.kv.clone());

    assert!(loc.permission_granted().unwrap());
    assert!(loc.services_enabled().unwrap());
    assert!(loc.current_fix().is_err(), "no fix stored yet");

    let fix = GeoFix::new(12.5, 41.9, 3.0);
    loc.set_fix(&fix).unwrap();
    assert_eq!(loc.current_fix().unwrap(), fix);

    loc.set_services_enabled(false).unwrap();
    assert!(!loc.services_enabled().unwrap());
    assert!(loc.current_fix().is_err());

    loc.set_services_enabled(true).unwrap();
    loc.set_permission(false).unwrap();
    assert!(!loc.permission_granted().unwrap());
    assert!(loc.current_fix().is_err());
}

#[test]
fn notifications_are_kept_in_the_audit_log() {
    let h = Harness::new();
    let notifier = ConsoleNotifier::quiet(h.kv.clone());

    notifier.notify(&Notification::new(
        NotificationKind::SyncFailed,
        "Synchronization failed",
        "server unavailable",
    ));

    let rows = load_log(h.kv.pool(), Some("notify")).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].target, "sync_failed");
    assert_eq!(rows[0].message, "Synchronization failed: server unavailable");
}

#[test]
fn config_rejects_bad_checkpoints_and_zero_periods() {
    let mut cfg = Config::with_database("x.sqlite".into());
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.checkpoint_times().unwrap().len(), 2);

    cfg.sync_checkpoints = vec!["18:00".into(), "25:99".into()];
    assert!(cfg.validate().is_err());

    cfg.sync_checkpoints = vec!["18:00".into(), "07:30".into()];
    let times = cfg.checkpoint_times().unwrap();
    assert!(times[0] < times[1]);

    cfg.sync_interval_secs = 0;
    assert!(cfg.validate().is_err());
}
