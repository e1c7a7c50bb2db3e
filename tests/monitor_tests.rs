use rpunch::core::clock::Clock;
use rpunch::core::monitor::{LocationCheck, RecoveryOutcome};
use rpunch::core::state_machine::Transition;
use rpunch::models::location::{LocationStatus, UNKNOWN_PLACE};
use rpunch::models::notification::NotificationKind;
use rpunch::models::punch::LogMarker;
use rpunch::models::punch_type::PunchType;

mod common;
use common::Harness;

#[test]
fn liveness_is_stamped_only_while_punched_in() {
    let h = Harness::new();
    let monitor = h.ctx.monitor(h.ctx.machine("alice"));

    assert!(!monitor.liveness_tick().unwrap());
    assert_eq!(monitor.machine().store().last_liveness(), None);

    monitor.machine().punch_in().unwrap();
    h.advance_secs(10);
    assert!(monitor.liveness_tick().unwrap());
    assert_eq!(monitor.machine().store().last_liveness(), Some(h.clock.now()));
}

#[test]
fn disabling_location_services_forces_a_punch_out() {
    let h = Harness::new();
    let t0 = h.clock.now();
    let monitor = h.ctx.monitor(h.ctx.machine("alice"));
    monitor.machine().punch_in().unwrap();

    h.advance_secs(130);
    h.location.services.set(false);
    let check = monitor.location_tick().unwrap();

    let LocationCheck::ForcedOut { status, transition } = check else {
        panic!("expected a forced punch out, got {check:?}");
    };
    assert_eq!(status, LocationStatus::ServicesDisabled);
    assert!(transition.is_recorded());

    let store = monitor.machine().store();
    assert!(!store.state().is_punched_in);
    let pending = store.pending();
    assert_eq!(pending.len(), 2);
    assert_eq!((pending[0].kind, pending[0].time), (PunchType::In, t0));
    assert_eq!(
        (pending[1].kind, pending[1].time),
        (PunchType::Out, t0 + chrono::Duration::seconds(130))
    );
    assert_eq!(pending[1].place_name, UNKNOWN_PLACE);
    assert_eq!(h.notes.count(NotificationKind::ForcedPunchOut), 1);
}

#[test]
fn revoked_permission_punches_out_exactly_once() {
    let h = Harness::new();
    let monitor = h.ctx.monitor(h.ctx.machine("alice"));
    monitor.machine().punch_in().unwrap();

    h.location.permission.set(false);
    h.advance_secs(120);
    assert!(matches!(
        monitor.location_tick().unwrap(),
        LocationCheck::ForcedOut {
            status: LocationStatus::PermissionDenied,
            ..
        }
    ));

    h.advance_secs(120);
    assert_eq!(monitor.location_tick().unwrap(), LocationCheck::NotPunchedIn);
    assert_eq!(monitor.machine().store().pending().len(), 2);
    assert_eq!(h.notes.count(NotificationKind::ForcedPunchOut), 1);
}

#[test]
fn failing_location_check_counts_as_unavailable() {
    let h = Harness::new();
    let monitor = h.ctx.monitor(h.ctx.machine("alice"));
    monitor.machine().punch_in().unwrap();
    h.location.broken.set(true);

    let check = monitor.location_tick().unwrap();
    assert!(matches!(
        check,
        LocationCheck::ForcedOut {
            status: LocationStatus::CheckFailed(_),
            ..
        }
    ));
}

#[test]
fn available_location_only_stamps_liveness() {
    let h = Harness::new();
    let monitor = h.ctx.monitor(h.ctx.machine("alice"));
    monitor.machine().punch_in().unwrap();
    h.advance_secs(120);

    assert_eq!(monitor.location_tick().unwrap(), LocationCheck::Available);
    assert!(monitor.machine().state().is_punched_in);
    assert_eq!(monitor.machine().store().last_liveness(), Some(h.clock.now()));
}

#[test]
fn recovery_punches_out_at_last_liveness() {
    let h = Harness::new();
    let monitor = h.ctx.monitor(h.ctx.machine("alice"));
    let store = monitor.machine().store().clone();
    store.set_log_marker(LogMarker::LoggedIn).unwrap();
    monitor.machine().punch_in().unwrap();

    h.advance_secs(60);
    monitor.liveness_tick().unwrap();
    let last_seen = h.clock.now();

    // process killed; restarted an hour later
    h.advance_secs(3600);
    let outcome = monitor.recover().unwrap();

    let RecoveryOutcome::Recovered(record) = outcome else {
        panic!("expected recovery, got {outcome:?}");
    };
    assert_eq!(record.kind, PunchType::Out);
    assert_eq!(record.time, last_seen);
    assert_eq!(record.location, None);
    assert!(!store.state().is_punched_in);
    assert_eq!(store.state().punch_time, Some(last_seen));
    assert_eq!(h.notes.count(NotificationKind::ForcedPunchOut), 1);
}

#[test]
fn recovery_leaves_a_live_session_alone() {
    let h = Harness::new();
    let monitor = h.ctx.monitor(h.ctx.machine("alice"));
    monitor
        .machine()
        .store()
        .set_log_marker(LogMarker::LoggedIn)
        .unwrap();
    monitor.machine().punch_in().unwrap();
    h.advance_secs(10);
    monitor.liveness_tick().unwrap();
    h.advance_secs(30);

    assert!(matches!(
        monitor.recover().unwrap(),
        RecoveryOutcome::Skipped(_)
    ));
    assert!(monitor.machine().state().is_punched_in);
}

#[test]
fn recovery_needs_a_liveness_stamp_after_the_punch() {
    let h = Harness::new();
    let monitor = h.ctx.monitor(h.ctx.machine("alice"));
    let store = monitor.machine().store();
    store.set_log_marker(LogMarker::LoggedIn).unwrap();
    store.stamp_liveness(h.clock.now()).unwrap();

    h.advance_secs(600);
    monitor.machine().punch_in().unwrap();
    h.advance_secs(3600);

    assert!(matches!(
        monitor.recover().unwrap(),
        RecoveryOutcome::Skipped(_)
    ));
    assert!(monitor.machine().state().is_punched_in);
}

#[test]
fn clean_sign_out_needs_no_recovery() {
    let h = Harness::new();
    let monitor = h.ctx.monitor(h.ctx.machine("alice"));
    monitor
        .machine()
        .store()
        .set_log_marker(LogMarker::LoggedOut)
        .unwrap();

    assert_eq!(monitor.recover().unwrap(), RecoveryOutcome::NotNeeded);
    assert!(matches!(
        monitor.machine().punch_in().unwrap(),
        Transition::Recorded(_)
    ));
}
