//! Periodic environment checks: liveness stamping, location availability
//! and recovery of sessions that ended without a clean sign-out.

use crate::core::clock::Clock;
use crate::core::state_machine::{ForcedReason, PunchOrigin, PunchStateMachine, Transition};
use crate::errors::AppResult;
use crate::models::location::LocationStatus;
use crate::models::punch::{LogMarker, PunchRecord};
use crate::platform::location::LocationProvider;
use chrono::{DateTime, Duration, Utc};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum LocationCheck {
    /// Nothing to watch while punched out.
    NotPunchedIn,
    Available,
    ForcedOut {
        status: LocationStatus,
        transition: Transition,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryOutcome {
    /// Last session ended cleanly or the user is not punched in.
    NotNeeded,
    /// Punched in after an unclean end, but the evidence is not enough to
    /// punch out.
    Skipped(&'static str),
    Recovered(PunchRecord),
}

pub struct EnvironmentMonitor {
    machine: Rc<PunchStateMachine>,
    location: Rc<dyn LocationProvider>,
    clock: Rc<dyn Clock>,
    recovery_grace: Duration,
}

impl EnvironmentMonitor {
    pub fn new(
        machine: Rc<PunchStateMachine>,
        location: Rc<dyn LocationProvider>,
        clock: Rc<dyn Clock>,
        recovery_grace: Duration,
    ) -> Self {
        Self {
            machine,
            location,
            clock,
            recovery_grace,
        }
    }

    pub fn machine(&self) -> &PunchStateMachine {
        &self.machine
    }

    /// Stamp "last observed alive" while punched in. Returns whether a stamp
    /// was written.
    pub fn liveness_tick(&self) -> AppResult<bool> {
        if !self.machine.state().is_punched_in {
            return Ok(false);
        }
        self.machine.store().stamp_liveness(self.clock.now())?;
        Ok(true)
    }

    /// Punch out when location services or permission went away.
    pub fn location_tick(&self) -> AppResult<LocationCheck> {
        if !self.machine.state().is_punched_in {
            return Ok(LocationCheck::NotPunchedIn);
        }
        self.machine.store().stamp_liveness(self.clock.now())?;

        let status = self.location_status();
        if status.is_available() {
            return Ok(LocationCheck::Available);
        }

        tracing::warn!(login = self.machine.store().login(), status = %status.describe(), "location unavailable while punched in");
        let transition = self
            .machine
            .punch_out(PunchOrigin::Forced(ForcedReason::LocationUnavailable(status.clone())))?;
        Ok(LocationCheck::ForcedOut { status, transition })
    }

    /// Permission first, then services. A failing check counts as unavailable.
    pub fn location_status(&self) -> LocationStatus {
        match self.location.permission_granted() {
            Ok(true) => {}
            Ok(false) => return LocationStatus::PermissionDenied,
            Err(e) => {
                tracing::warn!(error = %e, "location permission check failed");
                return LocationStatus::CheckFailed(e.to_string());
            }
        }
        match self.location.services_enabled() {
            Ok(true) => LocationStatus::Available,
            Ok(false) => LocationStatus::ServicesDisabled,
            Err(e) => {
                tracing::warn!(error = %e, "location services check failed");
                LocationStatus::CheckFailed(e.to_string())
            }
        }
    }

    /// Close a session left open by a process that died while punched in.
    ///
    /// The OUT is placed at the last liveness stamp. Nothing happens unless
    /// that stamp belongs to the current IN and is older than the grace
    /// period, so a daemon restarted right away keeps the user punched in.
    pub fn recover(&self) -> AppResult<RecoveryOutcome> {
        let store = self.machine.store();
        if store.log_marker() != Some(LogMarker::LoggedIn) {
            return Ok(RecoveryOutcome::NotNeeded);
        }
        let state = self.machine.state();
        if !state.is_punched_in {
            return Ok(RecoveryOutcome::NotNeeded);
        }

        let Some(alive) = store.last_liveness() else {
            tracing::info!(login = store.login(), "recovery skipped: no liveness stamp");
            return Ok(RecoveryOutcome::Skipped("no liveness stamp"));
        };
        if let Some(punched) = state.punch_time
            && alive < punched
        {
            tracing::info!(login = store.login(), %alive, %punched, "recovery skipped: liveness predates punch");
            return Ok(RecoveryOutcome::Skipped("liveness stamp predates the punch"));
        }
        let now = self.clock.now();
        if !is_stale(alive, now, self.recovery_grace) {
            tracing::info!(login = store.login(), %alive, "recovery skipped: session still alive");
            return Ok(RecoveryOutcome::Skipped("session seen alive recently"));
        }

        match self
            .machine
            .punch_out_at(PunchOrigin::Forced(ForcedReason::Recovery), alive)?
        {
            Transition::Recorded(record) => {
                store.audit("recovery", &format!("punched OUT at {}", alive.to_rfc3339()));
                Ok(RecoveryOutcome::Recovered(record))
            }
            Transition::Ignored(reason) => {
                tracing::debug!(?reason, "recovery punch out ignored");
                Ok(RecoveryOutcome::NotNeeded)
            }
        }
    }
}

fn is_stale(alive: DateTime<Utc>, now: DateTime<Utc>, grace: Duration) -> bool {
    now - alive > grace
}
