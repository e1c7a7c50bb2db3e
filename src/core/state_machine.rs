//! Punch IN / OUT transitions.

use crate::core::clock::Clock;
use crate::core::store::{PunchStore, TransitionWrite};
use crate::errors::AppResult;
use crate::models::location::{GeoFix, LocationStatus, UNKNOWN_PLACE};
use crate::models::notification::{Notification, NotificationKind};
use crate::models::punch::{PunchRecord, PunchState};
use crate::models::punch_type::PunchType;
use crate::platform::geocoder::Geocoder;
use crate::platform::location::LocationProvider;
use crate::platform::notifier::Notifier;
use crate::utils::time::format_punch_time;
use chrono::{DateTime, Utc};
use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForcedReason {
    LocationUnavailable(LocationStatus),
    SignOut,
    /// The previous session ended without a clean sign-out.
    Recovery,
}

impl ForcedReason {
    fn explanation(&self) -> String {
        match self {
            ForcedReason::LocationUnavailable(status) => format!(
                "You have been punched OUT automatically: {}.",
                status.describe()
            ),
            ForcedReason::SignOut => {
                "You have been punched OUT automatically because you signed out.".to_string()
            }
            ForcedReason::Recovery => {
                "You have been punched OUT at the last time the app was seen running.".to_string()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PunchOrigin {
    Manual,
    Forced(ForcedReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    AlreadyIn,
    AlreadyOut,
    /// Another transition is still running.
    Busy,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Recorded(PunchRecord),
    Ignored(IgnoredReason),
}

impl Transition {
    pub fn is_recorded(&self) -> bool {
        matches!(self, Transition::Recorded(_))
    }
}

/// Clears a re-entrancy latch when the guarded work finishes, even on error.
pub(crate) struct BusyGuard<'a>(&'a Cell<bool>);

impl<'a> BusyGuard<'a> {
    pub(crate) fn acquire(latch: &'a Cell<bool>) -> Option<Self> {
        if latch.replace(true) {
            None
        } else {
            Some(Self(latch))
        }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

pub struct PunchStateMachine {
    store: PunchStore,
    location: Rc<dyn LocationProvider>,
    geocoder: Rc<dyn Geocoder>,
    notifier: Rc<dyn Notifier>,
    clock: Rc<dyn Clock>,
    busy: Cell<bool>,
}

impl PunchStateMachine {
    pub fn new(
        store: PunchStore,
        location: Rc<dyn LocationProvider>,
        geocoder: Rc<dyn Geocoder>,
        notifier: Rc<dyn Notifier>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            location,
            geocoder,
            notifier,
            clock,
            busy: Cell::new(false),
        }
    }

    pub fn store(&self) -> &PunchStore {
        &self.store
    }

    /// Current state, read from the store so that punches made by another
    /// process are taken into account.
    pub fn state(&self) -> PunchState {
        self.store.state()
    }

    pub fn punch_in(&self) -> AppResult<Transition> {
        let Some(_guard) = BusyGuard::acquire(&self.busy) else {
            return Ok(Transition::Ignored(IgnoredReason::Busy));
        };
        if self.state().is_punched_in {
            tracing::debug!(login = self.store.login(), "punch in ignored: already IN");
            return Ok(Transition::Ignored(IgnoredReason::AlreadyIn));
        }

        let now = self.clock.now();
        let (fix, place) = self.capture_location();
        let record = PunchRecord::new(PunchType::In, now).with_location(fix, place);
        self.commit(&record)?;

        self.notifier.notify(&Notification::new(
            NotificationKind::PunchConfirmed,
            "Punch recorded",
            format!(
                "You punched IN at {}.",
                format_punch_time(&now, &self.clock.offset())
            ),
        ));
        Ok(Transition::Recorded(record))
    }

    pub fn punch_out(&self, origin: PunchOrigin) -> AppResult<Transition> {
        let now = self.clock.now();
        self.punch_out_at(origin, now)
    }

    /// Punch out with an explicit timestamp (recovery uses the last
    /// liveness stamp instead of the current time).
    pub fn punch_out_at(&self, origin: PunchOrigin, at: DateTime<Utc>) -> AppResult<Transition> {
        let Some(_guard) = BusyGuard::acquire(&self.busy) else {
            return Ok(Transition::Ignored(IgnoredReason::Busy));
        };
        if !self.state().is_punched_in {
            tracing::debug!(login = self.store.login(), "punch out ignored: already OUT");
            return Ok(Transition::Ignored(IgnoredReason::AlreadyOut));
        }

        let record = match &origin {
            PunchOrigin::Manual => {
                let (fix, place) = self.capture_location();
                PunchRecord::new(PunchType::Out, at).with_location(fix, place)
            }
            PunchOrigin::Forced(_) => PunchRecord::new(PunchType::Out, at),
        };
        self.commit(&record)?;

        let when = format_punch_time(&at, &self.clock.offset());
        let notification = match &origin {
            PunchOrigin::Manual => Notification::new(
                NotificationKind::PunchConfirmed,
                "Punch recorded",
                format!("You punched OUT at {when}."),
            ),
            PunchOrigin::Forced(reason) => {
                tracing::warn!(login = self.store.login(), ?reason, %at, "forced punch out");
                Notification::new(
                    NotificationKind::ForcedPunchOut,
                    "Automatic punch OUT",
                    format!("{} ({when})", reason.explanation()),
                )
            }
        };
        self.notifier.notify(&notification);
        Ok(Transition::Recorded(record))
    }

    fn commit(&self, record: &PunchRecord) -> AppResult<()> {
        let offset = self.clock.offset();
        let write = TransitionWrite {
            state: PunchState {
                is_punched_in: record.kind.is_in(),
                punch_time: Some(record.time),
            },
            record,
            today: record.local_date(&offset),
            offset,
        };
        self.store.commit_transition(&write)?;
        self.store.audit(
            "punch",
            &format!("{} at {} ({})", record.kind, record.time.to_rfc3339(), record.place_name),
        );
        tracing::info!(login = self.store.login(), kind = %record.kind, time = %record.time, "punch recorded");
        Ok(())
    }

    /// Best-effort position and place name; failures degrade to no fix and
    /// an unknown place.
    fn capture_location(&self) -> (Option<GeoFix>, String) {
        let fix = match self.location.current_fix() {
            Ok(fix) => fix,
            Err(e) => {
                tracing::warn!(error = %e, "location unavailable for punch");
                return (None, UNKNOWN_PLACE.to_string());
            }
        };

        let place = match self.geocoder.reverse(&fix) {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(error = %e, "reverse geocoding failed");
                UNKNOWN_PLACE.to_string()
            }
        };
        (Some(fix), place)
    }
}
