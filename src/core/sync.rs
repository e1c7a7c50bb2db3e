//! Opportunistic upload of the pending buffer.

use crate::core::clock::Clock;
use crate::core::session::Session;
use crate::core::state_machine::BusyGuard;
use crate::core::store::PunchStore;
use crate::errors::AppResult;
use crate::models::notification::{Notification, NotificationKind};
use crate::models::punch::PunchRecord;
use crate::models::remote::PunchSubmission;
use crate::platform::api::PunchApi;
use crate::platform::connectivity::Connectivity;
use crate::platform::notifier::Notifier;
use chrono::{DateTime, FixedOffset, NaiveTime, Utc};
use std::cell::Cell;
use std::rc::Rc;

/// Daily sync windows.
///
/// A window is open when the last sync happened on an earlier local day (or
/// never), or when a checkpoint has been crossed since the last sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncWindows {
    checkpoints: Vec<NaiveTime>,
}

impl SyncWindows {
    pub fn new(mut checkpoints: Vec<NaiveTime>) -> Self {
        checkpoints.sort();
        checkpoints.dedup();
        Self { checkpoints }
    }

    pub fn is_open(
        &self,
        last_sync: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        offset: &FixedOffset,
    ) -> bool {
        let Some(last) = last_sync else {
            return true;
        };
        let last = last.with_timezone(offset);
        let now = now.with_timezone(offset);

        if last.date_naive() < now.date_naive() {
            return true;
        }
        if last.date_naive() > now.date_naive() {
            // Clock went backwards; wait for it to catch up.
            return false;
        }

        self.checkpoints
            .iter()
            .any(|c| last.time() < *c && now.time() >= *c)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    NotEligible,
    /// Eligible, but there is no network. The window stays open.
    Offline,
    /// Eligible with an empty buffer. The window is consumed.
    NothingToSend,
    Submitted(usize),
    /// Submission rejected or failed in transit. Buffer and checkpoint kept.
    Failed(String),
    /// Another reconciliation is still running.
    Busy,
}

pub struct SyncReconciler {
    store: PunchStore,
    session: Session,
    api: Rc<dyn PunchApi>,
    connectivity: Rc<dyn Connectivity>,
    notifier: Rc<dyn Notifier>,
    clock: Rc<dyn Clock>,
    windows: SyncWindows,
    reason_code: String,
    in_flight: Cell<bool>,
}

impl SyncReconciler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: PunchStore,
        session: Session,
        api: Rc<dyn PunchApi>,
        connectivity: Rc<dyn Connectivity>,
        notifier: Rc<dyn Notifier>,
        clock: Rc<dyn Clock>,
        windows: SyncWindows,
        reason_code: impl Into<String>,
    ) -> Self {
        Self {
            store,
            session,
            api,
            connectivity,
            notifier,
            clock,
            windows,
            reason_code: reason_code.into(),
            in_flight: Cell::new(false),
        }
    }

    pub fn store(&self) -> &PunchStore {
        &self.store
    }

    /// Periodic evaluation.
    pub fn tick(&self) -> AppResult<SyncOutcome> {
        let Some(_guard) = BusyGuard::acquire(&self.in_flight) else {
            return Ok(SyncOutcome::Busy);
        };

        let now = self.clock.now();
        if !self
            .windows
            .is_open(self.store.last_sync(), now, &self.clock.offset())
        {
            return Ok(SyncOutcome::NotEligible);
        }

        let pending = self.store.pending();
        if pending.is_empty() {
            self.store.stamp_sync(now)?;
            tracing::debug!(login = self.store.login(), "sync window consumed: nothing to send");
            return Ok(SyncOutcome::NothingToSend);
        }

        // Offline with punches waiting: no stamp, the window stays open and
        // the next tick retries once the network is back.
        if !self.connectivity.is_connected() {
            tracing::info!(login = self.store.login(), pending = pending.len(), "sync deferred: offline");
            return Ok(SyncOutcome::Offline);
        }

        self.submit(&pending, now)
    }

    /// Manual synchronization, ignoring the windows.
    pub fn sync_now(&self) -> AppResult<SyncOutcome> {
        let Some(_guard) = BusyGuard::acquire(&self.in_flight) else {
            return Ok(SyncOutcome::Busy);
        };

        let pending = self.store.pending();
        if pending.is_empty() {
            return Ok(SyncOutcome::NothingToSend);
        }
        if !self.connectivity.is_connected() {
            return Ok(SyncOutcome::Offline);
        }
        self.submit(&pending, self.clock.now())
    }

    fn submit(&self, pending: &[PunchRecord], now: DateTime<Utc>) -> AppResult<SyncOutcome> {
        let submission = PunchSubmission::from_records(pending, &self.reason_code);

        match self.api.submit_punches(&self.session.token, &submission) {
            Ok(()) => {
                let n = submission.len();
                self.store.remove_submitted(pending)?;
                self.store.stamp_sync(now)?;
                self.store.audit("sync", &format!("{n} punch(es) submitted"));
                tracing::info!(login = self.store.login(), count = n, "pending punches submitted");
                self.notifier.notify(&Notification::new(
                    NotificationKind::SyncSucceeded,
                    "Synchronization completed",
                    format!("{n} punch(es) sent to the server."),
                ));
                Ok(SyncOutcome::Submitted(n))
            }
            Err(e) => {
                let msg = e.to_string();
                self.store.audit("sync_failed", &msg);
                tracing::warn!(login = self.store.login(), error = %msg, "punch submission failed, will retry");
                self.notifier.notify(&Notification::new(
                    NotificationKind::SyncFailed,
                    "Synchronization failed",
                    format!("Punches kept on this device: {msg}"),
                ));
                Ok(SyncOutcome::Failed(msg))
            }
        }
    }
}
