//! Per-user punch persistence.
//!
//! Every key is namespaced by login (`<login>_<key>`) so several accounts on
//! one device never see each other's state. Read failures and missing values
//! both mean "no prior state".

use crate::core::clock::Clock;
use crate::db::kv::KvStore;
use crate::errors::AppResult;
use crate::models::punch::{LogMarker, PunchRecord, PunchState};
use chrono::{DateTime, NaiveDate, Utc};
use std::rc::Rc;

pub const KEY_IS_PUNCHED_IN: &str = "isPunchedIn";
pub const KEY_PUNCH_TIME: &str = "punchTime";
pub const KEY_PENDING: &str = "punchHistory";
pub const KEY_TODAY: &str = "punchHistoryToday";
pub const KEY_LAST_SYNC: &str = "lastTimeSync";
pub const KEY_LIVENESS: &str = "lastTimeDetection";
pub const KEY_LOG_MARKER: &str = "lastLogDetection";

/// What a state transition writes, committed as one batch.
#[derive(Debug, Clone)]
pub struct TransitionWrite<'a> {
    pub state: PunchState,
    pub record: &'a PunchRecord,
    /// Local calendar day of the record; older entries leave the today buffer.
    pub today: NaiveDate,
    pub offset: chrono::FixedOffset,
}

#[derive(Clone)]
pub struct PunchStore {
    kv: Rc<dyn KvStore>,
    clock: Rc<dyn Clock>,
    login: String,
}

impl PunchStore {
    pub fn new(kv: Rc<dyn KvStore>, clock: Rc<dyn Clock>, login: impl Into<String>) -> Self {
        Self {
            kv,
            clock,
            login: login.into(),
        }
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn key(&self, name: &str) -> String {
        format!("{}_{}", self.login, name)
    }

    pub fn audit(&self, operation: &str, message: &str) {
        self.kv.audit(operation, &self.login, message);
    }

    fn read(&self, name: &str) -> Option<String> {
        match self.kv.get(&self.key(name)) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(login = %self.login, key = name, error = %e, "store read failed, assuming no prior state");
                None
            }
        }
    }

    fn read_time(&self, name: &str) -> Option<DateTime<Utc>> {
        let raw = self.read(name)?;
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(t) => Some(t.with_timezone(&Utc)),
            Err(_) => {
                tracing::warn!(login = %self.login, key = name, value = %raw, "unparseable timestamp ignored");
                None
            }
        }
    }

    fn write_time(&self, name: &str, t: DateTime<Utc>) -> AppResult<()> {
        self.kv.set(&self.key(name), &t.to_rfc3339())
    }

    // ---------------------------
    // Punch state
    // ---------------------------

    pub fn state(&self) -> PunchState {
        PunchState {
            is_punched_in: self.read(KEY_IS_PUNCHED_IN).as_deref() == Some("true"),
            punch_time: self.read_time(KEY_PUNCH_TIME),
        }
    }

    /// Write state, pending append and today append in one batch.
    pub fn commit_transition(&self, w: &TransitionWrite<'_>) -> AppResult<()> {
        let mut pending = self.pending();
        pending.push(w.record.clone());

        let mut today: Vec<PunchRecord> = self
            .today_records()
            .into_iter()
            .filter(|r| r.local_date(&w.offset) == w.today)
            .collect();
        today.push(w.record.clone());

        let punch_time = w
            .state
            .punch_time
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();

        let entries = vec![
            (self.key(KEY_IS_PUNCHED_IN), w.state.is_punched_in.to_string()),
            (self.key(KEY_PUNCH_TIME), punch_time),
            (self.key(KEY_PENDING), serde_json::to_string(&pending)?),
            (self.key(KEY_TODAY), serde_json::to_string(&today)?),
        ];
        self.kv.set_many(&entries)
    }

    // ---------------------------
    // Buffers
    // ---------------------------

    /// Records not yet acknowledged by the server, oldest first.
    pub fn pending(&self) -> Vec<PunchRecord> {
        self.load_buffer(KEY_PENDING)
    }

    /// Records of the current day for display. Never cleared by sync.
    pub fn today_records(&self) -> Vec<PunchRecord> {
        self.load_buffer(KEY_TODAY)
    }

    fn load_buffer(&self, name: &str) -> Vec<PunchRecord> {
        let Some(raw) = self.read(name) else {
            return Vec::new();
        };
        match serde_json::from_str::<Vec<PunchRecord>>(&raw) {
            Ok(records) => records,
            Err(e) => {
                self.quarantine(name, &raw, &e.to_string());
                Vec::new()
            }
        }
    }

    /// Move unparseable buffer content aside so it is not overwritten by
    /// the next append.
    fn quarantine(&self, name: &str, raw: &str, reason: &str) {
        let target = format!(
            "{}_quarantine_{}",
            self.key(name),
            self.clock.now().timestamp()
        );
        tracing::warn!(login = %self.login, key = name, %target, %reason, "corrupt punch buffer quarantined");

        let moved = self
            .kv
            .set_many(&[(target.clone(), raw.to_string()), (self.key(name), "[]".to_string())]);
        match moved {
            Ok(()) => self.audit(
                "quarantine",
                &format!("corrupt {name} moved to {target}: {reason}"),
            ),
            Err(e) => {
                tracing::error!(login = %self.login, key = name, error = %e, "failed to quarantine corrupt buffer")
            }
        }
    }

    /// Drop acknowledged records from the pending buffer. Records appended
    /// since the batch was read are kept.
    pub fn remove_submitted(&self, submitted: &[PunchRecord]) -> AppResult<()> {
        let pending = self.pending();
        let rest: Vec<PunchRecord> = if pending.starts_with(submitted) {
            pending[submitted.len()..].to_vec()
        } else {
            pending
                .into_iter()
                .filter(|r| !submitted.contains(r))
                .collect()
        };

        if rest.is_empty() {
            self.kv.remove(&self.key(KEY_PENDING))
        } else {
            self.kv
                .set(&self.key(KEY_PENDING), &serde_json::to_string(&rest)?)
        }
    }

    // ---------------------------
    // Timestamps and markers
    // ---------------------------

    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.read_time(KEY_LAST_SYNC)
    }

    /// Never moves the checkpoint backwards.
    pub fn stamp_sync(&self, now: DateTime<Utc>) -> AppResult<()> {
        match self.last_sync() {
            Some(prev) if prev > now => {
                tracing::warn!(login = %self.login, %prev, %now, "sync checkpoint ahead of clock, kept");
                Ok(())
            }
            _ => self.write_time(KEY_LAST_SYNC, now),
        }
    }

    pub fn last_liveness(&self) -> Option<DateTime<Utc>> {
        self.read_time(KEY_LIVENESS)
    }

    pub fn stamp_liveness(&self, now: DateTime<Utc>) -> AppResult<()> {
        self.write_time(KEY_LIVENESS, now)
    }

    pub fn log_marker(&self) -> Option<LogMarker> {
        self.read(KEY_LOG_MARKER)
            .as_deref()
            .and_then(LogMarker::parse)
    }

    pub fn set_log_marker(&self, marker: LogMarker) -> AppResult<()> {
        self.kv.set(&self.key(KEY_LOG_MARKER), marker.as_str())
    }
}
