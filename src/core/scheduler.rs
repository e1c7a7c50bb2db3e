//! Cooperative periodic task runner.

use crate::core::clock::Clock;
use crate::errors::AppResult;
use chrono::{DateTime, Duration, Utc};
use std::cell::Cell;
use std::rc::Rc;

type TaskFn<'a> = Box<dyn FnMut(DateTime<Utc>) -> AppResult<()> + 'a>;

pub struct ScheduledTask<'a> {
    name: &'static str,
    period: Duration,
    next_due: Option<DateTime<Utc>>,
    action: TaskFn<'a>,
}

impl<'a> ScheduledTask<'a> {
    pub fn new<F>(name: &'static str, period: std::time::Duration, action: F) -> Self
    where
        F: FnMut(DateTime<Utc>) -> AppResult<()> + 'a,
    {
        Self {
            name,
            period: Duration::from_std(period)
                .unwrap_or(Duration::seconds(1))
                .max(Duration::milliseconds(1)),
            next_due: None,
            action: Box::new(action),
        }
    }

    /// Errors are logged and the task is considered completed.
    fn run(&mut self, now: DateTime<Utc>) {
        if let Err(e) = (self.action)(now) {
            tracing::warn!(task = self.name, error = %e, "periodic task failed");
        }
        self.next_due = Some(now + self.period);
    }
}

/// Shared flag that asks a running scheduler to stop after the current pass.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Rc<Cell<bool>>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.set(true);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.get()
    }
}

pub struct Scheduler<'a> {
    tasks: Vec<ScheduledTask<'a>>,
    running: bool,
    stop: StopHandle,
}

impl Default for Scheduler<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Scheduler<'a> {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            running: false,
            stop: StopHandle::default(),
        }
    }

    pub fn add(&mut self, task: ScheduledTask<'a>) {
        self.tasks.push(task);
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Arm every task; each one is due immediately.
    pub fn start(&mut self, now: DateTime<Utc>) {
        for t in &mut self.tasks {
            t.next_due = Some(now);
        }
        self.running = true;
        self.stop.0.set(false);
        tracing::debug!(tasks = self.tasks.len(), "scheduler started");
    }

    /// Disarm every task. A task already running has finished by the time
    /// this is reachable.
    pub fn stop(&mut self) {
        for t in &mut self.tasks {
            t.next_due = None;
        }
        self.running = false;
        tracing::debug!("scheduler stopped");
    }

    /// Run the tasks due at `now`, in registration order. Returns how many ran.
    pub fn run_pending(&mut self, now: DateTime<Utc>) -> usize {
        if !self.running {
            return 0;
        }
        let mut ran = 0;
        for t in &mut self.tasks {
            if self.stop.is_stopped() {
                break;
            }
            if t.next_due.is_some_and(|due| due <= now) {
                t.run(now);
                ran += 1;
            }
        }
        ran
    }

    fn earliest_due(&self) -> Option<DateTime<Utc>> {
        self.tasks.iter().filter_map(|t| t.next_due).min()
    }

    /// Start, run until `deadline` passes or the stop handle fires, then stop.
    pub fn run_until(&mut self, clock: &dyn Clock, deadline: Option<DateTime<Utc>>) {
        self.start(clock.now());

        loop {
            let now = clock.now();
            if self.stop.is_stopped() || deadline.is_some_and(|d| now >= d) {
                break;
            }
            self.run_pending(now);
            if self.stop.is_stopped() {
                break;
            }

            let Some(mut wake) = self.earliest_due() else {
                break;
            };
            if let Some(d) = deadline {
                wake = wake.min(d);
            }
            let wait = (wake - clock.now()).to_std().unwrap_or_default();
            if !wait.is_zero() {
                clock.sleep(wait);
            }
        }

        self.stop();
    }
}
