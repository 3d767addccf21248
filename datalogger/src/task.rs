/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core task abstractions for the cooperative runtime.
//!
//! ```text
//! CooperativeScheduler ──tick──► Task::run(&TaskContext) ──► SensorPort / SharedSink
//!        owns Box<dyn Task>            borrows clock + sink for one call
//! ```
//!
//! # Ownership model
//! Every task is created once at startup and **moved** into the scheduler,
//! which owns it for the process lifetime.  A task owns its own sensor
//! handle and state; the clock and the sink are only *borrowed* through
//! [`TaskContext`] for the duration of one `run()` call, so no task can keep
//! a reference to shared state across ticks.

use std::time::Duration;

use thiserror::Error;
use tracing::{trace, warn};

use crate::clock::{Clock, Timestamp};
use crate::sensor::SensorError;
use crate::sink::{Record, SharedSink};

// ── Cadence ───────────────────────────────────────────────────────────────────

/// A task's rule for deciding whether it is due on a given tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Due when `now >= next_deadline`.  A successful run moves the deadline
    /// to `now + interval`; a failed run leaves it alone so the task retries
    /// on the very next tick.
    Periodic { interval: Duration },

    /// Due on every tick (button, card presence, state-machine step).
    EveryTick,
}

impl Cadence {
    pub fn periodic(interval: Duration) -> Self {
        Cadence::Periodic { interval }
    }

    pub fn interval(&self) -> Option<Duration> {
        match self {
            Cadence::Periodic { interval } => Some(*interval),
            Cadence::EveryTick => None,
        }
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Failure of one task invocation.
///
/// Only used by the scheduler to decide whether a periodic deadline
/// advances; it never propagates past the scheduler.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Sensor(#[from] SensorError),
}

// ── TaskContext ───────────────────────────────────────────────────────────────

/// What a task may touch during one invocation.
#[derive(Clone, Copy)]
pub struct TaskContext<'a> {
    pub clock: &'a dyn Clock,
    pub sink: &'a SharedSink,
}

impl<'a> TaskContext<'a> {
    pub fn new(clock: &'a dyn Clock, sink: &'a SharedSink) -> Self {
        Self { clock, sink }
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Bounded busy-wait; must be covered by the task's declared budget.
    pub fn delay(&self, duration: Duration) {
        self.clock.delay(duration);
    }

    /// Submit a record to the shared sink.
    ///
    /// Sink failures are handled here: an unavailable sink is silent (it was
    /// reported once at boot) and an I/O error is already logged by the sink.
    /// Returns `true` if the record was persisted.
    pub fn log(&self, record: &Record) -> bool {
        match self.sink.append(record) {
            Ok(()) => true,
            Err(e) => {
                trace!(tag = record.tag.as_str(), error = %e, "record not persisted");
                false
            }
        }
    }
}

// ── Task trait ────────────────────────────────────────────────────────────────

/// A named unit of work polled by the scheduler.
pub trait Task {
    /// Stable, unique name (also used in diagnostics).
    fn name(&self) -> &str;

    /// Read once at registration.
    fn cadence(&self) -> Cadence;

    /// Upper bound on the time this task may block inside one `run()` call
    /// (sensor conversion waits, buzzer on-times, debounce).
    fn busy_wait_budget(&self) -> Duration {
        Duration::ZERO
    }

    /// Perform one invocation.
    fn run(&mut self, ctx: &TaskContext<'_>) -> Result<(), TaskError>;
}

// ── FnTask ────────────────────────────────────────────────────────────────────

/// Closure-backed task; handy for ad-hoc jobs and tests.
pub struct FnTask<F> {
    name: String,
    cadence: Cadence,
    budget: Duration,
    action: F,
}

impl<F> FnTask<F>
where
    F: FnMut(&TaskContext<'_>) -> Result<(), TaskError>,
{
    pub fn new(name: impl Into<String>, cadence: Cadence, action: F) -> Self {
        Self {
            name: name.into(),
            cadence,
            budget: Duration::ZERO,
            action,
        }
    }

    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }
}

impl<F> Task for FnTask<F>
where
    F: FnMut(&TaskContext<'_>) -> Result<(), TaskError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn cadence(&self) -> Cadence {
        self.cadence
    }

    fn busy_wait_budget(&self) -> Duration {
        self.budget
    }

    fn run(&mut self, ctx: &TaskContext<'_>) -> Result<(), TaskError> {
        (self.action)(ctx)
    }
}

/// Log a sensor failure the way every sensor task does, then hand it back.
pub(crate) fn report_sensor_failure(task: &str, error: SensorError) -> TaskError {
    if error.is_transient() {
        warn!(task = task, "sensor calibrating, retrying next tick");
    } else {
        warn!(task = task, error = %error, "sensor read failed");
    }
    TaskError::Sensor(error)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
