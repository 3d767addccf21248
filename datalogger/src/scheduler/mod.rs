/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Single-threaded cooperative scheduler.
//!
//! [`CooperativeScheduler`] owns the ordered task set, the clock and the
//! shared sink.  Each call to [`tick()`](CooperativeScheduler::tick) polls
//! every task once, in registration order:
//!
//! ```text
//! tick ─┬─► DHT22        periodic 20 s
//!       ├─► RFID         every tick
//!       ├─► COLOR_SENSOR periodic 30 s
//!       ├─► BUTTON       every tick
//!       └─► OXIMETER     every tick (state machine step)
//! ```
//!
//! # Guarantees
//!
//! | Property | How |
//! |---|---|
//! | at most one invocation per task per tick | single pass over `slots` |
//! | failed task never stops the loop | `run()` result is consumed here, never propagated |
//! | bounded drift | a due task runs on the first tick after its deadline |
//! | no locks held by the scheduler | sink locking is internal to `SharedSink::write` |
//!
//! Registration order is poll order.  It is **not** a priority: it only
//! decides how much of the tick's busy-wait time lands before a later task.

pub mod error;
pub mod latency;

pub use error::SchedulerError;

use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::clock::{Clock, Timestamp};
use crate::sensor::SensorPort;
use crate::sink::SharedSink;
use crate::task::{Cadence, Task, TaskContext};

use latency::{check_overrun, max_deadline_slip, worst_case_tick_latency};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Pause between ticks when none is configured.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

// ── Per-task bookkeeping ──────────────────────────────────────────────────────

/// Invocation counters for one task; diagnostics only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    /// Invocations that returned `Ok`.
    pub runs: u64,
    /// Invocations that returned `Err`.
    pub failures: u64,
    /// Time of the most recent invocation, successful or not.
    pub last_invoked: Option<Timestamp>,
}

impl TaskStats {
    pub fn invocations(&self) -> u64 {
        self.runs + self.failures
    }
}

struct TaskSlot {
    task: Box<dyn Task>,
    name: String,
    cadence: Cadence,
    budget: Duration,
    /// Only meaningful for periodic tasks.
    next_deadline: Timestamp,
    stats: TaskStats,
}

impl TaskSlot {
    fn is_due(&self, now: Timestamp) -> bool {
        match self.cadence {
            Cadence::Periodic { .. } => now >= self.next_deadline,
            Cadence::EveryTick => true,
        }
    }
}

// ── CooperativeScheduler ──────────────────────────────────────────────────────

/// The datalogger main loop.
///
/// All state that used to be module-level globals (task list, sink handle,
/// deadlines) lives in this struct.
pub struct CooperativeScheduler<C: Clock> {
    clock: C,
    sink: SharedSink,
    slots: Vec<TaskSlot>,
    tick_interval: Duration,
    ticks: u64,
}

impl<C: Clock> CooperativeScheduler<C> {
    pub fn new(clock: C, sink: SharedSink) -> Self {
        Self {
            clock,
            sink,
            slots: Vec::new(),
            tick_interval: DEFAULT_TICK_INTERVAL,
            ticks: 0,
        }
    }

    /// Pause inserted after every tick by [`run()`](Self::run).
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    // ── Registration ──────────────────────────────────────────────────────────

    /// Append `task` to the poll order.
    ///
    /// A periodic task's first deadline is "now", so it fires on the first
    /// tick.
    ///
    /// # Errors
    /// Empty or duplicate names, and any registration after the first tick.
    pub fn register<T>(&mut self, task: T) -> Result<(), SchedulerError>
    where
        T: Task + 'static,
    {
        self.register_boxed(Box::new(task))
    }

    pub fn register_boxed(&mut self, task: Box<dyn Task>) -> Result<(), SchedulerError> {
        let name = task.name().to_string();
        if name.is_empty() {
            return Err(SchedulerError::EmptyName);
        }
        if self.ticks > 0 {
            return Err(SchedulerError::RegistrationClosed { name });
        }
        if self.slots.iter().any(|s| s.name == name) {
            return Err(SchedulerError::DuplicateTask { name });
        }

        let cadence = task.cadence();
        let budget = task.busy_wait_budget();
        let now = self.clock.now();

        info!(
            task = %name,
            cadence = ?cadence,
            budget_ms = budget.as_millis() as u64,
            position = self.slots.len(),
            "task registered"
        );

        self.slots.push(TaskSlot {
            task,
            name,
            cadence,
            budget,
            next_deadline: now,
            stats: TaskStats::default(),
        });
        Ok(())
    }

    /// Probe `sensor` and, if it answers, register the task `build` makes
    /// from it.  A missing peripheral disables only its own task.
    ///
    /// Returns `Ok(false)` when the task was skipped.
    pub fn register_probed<S, T, F>(&mut self, mut sensor: S, build: F) -> Result<bool, SchedulerError>
    where
        S: SensorPort,
        T: Task + 'static,
        F: FnOnce(S) -> T,
    {
        if let Err(e) = sensor.probe() {
            error!(error = %e, "peripheral not found, task disabled");
            return Ok(false);
        }
        self.register(build(sensor))?;
        Ok(true)
    }

    // ── Loop ──────────────────────────────────────────────────────────────────

    /// One non-blocking pass: every due task is invoked exactly once, in
    /// registration order.
    pub fn tick(&mut self) {
        self.ticks += 1;
        let tick_started = self.clock.now();
        let ctx = TaskContext::new(&self.clock, &self.sink);

        for slot in &mut self.slots {
            let now = ctx.now();
            if !slot.is_due(now) {
                continue;
            }

            slot.stats.last_invoked = Some(now);
            match slot.task.run(&ctx) {
                Ok(()) => {
                    slot.stats.runs += 1;
                    if let Cadence::Periodic { interval } = slot.cadence {
                        slot.next_deadline = now.saturating_add(interval);
                        debug!(
                            task = %slot.name,
                            next_deadline_ms = slot.next_deadline.as_millis(),
                            "periodic task done"
                        );
                    }
                }
                Err(e) => {
                    // Deadline left unchanged: retry on the next tick.
                    slot.stats.failures += 1;
                    debug!(task = %slot.name, error = %e, "task failed");
                }
            }
        }

        let took = ctx.clock.elapsed(tick_started);
        if let Some(excess) = check_overrun(took, self.worst_case_tick_latency(), self.tick_interval)
        {
            warn!(
                tick = self.ticks,
                took_ms = took.as_millis() as u64,
                excess_ms = excess.as_millis() as u64,
                "tick exceeded its busy-wait budget"
            );
        }
    }

    /// Drive `tick()` followed by the inter-tick pause, forever or until
    /// `max_ticks` ticks have run.
    pub fn run(&mut self, max_ticks: Option<u64>) {
        info!(
            tasks = self.slots.len(),
            tick_interval_ms = self.tick_interval.as_millis() as u64,
            worst_case_tick_ms = self.worst_case_tick_latency().as_millis() as u64,
            max_slip_ms = self.max_deadline_slip().as_millis() as u64,
            "scheduler loop starting"
        );

        let mut remaining = max_ticks;
        loop {
            if remaining == Some(0) {
                break;
            }
            self.tick();
            self.clock.delay(self.tick_interval);
            remaining = remaining.map(|n| n - 1);
        }

        info!(ticks = self.ticks, "scheduler loop stopped");
    }

    // ── Introspection ─────────────────────────────────────────────────────────

    /// Sum of every registered task's busy-wait budget.
    pub fn worst_case_tick_latency(&self) -> Duration {
        worst_case_tick_latency(self.slots.iter().map(|s| s.budget))
    }

    /// Largest delay between a periodic deadline and the run it triggers.
    pub fn max_deadline_slip(&self) -> Duration {
        max_deadline_slip(self.worst_case_tick_latency(), self.tick_interval)
    }

    /// Task names in poll order.
    pub fn task_names(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn stats(&self, name: &str) -> Option<TaskStats> {
        self.slot(name).map(|s| s.stats)
    }

    /// Next deadline of a periodic task; `None` for unknown or every-tick tasks.
    pub fn next_deadline(&self, name: &str) -> Option<Timestamp> {
        self.slot(name)
            .filter(|s| matches!(s.cadence, Cadence::Periodic { .. }))
            .map(|s| s.next_deadline)
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn sink(&self) -> &SharedSink {
        &self.sink
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn slot(&self, name: &str) -> Option<&TaskSlot> {
        self.slots.iter().find(|s| s.name == name)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
