/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Monotonic time source shared by the scheduler and every task.
//!
//! All timing in the datalogger is expressed as a [`Timestamp`]: whole
//! milliseconds since boot, the resolution of the on-disk record format
//! (`Timestamp_ms`).
//!
//! Two clocks are provided:
//!
//! | Clock | `now()` | `delay()` |
//! |---|---|---|
//! | [`MonotonicClock`] | `std::time::Instant` since construction | `thread::sleep` |
//! | [`SimClock`] | shared counter | advances the counter, never sleeps |
//!
//! Bounded in-task busy-waits (sensor conversion, buzzer on-time, debounce)
//! always go through [`Clock::delay`], so under a [`SimClock`] they show up
//! as elapsed simulated time and the worst-case tick latency is observable
//! in tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// ── Timestamp ─────────────────────────────────────────────────────────────────

/// Milliseconds since boot on a monotonic clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The boot instant.
    pub const ZERO: Timestamp = Timestamp(0);

    pub const fn from_millis(ms: u64) -> Self {
        Timestamp(ms)
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// `self + duration`, clamped at `u64::MAX` milliseconds.
    pub fn saturating_add(self, duration: Duration) -> Self {
        Timestamp(self.0.saturating_add(duration_to_millis(duration)))
    }

    /// Time elapsed from `earlier` to `self`; zero if `earlier` is later.
    pub fn saturating_duration_since(self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Whole milliseconds in `d`, saturating instead of truncating the `u128`.
pub(crate) fn duration_to_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

// ── Clock trait ───────────────────────────────────────────────────────────────

/// Monotonic time source plus the one blocking primitive tasks may use.
pub trait Clock {
    /// Current time since boot.
    fn now(&self) -> Timestamp;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: Timestamp) -> Duration {
        self.now().saturating_duration_since(since)
    }

    /// Block the caller for exactly `duration`.
    ///
    /// There is no cancellation: once started, the wait runs to completion.
    fn delay(&self, duration: Duration);
}

// ── MonotonicClock ────────────────────────────────────────────────────────────

/// Wall-clock implementation backed by [`std::time::Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    boot: Instant,
}

impl MonotonicClock {
    /// Starts counting from the moment of construction ("boot").
    pub fn new() -> Self {
        Self {
            boot: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        Timestamp(duration_to_millis(self.boot.elapsed()))
    }

    fn delay(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Simulated clock whose time moves only when advanced.
///
/// Clones share the same counter, so a test can keep one handle while the
/// scheduler owns another.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    now_ms: Arc<AtomicU64>,
}

impl SimClock {
    /// A clock reading [`Timestamp::ZERO`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(start: Timestamp) -> Self {
        Self {
            now_ms: Arc::new(AtomicU64::new(start.as_millis())),
        }
    }

    /// Move time forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        let ms = duration_to_millis(duration);
        // fetch_update never fails with a closure that always returns Some.
        let _ = self
            .now_ms
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| {
                Some(t.saturating_add(ms))
            });
    }

    /// Jump to `t`.  Moving backwards is ignored to keep the clock monotonic.
    pub fn set(&self, t: Timestamp) {
        self.now_ms.fetch_max(t.as_millis(), Ordering::SeqCst);
    }
}

impl Clock for SimClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.now_ms.load(Ordering::SeqCst))
    }

    fn delay(&self, duration: Duration) {
        self.advance(duration);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
