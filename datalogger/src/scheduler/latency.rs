/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Worst-case tick latency analysis.
//!
//! Every task declares a busy-wait budget: the longest it may block inside
//! one invocation.  Because tasks run to completion one after another, the
//! worst-case duration of one tick is the sum of all budgets:
//!
//! $$L_{tick} = \sum_i B_i$$
//!
//! and a periodic task can become due at most one full loop period late:
//!
//! $$S_{max} = L_{tick} + T_{sleep}$$
//!
//! where `T_sleep` is the pause between ticks.  The numbers are computed, and
//! an overrun is only **logged**; the loop never aborts a task.

use std::time::Duration;

/// Sum of the declared budgets, saturating.
pub fn worst_case_tick_latency<I>(budgets: I) -> Duration
where
    I: IntoIterator<Item = Duration>,
{
    budgets
        .into_iter()
        .fold(Duration::ZERO, Duration::saturating_add)
}

/// Largest amount by which a periodic deadline can be missed.
pub fn max_deadline_slip(worst_case: Duration, tick_interval: Duration) -> Duration {
    worst_case.saturating_add(tick_interval)
}

/// Returns `Some(excess)` if a tick that took `measured` exceeded the
/// worst-case budget plus `slack`.
pub fn check_overrun(measured: Duration, worst_case: Duration, slack: Duration) -> Option<Duration> {
    let limit = worst_case.saturating_add(slack);
    if measured > limit {
        Some(measured - limit)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn empty_task_set_has_zero_latency() {
        assert_eq!(worst_case_tick_latency(std::iter::empty()), Duration::ZERO);
    }

    #[test]
    fn latency_is_sum_of_budgets() {
        // card double-beep, debounce, oximeter triple-beep
        assert_eq!(worst_case_tick_latency([ms(550), ms(200), ms(950)]), ms(1_700));
    }

    #[test]
    fn latency_saturates_instead_of_overflowing() {
        assert_eq!(
            worst_case_tick_latency([Duration::MAX, ms(1)]),
            Duration::MAX
        );
    }

    #[test]
    fn slip_bound_adds_tick_interval() {
        assert_eq!(max_deadline_slip(ms(1_700), ms(100)), ms(1_800));
    }

    #[test]
    fn overrun_reports_excess_only_past_limit() {
        assert_eq!(check_overrun(ms(100), ms(80), ms(20)), None);
        assert_eq!(check_overrun(ms(130), ms(80), ms(20)), Some(ms(30)));
    }
}
