/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Buzzer and RGB LED feedback.
//!
//! The PWM drivers are external; the datalogger only needs to switch the
//! buzzer on/off and pick an LED colour.  Beep on-times and gaps are bounded
//! busy-waits on the [`Clock`] and must be counted in the calling task's
//! busy-wait budget (see [`pattern_duration`]).

use std::time::Duration;

use crate::clock::Clock;

/// PWM buzzer with a fixed tone.
pub trait Buzzer {
    fn set_enabled(&mut self, enabled: bool);
}

/// Common-cathode RGB LED.
pub trait RgbLed {
    fn set_color(&mut self, color: LedColor);
}

/// Colours the button task cycles through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedColor {
    #[default]
    White,
    Red,
    Blue,
    Green,
}

impl LedColor {
    /// Next colour in the White → Red → Blue → Green → White cycle.
    pub fn next(self) -> Self {
        match self {
            LedColor::White => LedColor::Red,
            LedColor::Red => LedColor::Blue,
            LedColor::Blue => LedColor::Green,
            LedColor::Green => LedColor::White,
        }
    }

    /// 16-bit PWM duty levels for the R, G and B channels.
    pub fn duty_levels(self) -> (u16, u16, u16) {
        match self {
            LedColor::White => (u16::MAX, u16::MAX, u16::MAX),
            LedColor::Red => (u16::MAX, 0, 0),
            LedColor::Blue => (0, 0, u16::MAX),
            LedColor::Green => (0, u16::MAX, 0),
        }
    }
}

impl std::fmt::Display for LedColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LedColor::White => "white",
            LedColor::Red => "red",
            LedColor::Blue => "blue",
            LedColor::Green => "green",
        };
        f.write_str(s)
    }
}

/// Beep `count` times, `on` each, separated by `gap`.  Blocks for
/// [`pattern_duration`]`(count, on, gap)`.
pub fn beep_pattern(
    buzzer: &mut dyn Buzzer,
    clock: &dyn Clock,
    count: u32,
    on: Duration,
    gap: Duration,
) {
    for i in 0..count {
        if i > 0 {
            clock.delay(gap);
        }
        buzzer.set_enabled(true);
        clock.delay(on);
        buzzer.set_enabled(false);
    }
}

/// Total blocking time of [`beep_pattern`].
pub fn pattern_duration(count: u32, on: Duration, gap: Duration) -> Duration {
    if count == 0 {
        return Duration::ZERO;
    }
    on.saturating_mul(count)
        .saturating_add(gap.saturating_mul(count - 1))
}

/// Buzzer that does nothing; for boards without one.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentBuzzer;

impl Buzzer for SilentBuzzer {
    fn set_enabled(&mut self, _enabled: bool) {}
}

// ── Tests ─────────────────────────────────────────────────────────────────────
