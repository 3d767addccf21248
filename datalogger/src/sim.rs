/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Simulated peripherals for running the datalogger on a host.
//!
//! Each device draws from its own seeded PCG stream so a run is reproducible
//! for a given `--seed`.  Behaviour mirrors the real parts closely enough to
//! exercise every code path: the DHT22 needs a few polls to warm up, cards
//! and button presses arrive occasionally, and the PPG sensor alternates
//! between finger-on stretches long enough to complete a measurement and
//! finger-off stretches.

use rand_core::{RngCore, SeedableRng};
use rand_pcg::Pcg32;
use tracing::{debug, trace};

use crate::feedback::{Buzzer, LedColor, RgbLed};
use crate::sensor::{
    CardReader, CardUid, ClimateReading, PpgSample, PushButton, RgbcReading, SensorError,
    SensorPort,
};

/// Uniform value in `0..n` (`n > 0`).
fn below(rng: &mut Pcg32, n: u32) -> u32 {
    rng.next_u32() % n
}

/// `true` with probability `1 / n`.
fn one_in(rng: &mut Pcg32, n: u32) -> bool {
    below(rng, n) == 0
}

// ── Climate ───────────────────────────────────────────────────────────────────

pub struct SimulatedClimate {
    rng: Pcg32,
    warmup_polls: u32,
}

impl SimulatedClimate {
    /// The first `warmup_polls` reads fail with `NotReady`.
    pub fn new(seed: u64, warmup_polls: u32) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            warmup_polls,
        }
    }
}

impl SensorPort for SimulatedClimate {
    type Reading = ClimateReading;

    fn read(&mut self) -> Result<ClimateReading, SensorError> {
        if self.warmup_polls > 0 {
            self.warmup_polls -= 1;
            return Err(SensorError::NotReady { sensor: "DHT22" });
        }
        Ok(ClimateReading {
            temperature_celsius: 20.0 + below(&mut self.rng, 100) as f32 / 10.0,
            humidity_percent: 40.0 + below(&mut self.rng, 200) as f32 / 10.0,
        })
    }
}

// ── Colour ────────────────────────────────────────────────────────────────────

pub struct SimulatedColor {
    rng: Pcg32,
}

impl SimulatedColor {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl SensorPort for SimulatedColor {
    type Reading = RgbcReading;

    fn read(&mut self) -> Result<RgbcReading, SensorError> {
        let red = below(&mut self.rng, 1_024) as u16;
        let green = below(&mut self.rng, 1_024) as u16;
        let blue = below(&mut self.rng, 1_024) as u16;
        Ok(RgbcReading {
            red,
            green,
            blue,
            clear: red + green + blue,
        })
    }
}

// ── Card reader ───────────────────────────────────────────────────────────────

pub struct SimulatedCardReader {
    rng: Pcg32,
    /// Average number of polls between two cards.
    mean_polls: u32,
}

impl SimulatedCardReader {
    pub fn new(seed: u64, mean_polls: u32) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            mean_polls: mean_polls.max(1),
        }
    }
}

impl SensorPort for SimulatedCardReader {
    type Reading = Option<CardUid>;

    fn read(&mut self) -> Result<Option<CardUid>, SensorError> {
        if !one_in(&mut self.rng, self.mean_polls) {
            return Ok(None);
        }
        Ok(Some(CardUid::new(self.rng.next_u32().to_be_bytes())))
    }
}

impl CardReader for SimulatedCardReader {
    fn halt(&mut self) {
        trace!("card halted");
    }
}

// ── PPG ───────────────────────────────────────────────────────────────────────

/// Finger on for `on_polls`, off for `off_polls`, repeating.
pub struct SimulatedPpg {
    rng: Pcg32,
    on_polls: u32,
    off_polls: u32,
    position: u32,
}

impl SimulatedPpg {
    pub fn new(seed: u64, on_polls: u32, off_polls: u32) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            on_polls,
            off_polls,
            position: 0,
        }
    }
}

impl SensorPort for SimulatedPpg {
    type Reading = PpgSample;

    fn read(&mut self) -> Result<PpgSample, SensorError> {
        let cycle = self.on_polls.saturating_add(self.off_polls).max(1);
        let finger_on = self.position < self.on_polls;
        self.position = (self.position + 1) % cycle;

        let base = if finger_on { 6_000 } else { 500 };
        Ok(PpgSample {
            red: base + below(&mut self.rng, 1_500),
            ir: base + below(&mut self.rng, 3_000),
        })
    }
}

// ── Button ────────────────────────────────────────────────────────────────────

pub struct SimulatedButton {
    rng: Pcg32,
    mean_polls: u32,
}

impl SimulatedButton {
    pub fn new(seed: u64, mean_polls: u32) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            mean_polls: mean_polls.max(1),
        }
    }
}

impl PushButton for SimulatedButton {
    fn is_pressed(&mut self) -> bool {
        one_in(&mut self.rng, self.mean_polls)
    }
}

// ── Feedback ──────────────────────────────────────────────────────────────────

/// Buzzer that only traces its edges.
#[derive(Debug, Default)]
pub struct TracingBuzzer {
    owner: &'static str,
}

impl TracingBuzzer {
    pub fn new(owner: &'static str) -> Self {
        Self { owner }
    }
}

impl Buzzer for TracingBuzzer {
    fn set_enabled(&mut self, enabled: bool) {
        trace!(owner = self.owner, enabled, "buzzer");
    }
}

/// LED that logs every colour change.
#[derive(Debug, Default)]
pub struct TracingLed;

impl RgbLed for TracingLed {
    fn set_color(&mut self, color: LedColor) {
        let (r, g, b) = color.duty_levels();
        debug!(%color, r, g, b, "rgb led");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn climate_warms_up_then_reads_in_range() {
        let mut s = SimulatedClimate::new(1, 2);
        assert!(s.read().is_err());
        assert!(s.read().is_err());
        let r = s.read().unwrap();
        assert!((20.0..30.0).contains(&r.temperature_celsius));
        assert!((40.0..60.0).contains(&r.humidity_percent));
    }

    #[test]
    fn ppg_alternates_presence() {
        let mut s = SimulatedPpg::new(3, 2, 2);
        let ir: Vec<_> = (0..4).map(|_| s.read().unwrap().ir).collect();
        assert!(ir[0] > 5_000 && ir[1] > 5_000);
        assert!(ir[2] < 5_000 && ir[3] < 5_000);
    }

    #[test]
    fn card_reader_with_mean_one_always_reports() {
        let mut r = SimulatedCardReader::new(9, 1);
        let uid = r.read().unwrap().unwrap();
        assert_eq!(uid.as_bytes().len(), 4);
    }
}
