/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Measurement window summary and result estimation.
//!
//! Real pulse / SpO2 extraction is not implemented.  The state machine only
//! needs *something* that turns a completed window into a [`VitalsResult`],
//! so estimation sits behind the [`VitalsEstimator`] trait and the provided
//! [`SimulatedVitals`] draws plausible values from a seeded PCG generator.

use rand_core::{RngCore, SeedableRng};
use rand_pcg::Pcg32;

use crate::sensor::PpgSample;

// ── Window summary ────────────────────────────────────────────────────────────

/// Running statistics over the samples of one measurement window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowSummary {
    pub samples: u32,
    ir_sum: u64,
    red_sum: u64,
}

impl WindowSummary {
    pub fn push(&mut self, sample: PpgSample) {
        self.samples = self.samples.saturating_add(1);
        self.ir_sum = self.ir_sum.saturating_add(u64::from(sample.ir));
        self.red_sum = self.red_sum.saturating_add(u64::from(sample.red));
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn mean_ir(&self) -> u32 {
        mean(self.ir_sum, self.samples)
    }

    pub fn mean_red(&self) -> u32 {
        mean(self.red_sum, self.samples)
    }
}

fn mean(sum: u64, n: u32) -> u32 {
    if n == 0 {
        return 0;
    }
    u32::try_from(sum / u64::from(n)).unwrap_or(u32::MAX)
}

// ── Result ────────────────────────────────────────────────────────────────────

/// Outcome of one completed measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VitalsResult {
    pub bpm: u8,
    /// Oxygen saturation in tenths of a percent (`976` = 97.6 %).
    pub spo2_tenths: u16,
}

impl VitalsResult {
    /// SpO2 formatted with one decimal place.
    pub fn spo2_display(&self) -> String {
        format!("{}.{}", self.spo2_tenths / 10, self.spo2_tenths % 10)
    }
}

// ── Estimators ────────────────────────────────────────────────────────────────

/// Turns a completed window into a result.
pub trait VitalsEstimator {
    fn estimate(&mut self, window: &WindowSummary) -> VitalsResult;
}

/// Draws BPM in `75..=84` and SpO2 in `97.0..=98.9`.
#[derive(Debug, Clone)]
pub struct SimulatedVitals {
    rng: Pcg32,
}

impl SimulatedVitals {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl VitalsEstimator for SimulatedVitals {
    fn estimate(&mut self, _window: &WindowSummary) -> VitalsResult {
        let bpm = 75 + (self.rng.next_u32() % 10) as u8;
        let spo2_tenths = 970 + (self.rng.next_u32() % 20) as u16;
        VitalsResult { bpm, spo2_tenths }
    }
}

/// Always returns the same result.
#[derive(Debug, Clone, Copy)]
pub struct FixedVitals(pub VitalsResult);

impl VitalsEstimator for FixedVitals {
    fn estimate(&mut self, _window: &WindowSummary) -> VitalsResult {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_means_over_pushed_samples() {
        let mut w = WindowSummary::default();
        w.push(PpgSample { red: 100, ir: 6_000 });
        w.push(PpgSample { red: 300, ir: 8_000 });
        assert_eq!(w.samples, 2);
        assert_eq!(w.mean_ir(), 7_000);
        assert_eq!(w.mean_red(), 200);

        w.clear();
        assert_eq!(w.mean_ir(), 0);
    }

    #[test]
    fn simulated_vitals_stay_in_range() {
        let mut est = SimulatedVitals::new(42);
        for _ in 0..500 {
            let r = est.estimate(&WindowSummary::default());
            assert!((75..=84).contains(&r.bpm), "bpm {}", r.bpm);
            assert!((970..=989).contains(&r.spo2_tenths), "spo2 {}", r.spo2_tenths);
        }
    }

    #[test]
    fn simulated_vitals_are_reproducible_per_seed() {
        let a: Vec<_> = {
            let mut e = SimulatedVitals::new(7);
            (0..5).map(|_| e.estimate(&WindowSummary::default())).collect()
        };
        let b: Vec<_> = {
            let mut e = SimulatedVitals::new(7);
            (0..5).map(|_| e.estimate(&WindowSummary::default())).collect()
        };
        assert_eq!(a, b);
    }

    #[test]
    fn spo2_display_has_one_decimal() {
        let r = VitalsResult {
            bpm: 80,
            spo2_tenths: 980,
        };
        assert_eq!(r.spo2_display(), "98.0");
    }
}
