/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Timed three-state measurement controller (pulse oximeter).
//!
//! ```text
//!          ir > threshold                elapsed ≥ 15 s
//!   Idle ─────────────────► Measuring ─────────────────► Cooldown
//!    ▲                          │        emit result         │
//!    │      ir < threshold      │                            │
//!    ├──────────────────────────┘                            │
//!    │                    now ≥ resume_at                    │
//!    └───────────────────────────────────────────────────────┘
//! ```
//!
//! A measurement requires sustained contact: losing the presence signal at
//! any point of the window discards the whole window and emits nothing.
//! Transitions depend only on the live sensor signal and elapsed time.
//!
//! The machine is registered as one every-tick [`Task`] named `OXIMETER`.

pub mod vitals;

pub use vitals::{FixedVitals, SimulatedVitals, VitalsEstimator, VitalsResult, WindowSummary};

use std::time::Duration;

use tracing::{debug, info};

use crate::clock::Timestamp;
use crate::feedback::{beep_pattern, pattern_duration, Buzzer};
use crate::sensor::{PpgSample, SensorPort};
use crate::sink::Record;
use crate::task::{Cadence, Task, TaskContext, TaskError};

// ── Constants ─────────────────────────────────────────────────────────────────

/// IR intensity above which a finger is considered on the sensor.
pub const DEFAULT_PRESENCE_THRESHOLD: u32 = 5_000;

/// Contact time needed for one result.
pub const DEFAULT_MEASUREMENT_DURATION: Duration = Duration::from_secs(15);

/// Pause after a result before a new measurement may start.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(3);

/// Number of beeps announcing a completed measurement.
const COMPLETION_BEEPS: u32 = 3;

// ── State ─────────────────────────────────────────────────────────────────────

/// Exactly one state is active; the timestamp each state carries is the only
/// epoch that state needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeasurementState {
    #[default]
    Idle,
    Measuring {
        started_at: Timestamp,
    },
    Cooldown {
        resume_at: Timestamp,
    },
}

impl MeasurementState {
    pub fn name(&self) -> &'static str {
        match self {
            MeasurementState::Idle => "idle",
            MeasurementState::Measuring { .. } => "measuring",
            MeasurementState::Cooldown { .. } => "cooldown",
        }
    }
}

// ── Settings ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementSettings {
    pub presence_threshold: u32,
    pub measurement: Duration,
    pub cooldown: Duration,
    pub beep_on: Duration,
    pub beep_gap: Duration,
}

impl Default for MeasurementSettings {
    fn default() -> Self {
        Self {
            presence_threshold: DEFAULT_PRESENCE_THRESHOLD,
            measurement: DEFAULT_MEASUREMENT_DURATION,
            cooldown: DEFAULT_COOLDOWN,
            beep_on: Duration::from_millis(250),
            beep_gap: Duration::from_millis(100),
        }
    }
}

// ── MeasurementStateMachine ───────────────────────────────────────────────────

pub struct MeasurementStateMachine<S, E, B> {
    sensor: S,
    estimator: E,
    buzzer: B,
    settings: MeasurementSettings,
    state: MeasurementState,
    window: WindowSummary,
    completed: u64,
}

impl<S, E, B> MeasurementStateMachine<S, E, B>
where
    S: SensorPort<Reading = PpgSample>,
    E: VitalsEstimator,
    B: Buzzer,
{
    pub fn new(sensor: S, estimator: E, buzzer: B, settings: MeasurementSettings) -> Self {
        Self {
            sensor,
            estimator,
            buzzer,
            settings,
            state: MeasurementState::Idle,
            window: WindowSummary::default(),
            completed: 0,
        }
    }

    pub fn state(&self) -> MeasurementState {
        self.state
    }

    /// Number of results emitted so far.
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Advance the machine by one poll.  Returns the result when a
    /// measurement completes on this step.
    ///
    /// A failed sensor read leaves the state unchanged.
    pub fn step(&mut self, ctx: &TaskContext<'_>) -> Result<Option<VitalsResult>, TaskError> {
        let now = ctx.now();
        let threshold = self.settings.presence_threshold;

        match self.state {
            MeasurementState::Idle => {
                let sample = self.sensor.read()?;
                if sample.ir > threshold {
                    self.window.clear();
                    self.window.push(sample);
                    self.state = MeasurementState::Measuring { started_at: now };
                    info!(
                        ir = sample.ir,
                        duration_s = self.settings.measurement.as_secs(),
                        "presence detected, measurement started"
                    );
                }
                Ok(None)
            }

            MeasurementState::Measuring { started_at } => {
                let sample = self.sensor.read()?;
                if sample.ir < threshold {
                    self.state = MeasurementState::Idle;
                    info!(
                        ir = sample.ir,
                        after_ms = now.saturating_duration_since(started_at).as_millis() as u64,
                        "presence lost, measurement cancelled"
                    );
                    return Ok(None);
                }
                self.window.push(sample);

                if now.saturating_duration_since(started_at) < self.settings.measurement {
                    return Ok(None);
                }
                Ok(Some(self.complete(ctx, now)))
            }

            MeasurementState::Cooldown { resume_at } => {
                if now >= resume_at {
                    self.state = MeasurementState::Idle;
                    info!("cooldown over, waiting for presence");
                }
                Ok(None)
            }
        }
    }

    fn complete(&mut self, ctx: &TaskContext<'_>, now: Timestamp) -> VitalsResult {
        let result = self.estimator.estimate(&self.window);
        self.completed += 1;
        info!(
            bpm = result.bpm,
            spo2 = %result.spo2_display(),
            samples = self.window.samples,
            mean_ir = self.window.mean_ir(),
            "measurement complete"
        );

        ctx.log(&Record::vitals(&result, now));

        beep_pattern(
            &mut self.buzzer,
            ctx.clock,
            COMPLETION_BEEPS,
            self.settings.beep_on,
            self.settings.beep_gap,
        );

        // Cooldown counts from the end of the announcement.
        let resume_at = ctx.now().saturating_add(self.settings.cooldown);
        self.state = MeasurementState::Cooldown { resume_at };
        debug!(resume_at_ms = resume_at.as_millis(), "cooldown started");
        result
    }
}

impl<S, E, B> Task for MeasurementStateMachine<S, E, B>
where
    S: SensorPort<Reading = PpgSample>,
    E: VitalsEstimator,
    B: Buzzer,
{
    fn name(&self) -> &str {
        "OXIMETER"
    }

    fn cadence(&self) -> Cadence {
        Cadence::EveryTick
    }

    fn busy_wait_budget(&self) -> Duration {
        pattern_duration(
            COMPLETION_BEEPS,
            self.settings.beep_on,
            self.settings.beep_gap,
        )
    }

    fn run(&mut self, ctx: &TaskContext<'_>) -> Result<(), TaskError> {
        self.step(ctx).map(|_| ())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, SimClock};
    use crate::feedback::SilentBuzzer;
    use crate::sensor::{ScriptedSensor, SensorError};
    use crate::sink::SharedSink;
    use std::sync::atomic::Ordering;

    const TICK: Duration = Duration::from_millis(100);

    fn ppg(readings: impl IntoIterator<Item = u32>) -> ScriptedSensor<PpgSample> {
        ScriptedSensor::from_readings("MAX30102", readings.into_iter().map(PpgSample::from_ir))
    }

    fn machine(
        sensor: ScriptedSensor<PpgSample>,
    ) -> MeasurementStateMachine<ScriptedSensor<PpgSample>, FixedVitals, SilentBuzzer> {
        MeasurementStateMachine::new(
            sensor,
            FixedVitals(VitalsResult {
                bpm: 78,
                spo2_tenths: 975,
            }),
            SilentBuzzer,
            MeasurementSettings::default(),
        )
    }

    /// Step once, then let one tick interval pass.
    fn step(
        m: &mut MeasurementStateMachine<ScriptedSensor<PpgSample>, FixedVitals, SilentBuzzer>,
        clock: &SimClock,
        sink: &SharedSink,
    ) -> Option<VitalsResult> {
        let ctx = TaskContext::new(clock, sink);
        let out = m.step(&ctx).unwrap();
        clock.advance(TICK);
        out
    }

    #[test]
    fn starts_idle() {
        let m = machine(ppg([]));
        assert_eq!(m.state(), MeasurementState::Idle);
    }

    #[test]
    fn sustained_presence_emits_exactly_one_result_then_cooldown() {
        // [2000, 6000 × 151 (t=100..=15100), 2000]
        let readings = std::iter::once(2_000)
            .chain(std::iter::repeat(6_000).take(151))
            .chain(std::iter::once(2_000));
        let sensor = ppg(readings);
        let reads = sensor.read_counter();
        let mut m = machine(sensor);
        let clock = SimClock::new();
        let sink = SharedSink::unavailable();

        // t=0: below threshold
        assert_eq!(step(&mut m, &clock, &sink), None);
        assert_eq!(m.state(), MeasurementState::Idle);

        // t=100: second reading starts the window
        assert_eq!(step(&mut m, &clock, &sink), None);
        assert_eq!(
            m.state(),
            MeasurementState::Measuring {
                started_at: Timestamp::from_millis(100)
            }
        );

        let mut results = Vec::new();
        while matches!(m.state(), MeasurementState::Measuring { .. }) {
            results.extend(step(&mut m, &clock, &sink));
        }
        assert_eq!(results.len(), 1);
        assert_eq!(m.completed(), 1);

        // Emitted at t=15100, three beeps (950 ms) → cooldown from 16050 to 19050.
        assert_eq!(
            m.state(),
            MeasurementState::Cooldown {
                resume_at: Timestamp::from_millis(19_050)
            }
        );
        let reads_before_cooldown = reads.load(Ordering::SeqCst);
        assert_eq!(reads_before_cooldown, 152);

        let mut entered_idle_at = None;
        while entered_idle_at.is_none() {
            let t = clock.now();
            step(&mut m, &clock, &sink);
            if m.state() == MeasurementState::Idle {
                entered_idle_at = Some(t);
            }
        }
        assert_eq!(entered_idle_at, Some(Timestamp::from_millis(19_050)));
        assert_eq!(
            reads.load(Ordering::SeqCst),
            reads_before_cooldown,
            "no sensor polling during cooldown"
        );

        // Trailing 2000 is read in a fresh Idle cycle and starts nothing.
        assert_eq!(step(&mut m, &clock, &sink), None);
        assert_eq!(m.state(), MeasurementState::Idle);
        assert_eq!(reads.load(Ordering::SeqCst), 153);
    }

    #[test]
    fn withdrawn_at_ten_seconds_emits_nothing() {
        // 6000 for t=0..=9900, then 2000 at t=10000.
        let readings = std::iter::repeat(6_000)
            .take(100)
            .chain(std::iter::once(2_000));
        let mut m = machine(ppg(readings));
        let clock = SimClock::new();
        let sink = SharedSink::unavailable();

        let mut results = 0;
        for _ in 0..101 {
            results += step(&mut m, &clock, &sink).iter().count();
        }

        assert_eq!(results, 0);
        assert_eq!(m.completed(), 0);
        assert_eq!(m.state(), MeasurementState::Idle);
    }

    #[test]
    fn reading_equal_to_threshold_neither_starts_nor_cancels() {
        let mut m = machine(ppg([5_000, 6_000, 5_000]));
        let clock = SimClock::new();
        let sink = SharedSink::unavailable();

        step(&mut m, &clock, &sink);
        assert_eq!(m.state(), MeasurementState::Idle);
        step(&mut m, &clock, &sink);
        step(&mut m, &clock, &sink);
        assert!(matches!(m.state(), MeasurementState::Measuring { .. }));
    }

    #[test]
    fn failed_read_keeps_measuring_state() {
        let sensor = ScriptedSensor::new(
            "MAX30102",
            [
                Ok(PpgSample::from_ir(6_000)),
                Err(SensorError::NotReady { sensor: "MAX30102" }),
            ],
        );
        let mut m = machine(sensor);
        let clock = SimClock::new();
        let sink = SharedSink::unavailable();

        step(&mut m, &clock, &sink);
        let ctx = TaskContext::new(&clock, &sink);
        assert!(m.step(&ctx).is_err());
        assert!(matches!(m.state(), MeasurementState::Measuring { .. }));
    }

    #[test]
    fn result_is_logged_with_completion_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let sink = SharedSink::open(&path).unwrap();
        let clock = SimClock::new();
        let settings = MeasurementSettings {
            measurement: Duration::from_millis(300),
            ..MeasurementSettings::default()
        };
        let mut m = MeasurementStateMachine::new(
            ppg([6_000; 4]),
            FixedVitals(VitalsResult {
                bpm: 81,
                spo2_tenths: 982,
            }),
            SilentBuzzer,
            settings,
        );

        for _ in 0..4 {
            step(&mut m, &clock, &sink);
        }
        drop(sink);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "Tipo,Dados,Timestamp_ms\n[OXIMETER],BPM: 81 SpO2: 98.2%,300\n"
        );
    }

    #[test]
    fn task_budget_covers_three_beeps() {
        let m = machine(ppg([]));
        assert_eq!(m.busy_wait_budget(), Duration::from_millis(950));
        assert_eq!(m.cadence(), Cadence::EveryTick);
        assert_eq!(m.name(), "OXIMETER");
    }
}
