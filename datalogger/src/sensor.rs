/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Sensor capabilities consumed by the datalogger tasks.
//!
//! The register-level protocols (DHT22 bit-banging, TCS34725 I2C, MFRC522
//! anticollision, MAX30102 FIFO) live in driver crates outside this one.
//! Each driver is reduced to a single capability: *attempt one reading,
//! return the value or a [`SensorError`]*.
//!
//! ```text
//! driver ──► SensorPort::read() ──► task ──► Record ──► SharedSink
//! ```
//!
//! [`ScriptedSensor`] replays a fixed sequence of results and backs the
//! tests of every task.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use thiserror::Error;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Why a sensor could not deliver a reading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    /// The peripheral was not found, or is permanently out of service.
    #[error("sensor '{sensor}' is unavailable")]
    Unavailable { sensor: &'static str },

    /// One poll failed (still warming up, checksum mismatch, bus NAK).
    /// The next poll may succeed.
    #[error("sensor '{sensor}' is not ready (transient read failure)")]
    NotReady { sensor: &'static str },
}

impl SensorError {
    /// `true` for failures worth retrying on the next tick.
    pub fn is_transient(&self) -> bool {
        matches!(self, SensorError::NotReady { .. })
    }
}

// ── SensorPort ────────────────────────────────────────────────────────────────

/// One sensor kind, reduced to "attempt one reading".
pub trait SensorPort {
    type Reading;

    /// Attempt one reading.
    fn read(&mut self) -> Result<Self::Reading, SensorError>;

    /// Boot-time presence check.
    ///
    /// Drivers that can identify their part (chip id register) override this;
    /// the default assumes the device is present.
    fn probe(&mut self) -> Result<(), SensorError> {
        Ok(())
    }
}

/// Contactless card reader: a [`SensorPort`] yielding `Some(uid)` while a
/// new card is in the field.
pub trait CardReader: SensorPort<Reading = Option<CardUid>> {
    /// Put the current card to sleep so it is not reported again.
    fn halt(&mut self);
}

/// Momentary push button.
pub trait PushButton {
    /// `true` while the button is held down.
    fn is_pressed(&mut self) -> bool;
}

// ── Readings ──────────────────────────────────────────────────────────────────

/// Temperature / relative humidity pair (DHT22).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateReading {
    pub temperature_celsius: f32,
    pub humidity_percent: f32,
}

/// Raw red, green, blue and clear channel counts (TCS34725).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RgbcReading {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
    pub clear: u16,
}

/// One photoplethysmographic sample (MAX30102): red and infrared intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PpgSample {
    pub red: u32,
    pub ir: u32,
}

impl PpgSample {
    /// Sample with only the IR channel set; red mirrors it.
    pub fn from_ir(ir: u32) -> Self {
        Self { red: ir, ir }
    }
}

/// Card serial number as read during anticollision.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CardUid(Vec<u8>);

impl CardUid {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Upper-case hex, no separators (`DEADBEEF`).
impl std::fmt::Display for CardUid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

// ── ScriptedSensor ────────────────────────────────────────────────────────────

/// Sensor that replays a fixed script of results.
///
/// When the script runs out it either keeps returning the last successful
/// reading ([`hold_last`](Self::hold_last)) or reports `NotReady`.
#[derive(Debug)]
pub struct ScriptedSensor<R> {
    name: &'static str,
    script: VecDeque<Result<R, SensorError>>,
    last: Option<R>,
    hold_last: bool,
    present: bool,
    reads: Arc<AtomicUsize>,
}

impl<R: Clone> ScriptedSensor<R> {
    pub fn new(name: &'static str, script: impl IntoIterator<Item = Result<R, SensorError>>) -> Self {
        Self {
            name,
            script: script.into_iter().collect(),
            last: None,
            hold_last: false,
            present: true,
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Script made only of successful readings.
    pub fn from_readings(name: &'static str, readings: impl IntoIterator<Item = R>) -> Self {
        Self::new(name, readings.into_iter().map(Ok))
    }

    /// Repeat the last successful reading once the script is exhausted.
    pub fn hold_last(mut self) -> Self {
        self.hold_last = true;
        self
    }

    /// Make [`probe`](SensorPort::probe) fail, as if the part was not found.
    pub fn absent(mut self) -> Self {
        self.present = false;
        self
    }

    /// Shared counter of `read()` calls, usable after the sensor has been
    /// moved into a task.
    pub fn read_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.reads)
    }
}

impl<R: Clone> SensorPort for ScriptedSensor<R> {
    type Reading = R;

    fn read(&mut self) -> Result<R, SensorError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        match self.script.pop_front() {
            Some(Ok(reading)) => {
                self.last = Some(reading.clone());
                Ok(reading)
            }
            Some(Err(e)) => Err(e),
            None => match (&self.last, self.hold_last) {
                (Some(reading), true) => Ok(reading.clone()),
                _ => Err(SensorError::NotReady { sensor: self.name }),
            },
        }
    }

    fn probe(&mut self) -> Result<(), SensorError> {
        if self.present {
            Ok(())
        } else {
            Err(SensorError::Unavailable { sensor: self.name })
        }
    }
}

impl CardReader for ScriptedSensor<Option<CardUid>> {
    fn halt(&mut self) {}
}

impl PushButton for ScriptedSensor<bool> {
    fn is_pressed(&mut self) -> bool {
        self.read().unwrap_or(false)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_uid_formats_as_upper_hex() {
        let uid = CardUid::new([0xde, 0xad, 0x0b, 0xef]);
        assert_eq!(uid.to_string(), "DEAD0BEF");
    }

    #[test]
    fn scripted_sensor_replays_in_order_then_not_ready() {
        let mut s = ScriptedSensor::new(
            "T",
            [Err(SensorError::NotReady { sensor: "T" }), Ok(1u32), Ok(2)],
        );
        assert!(s.read().is_err());
        assert_eq!(s.read(), Ok(1));
        assert_eq!(s.read(), Ok(2));
        assert_eq!(s.read(), Err(SensorError::NotReady { sensor: "T" }));
    }

    #[test]
    fn scripted_sensor_hold_last_repeats_final_reading() {
        let mut s = ScriptedSensor::from_readings("T", [7u32]).hold_last();
        assert_eq!(s.read(), Ok(7));
        assert_eq!(s.read(), Ok(7));
        assert_eq!(s.read_counter().load(Ordering::SeqCst), 2);
    }

    #[test]
    fn absent_sensor_fails_probe() {
        let mut s = ScriptedSensor::<u32>::from_readings("RFID", []).absent();
        assert_eq!(s.probe(), Err(SensorError::Unavailable { sensor: "RFID" }));
    }

    #[test]
    fn only_not_ready_is_transient() {
        assert!(SensorError::NotReady { sensor: "x" }.is_transient());
        assert!(!SensorError::Unavailable { sensor: "x" }.is_transient());
    }

    #[test]
    fn scripted_button_defaults_to_released() {
        let mut b = ScriptedSensor::from_readings("BUTTON", [true]);
        assert!(b.is_pressed());
        assert!(!b.is_pressed());
    }
}
