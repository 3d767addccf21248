/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! On-disk record schema.
//!
//! The log is a three-column CSV:
//!
//! ```text
//! Tipo,Dados,Timestamp_ms
//! [DHT22],Temp: 23.4 C Umid: 51.0 %,20012
//! [RFID],Cartao lido: DEADBEEF,20345
//! [COLOR_SENSOR],R: 120 G: 98 B: 77 C: 310,20013
//! [OXIMETER],BPM: 79 SpO2: 97.6%,35410
//! ```
//!
//! The column names and payload wording are kept byte-compatible with logs
//! already written by deployed units.

use crate::clock::Timestamp;
use crate::measurement::VitalsResult;
use crate::sensor::{CardUid, ClimateReading, RgbcReading};

/// Header line written once, when the log file is empty at open.
pub const HEADER: &str = "Tipo,Dados,Timestamp_ms";

/// Identifies which task produced a record (first CSV column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordTag {
    Dht22,
    Rfid,
    ColorSensor,
    Oximeter,
}

impl RecordTag {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordTag::Dht22 => "DHT22",
            RecordTag::Rfid => "RFID",
            RecordTag::ColorSensor => "COLOR_SENSOR",
            RecordTag::Oximeter => "OXIMETER",
        }
    }
}

impl std::fmt::Display for RecordTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.as_str())
    }
}

/// One log line before it is handed to the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub tag: RecordTag,
    pub payload: String,
    pub timestamp: Timestamp,
}

impl Record {
    /// Column separators and line breaks in `payload` are replaced with
    /// spaces so one record always stays one three-column line.
    pub fn new(tag: RecordTag, payload: impl Into<String>, timestamp: Timestamp) -> Self {
        let payload = payload.into().replace([',', '\n', '\r'], " ");
        Self {
            tag,
            payload,
            timestamp,
        }
    }

    pub fn climate(reading: &ClimateReading, timestamp: Timestamp) -> Self {
        Self::new(
            RecordTag::Dht22,
            format!(
                "Temp: {:.1} C Umid: {:.1} %",
                reading.temperature_celsius, reading.humidity_percent
            ),
            timestamp,
        )
    }

    pub fn color(reading: &RgbcReading, timestamp: Timestamp) -> Self {
        Self::new(
            RecordTag::ColorSensor,
            format!(
                "R: {} G: {} B: {} C: {}",
                reading.red, reading.green, reading.blue, reading.clear
            ),
            timestamp,
        )
    }

    pub fn card(uid: &CardUid, timestamp: Timestamp) -> Self {
        Self::new(RecordTag::Rfid, format!("Cartao lido: {uid}"), timestamp)
    }

    pub fn vitals(result: &VitalsResult, timestamp: Timestamp) -> Self {
        Self::new(
            RecordTag::Oximeter,
            format!("BPM: {} SpO2: {}%", result.bpm, result.spo2_display()),
            timestamp,
        )
    }

    /// The full line as written to the sink, newline-terminated.
    pub fn to_line(&self) -> String {
        format!("{self}\n")
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{},{}",
            self.tag,
            self.payload,
            self.timestamp.as_millis()
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
