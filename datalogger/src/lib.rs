/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Multi-sensor datalogger – cooperative scheduler core
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── clock         – monotonic ms timestamps, real and simulated clocks
//! ├── sensor        – SensorPort / CardReader / PushButton seams, readings
//! ├── feedback      – buzzer patterns and RGB status LED colours
//! ├── sink/         – shared append-only CSV log (mutex-guarded)
//! ├── task          – Task trait, cadence, per-invocation context
//! ├── scheduler/    – tick loop, deadlines, latency bounds
//! ├── measurement/  – oximeter presence/measure/cooldown state machine
//! ├── tasks/        – climate, card, colour and button tasks
//! ├── config/       – YAML runtime configuration
//! └── sim           – seeded simulated peripherals for host runs
//! ```

pub mod clock;
pub mod config;
pub mod feedback;
pub mod measurement;
pub mod scheduler;
pub mod sensor;
pub mod sim;
pub mod sink;
pub mod task;
pub mod tasks;
