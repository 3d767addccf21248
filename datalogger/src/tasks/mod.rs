/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Concrete datalogger tasks, one per peripheral.
//!
//! | Task | Tag | Cadence | Busy-wait |
//! |---|---|---|---|
//! | [`ClimateTask`] | `DHT22` | periodic, 20 s | conversion wait |
//! | [`CardTask`] | `RFID` | every tick | double beep |
//! | [`ColorTask`] | `COLOR_SENSOR` | periodic, 30 s | integration wait |
//! | [`ButtonTask`] | `BUTTON` | every tick | debounce |
//!
//! The oximeter lives in [`crate::measurement`].

pub mod button;
pub mod card;
pub mod climate;
pub mod color;

pub use button::ButtonTask;
pub use card::CardTask;
pub use climate::ClimateTask;
pub use color::ColorTask;
