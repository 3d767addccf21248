//! Datalogger configuration loading and management.
//!
//! Every value has a default matching the shipped firmware, so both a
//! missing file and a partial file are valid.  The expected YAML structure is:
//! ```yaml
//! log_path: "system_log.txt"
//! tick_interval_ms: 100
//! climate:
//!   interval_ms: 20000
//!   conversion_wait_ms: 20
//! color:
//!   interval_ms: 30000
//!   integration_wait_ms: 0
//! button:
//!   debounce_ms: 200
//! card:
//!   beep_ms: 250
//!   gap_ms: 50
//! oximeter:
//!   presence_threshold: 5000
//!   measurement_ms: 15000
//!   cooldown_ms: 3000
//!   beep_ms: 250
//!   gap_ms: 100
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::measurement::MeasurementSettings;

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
///
/// Kept private – callers work with [`DataloggerConfig`] (typed durations)
/// instead of raw millisecond integers.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    log_path: PathBuf,
    tick_interval_ms: u64,
    climate: PeriodicEntry,
    color: ColorEntry,
    button: ButtonEntry,
    card: BeepEntry,
    oximeter: OximeterEntry,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PeriodicEntry {
    interval_ms: u64,
    conversion_wait_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ColorEntry {
    interval_ms: u64,
    integration_wait_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ButtonEntry {
    debounce_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct BeepEntry {
    beep_ms: u64,
    gap_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct OximeterEntry {
    presence_threshold: u32,
    measurement_ms: u64,
    cooldown_ms: u64,
    beep_ms: u64,
    gap_ms: u64,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("system_log.txt"),
            tick_interval_ms: 100,
            climate: PeriodicEntry::default(),
            color: ColorEntry::default(),
            button: ButtonEntry::default(),
            card: BeepEntry::default(),
            oximeter: OximeterEntry::default(),
        }
    }
}

impl Default for PeriodicEntry {
    fn default() -> Self {
        Self {
            interval_ms: 20_000,
            conversion_wait_ms: 20,
        }
    }
}

impl Default for ColorEntry {
    fn default() -> Self {
        Self {
            interval_ms: 30_000,
            integration_wait_ms: 0,
        }
    }
}

impl Default for ButtonEntry {
    fn default() -> Self {
        Self { debounce_ms: 200 }
    }
}

impl Default for BeepEntry {
    fn default() -> Self {
        Self {
            beep_ms: 250,
            gap_ms: 50,
        }
    }
}

impl Default for OximeterEntry {
    fn default() -> Self {
        Self {
            presence_threshold: 5_000,
            measurement_ms: 15_000,
            cooldown_ms: 3_000,
            beep_ms: 250,
            gap_ms: 100,
        }
    }
}

// ── Public data structures ────────────────────────────────────────────────────

/// Cadence and blocking time of one periodic sensor task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicSensorConfig {
    pub interval: Duration,
    /// Fixed wait spent before each reading.
    pub wait: Duration,
}

/// Buzzer acknowledgement timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeepConfig {
    pub on: Duration,
    pub gap: Duration,
}

/// Fully-resolved datalogger configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataloggerConfig {
    pub log_path: PathBuf,
    pub tick_interval: Duration,
    pub climate: PeriodicSensorConfig,
    pub color: PeriodicSensorConfig,
    pub debounce: Duration,
    pub card_beep: BeepConfig,
    pub oximeter: MeasurementSettings,
}

impl Default for DataloggerConfig {
    fn default() -> Self {
        Self::from_file(ConfigFile::default())
    }
}

impl DataloggerConfig {
    fn from_file(f: ConfigFile) -> Self {
        let ms = Duration::from_millis;
        Self {
            log_path: f.log_path,
            tick_interval: ms(f.tick_interval_ms),
            climate: PeriodicSensorConfig {
                interval: ms(f.climate.interval_ms),
                wait: ms(f.climate.conversion_wait_ms),
            },
            color: PeriodicSensorConfig {
                interval: ms(f.color.interval_ms),
                wait: ms(f.color.integration_wait_ms),
            },
            debounce: ms(f.button.debounce_ms),
            card_beep: BeepConfig {
                on: ms(f.card.beep_ms),
                gap: ms(f.card.gap_ms),
            },
            oximeter: MeasurementSettings {
                presence_threshold: f.oximeter.presence_threshold,
                measurement: ms(f.oximeter.measurement_ms),
                cooldown: ms(f.oximeter.cooldown_ms),
                beep_on: ms(f.oximeter.beep_ms),
                beep_gap: ms(f.oximeter.gap_ms),
            },
        }
    }

    /// Reject values that would make the loop meaningless.
    fn validate(&self) -> Result<()> {
        if self.climate.interval.is_zero() {
            bail!("climate.interval_ms must be greater than zero");
        }
        if self.color.interval.is_zero() {
            bail!("color.interval_ms must be greater than zero");
        }
        if self.oximeter.measurement.is_zero() {
            bail!("oximeter.measurement_ms must be greater than zero");
        }
        if self.oximeter.presence_threshold == 0 {
            bail!("oximeter.presence_threshold must be greater than zero");
        }
        Ok(())
    }
}

// ── ConfigManager ─────────────────────────────────────────────────────────────

/// Loads and holds the datalogger configuration.
#[derive(Debug, Default)]
pub struct ConfigManager {
    config: DataloggerConfig,

    /// Set to `true` after a successful [`load_from_file`](Self::load_from_file).
    loaded: bool,
}

impl ConfigManager {
    /// Creates a manager holding the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `path` and replaces the current configuration.
    ///
    /// On error the manager falls back to defaults and reports not loaded.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, the YAML is malformed or
    /// contains unknown keys, or a value fails validation.
    pub fn load_from_file(&mut self, path: &Path) -> Result<()> {
        info!("Loading datalogger configuration from: {}", path.display());

        // Reset state before (re-)loading
        self.config = DataloggerConfig::default();
        self.loaded = false;

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        // An empty document deserialises to unit, not to a mapping.
        let file: ConfigFile = if content.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?
        };

        let config = DataloggerConfig::from_file(file);
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        debug!(?config, "configuration parsed");
        self.config = config;
        self.loaded = true;
        Ok(())
    }

    pub fn config(&self) -> &DataloggerConfig {
        &self.config
    }

    /// Returns `true` after a successful [`load_from_file`](Self::load_from_file).
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
