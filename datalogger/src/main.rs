/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};

use datalogger::clock::MonotonicClock;
use datalogger::config::{ConfigManager, DataloggerConfig};
use datalogger::measurement::{MeasurementStateMachine, SimulatedVitals};
use datalogger::scheduler::CooperativeScheduler;
use datalogger::sim::{
    SimulatedButton, SimulatedCardReader, SimulatedClimate, SimulatedColor, SimulatedPpg,
    TracingBuzzer, TracingLed,
};
use datalogger::sink::SharedSink;
use datalogger::tasks::{ButtonTask, CardTask, ClimateTask, ColorTask};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Multi-sensor datalogger running against simulated peripherals.
///
/// Example:
///   datalogger -c datalogger.yaml --ticks 600 --seed 7
#[derive(Debug, Parser)]
#[command(
    name = "datalogger",
    about = "Cooperative multi-sensor datalogger",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Override the log file path from the configuration.
    #[arg(short = 'l', long = "log-file")]
    log_file: Option<PathBuf>,

    /// Stop after this many ticks (runs forever when omitted).
    #[arg(short = 't', long = "ticks")]
    ticks: Option<u64>,

    /// Seed for the simulated peripherals.
    #[arg(short = 's', long = "seed", default_value_t = 1)]
    seed: u64,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Datalogger starting up...");

    let cli = Cli::parse();

    info!(
        config   = ?cli.config,
        log_file = ?cli.log_file,
        ticks    = ?cli.ticks,
        seed     = cli.seed,
        "Configuration"
    );

    // ── Load configuration ────────────────────────────────────────────────────
    let mut config_manager = ConfigManager::new();

    match &cli.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            if let Err(e) = config_manager.load_from_file(path) {
                error!("Failed to load configuration: {:#}", e);
                process::exit(1);
            }
        }
        None => {
            warn!("No configuration file provided, using default settings");
        }
    }

    let mut config = config_manager.config().clone();
    if let Some(path) = cli.log_file {
        config.log_path = path;
    }

    if let Err(e) = run(&config, cli.seed, cli.ticks) {
        error!("Datalogger stopped: {:#}", e);
        process::exit(1);
    }
}

fn run(config: &DataloggerConfig, seed: u64, ticks: Option<u64>) -> Result<()> {
    // ── Storage ───────────────────────────────────────────────────────────────
    let sink = SharedSink::open_or_unavailable(&config.log_path);
    if sink.is_available() {
        info!(path = %config.log_path.display(), "log file ready");
    }

    let mut scheduler = CooperativeScheduler::new(MonotonicClock::new(), sink)
        .with_tick_interval(config.tick_interval);

    // ── Bring-up (registration order is poll order) ───────────────────────────
    let climate = config.climate;
    scheduler.register_probed(SimulatedClimate::new(seed, 3), |s| {
        ClimateTask::new(s, climate.interval, climate.wait)
    })?;

    let beep = config.card_beep;
    scheduler.register_probed(SimulatedCardReader::new(seed.wrapping_add(1), 150), |r| {
        CardTask::new(r, TracingBuzzer::new("RFID"), beep.on, beep.gap)
    })?;

    let color = config.color;
    scheduler.register_probed(SimulatedColor::new(seed.wrapping_add(2)), |s| {
        ColorTask::new(s, color.interval, color.wait)
    })?;

    scheduler.register(ButtonTask::new(
        SimulatedButton::new(seed.wrapping_add(3), 100),
        TracingLed,
        config.debounce,
    ))?;

    let oximeter = config.oximeter;
    scheduler.register_probed(SimulatedPpg::new(seed.wrapping_add(4), 200, 100), |s| {
        MeasurementStateMachine::new(
            s,
            SimulatedVitals::new(seed.wrapping_add(5)),
            TracingBuzzer::new("OXIMETER"),
            oximeter,
        )
    })?;

    info!(
        tasks = ?scheduler.task_names(),
        worst_case_tick_ms = scheduler.worst_case_tick_latency().as_millis() as u64,
        max_slip_ms = scheduler.max_deadline_slip().as_millis() as u64,
        "System initialised"
    );

    scheduler.run(ticks);

    for name in scheduler.task_names() {
        if let Some(stats) = scheduler.stats(name) {
            info!(
                task = name,
                runs = stats.runs,
                failures = stats.failures,
                "task summary"
            );
        }
    }
    Ok(())
}
