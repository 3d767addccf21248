/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Periodic temperature / humidity logging (DHT22).

use std::time::Duration;

use tracing::info;

use crate::sensor::{ClimateReading, SensorPort};
use crate::sink::Record;
use crate::task::{report_sensor_failure, Cadence, Task, TaskContext, TaskError};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(20);

pub struct ClimateTask<S> {
    sensor: S,
    interval: Duration,
    conversion_wait: Duration,
}

impl<S> ClimateTask<S>
where
    S: SensorPort<Reading = ClimateReading>,
{
    /// `conversion_wait` is the fixed time the sensor needs before its data
    /// line is valid; it is spent blocking on every invocation.
    pub fn new(sensor: S, interval: Duration, conversion_wait: Duration) -> Self {
        Self {
            sensor,
            interval,
            conversion_wait,
        }
    }
}

impl<S> Task for ClimateTask<S>
where
    S: SensorPort<Reading = ClimateReading>,
{
    fn name(&self) -> &str {
        "DHT22"
    }

    fn cadence(&self) -> Cadence {
        Cadence::periodic(self.interval)
    }

    fn busy_wait_budget(&self) -> Duration {
        self.conversion_wait
    }

    fn run(&mut self, ctx: &TaskContext<'_>) -> Result<(), TaskError> {
        ctx.delay(self.conversion_wait);
        let reading = self
            .sensor
            .read()
            .map_err(|e| report_sensor_failure(self.name(), e))?;

        info!(
            temperature_c = reading.temperature_celsius,
            humidity_pct = reading.humidity_percent,
            "[DHT22] reading"
        );
        ctx.log(&Record::climate(&reading, ctx.now()));
        Ok(())
    }
}
