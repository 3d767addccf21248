/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Periodic RGBC colour logging (TCS34725).

use std::time::Duration;

use tracing::info;

use crate::sensor::{RgbcReading, SensorPort};
use crate::sink::Record;
use crate::task::{report_sensor_failure, Cadence, Task, TaskContext, TaskError};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

pub struct ColorTask<S> {
    sensor: S,
    interval: Duration,
    integration_wait: Duration,
}

impl<S> ColorTask<S>
where
    S: SensorPort<Reading = RgbcReading>,
{
    pub fn new(sensor: S, interval: Duration, integration_wait: Duration) -> Self {
        Self {
            sensor,
            interval,
            integration_wait,
        }
    }
}

impl<S> Task for ColorTask<S>
where
    S: SensorPort<Reading = RgbcReading>,
{
    fn name(&self) -> &str {
        "COLOR_SENSOR"
    }

    fn cadence(&self) -> Cadence {
        Cadence::periodic(self.interval)
    }

    fn busy_wait_budget(&self) -> Duration {
        self.integration_wait
    }

    fn run(&mut self, ctx: &TaskContext<'_>) -> Result<(), TaskError> {
        ctx.delay(self.integration_wait);
        let rgbc = self
            .sensor
            .read()
            .map_err(|e| report_sensor_failure(self.name(), e))?;

        info!(
            r = rgbc.red,
            g = rgbc.green,
            b = rgbc.blue,
            c = rgbc.clear,
            "[COLOR] reading"
        );
        ctx.log(&Record::color(&rgbc, ctx.now()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SimClock;
    use crate::sensor::{ScriptedSensor, SensorError};
    use crate::sink::SharedSink;

    #[test]
    fn reading_is_logged_with_all_four_channels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let sink = SharedSink::open(&path).unwrap();
        let clock = SimClock::new();
        let ctx = TaskContext::new(&clock, &sink);

        let mut task = ColorTask::new(
            ScriptedSensor::from_readings(
                "TCS34725",
                [RgbcReading {
                    red: 10,
                    green: 20,
                    blue: 30,
                    clear: 65_535,
                }],
            ),
            DEFAULT_INTERVAL,
            Duration::ZERO,
        );
        task.run(&ctx).unwrap();
        drop(sink);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "Tipo,Dados,Timestamp_ms\n[COLOR_SENSOR],R: 10 G: 20 B: 30 C: 65535,0\n"
        );
    }

    #[test]
    fn unavailable_sensor_fails_without_logging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let sink = SharedSink::open(&path).unwrap();
        let clock = SimClock::new();
        let ctx = TaskContext::new(&clock, &sink);

        let mut task = ColorTask::new(
            ScriptedSensor::new(
                "TCS34725",
                [Err(SensorError::Unavailable { sensor: "TCS34725" })],
            ),
            DEFAULT_INTERVAL,
            Duration::ZERO,
        );
        assert!(task.run(&ctx).is_err());
        drop(sink);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Tipo,Dados,Timestamp_ms\n");
    }
}
