/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Contactless card logging (MFRC522).
//!
//! Polled every tick.  When a new card enters the field the task gives a
//! double beep, logs the UID and halts the card so the next tick does not
//! report it again.

use std::time::Duration;

use tracing::info;

use crate::feedback::{beep_pattern, pattern_duration, Buzzer};
use crate::sensor::CardReader;
use crate::sink::Record;
use crate::task::{Cadence, Task, TaskContext, TaskError};

const ACK_BEEPS: u32 = 2;

pub struct CardTask<R, B> {
    reader: R,
    buzzer: B,
    beep_on: Duration,
    beep_gap: Duration,
}

impl<R, B> CardTask<R, B>
where
    R: CardReader,
    B: Buzzer,
{
    pub fn new(reader: R, buzzer: B, beep_on: Duration, beep_gap: Duration) -> Self {
        Self {
            reader,
            buzzer,
            beep_on,
            beep_gap,
        }
    }
}

impl<R, B> Task for CardTask<R, B>
where
    R: CardReader,
    B: Buzzer,
{
    fn name(&self) -> &str {
        "RFID"
    }

    fn cadence(&self) -> Cadence {
        Cadence::EveryTick
    }

    fn busy_wait_budget(&self) -> Duration {
        pattern_duration(ACK_BEEPS, self.beep_on, self.beep_gap)
    }

    fn run(&mut self, ctx: &TaskContext<'_>) -> Result<(), TaskError> {
        let Some(uid) = self.reader.read()? else {
            return Ok(());
        };

        beep_pattern(&mut self.buzzer, ctx.clock, ACK_BEEPS, self.beep_on, self.beep_gap);
        info!(uid = %uid, "[RFID] card detected");
        ctx.log(&Record::card(&uid, ctx.now()));
        self.reader.halt();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, SimClock};
    use crate::feedback::SilentBuzzer;
    use crate::sensor::{CardUid, ScriptedSensor};
    use crate::sink::SharedSink;

    #[test]
    fn no_card_means_no_beep_and_no_record() {
        let clock = SimClock::new();
        let sink = SharedSink::unavailable();
        let ctx = TaskContext::new(&clock, &sink);
        let mut task = CardTask::new(
            ScriptedSensor::from_readings("MFRC522", [None::<CardUid>]),
            SilentBuzzer,
            Duration::from_millis(250),
            Duration::from_millis(50),
        );

        task.run(&ctx).unwrap();
        assert_eq!(clock.now().as_millis(), 0);
    }

    #[test]
    fn card_is_logged_after_double_beep() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let sink = SharedSink::open(&path).unwrap();
        let clock = SimClock::starting_at(crate::clock::Timestamp::from_millis(1_000));
        let ctx = TaskContext::new(&clock, &sink);

        let mut task = CardTask::new(
            ScriptedSensor::from_readings("MFRC522", [Some(CardUid::new([0x9c, 0x01, 0xab, 0x3f]))]),
            SilentBuzzer,
            Duration::from_millis(250),
            Duration::from_millis(50),
        );
        assert_eq!(task.busy_wait_budget(), Duration::from_millis(550));

        task.run(&ctx).unwrap();
        drop(sink);

        assert_eq!(clock.now().as_millis(), 1_550);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("[RFID],Cartao lido: 9C01AB3F,1550\n"), "{text}");
    }
}
