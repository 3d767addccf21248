/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Push button cycling the RGB status LED.  Does not log to the sink.

use std::time::Duration;

use tracing::info;

use crate::feedback::{LedColor, RgbLed};
use crate::sensor::PushButton;
use crate::task::{Cadence, Task, TaskContext, TaskError};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

pub struct ButtonTask<P, L> {
    button: P,
    led: L,
    color: LedColor,
    debounce: Duration,
}

impl<P, L> ButtonTask<P, L>
where
    P: PushButton,
    L: RgbLed,
{
    /// Drives the LED to its initial colour (white) immediately.
    pub fn new(button: P, mut led: L, debounce: Duration) -> Self {
        let color = LedColor::default();
        led.set_color(color);
        Self {
            button,
            led,
            color,
            debounce,
        }
    }

    pub fn color(&self) -> LedColor {
        self.color
    }
}

impl<P, L> Task for ButtonTask<P, L>
where
    P: PushButton,
    L: RgbLed,
{
    fn name(&self) -> &str {
        "BUTTON"
    }

    fn cadence(&self) -> Cadence {
        Cadence::EveryTick
    }

    fn busy_wait_budget(&self) -> Duration {
        self.debounce
    }

    fn run(&mut self, ctx: &TaskContext<'_>) -> Result<(), TaskError> {
        if !self.button.is_pressed() {
            return Ok(());
        }

        self.color = self.color.next();
        self.led.set_color(self.color);
        info!(color = %self.color, "[BUTTON] LED colour changed");
        ctx.delay(self.debounce);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, SimClock};
    use crate::sensor::ScriptedSensor;
    use crate::sink::SharedSink;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct RecordingLed(Rc<RefCell<Vec<LedColor>>>);

    impl RgbLed for RecordingLed {
        fn set_color(&mut self, color: LedColor) {
            self.0.borrow_mut().push(color);
        }
    }

    #[test]
    fn presses_cycle_colours_and_debounce() {
        let clock = SimClock::new();
        let sink = SharedSink::unavailable();
        let ctx = TaskContext::new(&clock, &sink);
        let led = RecordingLed::default();

        let mut task = ButtonTask::new(
            ScriptedSensor::from_readings("BUTTON", [true, false, true]),
            led.clone(),
            DEFAULT_DEBOUNCE,
        );
        for _ in 0..3 {
            task.run(&ctx).unwrap();
        }

        assert_eq!(task.color(), LedColor::Blue);
        assert_eq!(
            *led.0.borrow(),
            vec![LedColor::White, LedColor::Red, LedColor::Blue]
        );
        assert_eq!(clock.now().as_millis(), 400, "two presses × 200 ms debounce");
    }
}
