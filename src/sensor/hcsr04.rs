use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::error::{PinWriteSnafu, TaskError};
use crate::scheduler::{Task, Tick};

/// Length of the trigger pulse.
pub const TRIGGER_PULSE_US: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HcSr04Config {
    /// Pause between pings, long enough for echoes to die out.
    pub period_ms: u32,
}

impl Default for HcSr04Config {
    fn default() -> Self {
        Self { period_ms: 50 }
    }
}

/// Pings an HC-SR04 ultrasonic sensor periodically.
///
/// The echo line goes to a high-measuring
/// [`SignalTimer`](super::SignalTimer); pair it with
/// [`PulseReader::ranging`](super::PulseReader::ranging) to receive
/// distances.
pub struct HcSr04<O, D> {
    trigger: O,
    delay: D,
    config: HcSr04Config,
    pings: u32,
}

impl<O: OutputPin, D: DelayNs> HcSr04<O, D> {
    pub fn new(trigger: O, delay: D, config: HcSr04Config) -> Self {
        Self {
            trigger,
            delay,
            config,
            pings: 0,
        }
    }

    pub fn pings(&self) -> u32 {
        self.pings
    }

    pub fn trigger(&self) -> &O {
        &self.trigger
    }

    fn ping(&mut self) -> Result<(), TaskError> {
        let failed = |_| PinWriteSnafu { index: 0usize }.build();
        self.trigger.set_high().map_err(failed)?;
        self.delay.delay_us(TRIGGER_PULSE_US);
        self.trigger.set_low().map_err(failed)
    }
}

impl<O: OutputPin, D: DelayNs> Task for HcSr04<O, D> {
    fn resume(&mut self) -> Result<Tick, TaskError> {
        self.ping()?;
        self.pings = self.pings.wrapping_add(1);
        Ok(Tick::Delay(self.config.period_ms))
    }
}
