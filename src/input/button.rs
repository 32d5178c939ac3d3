use embedded_hal::digital::InputPin;

use super::{PRESS, RELEASE};
use crate::error::{PinReadSnafu, TaskError};
use crate::event::Event;
use crate::scheduler::{Task, Tick};

/// Receives the coalesced event bits.
pub type EventCallback = fn(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebouncerConfig {
    /// Identical readings needed to confirm a new state.
    pub consecutive: u8,
    pub interval_ms: u32,
}

impl Default for DebouncerConfig {
    fn default() -> Self {
        Self {
            consecutive: 4,
            interval_ms: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// First resume: read the resting level.
    Start,
    Idle,
    Sampling { target: bool, matches: u8 },
}

/// Debounces an active-low button.
///
/// The pin's edge interrupt should call [`Event::signal`]; other interrupt
/// sources (such as a [`RotaryDecoder`](super::RotaryDecoder)) may raise
/// bits on the same event to have them delivered through the same callback.
pub struct Debouncer<P> {
    pin: P,
    event: &'static Event,
    callback: EventCallback,
    config: DebouncerConfig,
    phase: Phase,
    /// Confirmed level, `true` is released.
    level: bool,
    events: u8,
}

impl<P: InputPin> Debouncer<P> {
    pub fn new(pin: P, event: &'static Event, callback: EventCallback, config: DebouncerConfig) -> Self {
        Self {
            pin,
            event,
            callback,
            config,
            phase: Phase::Start,
            level: true,
            events: 0,
        }
    }

    /// Confirmed state of the button.
    pub fn is_pressed(&self) -> bool {
        !self.level
    }

    fn read(&mut self) -> Result<bool, TaskError> {
        self.pin.is_high().map_err(|_| PinReadSnafu.build())
    }

    fn deliver(&mut self) -> Tick {
        if self.events != 0 {
            (self.callback)(self.events);
            self.events = 0;
        }
        self.phase = Phase::Idle;
        Tick::Await(self.event)
    }
}

impl<P: InputPin> Task for Debouncer<P> {
    fn resume(&mut self) -> Result<Tick, TaskError> {
        match self.phase {
            Phase::Start => {
                self.level = self.read()?;
                self.phase = Phase::Idle;
                Ok(Tick::Await(self.event))
            }
            Phase::Idle => {
                let pending = self.event.take();
                self.events |= pending.bits;
                if pending.at.is_some() {
                    self.phase = Phase::Sampling {
                        target: !self.level,
                        matches: 0,
                    };
                    return Ok(Tick::Delay(self.config.interval_ms));
                }
                Ok(self.deliver())
            }
            Phase::Sampling { target, matches } => {
                let level = self.read()?;
                let (target, matches) = if level == target {
                    (target, matches.saturating_add(1))
                } else {
                    (!target, 0)
                };
                if matches < self.config.consecutive {
                    self.phase = Phase::Sampling { target, matches };
                    return Ok(Tick::Delay(self.config.interval_ms));
                }

                if target != self.level {
                    self.level = target;
                    self.events |= if target { RELEASE } else { PRESS };
                }
                // edges seen while sampling are covered by this reading
                self.events |= self.event.take().bits;
                Ok(self.deliver())
            }
        }
    }
}
