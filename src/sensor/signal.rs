use core::cell::Cell;

use critical_section::Mutex;
use embassy_time::{Duration, Instant};

use crate::error::TaskError;
use crate::event::Event;
use crate::scheduler::{Task, Tick};

/// Centimetres of HC-SR04 range per microsecond of echo, sound at 340 m/s
/// travelling there and back.
pub const ECHO_CM_PER_MICROSECOND: f32 = 340.0 / 20_000.0;

#[derive(Debug, Clone, Copy, Default)]
struct Edges {
    start: Option<Instant>,
    stop: Option<Instant>,
}

/// Times how long an input stays at one level.
///
/// The pin's interrupt on both edges calls [`SignalTimer::on_edge`]. The
/// edge ending a pulse signals the timer's [`Event`], which a
/// [`PulseReader`] task awaits.
pub struct SignalTimer {
    measure_high: bool,
    edges: Mutex<Cell<Edges>>,
    event: Event,
}

impl SignalTimer {
    /// Time high pulses when `measure_high`, low pulses otherwise.
    pub const fn new(measure_high: bool) -> Self {
        Self {
            measure_high,
            edges: Mutex::new(Cell::new(Edges {
                start: None,
                stop: None,
            })),
            event: Event::new(),
        }
    }

    /// Record an edge; `level` is the pin level after it.
    pub fn on_edge(&self, level: bool, at: Instant) {
        let ended = critical_section::with(|cs| {
            let cell = self.edges.borrow(cs);
            let mut edges = cell.get();
            let ended = level != self.measure_high;
            if ended {
                edges.stop = Some(at);
            } else {
                edges.start = Some(at);
            }
            cell.set(edges);
            ended
        });
        if ended {
            self.event.signal(at);
        }
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    /// Width of the last complete pulse, `None` while one is still open.
    pub fn measurement(&self) -> Option<Duration> {
        let edges = critical_section::with(|cs| self.edges.borrow(cs).get());
        match (edges.start, edges.stop) {
            (Some(start), Some(stop)) if start < stop => Some(stop - start),
            _ => None,
        }
    }
}

/// Receives one measurement.
pub type MeasurementCallback = fn(f32);

/// Hands every completed pulse of a [`SignalTimer`] to a callback from
/// scheduler context.
pub struct PulseReader {
    timer: &'static SignalTimer,
    callback: MeasurementCallback,
    /// Reported units per microsecond.
    scale: f32,
    armed: bool,
}

impl PulseReader {
    /// Report pulse widths in microseconds.
    pub fn new(timer: &'static SignalTimer, callback: MeasurementCallback) -> Self {
        Self::scaled(timer, callback, 1.0)
    }

    /// Report HC-SR04 echoes as distances in centimetres.
    pub fn ranging(timer: &'static SignalTimer, callback: MeasurementCallback) -> Self {
        Self::scaled(timer, callback, ECHO_CM_PER_MICROSECOND)
    }

    pub fn scaled(timer: &'static SignalTimer, callback: MeasurementCallback, scale: f32) -> Self {
        Self {
            timer,
            callback,
            scale,
            armed: false,
        }
    }
}

impl Task for PulseReader {
    #[allow(clippy::cast_precision_loss)]
    fn resume(&mut self) -> Result<Tick, TaskError> {
        let event = self.timer.event();
        if self.armed {
            event.take();
            if let Some(width) = self.timer.measurement() {
                (self.callback)(width.as_micros() as f32 * self.scale);
            }
        }
        self.armed = true;
        Ok(Tick::Await(event))
    }
}
