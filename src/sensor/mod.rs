//! Pulse timing sensors.
//!
//! Edge interrupts feed a [`SignalTimer`]; a [`PulseReader`] task turns
//! completed pulses into measurements. [`HcSr04`] adds the trigger side of
//! an ultrasonic range finder.

mod hcsr04;
mod signal;

pub use hcsr04::{HcSr04, HcSr04Config, TRIGGER_PULSE_US};
pub use signal::{ECHO_CM_PER_MICROSECOND, MeasurementCallback, PulseReader, SignalTimer};
