//! Hardware seams.
//!
//! Everything the drivers need from the chip is expressed as a trait here or
//! in `embedded-hal`, so the engine runs unchanged against host mocks.

pub mod dma;
pub mod pio;
mod pool;

use embedded_hal::pwm::SetDutyCycle;
pub use pool::{DmaClaim, ResourceUsage, ResourcePool, StateMachineClaim};

/// A PWM channel whose base frequency can be configured.
pub trait PwmOutput: SetDutyCycle {
    fn set_frequency(&mut self, hz: u32) -> Result<(), Self::Error>;
}

/// Watchdog that resets the chip unless it is fed in time.
pub trait Watchdog {
    /// Arm with `timeout_ms`; the chip resets if no feed follows in time.
    fn start(&mut self, timeout_ms: u32);

    fn feed(&mut self);
}
