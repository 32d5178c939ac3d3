//! Liveness tasks.
//!
//! A heartbeat LED shows the scheduler is running; the watchdog feeder
//! resets the chip when it is not.

use embedded_hal::digital::OutputPin;

use crate::driver::PinDriver;
use crate::error::{DriverError, TaskError};
use crate::hw::Watchdog;
use crate::pattern::Blink;
use crate::scheduler::{Task, Tick};

/// Blink `pin` 200 ms on, 800 ms off.
pub fn heartbeat<O: OutputPin>(pin: O) -> Result<PinDriver<O, Blink<u8>, 1>, DriverError> {
    PinDriver::new([pin], Blink::default())
}

/// Feeds a watchdog at half its timeout.
///
/// When a task hogs the CPU for longer than the timeout the feed is missed
/// and the watchdog resets the chip.
pub struct WatchdogFeeder<W> {
    watchdog: W,
    interval_ms: u32,
}

impl<W: Watchdog> WatchdogFeeder<W> {
    /// Arm `watchdog` with `timeout_ms`, 2000 ms being a sensible default.
    pub fn new(mut watchdog: W, timeout_ms: u32) -> Self {
        watchdog.start(timeout_ms);
        log::info!("watchdog armed with {} ms timeout", timeout_ms);
        Self {
            watchdog,
            interval_ms: (timeout_ms / 2).max(1),
        }
    }

    pub fn watchdog(&self) -> &W {
        &self.watchdog
    }
}

impl<W: Watchdog> Task for WatchdogFeeder<W> {
    fn resume(&mut self) -> Result<Tick, TaskError> {
        self.watchdog.feed();
        Ok(Tick::Delay(self.interval_ms))
    }
}
