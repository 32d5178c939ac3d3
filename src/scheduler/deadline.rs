use embassy_time::{Duration, Instant};

/// Absolute frame deadline of one task.
///
/// Each delay is added to the previous deadline rather than to the current
/// time, so time spent rendering and transmitting does not accumulate as
/// drift. A deadline already in the past yields a zero sleep and the task
/// catches up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub const fn new(start: Instant) -> Self {
        Self { at: start }
    }

    /// Restart the timing baseline at `now`.
    pub fn reset(&mut self, now: Instant) {
        self.at = now;
    }

    /// Move the deadline `ms` milliseconds past the previous one.
    pub fn advance(&mut self, ms: u32) -> Instant {
        self.at += Duration::from_millis(u64::from(ms));
        self.at
    }

    pub fn at(&self) -> Instant {
        self.at
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.at <= now
    }

    /// How long to wait until the deadline (zero if already behind).
    pub fn sleep_duration(&self, now: Instant) -> Duration {
        self.at.saturating_duration_since(now)
    }
}
