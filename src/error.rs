//! Error types.
//!
//! Configuration problems surface synchronously from constructors
//! ([`BufferError`], [`DriverError`]); failures while a task is running
//! surface as [`TaskError`] and are routed by the scheduler.

use snafu::prelude::*;

/// Errors of the pixel buffer constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum BufferError {
    /// The requested pixel count does not fit the buffer's fixed capacity.
    #[snafu(display("buffer of {requested} pixels exceeds capacity {capacity}"))]
    Capacity { requested: usize, capacity: usize },
    /// Packed buffers only know 3 and 4 channels per pixel.
    #[snafu(display("channel count must be 3 or 4, got {bpp}"))]
    InvalidChannelCount { bpp: u8 },
}

/// Errors of the driver constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DriverError {
    /// The pixel buffer could not be constructed.
    #[snafu(context(false), display("buffer setup failed: {source}"))]
    Buffer { source: BufferError },
    /// The transport cannot emit this channel count.
    #[snafu(display("{driver} driver does not support {bpp} channels per pixel"))]
    UnsupportedChannelCount { driver: &'static str, bpp: u8 },
    /// Every DMA channel of the pool is claimed.
    #[snafu(display("no free DMA channel"))]
    NoDmaChannel,
    /// Every state machine of the pool is claimed.
    #[snafu(display("no free state machine"))]
    NoStateMachine,
    /// The requested state machine is already claimed by another driver.
    #[snafu(display("state machine {index} is already claimed"))]
    StateMachineTaken { index: u8 },
    /// The hardware refused the initial configuration.
    #[snafu(display("hardware setup failed for output {index}"))]
    Setup { index: usize },
}

/// Errors raised by a running task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TaskError {
    /// Writing a digital output failed.
    #[snafu(display("failed to drive output pin {index}"))]
    PinWrite { index: usize },
    /// Reading a digital input failed.
    #[snafu(display("failed to read input pin"))]
    PinRead,
    /// Updating a PWM duty cycle failed.
    #[snafu(display("failed to set duty cycle on PWM channel {index}"))]
    PwmWrite { index: usize },
    /// The serial bitstream could not be emitted.
    #[snafu(display("bitstream transmission failed"))]
    Transmission,
    /// Application-defined failure.
    #[snafu(display("{message}"))]
    Failed { message: &'static str },
}

/// Errors of the scheduler registration API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SchedulerError {
    /// The task table is full.
    #[snafu(display("task table is full ({capacity} tasks)"))]
    TooManyTasks { capacity: usize },
}
