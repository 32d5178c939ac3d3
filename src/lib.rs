#![no_std]

pub mod buffer;
pub mod color;
pub mod driver;
pub mod error;
pub mod event;
pub mod health;
pub mod hw;
pub mod input;
pub mod math8;
pub mod motor;
pub mod pattern;
pub mod rng;
pub mod scheduler;
pub mod sensor;

pub use buffer::{BitBuffer, PackedBuffer, PixelBuffer, PixelRange, PwmBuffer, SegmentView};
pub use color::{Rgb, Rgbw, rgb, rgbw};
pub use driver::{BitTiming, BitstreamDriver, DmaDriver, LedDriverConfig, PinDriver, PioDriver, PwmConfig, PwmDriver};
pub use embassy_time::{Duration, Instant};
pub use error::{BufferError, DriverError, SchedulerError, TaskError};
pub use event::Event;
pub use hw::{ResourcePool, Watchdog};
pub use pattern::{Pattern, PatternId, PatternSlot};
pub use scheduler::{Clock, Scheduler, SchedulerConfig, Task, Tick};
