//! Button and rotary encoder input.
//!
//! Interrupt handlers only touch an [`Event`](crate::event::Event); the
//! [`Debouncer`] task confirms pin changes and hands coalesced event bits to
//! a callback from scheduler context. Several bits can arrive in one
//! callback, including both rotation directions.

mod button;
mod rotary;

pub use button::{Debouncer, DebouncerConfig, EventCallback};
pub use rotary::RotaryDecoder;

/// Button confirmed pressed.
pub const PRESS: u8 = 1;
/// Button confirmed released.
pub const RELEASE: u8 = 2;
pub const COUNTER_CLOCKWISE: u8 = 4;
pub const CLOCKWISE: u8 = 8;
