//! Software timed single-wire transmission.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::buffer::{ChannelCount, PackedBuffer};
use crate::color::Rgbw;
use crate::error::{DriverError, TaskError, TransmissionSnafu, UnsupportedChannelCountSnafu};
use crate::pattern::Pattern;
use crate::scheduler::{Task, Tick};

/// High and low times in nanoseconds of a zero and a one bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitTiming {
    pub high_0: u32,
    pub low_0: u32,
    pub high_1: u32,
    pub low_1: u32,
}

impl BitTiming {
    pub const KHZ_800: Self = Self::new(400, 850, 800, 450);
    pub const KHZ_400: Self = Self::new(800, 1700, 1600, 900);

    pub const fn new(high_0: u32, low_0: u32, high_1: u32, low_1: u32) -> Self {
        Self {
            high_0,
            low_0,
            high_1,
            low_1,
        }
    }

    /// `(high, low)` times of one bit.
    pub const fn for_bit(self, one: bool) -> (u32, u32) {
        if one {
            (self.high_1, self.low_1)
        } else {
            (self.high_0, self.low_0)
        }
    }
}

impl Default for BitTiming {
    fn default() -> Self {
        Self::KHZ_800
    }
}

/// Bit-bangs the strip protocol, MSB first, with interrupts masked.
///
/// Accepts 4-channel strips only.
pub struct BitstreamDriver<O, D, T, const N: usize> {
    pin: O,
    delay: D,
    timing: BitTiming,
    pattern: T,
    buffer: PackedBuffer<N>,
}

impl<O: OutputPin, D: DelayNs, T: Pattern<Rgbw>, const N: usize> BitstreamDriver<O, D, T, N> {
    pub fn new(pin: O, delay: D, pattern: T, n: usize, bpp: u8, timing: BitTiming) -> Result<Self, DriverError> {
        if ChannelCount::from_bpp(bpp)? == ChannelCount::Three {
            return UnsupportedChannelCountSnafu {
                driver: "bitstream",
                bpp,
            }
            .fail();
        }
        let buffer = PackedBuffer::direct(n, bpp)?;
        log::info!("bitstream driver: {} pixels", n);
        Ok(Self {
            pin,
            delay,
            timing,
            pattern,
            buffer,
        })
    }

    pub fn buffer(&self) -> &PackedBuffer<N> {
        &self.buffer
    }

    pub fn pin(&self) -> &O {
        &self.pin
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }

    fn emit(&mut self) -> Result<(), TaskError> {
        let timing = self.timing;
        let (pin, delay, buffer) = (&mut self.pin, &mut self.delay, &self.buffer);
        critical_section::with(|_| {
            for byte in buffer.wire_bytes() {
                for bit in (0..8).rev() {
                    let (high, low) = timing.for_bit((byte >> bit) & 1 == 1);
                    pin.set_high().map_err(|_| TransmissionSnafu.build())?;
                    delay.delay_ns(high);
                    pin.set_low().map_err(|_| TransmissionSnafu.build())?;
                    delay.delay_ns(low);
                }
            }
            Ok(())
        })
    }
}

impl<O: OutputPin, D: DelayNs, T: Pattern<Rgbw>, const N: usize> Task for BitstreamDriver<O, D, T, N> {
    fn resume(&mut self) -> Result<Tick, TaskError> {
        let Some(delay) = self.pattern.next_frame(&mut self.buffer) else {
            return Ok(Tick::Done);
        };
        self.emit()?;
        Ok(Tick::Delay(delay))
    }
}
