use heapless::Vec;

use super::PixelBuffer;
use crate::color::PixelValue;
use crate::error::{BufferError, CapacitySnafu};

/// Maximum value of a binary pixel.
pub const BIT_MAX: u8 = 1;

/// Maximum value of a PWM duty pixel.
pub const DUTY_MAX: u16 = u16::MAX;

/// One scalar value per pixel, clamped to a fixed maximum.
#[derive(Debug, Clone)]
pub struct PlainBuffer<T: PixelValue, const N: usize> {
    pixels: Vec<T, N>,
    max: T,
}

/// On/off values for plain digital pins.
pub type BitBuffer<const N: usize> = PlainBuffer<u8, N>;

/// Linear 16-bit duty cycles.
pub type PwmBuffer<const N: usize> = PlainBuffer<u16, N>;

impl<T: PixelValue, const N: usize> PlainBuffer<T, N> {
    /// Create a dark buffer of `len` pixels.
    pub fn new(len: usize, max: T) -> Result<Self, BufferError> {
        let mut pixels = Vec::new();
        if pixels.resize(len, T::OFF).is_err() {
            return CapacitySnafu {
                requested: len,
                capacity: N,
            }
            .fail();
        }
        Ok(Self { pixels, max })
    }

    pub fn as_slice(&self) -> &[T] {
        &self.pixels
    }
}

impl<const N: usize> PlainBuffer<u8, N> {
    /// Binary buffer, values 0 or 1.
    pub fn binary(len: usize) -> Result<Self, BufferError> {
        Self::new(len, BIT_MAX)
    }
}

impl<const N: usize> PlainBuffer<u16, N> {
    /// Duty cycle buffer, values 0 to 65535.
    pub fn duty(len: usize) -> Result<Self, BufferError> {
        Self::new(len, DUTY_MAX)
    }
}

impl<T: PixelValue, const N: usize> PixelBuffer for PlainBuffer<T, N> {
    type Pixel = T;

    fn len(&self) -> usize {
        self.pixels.len()
    }

    fn channel_max(&self) -> T {
        self.max
    }

    fn get(&self, index: usize) -> T {
        self.pixels
            .get(index)
            .or_else(|| self.pixels.last())
            .copied()
            .unwrap_or(T::OFF)
    }

    fn set(&mut self, index: usize, value: T) {
        let max = self.max;
        if let Some(pixel) = self.pixels.get_mut(index) {
            *pixel = value.clamp_to(max);
        }
    }

    fn rotate_left(&mut self, k: usize) {
        let len = self.pixels.len();
        if len > 0 {
            self.pixels.rotate_left(k % len);
        }
    }

    fn rotate_right(&mut self, k: usize) {
        let len = self.pixels.len();
        if len > 0 {
            self.pixels.rotate_right(k % len);
        }
    }
}
