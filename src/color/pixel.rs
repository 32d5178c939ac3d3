use super::{Rgbw, channels, from_channels};
use crate::math8::{merge8, merge16, scale8_nd, scale16_nd};

/// A value stored per pixel in a [`PixelBuffer`](crate::buffer::PixelBuffer).
///
/// All arithmetic is channel-wise integer math so every buffer variant fades
/// and merges identically.
pub trait PixelValue: Copy + PartialEq + core::fmt::Debug {
    /// The value of a dark pixel.
    const OFF: Self;

    /// Multiply every channel by `numerator / denominator`, rounding toward zero.
    fn scale_nd(self, numerator: u32, denominator: u32) -> Self;

    /// Channel-wise `min(max, self + other)`.
    fn saturating_merge(self, other: Self, max: Self) -> Self;

    /// Channel-wise `min(max, self)`.
    fn clamp_to(self, max: Self) -> Self;
}

impl PixelValue for u8 {
    const OFF: Self = 0;

    fn scale_nd(self, numerator: u32, denominator: u32) -> Self {
        scale8_nd(self, numerator, denominator)
    }

    fn saturating_merge(self, other: Self, max: Self) -> Self {
        merge8(self, other, max)
    }

    fn clamp_to(self, max: Self) -> Self {
        self.min(max)
    }
}

impl PixelValue for u16 {
    const OFF: Self = 0;

    fn scale_nd(self, numerator: u32, denominator: u32) -> Self {
        scale16_nd(self, numerator, denominator)
    }

    fn saturating_merge(self, other: Self, max: Self) -> Self {
        merge16(self, other, max)
    }

    fn clamp_to(self, max: Self) -> Self {
        self.min(max)
    }
}

impl PixelValue for Rgbw {
    const OFF: Self = super::OFF;

    fn scale_nd(self, numerator: u32, denominator: u32) -> Self {
        from_channels(channels(self).map(|c| scale8_nd(c, numerator, denominator)))
    }

    fn saturating_merge(self, other: Self, max: Self) -> Self {
        let (a, b, m) = (channels(self), channels(other), channels(max));
        from_channels([
            merge8(a[0], b[0], m[0]),
            merge8(a[1], b[1], m[1]),
            merge8(a[2], b[2], m[2]),
            merge8(a[3], b[3], m[3]),
        ])
    }

    fn clamp_to(self, max: Self) -> Self {
        let (a, m) = (channels(self), channels(max));
        from_channels([a[0].min(m[0]), a[1].min(m[1]), a[2].min(m[2]), a[3].min(m[3])])
    }
}
