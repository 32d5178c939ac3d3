//! Pixel buffers.
//!
//! A pixel buffer holds the values one driver pushes to its hardware. Every
//! variant shares the [`PixelBuffer`] contract so patterns are written once
//! and run on plain pins, PWM channels, addressable strips or a
//! [`SegmentView`] of any of them.

mod packed;
mod plain;
mod segment;

use core::ops::{Range, RangeFrom, RangeFull, RangeTo};

pub use packed::{ChannelCount, PackedBuffer, WireLayout};
pub use plain::{BIT_MAX, BitBuffer, DUTY_MAX, PlainBuffer, PwmBuffer};
pub use segment::SegmentView;

use crate::color::PixelValue;
use crate::math8::{FADE_DENOMINATOR, permille};

/// A strided index range, resolved against a buffer length like a slice.
///
/// Bounds beyond the buffer are clamped, a start past the end yields an
/// empty range and a step of 0 is treated as 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRange {
    pub start: usize,
    pub end: Option<usize>,
    pub step: usize,
}

impl PixelRange {
    /// The whole buffer.
    pub const FULL: Self = Self {
        start: 0,
        end: None,
        step: 1,
    };

    pub const fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: Some(end),
            step: 1,
        }
    }

    /// From `start` to the end of the buffer.
    pub const fn from_start(start: usize) -> Self {
        Self {
            start,
            end: None,
            step: 1,
        }
    }

    pub const fn with_step(self, step: usize) -> Self {
        Self { step, ..self }
    }

    /// Resolve to `(start, end, step)` with `start <= end <= len` and `step >= 1`.
    pub fn indices(self, len: usize) -> (usize, usize, usize) {
        let end = self.end.map_or(len, |end| end.min(len));
        let start = self.start.min(end);
        (start, end, self.step.max(1))
    }

    /// Iterate the indices this range covers in a buffer of `len` pixels.
    pub fn iter(self, len: usize) -> core::iter::StepBy<Range<usize>> {
        let (start, end, step) = self.indices(len);
        (start..end).step_by(step)
    }
}

impl From<Range<usize>> for PixelRange {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl From<RangeFrom<usize>> for PixelRange {
    fn from(range: RangeFrom<usize>) -> Self {
        Self::from_start(range.start)
    }
}

impl From<RangeTo<usize>> for PixelRange {
    fn from(range: RangeTo<usize>) -> Self {
        Self::new(0, range.end)
    }
}

impl From<RangeFull> for PixelRange {
    fn from(_: RangeFull) -> Self {
        Self::FULL
    }
}

/// Common contract of every pixel buffer.
///
/// Only `len`, `channel_max`, `get` and `set` are required; range operations
/// have per-pixel default implementations that variants override when their
/// storage allows a faster path.
pub trait PixelBuffer {
    type Pixel: PixelValue;

    /// Number of pixels; fixed after construction.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-channel ceiling applied to every write and merge.
    fn channel_max(&self) -> Self::Pixel;

    /// The "fully on" value patterns use when no color is configured.
    fn max_pixel(&self) -> Self::Pixel {
        self.channel_max()
    }

    /// Read a pixel.
    ///
    /// Indices past the end read the last pixel instead of failing; callers
    /// must not treat this as a bounds check.
    fn get(&self, index: usize) -> Self::Pixel;

    /// Write a pixel, clamped to [`channel_max`](Self::channel_max).
    /// Out-of-range writes are ignored.
    fn set(&mut self, index: usize, value: Self::Pixel);

    /// Slice assignment: write `value` to every index in `range`.
    fn fill_range(&mut self, value: Self::Pixel, range: PixelRange) {
        for index in range.iter(self.len()) {
            self.set(index, value);
        }
    }

    /// Multiply every channel in `range` by `numerator / denominator`.
    fn fade_nd_range(&mut self, numerator: u32, denominator: u32, range: PixelRange) {
        for index in range.iter(self.len()) {
            let faded = self.get(index).scale_nd(numerator, denominator);
            self.set(index, faded);
        }
    }

    /// Additive blend: `stored = min(channel_max, stored + value)` per channel.
    fn pixel_merge(&mut self, index: usize, value: Self::Pixel) {
        if index >= self.len() {
            return;
        }
        let merged = self.get(index).saturating_merge(value, self.channel_max());
        self.set(index, merged);
    }

    fn fill(&mut self, value: Self::Pixel) {
        self.fill_range(value, PixelRange::FULL);
    }

    /// Fade the whole buffer by `factor` (0.0-1.0); `fade(0.0)` clears it.
    fn fade(&mut self, factor: f32) {
        self.fade_range(factor, PixelRange::FULL);
    }

    /// Fade `range` by `factor`, computed as `value * floor(factor * 1000) / 1000`.
    fn fade_range(&mut self, factor: f32, range: PixelRange) {
        self.fade_nd_range(permille(factor), FADE_DENOMINATOR, range);
    }

    fn swap(&mut self, a: usize, b: usize) {
        let len = self.len();
        if a >= len || b >= len || a == b {
            return;
        }
        let (value_a, value_b) = (self.get(a), self.get(b));
        self.set(a, value_b);
        self.set(b, value_a);
    }

    /// Rotate contents `k` pixels toward index 0.
    fn rotate_left(&mut self, k: usize) {
        let len = self.len();
        if len < 2 || k % len == 0 {
            return;
        }
        let k = k % len;
        reverse(self, 0, k);
        reverse(self, k, len);
        reverse(self, 0, len);
    }

    /// Rotate contents `k` pixels away from index 0.
    fn rotate_right(&mut self, k: usize) {
        let len = self.len();
        if len < 2 {
            return;
        }
        self.rotate_left(len - k % len);
    }
}

fn reverse<B: PixelBuffer + ?Sized>(buffer: &mut B, start: usize, end: usize) {
    let (mut low, mut high) = (start, end);
    while low + 1 < high {
        high -= 1;
        buffer.swap(low, high);
        low += 1;
    }
}
