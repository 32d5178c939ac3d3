use super::{PixelBuffer, PixelRange};

/// A window onto pixels `start..=end` of a parent buffer.
///
/// Every operation is translated into the parent's coordinates and
/// delegated, so range operations keep the parent's fast paths and no
/// storage is copied. Reads past the end of the window clamp to the
/// window's last pixel rather than leaking into a neighbouring segment.
pub struct SegmentView<'a, B: PixelBuffer + ?Sized> {
    parent: &'a mut B,
    start: usize,
    len: usize,
}

impl<'a, B: PixelBuffer + ?Sized> SegmentView<'a, B> {
    /// Bounds are clamped to the parent and `end` is inclusive. A view of an
    /// empty parent is empty.
    pub fn new(parent: &'a mut B, start: usize, end: usize) -> Self {
        let Some(last) = parent.len().checked_sub(1) else {
            return Self {
                parent,
                start: 0,
                len: 0,
            };
        };
        let start = start.min(last);
        let end = end.min(last).max(start);
        Self {
            parent,
            start,
            len: 1 + end - start,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    /// Last pixel of the window in parent coordinates.
    pub fn end(&self) -> usize {
        self.start + self.len.saturating_sub(1)
    }

    fn reslice(&self, range: PixelRange) -> PixelRange {
        let (start, end, step) = range.indices(self.len());
        PixelRange {
            start: start + self.start,
            end: Some(end + self.start),
            step,
        }
    }
}

impl<B: PixelBuffer + ?Sized> PixelBuffer for SegmentView<'_, B> {
    type Pixel = B::Pixel;

    fn len(&self) -> usize {
        self.len
    }

    fn channel_max(&self) -> Self::Pixel {
        self.parent.channel_max()
    }

    fn max_pixel(&self) -> Self::Pixel {
        self.parent.max_pixel()
    }

    fn get(&self, index: usize) -> Self::Pixel {
        self.parent.get(self.start + index.min(self.len.saturating_sub(1)))
    }

    fn set(&mut self, index: usize, value: Self::Pixel) {
        if index < self.len() {
            self.parent.set(self.start + index, value);
        }
    }

    fn fill_range(&mut self, value: Self::Pixel, range: PixelRange) {
        let range = self.reslice(range);
        self.parent.fill_range(value, range);
    }

    fn fade_nd_range(&mut self, numerator: u32, denominator: u32, range: PixelRange) {
        let range = self.reslice(range);
        self.parent.fade_nd_range(numerator, denominator, range);
    }

    fn pixel_merge(&mut self, index: usize, value: Self::Pixel) {
        if index < self.len() {
            self.parent.pixel_merge(self.start + index, value);
        }
    }
}
