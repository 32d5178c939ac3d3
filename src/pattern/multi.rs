//! Independently timed patterns over adjacent segments of one buffer.

use heapless::Vec;

use super::{Pattern, PatternSlot};
use crate::buffer::{PixelBuffer, SegmentView};
use crate::color::PixelValue;
use crate::error::{BufferError, CapacitySnafu};

#[derive(Debug, Clone)]
struct Segment<P: PixelValue> {
    start: usize,
    end: usize,
    pattern: PatternSlot<P>,
    /// Logical time the sub-pattern wants its next frame.
    due: u64,
    finished: bool,
}

/// Runs one sub-pattern per contiguous segment, each on its own schedule.
///
/// The composite keeps a logical clock. Every outer frame resumes only the
/// sub-patterns that are due, then yields the time until the earliest next
/// due frame, so the outer schedule is the union of all inner schedules.
/// Segment views are rebuilt from stored offsets on every frame.
#[derive(Debug, Clone)]
pub struct MultiPattern<P: PixelValue, const S: usize> {
    segments: Vec<Segment<P>, S>,
    now: u64,
}

impl<P: PixelValue, const S: usize> MultiPattern<P, S> {
    /// Lay out `(size, pattern)` pairs back to back from pixel 0.
    ///
    /// Segments of size 0 are widened to one pixel.
    pub fn new(parts: impl IntoIterator<Item = (usize, PatternSlot<P>)>) -> Result<Self, BufferError> {
        let mut segments = Vec::new();
        let mut start = 0;
        for (size, pattern) in parts {
            let end = start + size.max(1) - 1;
            let segment = Segment {
                start,
                end,
                pattern,
                due: 0,
                finished: false,
            };
            if segments.push(segment).is_err() {
                return CapacitySnafu {
                    requested: S + 1,
                    capacity: S,
                }
                .fail();
            }
            start = end + 1;
        }
        Ok(Self { segments, now: 0 })
    }

    /// Logical time in milliseconds since the first frame.
    pub fn elapsed_ms(&self) -> u64 {
        self.now
    }
}

impl<P: PixelValue, const S: usize> Pattern<P> for MultiPattern<P, S> {
    #[allow(clippy::cast_possible_truncation)]
    fn next_frame<B>(&mut self, buffer: &mut B) -> Option<u32>
    where
        B: PixelBuffer<Pixel = P> + ?Sized,
    {
        let now = self.now;
        let mut next: Option<u64> = None;
        for segment in self.segments.iter_mut().filter(|segment| !segment.finished) {
            if segment.due <= now {
                let mut view = SegmentView::new(&mut *buffer, segment.start, segment.end);
                match segment.pattern.next_frame(&mut view) {
                    Some(delay) => segment.due += u64::from(delay),
                    None => {
                        segment.finished = true;
                        continue;
                    }
                }
            }
            let remaining = segment.due - now;
            next = Some(next.map_or(remaining, |current| current.min(remaining)));
        }

        let delay = next?;
        self.now += delay;
        Some(delay.min(u64::from(u32::MAX)) as u32)
    }

    fn reset(&mut self) {
        self.now = 0;
        for segment in &mut self.segments {
            segment.pattern.reset();
            segment.due = 0;
            segment.finished = false;
        }
    }
}
