use super::{Pattern, cycle_delay, pixel_or_max};
use crate::buffer::{PixelBuffer, PixelRange};
use crate::color::PixelValue;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KitConfig<P> {
    pub pixel: Option<P>,
    pub fade: f32,
    pub freq: u32,
    /// Frames per sweep in one direction.
    pub cycle_length: u32,
}

impl<P> Default for KitConfig<P> {
    fn default() -> Self {
        Self {
            pixel: None,
            fade: 0.9,
            freq: 60,
            cycle_length: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sweep {
    Forward,
    Backward,
}

/// A light bouncing end to end, leaving a fading trail.
///
/// Every frame lights all cells between the previous and the new position so
/// fast sweeps over long strips leave no gaps.
#[derive(Debug, Clone)]
pub struct Kit<P> {
    config: KitConfig<P>,
    sweep: Sweep,
    cycle: u32,
    old_pos: usize,
}

impl<P> Kit<P> {
    pub fn new(config: KitConfig<P>) -> Self {
        Self {
            config,
            sweep: Sweep::Forward,
            cycle: 0,
            old_pos: 0,
        }
    }
}

impl<P: PixelValue> Pattern<P> for Kit<P> {
    fn next_frame<B>(&mut self, buffer: &mut B) -> Option<u32>
    where
        B: PixelBuffer<Pixel = P> + ?Sized,
    {
        let cycle_length = self.config.cycle_length.max(1);
        let last = buffer.len().saturating_sub(1);
        let travelled = last * self.cycle as usize / (cycle_length as usize - 1).max(1);
        let pixel = pixel_or_max(self.config.pixel, buffer);

        buffer.fade(self.config.fade);
        let new_pos = match self.sweep {
            Sweep::Forward => {
                let new_pos = travelled.min(last);
                buffer.fill_range(pixel, PixelRange::new(self.old_pos, new_pos + 1));
                new_pos
            }
            Sweep::Backward => {
                let new_pos = last.saturating_sub(travelled);
                buffer.fill_range(pixel, PixelRange::new(new_pos, self.old_pos + 1));
                new_pos
            }
        };
        self.old_pos = new_pos;

        self.cycle += 1;
        if self.cycle >= cycle_length {
            self.cycle = 0;
            (self.sweep, self.old_pos) = match self.sweep {
                Sweep::Forward => (Sweep::Backward, last),
                Sweep::Backward => (Sweep::Forward, 0),
            };
        }
        Some(cycle_delay(self.config.freq))
    }

    fn reset(&mut self) {
        self.sweep = Sweep::Forward;
        self.cycle = 0;
        self.old_pos = 0;
    }
}
