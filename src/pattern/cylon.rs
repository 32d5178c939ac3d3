use super::{Pattern, cycle_delay, pixel_or_max};
use crate::buffer::PixelBuffer;
use crate::color::PixelValue;
use crate::math8::{FADE_DENOMINATOR, permille};

/// Pixels of halo merged on each side of the eye.
const HALO_WIDTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylonConfig<P> {
    pub pixel: Option<P>,
    pub fade: f32,
    pub freq: u32,
}

impl<P> Default for CylonConfig<P> {
    fn default() -> Self {
        Self {
            pixel: None,
            fade: 0.85,
            freq: 60,
        }
    }
}

/// A scanning eye with a soft halo; one full back-and-forth every 2 seconds.
#[derive(Debug, Clone)]
pub struct Cylon<P> {
    config: CylonConfig<P>,
    cycle: u32,
}

impl<P> Cylon<P> {
    pub fn new(config: CylonConfig<P>) -> Self {
        Self { config, cycle: 0 }
    }
}

impl<P: PixelValue> Pattern<P> for Cylon<P> {
    fn next_frame<B>(&mut self, buffer: &mut B) -> Option<u32>
    where
        B: PixelBuffer<Pixel = P> + ?Sized,
    {
        let len = buffer.len();
        let frames = 2 * self.config.freq.max(1);
        let pixel = pixel_or_max(self.config.pixel, buffer);

        buffer.fade(self.config.fade);
        let mut pos = (len * 2).saturating_sub(2) * self.cycle as usize / frames as usize;
        if pos >= len {
            // fold back on the return leg
            pos = len.saturating_sub(2).saturating_sub(pos - len);
        }
        buffer.set(pos, pixel);

        let step = permille(self.config.fade);
        let mut intensity = pixel;
        for offset in 1..=HALO_WIDTH {
            intensity = intensity.scale_nd(step, FADE_DENOMINATOR);
            if pos + offset < len {
                buffer.pixel_merge(pos + offset, intensity);
            }
            if let Some(before) = pos.checked_sub(offset) {
                buffer.pixel_merge(before, intensity);
            }
        }

        self.cycle = (self.cycle + 1) % frames;
        Some(cycle_delay(self.config.freq))
    }

    fn reset(&mut self) {
        self.cycle = 0;
    }
}
