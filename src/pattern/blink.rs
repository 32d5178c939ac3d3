use super::{Pattern, pixel_or_max};
use crate::buffer::PixelBuffer;
use crate::color::PixelValue;

const DEFAULT_ON_TIME_MS: u32 = 200;
const DEFAULT_OFF_TIME_MS: u32 = 800;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlinkConfig<P> {
    /// `None` lights the buffer's full value.
    pub pixel: Option<P>,
    pub on_time_ms: u32,
    pub off_time_ms: u32,
}

impl<P> Default for BlinkConfig<P> {
    fn default() -> Self {
        Self {
            pixel: None,
            on_time_ms: DEFAULT_ON_TIME_MS,
            off_time_ms: DEFAULT_OFF_TIME_MS,
        }
    }
}

/// Fill the whole buffer, then clear it, forever.
#[derive(Debug, Clone)]
pub struct Blink<P> {
    config: BlinkConfig<P>,
    lit: bool,
}

impl<P> Default for Blink<P> {
    fn default() -> Self {
        Self::new(BlinkConfig::default())
    }
}

impl<P> Blink<P> {
    pub fn new(config: BlinkConfig<P>) -> Self {
        Self { config, lit: false }
    }
}

impl<P: PixelValue> Pattern<P> for Blink<P> {
    fn next_frame<B>(&mut self, buffer: &mut B) -> Option<u32>
    where
        B: PixelBuffer<Pixel = P> + ?Sized,
    {
        self.lit = !self.lit;
        if self.lit {
            buffer.fill(pixel_or_max(self.config.pixel, buffer));
            Some(self.config.on_time_ms)
        } else {
            buffer.fade(0.0);
            Some(self.config.off_time_ms)
        }
    }

    fn reset(&mut self) {
        self.lit = false;
    }
}
