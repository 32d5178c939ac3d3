use super::{Pattern, cycle_delay, pixel_or_max};
use crate::buffer::PixelBuffer;
use crate::color::PixelValue;
use crate::math8::{FADE_DENOMINATOR, permille};

/// Gaps between markers as a fraction of the strip.
const MARKER_SPACING_DIVISOR: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeftRightSlowConfig<P> {
    /// Color of the markers moving toward the end.
    pub lr_pixel: Option<P>,
    /// Color of the markers moving toward the start.
    pub rl_pixel: Option<P>,
    /// Cells per frame; fractions blend into the next cell.
    pub speed: f32,
    pub freq: u32,
    pub fade: f32,
}

impl<P> Default for LeftRightSlowConfig<P> {
    fn default() -> Self {
        Self {
            lr_pixel: None,
            rl_pixel: None,
            speed: 0.5,
            freq: 60,
            fade: 0.8,
        }
    }
}

/// Two interleaved marker trains drifting in opposite directions at
/// sub-pixel speed.
#[derive(Debug, Clone)]
pub struct LeftRightSlow<P> {
    config: LeftRightSlowConfig<P>,
    position: f32,
}

impl<P> LeftRightSlow<P> {
    pub fn new(config: LeftRightSlowConfig<P>) -> Self {
        Self {
            config,
            position: 0.0,
        }
    }
}

fn draw_markers<B: PixelBuffer + ?Sized>(buffer: &mut B, first: usize, space: usize, lr: B::Pixel, rl: B::Pixel) {
    let len = buffer.len();
    let mut index = first;
    while index < len {
        buffer.pixel_merge(index, lr);
        buffer.pixel_merge(len - 1 - index, rl);
        index += space;
    }
}

impl<P: PixelValue> Pattern<P> for LeftRightSlow<P> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn next_frame<B>(&mut self, buffer: &mut B) -> Option<u32>
    where
        B: PixelBuffer<Pixel = P> + ?Sized,
    {
        let LeftRightSlowConfig {
            lr_pixel,
            rl_pixel,
            speed,
            freq,
            fade,
        } = self.config;
        let space = (buffer.len() / MARKER_SPACING_DIVISOR).max(1);
        let lr = pixel_or_max(lr_pixel, buffer);
        let rl = pixel_or_max(rl_pixel, buffer);

        buffer.fade(fade);
        let whole = self.position as usize;
        let fraction = self.position - whole as f32;
        draw_markers(buffer, whole, space, lr, rl);

        if fraction >= speed {
            let correction = (fraction - speed) * (1.0 - fade);
            let level = permille(speed + correction);
            draw_markers(
                buffer,
                whole + 1,
                space,
                lr.scale_nd(level, FADE_DENOMINATOR),
                rl.scale_nd(level, FADE_DENOMINATOR),
            );
        }

        self.position += speed;
        if self.position >= space as f32 {
            self.position = 0.0;
        }
        Some(cycle_delay(freq))
    }

    fn reset(&mut self) {
        self.position = 0.0;
    }
}
