//! Fading bar and random "piano key" patterns.

use super::{DEFAULT_SEED, Pattern, cycle_delay, pixel_or_max};
use crate::buffer::PixelBuffer;
use crate::color::PixelValue;
use crate::rng::Rng;

const DEFAULT_FADE: f32 = 0.9;
const DEFAULT_FREQ: u32 = 60;

/// Sub-frames between two piano key strikes.
const PIANO_STRIKE_FRAMES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadingBarsConfig<P> {
    pub pixel: Option<P>,
    pub fade: f32,
    pub freq: u32,
}

impl<P> Default for FadingBarsConfig<P> {
    fn default() -> Self {
        Self {
            pixel: None,
            fade: DEFAULT_FADE,
            freq: DEFAULT_FREQ,
        }
    }
}

/// One-second cycle: light the whole buffer, then let it fade while a
/// single pixel walks from start to end.
#[derive(Debug, Clone)]
pub struct FadingBars<P> {
    config: FadingBarsConfig<P>,
    cycle: u32,
}

impl<P> FadingBars<P> {
    pub fn new(config: FadingBarsConfig<P>) -> Self {
        Self { config, cycle: 0 }
    }
}

impl<P: PixelValue> Pattern<P> for FadingBars<P> {
    fn next_frame<B>(&mut self, buffer: &mut B) -> Option<u32>
    where
        B: PixelBuffer<Pixel = P> + ?Sized,
    {
        let freq = self.config.freq.max(1);
        let pixel = pixel_or_max(self.config.pixel, buffer);
        if self.cycle == 0 {
            buffer.fill(pixel);
        } else {
            buffer.fade(self.config.fade);
            let index = buffer.len() * self.cycle as usize / freq as usize;
            buffer.set(index, pixel);
        }
        self.cycle = (self.cycle + 1) % freq;
        Some(cycle_delay(freq))
    }

    fn reset(&mut self) {
        self.cycle = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PianoConfig<P> {
    pub pixel: Option<P>,
    pub fade: f32,
    pub freq: u32,
    pub seed: u64,
}

impl<P> Default for PianoConfig<P> {
    fn default() -> Self {
        Self {
            pixel: None,
            fade: DEFAULT_FADE,
            freq: DEFAULT_FREQ,
            seed: DEFAULT_SEED,
        }
    }
}

/// Strike a random pixel every few frames and let it fade.
#[derive(Debug, Clone)]
pub struct Piano<P> {
    config: PianoConfig<P>,
    rng: Rng,
    cycle: u32,
}

impl<P> Piano<P> {
    pub fn new(config: PianoConfig<P>) -> Self {
        Self {
            rng: Rng::new(config.seed),
            config,
            cycle: 0,
        }
    }
}

impl<P: PixelValue> Pattern<P> for Piano<P> {
    fn next_frame<B>(&mut self, buffer: &mut B) -> Option<u32>
    where
        B: PixelBuffer<Pixel = P> + ?Sized,
    {
        buffer.fade(self.config.fade);
        if self.cycle == 0 {
            let key = self.rng.index(buffer.len());
            buffer.set(key, pixel_or_max(self.config.pixel, buffer));
        }
        self.cycle = (self.cycle + 1) % PIANO_STRIKE_FRAMES;
        Some(cycle_delay(self.config.freq))
    }

    fn reset(&mut self) {
        self.rng = Rng::new(self.config.seed);
        self.cycle = 0;
    }
}
