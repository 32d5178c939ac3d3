use super::{DEFAULT_SEED, Pattern, cycle_delay, pixel_or_max};
use crate::buffer::{PixelBuffer, PixelRange};
use crate::color::PixelValue;
use crate::rng::Rng;

/// Dark pause before the sequence repeats.
const DARK_PAUSE_MS: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttentionConfig<P> {
    pub pixel: Option<P>,
    pub freq: u32,
    pub fade: f32,
    pub seed: u64,
}

impl<P> Default for AttentionConfig<P> {
    fn default() -> Self {
        Self {
            pixel: None,
            freq: 60,
            fade: 0.8,
            seed: DEFAULT_SEED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Both ends grow toward the centre.
    CloseIn(u32),
    /// Outer parts fade while the centre stays lit.
    Trail(u32),
    FadeOut(u32),
    /// Centre flickers, lit more often as time goes on.
    Sparkle(u32),
    /// Light spreads from the centre back to both ends.
    OpenOut { step: u32, prev: usize },
    Dim(u32),
    Dark,
}

/// Attention grabbing sequence: close in, hold, fade out, flicker and
/// open out again, roughly four seconds per round.
#[derive(Debug, Clone)]
pub struct Attention<P> {
    config: AttentionConfig<P>,
    rng: Rng,
    stage: Stage,
}

impl<P> Attention<P> {
    pub fn new(config: AttentionConfig<P>) -> Self {
        Self {
            rng: Rng::new(config.seed),
            config,
            stage: Stage::CloseIn(0),
        }
    }
}

impl<P: PixelValue> Pattern<P> for Attention<P> {
    fn next_frame<B>(&mut self, buffer: &mut B) -> Option<u32>
    where
        B: PixelBuffer<Pixel = P> + ?Sized,
    {
        let freq = self.config.freq.max(1);
        let frame = cycle_delay(freq);
        let len = buffer.len();
        if len == 0 {
            return Some(frame);
        }
        let half = len / 2;
        let fade = self.config.fade;
        let fade2 = fade * fade;
        let pixel = pixel_or_max(self.config.pixel, buffer);
        let centre = PixelRange::new(half.saturating_sub(1), len - half.saturating_sub(1));
        let span = |step: u32, over: u32| half * step as usize / over as usize;

        loop {
            match self.stage {
                Stage::CloseIn(step) if step < freq => {
                    let reach = span(step, freq);
                    buffer.fill_range(pixel, (..reach).into());
                    buffer.fill_range(pixel, (len - 1 - reach..).into());
                    self.stage = Stage::CloseIn(step + 2);
                    return Some(frame);
                }
                Stage::CloseIn(_) => {
                    buffer.fill(pixel);
                    self.stage = Stage::Trail(0);
                    return Some(frame);
                }
                Stage::Trail(step) if step < freq => {
                    let reach = span(step, (freq - 1).max(1));
                    buffer.fade_range(fade2, (..reach).into());
                    buffer.fade_range(fade2, (len - 1 - reach..).into());
                    buffer.fill_range(pixel, centre);
                    self.stage = Stage::Trail(step + 2);
                    return Some(frame);
                }
                Stage::Trail(_) => self.stage = Stage::FadeOut(0),
                Stage::FadeOut(step) if step < freq => {
                    buffer.fade(fade2);
                    if 2 * step < freq {
                        buffer.fill_range(pixel, centre);
                    }
                    self.stage = Stage::FadeOut(step + 4);
                    return Some(frame);
                }
                Stage::FadeOut(_) => {
                    buffer.fade(0.0);
                    self.stage = Stage::Sparkle(0);
                }
                Stage::Sparkle(step) if step < 3 * freq => {
                    let roll = self.rng.index(3 * freq as usize + 1);
                    if roll < step as usize {
                        buffer.fill_range(pixel, centre);
                    } else {
                        buffer.fade_range(0.0, centre);
                    }
                    self.stage = Stage::Sparkle(step + 1);
                    return Some(frame);
                }
                Stage::Sparkle(_) => {
                    buffer.fill_range(pixel, centre);
                    self.stage = Stage::OpenOut { step: 0, prev: 0 };
                }
                Stage::OpenOut { step, prev } if step < freq + 2 => {
                    let reach = span(step, freq);
                    buffer.fill_range(
                        pixel,
                        PixelRange::new(half.saturating_sub(reach), half.saturating_sub(prev)),
                    );
                    buffer.fill_range(pixel, PixelRange::new(half + prev, half + reach));
                    buffer.fade(fade);
                    self.stage = Stage::OpenOut {
                        step: step + 2,
                        prev: reach,
                    };
                    return Some(frame);
                }
                Stage::OpenOut { .. } => self.stage = Stage::Dim(0),
                Stage::Dim(step) if step < freq => {
                    buffer.fade(fade);
                    self.stage = Stage::Dim(step + 4);
                    return Some(frame);
                }
                Stage::Dim(_) => self.stage = Stage::Dark,
                Stage::Dark => {
                    buffer.fade(0.0);
                    self.stage = Stage::CloseIn(0);
                    return Some(DARK_PAUSE_MS);
                }
            }
        }
    }

    fn reset(&mut self) {
        self.rng = Rng::new(self.config.seed);
        self.stage = Stage::CloseIn(0);
    }
}
