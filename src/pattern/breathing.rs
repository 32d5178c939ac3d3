use super::{Pattern, PixelList, cycle_delay};
use crate::buffer::PixelBuffer;
use crate::color::PixelValue;

#[derive(Debug, Clone, PartialEq)]
pub struct BreathingConfig<P> {
    /// Colors breathed in turn; empty means the full value only.
    pub pixel_list: PixelList<P>,
    pub turn_on_ms: u32,
    pub on_time_ms: u32,
    pub turn_off_ms: u32,
    pub off_time_ms: u32,
    pub freq: u32,
}

impl<P> Default for BreathingConfig<P> {
    fn default() -> Self {
        Self {
            pixel_list: PixelList::new(),
            turn_on_ms: 2000,
            on_time_ms: 1000,
            turn_off_ms: 1900,
            off_time_ms: 100,
            freq: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Milliseconds into the ramp up.
    RampUp(u32),
    /// Milliseconds left of the ramp down.
    RampDown(u32),
}

/// Whole-buffer linear ramp up, hold, ramp down and rest, once per color.
#[derive(Debug, Clone)]
pub struct Breathing<P> {
    config: BreathingConfig<P>,
    color: usize,
    phase: Phase,
}

impl<P> Breathing<P> {
    pub fn new(config: BreathingConfig<P>) -> Self {
        Self {
            config,
            color: 0,
            phase: Phase::RampUp(0),
        }
    }
}

impl<P: PixelValue> Pattern<P> for Breathing<P> {
    fn next_frame<B>(&mut self, buffer: &mut B) -> Option<u32>
    where
        B: PixelBuffer<Pixel = P> + ?Sized,
    {
        let config = &self.config;
        let frame = cycle_delay(config.freq);
        let step = frame.max(1);
        let pixel = config
            .pixel_list
            .get(self.color)
            .copied()
            .unwrap_or_else(|| buffer.max_pixel());

        match self.phase {
            Phase::RampUp(elapsed) if elapsed < config.turn_on_ms => {
                buffer.fill(pixel.scale_nd(elapsed, config.turn_on_ms));
                self.phase = Phase::RampUp(elapsed + step);
                Some(frame)
            }
            Phase::RampUp(_) => {
                buffer.fill(pixel);
                self.phase = Phase::RampDown(config.turn_off_ms);
                Some(config.on_time_ms)
            }
            Phase::RampDown(remaining) if remaining > 0 => {
                buffer.fill(pixel.scale_nd(remaining, config.turn_off_ms));
                self.phase = Phase::RampDown(remaining.saturating_sub(step));
                Some(frame)
            }
            Phase::RampDown(_) => {
                let off_time = config.off_time_ms;
                buffer.fill(P::OFF);
                self.color = (self.color + 1) % config.pixel_list.len().max(1);
                self.phase = Phase::RampUp(0);
                Some(off_time)
            }
        }
    }

    fn reset(&mut self) {
        self.color = 0;
        self.phase = Phase::RampUp(0);
    }
}
