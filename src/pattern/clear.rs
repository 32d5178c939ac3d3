use super::Pattern;
use crate::buffer::PixelBuffer;
use crate::color::PixelValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearConfig {
    pub freq: u32,
    /// Idle period, in frames of `freq`.
    pub wait_cycles: u32,
}

impl Default for ClearConfig {
    fn default() -> Self {
        Self {
            freq: 60,
            wait_cycles: 20,
        }
    }
}

/// Switch everything off once, then idle.
#[derive(Debug, Clone)]
pub struct Clear {
    config: ClearConfig,
    cleared: bool,
}

impl Default for Clear {
    fn default() -> Self {
        Self::new(ClearConfig::default())
    }
}

impl Clear {
    pub fn new(config: ClearConfig) -> Self {
        Self {
            config,
            cleared: false,
        }
    }
}

impl<P: PixelValue> Pattern<P> for Clear {
    fn next_frame<B>(&mut self, buffer: &mut B) -> Option<u32>
    where
        B: PixelBuffer<Pixel = P> + ?Sized,
    {
        if !self.cleared {
            self.cleared = true;
            buffer.fade(0.0);
            return Some(0);
        }
        Some(self.config.wait_cycles.saturating_mul(1000) / self.config.freq.max(1))
    }

    fn reset(&mut self) {
        self.cleared = false;
    }
}
