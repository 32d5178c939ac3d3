use heapless::Vec;

use super::{DEFAULT_SEED, MAX_COLORS, Pattern, PixelList, cycle_delay};
use crate::buffer::PixelBuffer;
use crate::color::PixelValue;
use crate::rng::Rng;

/// Position and signed speed (cells per frame) of one snake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mover {
    pub position: i32,
    pub velocity: i32,
}

impl Mover {
    pub const fn new(position: i32, velocity: i32) -> Self {
        Self { position, velocity }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnakesConfig<P> {
    /// One snake per color; empty means a single snake in the full value.
    pub pixel_list: PixelList<P>,
    pub max_speed: i32,
    pub fade: f32,
    pub freq: u32,
    pub seed: u64,
}

impl<P> Default for SnakesConfig<P> {
    fn default() -> Self {
        Self {
            pixel_list: PixelList::new(),
            max_speed: 10,
            fade: 0.9,
            freq: 60,
            seed: DEFAULT_SEED,
        }
    }
}

/// Colored snakes bouncing between the buffer ends at random speeds.
///
/// Colors are merged additively, so crossing snakes mix.
#[derive(Debug, Clone)]
pub struct Snakes<P> {
    config: SnakesConfig<P>,
    rng: Rng,
    start: Vec<Mover, MAX_COLORS>,
    movers: Vec<Mover, MAX_COLORS>,
}

impl<P> Snakes<P> {
    /// Random speeds and start positions, drawn on the first frame.
    pub fn new(config: SnakesConfig<P>) -> Self {
        Self {
            rng: Rng::new(config.seed),
            config,
            start: Vec::new(),
            movers: Vec::new(),
        }
    }

    /// Start from explicit positions and velocities instead of random ones.
    pub fn with_movers(config: SnakesConfig<P>, movers: &[Mover]) -> Self {
        let mut snakes = Self::new(config);
        snakes.start = movers.iter().copied().take(MAX_COLORS).collect();
        snakes
    }

    /// Current snakes; empty before the first frame.
    pub fn movers(&self) -> &[Mover] {
        &self.movers
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn spawn(&mut self, len: usize) {
        if !self.start.is_empty() {
            self.movers.clone_from(&self.start);
            return;
        }
        let max_speed = self.config.max_speed;
        let count = self.config.pixel_list.len().max(1);
        for _ in 0..count {
            // speeds in -max..=max without 0
            let speed = self.rng.range_inclusive(-max_speed, max_speed - 1);
            let velocity = if speed < 0 { speed } else { speed + 1 };
            let position = self.rng.range_inclusive(0, len as i32);
            let _ = self.movers.push(Mover::new(position, velocity));
        }
    }
}

impl<P: PixelValue> Pattern<P> for Snakes<P> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn next_frame<B>(&mut self, buffer: &mut B) -> Option<u32>
    where
        B: PixelBuffer<Pixel = P> + ?Sized,
    {
        if self.movers.is_empty() {
            self.spawn(buffer.len());
        }
        let len = buffer.len() as i32;
        let full = buffer.max_pixel();

        buffer.fade(self.config.fade);
        for (index, mover) in self.movers.iter_mut().enumerate() {
            let color = self.config.pixel_list.get(index).copied().unwrap_or(full);
            let speed = mover.velocity.abs();
            let mut direction = mover.velocity.signum();
            let mut position = mover.position;
            for _ in 0..speed {
                position += direction;
                if position < 0 || position >= len {
                    direction = -direction;
                    mover.velocity = direction * speed;
                    position += 2 * direction;
                }
                if let Ok(cell) = usize::try_from(position) {
                    buffer.pixel_merge(cell, color);
                }
            }
            mover.position = position;
        }
        Some(cycle_delay(self.config.freq))
    }

    fn reset(&mut self) {
        self.rng = Rng::new(self.config.seed);
        self.movers.clear();
    }
}
