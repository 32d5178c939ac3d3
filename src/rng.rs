//! Deterministic pseudo random numbers for patterns.

/// SplitMix64 generator.
///
/// Cheap, allocation free and reproducible from a seed, which keeps random
/// patterns testable on the host.
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        (z ^ (z >> 31)) as u32
    }

    /// Uniform value in `low..=high` (returns `low` for an empty range).
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss, clippy::cast_lossless)]
    pub fn range_inclusive(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        let span = (high as i64 - low as i64 + 1) as u64;
        let offset = u64::from(self.next_u32()) % span;
        (low as i64 + offset as i64) as i32
    }

    /// Uniform index in `0..len` (0 for an empty range).
    #[allow(clippy::cast_possible_truncation)]
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        (u64::from(self.next_u32()) % len as u64) as usize
    }
}
