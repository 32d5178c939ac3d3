//! Integer scaling helpers shared by buffers and patterns.

/// Every fade factor is resolved to thousandths before it touches a channel.
pub const FADE_DENOMINATOR: u32 = 1000;

/// Resolve a fade factor (0.0-1.0) to thousandths, rounding toward zero.
///
/// Out-of-range factors are clamped, NaN resolves to 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn permille(factor: f32) -> u32 {
    if factor.is_nan() {
        return 0;
    }
    let clamped = factor.clamp(0.0, 1.0);
    libm::floorf(clamped * FADE_DENOMINATOR as f32) as u32
}

/// Scale an 8-bit channel by `numerator / denominator`, rounding toward zero.
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub const fn scale8_nd(value: u8, numerator: u32, denominator: u32) -> u8 {
    if denominator == 0 {
        return 0;
    }
    let scaled = value as u64 * numerator as u64 / denominator as u64;
    if scaled > u8::MAX as u64 {
        u8::MAX
    } else {
        scaled as u8
    }
}

/// Scale a 16-bit channel by `numerator / denominator`, rounding toward zero.
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub const fn scale16_nd(value: u16, numerator: u32, denominator: u32) -> u16 {
    if denominator == 0 {
        return 0;
    }
    let scaled = value as u64 * numerator as u64 / denominator as u64;
    if scaled > u16::MAX as u64 {
        u16::MAX
    } else {
        scaled as u16
    }
}

/// Saturating add of two 8-bit channels, capped at `max`.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_lossless)]
pub const fn merge8(a: u8, b: u8, max: u8) -> u8 {
    let sum = a as u16 + b as u16;
    if sum > max as u16 { max } else { sum as u8 }
}

/// Saturating add of two 16-bit channels, capped at `max`.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_lossless)]
pub const fn merge16(a: u16, b: u16, max: u16) -> u16 {
    let sum = a as u32 + b as u32;
    if sum > max as u32 { max } else { sum as u16 }
}
