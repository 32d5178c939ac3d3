mod pixel;

pub use pixel::PixelValue;
use smart_leds::{RGB8, RGBW, White};

pub type Rgb = RGB8;
pub type Rgbw = RGBW<u8>;

/// All channels off.
pub const OFF: Rgbw = rgbw(0, 0, 0, 0);

/// Build a 3-channel color (white channel off).
pub const fn rgb(r: u8, g: u8, b: u8) -> Rgbw {
    rgbw(r, g, b, 0)
}

/// Build a 4-channel color.
pub const fn rgbw(r: u8, g: u8, b: u8, w: u8) -> Rgbw {
    Rgbw { r, g, b, a: White(w) }
}

/// Widen an RGB color to the 4-channel representation.
pub const fn from_rgb(color: Rgb) -> Rgbw {
    rgb(color.r, color.g, color.b)
}

/// Logical channels in `[r, g, b, w]` order.
pub const fn channels(color: Rgbw) -> [u8; 4] {
    [color.r, color.g, color.b, color.a.0]
}

/// Inverse of [`channels`].
pub const fn from_channels(channels: [u8; 4]) -> Rgbw {
    rgbw(channels[0], channels[1], channels[2], channels[3])
}
