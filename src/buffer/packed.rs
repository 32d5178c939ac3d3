//! Packed multi-channel buffer.
//!
//! Pixels are stored as one `u32` word each, already in the byte order the
//! transport consumes, so drivers stream the words without conversion.
//! Callers always see logical `r, g, b, w` values.
//!
//! | layout | word value | bytes in memory (LE) | consumed as |
//! |---|---|---|---|
//! | [`WireLayout::Direct`] | `u32::from_le_bytes([g, r, b, w])` | `g r b w` | bytes `0..bpp`, in memory order |
//! | [`WireLayout::Dma`] | `g << 24 \| r << 16 \| b << 8 \| w` | `w b r g` | whole words, MSB first, top `8 * bpp` bits |
//!
//! Three-channel buffers always store a zero white byte.

use heapless::Vec;

use super::{PixelBuffer, PixelRange};
use crate::color::{PixelValue, Rgbw, rgb, rgbw};
use crate::error::{BufferError, CapacitySnafu, InvalidChannelCountSnafu};
use crate::math8::scale8_nd;

/// Color components per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ChannelCount {
    /// RGB class strips (WS2812).
    Three = 3,
    /// RGBW class strips (SK6812).
    Four = 4,
}

impl ChannelCount {
    pub const fn bpp(self) -> u8 {
        self as u8
    }

    pub fn from_bpp(bpp: u8) -> Result<Self, BufferError> {
        match bpp {
            3 => Ok(Self::Three),
            4 => Ok(Self::Four),
            _ => InvalidChannelCountSnafu { bpp }.fail(),
        }
    }
}

impl TryFrom<u8> for ChannelCount {
    type Error = BufferError;

    fn try_from(bpp: u8) -> Result<Self, Self::Error> {
        Self::from_bpp(bpp)
    }
}

/// Internal byte layout of a packed word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireLayout {
    /// Consumed byte by byte by software timed emission.
    Direct,
    /// Consumed word by word by a hardware paced transfer.
    Dma,
}

impl WireLayout {
    /// Pack a logical color into a word.
    pub const fn encode(self, color: Rgbw, channels: ChannelCount) -> u32 {
        let white = match channels {
            ChannelCount::Three => 0,
            ChannelCount::Four => color.a.0,
        };
        let wire = [color.g, color.r, color.b, white];
        match self {
            Self::Direct => u32::from_le_bytes(wire),
            Self::Dma => u32::from_be_bytes(wire),
        }
    }

    /// Unpack a word into a logical color.
    pub const fn decode(self, word: u32) -> Rgbw {
        let [g, r, b, w] = self.wire_bytes(word);
        rgbw(r, g, b, w)
    }

    /// The word's bytes in transmission order: `g, r, b, w`.
    pub const fn wire_bytes(self, word: u32) -> [u8; 4] {
        match self {
            Self::Direct => word.to_le_bytes(),
            Self::Dma => word.to_be_bytes(),
        }
    }
}

/// One packed word per pixel for addressable strips.
#[derive(Debug, Clone)]
pub struct PackedBuffer<const N: usize> {
    words: Vec<u32, N>,
    channels: ChannelCount,
    layout: WireLayout,
}

impl<const N: usize> PackedBuffer<N> {
    /// Create a dark buffer of `len` pixels.
    pub fn new(len: usize, channels: ChannelCount, layout: WireLayout) -> Result<Self, BufferError> {
        let mut words = Vec::new();
        if words.resize(len, 0).is_err() {
            return CapacitySnafu {
                requested: len,
                capacity: N,
            }
            .fail();
        }
        Ok(Self {
            words,
            channels,
            layout,
        })
    }

    /// Buffer for software timed emission.
    pub fn direct(len: usize, bpp: u8) -> Result<Self, BufferError> {
        Self::new(len, ChannelCount::from_bpp(bpp)?, WireLayout::Direct)
    }

    /// Buffer for DMA fed state machines.
    pub fn dma(len: usize, bpp: u8) -> Result<Self, BufferError> {
        Self::new(len, ChannelCount::from_bpp(bpp)?, WireLayout::Dma)
    }

    pub fn channels(&self) -> ChannelCount {
        self.channels
    }

    pub fn layout(&self) -> WireLayout {
        self.layout
    }

    /// Raw words, as streamed to a state machine.
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Bytes in transmission order, `bpp` per pixel.
    pub fn wire_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        let bpp = usize::from(self.channels.bpp());
        let layout = self.layout;
        self.words
            .iter()
            .flat_map(move |&word| layout.wire_bytes(word).into_iter().take(bpp))
    }

    fn encode(&self, color: Rgbw) -> u32 {
        self.layout
            .encode(color.clamp_to(self.channel_max()), self.channels)
    }
}

impl<const N: usize> PixelBuffer for PackedBuffer<N> {
    type Pixel = Rgbw;

    fn len(&self) -> usize {
        self.words.len()
    }

    fn channel_max(&self) -> Rgbw {
        match self.channels {
            ChannelCount::Three => rgb(255, 255, 255),
            ChannelCount::Four => rgbw(255, 255, 255, 255),
        }
    }

    fn max_pixel(&self) -> Rgbw {
        match self.channels {
            ChannelCount::Three => rgb(255, 255, 255),
            ChannelCount::Four => rgbw(0, 0, 0, 255),
        }
    }

    fn get(&self, index: usize) -> Rgbw {
        self.words
            .get(index)
            .or_else(|| self.words.last())
            .map_or(Rgbw::OFF, |&word| self.layout.decode(word))
    }

    fn set(&mut self, index: usize, value: Rgbw) {
        let word = self.encode(value);
        if let Some(slot) = self.words.get_mut(index) {
            *slot = word;
        }
    }

    fn fill_range(&mut self, value: Rgbw, range: PixelRange) {
        let word = self.encode(value);
        for index in range.iter(self.words.len()) {
            self.words[index] = word;
        }
    }

    fn fade_nd_range(&mut self, numerator: u32, denominator: u32, range: PixelRange) {
        for index in range.iter(self.words.len()) {
            let bytes = self.words[index]
                .to_le_bytes()
                .map(|byte| scale8_nd(byte, numerator, denominator));
            self.words[index] = u32::from_le_bytes(bytes);
        }
    }

    fn rotate_left(&mut self, k: usize) {
        let len = self.words.len();
        if len > 0 {
            self.words.rotate_left(k % len);
        }
    }

    fn rotate_right(&mut self, k: usize) {
        let len = self.words.len();
        if len > 0 {
            self.words.rotate_right(k % len);
        }
    }
}
