//! Animation patterns.
//!
//! A pattern is a resumable state machine: every call to
//! [`Pattern::next_frame`] mutates the buffer for one frame and returns how
//! long that frame should stay visible. Patterns hold only counters,
//! positions and directions, so switching patterns is a matter of building a
//! fresh value.
//!
//! All leaf patterns are collected in [`PatternSlot`] to avoid heap
//! allocations; [`PatternId`] gives them stable names and ids.

mod attention;
mod bars;
mod blink;
mod breathing;
mod clear;
mod clock;
mod cylon;
mod kit;
mod left_right;
mod morse;
mod multi;
mod select;
mod snakes;

pub use attention::{Attention, AttentionConfig};
pub use bars::{FadingBars, FadingBarsConfig, Piano, PianoConfig};
pub use blink::{Blink, BlinkConfig};
pub use breathing::{Breathing, BreathingConfig};
pub use clear::{Clear, ClearConfig};
pub use clock::{ClockTime, StripClock, StripClockConfig, WallClock};
pub use cylon::{Cylon, CylonConfig};
pub use kit::{Kit, KitConfig};
pub use left_right::{LeftRightSlow, LeftRightSlowConfig};
pub use morse::{MorseCode, MorseCodeConfig};
pub use multi::MultiPattern;
pub use select::{PatternSelector, SelectConfig, SelectPattern};
pub use snakes::{Mover, Snakes, SnakesConfig};

use crate::buffer::PixelBuffer;
use crate::color::PixelValue;

/// Maximum number of colors in a pattern's pixel list.
pub const MAX_COLORS: usize = 8;

/// Colors cycled or distributed by multi-color patterns.
pub type PixelList<P> = heapless::Vec<P, MAX_COLORS>;

/// Default seed of the random patterns.
pub const DEFAULT_SEED: u64 = 0x5eed_1ed5;

const PATTERN_NAME_BLINK: &str = "blink";
const PATTERN_NAME_FADING_BARS: &str = "fading_bars";
const PATTERN_NAME_KIT: &str = "kit";
const PATTERN_NAME_CYLON: &str = "cylon";
const PATTERN_NAME_SNAKES: &str = "snakes";
const PATTERN_NAME_PIANO: &str = "piano";
const PATTERN_NAME_BREATHING: &str = "breathing";
const PATTERN_NAME_LEFT_RIGHT_SLOW: &str = "left_right_slow";
const PATTERN_NAME_MORSE_CODE: &str = "morse_code";
const PATTERN_NAME_CLEAR: &str = "clear";
const PATTERN_NAME_ATTENTION: &str = "attention";

const PATTERN_ID_BLINK: u8 = 0;
const PATTERN_ID_FADING_BARS: u8 = 1;
const PATTERN_ID_KIT: u8 = 2;
const PATTERN_ID_CYLON: u8 = 3;
const PATTERN_ID_SNAKES: u8 = 4;
const PATTERN_ID_PIANO: u8 = 5;
const PATTERN_ID_BREATHING: u8 = 6;
const PATTERN_ID_LEFT_RIGHT_SLOW: u8 = 7;
const PATTERN_ID_MORSE_CODE: u8 = 8;
const PATTERN_ID_CLEAR: u8 = 9;
const PATTERN_ID_ATTENTION: u8 = 10;

/// Message sent by a morse pattern built from its id alone.
const DEFAULT_MORSE_MESSAGE: &str = "sos";

pub trait Pattern<P: PixelValue> {
    /// Render one frame into `buffer`.
    ///
    /// Returns the time in milliseconds until the next frame is due, or
    /// `None` once the pattern has finished.
    fn next_frame<B>(&mut self, buffer: &mut B) -> Option<u32>
    where
        B: PixelBuffer<Pixel = P> + ?Sized;

    /// Restart from the first frame.
    fn reset(&mut self) {}
}

/// Frame period in milliseconds of a pattern running at `freq` frames per second.
pub(crate) const fn cycle_delay(freq: u32) -> u32 {
    1000 / if freq == 0 { 1 } else { freq }
}

/// The configured color, or the buffer's "fully on" value.
pub(crate) fn pixel_or_max<B: PixelBuffer + ?Sized>(pixel: Option<B::Pixel>, buffer: &B) -> B::Pixel {
    pixel.unwrap_or_else(|| buffer.max_pixel())
}

/// Known pattern ids that can be requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PatternId {
    Blink = PATTERN_ID_BLINK,
    FadingBars = PATTERN_ID_FADING_BARS,
    Kit = PATTERN_ID_KIT,
    Cylon = PATTERN_ID_CYLON,
    Snakes = PATTERN_ID_SNAKES,
    Piano = PATTERN_ID_PIANO,
    Breathing = PATTERN_ID_BREATHING,
    LeftRightSlow = PATTERN_ID_LEFT_RIGHT_SLOW,
    MorseCode = PATTERN_ID_MORSE_CODE,
    Clear = PATTERN_ID_CLEAR,
    Attention = PATTERN_ID_ATTENTION,
}

impl PatternId {
    pub fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            PATTERN_ID_BLINK => Self::Blink,
            PATTERN_ID_FADING_BARS => Self::FadingBars,
            PATTERN_ID_KIT => Self::Kit,
            PATTERN_ID_CYLON => Self::Cylon,
            PATTERN_ID_SNAKES => Self::Snakes,
            PATTERN_ID_PIANO => Self::Piano,
            PATTERN_ID_BREATHING => Self::Breathing,
            PATTERN_ID_LEFT_RIGHT_SLOW => Self::LeftRightSlow,
            PATTERN_ID_MORSE_CODE => Self::MorseCode,
            PATTERN_ID_CLEAR => Self::Clear,
            PATTERN_ID_ATTENTION => Self::Attention,
            _ => return None,
        })
    }

    /// Build the pattern with default settings, drawn in `pixel`
    /// (`None` uses the buffer's full value).
    pub fn to_slot<P: PixelValue>(self, pixel: Option<P>) -> PatternSlot<P> {
        let colors = pixel.into_iter().collect::<PixelList<P>>();
        match self {
            Self::Blink => PatternSlot::Blink(Blink::new(BlinkConfig {
                pixel,
                ..BlinkConfig::default()
            })),
            Self::FadingBars => PatternSlot::FadingBars(FadingBars::new(FadingBarsConfig {
                pixel,
                ..FadingBarsConfig::default()
            })),
            Self::Kit => PatternSlot::Kit(Kit::new(KitConfig {
                pixel,
                ..KitConfig::default()
            })),
            Self::Cylon => PatternSlot::Cylon(Cylon::new(CylonConfig {
                pixel,
                ..CylonConfig::default()
            })),
            Self::Snakes => PatternSlot::Snakes(Snakes::new(SnakesConfig {
                pixel_list: colors,
                ..SnakesConfig::default()
            })),
            Self::Piano => PatternSlot::Piano(Piano::new(PianoConfig {
                pixel,
                ..PianoConfig::default()
            })),
            Self::Breathing => PatternSlot::Breathing(Breathing::new(BreathingConfig {
                pixel_list: colors,
                ..BreathingConfig::default()
            })),
            Self::LeftRightSlow => PatternSlot::LeftRightSlow(LeftRightSlow::new(LeftRightSlowConfig {
                lr_pixel: pixel,
                rl_pixel: pixel,
                ..LeftRightSlowConfig::default()
            })),
            Self::MorseCode => PatternSlot::MorseCode(MorseCode::new(MorseCodeConfig {
                on_pixel: pixel,
                ..MorseCodeConfig::new(DEFAULT_MORSE_MESSAGE)
            })),
            Self::Clear => PatternSlot::Clear(Clear::new(ClearConfig::default())),
            Self::Attention => PatternSlot::Attention(Attention::new(AttentionConfig {
                pixel,
                ..AttentionConfig::default()
            })),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blink => PATTERN_NAME_BLINK,
            Self::FadingBars => PATTERN_NAME_FADING_BARS,
            Self::Kit => PATTERN_NAME_KIT,
            Self::Cylon => PATTERN_NAME_CYLON,
            Self::Snakes => PATTERN_NAME_SNAKES,
            Self::Piano => PATTERN_NAME_PIANO,
            Self::Breathing => PATTERN_NAME_BREATHING,
            Self::LeftRightSlow => PATTERN_NAME_LEFT_RIGHT_SLOW,
            Self::MorseCode => PATTERN_NAME_MORSE_CODE,
            Self::Clear => PATTERN_NAME_CLEAR,
            Self::Attention => PATTERN_NAME_ATTENTION,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            PATTERN_NAME_BLINK => Some(Self::Blink),
            PATTERN_NAME_FADING_BARS => Some(Self::FadingBars),
            PATTERN_NAME_KIT => Some(Self::Kit),
            PATTERN_NAME_CYLON => Some(Self::Cylon),
            PATTERN_NAME_SNAKES => Some(Self::Snakes),
            PATTERN_NAME_PIANO => Some(Self::Piano),
            PATTERN_NAME_BREATHING => Some(Self::Breathing),
            PATTERN_NAME_LEFT_RIGHT_SLOW => Some(Self::LeftRightSlow),
            PATTERN_NAME_MORSE_CODE => Some(Self::MorseCode),
            PATTERN_NAME_CLEAR => Some(Self::Clear),
            PATTERN_NAME_ATTENTION => Some(Self::Attention),
            _ => None,
        }
    }
}

/// Pattern slot - enum containing every leaf pattern.
///
/// Composite patterns ([`MultiPattern`], [`SelectPattern`]) hold slots, so
/// they are not slots themselves.
#[derive(Debug, Clone)]
pub enum PatternSlot<P: PixelValue> {
    Blink(Blink<P>),
    FadingBars(FadingBars<P>),
    Kit(Kit<P>),
    Cylon(Cylon<P>),
    Snakes(Snakes<P>),
    Piano(Piano<P>),
    Breathing(Breathing<P>),
    LeftRightSlow(LeftRightSlow<P>),
    MorseCode(MorseCode<P>),
    Clear(Clear),
    Attention(Attention<P>),
}

impl<P: PixelValue> Default for PatternSlot<P> {
    fn default() -> Self {
        Self::Blink(Blink::default())
    }
}

impl<P: PixelValue> PatternSlot<P> {
    /// Get the pattern ID for external observation.
    pub fn id(&self) -> PatternId {
        match self {
            Self::Blink(_) => PatternId::Blink,
            Self::FadingBars(_) => PatternId::FadingBars,
            Self::Kit(_) => PatternId::Kit,
            Self::Cylon(_) => PatternId::Cylon,
            Self::Snakes(_) => PatternId::Snakes,
            Self::Piano(_) => PatternId::Piano,
            Self::Breathing(_) => PatternId::Breathing,
            Self::LeftRightSlow(_) => PatternId::LeftRightSlow,
            Self::MorseCode(_) => PatternId::MorseCode,
            Self::Clear(_) => PatternId::Clear,
            Self::Attention(_) => PatternId::Attention,
        }
    }
}

impl<P: PixelValue> Pattern<P> for PatternSlot<P> {
    fn next_frame<B>(&mut self, buffer: &mut B) -> Option<u32>
    where
        B: PixelBuffer<Pixel = P> + ?Sized,
    {
        match self {
            Self::Blink(pattern) => pattern.next_frame(buffer),
            Self::FadingBars(pattern) => pattern.next_frame(buffer),
            Self::Kit(pattern) => pattern.next_frame(buffer),
            Self::Cylon(pattern) => pattern.next_frame(buffer),
            Self::Snakes(pattern) => pattern.next_frame(buffer),
            Self::Piano(pattern) => pattern.next_frame(buffer),
            Self::Breathing(pattern) => pattern.next_frame(buffer),
            Self::LeftRightSlow(pattern) => pattern.next_frame(buffer),
            Self::MorseCode(pattern) => pattern.next_frame(buffer),
            Self::Clear(pattern) => pattern.next_frame(buffer),
            Self::Attention(pattern) => pattern.next_frame(buffer),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Blink(pattern) => Pattern::<P>::reset(pattern),
            Self::FadingBars(pattern) => Pattern::<P>::reset(pattern),
            Self::Kit(pattern) => Pattern::<P>::reset(pattern),
            Self::Cylon(pattern) => Pattern::<P>::reset(pattern),
            Self::Snakes(pattern) => Pattern::<P>::reset(pattern),
            Self::Piano(pattern) => Pattern::<P>::reset(pattern),
            Self::Breathing(pattern) => Pattern::<P>::reset(pattern),
            Self::LeftRightSlow(pattern) => Pattern::<P>::reset(pattern),
            Self::MorseCode(pattern) => Pattern::<P>::reset(pattern),
            Self::Clear(pattern) => Pattern::<P>::reset(pattern),
            Self::Attention(pattern) => Pattern::<P>::reset(pattern),
        }
    }
}
