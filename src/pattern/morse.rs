//! Morse code beacon.
//!
//! The message is expanded lazily, one letter at a time, into a queue of
//! on/off units of `dit` milliseconds each.

use heapless::Deque;

use super::{Pattern, pixel_or_max};
use crate::buffer::PixelBuffer;
use crate::color::PixelValue;

/// Units of the longest letter ("0": five dashes plus gaps).
const UNIT_CAPACITY: usize = 32;

const DAH_UNITS: usize = 3;
const LETTER_GAP_UNITS: usize = 2;
const WORD_GAP_UNITS: usize = 4;
/// Completes the 7 unit pause before the message repeats.
const MESSAGE_GAP_UNITS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MorseCodeConfig<P> {
    pub message: &'static str,
    pub on_pixel: Option<P>,
    /// `None` switches the pixel off.
    pub off_pixel: Option<P>,
    /// Repeat the message forever; otherwise the pattern finishes.
    pub looping: bool,
    /// Draw the last pixel instead of the first.
    pub reverse: bool,
    /// Scroll the strip one cell per unit so the message trails along it.
    pub shift: bool,
    /// Unit length in milliseconds.
    pub dit: u32,
}

impl<P> MorseCodeConfig<P> {
    pub const fn new(message: &'static str) -> Self {
        Self {
            message,
            on_pixel: None,
            off_pixel: None,
            looping: true,
            reverse: false,
            shift: false,
            dit: 250,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MorseCode<P> {
    config: MorseCodeConfig<P>,
    units: Deque<bool, UNIT_CAPACITY>,
    cursor: usize,
    finished: bool,
}

impl<P: PixelValue> MorseCode<P> {
    pub fn new(config: MorseCodeConfig<P>) -> Self {
        Self {
            config,
            units: Deque::new(),
            cursor: 0,
            finished: false,
        }
    }

    fn push_units(&mut self, on: bool, count: usize) {
        for _ in 0..count {
            // never overflows: letters are queued only once the queue drains
            let _ = self.units.push_back(on);
        }
    }

    /// Queue the units of the next letter, or the closing gap.
    fn refill(&mut self) {
        let next = self
            .config
            .message
            .get(self.cursor..)
            .and_then(|rest| rest.chars().next());
        let Some(letter) = next else {
            self.push_units(false, MESSAGE_GAP_UNITS);
            if self.config.looping {
                self.cursor = 0;
            } else {
                self.finished = true;
            }
            return;
        };
        self.cursor += letter.len_utf8();

        let letter = letter.to_ascii_lowercase();
        if letter == ' ' {
            self.push_units(false, WORD_GAP_UNITS);
        } else if let Some(code) = itu_code(letter) {
            for symbol in code.bytes() {
                let on_units = if symbol == b'-' { DAH_UNITS } else { 1 };
                self.push_units(true, on_units);
                self.push_units(false, 1);
            }
            self.push_units(false, LETTER_GAP_UNITS);
        }
    }

    fn draw<B>(&self, buffer: &mut B, on: bool)
    where
        B: PixelBuffer<Pixel = P> + ?Sized,
    {
        let value = if on {
            pixel_or_max(self.config.on_pixel, buffer)
        } else {
            self.config.off_pixel.unwrap_or(P::OFF)
        };
        if self.config.reverse {
            if self.config.shift {
                buffer.rotate_left(1);
            }
            buffer.set(buffer.len().saturating_sub(1), value);
        } else {
            if self.config.shift {
                buffer.rotate_right(1);
            }
            buffer.set(0, value);
        }
    }
}

impl<P: PixelValue> Pattern<P> for MorseCode<P> {
    fn next_frame<B>(&mut self, buffer: &mut B) -> Option<u32>
    where
        B: PixelBuffer<Pixel = P> + ?Sized,
    {
        loop {
            if let Some(on) = self.units.pop_front() {
                self.draw(buffer, on);
                return Some(self.config.dit);
            }
            if self.finished {
                return None;
            }
            self.refill();
        }
    }

    fn reset(&mut self) {
        self.units.clear();
        self.cursor = 0;
        self.finished = false;
    }
}

/// International (ITU) morse code for letters and digits.
const fn itu_code(letter: char) -> Option<&'static str> {
    Some(match letter {
        'a' => ".-",
        'b' => "-...",
        'c' => "-.-.",
        'd' => "-..",
        'e' => ".",
        'f' => "..-.",
        'g' => "--.",
        'h' => "....",
        'i' => "..",
        'j' => ".---",
        'k' => "-.-",
        'l' => ".-..",
        'm' => "--",
        'n' => "-.",
        'o' => "---",
        'p' => ".--.",
        'q' => "--.-",
        'r' => ".-.",
        's' => "...",
        't' => "-",
        'u' => "..-",
        'v' => "...-",
        'w' => ".--",
        'x' => "-..-",
        'y' => "-.--",
        'z' => "--..",
        '1' => ".----",
        '2' => "..---",
        '3' => "...--",
        '4' => "....-",
        '5' => ".....",
        '6' => "-....",
        '7' => "--...",
        '8' => "---..",
        '9' => "----.",
        '0' => "-----",
        _ => return None,
    })
}
