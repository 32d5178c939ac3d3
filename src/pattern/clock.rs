//! Wall clock rendered on a strip.
//!
//! The strip is read as a 24 hour dial in half-hour cells; minutes use the
//! same strip as a 60 minute dial in 2.5 minute cells. Separators mark every
//! three hours and a blinking marker sits at noon.

use super::Pattern;
use crate::buffer::{PixelBuffer, PixelRange};
use crate::color::{Rgbw, rgb};

const REFRESH_MS: u32 = 250;
const HALF_HOURS: usize = 48;
const MINUTE_CELLS: usize = 24;

/// Local time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// Source of the local time of day.
pub trait WallClock {
    fn local_time(&self) -> ClockTime;
}

impl<F: Fn() -> ClockTime> WallClock for F {
    fn local_time(&self) -> ClockTime {
        self()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripClockConfig {
    pub separator_3h: Rgbw,
    pub separator_12h: Rgbw,
    pub hour: Rgbw,
    pub minute: Rgbw,
}

impl Default for StripClockConfig {
    fn default() -> Self {
        Self {
            separator_3h: rgb(1, 0, 0),
            separator_12h: rgb(127, 0, 127),
            hour: rgb(0, 127, 0),
            minute: rgb(32, 32, 0),
        }
    }
}

pub struct StripClock<C> {
    clock: C,
    config: StripClockConfig,
}

impl<C: WallClock> StripClock<C> {
    pub fn new(clock: C, config: StripClockConfig) -> Self {
        Self { clock, config }
    }
}

/// Light the cell before `part` (wrapping 0 to `cells`) and the cell at `part`.
fn fill_around<B>(buffer: &mut B, color: Rgbw, part: usize, cells: usize, width: usize)
where
    B: PixelBuffer<Pixel = Rgbw> + ?Sized,
{
    let before = if part == 0 { cells } else { part };
    buffer.fill_range(color, PixelRange::new((before - 1) * width, before * width));
    let at = if part == cells { 0 } else { part };
    buffer.fill_range(color, PixelRange::new(at * width, (at + 1) * width));
}

impl<C: WallClock> Pattern<Rgbw> for StripClock<C> {
    fn next_frame<B>(&mut self, buffer: &mut B) -> Option<u32>
    where
        B: PixelBuffer<Pixel = Rgbw> + ?Sized,
    {
        let len = buffer.len();
        let half_hour = len / HALF_HOURS;
        let half_5minute = len / MINUTE_CELLS;
        let time = self.clock.local_time();
        let config = self.config;

        buffer.fade(0.0);

        let minute_part = 2 * usize::from(time.minute) / 5;
        fill_around(buffer, config.minute, minute_part, MINUTE_CELLS, half_5minute);

        let hour_part = 2 * usize::from(time.hour);
        fill_around(buffer, config.hour, hour_part, HALF_HOURS, half_hour);

        if half_hour > 0 {
            let every_3h = 6 * half_hour;
            buffer.fill_range(
                config.separator_3h,
                PixelRange::new(every_3h, len).with_step(every_3h),
            );

            let every_12h = 24 * half_hour;
            let centre = PixelRange::new(every_12h, len).with_step(every_12h);
            if time.second % 2 == 1 {
                buffer.fill_range(config.separator_12h, centre);
            } else {
                buffer.fade_range(0.0, centre);
            }
        }
        Some(REFRESH_MS)
    }
}
