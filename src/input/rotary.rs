use super::{CLOCKWISE, COUNTER_CLOCKWISE};
use crate::event::Event;

/// Quadrature decoder for KY-040 style encoders.
///
/// Call from the interrupt of both encoder lines. A detent is reported when
/// the lines return to a resting state (both low or both high); the
/// intermediate state tells the direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct RotaryDecoder {
    state: u8,
}

impl RotaryDecoder {
    pub const fn new() -> Self {
        Self { state: 0 }
    }

    /// Feed the current line levels; returns the direction bits detected.
    pub fn on_edge(&mut self, clk: bool, dt: bool) -> u8 {
        let new_state = (u8::from(dt) << 1) | u8::from(clk);
        let bits = match (self.state, new_state) {
            (0 | 3, _) => 0,
            (1, 0) | (2, 3) => CLOCKWISE,
            (2, 0) | (1, 3) => COUNTER_CLOCKWISE,
            _ => return 0,
        };
        self.state = new_state;
        bits
    }

    /// [`on_edge`](Self::on_edge), raising any detected bits on `event`.
    pub fn update(&mut self, clk: bool, dt: bool, event: &Event) {
        let bits = self.on_edge(clk, dt);
        if bits != 0 {
            event.raise(bits);
        }
    }
}
