use core::cell::Cell;

use critical_section::Mutex;
use heapless::Vec;

use super::{Pattern, PatternId, PatternSlot};
use crate::buffer::PixelBuffer;
use crate::color::PixelValue;

/// Shared selection of the running pattern.
///
/// Written from anywhere (input callbacks, interrupt handlers), read by a
/// [`SelectPattern`] on every frame.
pub struct PatternSelector {
    id: Mutex<Cell<PatternId>>,
}

impl PatternSelector {
    pub const fn new(id: PatternId) -> Self {
        Self {
            id: Mutex::new(Cell::new(id)),
        }
    }

    pub fn get(&self) -> PatternId {
        critical_section::with(|cs| self.id.borrow(cs).get())
    }

    pub fn set(&self, id: PatternId) {
        critical_section::with(|cs| self.id.borrow(cs).set(id));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectConfig {
    /// Minimum rate at which the selection is checked.
    pub freq: u32,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self { freq: 30 }
    }
}

/// Runs whichever of its patterns the selector names.
///
/// A change of selection rebuilds the chosen pattern from its template and
/// starts it on the next frame. Yields are capped at `1000 / freq` ms so a
/// pattern with long frames cannot delay a change.
pub struct SelectPattern<'a, P: PixelValue, const K: usize> {
    selector: &'a PatternSelector,
    choices: Vec<PatternSlot<P>, K>,
    active: Option<(PatternId, PatternSlot<P>)>,
    cycle_delay: u64,
    now: u64,
    due: u64,
}

impl<'a, P: PixelValue, const K: usize> SelectPattern<'a, P, K> {
    /// Selections not found in `choices` fall back to the first choice.
    pub fn new(selector: &'a PatternSelector, choices: Vec<PatternSlot<P>, K>, config: SelectConfig) -> Self {
        if let Some(first) = choices.first() {
            let selected = selector.get();
            if !choices.iter().any(|choice| choice.id() == selected) {
                selector.set(first.id());
            }
        }
        Self {
            selector,
            choices,
            active: None,
            cycle_delay: u64::from(super::cycle_delay(config.freq)),
            now: 0,
            due: 0,
        }
    }

    /// Id of the pattern currently running.
    pub fn active_id(&self) -> Option<PatternId> {
        self.active.as_ref().map(|(id, _)| *id)
    }

    fn follow_selection(&mut self) {
        let selected = self.selector.get();
        if self.active_id() == Some(selected) {
            return;
        }
        if let Some(template) = self.choices.iter().find(|choice| choice.id() == selected) {
            log::debug!("switching to pattern {}", selected.as_str());
            self.active = Some((selected, template.clone()));
            self.due = self.now;
        }
    }
}

impl<P: PixelValue, const K: usize> Pattern<P> for SelectPattern<'_, P, K> {
    #[allow(clippy::cast_possible_truncation)]
    fn next_frame<B>(&mut self, buffer: &mut B) -> Option<u32>
    where
        B: PixelBuffer<Pixel = P> + ?Sized,
    {
        self.follow_selection();
        let (_, pattern) = self.active.as_mut()?;

        if self.due <= self.now {
            self.due += u64::from(pattern.next_frame(buffer)?);
        }
        let delay = (self.due - self.now).min(self.cycle_delay);
        self.now += delay;
        Some(delay as u32)
    }

    fn reset(&mut self) {
        self.active = None;
        self.now = 0;
        self.due = 0;
    }
}
