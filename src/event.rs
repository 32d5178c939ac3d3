//! Interrupt safe event flags.
//!
//! An [`Event`] is the bridge between interrupt handlers and tasks: handlers
//! record an edge or raise event bits in O(1), the scheduler wakes tasks
//! awaiting it and the task consumes the state with [`Event::take`].

use core::cell::Cell;

use critical_section::Mutex;
use embassy_time::Instant;

/// Snapshot of an event's pending state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventState {
    /// Time of the earliest unconsumed edge.
    pub at: Option<Instant>,
    /// Coalesced event bits.
    pub bits: u8,
}

impl EventState {
    pub const fn is_set(&self) -> bool {
        self.at.is_some() || self.bits != 0
    }
}

/// A flag that interrupt handlers set and tasks await.
pub struct Event {
    inner: Mutex<Cell<EventState>>,
}

impl Event {
    /// Create a cleared event.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Cell::new(EventState { at: None, bits: 0 })),
        }
    }

    /// Record an edge; the earliest unconsumed timestamp is kept.
    pub fn signal(&self, at: Instant) {
        critical_section::with(|cs| {
            let cell = self.inner.borrow(cs);
            let mut state = cell.get();
            state.at = Some(state.at.map_or(at, |pending| pending.min(at)));
            cell.set(state);
        });
    }

    /// OR `bits` into the pending event bits.
    pub fn raise(&self, bits: u8) {
        critical_section::with(|cs| {
            let cell = self.inner.borrow(cs);
            let mut state = cell.get();
            state.bits |= bits;
            cell.set(state);
        });
    }

    /// Whether an edge or any bits are pending.
    pub fn is_set(&self) -> bool {
        critical_section::with(|cs| self.inner.borrow(cs).get().is_set())
    }

    /// Consume and clear the pending state.
    pub fn take(&self) -> EventState {
        critical_section::with(|cs| self.inner.borrow(cs).take())
    }
}

impl core::fmt::Debug for Event {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = critical_section::with(|cs| self.inner.borrow(cs).get());
        f.debug_struct("Event")
            .field("at", &state.at)
            .field("bits", &state.bits)
            .finish()
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::new()
    }
}
