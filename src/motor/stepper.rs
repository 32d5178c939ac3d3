use core::cell::Cell;

use critical_section::Mutex;
use embedded_hal::digital::{OutputPin, PinState};

use crate::error::{PinWriteSnafu, TaskError};
use crate::scheduler::{Task, Tick};

/// Half-step coil sequence of a 28BYJ-48 through a ULN2003 board.
pub const HALF_STEP_SEQUENCE: [u8; 8] = [1, 3, 2, 6, 4, 12, 8, 9];

/// Half steps per output shaft revolution of a 28BYJ-48.
pub const BYJ48_STEPS_PER_REVOLUTION: i32 = 4082;

/// Walks a coil sequence forwards and backwards, wrapping at both ends.
#[derive(Debug, Clone, Copy)]
pub struct PhaseCycler {
    sequence: &'static [u8],
    current: usize,
}

impl PhaseCycler {
    pub const fn new(sequence: &'static [u8]) -> Self {
        Self { sequence, current: 0 }
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Coil pattern at the current position; 0 for an empty sequence.
    pub fn current(&self) -> u8 {
        self.sequence.get(self.current).copied().unwrap_or(0)
    }

    pub fn forward(&mut self) -> u8 {
        if !self.is_empty() {
            self.current = (self.current + 1) % self.len();
        }
        self.current()
    }

    pub fn backward(&mut self) -> u8 {
        if !self.is_empty() {
            self.current = self.current.checked_sub(1).unwrap_or(self.len() - 1);
        }
        self.current()
    }

    /// Move `n` positions at once, backwards for negative `n`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn step(&mut self, n: i32) {
        if self.is_empty() {
            return;
        }
        let len = self.len() as i64;
        self.current = (self.current as i64 + i64::from(n)).rem_euclid(len) as usize;
    }

    /// Jump to the position of `pattern`; unknown patterns are ignored.
    pub fn set(&mut self, pattern: u8) {
        if let Some(position) = self.sequence.iter().position(|&value| value == pattern) {
            self.current = position;
        }
    }
}

/// Steps requested from outside the scheduler.
///
/// Shared between the application and a [`StepperMotor`] task; positive
/// counts turn forwards.
pub struct StepperControl {
    pending: Mutex<Cell<i32>>,
    steps_per_revolution: i32,
}

impl StepperControl {
    pub const fn new(steps_per_revolution: i32) -> Self {
        Self {
            pending: Mutex::new(Cell::new(0)),
            steps_per_revolution,
        }
    }

    /// Queue `n` more steps, backwards for negative `n`.
    pub fn move_steps(&self, n: i32) {
        critical_section::with(|cs| {
            let cell = self.pending.borrow(cs);
            cell.set(cell.get().saturating_add(n));
        });
    }

    /// Queue the steps for `degrees` of shaft rotation.
    #[allow(clippy::cast_possible_truncation)]
    pub fn rotate_angle(&self, degrees: i32) {
        let steps = i64::from(degrees) * i64::from(self.steps_per_revolution) / 360;
        self.move_steps(steps.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32);
    }

    /// Drop every queued step; the coils keep their current pattern.
    pub fn stop(&self) {
        critical_section::with(|cs| self.pending.borrow(cs).set(0));
    }

    pub fn pending(&self) -> i32 {
        critical_section::with(|cs| self.pending.borrow(cs).get())
    }

    /// Take one queued step, returning its direction.
    fn take_step(&self) -> i32 {
        critical_section::with(|cs| {
            let cell = self.pending.borrow(cs);
            let pending = cell.get();
            cell.set(pending - pending.signum());
            pending.signum()
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepperConfig {
    /// Time per step.
    pub step_ms: u32,
    /// How often an idle motor looks for new steps.
    pub idle_poll_ms: u32,
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            step_ms: 1,
            idle_poll_ms: 10,
        }
    }
}

/// Unipolar stepper on four coil pins.
///
/// Bit `i` of the coil pattern drives `pins[i]`. Each resume takes one
/// queued step from the [`StepperControl`].
pub struct StepperMotor<'a, P> {
    pins: [P; 4],
    cycler: PhaseCycler,
    control: &'a StepperControl,
    config: StepperConfig,
    position: i64,
}

impl<'a, P: OutputPin> StepperMotor<'a, P> {
    pub fn new(pins: [P; 4], sequence: &'static [u8], control: &'a StepperControl, config: StepperConfig) -> Self {
        log::info!("stepper: {} phase sequence, {} ms per step", sequence.len(), config.step_ms);
        Self {
            pins,
            cycler: PhaseCycler::new(sequence),
            control,
            config,
            position: 0,
        }
    }

    /// Net steps taken since construction.
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Coil pattern currently applied.
    pub fn phase(&self) -> u8 {
        self.cycler.current()
    }

    pub fn pins(&self) -> &[P; 4] {
        &self.pins
    }

    fn apply(&mut self, pattern: u8) -> Result<(), TaskError> {
        for (index, pin) in self.pins.iter_mut().enumerate() {
            pin.set_state(PinState::from(pattern & (1 << index) != 0))
                .map_err(|_| PinWriteSnafu { index }.build())?;
        }
        Ok(())
    }
}

impl<P: OutputPin> Task for StepperMotor<'_, P> {
    fn resume(&mut self) -> Result<Tick, TaskError> {
        let direction = self.control.take_step();
        let pattern = match direction {
            0 => return Ok(Tick::Delay(self.config.idle_poll_ms)),
            1 => self.cycler.forward(),
            _ => self.cycler.backward(),
        };
        self.position += i64::from(direction);
        self.apply(pattern)?;
        Ok(Tick::Delay(self.config.step_ms))
    }
}
