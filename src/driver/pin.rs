use embedded_hal::digital::{OutputPin, PinState};

use crate::buffer::{BitBuffer, PixelBuffer};
use crate::error::{DriverError, PinWriteSnafu, TaskError};
use crate::pattern::Pattern;
use crate::scheduler::{Task, Tick};

/// One binary pixel per digital output.
pub struct PinDriver<O, T, const N: usize> {
    pins: [O; N],
    pattern: T,
    buffer: BitBuffer<N>,
}

impl<O: OutputPin, T: Pattern<u8>, const N: usize> PinDriver<O, T, N> {
    pub fn new(pins: [O; N], pattern: T) -> Result<Self, DriverError> {
        let buffer = BitBuffer::binary(N)?;
        log::info!("pin driver: {} outputs", N);
        Ok(Self {
            pins,
            pattern,
            buffer,
        })
    }

    pub fn buffer(&self) -> &BitBuffer<N> {
        &self.buffer
    }

    pub fn pins(&self) -> &[O; N] {
        &self.pins
    }
}

impl<O: OutputPin, T: Pattern<u8>, const N: usize> Task for PinDriver<O, T, N> {
    fn resume(&mut self) -> Result<Tick, TaskError> {
        let Some(delay) = self.pattern.next_frame(&mut self.buffer) else {
            return Ok(Tick::Done);
        };
        for (index, pin) in self.pins.iter_mut().enumerate() {
            let state = PinState::from(self.buffer.get(index) != 0);
            pin.set_state(state)
                .map_err(|_| PinWriteSnafu { index }.build())?;
        }
        Ok(Tick::Delay(delay))
    }
}
