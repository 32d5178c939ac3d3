use crate::buffer::{DUTY_MAX, PixelBuffer, PwmBuffer};
use crate::error::{DriverError, PwmWriteSnafu, SetupSnafu, TaskError};
use crate::hw::PwmOutput;
use crate::pattern::Pattern;
use crate::scheduler::{Task, Tick};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmConfig {
    /// Base frequency of every channel.
    pub frequency_hz: u32,
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 10_000,
        }
    }
}

/// One 16-bit duty pixel per PWM channel.
pub struct PwmDriver<O, T, const N: usize> {
    outputs: [O; N],
    pattern: T,
    buffer: PwmBuffer<N>,
}

impl<O: PwmOutput, T: Pattern<u16>, const N: usize> PwmDriver<O, T, N> {
    pub fn new(mut outputs: [O; N], pattern: T, config: PwmConfig) -> Result<Self, DriverError> {
        for (index, output) in outputs.iter_mut().enumerate() {
            output
                .set_frequency(config.frequency_hz)
                .map_err(|_| SetupSnafu { index }.build())?;
        }
        let buffer = PwmBuffer::duty(N)?;
        log::info!("pwm driver: {} channels at {} Hz", N, config.frequency_hz);
        Ok(Self {
            outputs,
            pattern,
            buffer,
        })
    }

    pub fn buffer(&self) -> &PwmBuffer<N> {
        &self.buffer
    }

    pub fn outputs(&self) -> &[O; N] {
        &self.outputs
    }
}

impl<O: PwmOutput, T: Pattern<u16>, const N: usize> Task for PwmDriver<O, T, N> {
    fn resume(&mut self) -> Result<Tick, TaskError> {
        let Some(delay) = self.pattern.next_frame(&mut self.buffer) else {
            return Ok(Tick::Done);
        };
        for (index, output) in self.outputs.iter_mut().enumerate() {
            output
                .set_duty_cycle_fraction(self.buffer.get(index), DUTY_MAX)
                .map_err(|_| PwmWriteSnafu { index }.build())?;
        }
        Ok(Tick::Delay(delay))
    }
}
