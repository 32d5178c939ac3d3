use embedded_hal::digital::OutputPin;

use super::Direction;
use crate::buffer::DUTY_MAX;
use crate::error::{DriverError, PinWriteSnafu, PwmWriteSnafu, SetupSnafu, TaskError};
use crate::hw::PwmOutput;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DcMotorConfig {
    pub pwm_frequency_hz: u32,
    /// Share of full duty the motor needs before it starts turning.
    pub stall_zone: f32,
    /// Swap the two direction inputs.
    pub invert: bool,
}

impl Default for DcMotorConfig {
    fn default() -> Self {
        Self {
            pwm_frequency_hz: 1000,
            stall_zone: 0.3,
            invert: false,
        }
    }
}

/// DC motor behind an H-bridge such as the L293D.
///
/// The enable input takes the PWM power signal, the two direction inputs
/// select the rotation. Power is mapped above the stall zone, so any power
/// above zero actually turns the motor.
pub struct DcMotor<E, P> {
    enable: E,
    dir_a: P,
    dir_b: P,
    stall_zone: f32,
    power: f32,
    direction: Direction,
}

impl<E: PwmOutput, P: OutputPin> DcMotor<E, P> {
    pub fn new(mut enable: E, in_a: P, in_b: P, config: DcMotorConfig) -> Result<Self, DriverError> {
        enable
            .set_frequency(config.pwm_frequency_hz)
            .map_err(|_| SetupSnafu { index: 0usize }.build())?;
        let (dir_a, dir_b) = if config.invert { (in_b, in_a) } else { (in_a, in_b) };
        let mut motor = Self {
            enable,
            dir_a,
            dir_b,
            stall_zone: clamp_unit(config.stall_zone),
            power: 0.0,
            direction: Direction::Stopped,
        };
        motor.stop().map_err(|_| SetupSnafu { index: 1usize }.build())?;
        motor.write_duty().map_err(|_| SetupSnafu { index: 0usize }.build())?;
        log::info!("dc motor: {} Hz, stall zone {}", config.pwm_frequency_hz, motor.stall_zone);
        Ok(motor)
    }

    pub fn power(&self) -> f32 {
        self.power
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn stall_zone(&self) -> f32 {
        self.stall_zone
    }

    pub fn enable(&self) -> &E {
        &self.enable
    }

    /// Both direction inputs low; the motor coasts.
    pub fn stop(&mut self) -> Result<(), TaskError> {
        self.direction = Direction::Stopped;
        set_level(&mut self.dir_a, 0, false)?;
        set_level(&mut self.dir_b, 1, false)
    }

    pub fn clockwise(&mut self) -> Result<(), TaskError> {
        self.direction = Direction::Clockwise;
        set_level(&mut self.dir_a, 0, false)?;
        set_level(&mut self.dir_b, 1, true)
    }

    pub fn counter_clockwise(&mut self) -> Result<(), TaskError> {
        self.direction = Direction::CounterClockwise;
        set_level(&mut self.dir_b, 1, false)?;
        set_level(&mut self.dir_a, 0, true)
    }

    /// Set power in `0.0..=1.0` without touching the direction.
    pub fn set_power(&mut self, power: f32) -> Result<(), TaskError> {
        self.power = clamp_unit(power);
        self.write_duty()
    }

    /// Change the stall zone and recompute the duty for the current power.
    pub fn set_stall_zone(&mut self, stall_zone: f32) -> Result<(), TaskError> {
        self.stall_zone = clamp_unit(stall_zone);
        self.write_duty()
    }

    /// Set direction and power from one signed value in `-1.0..=1.0`.
    ///
    /// Zero stops the motor, negative values turn it counter clockwise.
    pub fn throttle(&mut self, power: f32) -> Result<(), TaskError> {
        if power == 0.0 {
            self.stop()?;
        } else if power < 0.0 {
            self.counter_clockwise()?;
        } else {
            self.clockwise()?;
        }
        self.set_power(power.abs())
    }

    /// Enable duty for the current power, `min(65535, 65536 * level)`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn duty(&self) -> u16 {
        let level = self.stall_zone + (1.0 - self.stall_zone) * self.power;
        let duty = (65536.0 * level) as u32;
        duty.min(u32::from(DUTY_MAX)) as u16
    }

    fn write_duty(&mut self) -> Result<(), TaskError> {
        let duty = self.duty();
        self.enable
            .set_duty_cycle_fraction(duty, DUTY_MAX)
            .map_err(|_| PwmWriteSnafu { index: 0usize }.build())
    }
}

fn set_level<P: OutputPin>(pin: &mut P, index: usize, high: bool) -> Result<(), TaskError> {
    let result = if high { pin.set_high() } else { pin.set_low() };
    result.map_err(|_| PinWriteSnafu { index }.build())
}

fn clamp_unit(value: f32) -> f32 {
    // NaN falls to 0
    value.max(0.0).min(1.0)
}
