use crate::buffer::DUTY_MAX;
use crate::error::{DriverError, PwmWriteSnafu, SetupSnafu, TaskError};
use crate::hw::PwmOutput;

/// Angle range of a hobby servo and the 16-bit duties at its ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServoConfig {
    pub pwm_frequency_hz: u32,
    pub min_angle: f32,
    pub min_angle_duty: u16,
    pub max_angle: f32,
    pub max_angle_duty: u16,
    pub initial_angle: f32,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            pwm_frequency_hz: 50,
            min_angle: -90.0,
            min_angle_duty: 1602,
            max_angle: 90.0,
            max_angle_duty: 7423,
            initial_angle: 0.0,
        }
    }
}

/// Positional servo driven by pulse width.
pub struct AngularServo<O> {
    output: O,
    config: ServoConfig,
    angle: f32,
}

impl<O: PwmOutput> AngularServo<O> {
    pub fn new(mut output: O, config: ServoConfig) -> Result<Self, DriverError> {
        output
            .set_frequency(config.pwm_frequency_hz)
            .map_err(|_| SetupSnafu { index: 0usize }.build())?;
        let mut servo = Self {
            output,
            config,
            angle: config.initial_angle,
        };
        servo
            .set_angle(config.initial_angle)
            .map_err(|_| SetupSnafu { index: 0usize }.build())?;
        Ok(servo)
    }

    /// Last commanded angle, after clamping.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    /// Move to `angle`, clamped to the configured range.
    pub fn set_angle(&mut self, angle: f32) -> Result<(), TaskError> {
        let angle = self.clamp(angle);
        self.output
            .set_duty_cycle_fraction(self.duty_for(angle), DUTY_MAX)
            .map_err(|_| PwmWriteSnafu { index: 0usize }.build())?;
        self.angle = angle;
        Ok(())
    }

    /// Duty linearly interpolated between the configured end points.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn duty_for(&self, angle: f32) -> u16 {
        let ServoConfig {
            min_angle,
            min_angle_duty,
            max_angle,
            max_angle_duty,
            ..
        } = self.config;
        let span = max_angle - min_angle;
        if span <= 0.0 {
            return min_angle_duty;
        }
        let angle = self.clamp(angle);
        let delta_duty = f32::from(max_angle_duty) - f32::from(min_angle_duty);
        (f32::from(min_angle_duty) + delta_duty * (angle - min_angle) / span) as u16
    }

    fn clamp(&self, angle: f32) -> f32 {
        angle.max(self.config.min_angle).min(self.config.max_angle)
    }
}
