//! Motors.
//!
//! [`DcMotor`] and [`AngularServo`] are plain handles that application
//! tasks command directly. [`StepperMotor`] is a task of its own, fed with
//! steps through a shared [`StepperControl`].

mod dc;
mod servo;
mod stepper;

pub use dc::{DcMotor, DcMotorConfig};
pub use servo::{AngularServo, ServoConfig};
pub use stepper::{
    BYJ48_STEPS_PER_REVOLUTION, HALF_STEP_SEQUENCE, PhaseCycler, StepperConfig, StepperControl,
    StepperMotor,
};

/// Rotation a motor is set to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Stopped,
    Clockwise,
    CounterClockwise,
}
