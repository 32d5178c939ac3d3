//! Hardware drivers.
//!
//! A driver owns its hardware and a pixel buffer and is bound to one
//! pattern. Every resume renders the next frame, pushes the buffer out and
//! yields the pattern's delay to the scheduler.

mod bitstream;
mod dma;
mod pin;
mod pio;
mod pwm;

pub use bitstream::{BitTiming, BitstreamDriver};
pub use dma::DmaDriver;
pub use pin::PinDriver;
pub use pio::PioDriver;
pub use pwm::{PwmConfig, PwmDriver};

use crate::buffer::ChannelCount;
use crate::error::{DriverError, SetupSnafu};
use crate::hw::pio::{LedProgram, PioBlock, SYS_CLK_HZ, StateMachineConfig};
use crate::hw::{ResourcePool, StateMachineClaim};

/// Settings of the state machine based strip drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedDriverConfig {
    /// State machine to claim; `None` takes the lowest free one.
    pub state_machine: Option<u8>,
    pub sys_clk_hz: u32,
}

impl Default for LedDriverConfig {
    fn default() -> Self {
        Self {
            state_machine: None,
            sys_clk_hz: SYS_CLK_HZ,
        }
    }
}

/// Start the strip program on a claimed state machine, loading it into the
/// block's instruction memory only when no earlier driver did.
fn install_program<X: PioBlock + ?Sized>(
    pool: &ResourcePool,
    pio: &mut X,
    state_machine: &StateMachineClaim<'_>,
    channels: ChannelCount,
    pin: u8,
    config: LedDriverConfig,
) -> Result<(), DriverError> {
    let program = LedProgram::for_channels(channels);
    let block = state_machine.block();
    let fresh = !pool.is_program_loaded(block, program);
    let sm_config = StateMachineConfig::new(program, pin, config.sys_clk_hz);
    pio.install(state_machine.index(), fresh.then_some(program.instructions()), &sm_config)
        .map_err(|_| SetupSnafu { index: usize::from(state_machine.index()) }.build())?;
    if fresh {
        log::debug!("loaded {:?} program into pio block {}", program, block);
        pool.mark_program_loaded(block, program);
    }
    Ok(())
}
