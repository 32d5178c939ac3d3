//! Exclusive hardware resources.
//!
//! DMA channels and state machines are handed out first come, first served
//! as RAII claims. Claims release themselves on drop; the scheduler calls
//! [`ResourcePool::release_all`] at shutdown.
//!
//! Claims are tagged with the pool's generation. `release_all` starts a new
//! generation and retires the claims still alive: their resources stay
//! unavailable until the owner drops them, and a retired claim's drop only
//! clears its retired bit, never a bit owned by a newer claim.

use core::cell::Cell;

use critical_section::Mutex;

use super::dma::DMA_CHANNEL_COUNT;
use super::pio::{LedProgram, STATE_MACHINE_COUNT, STATE_MACHINES_PER_BLOCK};
use crate::error::{DriverError, NoDmaChannelSnafu, NoStateMachineSnafu, StateMachineTakenSnafu};

/// Bitmasks of the resources in use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceUsage {
    pub dma_channels: u16,
    pub state_machines: u8,
    /// One bit per loaded program per block.
    pub programs: u8,
}

#[derive(Clone, Copy, Default)]
struct PoolState {
    /// Claims of the current generation and loaded programs.
    usage: ResourceUsage,
    /// Claims made before the last shutdown whose owners are still alive.
    retired: ResourceUsage,
    generation: u32,
}

impl PoolState {
    fn dma_taken(&self) -> u16 {
        self.usage.dma_channels | self.retired.dma_channels
    }

    fn state_machines_taken(&self) -> u8 {
        self.usage.state_machines | self.retired.state_machines
    }
}

pub struct ResourcePool {
    state: Mutex<Cell<PoolState>>,
}

impl ResourcePool {
    pub const fn new() -> Self {
        const IDLE: ResourceUsage = ResourceUsage {
            dma_channels: 0,
            state_machines: 0,
            programs: 0,
        };
        Self {
            state: Mutex::new(Cell::new(PoolState {
                usage: IDLE,
                retired: IDLE,
                generation: 0,
            })),
        }
    }

    fn update<R>(&self, f: impl FnOnce(&mut PoolState) -> R) -> R {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut state = cell.get();
            let result = f(&mut state);
            cell.set(state);
            result
        })
    }

    fn snapshot(&self) -> PoolState {
        critical_section::with(|cs| self.state.borrow(cs).get())
    }

    /// Claim a free DMA channel, highest numbered first.
    pub fn claim_dma(&self) -> Result<DmaClaim<'_>, DriverError> {
        let claimed = self.update(|state| {
            let taken = state.dma_taken();
            let channel = (0..DMA_CHANNEL_COUNT)
                .rev()
                .find(|&channel| taken & (1 << channel) == 0)?;
            state.usage.dma_channels |= 1 << channel;
            Some((channel, state.generation))
        });
        let (channel, generation) = claimed.ok_or_else(|| NoDmaChannelSnafu.build())?;
        log::debug!("claimed dma channel {}", channel);
        Ok(DmaClaim {
            pool: self,
            channel,
            generation,
        })
    }

    /// Claim `preferred`, or the lowest free state machine.
    pub fn claim_state_machine(&self, preferred: Option<u8>) -> Result<StateMachineClaim<'_>, DriverError> {
        let (index, generation) = self.update(|state| {
            let taken = state.state_machines_taken();
            let index = match preferred {
                Some(index) if index >= STATE_MACHINE_COUNT => return NoStateMachineSnafu.fail(),
                Some(index) if taken & (1 << index) != 0 => {
                    return StateMachineTakenSnafu { index }.fail();
                }
                Some(index) => index,
                None => (0..STATE_MACHINE_COUNT)
                    .find(|&index| taken & (1 << index) == 0)
                    .ok_or_else(|| NoStateMachineSnafu.build())?,
            };
            state.usage.state_machines |= 1 << index;
            Ok((index, state.generation))
        })?;
        log::debug!("claimed state machine {}", index);
        Ok(StateMachineClaim {
            pool: self,
            index,
            generation,
        })
    }

    /// Whether `program` already sits in the instruction memory of `block`.
    pub fn is_program_loaded(&self, block: u8, program: LedProgram) -> bool {
        self.snapshot().usage.programs & program_bit(block, program) != 0
    }

    /// Record `program` as loaded in `block`.
    pub fn mark_program_loaded(&self, block: u8, program: LedProgram) {
        let bit = program_bit(block, program);
        self.update(|state| state.usage.programs |= bit);
    }

    /// Resources claimed in the current generation, and loaded programs.
    pub fn in_use(&self) -> ResourceUsage {
        self.snapshot().usage
    }

    /// Resources of earlier generations whose claims are still alive.
    pub fn retired(&self) -> ResourceUsage {
        self.snapshot().retired
    }

    /// Forget every loaded program and start a new generation, returning
    /// what was held.
    ///
    /// Claims that are still alive are retired rather than handed out
    /// again; they become free once their owner drops them.
    pub fn release_all(&self) -> ResourceUsage {
        let held = self.update(|state| {
            let held = state.usage;
            state.retired.dma_channels |= held.dma_channels;
            state.retired.state_machines |= held.state_machines;
            state.usage = ResourceUsage::default();
            state.generation = state.generation.wrapping_add(1);
            held
        });
        log::info!(
            "released dma channels {:#06x}, state machines {:#04x}, programs {:#04x}",
            held.dma_channels,
            held.state_machines,
            held.programs
        );
        held
    }

    fn release_dma(&self, channel: u8, generation: u32) {
        let mask = !(1u16 << channel);
        self.update(|state| {
            if state.generation == generation {
                state.usage.dma_channels &= mask;
            } else {
                state.retired.dma_channels &= mask;
            }
        });
        log::debug!("released dma channel {}", channel);
    }

    fn release_state_machine(&self, index: u8, generation: u32) {
        let mask = !(1u8 << index);
        self.update(|state| {
            if state.generation == generation {
                state.usage.state_machines &= mask;
            } else {
                state.retired.state_machines &= mask;
            }
        });
        log::debug!("released state machine {}", index);
    }
}

fn program_bit(block: u8, program: LedProgram) -> u8 {
    1 << (block * 2 + program.slot())
}

impl Default for ResourcePool {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive use of one DMA channel.
pub struct DmaClaim<'a> {
    pool: &'a ResourcePool,
    channel: u8,
    generation: u32,
}

impl DmaClaim<'_> {
    pub fn channel(&self) -> u8 {
        self.channel
    }
}

impl Drop for DmaClaim<'_> {
    fn drop(&mut self) {
        self.pool.release_dma(self.channel, self.generation);
    }
}

/// Exclusive use of one state machine.
pub struct StateMachineClaim<'a> {
    pool: &'a ResourcePool,
    index: u8,
    generation: u32,
}

impl StateMachineClaim<'_> {
    /// Global index, 0-7.
    pub fn index(&self) -> u8 {
        self.index
    }

    /// PIO block the state machine belongs to.
    pub fn block(&self) -> u8 {
        self.index / STATE_MACHINES_PER_BLOCK
    }
}

impl Drop for StateMachineClaim<'_> {
    fn drop(&mut self) {
        self.pool.release_state_machine(self.index, self.generation);
    }
}
