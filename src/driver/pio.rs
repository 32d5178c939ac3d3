use super::{LedDriverConfig, install_program};
use crate::buffer::{ChannelCount, PackedBuffer, WireLayout};
use crate::color::Rgbw;
use crate::error::{DriverError, TaskError};
use crate::hw::pio::PioBlock;
use crate::hw::{ResourcePool, StateMachineClaim};
use crate::pattern::Pattern;
use crate::scheduler::{Task, Tick};

/// Feeds a state machine word by word from the CPU.
pub struct PioDriver<'a, X, T, const N: usize> {
    pio: X,
    state_machine: StateMachineClaim<'a>,
    pattern: T,
    buffer: PackedBuffer<N>,
}

impl<'a, X: PioBlock, T: Pattern<Rgbw>, const N: usize> PioDriver<'a, X, T, N> {
    pub fn new(
        pool: &'a ResourcePool,
        mut pio: X,
        pin: u8,
        pattern: T,
        n: usize,
        bpp: u8,
        config: LedDriverConfig,
    ) -> Result<Self, DriverError> {
        let channels = ChannelCount::from_bpp(bpp)?;
        let buffer = PackedBuffer::new(n, channels, WireLayout::Dma)?;

        let state_machine = pool.claim_state_machine(config.state_machine)?;
        install_program(pool, &mut pio, &state_machine, channels, pin, config)?;

        log::info!(
            "pio driver: {} pixels on pin {}, state machine {}",
            n,
            pin,
            state_machine.index()
        );
        Ok(Self {
            pio,
            state_machine,
            pattern,
            buffer,
        })
    }

    pub fn buffer(&self) -> &PackedBuffer<N> {
        &self.buffer
    }

    pub fn pio(&self) -> &X {
        &self.pio
    }
}

impl<X: PioBlock, T: Pattern<Rgbw>, const N: usize> Task for PioDriver<'_, X, T, N> {
    fn resume(&mut self) -> Result<Tick, TaskError> {
        let Some(delay) = self.pattern.next_frame(&mut self.buffer) else {
            return Ok(Tick::Done);
        };
        let index = self.state_machine.index();
        for &word in self.buffer.words() {
            self.pio.push_tx(index, word);
        }
        Ok(Tick::Delay(delay))
    }
}
