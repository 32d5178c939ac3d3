use super::{LedDriverConfig, install_program};
use crate::buffer::{ChannelCount, PackedBuffer, WireLayout};
use crate::color::Rgbw;
use crate::error::{DriverError, TaskError, TransmissionSnafu};
use crate::hw::dma::{DmaCtrl, DmaRegisters, Transfer};
use crate::hw::pio::{PioBlock, tx_dreq, tx_fifo_address};
use crate::hw::{DmaClaim, ResourcePool, StateMachineClaim};
use crate::pattern::Pattern;
use crate::scheduler::{Task, Tick};

/// Streams the buffer into a state machine with a DMA transfer.
///
/// The CPU only renders frames. While a transfer is in flight the buffer
/// belongs to the DMA engine, so the driver yields zero delays until the
/// channel reports idle before rendering again. Dropping the driver aborts
/// a transfer still in flight and waits for the channel to stop before the
/// buffer and the channel are given up.
pub struct DmaDriver<'a, R: DmaRegisters, T, const N: usize> {
    dma: R,
    dma_claim: DmaClaim<'a>,
    state_machine: StateMachineClaim<'a>,
    ctrl: DmaCtrl,
    pattern: T,
    buffer: PackedBuffer<N>,
}

impl<'a, R: DmaRegisters, T: Pattern<Rgbw>, const N: usize> DmaDriver<'a, R, T, N> {
    #[allow(clippy::too_many_arguments)]
    pub fn new<X: PioBlock>(
        pool: &'a ResourcePool,
        pio: &mut X,
        dma: R,
        pin: u8,
        pattern: T,
        n: usize,
        bpp: u8,
        config: LedDriverConfig,
    ) -> Result<Self, DriverError> {
        let channels = ChannelCount::from_bpp(bpp)?;
        let buffer = PackedBuffer::new(n, channels, WireLayout::Dma)?;

        let state_machine = pool.claim_state_machine(config.state_machine)?;
        install_program(pool, pio, &state_machine, channels, pin, config)?;

        let dma_claim = pool.claim_dma()?;
        let ctrl = DmaCtrl::mem_to_peripheral(dma_claim.channel(), tx_dreq(state_machine.index()));
        log::info!(
            "dma driver: {} pixels on pin {}, state machine {}, dma channel {}",
            n,
            pin,
            state_machine.index(),
            dma_claim.channel()
        );
        Ok(Self {
            dma,
            dma_claim,
            state_machine,
            ctrl,
            pattern,
            buffer,
        })
    }

    pub fn buffer(&self) -> &PackedBuffer<N> {
        &self.buffer
    }

    pub fn dma(&self) -> &R {
        &self.dma
    }

    pub fn dma_channel(&self) -> u8 {
        self.dma_claim.channel()
    }

    pub fn state_machine(&self) -> u8 {
        self.state_machine.index()
    }
}

impl<R: DmaRegisters, T: Pattern<Rgbw>, const N: usize> Task for DmaDriver<'_, R, T, N> {
    fn resume(&mut self) -> Result<Tick, TaskError> {
        let channel = self.dma_claim.channel();
        let status = self.dma.ctrl(channel);
        if status.busy() {
            return Ok(Tick::Delay(0));
        }
        if status.has_error() {
            return TransmissionSnafu.fail();
        }

        let Some(delay) = self.pattern.next_frame(&mut self.buffer) else {
            return Ok(Tick::Done);
        };
        let transfer = Transfer {
            source: self.buffer.words(),
            write_addr: tx_fifo_address(self.state_machine.index()),
            ctrl: self.ctrl,
        };
        self.dma.start(channel, transfer);
        Ok(Tick::Delay(delay))
    }
}

impl<R: DmaRegisters, T, const N: usize> Drop for DmaDriver<'_, R, T, N> {
    fn drop(&mut self) {
        let channel = self.dma_claim.channel();
        if !self.dma.ctrl(channel).busy() {
            return;
        }
        log::warn!("aborting dma transfer on channel {}", channel);
        self.dma.abort(channel);
        while self.dma.ctrl(channel).busy() {
            core::hint::spin_loop();
        }
    }
}
