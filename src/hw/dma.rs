//! DMA channel register overlay.
//!
//! [`DmaCtrl`] gives typed access to the bit fields of a channel's control
//! register; [`DmaRegisters`] is the seam to the channel register block.

/// DMA channels available on the chip.
pub const DMA_CHANNEL_COUNT: u8 = 12;

/// Transfer request selector for unpaced transfers.
pub const TREQ_UNPACED: u8 = 0x3f;

/// Width of one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DataSize {
    Byte = 0,
    HalfWord = 1,
    Word = 2,
}

/// Channel control register (`CTRL` / `CTRL_TRIG`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DmaCtrl(pub u32);

impl DmaCtrl {
    const EN: u32 = 1 << 0;
    const HIGH_PRIORITY: u32 = 1 << 1;
    const DATA_SIZE_SHIFT: u32 = 2;
    const DATA_SIZE_WIDTH: u32 = 2;
    const INCR_READ: u32 = 1 << 4;
    const INCR_WRITE: u32 = 1 << 5;
    const CHAIN_TO_SHIFT: u32 = 11;
    const CHAIN_TO_WIDTH: u32 = 4;
    const TREQ_SEL_SHIFT: u32 = 15;
    const TREQ_SEL_WIDTH: u32 = 6;
    const IRQ_QUIET: u32 = 1 << 21;
    const BSWAP: u32 = 1 << 22;
    const BUSY: u32 = 1 << 24;
    const WRITE_ERROR: u32 = 1 << 29;
    const READ_ERROR: u32 = 1 << 30;
    const AHB_ERROR: u32 = 1 << 31;

    /// Control word for a word-wide memory to peripheral stream, paced by
    /// the peripheral's data request line and not chained.
    pub const fn mem_to_peripheral(channel: u8, dreq: u8) -> Self {
        Self(0)
            .with_enabled(true)
            .with_high_priority(true)
            .with_irq_quiet(true)
            .with_data_size(DataSize::Word)
            .with_incr_read(true)
            .with_incr_write(false)
            // chaining to itself disables chaining
            .with_chain_to(channel)
            .with_treq(dreq)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    const fn flag(self, mask: u32) -> bool {
        self.0 & mask != 0
    }

    const fn with_flag(self, mask: u32, on: bool) -> Self {
        if on { Self(self.0 | mask) } else { Self(self.0 & !mask) }
    }

    const fn field(self, shift: u32, width: u32) -> u32 {
        (self.0 >> shift) & ((1 << width) - 1)
    }

    const fn with_field(self, shift: u32, width: u32, value: u32) -> Self {
        let mask = ((1 << width) - 1) << shift;
        Self((self.0 & !mask) | ((value << shift) & mask))
    }

    pub const fn enabled(self) -> bool {
        self.flag(Self::EN)
    }

    pub const fn with_enabled(self, on: bool) -> Self {
        self.with_flag(Self::EN, on)
    }

    pub const fn high_priority(self) -> bool {
        self.flag(Self::HIGH_PRIORITY)
    }

    pub const fn with_high_priority(self, on: bool) -> Self {
        self.with_flag(Self::HIGH_PRIORITY, on)
    }

    pub const fn data_size(self) -> u32 {
        self.field(Self::DATA_SIZE_SHIFT, Self::DATA_SIZE_WIDTH)
    }

    pub const fn with_data_size(self, size: DataSize) -> Self {
        self.with_field(Self::DATA_SIZE_SHIFT, Self::DATA_SIZE_WIDTH, size as u32)
    }

    pub const fn incr_read(self) -> bool {
        self.flag(Self::INCR_READ)
    }

    pub const fn with_incr_read(self, on: bool) -> Self {
        self.with_flag(Self::INCR_READ, on)
    }

    pub const fn incr_write(self) -> bool {
        self.flag(Self::INCR_WRITE)
    }

    pub const fn with_incr_write(self, on: bool) -> Self {
        self.with_flag(Self::INCR_WRITE, on)
    }

    pub const fn chain_to(self) -> u8 {
        self.field(Self::CHAIN_TO_SHIFT, Self::CHAIN_TO_WIDTH) as u8
    }

    pub const fn with_chain_to(self, channel: u8) -> Self {
        self.with_field(Self::CHAIN_TO_SHIFT, Self::CHAIN_TO_WIDTH, channel as u32)
    }

    pub const fn treq(self) -> u8 {
        self.field(Self::TREQ_SEL_SHIFT, Self::TREQ_SEL_WIDTH) as u8
    }

    pub const fn with_treq(self, dreq: u8) -> Self {
        self.with_field(Self::TREQ_SEL_SHIFT, Self::TREQ_SEL_WIDTH, dreq as u32)
    }

    pub const fn irq_quiet(self) -> bool {
        self.flag(Self::IRQ_QUIET)
    }

    pub const fn with_irq_quiet(self, on: bool) -> Self {
        self.with_flag(Self::IRQ_QUIET, on)
    }

    pub const fn bswap(self) -> bool {
        self.flag(Self::BSWAP)
    }

    pub const fn with_bswap(self, on: bool) -> Self {
        self.with_flag(Self::BSWAP, on)
    }

    /// A transfer is in flight.
    pub const fn busy(self) -> bool {
        self.flag(Self::BUSY)
    }

    pub const fn with_busy(self, on: bool) -> Self {
        self.with_flag(Self::BUSY, on)
    }

    /// Any of the read, write or bus error flags is set.
    pub const fn has_error(self) -> bool {
        self.flag(Self::WRITE_ERROR | Self::READ_ERROR | Self::AHB_ERROR)
    }
}

/// Raw values of one channel's registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelRegisters {
    pub read_addr: u32,
    pub write_addr: u32,
    pub trans_count: u32,
    pub ctrl: DmaCtrl,
}

/// One memory to peripheral transfer.
#[derive(Debug, Clone, Copy)]
pub struct Transfer<'a> {
    pub source: &'a [u32],
    pub write_addr: u32,
    pub ctrl: DmaCtrl,
}

impl Transfer<'_> {
    /// Register values for this transfer on a 32-bit address space.
    #[allow(clippy::cast_possible_truncation)]
    pub fn registers(&self) -> ChannelRegisters {
        ChannelRegisters {
            read_addr: self.source.as_ptr() as usize as u32,
            write_addr: self.write_addr,
            trans_count: self.source.len() as u32,
            ctrl: self.ctrl,
        }
    }
}

/// Access to the DMA channel register blocks.
pub trait DmaRegisters {
    /// Program the channel and start the transfer.
    ///
    /// The source must stay untouched until [`ctrl`](Self::ctrl) reports the
    /// channel idle again.
    fn start(&mut self, channel: u8, transfer: Transfer<'_>);

    /// Current control register of `channel`.
    fn ctrl(&self, channel: u8) -> DmaCtrl;

    /// Abort any transfer on `channel` without raising its completion
    /// interrupt.
    ///
    /// The channel may report busy for a short while after the abort is
    /// requested.
    fn abort(&mut self, channel: u8);
}

impl<R: DmaRegisters + ?Sized> DmaRegisters for &mut R {
    fn start(&mut self, channel: u8, transfer: Transfer<'_>) {
        (**self).start(channel, transfer);
    }

    fn ctrl(&self, channel: u8) -> DmaCtrl {
        (**self).ctrl(channel)
    }

    fn abort(&mut self, channel: u8) {
        (**self).abort(channel);
    }
}
