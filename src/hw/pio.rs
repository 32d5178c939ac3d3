//! State machine programs for single-wire LED strips.
//!
//! Each bit takes `T1 + T2 + T3 = 10` program cycles: the line is driven low
//! for T3, high for T1, then held high (a one) or pulled low (a zero) for T2.
//! At 8 MHz that is 800 kbit/s.

use crate::buffer::ChannelCount;

/// System clock frequency (RP2040 default).
pub const SYS_CLK_HZ: u32 = 125_000_000;

/// Program clock: 10 cycles per bit at 800 kHz.
pub const PROGRAM_CLK_HZ: u32 = 8_000_000;

pub const PIO_BLOCKS: u8 = 2;
pub const STATE_MACHINES_PER_BLOCK: u8 = 4;
pub const STATE_MACHINE_COUNT: u8 = PIO_BLOCKS * STATE_MACHINES_PER_BLOCK;

const PIO0_BASE: u32 = 0x5020_0000;
const PIO1_BASE: u32 = 0x5030_0000;
const TXF0_OFFSET: u32 = 0x10;
const DREQ_PIO1_TX0: u8 = 0x08;

/// Program for 24-bit (GRB) strips.
#[rustfmt::skip]
pub const WS2812_PROGRAM: &[u16] = &[
    // .wrap_target
    0x6221, // bitloop: out x, 1      side 0 [2]
    0x1123, //          jmp !x do_zero side 1 [1]
    0x1400, //          jmp bitloop   side 1 [4]
    0xa442, // do_zero: nop           side 0 [4]
    // .wrap
];

/// Program for 32-bit (GRBW) strips; one cycle shorter low time keeps
/// the bit period at 10 cycles with the extra pull per word.
#[rustfmt::skip]
pub const SK6812_PROGRAM: &[u16] = &[
    // .wrap_target
    0x6121, // bitloop: out x, 1      side 0 [1]
    0x1123, //          jmp !x do_zero side 1 [1]
    0x1400, //          jmp bitloop   side 1 [4]
    0xa442, // do_zero: nop           side 0 [4]
    // .wrap
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedProgram {
    Ws2812,
    Sk6812,
}

impl LedProgram {
    pub const fn for_channels(channels: ChannelCount) -> Self {
        match channels {
            ChannelCount::Three => Self::Ws2812,
            ChannelCount::Four => Self::Sk6812,
        }
    }

    pub const fn instructions(self) -> &'static [u16] {
        match self {
            Self::Ws2812 => WS2812_PROGRAM,
            Self::Sk6812 => SK6812_PROGRAM,
        }
    }

    /// Bits shifted out per pulled word.
    pub const fn pull_threshold(self) -> u8 {
        match self {
            Self::Ws2812 => 24,
            Self::Sk6812 => 32,
        }
    }

    pub(crate) const fn slot(self) -> u8 {
        match self {
            Self::Ws2812 => 0,
            Self::Sk6812 => 1,
        }
    }
}

/// Calculate the 16.8 fixed-point clock divider for a program clock.
///
/// Returns `(integer_part, fractional_part)`.
#[allow(clippy::cast_possible_truncation)]
pub fn calc_clock_divider(sys_clk_hz: u32, program_clk_hz: u32) -> (u16, u8) {
    if program_clk_hz == 0 {
        return (0xFFFF, 0xFF);
    }
    let divider_x256 = u64::from(sys_clk_hz) * 256 / u64::from(program_clk_hz);
    let int_part = (divider_x256 / 256).min(0xFFFF) as u16;
    let frac_part = (divider_x256 % 256) as u8;
    (int_part, frac_part)
}

/// Address of the TX FIFO of global state machine `state_machine` (0-7).
pub const fn tx_fifo_address(state_machine: u8) -> u32 {
    let (base, local) = if state_machine < STATE_MACHINES_PER_BLOCK {
        (PIO0_BASE, state_machine)
    } else {
        (PIO1_BASE, state_machine - STATE_MACHINES_PER_BLOCK)
    };
    base + TXF0_OFFSET + ((local as u32) << 2)
}

/// DMA request line of the TX FIFO of global state machine `state_machine`.
pub const fn tx_dreq(state_machine: u8) -> u8 {
    if state_machine < STATE_MACHINES_PER_BLOCK {
        state_machine
    } else {
        DREQ_PIO1_TX0 + state_machine - STATE_MACHINES_PER_BLOCK
    }
}

/// Configuration applied when a program is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateMachineConfig {
    /// GPIO driven by side-set.
    pub sideset_pin: u8,
    /// 16.8 fixed-point clock divider.
    pub clock_divider: (u16, u8),
    pub autopull: bool,
    /// Output shift direction; strips expect MSB first.
    pub shift_left: bool,
    pub pull_threshold: u8,
    pub wrap_target: u8,
    pub wrap: u8,
}

impl StateMachineConfig {
    pub fn new(program: LedProgram, sideset_pin: u8, sys_clk_hz: u32) -> Self {
        Self {
            sideset_pin,
            clock_divider: calc_clock_divider(sys_clk_hz, PROGRAM_CLK_HZ),
            autopull: true,
            shift_left: true,
            pull_threshold: program.pull_threshold(),
            wrap_target: 0,
            wrap: 3,
        }
    }
}

/// Access to the programmable I/O blocks.
pub trait PioBlock {
    type Error: core::fmt::Debug;

    /// Configure `state_machine` (0-7) and start it.
    ///
    /// `program` carries the instructions to load into the block's
    /// instruction memory first. It is `None` when the block already holds
    /// the program from an earlier install, which must then be reused.
    fn install(
        &mut self,
        state_machine: u8,
        program: Option<&'static [u16]>,
        config: &StateMachineConfig,
    ) -> Result<(), Self::Error>;

    /// Push one word into the TX FIFO, blocking while it is full.
    fn push_tx(&mut self, state_machine: u8, word: u32);
}

impl<X: PioBlock + ?Sized> PioBlock for &mut X {
    type Error = X::Error;

    fn install(
        &mut self,
        state_machine: u8,
        program: Option<&'static [u16]>,
        config: &StateMachineConfig,
    ) -> Result<(), Self::Error> {
        (**self).install(state_machine, program, config)
    }

    fn push_tx(&mut self, state_machine: u8, word: u32) {
        (**self).push_tx(state_machine, word);
    }
}
