//! USART register maps
//!
//! Two register generations are in use across the STM32 families. The
//! older one (F1, F2, F4, L1) has a combined status register and a single
//! data register; the newer one (F0, F3, F7, G0, G4, H7, L0, L4, WB, ...)
//! has separate interrupt/status, receive and transmit data registers and a
//! different CR1 layout.

use usart_core::{DataBits, Flag, LineConfig, Parity, StopBits};

/// Register generation of a USART instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterLayout {
    /// SR/DR register set
    Legacy,
    /// ISR/RDR/TDR register set
    Modern,
}

pub const SR_RXNE: u32 = 1 << 5;
pub const SR_TC: u32 = 1 << 6;
pub const SR_TXE: u32 = 1 << 7;

pub const CR1_RE: u32 = 1 << 2;
pub const CR1_TE: u32 = 1 << 3;
pub const CR1_RXNEIE: u32 = 1 << 5;
pub const CR1_PS: u32 = 1 << 9;
pub const CR1_PCE: u32 = 1 << 10;

const LEGACY_CR1_M: u32 = 1 << 12;
const LEGACY_CR1_UE: u32 = 1 << 13;

const MODERN_CR1_UE: u32 = 1 << 0;
const MODERN_CR1_M0: u32 = 1 << 12;
const MODERN_CR1_M1: u32 = 1 << 28;

pub const CR2_STOP_2: u32 = 0b10 << 12;
pub const CR2_STOP_MASK: u32 = 0b11 << 12;

pub const CR3_RTSE: u32 = 1 << 8;
pub const CR3_CTSE: u32 = 1 << 9;

/// Overrun clear flag in the modern layout's ICR
pub const ICR_ORECF: u32 = 1 << 3;

impl RegisterLayout {
    pub const fn status(self) -> usize {
        match self {
            RegisterLayout::Legacy => 0x00,
            RegisterLayout::Modern => 0x1C,
        }
    }

    pub const fn rx_data(self) -> usize {
        match self {
            RegisterLayout::Legacy => 0x04,
            RegisterLayout::Modern => 0x24,
        }
    }

    pub const fn tx_data(self) -> usize {
        match self {
            RegisterLayout::Legacy => 0x04,
            RegisterLayout::Modern => 0x28,
        }
    }

    pub const fn brr(self) -> usize {
        match self {
            RegisterLayout::Legacy => 0x08,
            RegisterLayout::Modern => 0x0C,
        }
    }

    pub const fn cr1(self) -> usize {
        match self {
            RegisterLayout::Legacy => 0x0C,
            RegisterLayout::Modern => 0x00,
        }
    }

    pub const fn cr2(self) -> usize {
        match self {
            RegisterLayout::Legacy => 0x10,
            RegisterLayout::Modern => 0x04,
        }
    }

    pub const fn cr3(self) -> usize {
        match self {
            RegisterLayout::Legacy => 0x14,
            RegisterLayout::Modern => 0x08,
        }
    }

    /// Interrupt flag clear register.
    ///
    /// Legacy instances have none: reading SR then DR clears overrun.
    pub const fn icr(self) -> Option<usize> {
        match self {
            RegisterLayout::Legacy => None,
            RegisterLayout::Modern => Some(0x20),
        }
    }

    /// USART enable bit in CR1
    pub const fn cr1_ue(self) -> u32 {
        match self {
            RegisterLayout::Legacy => LEGACY_CR1_UE,
            RegisterLayout::Modern => MODERN_CR1_UE,
        }
    }

    /// Word-length bits of CR1 for a frame of `bits` bits including parity.
    ///
    /// Legacy instances only do 8 and 9 bit frames.
    pub const fn cr1_word_length(self, bits: u32) -> Option<u32> {
        match (self, bits) {
            (_, 8) => Some(0),
            (RegisterLayout::Legacy, 9) => Some(LEGACY_CR1_M),
            (RegisterLayout::Modern, 9) => Some(MODERN_CR1_M0),
            (RegisterLayout::Modern, 7) => Some(MODERN_CR1_M1),
            _ => None,
        }
    }
}

/// Status bit for `flag`; the same in both layouts
pub const fn status_bit(flag: Flag) -> u32 {
    match flag {
        Flag::RxNotEmpty => SR_RXNE,
        Flag::TxEmpty => SR_TXE,
        Flag::TxComplete => SR_TC,
    }
}

/// Frame length in bits, data plus parity
pub const fn frame_bits(line: &LineConfig) -> u32 {
    let data = match line.data_bits {
        DataBits::Seven => 7,
        DataBits::Eight => 8,
        DataBits::Nine => 9,
    };
    match line.parity {
        Parity::None => data,
        Parity::Even | Parity::Odd => data + 1,
    }
}

/// CR1 value for `line`, without the enable bit.
///
/// `None` if the layout cannot produce the frame.
pub const fn cr1_bits(layout: RegisterLayout, line: &LineConfig) -> Option<u32> {
    let word = match layout.cr1_word_length(frame_bits(line)) {
        Some(word) => word,
        None => return None,
    };
    let parity = match line.parity {
        Parity::None => 0,
        Parity::Even => CR1_PCE,
        Parity::Odd => CR1_PCE | CR1_PS,
    };
    Some(word | parity | CR1_TE | CR1_RE)
}

pub const fn cr2_stop_bits(stop_bits: StopBits) -> u32 {
    match stop_bits {
        StopBits::One => 0,
        StopBits::Two => CR2_STOP_2,
    }
}

pub const fn cr3_flow_bits(line: &LineConfig) -> u32 {
    let mut bits = 0;
    if line.flow_control.rts() {
        bits |= CR3_RTSE;
    }
    if line.flow_control.cts() {
        bits |= CR3_CTSE;
    }
    bits
}

/// BRR value for 16x oversampling, rounded to nearest.
///
/// `None` when the divider is out of range for the kernel clock.
pub const fn brr(pclk_hz: u32, baud_rate: u32) -> Option<u32> {
    if baud_rate == 0 {
        return None;
    }
    let div = (pclk_hz as u64 + baud_rate as u64 / 2) / baud_rate as u64;
    if div < 16 || div > 0xFFFF {
        return None;
    }
    Some(div as u32)
}
