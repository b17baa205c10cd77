//! Instance tables for the STM32F4 family

use crate::regs::RegisterLayout;
use crate::usart::Stm32Usart;

/// Register block base of USARTn/UARTn, `n` in 1..=8
pub const fn stm32f4_base(instance: u8) -> Option<usize> {
    match instance {
        1 => Some(0x4001_1000),
        2 => Some(0x4000_4400),
        3 => Some(0x4000_4800),
        4 => Some(0x4000_4C00),
        5 => Some(0x4000_5000),
        6 => Some(0x4001_1400),
        7 => Some(0x4000_7800),
        8 => Some(0x4000_7C00),
        _ => None,
    }
}

/// NVIC interrupt number of USARTn/UARTn
pub const fn stm32f4_irq(instance: u8) -> Option<u16> {
    match instance {
        1 => Some(37),
        2 => Some(38),
        3 => Some(39),
        4 => Some(52),
        5 => Some(53),
        6 => Some(71),
        7 => Some(82),
        8 => Some(83),
        _ => None,
    }
}

/// USART1 and USART6 sit on APB2, the rest on APB1
pub const fn stm32f4_on_apb2(instance: u8) -> bool {
    matches!(instance, 1 | 6)
}

impl Stm32Usart {
    /// Register block of STM32F4 instance `n`.
    ///
    /// # Safety
    ///
    /// Same contract as [`Stm32Usart::new`]: the instance must exist on the
    /// part, be clocked, and not be owned elsewhere.
    pub unsafe fn stm32f4(instance: u8, pclk_hz: u32) -> Option<Self> {
        let base = stm32f4_base(instance)?;
        Some(Self::new(base, RegisterLayout::Legacy, pclk_hz))
    }
}
