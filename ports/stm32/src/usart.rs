use core::ptr;

use usart_core::{Flag, LineConfig, UartError, UartResult, Usart};

use crate::regs::{
    self, RegisterLayout, CR1_RXNEIE, CR2_STOP_MASK, CR3_CTSE, CR3_RTSE, ICR_ORECF,
};

/// Memory-mapped USART register block
#[derive(Debug)]
pub struct Stm32Usart {
    base: usize,
    layout: RegisterLayout,
    pclk_hz: u32,
}

impl Stm32Usart {
    /// Wrap the register block at `base`.
    ///
    /// `pclk_hz` is the kernel clock feeding the baud rate generator.
    ///
    /// # Safety
    ///
    /// `base` must be the address of a USART register block of the given
    /// layout, its clock must be enabled, and no other owner may access it
    /// while this value exists.
    pub const unsafe fn new(base: usize, layout: RegisterLayout, pclk_hz: u32) -> Self {
        Self {
            base,
            layout,
            pclk_hz,
        }
    }

    pub const fn base(&self) -> usize {
        self.base
    }

    pub const fn layout(&self) -> RegisterLayout {
        self.layout
    }

    #[inline]
    fn read(&self, offset: usize) -> u32 {
        // SAFETY: `new` guarantees `base` maps an owned register block
        unsafe { ptr::read_volatile((self.base + offset) as *const u32) }
    }

    #[inline]
    fn write(&self, offset: usize, value: u32) {
        // SAFETY: as in `read`
        unsafe { ptr::write_volatile((self.base + offset) as *mut u32, value) }
    }

    fn modify(&self, offset: usize, clear: u32, set: u32) {
        let value = self.read(offset);
        self.write(offset, (value & !clear) | set);
    }
}

impl Usart for Stm32Usart {
    fn flag(&self, flag: Flag) -> bool {
        self.read(self.layout.status()) & regs::status_bit(flag) != 0
    }

    fn read_data(&self) -> u16 {
        let value = (self.read(self.layout.rx_data()) & 0x1FF) as u16;
        // A latched overrun keeps the receive interrupt pending after RXNE
        // clears. Legacy parts drop it with the status then data read.
        if let Some(icr) = self.layout.icr() {
            self.write(icr, ICR_ORECF);
        }
        value
    }

    fn write_data(&self, value: u16) {
        self.write(self.layout.tx_data(), u32::from(value & 0x1FF));
    }

    fn set_rx_interrupt(&self, enabled: bool) {
        if enabled {
            self.modify(self.layout.cr1(), 0, CR1_RXNEIE);
        } else {
            self.modify(self.layout.cr1(), CR1_RXNEIE, 0);
        }
    }

    fn bring_up(&mut self, line: &LineConfig) -> UartResult<()> {
        let cr1 = regs::cr1_bits(self.layout, line).ok_or(UartError::Config)?;
        let brr = regs::brr(self.pclk_hz, line.baud_rate).ok_or(UartError::Config)?;
        let ue = self.layout.cr1_ue();

        // Frame format can only change with the USART disabled
        self.write(self.layout.cr1(), 0);
        self.write(self.layout.brr(), brr);
        self.modify(self.layout.cr2(), CR2_STOP_MASK, regs::cr2_stop_bits(line.stop_bits));
        self.modify(self.layout.cr3(), CR3_RTSE | CR3_CTSE, regs::cr3_flow_bits(line));
        self.write(self.layout.cr1(), cr1);
        self.write(self.layout.cr1(), cr1 | ue);
        Ok(())
    }

    fn shut_down(&mut self) {
        self.write(self.layout.cr1(), 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regs::{CR1_RE, CR1_TE, CR2_STOP_2, SR_RXNE, SR_TXE};
    use usart_core::{FlowControl, StopBits};

    /// Heap memory standing in for the register block.
    ///
    /// Owned through one raw pointer so the driver and the test reach it
    /// through the same provenance.
    struct Block(*mut [u32; 16]);

    impl Block {
        fn new() -> Self {
            Block(Box::into_raw(Box::new([0; 16])))
        }

        fn usart(&self, layout: RegisterLayout) -> Stm32Usart {
            unsafe { Stm32Usart::new(self.0 as usize, layout, 84_000_000) }
        }

        fn reg(&self, offset: usize) -> u32 {
            unsafe { ptr::read_volatile(self.0.cast::<u32>().add(offset / 4)) }
        }

        fn set(&self, offset: usize, value: u32) {
            unsafe { ptr::write_volatile(self.0.cast::<u32>().add(offset / 4), value) }
        }
    }

    impl Drop for Block {
        fn drop(&mut self) {
            drop(unsafe { Box::from_raw(self.0) });
        }
    }

    #[test]
    fn test_bring_up_legacy() {
        let block = Block::new();
        let mut usart = block.usart(RegisterLayout::Legacy);

        let mut line = LineConfig::new_8n1(115_200);
        line.stop_bits = StopBits::Two;
        line.flow_control = FlowControl::RtsCts;
        usart.bring_up(&line).unwrap();

        let layout = RegisterLayout::Legacy;
        assert_eq!(block.reg(layout.brr()), 729);
        assert_eq!(block.reg(layout.cr1()), CR1_TE | CR1_RE | layout.cr1_ue());
        assert_eq!(block.reg(layout.cr2()), CR2_STOP_2);
        assert_eq!(block.reg(layout.cr3()), CR3_RTSE | CR3_CTSE);
    }

    #[test]
    fn test_bring_up_rejects_unsupported_frame() {
        let block = Block::new();
        let mut usart = block.usart(RegisterLayout::Legacy);

        let mut line = LineConfig::new_8n1(115_200);
        line.data_bits = usart_core::DataBits::Seven;
        assert_eq!(usart.bring_up(&line), Err(UartError::Config));
        assert_eq!(block.reg(RegisterLayout::Legacy.cr1()), 0);
    }

    #[test]
    fn test_rx_interrupt_toggles_only_rxneie() {
        let block = Block::new();
        let layout = RegisterLayout::Modern;
        block.set(layout.cr1(), CR1_TE | CR1_RE | layout.cr1_ue());
        let usart = block.usart(layout);

        usart.set_rx_interrupt(true);
        assert_eq!(
            block.reg(layout.cr1()),
            CR1_TE | CR1_RE | layout.cr1_ue() | CR1_RXNEIE
        );

        usart.set_rx_interrupt(false);
        assert_eq!(block.reg(layout.cr1()), CR1_TE | CR1_RE | layout.cr1_ue());
    }

    #[test]
    fn test_flags_and_data_modern() {
        let block = Block::new();
        let layout = RegisterLayout::Modern;
        block.set(layout.status(), SR_RXNE | SR_TXE);
        block.set(layout.rx_data(), 0xFFFF_0142);
        let usart = block.usart(layout);

        assert!(usart.flag(Flag::RxNotEmpty));
        assert!(usart.flag(Flag::TxEmpty));
        assert!(!usart.flag(Flag::TxComplete));
        assert_eq!(usart.read_data(), 0x142);

        usart.write_data(0x41);
        assert_eq!(block.reg(layout.tx_data()), 0x41);
    }

    #[test]
    fn test_read_clears_overrun_modern() {
        let block = Block::new();
        let layout = RegisterLayout::Modern;
        block.set(layout.rx_data(), 0x55);
        let usart = block.usart(layout);

        assert_eq!(block.reg(0x20), 0);
        assert_eq!(usart.read_data(), 0x55);
        assert_eq!(block.reg(0x20), ICR_ORECF);
    }

    #[test]
    fn test_read_legacy_writes_nothing() {
        let block = Block::new();
        let layout = RegisterLayout::Legacy;
        block.set(layout.status(), SR_RXNE);
        block.set(layout.rx_data(), 0x1AA);
        let usart = block.usart(layout);

        assert_eq!(usart.read_data(), 0x1AA);
        for offset in (0..0x40).step_by(4) {
            let expected = match offset {
                0x00 => SR_RXNE,
                0x04 => 0x1AA,
                _ => 0,
            };
            assert_eq!(block.reg(offset), expected, "offset {:#x}", offset);
        }
    }
}
