//! Receive interrupt handler

use core::sync::atomic::Ordering;

use usart_core::{Flag, System, Usart};

use crate::uart::Uart;

impl<R: Usart, S: System> Uart<R, S> {
    /// Service the receive-not-empty interrupt.
    ///
    /// Called from the USART interrupt vector. Moves at most one character
    /// from the data register into the receive ring. When the ring is full
    /// the character is left in the register and the interrupt source is
    /// disabled until the reader makes room. While attached to the console,
    /// the interrupt character raises the keyboard-interrupt signal and is
    /// dropped.
    ///
    /// Never blocks, allocates or logs.
    pub fn on_rx_interrupt(&self) {
        if !self.regs.flag(Flag::RxNotEmpty) {
            return;
        }
        let Some(ring) = &self.rx else {
            return;
        };

        // Check for room before touching the data register: reading it is
        // what clears RXNE.
        let Some(slot) = ring.producer().reserve() else {
            self.rx_stalled.store(true, Ordering::Release);
            self.regs.set_rx_interrupt(false);
            return;
        };

        let frame = self.codec.decode(self.regs.read_data());
        if self.console_attached.load(Ordering::Acquire)
            && self.interrupt_char() == Some(frame)
        {
            self.system.keyboard_interrupt();
            return;
        }
        slot.commit(frame);
    }
}
