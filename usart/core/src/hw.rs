//! Hardware and system collaborator interfaces

use crate::config::LineConfig;
use crate::time::Clock;
use crate::UartResult;

/// USART status flags the driver waits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    /// Receive data register holds an unread character (RXNE)
    RxNotEmpty,
    /// Transmit data register can accept a character (TXE)
    TxEmpty,
    /// Last character has been fully shifted out (TC)
    TxComplete,
}

/// Register-level access to one USART peripheral.
///
/// All accessors take `&self`: the receive side is touched from interrupt
/// context and the transmit side from the foreground, and the two never
/// write the same register bits.
pub trait Usart {
    /// Current state of a status flag
    fn flag(&self, flag: Flag) -> bool;

    /// Read the receive data register.
    ///
    /// Side effect: clears [`Flag::RxNotEmpty`]. Never read speculatively;
    /// every call consumes one character from the hardware.
    fn read_data(&self) -> u16;

    /// Write the transmit data register
    fn write_data(&self, value: u16);

    /// Enable or disable the receive-not-empty interrupt source
    fn set_rx_interrupt(&self, enabled: bool);

    /// Bring the peripheral up with the given line settings
    fn bring_up(&mut self, line: &LineConfig) -> UartResult<()>;

    /// Disable the peripheral and release its resources
    fn shut_down(&mut self);
}

impl<T: Usart + ?Sized> Usart for &mut T {
    fn flag(&self, flag: Flag) -> bool {
        (**self).flag(flag)
    }

    fn read_data(&self) -> u16 {
        (**self).read_data()
    }

    fn write_data(&self, value: u16) {
        (**self).write_data(value)
    }

    fn set_rx_interrupt(&self, enabled: bool) {
        (**self).set_rx_interrupt(enabled)
    }

    fn bring_up(&mut self, line: &LineConfig) -> UartResult<()> {
        (**self).bring_up(line)
    }

    fn shut_down(&mut self) {
        (**self).shut_down()
    }
}

/// System services the driver needs besides the USART itself
pub trait System: Clock {
    /// Called between polls while waiting for received data.
    ///
    /// Typically waits for the next interrupt or runs pending event
    /// processing. Never called from transmit waits.
    fn idle(&self) {}

    /// Signal an out-of-band keyboard interrupt to the console owner
    fn keyboard_interrupt(&self) {}
}

impl<T: System + ?Sized> System for &T {
    fn idle(&self) {
        (**self).idle()
    }

    fn keyboard_interrupt(&self) {
        (**self).keyboard_interrupt()
    }
}
