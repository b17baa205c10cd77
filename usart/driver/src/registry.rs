//! Instance ids and the table of configured USARTs
//!
//! The registry is an ordinary value owned by board code. Interrupt vectors
//! reach it through whatever shared placement the board chooses and call
//! [`Registry::on_rx_interrupt`] with their instance id.

use core::fmt;

use usart_core::{System, UartConfig, UartError, UartResult, Usart};

use crate::uart::Uart;

/// Number of USART instances the registry can track
pub const MAX_UARTS: usize = 8;

/// USART instance id, 1-based as in the reference manuals
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UartId(u8);

impl UartId {
    pub const UART1: UartId = UartId(1);
    pub const UART2: UartId = UartId(2);
    pub const UART3: UartId = UartId(3);
    pub const UART4: UartId = UartId(4);
    pub const UART5: UartId = UartId(5);
    pub const UART6: UartId = UartId(6);
    pub const UART7: UartId = UartId(7);
    pub const UART8: UartId = UartId(8);

    /// Validate a raw instance number
    pub const fn new(n: u8) -> UartResult<Self> {
        if n == 0 || n as usize > MAX_UARTS {
            Err(UartError::InvalidId)
        } else {
            Ok(UartId(n))
        }
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Zero-based slot index
    pub const fn index(self) -> usize {
        self.0 as usize - 1
    }
}

impl fmt::Display for UartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UART{}", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for UartId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "UART{=u8}", self.0);
    }
}

/// Table of configured instances indexed by [`UartId`]
pub struct Registry<R, S> {
    slots: [Option<Uart<R, S>>; MAX_UARTS],
}

impl<R: Usart, S: System> Registry<R, S> {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
        }
    }

    /// Configure `id`, tearing down whatever was configured there before.
    ///
    /// On failure the slot is left empty.
    pub fn configure(
        &mut self,
        id: UartId,
        regs: R,
        system: S,
        config: UartConfig,
    ) -> UartResult<&Uart<R, S>> {
        if let Some(previous) = self.slots[id.index()].take() {
            log::debug!("{}: reconfiguring", id);
            previous.teardown();
        }

        let uart = Uart::configure(id, regs, system, config)?;
        log::info!("{}: configured", id);
        Ok(self.slots[id.index()].insert(uart))
    }

    /// Tear down `id` and hand its register block back
    pub fn teardown(&mut self, id: UartId) -> UartResult<R> {
        match self.slots[id.index()].take() {
            Some(uart) => Ok(uart.teardown()),
            None => Err(UartError::NotConfigured),
        }
    }

    /// Tear down every configured instance
    pub fn deinit_all(&mut self) {
        for slot in self.slots.iter_mut() {
            if let Some(uart) = slot.take() {
                uart.teardown();
            }
        }
    }

    /// Instance configured under `id`, if any
    pub fn get(&self, id: UartId) -> Option<&Uart<R, S>> {
        self.slots[id.index()].as_ref()
    }

    pub fn is_configured(&self, id: UartId) -> bool {
        self.slots[id.index()].is_some()
    }

    /// Attach or detach `id` as the console stream
    pub fn attach_console(&self, id: UartId, attached: bool) -> UartResult<()> {
        let uart = self.get(id).ok_or(UartError::NotConfigured)?;
        uart.attach_console(attached);
        log::debug!("{}: console {}", id, if attached { "attached" } else { "detached" });
        Ok(())
    }

    /// Receive interrupt vector for `id`; unconfigured ids are ignored
    pub fn on_rx_interrupt(&self, id: UartId) {
        if let Some(uart) = self.get(id) {
            uart.on_rx_interrupt();
        }
    }

    /// Configured instances in id order
    pub fn iter(&self) -> impl Iterator<Item = &Uart<R, S>> {
        self.slots.iter().flatten()
    }
}

impl<R: Usart, S: System> Default for Registry<R, S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uart_id_range() {
        assert_eq!(UartId::new(0), Err(UartError::InvalidId));
        assert_eq!(UartId::new(9), Err(UartError::InvalidId));
        assert_eq!(UartId::new(1), Ok(UartId::UART1));
        assert_eq!(UartId::new(8), Ok(UartId::UART8));
    }

    #[test]
    fn test_uart_id_index() {
        assert_eq!(UartId::UART1.index(), 0);
        assert_eq!(UartId::UART8.index(), MAX_UARTS - 1);
        assert_eq!(UartId::UART3.raw(), 3);
    }

    #[test]
    fn test_uart_id_display() {
        assert_eq!(format!("{}", UartId::UART6), "UART6");
    }
}
