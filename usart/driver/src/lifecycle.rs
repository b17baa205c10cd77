//! Instance bring-up and teardown

use core::sync::atomic::{AtomicBool, AtomicU16};

use usart_core::{System, UartConfig, UartError, UartResult, Usart};

use crate::registry::UartId;
use crate::ring::RxRing;
use crate::uart::{Uart, DEFAULT_INTERRUPT_CHAR};

impl<R: Usart, S: System> Uart<R, S> {
    /// Bring `regs` up with `config` and return the running instance.
    ///
    /// The receive ring is allocated here, before the receive interrupt is
    /// enabled, and the interrupt is only enabled when buffering is on.
    /// Any bring-up failure is reported as [`UartError::Config`].
    pub fn configure(id: UartId, mut regs: R, system: S, config: UartConfig) -> UartResult<Self> {
        if let Err(err) = config.validate() {
            log::warn!("{}: rejected configuration {:?}", id, config);
            return Err(err);
        }

        if regs.bring_up(&config.line).is_err() {
            log::warn!("{}: hardware bring-up failed", id);
            return Err(UartError::Config);
        }

        let codec = config.line.codec();
        let rx = match config.rx_buffer_len {
            0 => None,
            len => Some(RxRing::new(len, codec)),
        };
        regs.set_rx_interrupt(rx.is_some());

        log::debug!(
            "{}: {} baud, {} chars, flow {:?}, rx ring {}",
            id,
            config.line.baud_rate,
            codec.width(),
            config.line.flow_control,
            config.rx_buffer_len
        );

        Ok(Self {
            id,
            regs,
            system,
            config,
            codec,
            timeout_char_ms: config.effective_timeout_char_ms(),
            rx,
            rx_stalled: AtomicBool::new(false),
            console_attached: AtomicBool::new(false),
            interrupt_char: AtomicU16::new(DEFAULT_INTERRUPT_CHAR),
        })
    }

    /// Disable the receive interrupt, shut the peripheral down and hand the
    /// register block back. Unread frames are discarded with the ring.
    pub fn teardown(mut self) -> R {
        self.regs.set_rx_interrupt(false);
        self.regs.shut_down();

        let pending = self.rx.as_ref().map_or(0, |ring| ring.consumer().len());
        if pending > 0 {
            log::debug!("{}: dropping {} unread frames", self.id, pending);
        }
        log::debug!("{}: deinitialised", self.id);

        self.regs
    }
}
