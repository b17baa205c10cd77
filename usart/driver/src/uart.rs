//! Per-instance driver state

use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use usart_core::{CharWidth, Frame, FrameCodec, UartConfig};

use crate::registry::UartId;
use crate::ring::RxRing;

/// Default console interrupt character (Ctrl-C)
pub const DEFAULT_INTERRUPT_CHAR: u16 = 0x03;

/// Stored in place of an interrupt character when interception is off.
/// No masked frame can take this value.
const NO_INTERRUPT_CHAR: u16 = u16::MAX;

/// One configured USART instance.
///
/// Foreground operations (`bytes_available`, `wait_for_data`, `read_one`,
/// `send`, ...) and the receive interrupt entry point all take `&self`.
/// The receive ring is the only state both sides write, and its indices are
/// split between them; everything else the interrupt reads is set up before
/// the interrupt is enabled or stored atomically.
pub struct Uart<R, S> {
    pub(crate) id: UartId,
    pub(crate) regs: R,
    pub(crate) system: S,
    pub(crate) config: UartConfig,
    pub(crate) codec: FrameCodec,
    /// Per-character timeout after applying the one-character floor
    pub(crate) timeout_char_ms: u32,
    /// `None` when buffering is disabled
    pub(crate) rx: Option<RxRing>,
    /// Set by the interrupt when it stops servicing a full ring
    pub(crate) rx_stalled: AtomicBool,
    pub(crate) console_attached: AtomicBool,
    pub(crate) interrupt_char: AtomicU16,
}

impl<R, S> Uart<R, S> {
    /// Instance id this USART was configured under
    pub fn id(&self) -> UartId {
        self.id
    }

    /// Configuration the instance was brought up with
    pub fn config(&self) -> &UartConfig {
        &self.config
    }

    /// Storage width of each character
    pub fn char_width(&self) -> CharWidth {
        self.codec.width()
    }

    /// Data mask applied to every received and transmitted character
    pub fn char_mask(&self) -> u16 {
        self.codec.mask()
    }

    /// Per-character timeout in effect
    pub fn timeout_char_ms(&self) -> u32 {
        self.timeout_char_ms
    }

    /// Receive ring capacity in slots; 0 when buffering is disabled
    pub fn rx_capacity(&self) -> usize {
        self.rx.as_ref().map_or(0, RxRing::capacity)
    }

    /// Always true: [`configure`](Self::configure) only returns a running
    /// instance and [`teardown`](Self::teardown) consumes it.
    pub fn is_enabled(&self) -> bool {
        true
    }

    /// Whether the receive interrupt is currently held off by a full ring
    pub fn is_rx_stalled(&self) -> bool {
        self.rx_stalled.load(Ordering::Acquire)
    }

    /// Route the interrupt character to the keyboard-interrupt signal
    /// instead of the receive ring
    pub fn attach_console(&self, attached: bool) {
        self.console_attached.store(attached, Ordering::Release);
    }

    pub fn is_console_attached(&self) -> bool {
        self.console_attached.load(Ordering::Acquire)
    }

    /// Change the character intercepted while attached; `None` disables
    /// interception.
    pub fn set_interrupt_char(&self, value: Option<u16>) {
        let raw = value.unwrap_or(NO_INTERRUPT_CHAR);
        self.interrupt_char.store(raw, Ordering::Release);
    }

    pub fn interrupt_char(&self) -> Option<Frame> {
        match self.interrupt_char.load(Ordering::Acquire) {
            NO_INTERRUPT_CHAR => None,
            raw => Some(Frame(raw)),
        }
    }

    /// Register access for the owning port
    pub fn regs(&self) -> &R {
        &self.regs
    }

    /// System services the instance was configured with
    pub fn system(&self) -> &S {
        &self.system
    }
}
