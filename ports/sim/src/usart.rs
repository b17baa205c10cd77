use std::cell::{Cell, RefCell};

use heapless::{Deque, Vec};
use usart_core::{Flag, LineConfig, UartError, UartResult, Usart};

/// Characters that can be queued on the wire behind the receive register
pub const WIRE_DEPTH: usize = 64;

/// Transmitted characters kept for inspection
pub const SENT_DEPTH: usize = 256;

/// Simulated USART register block.
///
/// The driver is handed `&SimUsart`; tests keep their own reference to
/// feed the wire and inspect what happened.
#[derive(Default)]
pub struct SimUsart {
    line: Cell<Option<LineConfig>>,
    fail_bring_up: Cell<bool>,
    powered: Cell<bool>,

    wire: RefCell<Deque<u16, WIRE_DEPTH>>,
    data: Cell<Option<u16>>,
    overruns: Cell<usize>,
    rx_irq: Cell<bool>,
    reads: Cell<usize>,

    tx_hold: Cell<usize>,
    tx_limit: Cell<Option<usize>>,
    tc_stuck: Cell<bool>,
    tx_polls: Cell<usize>,
    sent: RefCell<Vec<u16, SENT_DEPTH>>,
}

impl SimUsart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a character on the wire.
    ///
    /// It latches into the receive register if that is empty and queues
    /// behind it otherwise. Characters beyond [`WIRE_DEPTH`] are lost and
    /// counted as overruns.
    pub fn feed(&self, value: u16) {
        if self.data.get().is_none() {
            self.data.set(Some(value));
            return;
        }
        if self.wire.borrow_mut().push_back(value).is_err() {
            self.overruns.set(self.overruns.get() + 1);
        }
    }

    pub fn feed_all(&self, values: &[u16]) {
        for &value in values {
            self.feed(value);
        }
    }

    /// Feed each byte of `bytes` as one character
    pub fn feed_bytes(&self, bytes: &[u8]) {
        for &byte in bytes {
            self.feed(u16::from(byte));
        }
    }

    /// Whether the receive register holds a character
    pub fn rx_pending(&self) -> bool {
        self.data.get().is_some()
    }

    /// Characters waiting on the wire, including the latched one
    pub fn rx_backlog(&self) -> usize {
        usize::from(self.rx_pending()) + self.wire.borrow().len()
    }

    /// RXNE is set with the receive interrupt enabled
    pub fn irq_pending(&self) -> bool {
        self.rx_irq.get() && self.rx_pending()
    }

    pub fn is_rx_interrupt_enabled(&self) -> bool {
        self.rx_irq.get()
    }

    /// Reads of the receive data register so far
    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    pub fn overruns(&self) -> usize {
        self.overruns.get()
    }

    /// Make the next bring-up fail
    pub fn fail_bring_up(&self, fail: bool) {
        self.fail_bring_up.set(fail);
    }

    /// Line settings of the last successful bring-up
    pub fn line(&self) -> Option<LineConfig> {
        self.line.get()
    }

    pub fn is_powered(&self) -> bool {
        self.powered.get()
    }

    /// Report TXE clear for the next `polls` polls, as a peer holding CTS
    pub fn hold_tx(&self, polls: usize) {
        self.tx_hold.set(polls);
    }

    /// Let `writes` more characters through, then keep TXE clear for good
    pub fn limit_tx(&self, writes: usize) {
        self.tx_limit.set(Some(writes));
    }

    /// Keep TC clear regardless of transmit progress
    pub fn stick_tc(&self, stuck: bool) {
        self.tc_stuck.set(stuck);
    }

    /// Polls of TXE or TC so far
    pub fn tx_polls(&self) -> usize {
        self.tx_polls.get()
    }

    /// Copy of every character written to the transmit register
    pub fn sent(&self) -> Vec<u16, SENT_DEPTH> {
        self.sent.borrow().clone()
    }

    /// Transmitted characters narrowed to bytes
    pub fn sent_bytes(&self) -> std::vec::Vec<u8> {
        self.sent.borrow().iter().map(|&value| value as u8).collect()
    }

    pub fn clear_sent(&self) {
        self.sent.borrow_mut().clear();
    }

    fn tx_empty(&self) -> bool {
        let hold = self.tx_hold.get();
        if hold > 0 {
            self.tx_hold.set(hold - 1);
            return false;
        }
        self.tx_limit.get() != Some(0)
    }
}

impl Usart for &SimUsart {
    fn flag(&self, flag: Flag) -> bool {
        match flag {
            Flag::RxNotEmpty => self.rx_pending(),
            Flag::TxEmpty => {
                self.tx_polls.set(self.tx_polls.get() + 1);
                self.tx_empty()
            }
            Flag::TxComplete => {
                self.tx_polls.set(self.tx_polls.get() + 1);
                !self.tc_stuck.get()
            }
        }
    }

    fn read_data(&self) -> u16 {
        self.reads.set(self.reads.get() + 1);
        let value = self.data.take().unwrap_or(0);
        self.data.set(self.wire.borrow_mut().pop_front());
        value
    }

    fn write_data(&self, value: u16) {
        // Overflowing the log only loses inspection history
        let _ = self.sent.borrow_mut().push(value);
        if let Some(left) = self.tx_limit.get() {
            self.tx_limit.set(Some(left.saturating_sub(1)));
        }
    }

    fn set_rx_interrupt(&self, enabled: bool) {
        self.rx_irq.set(enabled);
    }

    fn bring_up(&mut self, line: &LineConfig) -> UartResult<()> {
        if self.fail_bring_up.get() {
            return Err(UartError::Config);
        }
        self.line.set(Some(*line));
        self.powered.set(true);
        Ok(())
    }

    fn shut_down(&mut self) {
        self.powered.set(false);
        self.rx_irq.set(false);
    }
}
