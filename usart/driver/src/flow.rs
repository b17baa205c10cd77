//! Transmit timeout policy

use usart_core::{Clock, Deadline, UartConfig};

/// How long each transmit wait may take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxTimeout {
    /// Every wait gets the same budget
    PerChar(u32),
    /// All waits of one transfer share a single budget
    Overall(u32),
}

impl TxTimeout {
    /// Policy for `config`.
    ///
    /// Under CTS the peer may hold the line for as long as the overall
    /// timeout allows, so the whole transfer is bounded by it. Otherwise a
    /// stalled flag can only mean a fault and each wait gets twice the
    /// per-character timeout.
    pub fn for_config(config: &UartConfig) -> Self {
        if config.line.flow_control.cts() {
            TxTimeout::Overall(config.timeout_ms)
        } else {
            TxTimeout::PerChar(config.effective_timeout_char_ms().saturating_mul(2))
        }
    }

    /// Start the clock for one transfer
    pub fn begin<C: Clock + ?Sized>(self, clock: &C) -> TxBudget {
        match self {
            TxTimeout::PerChar(ms) => TxBudget::PerChar(ms),
            TxTimeout::Overall(ms) => TxBudget::Overall(Deadline::start(clock, ms)),
        }
    }
}

/// Running budget of one transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxBudget {
    PerChar(u32),
    Overall(Deadline),
}

impl TxBudget {
    /// Budget for the next wait.
    ///
    /// Once an overall budget is spent this is 0, which still tests the
    /// flag once.
    pub fn next_wait_ms<C: Clock + ?Sized>(&self, clock: &C) -> u32 {
        match self {
            TxBudget::PerChar(ms) => *ms,
            TxBudget::Overall(deadline) => {
                let elapsed = deadline.elapsed_ms(clock.millis());
                deadline.timeout_ms().saturating_sub(elapsed)
            }
        }
    }
}
