//! Transmit engine

use core::fmt;

use usart_core::{spin_until, CharWidth, Flag, Frame, System, UartError, Usart};

use crate::flow::{TxBudget, TxTimeout};
use crate::uart::Uart;

/// A transfer that stopped early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxError {
    /// Frames accepted by the data register before the failure
    pub sent: usize,
    pub kind: UartError,
}

impl fmt::Display for TxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} after {} frames", self.kind, self.sent)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TxError {}

#[cfg(feature = "defmt")]
impl defmt::Format for TxError {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "TxError {{ sent: {=usize}, kind: {} }}", self.sent, self.kind);
    }
}

impl<R: Usart, S: System> Uart<R, S> {
    /// Transmit the frames encoded in `src`.
    ///
    /// `src` holds one byte per frame for 8-bit characters and two
    /// little-endian bytes per frame for 9-bit ones; a trailing odd byte is
    /// ignored. Each frame waits for TXE before it is written and the whole
    /// transfer waits for TC at the end. An empty transfer returns at once
    /// without touching the hardware.
    ///
    /// Returns the number of frames written, or the count reached when a
    /// wait timed out.
    pub fn send(&self, src: &[u8]) -> Result<usize, TxError> {
        let n = self.codec.frame_bytes();
        let count = self.codec.frames_in(src.len());
        self.transmit(count, |i| self.codec.from_bytes(&src[i * n..i * n + n]))
    }

    /// Transmit already decoded frames
    pub fn send_frames(&self, frames: &[Frame]) -> Result<usize, TxError> {
        self.transmit(frames.len(), |i| frames[i])
    }

    /// Transmit a string, ignoring timeouts.
    ///
    /// Used for console output where there is nobody to report to. On a
    /// 9-bit line each byte is sent as its own frame.
    pub fn write_str(&self, s: &str) {
        let bytes = s.as_bytes();
        let _ = match self.codec.width() {
            CharWidth::Eight => self.send(bytes),
            CharWidth::Nine => self.transmit(bytes.len(), |i| Frame::from(bytes[i])),
        };
    }

    fn transmit<F>(&self, count: usize, frame_at: F) -> Result<usize, TxError>
    where
        F: Fn(usize) -> Frame,
    {
        if count == 0 {
            return Ok(0);
        }

        let budget = TxTimeout::for_config(&self.config).begin(&self.system);

        for i in 0..count {
            if !self.wait_tx_flag(Flag::TxEmpty, &budget) {
                log::warn!("{}: TXE timeout after {} of {} frames", self.id, i, count);
                return Err(TxError {
                    sent: i,
                    kind: UartError::Timeout,
                });
            }
            let frame = frame_at(i);
            self.regs.write_data(frame.raw() & self.codec.mask());
        }

        if !self.wait_tx_flag(Flag::TxComplete, &budget) {
            log::warn!("{}: TC timeout after {} frames", self.id, count);
            return Err(TxError {
                sent: count,
                kind: UartError::Timeout,
            });
        }

        Ok(count)
    }

    /// TXE and TC raise no interrupt here, so spin instead of idling
    fn wait_tx_flag(&self, flag: Flag, budget: &TxBudget) -> bool {
        let timeout_ms = budget.next_wait_ms(&self.system);
        spin_until(&self.system, timeout_ms, || self.regs.flag(flag))
    }
}

impl<R: Usart, S: System> fmt::Write for &Uart<R, S> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Uart::write_str(*self, s);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tx_error_display() {
        let err = TxError {
            sent: 3,
            kind: UartError::Timeout,
        };
        assert_eq!(format!("{}", err), "operation timed out after 3 frames");
    }
}
