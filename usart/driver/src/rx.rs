//! Foreground receive path

use core::convert::Infallible;
use core::sync::atomic::Ordering;

use usart_core::{wait_until, Flag, Frame, System, UartError, UartResult, Usart};

use crate::uart::Uart;

impl<R: Usart, S: System> Uart<R, S> {
    /// Frames that can be read without waiting.
    ///
    /// The ring occupancy when it holds anything; otherwise 1 if the data
    /// register holds a character the interrupt has not taken yet, else 0.
    pub fn bytes_available(&self) -> usize {
        let buffered = self.rx.as_ref().map_or(0, |ring| ring.consumer().len());
        if buffered > 0 {
            return buffered;
        }
        usize::from(self.regs.flag(Flag::RxNotEmpty))
    }

    /// Wait up to `timeout_ms` for at least one frame.
    ///
    /// The system idle hook runs between polls. A timeout of 0 checks once.
    pub fn wait_for_data(&self, timeout_ms: u32) -> bool {
        wait_until(
            &self.system,
            timeout_ms,
            || self.bytes_available() > 0,
            || self.system.idle(),
        )
    }

    /// Take the next frame.
    ///
    /// The caller must have seen [`bytes_available`](Self::bytes_available)
    /// report data; with an empty ring this falls back to the data register.
    /// With buffering on and nothing received, returns `Frame(0)` without
    /// touching the register.
    pub fn read_one(&self) -> Frame {
        let Some(ring) = &self.rx else {
            return self.codec.decode(self.regs.read_data());
        };
        if let Some(frame) = ring.consumer().pop() {
            self.resume_rx();
            return frame;
        }

        // The interrupt may have taken the latched character since the pop.
        // Decide between ring and register with it held off.
        critical_section::with(|_| {
            let latched = self.regs.flag(Flag::RxNotEmpty);
            match ring.consumer().pop() {
                Some(frame) => {
                    self.clear_stall();
                    frame
                }
                None if latched => self.codec.decode(self.regs.read_data()),
                None => Frame(0),
            }
        })
    }

    /// Next frame if one is available, `WouldBlock` otherwise
    pub fn try_read(&self) -> nb::Result<Frame, Infallible> {
        if self.bytes_available() == 0 {
            return Err(nb::Error::WouldBlock);
        }
        Ok(self.read_one())
    }

    /// Fill `buf` with received frames.
    ///
    /// Waits up to the overall timeout for the first frame and up to the
    /// per-character timeout for each one after it. Returns the number of
    /// frames read, stopping early when the line goes quiet; fails with
    /// [`UartError::Timeout`] only if nothing arrived at all.
    pub fn read(&self, buf: &mut [Frame]) -> UartResult<usize> {
        let mut count = 0;
        let mut timeout_ms = self.config.timeout_ms;

        for slot in buf.iter_mut() {
            if !self.wait_for_data(timeout_ms) {
                break;
            }
            *slot = self.read_one();
            count += 1;
            timeout_ms = self.timeout_char_ms;
        }

        if count == 0 && !buf.is_empty() {
            return Err(UartError::Timeout);
        }
        Ok(count)
    }

    /// Re-enable the receive interrupt if it was held off by a full ring.
    ///
    /// Runs after a pop has made room. Clearing the stall and enabling the
    /// interrupt happen as one step so the interrupt cannot stall again in
    /// between and be left disabled.
    fn resume_rx(&self) {
        if !self.rx_stalled.load(Ordering::Acquire) {
            return;
        }
        critical_section::with(|_| self.clear_stall());
    }

    /// Caller holds the critical section
    fn clear_stall(&self) {
        if self.rx_stalled.load(Ordering::Acquire) {
            self.rx_stalled.store(false, Ordering::Release);
            self.regs.set_rx_interrupt(true);
        }
    }
}
