//! Host-side simulation of a USART peripheral and its system services.
//!
//! [`SimUsart`] models the data and status registers closely enough to
//! drive the buffered USART driver from host tests: characters fed onto
//! the wire latch into the receive register one at a time, the receive
//! interrupt is reported as pending rather than delivered, and the transmit
//! side records every written character and can withhold TXE to play a
//! peer holding CTS. [`SimSystem`] supplies a wrapping millisecond clock
//! and counts idle calls and keyboard interrupts.

mod system;
mod usart;

pub use system::SimSystem;
pub use usart::{SimUsart, SENT_DEPTH, WIRE_DEPTH};
