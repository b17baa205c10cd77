#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![forbid(unsafe_code)]

//! # Buffered USART driver
//!
//! Interrupt-driven receive into a per-instance ring buffer, polled transmit
//! with flow-control aware timeouts, and a registry of configured instances.
//!
//! Received characters are moved into the ring by
//! [`Uart::on_rx_interrupt`] and drained by the foreground through
//! [`Uart::read_one`], [`Uart::read`] or [`Uart::try_read`]. Hardware access
//! goes through the [`Usart`] trait and timekeeping through [`System`], so
//! the same driver runs against real registers and the host simulator.

extern crate alloc;

pub mod flow;
pub mod irq;
pub mod lifecycle;
pub mod registry;
pub mod ring;
pub mod rx;
pub mod tx;
pub mod uart;

pub use flow::{TxBudget, TxTimeout};
pub use registry::{Registry, UartId, MAX_UARTS};
pub use ring::{RxConsumer, RxProducer, RxRing, RxSlot};
pub use tx::TxError;
pub use uart::{Uart, DEFAULT_INTERRUPT_CHAR};

pub use usart_core::*;
