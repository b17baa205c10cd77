#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![forbid(unsafe_code)]

//! # USART Core
//!
//! Core types shared by the buffered USART driver and its ports: the error
//! type, the frame codec for 8-bit and 9-bit characters, line and driver
//! configuration, the bounded wait primitive, and the traits through which
//! the driver reaches the hardware and the rest of the system.

use core::fmt;

pub mod config;
pub mod frame;
pub mod hw;
pub mod time;

pub use config::*;
pub use frame::*;
pub use hw::*;
pub use time::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type used throughout the driver
pub type UartResult<T> = Result<T, UartError>;

/// Error kinds reported by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UartError {
    /// A bounded wait did not succeed before its deadline
    Timeout,
    /// The hardware could not be brought up with the requested configuration
    Config,
    /// Instance id outside the supported range
    InvalidId,
    /// No instance is configured under the given id
    NotConfigured,
}

impl fmt::Display for UartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UartError::Timeout => write!(f, "operation timed out"),
            UartError::Config => write!(f, "hardware configuration failed"),
            UartError::InvalidId => write!(f, "invalid USART instance id"),
            UartError::NotConfigured => write!(f, "USART instance not configured"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UartError {}

#[cfg(feature = "defmt")]
impl defmt::Format for UartError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            UartError::Timeout => defmt::write!(fmt, "Timeout"),
            UartError::Config => defmt::write!(fmt, "Config"),
            UartError::InvalidId => defmt::write!(fmt, "InvalidId"),
            UartError::NotConfigured => defmt::write!(fmt, "NotConfigured"),
        }
    }
}
