//! Line and driver configuration

use crate::frame::{CharWidth, FrameCodec};
use crate::{UartError, UartResult};

/// Largest receive ring capacity accepted by the driver
pub const MAX_RX_BUFFER_LEN: usize = u16::MAX as usize;

/// Default receive ring capacity
pub const DEFAULT_RX_BUFFER_LEN: usize = 64;

/// Bits assumed per character when deriving the minimum character timeout
/// (start + 9 data + parity + 2 stop, rounded up).
const BITS_PER_CHAR_BOUND: u32 = 13;

/// USART data bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// USART stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

/// USART parity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// USART hardware flow control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowControl {
    None,
    /// RTS deasserted while the receiver is stalled
    Rts,
    /// Transmission gated by CTS
    Cts,
    RtsCts,
}

impl FlowControl {
    /// RTS gates reception
    pub const fn rts(self) -> bool {
        matches!(self, FlowControl::Rts | FlowControl::RtsCts)
    }

    /// CTS gates transmission
    pub const fn cts(self) -> bool {
        matches!(self, FlowControl::Cts | FlowControl::RtsCts)
    }

    /// Any hardware flow control is active
    pub const fn is_enabled(self) -> bool {
        !matches!(self, FlowControl::None)
    }
}

/// Electrical framing of the line, handed to the hardware at bring-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineConfig {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
    pub flow_control: FlowControl,
}

impl LineConfig {
    /// 8 data bits, no parity, 1 stop bit, no flow control
    pub const fn new_8n1(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
            flow_control: FlowControl::None,
        }
    }

    /// Storage width of received and transmitted characters
    pub const fn char_width(&self) -> CharWidth {
        match self.data_bits {
            DataBits::Nine => CharWidth::Nine,
            DataBits::Seven | DataBits::Eight => CharWidth::Eight,
        }
    }

    /// Data mask matching the word length
    pub const fn char_mask(&self) -> u16 {
        match self.data_bits {
            DataBits::Seven => 0x007F,
            DataBits::Eight => 0x00FF,
            DataBits::Nine => 0x01FF,
        }
    }

    /// Codec for this line's character format
    pub const fn codec(&self) -> FrameCodec {
        FrameCodec::with_mask(self.char_width(), self.char_mask())
    }

    /// Shortest per-character timeout that still covers one character at
    /// this baud rate.
    pub const fn min_timeout_char_ms(&self) -> u32 {
        if self.baud_rate == 0 {
            return 0;
        }
        BITS_PER_CHAR_BOUND * 1000 / self.baud_rate + 1
    }
}

impl Default for LineConfig {
    fn default() -> Self {
        Self::new_8n1(115200)
    }
}

/// Full driver configuration for one USART instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartConfig {
    pub line: LineConfig,
    /// Overall timeout in milliseconds; bounds a whole transfer under CTS
    /// and the wait for the first character of a read.
    pub timeout_ms: u32,
    /// Per-character timeout in milliseconds
    pub timeout_char_ms: u32,
    /// Receive ring capacity in frames; 0 disables buffering.
    /// A ring of capacity N holds at most N - 1 frames.
    pub rx_buffer_len: usize,
}

impl UartConfig {
    /// Configuration with default timeouts and buffering for `line`
    pub const fn new(line: LineConfig) -> Self {
        Self {
            line,
            timeout_ms: 0,
            timeout_char_ms: 0,
            rx_buffer_len: DEFAULT_RX_BUFFER_LEN,
        }
    }

    pub const fn with_timeout(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub const fn with_timeout_char(mut self, timeout_char_ms: u32) -> Self {
        self.timeout_char_ms = timeout_char_ms;
        self
    }

    pub const fn with_rx_buffer_len(mut self, rx_buffer_len: usize) -> Self {
        self.rx_buffer_len = rx_buffer_len;
        self
    }

    pub const fn with_flow_control(mut self, flow_control: FlowControl) -> Self {
        self.line.flow_control = flow_control;
        self
    }

    /// Reject configurations the driver cannot honour
    pub fn validate(&self) -> UartResult<()> {
        if self.line.baud_rate == 0 {
            return Err(UartError::Config);
        }

        // A ninth data bit leaves no room for parity in the frame
        if self.line.data_bits == DataBits::Nine && self.line.parity != Parity::None {
            return Err(UartError::Config);
        }

        if self.rx_buffer_len > MAX_RX_BUFFER_LEN {
            return Err(UartError::Config);
        }

        Ok(())
    }

    /// Per-character timeout, raised to at least one character time
    pub const fn effective_timeout_char_ms(&self) -> u32 {
        let min = self.line.min_timeout_char_ms();
        if self.timeout_char_ms < min {
            min
        } else {
            self.timeout_char_ms
        }
    }
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::new(LineConfig::default())
    }
}
