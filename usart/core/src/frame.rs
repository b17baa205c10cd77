//! Character frames and their storage encoding

use core::fmt;

/// Storage width of one character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharWidth {
    /// Up to 8 data bits, stored in one byte
    Eight,
    /// 9 data bits, stored in two bytes (little-endian)
    Nine,
}

impl CharWidth {
    /// Number of bytes one frame occupies in a buffer
    pub const fn storage_bytes(self) -> usize {
        match self {
            CharWidth::Eight => 1,
            CharWidth::Nine => 2,
        }
    }

    /// Data mask covering every bit the width can hold
    pub const fn mask(self) -> u16 {
        match self {
            CharWidth::Eight => 0x00FF,
            CharWidth::Nine => 0x01FF,
        }
    }
}

impl fmt::Display for CharWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharWidth::Eight => write!(f, "8-bit"),
            CharWidth::Nine => write!(f, "9-bit"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CharWidth {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            CharWidth::Eight => defmt::write!(fmt, "8-bit"),
            CharWidth::Nine => defmt::write!(fmt, "9-bit"),
        }
    }
}

/// One logical character as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Frame(pub u16);

impl Frame {
    /// Create a frame from a raw value
    pub const fn new(value: u16) -> Self {
        Frame(value)
    }

    /// Get the raw frame value
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl From<u8> for Frame {
    fn from(byte: u8) -> Self {
        Frame(byte as u16)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#05x}", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Frame {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Frame({=u16:#x})", self.0);
    }
}

/// Converts between register values, frames and buffer slots.
///
/// The data mask is fixed when the codec is built and applied to every
/// value read from hardware; buffer addressing is always in whole frames,
/// so callers never deal with the storage width themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCodec {
    width: CharWidth,
    mask: u16,
}

impl FrameCodec {
    /// Codec whose mask covers the full storage width
    pub const fn new(width: CharWidth) -> Self {
        Self {
            width,
            mask: width.mask(),
        }
    }

    /// Codec with a narrower data mask (e.g. 0x7F for 7 data bits).
    ///
    /// The mask is clipped to what the storage width can hold.
    pub const fn with_mask(width: CharWidth, mask: u16) -> Self {
        Self {
            width,
            mask: mask & width.mask(),
        }
    }

    /// Storage width of each frame
    pub const fn width(&self) -> CharWidth {
        self.width
    }

    /// Data mask applied to raw register values
    pub const fn mask(&self) -> u16 {
        self.mask
    }

    /// Bytes per frame in a buffer
    pub const fn frame_bytes(&self) -> usize {
        self.width.storage_bytes()
    }

    /// Number of whole frames held in `len` bytes
    pub const fn frames_in(&self, len: usize) -> usize {
        len / self.width.storage_bytes()
    }

    /// Mask a raw data-register value down to the configured word length
    #[inline]
    pub const fn decode(&self, raw: u16) -> Frame {
        Frame(raw & self.mask)
    }

    /// Storage bytes of a frame; only the first `frame_bytes()` are meaningful
    #[inline]
    pub const fn to_bytes(&self, frame: Frame) -> [u8; 2] {
        match self.width {
            CharWidth::Eight => [frame.0 as u8, 0],
            CharWidth::Nine => (frame.0 & 0x01FF).to_le_bytes(),
        }
    }

    /// Rebuild a frame from its storage bytes
    #[inline]
    pub fn from_bytes(&self, bytes: &[u8]) -> Frame {
        match self.width {
            CharWidth::Eight => Frame(bytes[0] as u16),
            CharWidth::Nine => Frame(u16::from_le_bytes([bytes[0], bytes[1]]) & 0x01FF),
        }
    }

    /// Read the frame in slot `index` of `buf`
    pub fn load(&self, buf: &[u8], index: usize) -> Frame {
        let n = self.frame_bytes();
        self.from_bytes(&buf[index * n..index * n + n])
    }

    /// Write `frame` into slot `index` of `buf`
    pub fn store(&self, buf: &mut [u8], index: usize, frame: Frame) {
        let n = self.frame_bytes();
        let bytes = self.to_bytes(frame);
        buf[index * n..index * n + n].copy_from_slice(&bytes[..n]);
    }
}
