//! Core data types for SEG-Y

use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte order of the multi-byte header and sample fields in a file.
///
/// SEG-Y carries no byte-order marker, so this is inferred once per file from
/// the stored data format code (see [`crate::layout::byte_order_from_format_bytes`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum ByteOrder {
    /// Most significant byte first (the SEG-Y standard order)
    #[default]
    BigEndian = 0,
    /// Least significant byte first
    LittleEndian = 1,
}

impl ByteOrder {
    /// Convert from the boundary value (0 = big, 1 = little)
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ByteOrder::BigEndian),
            1 => Some(ByteOrder::LittleEndian),
            _ => None,
        }
    }

    pub fn is_big_endian(&self) -> bool {
        matches!(self, ByteOrder::BigEndian)
    }

    /// Whether values in this order must be swapped on this host
    pub fn needs_swap(&self) -> bool {
        match self {
            ByteOrder::BigEndian => cfg!(target_endian = "little"),
            ByteOrder::LittleEndian => cfg!(target_endian = "big"),
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteOrder::BigEndian => write!(f, "big-endian"),
            ByteOrder::LittleEndian => write!(f, "little-endian"),
        }
    }
}

/// On-disk encoding of trace samples (reel header bytes 24-25)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum DataFormatCode {
    /// 4-byte IBM hexadecimal floating point
    IbmFloat = 1,
    /// 4-byte two's complement integer
    Int32 = 2,
    /// 2-byte two's complement integer
    Int16 = 3,
    /// 4-byte fixed point with gain (obsolete)
    FixedPointGain = 4,
    /// 4-byte IEEE 754 floating point
    IeeeFloat = 5,
    /// 1-byte two's complement integer
    Int8 = 8,
}

impl DataFormatCode {
    /// Get the format from its raw code
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(DataFormatCode::IbmFloat),
            2 => Some(DataFormatCode::Int32),
            3 => Some(DataFormatCode::Int16),
            4 => Some(DataFormatCode::FixedPointGain),
            5 => Some(DataFormatCode::IeeeFloat),
            8 => Some(DataFormatCode::Int8),
            _ => None,
        }
    }

    /// Raw code as stored in the reel header
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Size in bytes of one sample in this format
    pub fn size_in_bytes(&self) -> usize {
        match self {
            DataFormatCode::IbmFloat
            | DataFormatCode::Int32
            | DataFormatCode::FixedPointGain
            | DataFormatCode::IeeeFloat => 4,
            DataFormatCode::Int16 => 2,
            DataFormatCode::Int8 => 1,
        }
    }

    /// Check if this is a floating point format
    pub fn is_float(&self) -> bool {
        matches!(self, DataFormatCode::IbmFloat | DataFormatCode::IeeeFloat)
    }
}

impl fmt::Display for DataFormatCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}
