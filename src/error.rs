//! Error types for SEG-Y operations

use thiserror::Error;

/// Main error type for SEG-Y operations
#[derive(Error, Debug)]
pub enum SegyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File too short: {size} bytes, a SEG-Y file needs at least 3600")]
    FileTooShort { size: u64 },

    #[error("Non-uniform trace length: {payload} trace bytes is not a multiple of stride {stride}")]
    NonUniformTraceLength { payload: u64, stride: u64 },

    #[error("Out of bounds: {len} bytes at offset {offset}, buffer holds {available}")]
    OutOfBounds {
        offset: usize,
        len: usize,
        available: usize,
    },

    #[error("Unsupported data format code: {0}")]
    UnsupportedFormat(u16),

    #[error("Sample count mismatch: expected {expected}, got {actual}")]
    SampleCountMismatch { expected: usize, actual: usize },

    #[error("Trace index {index} out of range, file holds {count} traces")]
    TraceIndexOutOfRange { index: u64, count: u64 },

    #[error("Invalid extraction window: {0}")]
    InvalidWindow(String),

    #[error("Unknown header field: {0}")]
    UnknownField(String),

    #[error("Write order violated: {0}")]
    WriteOrder(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Specialized Result type for SEG-Y operations
pub type Result<T> = std::result::Result<T, SegyError>;

impl From<serde_json::Error> for SegyError {
    fn from(err: serde_json::Error) -> Self {
        SegyError::Serialization(err.to_string())
    }
}
