//! File layout - where each trace starts and how many there are

use crate::error::{Result, SegyError};
use crate::reel::ReelHeader;
use crate::types::{ByteOrder, DataFormatCode};
use serde::{Deserialize, Serialize};

/// Length of the textual file header
pub const TEXT_HEADER_LEN: usize = 3200;

/// Length of the binary reel header
pub const REEL_HEADER_LEN: usize = 400;

/// Length of every trace header
pub const TRACE_HEADER_LEN: usize = 240;

/// Offset of the first trace
pub const DATA_OFFSET: u64 = (TEXT_HEADER_LEN + REEL_HEADER_LEN) as u64;

/// Offset of the data format code inside the reel header
pub const FORMAT_CODE_OFFSET: usize = 24;

/// Bytes per sample for a data format code; unknown codes count as 4
pub fn bytes_per_sample(code: u16) -> usize {
    DataFormatCode::from_code(code).map_or(4, |format| format.size_in_bytes())
}

/// Bytes from one trace header to the next
pub fn trace_stride(samples_per_trace: usize, code: u16) -> u64 {
    (TRACE_HEADER_LEN + samples_per_trace * bytes_per_sample(code)) as u64
}

/// Number of fixed-stride traces in a file of `file_size` bytes
pub fn trace_count(file_size: u64, stride: u64) -> Result<u64> {
    if file_size < DATA_OFFSET {
        return Err(SegyError::FileTooShort { size: file_size });
    }
    let payload = file_size - DATA_OFFSET;
    if stride == 0 || payload % stride != 0 {
        return Err(SegyError::NonUniformTraceLength { payload, stride });
    }
    Ok(payload / stride)
}

/// Infer the file byte order from the raw data format code bytes.
///
/// A code in 1..=8 when read little-endian means the file is little-endian;
/// anything else (including a big-endian valid code) means big-endian.
pub fn byte_order_from_format_bytes(bytes: [u8; 2]) -> ByteOrder {
    match u16::from_le_bytes(bytes) {
        1..=8 => ByteOrder::LittleEndian,
        _ => ByteOrder::BigEndian,
    }
}

/// Geometry of a fixed-length SEG-Y file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceLayout {
    pub byte_order: ByteOrder,
    /// Raw data format code from the reel header
    pub format_code: u16,
    pub samples_per_trace: usize,
    /// Bytes per trace including its header
    pub stride: u64,
    pub trace_count: u64,
    pub file_size: u64,
}

impl TraceLayout {
    /// Derive the layout from a decoded reel header and the file size
    pub fn new(reel: &ReelHeader, byte_order: ByteOrder, file_size: u64) -> Result<Self> {
        let samples_per_trace = reel.samples_per_trace as usize;
        let stride = trace_stride(samples_per_trace, reel.data_format_code);
        let trace_count = trace_count(file_size, stride)?;
        Ok(Self {
            byte_order,
            format_code: reel.data_format_code,
            samples_per_trace,
            stride,
            trace_count,
            file_size,
        })
    }

    pub fn bytes_per_sample(&self) -> usize {
        bytes_per_sample(self.format_code)
    }

    /// Bytes of sample data in one trace
    pub fn data_len(&self) -> usize {
        self.samples_per_trace * self.bytes_per_sample()
    }

    fn check_index(&self, index: u64) -> Result<()> {
        if index >= self.trace_count {
            return Err(SegyError::TraceIndexOutOfRange {
                index,
                count: self.trace_count,
            });
        }
        Ok(())
    }

    /// Offset of trace `index`'s header
    pub fn trace_offset(&self, index: u64) -> Result<u64> {
        self.check_index(index)?;
        Ok(DATA_OFFSET + self.stride * index)
    }

    /// Offset of sample `sample` in trace `index`
    pub fn sample_offset(&self, index: u64, sample: usize) -> Result<u64> {
        if sample >= self.samples_per_trace {
            return Err(SegyError::OutOfBounds {
                offset: sample,
                len: 1,
                available: self.samples_per_trace,
            });
        }
        Ok(self.trace_offset(index)?
            + TRACE_HEADER_LEN as u64
            + (sample * self.bytes_per_sample()) as u64)
    }

    /// Get a summary string of the layout
    pub fn summary(&self) -> String {
        format!(
            "{} traces x {} samples ({} bytes/sample, {}), {} bytes per trace",
            self.trace_count,
            self.samples_per_trace,
            self.bytes_per_sample(),
            self.byte_order,
            self.stride
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_per_sample() {
        let cases = [(1, 4), (2, 4), (3, 2), (4, 4), (5, 4), (8, 1), (0, 4), (6, 4), (99, 4)];
        for (code, width) in cases {
            assert_eq!(bytes_per_sample(code), width, "code {}", code);
        }
    }

    #[test]
    fn test_trace_count_formula() {
        let cases = [
            (0u64, 10usize, 1u16),
            (1, 1, 8),
            (10, 100, 1),
            (7, 1501, 3),
            (1000, 3, 8),
        ];
        for (n, s, code) in cases {
            let stride = trace_stride(s, code);
            let size = DATA_OFFSET + n * stride;
            assert_eq!(trace_count(size, stride).unwrap(), n);
        }
    }

    #[test]
    fn test_malformed_sizes() {
        assert!(matches!(
            trace_count(3599, 256),
            Err(SegyError::FileTooShort { size: 3599 })
        ));
        assert!(matches!(
            trace_count(3600 + 257, 256),
            Err(SegyError::NonUniformTraceLength { payload: 257, stride: 256 })
        ));
    }

    #[test]
    fn test_byte_order_inference() {
        for code in 1u16..=8 {
            assert_eq!(
                byte_order_from_format_bytes(code.to_le_bytes()),
                ByteOrder::LittleEndian
            );
            assert_eq!(
                byte_order_from_format_bytes(code.to_be_bytes()),
                ByteOrder::BigEndian
            );
        }
        for raw in [0u16, 9, 0x0900, u16::MAX] {
            assert_eq!(
                byte_order_from_format_bytes(raw.to_le_bytes()),
                ByteOrder::BigEndian
            );
        }
    }

    #[test]
    fn test_layout_offsets() {
        let reel = ReelHeader::new(1000, 100, DataFormatCode::IbmFloat);
        let layout = TraceLayout::new(&reel, ByteOrder::BigEndian, 3600 + 640 * 10).unwrap();
        assert_eq!(layout.stride, 640);
        assert_eq!(layout.trace_count, 10);
        assert_eq!(layout.data_len(), 400);
        assert_eq!(layout.trace_offset(2).unwrap(), 3600 + 1280);
        assert_eq!(layout.sample_offset(2, 3).unwrap(), 3600 + 1280 + 240 + 12);
        assert!(layout.trace_offset(10).is_err());
        assert!(layout.sample_offset(0, 100).is_err());
        assert!(layout.summary().starts_with("10 traces x 100 samples"));
    }
}
