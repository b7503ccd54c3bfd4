//! Per-format sample decoding and encoding.
//!
//! Every on-disk encoding is normalized to `f32`. Samples are independent of
//! each other, so whole traces can be converted in parallel with each task
//! owning one output slot.

use crate::error::{Result, SegyError};
use crate::ibm::{f32_to_ibm, ibm_to_f32};
use crate::layout::bytes_per_sample;
use crate::primitive::{read_array, read_i8, write_bytes, write_f32, write_i16, write_i32, write_i8};
use crate::swap::swap_if;
use crate::types::{ByteOrder, DataFormatCode};
use num_traits::{Bounded, NumCast, Zero};
use rayon::prelude::*;

/// Decode one sample at `offset`.
///
/// Codes outside {1,2,3,4,5,8} decode to `0.0`; callers should treat that as
/// a data-quality warning.
#[inline]
pub fn decode_sample(buf: &[u8], offset: usize, order: ByteOrder, code: u16) -> Result<f32> {
    let swap = order.needs_swap();
    let value = match DataFormatCode::from_code(code) {
        Some(DataFormatCode::IbmFloat) => ibm_to_f32(read_array(buf, offset)?.0),
        Some(DataFormatCode::Int32 | DataFormatCode::FixedPointGain) => {
            swap_if(i32::from_ne_bytes(read_array(buf, offset)?.0), swap) as f32
        }
        Some(DataFormatCode::Int16) => {
            swap_if(i16::from_ne_bytes(read_array(buf, offset)?.0), swap) as f32
        }
        Some(DataFormatCode::IeeeFloat) => {
            swap_if(f32::from_ne_bytes(read_array(buf, offset)?.0), swap)
        }
        Some(DataFormatCode::Int8) => read_i8(buf, offset)?.0 as f32,
        None => 0.0,
    };
    Ok(value)
}

/// Truncate toward zero, saturating at the target range; NaN becomes zero
fn narrow<T: NumCast + Bounded + Zero>(value: f32) -> T {
    if value.is_nan() {
        return T::zero();
    }
    <T as NumCast>::from(value.trunc()).unwrap_or_else(|| {
        if value < 0.0 {
            T::min_value()
        } else {
            T::max_value()
        }
    })
}

/// Encode one sample at `offset`
#[inline]
pub fn encode_sample(
    buf: &mut [u8],
    offset: usize,
    value: f32,
    order: ByteOrder,
    code: u16,
) -> Result<()> {
    match DataFormatCode::from_code(code) {
        Some(DataFormatCode::IbmFloat) => write_bytes(buf, offset, &f32_to_ibm(value))?,
        Some(DataFormatCode::Int32 | DataFormatCode::FixedPointGain) => {
            write_i32(buf, offset, narrow(value), order)?
        }
        Some(DataFormatCode::Int16) => write_i16(buf, offset, narrow(value), order)?,
        Some(DataFormatCode::IeeeFloat) => write_f32(buf, offset, value, order)?,
        Some(DataFormatCode::Int8) => write_i8(buf, offset, narrow(value))?,
        None => return Err(SegyError::UnsupportedFormat(code)),
    };
    Ok(())
}

/// Decode `out.len()` samples from `bytes` into `out`
pub fn decode_trace_into(
    bytes: &[u8],
    out: &mut [f32],
    order: ByteOrder,
    code: u16,
    parallel: bool,
) -> Result<()> {
    let width = bytes_per_sample(code);
    let needed = out.len() * width;
    if bytes.len() < needed {
        return Err(SegyError::OutOfBounds {
            offset: 0,
            len: needed,
            available: bytes.len(),
        });
    }
    let chunks = &bytes[..needed];

    if parallel {
        out.par_iter_mut()
            .zip(chunks.par_chunks_exact(width))
            .try_for_each(|(slot, chunk)| -> Result<()> {
                *slot = decode_sample(chunk, 0, order, code)?;
                Ok(())
            })
    } else {
        for (slot, chunk) in out.iter_mut().zip(chunks.chunks_exact(width)) {
            *slot = decode_sample(chunk, 0, order, code)?;
        }
        Ok(())
    }
}

/// Decode a trace's sample array
pub fn decode_trace(
    bytes: &[u8],
    samples: usize,
    order: ByteOrder,
    code: u16,
    parallel: bool,
) -> Result<Vec<f32>> {
    let mut out = vec![0.0f32; samples];
    decode_trace_into(bytes, &mut out, order, code, parallel)?;
    Ok(out)
}

/// Encode a trace's sample array into a pre-sized buffer
pub fn encode_trace(
    samples: &[f32],
    order: ByteOrder,
    code: u16,
    parallel: bool,
) -> Result<Vec<u8>> {
    if DataFormatCode::from_code(code).is_none() {
        return Err(SegyError::UnsupportedFormat(code));
    }
    let width = bytes_per_sample(code);
    let mut out = vec![0u8; samples.len() * width];

    if parallel {
        out.par_chunks_exact_mut(width)
            .zip(samples.par_iter())
            .try_for_each(|(chunk, &value)| encode_sample(chunk, 0, value, order, code))?;
    } else {
        for (chunk, &value) in out.chunks_exact_mut(width).zip(samples) {
            encode_sample(chunk, 0, value, order, code)?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDERS: [ByteOrder; 2] = [ByteOrder::BigEndian, ByteOrder::LittleEndian];

    #[test]
    fn test_exact_formats_round_trip() {
        let cases: &[(u16, &[f32])] = &[
            (2, &[0.0, 1.0, -1.0, 2_000_000.0, -16_777_216.0][..]),
            (3, &[0.0, 1.0, -1.0, 32_767.0, -32_768.0][..]),
            (5, &[0.0, 1.0, -1.5, 100.25, f32::MAX, f32::MIN_POSITIVE][..]),
            (8, &[0.0, 1.0, -1.0, 127.0, -128.0][..]),
        ];
        for order in ORDERS {
            for &(code, values) in cases {
                let bytes = encode_trace(values, order, code, false).unwrap();
                assert_eq!(bytes.len(), values.len() * bytes_per_sample(code));
                let back = decode_trace(&bytes, values.len(), order, code, false).unwrap();
                assert_eq!(back, values, "code {} {:?}", code, order);
            }
        }
    }

    #[test]
    fn test_ibm_format_within_granularity() {
        let values = [0.0f32, 1.0, -118.625, 3.141_592_7, 1.0e-5, -6.5e7];
        for order in ORDERS {
            let bytes = encode_trace(&values, order, 1, false).unwrap();
            let back = decode_trace(&bytes, values.len(), order, 1, false).unwrap();
            for (v, b) in values.iter().zip(&back) {
                assert!((v - b).abs() <= v.abs() * 1.0e-6, "{} vs {}", v, b);
            }
        }
    }

    #[test]
    fn test_ibm_bytes_ignore_file_order() {
        let big = encode_trace(&[1.0], ByteOrder::BigEndian, 1, false).unwrap();
        let little = encode_trace(&[1.0], ByteOrder::LittleEndian, 1, false).unwrap();
        assert_eq!(big, vec![0x41, 0x10, 0x00, 0x00]);
        assert_eq!(big, little);
    }

    #[test]
    fn test_on_disk_layout() {
        let mut buf = [0u8; 4];
        encode_sample(&mut buf, 0, 1.0, ByteOrder::BigEndian, 5).unwrap();
        assert_eq!(buf, 1.0f32.to_be_bytes());
        encode_sample(&mut buf, 0, 1.0, ByteOrder::LittleEndian, 5).unwrap();
        assert_eq!(buf, 1.0f32.to_le_bytes());
        encode_sample(&mut buf, 0, -2.0, ByteOrder::BigEndian, 3).unwrap();
        assert_eq!(&buf[..2], &[0xFF, 0xFE]);

        assert_eq!(decode_sample(&[0xFF], 0, ByteOrder::BigEndian, 8).unwrap(), -1.0);
        assert_eq!(
            decode_sample(&[0, 0, 0, 7], 0, ByteOrder::BigEndian, 4).unwrap(),
            7.0
        );
    }

    #[test]
    fn test_integer_saturation() {
        let values = [1.0e6, -1.0e6, 2.9, -2.9, f32::NAN];
        let bytes = encode_trace(&values, ByteOrder::BigEndian, 3, false).unwrap();
        let back = decode_trace(&bytes, 5, ByteOrder::BigEndian, 3, false).unwrap();
        assert_eq!(back, vec![32_767.0, -32_768.0, 2.0, -2.0, 0.0]);
    }

    #[test]
    fn test_unsupported_format() {
        assert_eq!(
            decode_sample(&[1, 2, 3, 4], 0, ByteOrder::BigEndian, 6).unwrap(),
            0.0
        );
        assert!(matches!(
            encode_trace(&[1.0], ByteOrder::BigEndian, 6, false),
            Err(SegyError::UnsupportedFormat(6))
        ));
        let mut buf = [0u8; 4];
        assert!(encode_sample(&mut buf, 0, 1.0, ByteOrder::BigEndian, 0).is_err());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let values: Vec<f32> = (0..10_000).map(|i| (i as f32 * 0.37).sin() * 1000.0).collect();
        for code in [1u16, 2, 3, 5, 8] {
            for order in ORDERS {
                let seq = encode_trace(&values, order, code, false).unwrap();
                let par = encode_trace(&values, order, code, true).unwrap();
                assert_eq!(seq, par);
                assert_eq!(
                    decode_trace(&seq, values.len(), order, code, false).unwrap(),
                    decode_trace(&par, values.len(), order, code, true).unwrap()
                );
            }
        }
    }

    #[test]
    fn test_short_buffer_is_an_error() {
        let bytes = [0u8; 7];
        assert!(matches!(
            decode_trace(&bytes, 2, ByteOrder::BigEndian, 5, false),
            Err(SegyError::OutOfBounds { len: 8, available: 7, .. })
        ));
        assert!(decode_trace(&bytes, 2, ByteOrder::BigEndian, 5, true).is_err());
    }
}
