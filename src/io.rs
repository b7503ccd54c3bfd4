//! Stream-level read/write helpers and path-based entry points.
//!
//! The helpers read or write exactly one SEG-Y section at the stream's
//! current position. They never seek, so callers decide where each
//! section lives.

use crate::error::{Result, SegyError};
use crate::layout::{
    self, DATA_OFFSET, FORMAT_CODE_OFFSET, REEL_HEADER_LEN, TEXT_HEADER_LEN, TRACE_HEADER_LEN,
};
use crate::reel::ReelHeader;
use crate::sample::{decode_trace, encode_trace};
use crate::text::{decode_text_header, encode_text_header, Codepage};
use crate::trace_header::TraceHeader;
use crate::types::ByteOrder;
use bytes::Bytes;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

fn read_block<R: Read + ?Sized, const N: usize>(reader: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// Read `len` raw bytes
pub fn read_raw<R: Read + ?Sized>(reader: &mut R, len: usize) -> Result<Bytes> {
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    Ok(Bytes::from(buf))
}

pub fn read_text_header<R: Read + ?Sized, C: Codepage + ?Sized>(
    reader: &mut R,
    codepage: &C,
) -> Result<String> {
    let buf: [u8; TEXT_HEADER_LEN] = read_block(reader)?;
    decode_text_header(&buf, codepage)
}

pub fn read_reel_header<R: Read + ?Sized>(reader: &mut R, order: ByteOrder) -> Result<ReelHeader> {
    let buf: [u8; REEL_HEADER_LEN] = read_block(reader)?;
    ReelHeader::decode(&buf, order)
}

pub fn read_trace_header<R: Read + ?Sized>(
    reader: &mut R,
    order: ByteOrder,
) -> Result<TraceHeader> {
    let buf: [u8; TRACE_HEADER_LEN] = read_block(reader)?;
    TraceHeader::decode(&buf, order)
}

/// Read and decode `samples` samples
pub fn read_trace_data<R: Read + ?Sized>(
    reader: &mut R,
    samples: usize,
    order: ByteOrder,
    code: u16,
    parallel: bool,
) -> Result<Vec<f32>> {
    let raw = read_raw(reader, samples * layout::bytes_per_sample(code))?;
    decode_trace(&raw, samples, order, code, parallel)
}

pub fn write_text_header<W: Write + ?Sized, C: Codepage + ?Sized>(
    writer: &mut W,
    text: &str,
    codepage: &C,
) -> Result<()> {
    writer.write_all(&encode_text_header(text, codepage)?)?;
    Ok(())
}

pub fn write_reel_header<W: Write + ?Sized>(
    writer: &mut W,
    header: &ReelHeader,
    order: ByteOrder,
) -> Result<()> {
    writer.write_all(&header.encode(order)?)?;
    Ok(())
}

pub fn write_trace_header<W: Write + ?Sized>(
    writer: &mut W,
    header: &TraceHeader,
    order: ByteOrder,
) -> Result<()> {
    writer.write_all(&header.encode(order)?)?;
    Ok(())
}

/// Encode and write a sample array
pub fn write_trace_data<W: Write + ?Sized>(
    writer: &mut W,
    samples: &[f32],
    order: ByteOrder,
    code: u16,
    parallel: bool,
) -> Result<()> {
    writer.write_all(&encode_trace(samples, order, code, parallel)?)?;
    Ok(())
}

/// Infer the byte order of a stream from its stored data format code
pub fn detect_byte_order_from<R: Read + Seek + ?Sized>(reader: &mut R) -> Result<ByteOrder> {
    let size = reader.seek(SeekFrom::End(0))?;
    if size < DATA_OFFSET {
        return Err(SegyError::FileTooShort { size });
    }
    reader.seek(SeekFrom::Start((TEXT_HEADER_LEN + FORMAT_CODE_OFFSET) as u64))?;
    let raw: [u8; 2] = read_block(reader)?;
    Ok(layout::byte_order_from_format_bytes(raw))
}

/// Infer the byte order of the SEG-Y file at `path`
pub fn detect_byte_order(path: impl AsRef<Path>) -> Result<ByteOrder> {
    let mut file = File::open(path.as_ref())?;
    detect_byte_order_from(&mut file)
}

/// Number of fixed-stride traces in the SEG-Y file at `path`
pub fn trace_count(path: impl AsRef<Path>) -> Result<u64> {
    let mut file = BufReader::new(File::open(path.as_ref())?);
    let order = detect_byte_order_from(&mut file)?;
    let size = file.seek(SeekFrom::End(0))?;
    file.seek(SeekFrom::Start(TEXT_HEADER_LEN as u64))?;
    let reel = read_reel_header(&mut file, order)?;
    let stride = layout::trace_stride(reel.samples_per_trace as usize, reel.data_format_code);
    layout::trace_count(size, stride)
}
