//! Byte-order aware primitive decoding/encoding over byte buffers.
//!
//! Every function takes the buffer, a byte offset and a [`ByteOrder`] and
//! returns the decoded value together with the offset just past it, so header
//! decoding reads as a straight-line sequence of typed reads. Reading or
//! writing past the end of the buffer fails with [`SegyError::OutOfBounds`].

use crate::error::{Result, SegyError};
use crate::types::ByteOrder;
use byteorder::{BigEndian, ByteOrder as _, LittleEndian};

/// Borrow `len` bytes at `offset`, or fail with a bounds violation
#[inline]
fn span(buf: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    match offset.checked_add(len) {
        Some(end) if end <= buf.len() => Ok(&buf[offset..end]),
        _ => Err(SegyError::OutOfBounds {
            offset,
            len,
            available: buf.len(),
        }),
    }
}

#[inline]
fn span_mut(buf: &mut [u8], offset: usize, len: usize) -> Result<&mut [u8]> {
    let available = buf.len();
    match offset.checked_add(len) {
        Some(end) if end <= available => Ok(&mut buf[offset..end]),
        _ => Err(SegyError::OutOfBounds {
            offset,
            len,
            available,
        }),
    }
}

macro_rules! primitive_codec {
    ($($read:ident, $write:ident, $t:ty, $width:expr;)*) => {
        $(
            #[doc = concat!("Decode a `", stringify!($t), "` at `offset`, returning it with the next offset")]
            #[inline]
            pub fn $read(buf: &[u8], offset: usize, order: ByteOrder) -> Result<($t, usize)> {
                let bytes = span(buf, offset, $width)?;
                let value = match order {
                    ByteOrder::BigEndian => BigEndian::$read(bytes),
                    ByteOrder::LittleEndian => LittleEndian::$read(bytes),
                };
                Ok((value, offset + $width))
            }

            #[doc = concat!("Encode a `", stringify!($t), "` at `offset`, returning the next offset")]
            #[inline]
            pub fn $write(
                buf: &mut [u8],
                offset: usize,
                value: $t,
                order: ByteOrder,
            ) -> Result<usize> {
                let bytes = span_mut(buf, offset, $width)?;
                match order {
                    ByteOrder::BigEndian => BigEndian::$write(bytes, value),
                    ByteOrder::LittleEndian => LittleEndian::$write(bytes, value),
                }
                Ok(offset + $width)
            }
        )*
    };
}

primitive_codec! {
    read_u16, write_u16, u16, 2;
    read_i16, write_i16, i16, 2;
    read_u32, write_u32, u32, 4;
    read_i32, write_i32, i32, 4;
    read_u64, write_u64, u64, 8;
    read_i64, write_i64, i64, 8;
    read_f32, write_f32, f32, 4;
    read_f64, write_f64, f64, 8;
}

/// Decode a single unsigned byte
#[inline]
pub fn read_u8(buf: &[u8], offset: usize) -> Result<(u8, usize)> {
    Ok((span(buf, offset, 1)?[0], offset + 1))
}

/// Decode a single signed byte
#[inline]
pub fn read_i8(buf: &[u8], offset: usize) -> Result<(i8, usize)> {
    Ok((span(buf, offset, 1)?[0] as i8, offset + 1))
}

#[inline]
pub fn write_u8(buf: &mut [u8], offset: usize, value: u8) -> Result<usize> {
    span_mut(buf, offset, 1)?[0] = value;
    Ok(offset + 1)
}

#[inline]
pub fn write_i8(buf: &mut [u8], offset: usize, value: i8) -> Result<usize> {
    span_mut(buf, offset, 1)?[0] = value as u8;
    Ok(offset + 1)
}

/// Borrow `len` raw bytes at `offset`
pub fn read_bytes(buf: &[u8], offset: usize, len: usize) -> Result<(&[u8], usize)> {
    Ok((span(buf, offset, len)?, offset + len))
}

/// Copy a fixed-length byte block at `offset`
pub fn read_array<const N: usize>(buf: &[u8], offset: usize) -> Result<([u8; N], usize)> {
    let mut out = [0u8; N];
    out.copy_from_slice(span(buf, offset, N)?);
    Ok((out, offset + N))
}

/// Copy `bytes` verbatim to `offset`
pub fn write_bytes(buf: &mut [u8], offset: usize, bytes: &[u8]) -> Result<usize> {
    span_mut(buf, offset, bytes.len())?.copy_from_slice(bytes);
    Ok(offset + bytes.len())
}

/// Decode a fixed-width character field, one byte per character
pub fn read_string(buf: &[u8], offset: usize, width: usize) -> Result<(String, usize)> {
    let text = span(buf, offset, width)?.iter().map(|&b| b as char).collect();
    Ok((text, offset + width))
}

/// Encode a fixed-width character field.
///
/// Characters beyond `width` are dropped; short text is right-padded with
/// ASCII space. Characters outside the single-byte range become `?`.
pub fn write_string(buf: &mut [u8], offset: usize, text: &str, width: usize) -> Result<usize> {
    let field = span_mut(buf, offset, width)?;
    let mut chars = text.chars();
    for slot in field.iter_mut() {
        *slot = match chars.next() {
            Some(c) => u8::try_from(u32::from(c)).unwrap_or(b'?'),
            None => b' ',
        };
    }
    Ok(offset + width)
}

/// Position-tracking reader over a borrowed buffer
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
    order: ByteOrder,
}

/// Position-tracking writer over a pre-sized buffer
#[derive(Debug)]
pub struct ByteCursorMut<'a> {
    buf: &'a mut [u8],
    pos: usize,
    order: ByteOrder,
}

macro_rules! cursor_methods {
    ($($read:ident, $write:ident, $t:ty;)*) => {
        impl<'a> ByteCursor<'a> {
            $(
                #[inline]
                pub fn $read(&mut self) -> Result<$t> {
                    let (value, next) = $read(self.buf, self.pos, self.order)?;
                    self.pos = next;
                    Ok(value)
                }
            )*
        }

        impl<'a> ByteCursorMut<'a> {
            $(
                #[inline]
                pub fn $write(&mut self, value: $t) -> Result<()> {
                    self.pos = $write(self.buf, self.pos, value, self.order)?;
                    Ok(())
                }
            )*
        }
    };
}

cursor_methods! {
    read_u16, write_u16, u16;
    read_i16, write_i16, i16;
    read_u32, write_u32, u32;
    read_i32, write_i32, i32;
    read_f32, write_f32, f32;
    read_f64, write_f64, f64;
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8], order: ByteOrder) -> Self {
        Self { buf, pos: 0, order }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move to an absolute offset
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let (value, next) = read_array::<N>(self.buf, self.pos)?;
        self.pos = next;
        Ok(value)
    }
}

impl<'a> ByteCursorMut<'a> {
    pub fn new(buf: &'a mut [u8], order: ByteOrder) -> Self {
        Self { buf, pos: 0, order }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.pos = write_bytes(self.buf, self.pos, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_threading() {
        let buf = [0x00, 0x01, 0xFF, 0xFE, 0x00, 0x00, 0x00, 0x2A];
        let (a, off) = read_u16(&buf, 0, ByteOrder::BigEndian).unwrap();
        let (b, off) = read_i16(&buf, off, ByteOrder::BigEndian).unwrap();
        let (c, off) = read_u32(&buf, off, ByteOrder::BigEndian).unwrap();
        assert_eq!((a, b, c, off), (1, -2, 42, 8));

        let (le, _) = read_u16(&buf, 0, ByteOrder::LittleEndian).unwrap();
        assert_eq!(le, 0x0100);
    }

    #[test]
    fn test_write_then_read_both_orders() {
        for order in [ByteOrder::BigEndian, ByteOrder::LittleEndian] {
            let mut buf = [0u8; 28];
            let mut off = write_i32(&mut buf, 0, -123_456, order).unwrap();
            off = write_f32(&mut buf, off, 2.5, order).unwrap();
            off = write_i64(&mut buf, off, i64::MIN + 7, order).unwrap();
            off = write_f64(&mut buf, off, -0.125, order).unwrap();
            off = write_i16(&mut buf, off, -300, order).unwrap();
            off = write_u16(&mut buf, off, 65_000, order).unwrap();
            assert_eq!(off, 28);

            let (a, off) = read_i32(&buf, 0, order).unwrap();
            let (b, off) = read_f32(&buf, off, order).unwrap();
            let (c, off) = read_i64(&buf, off, order).unwrap();
            let (d, off) = read_f64(&buf, off, order).unwrap();
            let (e, off) = read_i16(&buf, off, order).unwrap();
            let (f, _) = read_u16(&buf, off, order).unwrap();
            assert_eq!((a, b, c, d, e, f), (-123_456, 2.5, i64::MIN + 7, -0.125, -300, 65_000));
        }
    }

    #[test]
    fn test_bounds_violation_is_an_error() {
        let buf = [0u8; 6];
        assert!(matches!(
            read_u32(&buf, 4, ByteOrder::BigEndian),
            Err(SegyError::OutOfBounds {
                offset: 4,
                len: 4,
                available: 6
            })
        ));
        assert!(read_u16(&buf, usize::MAX, ByteOrder::BigEndian).is_err());

        let mut out = [0u8; 3];
        assert!(write_u32(&mut out, 0, 7, ByteOrder::LittleEndian).is_err());
        assert_eq!(out, [0, 0, 0], "failed write must not touch the buffer");
        assert!(read_array::<4>(&buf, 3).is_err());
    }

    #[test]
    fn test_string_pad_and_truncate() {
        let mut buf = [0u8; 8];
        write_string(&mut buf, 0, "AB", 5).unwrap();
        assert_eq!(&buf[..5], b"AB   ");
        assert_eq!(buf[5], 0);

        write_string(&mut buf, 0, "ABCDEFGHIJ", 8).unwrap();
        assert_eq!(&buf, b"ABCDEFGH");

        write_string(&mut buf, 0, "é€", 2).unwrap();
        assert_eq!(&buf[..2], &[0xE9, b'?']);

        let (text, next) = read_string(&buf, 0, 2).unwrap();
        assert_eq!(text, "é?");
        assert_eq!(next, 2);
    }

    #[test]
    fn test_cursor_sequence() {
        let mut buf = [0u8; 12];
        {
            let mut w = ByteCursorMut::new(&mut buf, ByteOrder::LittleEndian);
            w.write_u32(7).unwrap();
            w.write_i16(-1).unwrap();
            w.write_bytes(&[9, 9]).unwrap();
            w.write_f32(1.5).unwrap();
            assert_eq!(w.position(), 12);
            assert!(w.write_u16(1).is_err());
        }

        let mut r = ByteCursor::new(&buf, ByteOrder::LittleEndian);
        assert_eq!(r.read_u32().unwrap(), 7);
        assert_eq!(r.read_i16().unwrap(), -1);
        assert_eq!(r.read_array::<2>().unwrap(), [9, 9]);
        assert_eq!(r.read_f32().unwrap(), 1.5);
        r.seek(0);
        assert_eq!(r.read_u16().unwrap(), 7);
    }

    #[test]
    fn test_single_bytes() {
        let mut buf = [0u8; 2];
        write_i8(&mut buf, 0, -5).unwrap();
        write_u8(&mut buf, 1, 200).unwrap();
        assert_eq!(read_i8(&buf, 0).unwrap(), (-5, 1));
        assert_eq!(read_u8(&buf, 1).unwrap(), (200, 2));
        assert!(read_u8(&buf, 2).is_err());
    }
}
