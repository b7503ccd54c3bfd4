//! The 3200-byte textual file header.
//!
//! Character translation (EBCDIC tables and the like) is supplied by the
//! caller through [`Codepage`]; this module only handles the fixed width and
//! the byte-per-character mapping.

use crate::error::Result;
use crate::layout::TEXT_HEADER_LEN;
use crate::primitive::{read_bytes, write_string};

/// Width of one card image line in the text header
pub const CARD_WIDTH: usize = 80;

/// Byte-for-byte translation between the on-disk codepage and ASCII/Latin-1
pub trait Codepage {
    /// Disk byte to character byte
    fn decode_byte(&self, byte: u8) -> u8;
    /// Character byte to disk byte
    fn encode_byte(&self, byte: u8) -> u8;
}

/// Identity codepage for headers already stored as ASCII
#[derive(Debug, Clone, Copy, Default)]
pub struct Ascii;

impl Codepage for Ascii {
    fn decode_byte(&self, byte: u8) -> u8 {
        byte
    }

    fn encode_byte(&self, byte: u8) -> u8 {
        byte
    }
}

/// Codepage built from a pair of translation functions
#[derive(Debug, Clone, Copy)]
pub struct FnCodepage<D, E> {
    decode: D,
    encode: E,
}

impl<D, E> FnCodepage<D, E>
where
    D: Fn(u8) -> u8,
    E: Fn(u8) -> u8,
{
    pub fn new(decode: D, encode: E) -> Self {
        Self { decode, encode }
    }
}

impl<D, E> Codepage for FnCodepage<D, E>
where
    D: Fn(u8) -> u8,
    E: Fn(u8) -> u8,
{
    fn decode_byte(&self, byte: u8) -> u8 {
        (self.decode)(byte)
    }

    fn encode_byte(&self, byte: u8) -> u8 {
        (self.encode)(byte)
    }
}

/// Decode the first 3200 bytes of `buf` into text
pub fn decode_text_header<C: Codepage + ?Sized>(buf: &[u8], codepage: &C) -> Result<String> {
    let (raw, _) = read_bytes(buf, 0, TEXT_HEADER_LEN)?;
    Ok(raw
        .iter()
        .map(|&b| codepage.decode_byte(b) as char)
        .collect())
}

/// Encode text as a 3200-byte header, padded with spaces or truncated
pub fn encode_text_header<C: Codepage + ?Sized>(
    text: &str,
    codepage: &C,
) -> Result<[u8; TEXT_HEADER_LEN]> {
    let mut buf = [0u8; TEXT_HEADER_LEN];
    write_string(&mut buf, 0, text, TEXT_HEADER_LEN)?;
    for byte in buf.iter_mut() {
        *byte = codepage.encode_byte(*byte);
    }
    Ok(buf)
}

/// Split header text into its 80-column card images, trailing blanks removed
pub fn card_lines(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(CARD_WIDTH)
        .map(|card| card.iter().collect::<String>().trim_end().to_string())
        .collect()
}
