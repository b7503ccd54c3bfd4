//! Declarative header field tables.
//!
//! Each binary header is described by an ordered, statically declared list of
//! [`FieldSpec`] entries (name, offset, width). Decoding and encoding walk the
//! table with a byte cursor, and the same table serves named field lookup.

use crate::error::{Result, SegyError};
use crate::primitive::{ByteCursor, ByteCursorMut};
use crate::types::ByteOrder;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Storage type of a header field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    U16,
    I16,
    U32,
    I32,
}

impl FieldKind {
    /// Width of the field in bytes
    pub fn width(&self) -> usize {
        match self {
            FieldKind::U16 | FieldKind::I16 => 2,
            FieldKind::U32 | FieldKind::I32 => 4,
        }
    }
}

/// One entry in a header's field table
#[derive(Debug)]
pub struct FieldSpec<T> {
    /// Field name, identical to the struct member
    pub name: &'static str,
    /// 0-based byte offset inside the header block
    pub offset: usize,
    pub kind: FieldKind,
    /// Widening accessor
    pub get: fn(&T) -> i64,
    /// Narrowing mutator (wraps like an `as` cast)
    pub set: fn(&mut T, i64),
}

impl<T> FieldSpec<T> {
    pub fn width(&self) -> usize {
        self.kind.width()
    }

    /// Inclusive 1-based byte range, the way the standard documents it
    pub fn byte_range(&self) -> (usize, usize) {
        (self.offset + 1, self.offset + self.width())
    }

    fn decode(&self, cursor: &mut ByteCursor<'_>, target: &mut T) -> Result<()> {
        cursor.seek(self.offset);
        let value = match self.kind {
            FieldKind::U16 => cursor.read_u16()? as i64,
            FieldKind::I16 => cursor.read_i16()? as i64,
            FieldKind::U32 => cursor.read_u32()? as i64,
            FieldKind::I32 => cursor.read_i32()? as i64,
        };
        (self.set)(target, value);
        Ok(())
    }

    fn encode(&self, cursor: &mut ByteCursorMut<'_>, source: &T) -> Result<()> {
        cursor.seek(self.offset);
        let value = (self.get)(source);
        match self.kind {
            FieldKind::U16 => cursor.write_u16(value as u16),
            FieldKind::I16 => cursor.write_i16(value as i16),
            FieldKind::U32 => cursor.write_u32(value as u32),
            FieldKind::I32 => cursor.write_i32(value as i32),
        }
    }
}

/// Decode every field in `fields` from `buf` into `target`
pub fn decode_fields<T>(
    fields: &[FieldSpec<T>],
    buf: &[u8],
    order: ByteOrder,
    target: &mut T,
) -> Result<()> {
    let mut cursor = ByteCursor::new(buf, order);
    for field in fields {
        field.decode(&mut cursor, target)?;
    }
    Ok(())
}

/// Encode every field in `fields` from `source` into `buf`
pub fn encode_fields<T>(
    fields: &[FieldSpec<T>],
    source: &T,
    order: ByteOrder,
    buf: &mut [u8],
) -> Result<()> {
    let mut cursor = ByteCursorMut::new(buf, order);
    for field in fields {
        field.encode(&mut cursor, source)?;
    }
    Ok(())
}

/// Look up a field by name (ASCII case-insensitive)
pub fn find_field<'a, T>(fields: &'a [FieldSpec<T>], name: &str) -> Result<&'a FieldSpec<T>> {
    fields
        .iter()
        .find(|f| f.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| SegyError::UnknownField(name.to_string()))
}

/// Build a `static` field table for a header struct.
///
/// Each row is `member @ offset: Kind`; accessors are generated from the
/// member name so the table and the struct cannot drift apart.
macro_rules! field_table {
    ($(#[$meta:meta])* $table:ident: $t:ty { $($name:ident @ $offset:literal : $kind:ident,)* }) => {
        $(#[$meta])*
        pub static $table: &[$crate::field::FieldSpec<$t>] = &[
            $(
                $crate::field::FieldSpec {
                    name: stringify!($name),
                    offset: $offset,
                    kind: $crate::field::FieldKind::$kind,
                    get: |h: &$t| h.$name as i64,
                    set: |h: &mut $t, v: i64| h.$name = v as _,
                },
            )*
        ];
    };
}

pub(crate) use field_table;

/// Opaque fixed-length byte block carried through decode and encode unchanged
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reserved<const N: usize>(pub [u8; N]);

impl<const N: usize> Reserved<N> {
    pub fn as_bytes(&self) -> &[u8; N] {
        &self.0
    }

    pub fn is_zeroed(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl<const N: usize> Default for Reserved<N> {
    fn default() -> Self {
        Self([0; N])
    }
}

impl<const N: usize> fmt::Debug for Reserved<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zeroed() {
            write!(f, "Reserved<{}>(zeroed)", N)
        } else {
            f.debug_tuple("Reserved").field(&&self.0[..]).finish()
        }
    }
}

impl<const N: usize> Serialize for Reserved<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de, const N: usize> Deserialize<'de> for Reserved<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let bytes = Vec::<u8>::deserialize(deserializer)?;
        <[u8; N]>::try_from(bytes.as_slice())
            .map(Reserved)
            .map_err(|_| D::Error::invalid_length(bytes.len(), &"a reserved block of fixed length"))
    }
}

/// Check that a table plus its reserved blocks tile `total` bytes exactly once
#[cfg(test)]
pub(crate) fn assert_tiles<T>(fields: &[FieldSpec<T>], reserved: &[(usize, usize)], total: usize) {
    let mut owner = vec![None::<&str>; total];
    let spans = fields
        .iter()
        .map(|f| (f.name, f.offset, f.width()))
        .chain(reserved.iter().map(|&(offset, len)| ("<reserved>", offset, len)));
    for (name, offset, len) in spans {
        for (i, slot) in owner[offset..offset + len].iter_mut().enumerate() {
            assert!(
                slot.is_none(),
                "byte {} claimed by both {:?} and {}",
                offset + i,
                slot,
                name
            );
            *slot = Some(name);
        }
    }
    let gaps: Vec<usize> = (0..total).filter(|&i| owner[i].is_none()).collect();
    assert!(gaps.is_empty(), "unassigned bytes: {:?}", gaps);
}
