//! # Protobuf Wire Codec
//!
//! Just enough of the protobuf binary format to read and write the
//! transaction messages: base-128 varints, field keys, and length-delimited
//! fields. Unknown fields are skipped on decode.
//!
//! Encoding is canonical proto3: fields go out in ascending field-number
//! order (the caller's responsibility), zero scalars and empty byte strings
//! are omitted. The same bytes come out for the same transaction every time,
//! which is what makes them signable and hashable.

use crate::error::{ConstructorError, Result};

/// Longest legal encoding of a 64-bit varint.
const MAX_VARINT_LENGTH: usize = 10;

/// Protobuf wire types. Only varint and length-delimited fields are ever
/// written; the fixed-width types are recognized so they can be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Varint,
    Fixed64,
    LengthDelimited,
    Fixed32,
}

impl WireType {
    fn from_bits(bits: u64) -> Option<Self> {
        match bits {
            0 => Some(Self::Varint),
            1 => Some(Self::Fixed64),
            2 => Some(Self::LengthDelimited),
            5 => Some(Self::Fixed32),
            _ => None,
        }
    }

    fn bits(self) -> u64 {
        match self {
            Self::Varint => 0,
            Self::Fixed64 => 1,
            Self::LengthDelimited => 2,
            Self::Fixed32 => 5,
        }
    }
}

fn malformed(reason: impl Into<String>) -> ConstructorError {
    ConstructorError::MalformedTransaction(reason.into())
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Append-only protobuf encoder.
#[derive(Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_varint(&mut self, mut value: u64) {
        while value >= 0x80 {
            self.buf.push((value as u8 & 0x7f) | 0x80);
            value >>= 7;
        }
        self.buf.push(value as u8);
    }

    fn write_key(&mut self, field: u32, wire_type: WireType) {
        self.write_varint((u64::from(field) << 3) | wire_type.bits());
    }

    /// Writes a `uint64` field. Zero is the proto3 default and is omitted.
    pub fn uint64(&mut self, field: u32, value: u64) {
        if value == 0 {
            return;
        }
        self.write_key(field, WireType::Varint);
        self.write_varint(value);
    }

    /// Writes a `bytes` field. Empty is the proto3 default and is omitted.
    pub fn bytes(&mut self, field: u32, value: &[u8]) {
        if value.is_empty() {
            return;
        }
        self.length_delimited(field, value);
    }

    /// Writes an embedded message. Always emitted, even when empty, so
    /// repeated elements and oneof members keep their presence.
    pub fn message(&mut self, field: u32, encoded: &[u8]) {
        self.length_delimited(field, encoded);
    }

    fn length_delimited(&mut self, field: u32, value: &[u8]) {
        self.write_key(field, WireType::LengthDelimited);
        self.write_varint(value.len() as u64);
        self.buf.extend_from_slice(value);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// A decoded field value. Borrowed from the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Varint(u64),
    Bytes(&'a [u8]),
    /// Fixed-width value; never produced by the transaction schemas.
    Fixed,
}

/// Forward-only protobuf decoder over a borrowed buffer.
#[derive(Debug)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn read_varint(&mut self) -> Result<u64> {
        let mut value: u64 = 0;
        for i in 0..MAX_VARINT_LENGTH {
            let byte = *self
                .data
                .get(self.pos)
                .ok_or_else(|| malformed("truncated varint"))?;
            self.pos += 1;

            let chunk = u64::from(byte & 0x7f);
            if i == MAX_VARINT_LENGTH - 1 && chunk > 1 {
                return Err(malformed("varint overflows 64 bits"));
            }
            value |= chunk << (7 * i);

            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(malformed("varint longer than 10 bytes"))
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| malformed(format!("field of {} bytes runs past end of input", len)))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Reads the next field as `(field_number, value)`, or `None` at the end
    /// of the buffer.
    pub fn next_field(&mut self) -> Result<Option<(u32, FieldValue<'a>)>> {
        if self.is_empty() {
            return Ok(None);
        }

        let key = self.read_varint()?;
        let wire_type = WireType::from_bits(key & 0x7)
            .ok_or_else(|| malformed(format!("unsupported wire type {}", key & 0x7)))?;
        let field = u32::try_from(key >> 3)
            .ok()
            .filter(|f| *f != 0)
            .ok_or_else(|| malformed(format!("invalid field number {}", key >> 3)))?;

        let value = match wire_type {
            WireType::Varint => FieldValue::Varint(self.read_varint()?),
            WireType::LengthDelimited => {
                let len = usize::try_from(self.read_varint()?)
                    .map_err(|_| malformed("field length does not fit in memory"))?;
                FieldValue::Bytes(self.take(len)?)
            }
            WireType::Fixed64 => {
                self.take(8)?;
                FieldValue::Fixed
            }
            WireType::Fixed32 => {
                self.take(4)?;
                FieldValue::Fixed
            }
        };

        Ok(Some((field, value)))
    }
}

impl<'a> FieldValue<'a> {
    /// Interprets the value as a varint, failing for any other wire type.
    pub fn as_u64(self, field_name: &str) -> Result<u64> {
        match self {
            Self::Varint(v) => Ok(v),
            _ => Err(malformed(format!("{} has the wrong wire type", field_name))),
        }
    }

    /// Interprets the value as a length-delimited field.
    pub fn as_bytes(self, field_name: &str) -> Result<&'a [u8]> {
        match self {
            Self::Bytes(b) => Ok(b),
            _ => Err(malformed(format!("{} has the wrong wire type", field_name))),
        }
    }
}
