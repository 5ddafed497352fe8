//! A Protocol-Buffers-compatible, length-delimited, field-tagged wire codec.
//!
//! Every concrete message type in [`message`](super::message) is built on top
//! of [`ProtoReader`]/[`ProtoWriter`], a reader/writer pair over protobuf's
//! field-number/wire-type tags.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use num_traits::FromPrimitive;

use super::error::ProtocolError;

/// Protobuf wire types.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum WireType {
    /// `int32`, `int64`, `uint32`, `uint64`, `bool`, and enum fields.
    Varint,
    /// Fixed-width 64-bit fields (`fixed64`, `double`).
    Fixed64,
    /// Length-delimited fields (`string`, `bytes`, embedded messages, packed repeated fields).
    LengthDelimited,
    /// Fixed-width 32-bit fields (`fixed32`, `float`).
    Fixed32,
}

impl WireType {
    fn from_u64(v: u64) -> Option<Self> {
        match v {
            0 => Some(WireType::Varint),
            1 => Some(WireType::Fixed64),
            2 => Some(WireType::LengthDelimited),
            5 => Some(WireType::Fixed32),
            _ => None,
        }
    }

    fn as_u64(self) -> u64 {
        match self {
            WireType::Varint => 0,
            WireType::Fixed64 => 1,
            WireType::LengthDelimited => 2,
            WireType::Fixed32 => 5,
        }
    }
}

/// A zero-copy cursor over a decoded message payload.
pub struct ProtoReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ProtoReader<'a> {
    /// Wraps a borrowed payload slice for reading.
    pub fn new(buf: &'a [u8]) -> Self {
        ProtoReader { buf, pos: 0 }
    }

    /// Whether any bytes remain unconsumed.
    pub fn has_remaining(&self) -> bool {
        self.pos < self.buf.len()
    }

    /// Reads a single field tag, returning `(field_number, wire_type)`.
    pub fn read_tag(&mut self) -> Result<(u32, WireType), ProtocolError> {
        let raw = self.read_varint()?;
        let field_number = (raw >> 3) as u32;
        let wire_type = WireType::from_u64(raw & 0x7)
            .ok_or_else(|| ProtocolError::Frame(format!("invalid wire type in tag 0x{raw:x}")))?;
        Ok((field_number, wire_type))
    }

    /// Reads a base-128 varint.
    pub fn read_varint(&mut self) -> Result<u64, ProtocolError> {
        let mut result: u64 = 0;
        let mut shift = 0;
        loop {
            if shift >= 64 {
                return Err(ProtocolError::Frame("varint too long".into()));
            }

            let byte = *self
                .buf
                .get(self.pos)
                .ok_or_else(|| ProtocolError::Frame("truncated varint".into()))?;
            self.pos += 1;

            result |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }
    }

    /// Reads a little-endian fixed 32-bit value.
    pub fn read_fixed32(&mut self) -> Result<u32, ProtocolError> {
        let mut cur = std::io::Cursor::new(self.take(4)?);
        Ok(cur.read_u32::<LittleEndian>()?)
    }

    /// Reads a little-endian fixed 64-bit value.
    pub fn read_fixed64(&mut self) -> Result<u64, ProtocolError> {
        let mut cur = std::io::Cursor::new(self.take(8)?);
        Ok(cur.read_u64::<LittleEndian>()?)
    }

    /// Reads a length-delimited field, returning the raw sub-slice.
    pub fn read_length_delimited(&mut self) -> Result<&'a [u8], ProtocolError> {
        let len = self.read_varint()? as usize;
        self.take(len)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], ProtocolError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| ProtocolError::Frame("field length out of bounds".into()))?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Reads a `uint32` field (varint-encoded).
    pub fn read_uint32(&mut self) -> Result<u32, ProtocolError> {
        Ok(self.read_varint()? as u32)
    }

    /// Reads a `uint64` field (varint-encoded).
    pub fn read_uint64(&mut self) -> Result<u64, ProtocolError> {
        self.read_varint()
    }

    /// Reads a zigzag-free `int64` field (protobuf `int64`, not `sint64`).
    pub fn read_int64(&mut self) -> Result<i64, ProtocolError> {
        Ok(self.read_varint()? as i64)
    }

    /// Reads a `bool` field.
    pub fn read_bool(&mut self) -> Result<bool, ProtocolError> {
        Ok(self.read_varint()? != 0)
    }

    /// Reads a UTF-8 `string` field.
    pub fn read_string(&mut self) -> Result<String, ProtocolError> {
        let bytes = self.read_length_delimited()?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| ProtocolError::Frame(format!("invalid UTF-8 in string field: {e}")))
    }

    /// Reads a `bytes` field, copying it into an owned `Vec<u8>`.
    pub fn read_bytes(&mut self) -> Result<Vec<u8>, ProtocolError> {
        Ok(self.read_length_delimited()?.to_vec())
    }

    /// Reads a varint and maps it onto an enum implementing `FromPrimitive`.
    pub fn read_enum<T: FromPrimitive>(&mut self) -> Result<T, ProtocolError> {
        let v = self.read_varint()?;
        T::from_u64(v)
            .ok_or_else(|| ProtocolError::Frame(format!("invalid enum value {v} in field")))
    }

    /// Reads a length-delimited embedded message.
    pub fn read_message<T: MessageDecode>(&mut self) -> Result<T, ProtocolError> {
        let bytes = self.read_length_delimited()?;
        T::decode(bytes)
    }

    /// Skips a field's value given its wire type, for forward compatibility
    /// with unrecognized field numbers (future protocol extensions).
    pub fn skip_field(&mut self, wire_type: WireType) -> Result<(), ProtocolError> {
        match wire_type {
            WireType::Varint => {
                self.read_varint()?;
            }
            WireType::Fixed64 => {
                self.take(8)?;
            }
            WireType::LengthDelimited => {
                self.read_length_delimited()?;
            }
            WireType::Fixed32 => {
                self.take(4)?;
            }
        }
        Ok(())
    }
}

/// An append-only writer building a message payload into a `Vec<u8>`.
pub struct ProtoWriter<'a> {
    buf: &'a mut Vec<u8>,
}

impl<'a> ProtoWriter<'a> {
    /// Wraps a buffer that field writes are appended to.
    pub fn new(buf: &'a mut Vec<u8>) -> Self {
        ProtoWriter { buf }
    }

    fn write_tag(&mut self, field_number: u32, wire_type: WireType) {
        self.write_varint((u64::from(field_number) << 3) | wire_type.as_u64());
    }

    /// Writes a raw varint with no preceding tag.
    pub fn write_varint(&mut self, mut value: u64) {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.buf.push(byte);
                return;
            }
            self.buf.push(byte | 0x80);
        }
    }

    /// Writes a `uint32`/`uint64`/enum field.
    pub fn write_varint_field(&mut self, field_number: u32, value: u64) {
        self.write_tag(field_number, WireType::Varint);
        self.write_varint(value);
    }

    /// Writes a `bool` field.
    pub fn write_bool_field(&mut self, field_number: u32, value: bool) {
        self.write_varint_field(field_number, value as u64);
    }

    /// Writes an `int64` field.
    pub fn write_int64_field(&mut self, field_number: u32, value: i64) {
        self.write_varint_field(field_number, value as u64);
    }

    /// Writes a `bytes` field.
    pub fn write_bytes_field(&mut self, field_number: u32, value: &[u8]) {
        self.write_tag(field_number, WireType::LengthDelimited);
        self.write_varint(value.len() as u64);
        self.buf.extend_from_slice(value);
    }

    /// Writes a UTF-8 `string` field.
    pub fn write_string_field(&mut self, field_number: u32, value: &str) {
        self.write_bytes_field(field_number, value.as_bytes());
    }

    /// Writes an enum field from its discriminant.
    pub fn write_enum_field(&mut self, field_number: u32, value: u64) {
        self.write_varint_field(field_number, value);
    }

    /// Writes a nested message field, length-prefixing it after encoding via
    /// the same two-pass technique [`super::frame::FrameCodec`] uses for the
    /// outer frame length.
    pub fn write_message_field<T: MessageEncode>(&mut self, field_number: u32, value: &T) {
        let mut nested = Vec::new();
        value.encode(&mut ProtoWriter::new(&mut nested));
        self.write_bytes_field(field_number, &nested);
    }
}

/// Implemented by every message payload that can be parsed off the wire.
pub trait MessageDecode: Sized {
    /// Decodes `Self` from a complete payload slice.
    fn decode(payload: &[u8]) -> Result<Self, ProtocolError>;
}

/// Implemented by every message payload that can be serialized onto the wire.
pub trait MessageEncode {
    /// Appends `self`'s field-tagged encoding to `w`.
    fn encode(&self, w: &mut ProtoWriter<'_>);
}

/// Shared round-trip assertion for [`message`](super::message) tests: encode,
/// decode, and compare.
#[cfg(test)]
pub(crate) mod test_util {
    use super::*;
    use anyhow::Context as _;

    pub(crate) fn test_roundtrip<T>(v: &T) -> anyhow::Result<()>
    where
        T: MessageEncode + MessageDecode + PartialEq + std::fmt::Debug,
    {
        let mut buf = Vec::new();
        v.encode(&mut ProtoWriter::new(&mut buf));
        let v2 = T::decode(&buf).context("decode failed for round-tripped message")?;
        pretty_assertions::assert_eq!(v, &v2);
        Ok(())
    }
}
