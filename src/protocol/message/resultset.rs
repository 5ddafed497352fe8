//! Result set streaming: column metadata, rows, and fetch termination.

use bitflags::bitflags;
use enum_primitive_derive::Primitive;

use crate::protocol::codec::{MessageDecode, MessageEncode, ProtoReader, ProtoWriter};
use crate::protocol::error::ProtocolError;

bitflags! {
    /// Per-column flags carried alongside [`ColumnMetaData`].
    #[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ColumnFlags: u32 {
        /// The column may contain `NULL`.
        const NOT_NULL = 0x0001;
        /// The column is part of a primary key.
        const PRIMARY_KEY = 0x0002;
        /// The column is part of a unique key.
        const UNIQUE_KEY = 0x0004;
        /// The column is part of a (non-unique) multiple key.
        const MULTIPLE_KEY = 0x0008;
        /// The column is auto-incremented.
        const AUTO_INCREMENT = 0x0010;
    }
}

/// The SQL-level type of a result set column.
#[repr(u32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Primitive)]
pub enum ColumnType {
    /// Signed or unsigned integer.
    Sint = 1,
    /// Unsigned integer (wire-distinct from `SINT` for display formatting).
    Uint = 2,
    /// IEEE-754 double.
    Double = 5,
    /// IEEE-754 single-precision float.
    Float = 6,
    /// Fixed-point decimal, encoded as bytes.
    Decimal = 7,
    /// Byte string (`CHAR`, `VARCHAR`, `TEXT`, `BLOB`, ...).
    Bytes = 8,
    /// `TIME` value.
    Time = 10,
    /// `DATETIME`/`DATE`/`TIMESTAMP` value.
    Datetime = 12,
    /// `SET` value.
    Set = 15,
    /// `ENUM` value.
    Enum = 16,
    /// Geometry value.
    Bit = 17,
}

/// Describes one column of an incoming result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetaData {
    /// The column's wire-level type.
    pub col_type: ColumnType,
    /// The column's display name (possibly aliased).
    pub name: String,
    /// The column's name in the underlying schema, before aliasing.
    pub original_name: String,
    /// The table the column belongs to (possibly aliased).
    pub table: String,
    /// The table's name in the underlying schema, before aliasing.
    pub original_table: String,
    /// The schema the table belongs to.
    pub schema: String,
    /// The catalog the schema belongs to.
    pub catalog: String,
    /// Number of fractional digits, for numeric/temporal types.
    pub fractional_digits: u32,
    /// Column length in characters or bytes, as reported by the server.
    pub length: u32,
    /// Per-column flags.
    pub flags: ColumnFlags,
}

impl Default for ColumnMetaData {
    fn default() -> Self {
        ColumnMetaData {
            col_type: ColumnType::Bytes,
            name: String::new(),
            original_name: String::new(),
            table: String::new(),
            original_table: String::new(),
            schema: String::new(),
            catalog: String::new(),
            fractional_digits: 0,
            length: 0,
            flags: ColumnFlags::empty(),
        }
    }
}

impl MessageDecode for ColumnMetaData {
    fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = ProtoReader::new(payload);
        let mut meta = ColumnMetaData::default();

        while r.has_remaining() {
            let (field, wire_type) = r.read_tag()?;
            match field {
                1 => meta.col_type = r.read_enum()?,
                2 => meta.catalog = r.read_string()?,
                3 => meta.schema = r.read_string()?,
                4 => meta.table = r.read_string()?,
                5 => meta.original_table = r.read_string()?,
                6 => meta.name = r.read_string()?,
                7 => meta.original_name = r.read_string()?,
                9 => meta.length = r.read_uint32()?,
                10 => meta.fractional_digits = r.read_uint32()?,
                12 => meta.flags = ColumnFlags::from_bits_truncate(r.read_uint32()?),
                _ => r.skip_field(wire_type)?,
            }
        }

        Ok(meta)
    }
}

impl MessageEncode for ColumnMetaData {
    fn encode(&self, w: &mut ProtoWriter<'_>) {
        w.write_enum_field(1, self.col_type as u64);
        w.write_string_field(2, &self.catalog);
        w.write_string_field(3, &self.schema);
        w.write_string_field(4, &self.table);
        w.write_string_field(5, &self.original_table);
        w.write_string_field(6, &self.name);
        w.write_string_field(7, &self.original_name);
        w.write_varint_field(9, self.length as u64);
        w.write_varint_field(10, self.fractional_digits as u64);
        w.write_varint_field(12, self.flags.bits() as u64);
    }
}

/// One row of a result set. Each field is the raw, length-delimited encoding
/// of a scalar value; decoding it against [`ColumnMetaData`] is left to the
/// caller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    /// The row's field values, in column order.
    pub fields: Vec<Vec<u8>>,
}

impl MessageDecode for Row {
    fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = ProtoReader::new(payload);
        let mut fields = Vec::new();

        while r.has_remaining() {
            let (field, wire_type) = r.read_tag()?;
            match field {
                1 => fields.push(r.read_bytes()?),
                _ => r.skip_field(wire_type)?,
            }
        }

        Ok(Row { fields })
    }
}

impl MessageEncode for Row {
    fn encode(&self, w: &mut ProtoWriter<'_>) {
        for field in &self.fields {
            w.write_bytes_field(1, field);
        }
    }
}

/// `Resultset.FetchDone`: the current result set is exhausted. Carries no
/// payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchDone;

impl MessageDecode for FetchDone {
    fn decode(_payload: &[u8]) -> Result<Self, ProtocolError> {
        Ok(FetchDone)
    }
}

impl MessageEncode for FetchDone {
    fn encode(&self, _w: &mut ProtoWriter<'_>) {}
}

/// `Resultset.FetchDoneMoreResultsets`: the current result set is exhausted
/// and at least one more result set follows (e.g. from a multi-statement
/// stored procedure call). Carries no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchDoneMoreResultsets;

impl MessageDecode for FetchDoneMoreResultsets {
    fn decode(_payload: &[u8]) -> Result<Self, ProtocolError> {
        Ok(FetchDoneMoreResultsets)
    }
}

impl MessageEncode for FetchDoneMoreResultsets {
    fn encode(&self, _w: &mut ProtoWriter<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn column_meta_data_roundtrip() {
        let meta = ColumnMetaData {
            col_type: ColumnType::Bytes,
            name: "name".into(),
            original_name: "name".into(),
            table: "users".into(),
            original_table: "users".into(),
            schema: "app".into(),
            catalog: "def".into(),
            fractional_digits: 0,
            length: 255,
            flags: ColumnFlags::NOT_NULL,
        };

        let mut buf = Vec::new();
        meta.encode(&mut ProtoWriter::new(&mut buf));
        assert_eq!(ColumnMetaData::decode(&buf).unwrap(), meta);
    }

    #[test]
    fn row_roundtrip() {
        let row = Row { fields: vec![b"a".to_vec(), b"b".to_vec()] };
        let mut buf = Vec::new();
        row.encode(&mut ProtoWriter::new(&mut buf));
        assert_eq!(Row::decode(&buf).unwrap(), row);
    }
}
