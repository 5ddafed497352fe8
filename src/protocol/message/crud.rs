//! The document-store CRUD surface: `Find`, `Insert`, `Update`, `Delete`.
//!
//! Criteria, projection, and document content are all expressed in terms of
//! the `Expression`/document AST, which is out of scope for this engine
//! (§6.5); every such field here is carried as the raw encoded bytes of that
//! AST, to be interpreted by a caller that does understand it.

use crate::protocol::codec::{MessageDecode, MessageEncode, ProtoReader, ProtoWriter};
use crate::protocol::error::ProtocolError;

/// Identifies the collection or table a CRUD operation targets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Collection {
    /// The collection/table name.
    pub name: String,
    /// The schema the collection belongs to.
    pub schema: String,
}

impl MessageDecode for Collection {
    fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = ProtoReader::new(payload);
        let mut coll = Collection::default();

        while r.has_remaining() {
            let (field, wire_type) = r.read_tag()?;
            match field {
                1 => coll.name = r.read_string()?,
                2 => coll.schema = r.read_string()?,
                _ => r.skip_field(wire_type)?,
            }
        }

        Ok(coll)
    }
}

impl MessageEncode for Collection {
    fn encode(&self, w: &mut ProtoWriter<'_>) {
        w.write_string_field(1, &self.name);
        w.write_string_field(2, &self.schema);
    }
}

/// `Crud.Find`: query a collection, optionally with a criteria expression,
/// a projection, ordering, and a row limit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Find {
    /// The collection being queried.
    pub collection: Collection,
    /// A raw-encoded `Expression` tree used as the filter criteria, if any.
    pub criteria: Option<Vec<u8>>,
    /// Raw-encoded projection expressions (one per returned column/field).
    pub projection: Vec<Vec<u8>>,
    /// Raw-encoded ordering expressions.
    pub order: Vec<Vec<u8>>,
    /// Maximum number of rows to return, if bounded.
    pub limit: Option<u64>,
}

impl MessageDecode for Find {
    fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = ProtoReader::new(payload);
        let mut msg = Find::default();

        while r.has_remaining() {
            let (field, wire_type) = r.read_tag()?;
            match field {
                1 => msg.collection = r.read_message()?,
                2 => msg.criteria = Some(r.read_bytes()?),
                3 => msg.projection.push(r.read_bytes()?),
                4 => msg.order.push(r.read_bytes()?),
                5 => msg.limit = Some(r.read_uint64()?),
                _ => r.skip_field(wire_type)?,
            }
        }

        Ok(msg)
    }
}

impl MessageEncode for Find {
    fn encode(&self, w: &mut ProtoWriter<'_>) {
        w.write_message_field(1, &self.collection);
        if let Some(criteria) = &self.criteria {
            w.write_bytes_field(2, criteria);
        }
        for proj in &self.projection {
            w.write_bytes_field(3, proj);
        }
        for order in &self.order {
            w.write_bytes_field(4, order);
        }
        if let Some(limit) = self.limit {
            w.write_varint_field(5, limit);
        }
    }
}

/// `Crud.Insert`: add one or more documents/rows to a collection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Insert {
    /// The collection being inserted into.
    pub collection: Collection,
    /// The raw-encoded documents/rows to insert.
    pub rows: Vec<Vec<u8>>,
}

impl MessageDecode for Insert {
    fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = ProtoReader::new(payload);
        let mut msg = Insert::default();

        while r.has_remaining() {
            let (field, wire_type) = r.read_tag()?;
            match field {
                1 => msg.collection = r.read_message()?,
                2 => msg.rows.push(r.read_bytes()?),
                _ => r.skip_field(wire_type)?,
            }
        }

        Ok(msg)
    }
}

impl MessageEncode for Insert {
    fn encode(&self, w: &mut ProtoWriter<'_>) {
        w.write_message_field(1, &self.collection);
        for row in &self.rows {
            w.write_bytes_field(2, row);
        }
    }
}

/// One `Crud.Update` operation: apply a raw-encoded update expression to
/// each document matched by `criteria`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Update {
    /// The collection being updated.
    pub collection: Collection,
    /// A raw-encoded `Expression` tree used as the filter criteria, if any.
    pub criteria: Option<Vec<u8>>,
    /// Raw-encoded update operations to apply to each matched document.
    pub operations: Vec<Vec<u8>>,
}

impl MessageDecode for Update {
    fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = ProtoReader::new(payload);
        let mut msg = Update::default();

        while r.has_remaining() {
            let (field, wire_type) = r.read_tag()?;
            match field {
                1 => msg.collection = r.read_message()?,
                2 => msg.criteria = Some(r.read_bytes()?),
                3 => msg.operations.push(r.read_bytes()?),
                _ => r.skip_field(wire_type)?,
            }
        }

        Ok(msg)
    }
}

impl MessageEncode for Update {
    fn encode(&self, w: &mut ProtoWriter<'_>) {
        w.write_message_field(1, &self.collection);
        if let Some(criteria) = &self.criteria {
            w.write_bytes_field(2, criteria);
        }
        for op in &self.operations {
            w.write_bytes_field(3, op);
        }
    }
}

/// `Crud.Delete`: remove documents/rows matched by `criteria`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delete {
    /// The collection being deleted from.
    pub collection: Collection,
    /// A raw-encoded `Expression` tree used as the filter criteria, if any.
    pub criteria: Option<Vec<u8>>,
}

impl MessageDecode for Delete {
    fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = ProtoReader::new(payload);
        let mut msg = Delete::default();

        while r.has_remaining() {
            let (field, wire_type) = r.read_tag()?;
            match field {
                1 => msg.collection = r.read_message()?,
                2 => msg.criteria = Some(r.read_bytes()?),
                _ => r.skip_field(wire_type)?,
            }
        }

        Ok(msg)
    }
}

impl MessageEncode for Delete {
    fn encode(&self, w: &mut ProtoWriter<'_>) {
        w.write_message_field(1, &self.collection);
        if let Some(criteria) = &self.criteria {
            w.write_bytes_field(2, criteria);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn find_roundtrip() {
        let msg = Find {
            collection: Collection { name: "users".into(), schema: "app".into() },
            criteria: Some(b"age > 18".to_vec()),
            projection: vec![b"name".to_vec()],
            order: vec![],
            limit: Some(10),
        };

        let mut buf = Vec::new();
        msg.encode(&mut ProtoWriter::new(&mut buf));
        assert_eq!(Find::decode(&buf).unwrap(), msg);
    }

    #[test]
    fn insert_roundtrip() {
        let msg = Insert {
            collection: Collection { name: "users".into(), schema: "app".into() },
            rows: vec![b"{\"name\":\"a\"}".to_vec(), b"{\"name\":\"b\"}".to_vec()],
        };

        let mut buf = Vec::new();
        msg.encode(&mut ProtoWriter::new(&mut buf));
        assert_eq!(Insert::decode(&buf).unwrap(), msg);
    }

    #[test]
    fn delete_without_criteria_roundtrip() {
        let msg = Delete { collection: Collection { name: "users".into(), schema: "app".into() }, criteria: None };
        let mut buf = Vec::new();
        msg.encode(&mut ProtoWriter::new(&mut buf));
        assert_eq!(Delete::decode(&buf).unwrap(), msg);
    }
}
