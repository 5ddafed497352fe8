//! `Sql.StmtExecute` and its terminal acknowledgement.

use crate::protocol::codec::{MessageDecode, MessageEncode, ProtoReader, ProtoWriter};
use crate::protocol::error::ProtocolError;

/// Which statement namespace a [`StmtExecute`] runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Namespace {
    /// Plain SQL, as accepted by the classic MySQL protocol.
    Sql,
    /// The document-store CRUD surface (`xplugin`).
    Mysqlx,
    /// A namespace unknown to this engine, preserved verbatim for forwarding.
    Other(String),
}

impl Namespace {
    fn as_str(&self) -> &str {
        match self {
            Namespace::Sql => "sql",
            Namespace::Mysqlx => "mysqlx",
            Namespace::Other(s) => s,
        }
    }

    fn parse(s: String) -> Self {
        match s.as_str() {
            "sql" => Namespace::Sql,
            "mysqlx" => Namespace::Mysqlx,
            _ => Namespace::Other(s),
        }
    }
}

/// `Sql.StmtExecute`: execute a statement, optionally bound to positional
/// arguments. Each argument is the raw encoding of an `Any` scalar (§6.5);
/// the engine forwards it uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StmtExecute {
    /// The namespace the statement text is interpreted in.
    pub namespace: Namespace,
    /// The statement text or pre-compiled statement id, as raw bytes.
    pub stmt: Vec<u8>,
    /// Positional bind arguments, each a raw `Any`-encoded value.
    pub args: Vec<Vec<u8>>,
    /// If true, the server may omit `ColumnMetaData` fields that have not
    /// changed since the last execution of this statement.
    pub compact_metadata: bool,
}

impl Default for StmtExecute {
    fn default() -> Self {
        StmtExecute {
            namespace: Namespace::Sql,
            stmt: Vec::new(),
            args: Vec::new(),
            compact_metadata: false,
        }
    }
}

impl MessageDecode for StmtExecute {
    fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = ProtoReader::new(payload);
        let mut msg = StmtExecute::default();

        while r.has_remaining() {
            let (field, wire_type) = r.read_tag()?;
            match field {
                1 => msg.namespace = Namespace::parse(r.read_string()?),
                2 => msg.stmt = r.read_bytes()?,
                3 => msg.args.push(r.read_bytes()?),
                4 => msg.compact_metadata = r.read_bool()?,
                _ => r.skip_field(wire_type)?,
            }
        }

        Ok(msg)
    }
}

impl MessageEncode for StmtExecute {
    fn encode(&self, w: &mut ProtoWriter<'_>) {
        w.write_string_field(1, self.namespace.as_str());
        w.write_bytes_field(2, &self.stmt);
        for arg in &self.args {
            w.write_bytes_field(3, arg);
        }
        w.write_bool_field(4, self.compact_metadata);
    }
}

/// `Sql.StmtExecuteOk`: terminates a statement execution after all result
/// sets (if any) have been fetched. Carries no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StmtExecuteOk;

impl MessageDecode for StmtExecuteOk {
    fn decode(_payload: &[u8]) -> Result<Self, ProtocolError> {
        Ok(StmtExecuteOk)
    }
}

impl MessageEncode for StmtExecuteOk {
    fn encode(&self, _w: &mut ProtoWriter<'_>) {}
}
