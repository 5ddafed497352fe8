//! The out-of-band `Error` frame payload.
//!
//! Decoded by the engine itself (never through the registry's per-type
//! dispatch) and delivered to `Processor::error`, per I5.

use crate::protocol::codec::{MessageDecode, MessageEncode, ProtoReader, ProtoWriter};
use crate::protocol::error::ProtocolError;

/// Severity of a server error.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Severity {
    /// A recoverable error affecting the current statement only.
    #[default]
    Error,
    /// An unrecoverable error that also closes the connection.
    Fatal,
}

/// The decoded payload of an X Protocol `Error` frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerError {
    /// The numeric server error code (e.g. 1045).
    pub code: u32,
    /// Severity of the error.
    pub severity: Severity,
    /// The five-character SQLSTATE string (defaults to `"HY000"`).
    pub sql_state: String,
    /// A human-readable error message.
    pub message: String,
}

impl Default for ServerError {
    fn default() -> Self {
        ServerError {
            code: 0,
            severity: Severity::default(),
            sql_state: "HY000".to_string(),
            message: String::new(),
        }
    }
}

impl MessageDecode for ServerError {
    fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = ProtoReader::new(payload);
        let mut err = ServerError::default();

        while r.has_remaining() {
            let (field, wire_type) = r.read_tag()?;
            match field {
                1 => err.severity = if r.read_uint32()? == 1 { Severity::Fatal } else { Severity::Error },
                2 => err.code = r.read_uint32()?,
                3 => err.sql_state = r.read_string()?,
                4 => err.message = r.read_string()?,
                _ => r.skip_field(wire_type)?,
            }
        }

        Ok(err)
    }
}

impl MessageEncode for ServerError {
    fn encode(&self, w: &mut ProtoWriter<'_>) {
        w.write_varint_field(1, matches!(self.severity, Severity::Fatal) as u64);
        w.write_varint_field(2, self.code as u64);
        w.write_string_field(3, &self.sql_state);
        w.write_string_field(4, &self.message);
    }
}
