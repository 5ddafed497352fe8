//! The out-of-band `Notice` frame envelope.
//!
//! The engine only decodes the envelope (scope, sub-type, raw payload); the
//! sub-message itself (warning, session variable change, ...) is handed to
//! the processor as raw bytes, since its full grammar is out of scope here.

use crate::protocol::codec::{MessageDecode, MessageEncode, ProtoReader, ProtoWriter};
use crate::protocol::error::ProtocolError;

/// Whether a notice applies to the whole connection or only the current
/// statement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum NoticeScope {
    /// The notice concerns the whole connection (e.g. a server variable changed).
    Global,
    /// The notice concerns only the statement currently executing.
    #[default]
    Local,
}

/// The envelope of an out-of-band `Notice` frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeFrame {
    /// The notice sub-type (e.g. warning, session variable changed).
    pub notice_type: u32,
    /// Whether this notice is global or local to the current statement.
    pub scope: NoticeScope,
    /// The raw, undecoded sub-message payload.
    pub payload: Vec<u8>,
}

impl MessageDecode for NoticeFrame {
    fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = ProtoReader::new(payload);
        let mut notice_type = 0;
        let mut scope = NoticeScope::default();
        let mut notice_payload = Vec::new();

        while r.has_remaining() {
            let (field, wire_type) = r.read_tag()?;
            match field {
                1 => notice_type = r.read_uint32()?,
                2 => {
                    scope = match r.read_uint32()? {
                        1 => NoticeScope::Global,
                        _ => NoticeScope::Local,
                    }
                }
                3 => notice_payload = r.read_bytes()?,
                _ => r.skip_field(wire_type)?,
            }
        }

        Ok(NoticeFrame { notice_type, scope, payload: notice_payload })
    }
}

impl MessageEncode for NoticeFrame {
    fn encode(&self, w: &mut ProtoWriter<'_>) {
        w.write_varint_field(1, self.notice_type as u64);
        w.write_varint_field(2, matches!(self.scope, NoticeScope::Global) as u64);
        if !self.payload.is_empty() {
            w.write_bytes_field(3, &self.payload);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn notice_roundtrip() {
        let notice = NoticeFrame {
            notice_type: 1,
            scope: NoticeScope::Local,
            payload: b"deprecated".to_vec(),
        };

        let mut buf = Vec::new();
        notice.encode(&mut ProtoWriter::new(&mut buf));
        assert_eq!(NoticeFrame::decode(&buf).unwrap(), notice);
    }

    #[test]
    fn global_scope_roundtrip() {
        let notice = NoticeFrame { notice_type: 3, scope: NoticeScope::Global, payload: vec![] };
        let mut buf = Vec::new();
        notice.encode(&mut ProtoWriter::new(&mut buf));
        assert_eq!(NoticeFrame::decode(&buf).unwrap(), notice);
    }
}
