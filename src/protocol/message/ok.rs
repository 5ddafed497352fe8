//! The generic `Ok` acknowledgement.
//!
//! Named `OkMessage` rather than `Ok` to avoid shadowing `std::result::Result::Ok`
//! wherever this module is glob-imported.

use crate::protocol::codec::{MessageDecode, MessageEncode, ProtoReader, ProtoWriter};
use crate::protocol::error::ProtocolError;

/// A generic acknowledgement, optionally carrying a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OkMessage {
    /// An optional status message.
    pub msg: Option<String>,
}

impl MessageDecode for OkMessage {
    fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = ProtoReader::new(payload);
        let mut msg = None;

        while r.has_remaining() {
            let (field, wire_type) = r.read_tag()?;
            match field {
                1 => msg = Some(r.read_string()?),
                _ => r.skip_field(wire_type)?,
            }
        }

        Ok(Self { msg })
    }
}

impl MessageEncode for OkMessage {
    fn encode(&self, w: &mut ProtoWriter<'_>) {
        if let Some(msg) = &self.msg {
            w.write_string_field(1, msg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::codec::test_util::test_roundtrip;
    use pretty_assertions::assert_eq;

    #[test]
    fn ok_roundtrip_with_message() -> anyhow::Result<()> {
        test_roundtrip(&OkMessage { msg: Some("done".into()) })
    }

    #[test]
    fn ok_roundtrip_empty() {
        let ok = OkMessage::default();
        let mut buf = Vec::new();
        ok.encode(&mut ProtoWriter::new(&mut buf));
        assert_eq!(OkMessage::decode(&buf).unwrap(), ok);
        assert!(buf.is_empty());
    }
}
