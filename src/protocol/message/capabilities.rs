//! `Connection.CapabilitiesGet`/`CapabilitiesSet` and their response.

use crate::protocol::codec::{MessageDecode, MessageEncode, ProtoReader, ProtoWriter};
use crate::protocol::error::ProtocolError;

/// One named capability. `value` is the raw encoding of an `Any` scalar
/// (§6.5); the engine does not interpret it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    /// The capability's name (e.g. `"tls"`, `"authentication.mechanisms"`).
    pub name: String,
    /// The raw `Any`-encoded value, or `None` if the capability carries no value.
    pub value: Option<Vec<u8>>,
}

impl MessageDecode for Capability {
    fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = ProtoReader::new(payload);
        let mut name = String::new();
        let mut value = None;

        while r.has_remaining() {
            let (field, wire_type) = r.read_tag()?;
            match field {
                1 => name = r.read_string()?,
                2 => value = Some(r.read_bytes()?),
                _ => r.skip_field(wire_type)?,
            }
        }

        Ok(Capability { name, value })
    }
}

impl MessageEncode for Capability {
    fn encode(&self, w: &mut ProtoWriter<'_>) {
        w.write_string_field(1, &self.name);
        if let Some(value) = &self.value {
            w.write_bytes_field(2, value);
        }
    }
}

/// `Connection.CapabilitiesGet`: request the server's capability set. Carries
/// no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilitiesGet;

impl MessageDecode for CapabilitiesGet {
    fn decode(_payload: &[u8]) -> Result<Self, ProtocolError> {
        Ok(CapabilitiesGet)
    }
}

impl MessageEncode for CapabilitiesGet {
    fn encode(&self, _w: &mut ProtoWriter<'_>) {}
}

/// `Connection.CapabilitiesSet`: negotiate a subset of capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CapabilitiesSet {
    /// The capabilities the client wishes to enable.
    pub capabilities: Vec<Capability>,
}

impl MessageDecode for CapabilitiesSet {
    fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = ProtoReader::new(payload);
        let mut capabilities = Vec::new();

        while r.has_remaining() {
            let (field, wire_type) = r.read_tag()?;
            match field {
                1 => capabilities.push(r.read_message()?),
                _ => r.skip_field(wire_type)?,
            }
        }

        Ok(CapabilitiesSet { capabilities })
    }
}

impl MessageEncode for CapabilitiesSet {
    fn encode(&self, w: &mut ProtoWriter<'_>) {
        for cap in &self.capabilities {
            w.write_message_field(1, cap);
        }
    }
}

/// Response to `CapabilitiesGet`/`CapabilitiesSet`, carrying the server's
/// (possibly reduced) capability set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CapabilitiesResponse {
    /// The resulting capability set.
    pub capabilities: Vec<Capability>,
}

impl MessageDecode for CapabilitiesResponse {
    fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = ProtoReader::new(payload);
        let mut capabilities = Vec::new();

        while r.has_remaining() {
            let (field, wire_type) = r.read_tag()?;
            match field {
                1 => capabilities.push(r.read_message()?),
                _ => r.skip_field(wire_type)?,
            }
        }

        Ok(CapabilitiesResponse { capabilities })
    }
}

impl MessageEncode for CapabilitiesResponse {
    fn encode(&self, w: &mut ProtoWriter<'_>) {
        for cap in &self.capabilities {
            w.write_message_field(1, cap);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn capabilities_set_roundtrip() {
        let msg = CapabilitiesSet {
            capabilities: vec![
                Capability { name: "tls".into(), value: Some(vec![1]) },
                Capability { name: "compression".into(), value: None },
            ],
        };

        let mut buf = Vec::new();
        msg.encode(&mut ProtoWriter::new(&mut buf));
        assert_eq!(CapabilitiesSet::decode(&buf).unwrap(), msg);
    }

    #[test]
    fn capabilities_get_has_empty_payload() {
        let mut buf = Vec::new();
        CapabilitiesGet.encode(&mut ProtoWriter::new(&mut buf));
        assert!(buf.is_empty());
    }
}
