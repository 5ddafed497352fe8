//! Session lifecycle: authentication handshake, reset, and close.

use crate::protocol::codec::{MessageDecode, MessageEncode, ProtoReader, ProtoWriter};
use crate::protocol::error::ProtocolError;

/// `Session.AuthenticateStart`: begins a SASL-style authentication exchange.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthenticateStart {
    /// The name of the authentication mechanism (e.g. `"MYSQL41"`, `"PLAIN"`).
    pub mech_name: String,
    /// Mechanism-specific initial response, if any.
    pub auth_data: Option<Vec<u8>>,
    /// An optional initial response sent eagerly, before the server's first
    /// challenge, to save a round trip.
    pub initial_response: Option<Vec<u8>>,
}

impl MessageDecode for AuthenticateStart {
    fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = ProtoReader::new(payload);
        let mut msg = AuthenticateStart::default();

        while r.has_remaining() {
            let (field, wire_type) = r.read_tag()?;
            match field {
                1 => msg.mech_name = r.read_string()?,
                2 => msg.auth_data = Some(r.read_bytes()?),
                3 => msg.initial_response = Some(r.read_bytes()?),
                _ => r.skip_field(wire_type)?,
            }
        }

        Ok(msg)
    }
}

impl MessageEncode for AuthenticateStart {
    fn encode(&self, w: &mut ProtoWriter<'_>) {
        w.write_string_field(1, &self.mech_name);
        if let Some(data) = &self.auth_data {
            w.write_bytes_field(2, data);
        }
        if let Some(data) = &self.initial_response {
            w.write_bytes_field(3, data);
        }
    }
}

/// `Session.AuthenticateContinue`, sent by either side to carry the next
/// round of a SASL exchange.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthenticateContinue {
    /// Mechanism-specific challenge or response bytes.
    pub auth_data: Vec<u8>,
}

impl MessageDecode for AuthenticateContinue {
    fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = ProtoReader::new(payload);
        let mut auth_data = Vec::new();

        while r.has_remaining() {
            let (field, wire_type) = r.read_tag()?;
            match field {
                1 => auth_data = r.read_bytes()?,
                _ => r.skip_field(wire_type)?,
            }
        }

        Ok(AuthenticateContinue { auth_data })
    }
}

impl MessageEncode for AuthenticateContinue {
    fn encode(&self, w: &mut ProtoWriter<'_>) {
        w.write_bytes_field(1, &self.auth_data);
    }
}

/// `Session.AuthenticateOk`: authentication succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthenticateOk {
    /// An optional mechanism-specific closing message (e.g. server-final SCRAM data).
    pub auth_data: Option<Vec<u8>>,
}

impl MessageDecode for AuthenticateOk {
    fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = ProtoReader::new(payload);
        let mut auth_data = None;

        while r.has_remaining() {
            let (field, wire_type) = r.read_tag()?;
            match field {
                1 => auth_data = Some(r.read_bytes()?),
                _ => r.skip_field(wire_type)?,
            }
        }

        Ok(AuthenticateOk { auth_data })
    }
}

impl MessageEncode for AuthenticateOk {
    fn encode(&self, w: &mut ProtoWriter<'_>) {
        if let Some(data) = &self.auth_data {
            w.write_bytes_field(1, data);
        }
    }
}

/// `Session.Reset`: discard session-local state (current schema, prepared
/// statements, `Expect` blocks) without closing the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionReset {
    /// If true, the underlying connection is kept open and ready for a new
    /// session without a fresh authentication handshake.
    pub keep_open: bool,
}

impl MessageDecode for SessionReset {
    fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = ProtoReader::new(payload);
        let mut keep_open = false;

        while r.has_remaining() {
            let (field, wire_type) = r.read_tag()?;
            match field {
                1 => keep_open = r.read_bool()?,
                _ => r.skip_field(wire_type)?,
            }
        }

        Ok(SessionReset { keep_open })
    }
}

impl MessageEncode for SessionReset {
    fn encode(&self, w: &mut ProtoWriter<'_>) {
        w.write_bool_field(1, self.keep_open);
    }
}

/// `Session.Close`: end the session. Carries no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionClose;

impl MessageDecode for SessionClose {
    fn decode(_payload: &[u8]) -> Result<Self, ProtocolError> {
        Ok(SessionClose)
    }
}

impl MessageEncode for SessionClose {
    fn encode(&self, _w: &mut ProtoWriter<'_>) {}
}

/// `Connection.Close`: politely close the underlying connection. Carries no
/// payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectionClose;

impl MessageDecode for ConnectionClose {
    fn decode(_payload: &[u8]) -> Result<Self, ProtocolError> {
        Ok(ConnectionClose)
    }
}

impl MessageEncode for ConnectionClose {
    fn encode(&self, _w: &mut ProtoWriter<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn authenticate_start_roundtrip() {
        let msg = AuthenticateStart {
            mech_name: "MYSQL41".into(),
            auth_data: None,
            initial_response: Some(vec![1, 2, 3]),
        };

        let mut buf = Vec::new();
        msg.encode(&mut ProtoWriter::new(&mut buf));
        assert_eq!(AuthenticateStart::decode(&buf).unwrap(), msg);
    }

    #[test]
    fn session_reset_roundtrip() {
        let msg = SessionReset { keep_open: true };
        let mut buf = Vec::new();
        msg.encode(&mut ProtoWriter::new(&mut buf));
        assert_eq!(SessionReset::decode(&buf).unwrap(), msg);
    }
}
