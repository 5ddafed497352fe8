//! `Expect.Open`/`Expect.Close`: conditional execution blocks.
//!
//! A client wraps one or more messages in an `Expect` block so the server
//! can abort the whole block as soon as one of the stated conditions fails,
//! without executing the remaining messages.

use crate::protocol::codec::{MessageDecode, MessageEncode, ProtoReader, ProtoWriter};
use crate::protocol::error::ProtocolError;

/// What to do with a still-open `Expect` block further up the stack when
/// this one opens.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum CtxOperation {
    /// Replace the enclosing block's conditions with this block's.
    #[default]
    Copy,
    /// Merge this block's conditions into the enclosing block's.
    Merge,
}

/// One condition a server must satisfy for the guarded block to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    /// Which condition is being checked (e.g. "field exists", "server has capability").
    pub condition_key: u32,
    /// Condition-specific operand bytes.
    pub condition_value: Option<Vec<u8>>,
}

impl MessageDecode for Condition {
    fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = ProtoReader::new(payload);
        let mut condition_key = 0;
        let mut condition_value = None;

        while r.has_remaining() {
            let (field, wire_type) = r.read_tag()?;
            match field {
                1 => condition_key = r.read_uint32()?,
                2 => condition_value = Some(r.read_bytes()?),
                _ => r.skip_field(wire_type)?,
            }
        }

        Ok(Condition { condition_key, condition_value })
    }
}

impl MessageEncode for Condition {
    fn encode(&self, w: &mut ProtoWriter<'_>) {
        w.write_varint_field(1, self.condition_key as u64);
        if let Some(value) = &self.condition_value {
            w.write_bytes_field(2, value);
        }
    }
}

/// `Expect.Open`: begin a conditional execution block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExpectOpen {
    /// The conditions that must all hold for the block's messages to execute.
    pub conditions: Vec<Condition>,
    /// How this block's conditions combine with an already-open block.
    pub op: CtxOperation,
}

impl MessageDecode for ExpectOpen {
    fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = ProtoReader::new(payload);
        let mut msg = ExpectOpen::default();

        while r.has_remaining() {
            let (field, wire_type) = r.read_tag()?;
            match field {
                1 => msg.conditions.push(r.read_message()?),
                2 => msg.op = if r.read_uint32()? == 1 { CtxOperation::Merge } else { CtxOperation::Copy },
                _ => r.skip_field(wire_type)?,
            }
        }

        Ok(msg)
    }
}

impl MessageEncode for ExpectOpen {
    fn encode(&self, w: &mut ProtoWriter<'_>) {
        for cond in &self.conditions {
            w.write_message_field(1, cond);
        }
        w.write_varint_field(2, matches!(self.op, CtxOperation::Merge) as u64);
    }
}

/// `Expect.Close`: end the innermost open `Expect` block. Carries no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExpectClose;

impl MessageDecode for ExpectClose {
    fn decode(_payload: &[u8]) -> Result<Self, ProtocolError> {
        Ok(ExpectClose)
    }
}

impl MessageEncode for ExpectClose {
    fn encode(&self, _w: &mut ProtoWriter<'_>) {}
}
