//! Defines the engine's wire-level error type.

use thiserror::Error;

/// Errors the protocol engine can raise while framing, decoding, or dispatching
/// messages.
///
/// This is a closed set: every failure mode the engine can hit during normal
/// operation has a variant here. `std::io::ErrorKind::WouldBlock` is never
/// wrapped into a `ProtocolError` — it is consumed entirely inside `cont()`
/// and surfaces only as "not done yet".
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The stream ended in the middle of a frame.
    #[error("unexpected end of stream while reading a frame")]
    Eos,

    /// The underlying stream reported an I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The frame header was malformed (zero-length, or otherwise inconsistent).
    #[error("malformed frame: {0}")]
    Frame(String),

    /// The declared frame size exceeds [`crate::protocol::frame::MAX_FRAME`].
    #[error("frame size exceeds the maximum of {max} bytes")]
    Oversize {
        /// The maximum permitted frame size.
        max: u32,
    },

    /// No decoder is registered for this `(Direction, TypeTag)` pair.
    #[error("no decoder registered for message type {tag}")]
    UnknownMessage {
        /// The offending type tag.
        tag: u8,
    },

    /// A decoder exists for this tag, but the active `RecvOp` variant does not
    /// expect it in its current state.
    #[error("unexpected message type {tag} for the current receive operation")]
    UnexpectedMessage {
        /// The offending type tag.
        tag: u8,
    },

    /// The payload failed to parse against its message schema.
    #[error("failed to decode message type {tag}: {reason}")]
    Decode {
        /// The type tag whose payload failed to parse.
        tag: u8,
        /// A human-readable description of the parse failure.
        reason: String,
    },

    /// The server reported an X Protocol error frame.
    #[error("server error {code} ({sql_state}): {message}")]
    ServerError {
        /// The numeric server error code.
        code: u32,
        /// The five-character SQLSTATE string.
        sql_state: String,
        /// The human-readable error message.
        message: String,
    },

    /// A send was attempted while a previous send was still in flight.
    #[error("a send operation is already in progress")]
    Busy,
}

/// A specialized `Result` for protocol engine operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;
