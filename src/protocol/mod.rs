//! The MySQL X Protocol engine: framing, wire codec, message catalog, and the
//! staged send/receive state machines built on top of them.

pub mod any;
pub mod codec;
pub mod engine;
pub mod error;
pub mod frame;
pub mod frame_codec;
pub mod message;
pub mod processor;
pub mod recv_op;
pub mod registry;
pub mod send_op;
pub mod stream;
pub mod tag;

pub use engine::ProtocolEngine;
pub use error::{ProtocolError, Result};
pub use processor::{ControlFlow, Processor};
pub use recv_op::{ExecuteStatement, ReadMetadata, ReadRows, RecvOp, RecvVariant, SingleMessage};
pub use registry::Message;
pub use send_op::SendOp;
pub use stream::ByteStream;
pub use tag::{ClientTag, Direction, ServerTag};
