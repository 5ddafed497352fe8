//! Ties framing, send, and receive together into one per-connection engine.
//!
//! Owns one stream plus its read/write buffers and the in-flight send/receive
//! bookkeeping, split into the codec/send-slot/recv-slot arrangement
//! described in §4.1/§4.7.

use super::error::{ProtocolError, Result};
use super::frame_codec::FrameCodec;
use super::processor::Processor;
use super::recv_op::{RecvOp, RecvOpDyn, RecvVariant};
use super::send_op::SendOp;
use super::stream::ByteStream;
use super::tag::Direction;
use crate::config::EngineConfig;

/// A single-connection, single-threaded protocol engine.
///
/// Owns the byte stream, the frame codec, and at most one in-flight send and
/// one in-flight receive at a time (I1): starting a new send while one is
/// already in flight returns [`ProtocolError::Busy`]; the same is true for
/// receives, except that resuming the existing (not-yet-finished) receive via
/// [`Self::recv_cont`]/[`Self::recv_wait`] is always fine.
pub struct ProtocolEngine<S: ByteStream> {
    stream: S,
    dir: Direction,
    codec: FrameCodec,
    send_slot: Option<SendOp>,
    recv_slot: Option<Box<dyn RecvOpDyn>>,
}

impl<S: ByteStream> ProtocolEngine<S> {
    /// Creates an engine for `stream`, receiving frames in the direction
    /// `dir` (i.e. `Direction::FromServer` for a client engine,
    /// `Direction::FromClient` for a server engine).
    pub fn new(stream: S, dir: Direction, config: &EngineConfig) -> Self {
        ProtocolEngine {
            stream,
            dir,
            codec: FrameCodec::new(config.initial_buf_capacity, config.max_frame_size),
            send_slot: None,
            recv_slot: None,
        }
    }

    /// A reference to the underlying stream, e.g. to register it with a
    /// reactor.
    pub fn stream(&self) -> &S {
        &self.stream
    }

    /// A mutable reference to the underlying stream.
    pub fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Starts sending `msg` under `tag`. Fails with [`ProtocolError::Busy`] if
    /// a previous send has not yet completed.
    pub fn snd_start<M: super::codec::MessageEncode>(&mut self, tag: u8, msg: &M) -> Result<()> {
        if matches!(&self.send_slot, Some(op) if !op.is_completed()) {
            return Err(ProtocolError::Busy);
        }
        self.send_slot = Some(SendOp::start(&mut self.codec, tag, msg)?);
        Ok(())
    }

    /// Drives the in-flight send without blocking. `Ok(true)` once complete.
    pub fn send_cont(&mut self) -> Result<bool> {
        match &mut self.send_slot {
            Some(op) => op.cont(&mut self.codec, &mut self.stream),
            None => Ok(true),
        }
    }

    /// Blocks until the in-flight send completes.
    pub fn send_wait(&mut self) -> Result<()> {
        match &mut self.send_slot {
            Some(op) => op.wait(&mut self.codec, &mut self.stream),
            None => Ok(()),
        }
    }

    /// Starts and blocks until `msg` is fully sent.
    pub fn send<M: super::codec::MessageEncode>(&mut self, tag: u8, msg: &M) -> Result<()> {
        self.snd_start(tag, msg)?;
        self.send_wait()
    }

    /// Starts a new receive of variant `V` if none is in flight, or resumes
    /// the existing one. Callers drive it with [`Self::recv_cont`]/
    /// [`Self::recv_wait`] and read it back with [`Self::recv_variant`] once
    /// [`Self::recv_is_done`].
    pub fn recv_start<V: RecvVariant + 'static>(&mut self) {
        let needs_new = match &self.recv_slot {
            None => true,
            Some(op) => op.is_done_dyn(),
        };
        if needs_new {
            self.recv_slot = Some(Box::new(RecvOp::<V>::new()));
        }
    }

    /// Drives the in-flight receive without blocking, dispatching decoded
    /// messages to `processor`. `Ok(true)` once the receive has finished.
    pub fn recv_cont(&mut self, processor: &mut dyn Processor) -> Result<bool> {
        match &mut self.recv_slot {
            Some(op) => op.cont_dyn(&mut self.codec, &mut self.stream, processor, self.dir),
            None => Ok(true),
        }
    }

    /// Blocks until the in-flight receive finishes.
    pub fn recv_wait(&mut self, processor: &mut dyn Processor) -> Result<()> {
        match &mut self.recv_slot {
            Some(op) => op.wait_dyn(&mut self.codec, &mut self.stream, processor, self.dir),
            None => Ok(()),
        }
    }

    /// Starts (if needed) and blocks a receive of variant `V` to completion.
    pub fn recv<V: RecvVariant + 'static>(&mut self, processor: &mut dyn Processor) -> Result<()> {
        self.recv_start::<V>();
        self.recv_wait(processor)
    }

    /// Whether the in-flight receive, if any, has finished.
    pub fn recv_is_done(&self) -> bool {
        self.recv_slot.as_ref().map_or(true, |op| op.is_done_dyn())
    }

    /// Recovers variant-specific state from the finished receive (e.g.
    /// [`super::recv_op::ReadRows::more_resultsets`]), if the last receive was
    /// started as variant `V`.
    pub fn recv_variant<V: RecvVariant + 'static>(&self) -> Option<&V> {
        self.recv_slot
            .as_ref()
            .and_then(|op| op.as_any().downcast_ref::<RecvOp<V>>())
            .map(|op| op.variant())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::message::{OkMessage, Row};
    use crate::protocol::recv_op::{ReadRows, SingleMessage};
    use crate::protocol::tag::ServerTag;

    #[derive(Default)]
    struct Collecting {
        oks: Vec<OkMessage>,
        rows: Vec<Row>,
    }

    impl Processor for Collecting {
        fn ok(&mut self, msg: &OkMessage) {
            self.oks.push(msg.clone());
        }
        fn row(&mut self, msg: &Row) {
            self.rows.push(msg.clone());
        }
    }

    struct Duplex {
        inbound: std::io::Cursor<Vec<u8>>,
        outbound: Vec<u8>,
    }

    impl ByteStream for Duplex {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            std::io::Read::read(&mut self.inbound, buf)
        }
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.outbound.extend_from_slice(buf);
            Ok(buf.len())
        }
    }

    fn frame(tag: u8, payload: &[u8]) -> Vec<u8> {
        let mut buf = vec![0u8; 5];
        buf.extend_from_slice(payload);
        let size = (payload.len() + 1) as u32;
        buf[0..4].copy_from_slice(&size.to_le_bytes());
        buf[4] = tag;
        buf
    }

    #[test]
    fn send_then_recv_round_trip_through_an_in_memory_duplex() {
        let wire = frame(ServerTag::Ok as u8, &[]);
        let stream = Duplex { inbound: std::io::Cursor::new(wire), outbound: Vec::new() };
        let mut engine = ProtocolEngine::new(stream, Direction::FromServer, &EngineConfig::default());

        engine.send(1, &super::super::message::CapabilitiesGet).unwrap();
        assert!(!engine.stream().outbound.is_empty());

        let mut proc = Collecting::default();
        engine.recv::<SingleMessage>(&mut proc).unwrap();
        assert_eq!(proc.oks.len(), 1);
        assert!(engine.recv_is_done());
    }

    #[test]
    fn busy_send_is_rejected_until_the_previous_one_completes() {
        let stream = Duplex { inbound: std::io::Cursor::new(Vec::new()), outbound: Vec::new() };
        let mut engine = ProtocolEngine::new(stream, Direction::FromClient, &EngineConfig::default());

        engine.snd_start(1, &super::super::message::CapabilitiesGet).unwrap();
        engine.send_wait().unwrap();

        // The slot is free again once the previous send completed.
        assert!(engine.snd_start(1, &super::super::message::CapabilitiesGet).is_ok());
    }

    #[test]
    fn recv_start_is_idempotent_while_a_receive_is_in_flight() {
        struct StallsAfter {
            data: Vec<u8>,
            pos: usize,
            limit: usize,
        }
        impl ByteStream for StallsAfter {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                if self.pos >= self.limit {
                    return Err(std::io::Error::from(std::io::ErrorKind::WouldBlock));
                }
                let n = buf.len().min(self.limit - self.pos).min(self.data.len() - self.pos);
                buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
                self.pos += n;
                Ok(n)
            }
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                unreachable!()
            }
        }

        let wire = frame(ServerTag::ResultsetRow as u8, &[]);
        let wire_len = wire.len();
        let stream = StallsAfter { data: wire, pos: 0, limit: 4 };
        let mut engine = ProtocolEngine::new(stream, Direction::FromServer, &EngineConfig::default());

        // Only the header's first four bytes are available, so the receive
        // suspends mid-frame: resuming it via recv_start must not replace it
        // with a fresh RecvOp (P7).
        engine.recv_start::<ReadRows>();
        let mut proc = Collecting::default();
        assert!(!engine.recv_cont(&mut proc).unwrap());

        engine.recv_start::<ReadRows>();
        assert!(!engine.recv_is_done());

        engine.stream_mut().limit = wire_len;
        assert!(!engine.recv_cont(&mut proc).unwrap(), "ReadRows keeps looping after one row");
        assert_eq!(proc.rows.len(), 1);
    }

    #[test]
    fn recv_variant_recovers_more_resultsets_after_completion() {
        let wire = frame(ServerTag::ResultsetFetchDoneMoreResultsets as u8, &[]);
        let stream = Duplex { inbound: std::io::Cursor::new(wire), outbound: Vec::new() };
        let mut engine = ProtocolEngine::new(stream, Direction::FromServer, &EngineConfig::default());

        let mut proc = Collecting::default();
        engine.recv::<ReadRows>(&mut proc).unwrap();

        assert!(engine.recv_variant::<ReadRows>().unwrap().more_resultsets());
    }
}
