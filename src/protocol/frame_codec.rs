//! Encodes and decodes frames and owns the raw send/receive buffers.
//!
//! Reads and writes drain in a loop that keeps calling the stream until it
//! either finishes or reports it would block, so a frame's header and
//! payload can each be split across any number of partial reads.

use std::io;

use super::error::{ProtocolError, Result};
use super::frame::{self, Header, HEADER_SIZE};
use super::codec::{MessageEncode, ProtoWriter};
use super::stream::ByteStream;

/// Encodes/decodes frames for one [`super::engine::ProtocolEngine`].
///
/// Holds the growable read and write buffers (`rd_buf`/`wr_buf`), growing each
/// on demand up to `max_frame`. Growth is monotonic within a connection.
pub struct FrameCodec {
    max_frame: u32,

    rd_header_buf: [u8; HEADER_SIZE],
    rd_header_filled: usize,
    rd_header: Option<Header>,
    rd_buf: Vec<u8>,
    rd_payload_filled: usize,

    wr_buf: Vec<u8>,
    wr_filled: usize,
}

impl FrameCodec {
    /// Creates a codec with the given initial buffer capacity and frame size
    /// ceiling.
    pub fn new(initial_capacity: usize, max_frame: u32) -> Self {
        FrameCodec {
            max_frame,
            rd_header_buf: [0; HEADER_SIZE],
            rd_header_filled: 0,
            rd_header: None,
            rd_buf: Vec::with_capacity(initial_capacity),
            rd_payload_filled: 0,
            wr_buf: Vec::with_capacity(initial_capacity),
            wr_filled: 0,
        }
    }

    /// Whether a header has been fully parsed (`rd_msg.state == AwaitPayload`).
    ///
    /// True either because this codec read it itself, or because a previous
    /// `RecvOp` returned `Stop` and left it parsed for the next one (the
    /// engine never re-reads or re-validates a header it already has).
    pub fn header_ready(&self) -> bool {
        self.rd_header.is_some()
    }

    /// The current frame's type tag. Only meaningful once [`Self::header_ready`].
    pub fn current_tag(&self) -> u8 {
        self.rd_header.expect("header_ready() must be true").tag
    }

    /// The current frame's payload size. Only meaningful once
    /// [`Self::header_ready`].
    pub fn current_size(&self) -> u32 {
        self.rd_header.expect("header_ready() must be true").payload_size
    }

    /// The current frame's payload bytes, once fully buffered.
    pub fn payload(&self) -> &[u8] {
        &self.rd_buf[..self.rd_payload_filled]
    }

    /// Drives the header read. Returns `Ok(true)` once the header is parsed
    /// (or was already parsed by a prior `RecvOp`).
    pub fn read_header(&mut self, stream: &mut dyn ByteStream) -> Result<bool> {
        if self.rd_header.is_some() {
            return Ok(true);
        }

        while self.rd_header_filled < HEADER_SIZE {
            match stream.read(&mut self.rd_header_buf[self.rd_header_filled..]) {
                Ok(0) => return Err(ProtocolError::Eos),
                Ok(n) => self.rd_header_filled += n,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(false),
                Err(e) => return Err(e.into()),
            }
        }

        let header = frame::decode_header(&self.rd_header_buf, self.max_frame)?;
        log::trace!("frame header: tag={} payload_size={}", header.tag, header.payload_size);

        if (self.rd_buf.len() as u32) < header.payload_size {
            self.rd_buf.resize(header.payload_size as usize, 0);
        }
        self.rd_payload_filled = 0;
        self.rd_header = Some(header);
        Ok(true)
    }

    /// Blocking counterpart of [`Self::read_header`].
    pub fn read_header_wait(&mut self, stream: &mut dyn ByteStream) -> Result<()> {
        while !self.read_header(stream)? {}
        Ok(())
    }

    /// Drives the payload read. Returns `Ok(true)` once the full payload is
    /// buffered. Requires [`Self::header_ready`].
    pub fn read_payload(&mut self, stream: &mut dyn ByteStream) -> Result<bool> {
        let size = self.current_size() as usize;
        while self.rd_payload_filled < size {
            match stream.read(&mut self.rd_buf[self.rd_payload_filled..size]) {
                Ok(0) => return Err(ProtocolError::Eos),
                Ok(n) => self.rd_payload_filled += n,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(false),
                Err(e) => return Err(e.into()),
            }
        }
        Ok(true)
    }

    /// Blocking counterpart of [`Self::read_payload`].
    pub fn read_payload_wait(&mut self, stream: &mut dyn ByteStream) -> Result<()> {
        while !self.read_payload(stream)? {}
        Ok(())
    }

    /// Discards the current frame's state so the next [`Self::read_header`]
    /// call starts a fresh header read.
    pub fn finish_frame(&mut self) {
        self.rd_header = None;
        self.rd_header_filled = 0;
        self.rd_payload_filled = 0;
    }

    /// Serializes `msg` into `wr_buf` behind a header, ready to be drained by
    /// [`Self::write_cont`]/[`Self::write_wait`].
    ///
    /// The first bit sent of any frame is the low byte of its size: the
    /// header is patched in after encoding the payload, the same two-pass
    /// technique `write_message_field` uses for embedded messages.
    pub fn begin_write<M: MessageEncode>(&mut self, tag: u8, msg: &M) -> Result<()> {
        self.wr_buf.clear();
        self.wr_buf.resize(HEADER_SIZE, 0);
        msg.encode(&mut ProtoWriter::new(&mut self.wr_buf));

        let payload_size = self.wr_buf.len() - HEADER_SIZE;
        if payload_size as u64 + 1 > self.max_frame as u64 {
            self.wr_buf.clear();
            self.wr_filled = 0;
            return Err(ProtocolError::Oversize { max: self.max_frame });
        }

        frame::encode_header(&mut self.wr_buf[..HEADER_SIZE], tag, payload_size as u32);
        self.wr_filled = 0;
        log::debug!("send: tag={tag} payload_size={payload_size}");
        Ok(())
    }

    /// Drives the pending write. Returns `Ok(true)` once everything queued by
    /// [`Self::begin_write`] has been written.
    pub fn write_cont(&mut self, stream: &mut dyn ByteStream) -> Result<bool> {
        while self.wr_filled < self.wr_buf.len() {
            match stream.write(&self.wr_buf[self.wr_filled..]) {
                Ok(0) => return Err(ProtocolError::Eos),
                Ok(n) => self.wr_filled += n,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(false),
                Err(e) => return Err(e.into()),
            }
        }
        Ok(true)
    }

    /// Blocking counterpart of [`Self::write_cont`].
    pub fn write_wait(&mut self, stream: &mut dyn ByteStream) -> Result<()> {
        while !self.write_cont(stream)? {}
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crate::protocol::codec::ProtoWriter as PW;

    struct Msg(Vec<u8>);
    impl MessageEncode for Msg {
        fn encode(&self, w: &mut PW<'_>) {
            w.write_bytes_field(1, &self.0);
        }
    }

    #[test]
    fn write_then_read_roundtrip() {
        let mut codec = FrameCodec::new(64, frame::MAX_FRAME);
        codec.begin_write(5, &Msg(b"hello".to_vec())).unwrap();

        let mut wire = Vec::new();
        codec.write_wait(&mut wire).unwrap();

        let mut reader = std::io::Cursor::new(wire);
        let mut rd_codec = FrameCodec::new(64, frame::MAX_FRAME);
        rd_codec.read_header_wait(&mut reader).unwrap();
        assert_eq!(rd_codec.current_tag(), 5);
        rd_codec.read_payload_wait(&mut reader).unwrap();
        assert_eq!(rd_codec.payload().len(), rd_codec.current_size() as usize);
    }

    #[test]
    fn oversize_write_is_rejected_without_large_allocation() {
        let mut codec = FrameCodec::new(8, 4);
        let err = codec.begin_write(1, &Msg(b"abcdef".to_vec())).unwrap_err();
        assert_matches!(err, ProtocolError::Oversize { max: 4 });
    }

    #[test]
    fn fragmented_header_read() {
        let header_bytes = {
            let mut buf = [0u8; HEADER_SIZE];
            frame::encode_header(&mut buf, 7, 3);
            buf
        };

        struct OneByteAtATime<'a> {
            data: &'a [u8],
            pos: usize,
        }
        impl ByteStream for OneByteAtATime<'_> {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.pos >= self.data.len() {
                    return Ok(0);
                }
                buf[0] = self.data[self.pos];
                self.pos += 1;
                Ok(1)
            }
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                unreachable!()
            }
        }

        let mut stream = OneByteAtATime { data: &header_bytes, pos: 0 };
        let mut codec = FrameCodec::new(64, frame::MAX_FRAME);

        for _ in 0..HEADER_SIZE - 1 {
            assert!(!codec.read_header(&mut stream).unwrap());
        }
        assert!(codec.read_header(&mut stream).unwrap());
        assert_eq!(codec.current_tag(), 7);
        assert_eq!(codec.current_size(), 3);
    }
}
