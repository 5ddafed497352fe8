//! A single in-flight outgoing message (§4.2).
//!
//! Encodes once into the write buffer, then drains it with `WouldBlock`
//! meaning "not done yet".

use super::codec::MessageEncode;
use super::error::Result;
use super::frame_codec::FrameCodec;
use super::stream::ByteStream;

/// One in-flight send, started by [`super::engine::ProtocolEngine::snd_start`].
///
/// Cancellation is unsupported: a send abandoned mid-write would desync the
/// stream for whatever comes after it. Callers must drive it to completion
/// (`cont`/`wait`) or drop the stream entirely.
#[derive(Debug)]
pub struct SendOp {
    completed: bool,
}

impl SendOp {
    /// Serializes `(tag, msg)` into the engine's write buffer and prepares
    /// for draining.
    pub fn start<M: MessageEncode>(codec: &mut FrameCodec, tag: u8, msg: &M) -> Result<Self> {
        codec.begin_write(tag, msg)?;
        Ok(SendOp { completed: false })
    }

    /// Whether the write has fully completed.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Drives the write. Returns `Ok(true)` once every byte has been handed
    /// to `stream`; `Ok(false)` if the stream would block.
    pub fn cont(&mut self, codec: &mut FrameCodec, stream: &mut dyn ByteStream) -> Result<bool> {
        if codec.write_cont(stream)? {
            self.completed = true;
        }
        Ok(self.completed)
    }

    /// Blocks until the write completes.
    pub fn wait(&mut self, codec: &mut FrameCodec, stream: &mut dyn ByteStream) -> Result<()> {
        codec.write_wait(stream)?;
        self.completed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::frame::MAX_FRAME;
    use crate::protocol::message::OkMessage;

    #[test]
    fn send_completes_and_writes_expected_bytes() {
        let mut codec = FrameCodec::new(64, MAX_FRAME);
        let mut wire: Vec<u8> = Vec::new();

        let mut op = SendOp::start(&mut codec, 0, &OkMessage { msg: Some("done".into()) }).unwrap();
        assert!(!op.is_completed());

        op.wait(&mut codec, &mut wire).unwrap();
        assert!(op.is_completed());
        assert!(!wire.is_empty());
        assert_eq!(wire[4], 0);
    }

    #[test]
    fn cont_reports_not_done_until_drained() {
        struct OneByteAtATime(Vec<u8>);
        impl ByteStream for OneByteAtATime {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                unreachable!()
            }
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.push(buf[0]);
                Ok(1)
            }
        }

        let mut codec = FrameCodec::new(64, MAX_FRAME);
        let mut op = SendOp::start(&mut codec, 3, &OkMessage::default()).unwrap();
        let mut stream = OneByteAtATime(Vec::new());

        let mut steps = 0;
        while !op.cont(&mut codec, &mut stream).unwrap() {
            steps += 1;
            assert!(steps < 100, "did not converge");
        }
        assert_eq!(stream.0.len(), 5);
    }
}
