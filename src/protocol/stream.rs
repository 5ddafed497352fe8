//! The non-blocking byte-stream interface the engine is generic over.

use std::io;

/// A reliable, ordered, non-blocking byte channel.
///
/// `read`/`write` behave like the corresponding [`std::io::Read`]/
/// [`std::io::Write`] methods: `Ok(0)` means end-of-stream, `Ok(n)` means `n`
/// bytes were transferred (`n` may be less than `buf.len()`), and
/// `Err(io::ErrorKind::WouldBlock)` means the call would have blocked and
/// should be retried once the stream becomes ready again. The engine never
/// treats `WouldBlock` as a [`super::error::ProtocolError`] — it is consumed
/// entirely inside `cont()` and surfaces only as "not done yet".
///
/// Blanket implementations are provided for [`std::net::TcpStream`] and, with
/// the `mio` feature, `mio::net::TcpStream`.
pub trait ByteStream {
    /// Attempts to read into `buf`, returning the number of bytes read.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Attempts to write from `buf`, returning the number of bytes written.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
}

impl<S: io::Read + io::Write> ByteStream for S {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(self, buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::Write::write(self, buf)
    }
}

/// A write-only fixture: useful in tests that only drive [`super::send_op::SendOp`]
/// and inspect the bytes it produced. Reads always fail; wrap the recorded
/// bytes in a `Cursor` to read them back.
impl ByteStream for Vec<u8> {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "Vec<u8> is a write-only ByteStream fixture",
        ))
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.extend_from_slice(buf);
        Ok(buf.len())
    }
}

#[cfg(feature = "mio")]
#[allow(dead_code)]
fn assert_mio_tcp_stream_is_a_byte_stream(s: &mut mio::net::TcpStream) -> &mut dyn ByteStream {
    s
}
