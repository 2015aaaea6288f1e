use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use crate::error::Result;

/// A byte source whose blocking reads can be bounded by a timeout.
///
/// The frame reader re-arms the timeout before every byte so that an
/// absolute deadline holds regardless of how the stream trickles data.
pub trait TimedRead: Read {
    /// Bound the next blocking read. `None` blocks indefinitely.
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> std::io::Result<()>;
}

impl TimedRead for TcpStream {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> std::io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }
}

/// One connection session to a UPS adapter, readable and writable.
///
/// Sessions are short-lived: opened for a single exchange and closed when
/// dropped, whichever way the exchange ends.
pub struct UpsStream {
    inner: TcpStream,
    peer: Option<SocketAddr>,
}

impl Read for UpsStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for UpsStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl TimedRead for UpsStream {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> std::io::Result<()> {
        self.inner.set_read_timeout(timeout)
    }
}

impl UpsStream {
    /// Wrap an already connected TCP stream.
    pub fn from_tcp(stream: TcpStream) -> Self {
        let peer = stream.peer_addr().ok();
        Self {
            inner: stream,
            peer,
        }
    }

    /// Try to clone this stream (creates a new file descriptor).
    pub fn try_clone(&self) -> Result<Self> {
        let cloned = self.inner.try_clone()?;
        Ok(Self {
            inner: cloned,
            peer: self.peer,
        })
    }

    /// Address of the adapter this session is connected to.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Close both directions. Dropping the stream has the same effect.
    pub fn close(self) {
        let _ = self.inner.shutdown(Shutdown::Both);
    }
}

impl std::fmt::Debug for UpsStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpsStream")
            .field("type", &"tcp")
            .field("peer", &self.peer)
            .finish()
    }
}
