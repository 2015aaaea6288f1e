use std::io::Write;

use bytes::BytesMut;
use tracing::trace;

use crate::codec::{encode_command, Terminator};
use crate::error::Result;

/// Writes terminated ASCII commands to any `Write` stream.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(64),
        }
    }

    /// Send one command followed by `terminator` (blocking).
    ///
    /// Flushes after every command: adapters forward to the serial line on
    /// their own schedule and a buffered request may never leave the host.
    pub fn send(&mut self, command: &str, terminator: Terminator) -> Result<()> {
        self.buf.clear();
        encode_command(command, terminator, &mut self.buf)?;
        self.inner.write_all(&self.buf)?;
        self.inner.flush()?;
        trace!(command, %terminator, "command written");
        Ok(())
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}
