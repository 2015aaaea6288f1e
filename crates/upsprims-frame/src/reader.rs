use std::io::{ErrorKind, Read};
use std::time::{Duration, Instant};

use bytes::{BufMut, BytesMut};
use tracing::{debug, trace};
use upsprims_transport::TimedRead;

use crate::codec::{decode_ascii, is_terminator, FrameConfig};
use crate::error::{FrameError, Result};

const DRAIN_CHUNK_SIZE: usize = 256;
// set_read_timeout rejects a zero duration.
const MIN_READ_TIMEOUT: Duration = Duration::from_millis(1);

/// Reads CR/LF-terminated ASCII frames from a [`TimedRead`] stream.
///
/// Reads one byte at a time so a terminator is seen the moment it arrives
/// and the next frame is never over-read.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: TimedRead> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(config.max_frame_len.min(512)),
            config,
        }
    }

    /// Read the next frame, giving up at `deadline`.
    ///
    /// - non-ASCII bytes are dropped as they arrive
    /// - a terminator with nothing accumulated is leading noise and skipped
    /// - reaching `max_frame_len` returns the partial frame
    /// - timeout or EOF returns whatever has accumulated, which may be `""`
    ///
    /// An empty string means "no frame materialized"; it is not an error.
    pub fn read_frame(&mut self, deadline: Instant) -> Result<String> {
        self.buf.clear();
        let mut byte = [0u8; 1];

        loop {
            let now = Instant::now();
            if now >= deadline {
                trace!(partial = self.buf.len(), "frame deadline reached");
                break;
            }
            self.inner
                .set_read_timeout(Some((deadline - now).max(MIN_READ_TIMEOUT)))?;

            match self.inner.read(&mut byte) {
                Ok(0) => {
                    trace!(partial = self.buf.len(), "stream closed while reading frame");
                    break;
                }
                Ok(_) if !byte[0].is_ascii() => continue,
                Ok(_) => {
                    if is_terminator(byte[0]) {
                        if self.buf.is_empty() {
                            continue;
                        }
                        break;
                    }
                    self.buf.put_u8(byte[0]);
                    if self.buf.len() >= self.config.max_frame_len {
                        debug!(
                            len = self.buf.len(),
                            "frame cap reached without terminator"
                        );
                        break;
                    }
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if is_timeout(&err) => break,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        Ok(decode_ascii(&self.buf))
    }

    /// Discard whatever the adapter sends within the drain window.
    ///
    /// Adapters are known to emit banners or stale replies right after a
    /// connect. Returns the number of bytes thrown away.
    pub fn drain(&mut self) -> Result<usize> {
        let deadline = Instant::now() + self.config.drain_window;
        let mut chunk = [0u8; DRAIN_CHUNK_SIZE];
        let mut discarded = 0usize;

        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            self.inner
                .set_read_timeout(Some((deadline - now).max(MIN_READ_TIMEOUT)))?;
            match self.inner.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => discarded += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if is_timeout(&err) => break,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        if discarded > 0 {
            debug!(bytes = discarded, "drained unsolicited adapter output");
        }
        Ok(discarded)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

fn is_timeout(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}
