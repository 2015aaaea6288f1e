use std::fmt;
use std::time::Duration;

use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};

/// Default cap on accumulated response bytes before a frame is cut.
pub const DEFAULT_MAX_FRAME_LEN: usize = 4096;

/// Default window for discarding unsolicited adapter output after connect.
pub const DEFAULT_DRAIN_WINDOW: Duration = Duration::from_millis(50);

const CR: u8 = b'\r';
const LF: u8 = b'\n';

/// Line terminator appended to an outgoing command.
///
/// Adapter firmware disagrees on what ends a request and cannot be asked,
/// so exchanges try every variant in [`Terminator::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terminator {
    /// `\r`
    Cr,
    /// `\r\n`
    CrLf,
    /// `\n`
    Lf,
}

impl Terminator {
    /// Every variant, in the order they are tried.
    pub const ALL: [Terminator; 3] = [Terminator::Cr, Terminator::CrLf, Terminator::Lf];

    /// Wire bytes of this terminator.
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Terminator::Cr => b"\r",
            Terminator::CrLf => b"\r\n",
            Terminator::Lf => b"\n",
        }
    }
}

impl fmt::Display for Terminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Terminator::Cr => "CR",
            Terminator::CrLf => "CRLF",
            Terminator::Lf => "LF",
        })
    }
}

/// Framing configuration. Both limits are empirically tuned defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    /// Bytes accumulated before a partial frame is returned as-is.
    pub max_frame_len: usize,
    /// How long to keep discarding bytes in [`crate::FrameReader::drain`].
    pub drain_window: Duration,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            drain_window: DEFAULT_DRAIN_WINDOW,
        }
    }
}

/// True for the bytes that end a response frame.
pub fn is_terminator(byte: u8) -> bool {
    byte == CR || byte == LF
}

/// Encode a command into wire format: ASCII text followed by `terminator`.
pub fn encode_command(command: &str, terminator: Terminator, dst: &mut BytesMut) -> Result<()> {
    if command.is_empty()
        || !command.is_ascii()
        || command.bytes().any(|b| is_terminator(b) || b.is_ascii_control())
    {
        return Err(FrameError::InvalidCommand(command.to_string()));
    }
    let term = terminator.as_bytes();
    dst.reserve(command.len() + term.len());
    dst.put_slice(command.as_bytes());
    dst.put_slice(term);
    Ok(())
}

/// Decode response bytes, dropping anything outside 7-bit ASCII.
pub fn decode_ascii(raw: &[u8]) -> String {
    raw.iter()
        .copied()
        .filter(u8::is_ascii)
        .map(char::from)
        .collect()
}
