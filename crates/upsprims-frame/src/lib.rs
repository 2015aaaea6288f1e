//! CR/LF-delimited ASCII framing for UPS serial adapters.
//!
//! Megatec-family devices answer with lines of ASCII text, terminated by a
//! carriage return on a good day and by CR, LF or nothing at all through a
//! cheap TCP-to-serial bridge. This crate turns that byte stream into
//! frames:
//! - requests are one command plus a [`Terminator`] variant
//! - responses are read byte by byte up to the first CR or LF, against an
//!   absolute deadline, with a hard length cap
//!
//! Non-ASCII noise is dropped rather than treated as an error.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_ascii, encode_command, is_terminator, FrameConfig, Terminator, DEFAULT_DRAIN_WINDOW,
    DEFAULT_MAX_FRAME_LEN,
};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
