/// Errors that can occur while framing UPS traffic.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The command cannot be framed (embedded terminator, non-ASCII, empty).
    #[error("invalid command {0:?}")]
    InvalidCommand(String),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
