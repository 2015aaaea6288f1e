use upsprims_frame::{FrameError, Terminator};
use upsprims_protocol::{CommandValidationError, ParseError};
use upsprims_transport::TransportError;

/// Why a single exchange attempt produced nothing usable.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    /// Connect, resolve or socket setup failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Writing the command or reading a frame failed.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// A frame arrived but did not have the expected shape.
    #[error("unparsable reply after {terminator} terminator: {source}")]
    Parse {
        terminator: Terminator,
        #[source]
        source: ParseError,
    },

    /// Every terminator variant was sent and no frame came back.
    #[error("no frame received")]
    NoFrame,
}

impl AttemptError {
    /// True for connection and socket failures, false for bad or missing
    /// replies.
    pub fn is_transport(&self) -> bool {
        matches!(self, AttemptError::Transport(_) | AttemptError::Frame(FrameError::Io(_)))
    }
}

/// An exchange ran out of budget.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("{command}: no usable reply after {attempts} attempt(s): {last}")]
    Exhausted {
        command: String,
        attempts: u32,
        #[source]
        last: AttemptError,
    },
}

impl ExchangeError {
    /// The failure of the final attempt.
    pub fn last(&self) -> &AttemptError {
        match self {
            ExchangeError::Exhausted { last, .. } => last,
        }
    }
}

/// Device lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown device {0:?}")]
    Unknown(String),

    #[error("device {0:?} is already registered")]
    Duplicate(String),

    #[error("{0} devices are registered; select one by key")]
    Ambiguous(usize),

    #[error("no devices are registered")]
    Empty,
}

/// A control command failed. Validation failures never reach the wire.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("command rejected: {0}")]
    Validation(#[from] CommandValidationError),

    #[error("command transport failed: {0}")]
    Transport(#[from] ExchangeError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

pub type Result<T> = std::result::Result<T, ExchangeError>;
