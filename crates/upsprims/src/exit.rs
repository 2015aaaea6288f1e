use std::fmt;
use std::io;

use upsprims::export::ExportError;
use upsprims::frame::FrameError;
use upsprims::session::{AttemptError, CommandError, ExchangeError};
use upsprims::transport::TransportError;

use crate::config::ConfigError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const HEALTH_CHECK_FAILED: i32 = 30;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(USAGE, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: &io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::NotFound
        | io::ErrorKind::AddrNotAvailable => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: &TransportError) -> CliError {
    match err {
        TransportError::InvalidHost(_) => CliError::usage(format!("{context}: {err}")),
        TransportError::Resolve { .. } | TransportError::Connect { .. } => {
            CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
        }
        TransportError::Io(source) => io_error(context, source),
    }
}

pub fn exchange_error(context: &str, err: &ExchangeError) -> CliError {
    let code = match err.last() {
        AttemptError::Transport(inner) => transport_error(context, inner).code,
        AttemptError::Frame(FrameError::Io(source)) => io_error(context, source).code,
        AttemptError::Frame(FrameError::InvalidCommand(_)) => USAGE,
        AttemptError::Parse { .. } => DATA_INVALID,
        AttemptError::NoFrame => TIMEOUT,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn command_error(context: &str, err: &CommandError) -> CliError {
    match err {
        CommandError::Validation(_) | CommandError::Registry(_) => {
            CliError::usage(format!("{context}: {err}"))
        }
        CommandError::Transport(inner) => exchange_error(context, inner),
    }
}

pub fn export_error(context: &str, err: &ExportError) -> CliError {
    match err {
        ExportError::MissingSetting(_) => CliError::usage(format!("{context}: {err}")),
        ExportError::Http(source) if source.is_timeout() => {
            CliError::new(TIMEOUT, format!("{context}: {err}"))
        }
        ExportError::Http(source) if source.is_connect() => {
            CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
        }
        _ => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn config_error(err: &ConfigError) -> CliError {
    match err {
        ConfigError::Read { source, .. } if source.kind() == io::ErrorKind::NotFound => {
            CliError::usage(err.to_string())
        }
        ConfigError::Read { source, .. } => io_error("config", source),
        _ => CliError::usage(err.to_string()),
    }
}
