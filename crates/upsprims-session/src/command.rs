use std::fmt;

/// What the device sent back for a control command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResponse {
    /// The first non-empty frame read after the command.
    Frame(String),
    /// The write succeeded but no frame came back. Valid for commands the
    /// device does not acknowledge.
    NoResponse,
}

impl CommandResponse {
    pub const NO_RESPONSE: &'static str = "NO_RESPONSE";

    pub fn as_str(&self) -> &str {
        match self {
            CommandResponse::Frame(raw) => raw,
            CommandResponse::NoResponse => Self::NO_RESPONSE,
        }
    }

    pub fn is_acknowledged(&self) -> bool {
        matches!(self, CommandResponse::Frame(_))
    }
}

impl fmt::Display for CommandResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
