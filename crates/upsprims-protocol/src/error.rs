/// A frame did not have the shape its query expects.
///
/// Never fatal on its own: the exchange layer moves on to the next
/// candidate frame, terminator or attempt.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// Too few (or, for `Q1`, too many) whitespace-separated fields.
    #[error("{query} response has {found} fields, expected {expected}: {raw:?}")]
    FieldCount {
        query: &'static str,
        expected: &'static str,
        found: usize,
        raw: String,
    },

    /// The status bitfield has the wrong length or non-binary characters.
    #[error("invalid {query} status bits {bits:?}")]
    Bitfield { query: &'static str, bits: String },

    /// A numeric field failed to convert.
    #[error("invalid number {token:?} for {query} field {field}")]
    Number {
        query: &'static str,
        field: &'static str,
        token: String,
    },

    /// The frame is of an entirely different kind.
    #[error("unexpected {query} response: {raw:?}")]
    Shape { query: &'static str, raw: String },
}

/// Control-command parameters rejected before any I/O.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandValidationError {
    #[error("battery test duration must be 1-99 minutes, got {0}")]
    TestMinutes(u32),

    #[error("{field} must be 0-9999 minutes, got {minutes}")]
    Delay { field: &'static str, minutes: u32 },

    #[error("invalid raw command {command:?}: {reason}")]
    Raw {
        command: String,
        reason: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, ParseError>;
