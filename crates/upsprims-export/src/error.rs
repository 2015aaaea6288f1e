/// Errors that can occur while exporting poll results.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A required connection setting is missing.
    #[error("influx {0} is required")]
    MissingSetting(&'static str),

    /// The HTTP request could not be built or sent.
    #[error("influx request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("influx write rejected with HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

pub type Result<T> = std::result::Result<T, ExportError>;
