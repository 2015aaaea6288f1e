//! InfluxDB export of poll results.
//!
//! [`format_poll_result`] is a pure function from one [`PollResult`] to one
//! line of line protocol. [`InfluxExporter`] POSTs such lines to the v2
//! write API with a bearer token.
//!
//! [`PollResult`]: upsprims_protocol::PollResult

pub mod config;
pub mod error;
pub mod exporter;
pub mod line;

pub use config::{InfluxConfig, DEFAULT_MEASUREMENT};
pub use error::{ExportError, Result};
pub use exporter::InfluxExporter;
pub use line::{format_poll_result, LineProtocolBuilder};
