//! Megatec/PowerShield UPS protocol: dialect parsers and status model.
//!
//! Two incompatible query dialects share the serial line:
//! - Megatec (`Q1`, `I`, `F`): the classic 8-field status snapshot
//! - Centurion (`QGS`, `QMD`, `QRI`, `QMOD`, `QVFW`): a richer superset
//!
//! Every parser is a pure function from one raw frame to a partially
//! filled [`UpsRecord`]. Records from several queries are merged into one
//! [`PollResult`] per poll cycle.

pub mod command;
pub mod error;
pub mod info;
pub mod query;
pub mod record;
pub mod status;
mod token;

pub use command::{BatteryTest, ControlCommand, DelayMinutes, RawCommand, TestMinutes};
pub use error::{CommandValidationError, ParseError, Result};
pub use info::{parse_f, parse_i, parse_qmd, parse_qmod, parse_qri, parse_qvfw, CENTURION_VENDOR};
pub use query::Query;
pub use record::{Dialect, FieldValue, PollResult, StatusSummary, Topology, UpsMode, UpsRecord};
pub use status::{parse_q1, parse_qgs};
