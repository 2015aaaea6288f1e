//! Read-only query table.

use std::fmt;

use crate::error::Result;
use crate::record::{Dialect, UpsRecord};
use crate::{info, status};

/// One of the read-only queries issued during a poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    /// Megatec status snapshot.
    Q1,
    /// Centurion status snapshot.
    Qgs,
    /// Megatec identity.
    I,
    /// Megatec ratings.
    F,
    /// Centurion model and rated power.
    Qmd,
    /// Centurion ratings.
    Qri,
    /// Centurion operating mode.
    Qmod,
    /// Centurion firmware version.
    Qvfw,
}

impl Query {
    pub const ALL: [Query; 8] = [
        Query::Q1,
        Query::Qgs,
        Query::I,
        Query::F,
        Query::Qmd,
        Query::Qri,
        Query::Qmod,
        Query::Qvfw,
    ];

    /// Command text sent on the wire, without terminator.
    pub fn command(self) -> &'static str {
        match self {
            Query::Q1 => "Q1",
            Query::Qgs => "QGS",
            Query::I => "I",
            Query::F => "F",
            Query::Qmd => "QMD",
            Query::Qri => "QRI",
            Query::Qmod => "QMOD",
            Query::Qvfw => "QVFW",
        }
    }

    /// Parse one raw frame as the reply to this query.
    pub fn parse(self, raw: &str) -> Result<UpsRecord> {
        match self {
            Query::Q1 => status::parse_q1(raw),
            Query::Qgs => status::parse_qgs(raw),
            Query::I => info::parse_i(raw),
            Query::F => info::parse_f(raw),
            Query::Qmd => info::parse_qmd(raw),
            Query::Qri => info::parse_qri(raw),
            Query::Qmod => info::parse_qmod(raw),
            Query::Qvfw => info::parse_qvfw(raw),
        }
    }

    /// Dialect the query belongs to.
    pub fn dialect(self) -> Dialect {
        match self {
            Query::Q1 | Query::I | Query::F => Dialect::Megatec,
            Query::Qgs | Query::Qmd | Query::Qri | Query::Qmod | Query::Qvfw => {
                Dialect::Centurion
            }
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}
