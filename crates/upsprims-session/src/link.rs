use upsprims_protocol::{Query, UpsRecord};

use crate::command::CommandResponse;
use crate::config::RetryBudget;
use crate::error::Result;
use crate::exchange::Exchanger;

/// What a [`crate::Poller`] needs from the wire.
///
/// Implemented by [`Exchanger`]; tests substitute a scripted link.
pub trait Link: Send + Sync {
    /// Run one read-only query and return its parsed record.
    fn query(&self, query: Query, budget: RetryBudget) -> Result<UpsRecord>;

    /// Send one encoded control command.
    fn send_command(&self, command: &str) -> Result<CommandResponse>;

    /// Whether the adapter accepts TCP connections at all.
    fn probe(&self) -> bool;
}

impl Link for Exchanger {
    fn query(&self, query: Query, budget: RetryBudget) -> Result<UpsRecord> {
        self.exchange(query, budget).map(|found| found.record)
    }

    fn send_command(&self, command: &str) -> Result<CommandResponse> {
        Exchanger::send_command(self, command)
    }

    fn probe(&self) -> bool {
        Exchanger::probe(self)
    }
}
