use std::sync::{PoisonError, RwLock};

use tracing::{debug, info, warn};
use upsprims_protocol::{ControlCommand, Dialect, PollResult, Query, UpsRecord};

use crate::command::CommandResponse;
use crate::config::{RetryBudget, SessionConfig};
use crate::error::CommandError;
use crate::exchange::Exchanger;
use crate::link::Link;

const CENTURION_ENRICH: [Query; 4] = [Query::Qmd, Query::Qri, Query::Qmod, Query::Qvfw];
const MEGATEC_ENRICH: [Query; 2] = [Query::I, Query::F];

#[derive(Debug, Default)]
struct Slot {
    /// Merged record of the last cycle that reached the UPS.
    record: Option<UpsRecord>,
    /// Whatever the last cycle produced, live or stale.
    result: Option<PollResult>,
}

/// Runs poll cycles against one UPS and keeps the last known readings.
///
/// A cycle is `detect -> enrich -> derive`, or `detect -> failed`. The
/// dialect is detected afresh every cycle. Only [`Poller::poll_once`]
/// writes the last-reading slot; commands never touch it.
#[derive(Debug)]
pub struct Poller<L = Exchanger> {
    link: L,
    slot: RwLock<Slot>,
}

impl Poller<Exchanger> {
    /// Poller talking TCP to the adapter in `config`.
    pub fn from_config(config: SessionConfig) -> Self {
        Self::new(Exchanger::new(config))
    }
}

impl<L: Link> Poller<L> {
    pub fn new(link: L) -> Self {
        Self {
            link,
            slot: RwLock::new(Slot::default()),
        }
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    /// Run one full poll cycle. Never fails: an unreachable or silent UPS
    /// yields the previous readings with availability flipped.
    pub fn poll_once(&self) -> PollResult {
        let result = match self.detect() {
            Some((dialect, mut record)) => {
                self.enrich(dialect, &mut record);
                let result = PollResult::live(record);
                info!(
                    protocol = dialect.as_str(),
                    status = %result.status_summary,
                    "poll cycle complete"
                );
                result
            }
            None => {
                let adapter_connected = self.link.probe();
                let previous = self.last_record();
                let result = PollResult::stale(previous.as_ref(), adapter_connected);
                warn!(
                    adapter_connected,
                    carried_forward = previous.is_some(),
                    status = %result.status_summary,
                    "poll cycle failed"
                );
                result
            }
        };

        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if result.ups_responding {
            slot.record = Some(result.record.clone());
        }
        slot.result = Some(result.clone());
        result
    }

    /// The result of the most recent cycle, if one has run.
    pub fn last_result(&self) -> Option<PollResult> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .result
            .clone()
    }

    /// The merged record of the most recent successful cycle.
    pub fn last_record(&self) -> Option<UpsRecord> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .record
            .clone()
    }

    /// Send a validated control command over its own connection.
    pub fn send_command(&self, command: &ControlCommand) -> Result<CommandResponse, CommandError> {
        let encoded = command.encode();
        debug!(command = command.name(), wire = %encoded, "sending control command");
        Ok(self.link.send_command(&encoded)?)
    }

    /// Validate and send a free-form command.
    pub fn send_raw(&self, text: &str) -> Result<CommandResponse, CommandError> {
        let command = ControlCommand::raw(text)?;
        self.send_command(&command)
    }

    fn detect(&self) -> Option<(Dialect, UpsRecord)> {
        for query in [Query::Qgs, Query::Q1] {
            match self.link.query(query, RetryBudget::PRIMARY) {
                Ok(mut record) => {
                    let dialect = query.dialect();
                    record.protocol_family = Some(dialect);
                    return Some((dialect, record));
                }
                Err(err) => debug!(query = %query, error = %err, "status query failed"),
            }
        }
        None
    }

    fn enrich(&self, dialect: Dialect, record: &mut UpsRecord) {
        let follow_ups: &[Query] = match dialect {
            Dialect::Centurion => {
                match self.link.query(Query::Q1, RetryBudget::LEGACY_BACKFILL) {
                    Ok(legacy) => record.backfill_fault_voltage(&legacy),
                    Err(err) => debug!(error = %err, "legacy fault voltage unavailable"),
                }
                &CENTURION_ENRICH
            }
            Dialect::Megatec => &MEGATEC_ENRICH,
            Dialect::Unknown => &[],
        };

        for &query in follow_ups {
            match self.link.query(query, RetryBudget::ENRICH) {
                Ok(extra) => record.merge_missing(extra),
                Err(err) => warn!(query = %query, error = %err, "optional query failed"),
            }
        }
    }
}
