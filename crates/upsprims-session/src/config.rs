use std::time::Duration;

use upsprims_frame::FrameConfig;
use upsprims_transport::Endpoint;

/// Default per-read deadline for one terminator variant.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default connect timeout for the adapter reachability probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// How hard an exchange tries before giving up.
///
/// Each attempt is a fresh connection; within an attempt every terminator
/// variant is sent and up to `frames` replies are read after each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    pub attempts: u32,
    pub frames: usize,
}

impl RetryBudget {
    /// Primary status snapshot (`QGS`, then `Q1`).
    pub const PRIMARY: RetryBudget = RetryBudget::new(4, 6);
    /// Legacy `Q1` issued on the Centurion path to recover fault voltage.
    pub const LEGACY_BACKFILL: RetryBudget = RetryBudget::new(1, 3);
    /// Optional identity/ratings/mode/firmware follow-ups.
    pub const ENRICH: RetryBudget = RetryBudget::new(2, 4);
    /// Operator control commands.
    pub const COMMAND: RetryBudget = RetryBudget::new(2, 3);

    pub const fn new(attempts: u32, frames: usize) -> Self {
        Self { attempts, frames }
    }
}

/// Everything needed to talk to one UPS adapter.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub endpoint: Endpoint,
    /// Connect, write and per-terminator read deadline.
    pub timeout: Duration,
    /// Connect timeout used by the reachability probe.
    pub probe_timeout: Duration,
    pub frame: FrameConfig,
}

impl SessionConfig {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            timeout: DEFAULT_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            frame: FrameConfig::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_frame_config(mut self, frame: FrameConfig) -> Self {
        self.frame = frame;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SessionConfig::new(Endpoint::new("10.0.0.5", 2001));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.probe_timeout, Duration::from_secs(1));
        assert_eq!(config.frame.max_frame_len, 4096);
        assert_eq!(config.frame.drain_window, Duration::from_millis(50));
    }

    #[test]
    fn optional_queries_get_smaller_budgets() {
        assert!(RetryBudget::ENRICH.attempts < RetryBudget::PRIMARY.attempts);
        assert!(RetryBudget::LEGACY_BACKFILL.attempts < RetryBudget::ENRICH.attempts);
        assert!(RetryBudget::COMMAND.frames <= RetryBudget::PRIMARY.frames);
    }
}
