//! Fixed-interval polling on a tokio runtime.
//!
//! Each cycle runs on the blocking pool and the next tick is only awaited
//! after it returns, so cycles for one device never overlap.
//!
//! Tests live in `tests/scheduler.rs` and need `--features async`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use upsprims_protocol::PollResult;

use crate::link::Link;
use crate::poller::Poller;

/// A running polling task.
#[derive(Debug)]
pub struct PollingHandle {
    /// Latest result; `None` until the first cycle completes.
    pub updates: watch::Receiver<Option<PollResult>>,
    pub task: JoinHandle<()>,
}

/// Poll `poller` every `interval` until `cancel` fires.
///
/// The first cycle starts immediately. A failed first cycle is logged and
/// polling carries on in the background.
pub fn spawn_polling<L>(
    poller: Arc<Poller<L>>,
    interval: Duration,
    cancel: CancellationToken,
) -> PollingHandle
where
    L: Link + 'static,
{
    let (tx, rx) = watch::channel(None);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut first = true;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("polling cancelled");
                    break;
                }
                _ = ticker.tick() => {}
            }

            let cycle = Arc::clone(&poller);
            let result = match tokio::task::spawn_blocking(move || cycle.poll_once()).await {
                Ok(result) => result,
                Err(err) => {
                    error!(error = %err, "poll cycle panicked");
                    break;
                }
            };

            if first && !result.ups_responding {
                warn!(
                    status = %result.status_summary,
                    "initial poll failed; continuing in background"
                );
            } else if first {
                info!(status = %result.status_summary, "initial poll succeeded");
            }
            first = false;

            if tx.send(Some(result)).is_err() {
                debug!("no subscribers left; stopping");
                break;
            }
        }
    });

    PollingHandle { updates: rx, task }
}
