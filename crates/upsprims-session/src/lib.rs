//! Exchanges, poll cycles and the command channel.
//!
//! This is the "just works" layer on top of the transport, framing and
//! protocol crates:
//! - [`Exchanger`] opens a fresh connection per attempt, tries every
//!   line terminator and keeps reading frames until one parses
//! - [`Poller`] runs one full poll cycle (detect dialect, enrich, derive)
//!   and carries the last readings forward when the UPS goes quiet
//! - [`Registry`] routes operator commands to one of several pollers
//!
//! Everything here is blocking. The `async` feature adds a tokio-driven
//! fixed-interval scheduler in [`scheduler`].

pub mod command;
pub mod config;
pub mod error;
pub mod exchange;
pub mod link;
pub mod poller;
pub mod registry;
#[cfg(feature = "async")]
pub mod scheduler;

pub use command::CommandResponse;
pub use config::{RetryBudget, SessionConfig, DEFAULT_PROBE_TIMEOUT, DEFAULT_TIMEOUT};
pub use error::{AttemptError, CommandError, ExchangeError, RegistryError, Result};
pub use exchange::{Exchanged, Exchanger};
pub use link::Link;
pub use poller::Poller;
pub use registry::Registry;
#[cfg(feature = "async")]
pub use scheduler::{spawn_polling, PollingHandle};
