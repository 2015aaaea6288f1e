//! TCP transport to UPS serial adapters.
//!
//! A UPS speaking the Megatec/PowerShield ASCII protocol usually sits behind
//! a TCP-to-serial bridge. This crate provides:
//! - [`Endpoint`]: a normalised `host:port` target
//! - [`UpsStream`]: one short-lived connection session with deadlines
//! - [`probe`]: a cheap connect-only reachability check
//!
//! This is the lowest layer of upsprims. Everything else builds on top of
//! the [`UpsStream`] type provided here.

pub mod endpoint;
pub mod error;
pub mod tcp;
pub mod traits;

pub use endpoint::{Endpoint, DEFAULT_PORT};
pub use error::{Result, TransportError};
pub use tcp::{connect, probe};
pub use traits::{TimedRead, UpsStream};
