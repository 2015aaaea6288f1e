//! Megatec/Centurion UPS polling over TCP-to-serial adapters.
//!
//! upsprims turns the noisy, variably terminated ASCII replies of a
//! Megatec-family UPS into one merged, typed status record per poll cycle.
//!
//! # Crate Structure
//!
//! - [`transport`]: host normalisation, TCP sessions, reachability probe
//! - [`frame`]: CR/LF framing with deadlines and a length cap
//! - [`protocol`]: `Q1`/`QGS` dialect parsers, status model, control commands
//! - [`session`]: retrying exchanges, poll cycles, command channel, registry
//! - [`export`]: InfluxDB line protocol export (behind `export` feature)
//!
//! ```no_run
//! use upsprims::session::{Poller, SessionConfig};
//! use upsprims::transport::{Endpoint, DEFAULT_PORT};
//!
//! let endpoint = Endpoint::parse("tcp://10.0.0.5:2001", DEFAULT_PORT)?;
//! let poller = Poller::from_config(SessionConfig::new(endpoint));
//! let result = poller.poll_once();
//! println!("{}", result.status_summary);
//! # Ok::<(), upsprims::transport::TransportError>(())
//! ```

/// Re-export transport types.
pub mod transport {
    pub use upsprims_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use upsprims_frame::*;
}

/// Re-export protocol types.
pub mod protocol {
    pub use upsprims_protocol::*;
}

/// Re-export session types.
pub mod session {
    pub use upsprims_session::*;
}

/// Re-export export types (requires `export` feature).
#[cfg(feature = "export")]
pub mod export {
    pub use upsprims_export::*;
}
