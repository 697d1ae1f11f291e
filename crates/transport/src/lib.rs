//! # Transport
//!
//! Collector delivery module.
//!
//! Responsibilities:
//! - POST event payloads to the collector address over HTTPS
//! - Map connectivity and non-success statuses to transport errors
//! - Provide a scriptable mock for tests

mod http;
mod mock;

pub use contracts::Transport;
pub use http::{HttpTransport, HttpTransportConfig};
pub use mock::MockTransport;
