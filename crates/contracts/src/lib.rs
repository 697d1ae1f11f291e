//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Delivery Model
//! - An event is a (name, JSON payload) pair addressed to a collector endpoint
//! - Failed deliveries are parked in a [`RetryStore`] keyed by (address, payload) value
//! - [`Transport`] and [`RetryStore`] implementations must be internally thread-safe

mod client;
mod endpoint;
mod error;
mod event;
mod store;
mod transport;

pub use client::*;
pub use endpoint::event_address;
pub use error::*;
pub use event::CachedEvent;
pub use store::RetryStore;
pub use transport::Transport;
