//! Cached event representation

use serde::{Deserialize, Serialize};

/// An undelivered event parked in the retry cache
///
/// Identified by value: two entries with the same address and payload are
/// interchangeable for removal purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CachedEvent {
    /// Fully-built collector address
    pub address: String,

    /// Raw JSON payload
    pub payload: String,
}

impl CachedEvent {
    /// Create a new cached event
    pub fn new(address: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            payload: payload.into(),
        }
    }
}
