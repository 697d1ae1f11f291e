//! # Retry Cache
//!
//! Durable holding area for undelivered events.
//!
//! Responsibilities:
//! - Park (address, payload) pairs that failed immediate delivery
//! - Bounded non-destructive reads for re-delivery rounds
//! - Remove entries by value once a retry send succeeds
//!
//! Two implementations: [`MemoryRetryStore`] for in-process use and tests,
//! [`FileRetryStore`] persisting entries as JSON lines on disk.

mod file;
mod memory;

pub use contracts::{CachedEvent, RetryStore};
pub use file::FileRetryStore;
pub use memory::MemoryRetryStore;
