//! RetryStore trait - durable holding area for undelivered events

use crate::{CachedEvent, TelemetryError};

/// Store of (address, payload) pairs that failed immediate delivery
///
/// Implementations must be internally thread-safe: concurrent push / pop /
/// remove calls from multiple worker threads are possible.
pub trait RetryStore: Send + Sync {
    /// Park an undelivered event
    ///
    /// # Errors
    /// Returns a cache error when the entry could not be persisted; the
    /// caller logs the loss, there is no further fallback.
    fn push(&self, event: CachedEvent) -> Result<(), TelemetryError>;

    /// Read up to `max` entries without removing them
    ///
    /// Entries stay cached until [`RetryStore::remove`] confirms delivery,
    /// so a failed retry needs no re-push.
    fn pop(&self, max: usize) -> Result<Vec<CachedEvent>, TelemetryError>;

    /// Remove the first entry matching `event` by value; no-op when absent
    fn remove(&self, event: &CachedEvent) -> Result<(), TelemetryError>;

    /// Number of entries currently cached
    fn len(&self) -> usize;

    /// Whether the store holds no entries
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
