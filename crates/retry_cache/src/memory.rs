//! MemoryRetryStore - in-process retry cache

use std::collections::VecDeque;
use std::sync::Mutex;

use contracts::{CachedEvent, RetryStore, TelemetryError};

/// Retry cache backed by an in-memory deque
///
/// Entries are held in arrival order; `pop` reads from the front.
#[derive(Debug, Default)]
pub struct MemoryRetryStore {
    entries: Mutex<VecDeque<CachedEvent>>,
}

impl MemoryRetryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, VecDeque<CachedEvent>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RetryStore for MemoryRetryStore {
    fn push(&self, event: CachedEvent) -> Result<(), TelemetryError> {
        self.entries().push_back(event);
        Ok(())
    }

    fn pop(&self, max: usize) -> Result<Vec<CachedEvent>, TelemetryError> {
        let entries = self.entries();
        Ok(entries.iter().take(max).cloned().collect())
    }

    fn remove(&self, event: &CachedEvent) -> Result<(), TelemetryError> {
        let mut entries = self.entries();
        if let Some(pos) = entries.iter().position(|e| e == event) {
            entries.remove(pos);
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries().len()
    }
}
