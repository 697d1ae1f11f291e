//! MockTransport - scriptable in-memory transport for tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use contracts::{CachedEvent, TelemetryError, Transport};

/// Transport stub that records sends and can be toggled to fail
///
/// Used by dispatch tests and the integration crate; never touches the
/// network.
#[derive(Debug, Default)]
pub struct MockTransport {
    failing: AtomicBool,
    sent: Mutex<Vec<CachedEvent>>,
}

impl MockTransport {
    /// Create a mock that accepts every send
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that rejects every send
    pub fn failing() -> Self {
        let mock = Self::default();
        mock.failing.store(true, Ordering::SeqCst);
        mock
    }

    /// Toggle failure mode
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Events accepted so far
    pub fn sent(&self) -> Vec<CachedEvent> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of accepted sends
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Transport for MockTransport {
    fn send_event(&self, address: &str, payload: &str) -> Result<(), TelemetryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TelemetryError::transport(address, "mock failure"));
        }
        self.sent
            .lock()
            .unwrap()
            .push(CachedEvent::new(address, payload));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_sends() {
        let mock = MockTransport::new();
        mock.send_event("https://x/e", "{}").unwrap();
        assert_eq!(mock.sent_count(), 1);
        assert_eq!(mock.sent()[0], CachedEvent::new("https://x/e", "{}"));
    }

    #[test]
    fn test_mock_failure_mode() {
        let mock = MockTransport::failing();
        assert!(mock.send_event("https://x/e", "{}").is_err());
        assert_eq!(mock.sent_count(), 0);

        mock.set_failing(false);
        assert!(mock.send_event("https://x/e", "{}").is_ok());
        assert_eq!(mock.sent_count(), 1);
    }
}
