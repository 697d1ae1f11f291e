//! Transport trait - collector delivery interface
//!
//! Defines the abstract interface for sending one event to one address.

use crate::TelemetryError;

/// Point-to-point event sender
///
/// Implementations perform the actual network send and must be safe to call
/// concurrently from multiple worker threads. The dispatch core never inspects
/// transport internals; Ok means delivered, any Err routes the event to the
/// retry cache.
pub trait Transport: Send + Sync {
    /// Deliver `payload` to `address`
    ///
    /// # Errors
    /// Returns a transport error when the event was not accepted by the
    /// collector (connectivity, non-success status).
    fn send_event(&self, address: &str, payload: &str) -> Result<(), TelemetryError>;
}
