//! Dispatch error types

use thiserror::Error;

/// Dispatch-specific errors
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Worker thread could not be spawned
    #[error("failed to spawn worker thread: {message}")]
    Spawn { message: String },

    /// Work queue no longer accepts jobs
    #[error("work queue closed")]
    QueueClosed,

    /// Contract-level error (endpoint, transport, cache)
    #[error(transparent)]
    Contract(#[from] contracts::TelemetryError),
}

impl DispatchError {
    /// Create a spawn error
    pub fn spawn(message: impl Into<String>) -> Self {
        Self::Spawn {
            message: message.into(),
        }
    }
}
