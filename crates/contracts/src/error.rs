//! Layered error definitions
//!
//! Categorized by source: config / endpoint / transport / cache

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum TelemetryError {
    // ===== Configuration Errors =====
    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Endpoint Errors =====
    /// Event address construction error
    #[error("endpoint error for event '{event}': {message}")]
    Endpoint { event: String, message: String },

    // ===== Transport Errors =====
    /// Delivery to the collector failed
    #[error("transport error for '{address}': {message}")]
    Transport { address: String, message: String },

    /// Transport client could not be constructed
    #[error("transport setup error: {message}")]
    TransportSetup { message: String },

    // ===== Cache Errors =====
    /// Retry cache operation failed
    #[error("retry cache {op} error: {message}")]
    Cache { op: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl TelemetryError {
    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create endpoint error
    pub fn endpoint(event: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Endpoint {
            event: event.into(),
            message: message.into(),
        }
    }

    /// Create transport error
    pub fn transport(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            address: address.into(),
            message: message.into(),
        }
    }

    /// Create transport setup error
    pub fn transport_setup(message: impl Into<String>) -> Self {
        Self::TransportSetup {
            message: message.into(),
        }
    }

    /// Create retry cache error
    pub fn cache(op: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Cache {
            op: op.into(),
            message: message.into(),
        }
    }
}
