//! Client and collector configuration

use serde::{Deserialize, Serialize};

use crate::TelemetryError;

/// Per-project client credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Project identifier at the collector
    pub project_id: String,

    /// Write key authorizing event posts for the project
    pub write_key: String,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(project_id: impl Into<String>, write_key: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            write_key: write_key.into(),
        }
    }

    /// Validate required fields
    ///
    /// Returns the first error encountered, or Ok(()).
    pub fn validate(&self) -> Result<(), TelemetryError> {
        if self.project_id.is_empty() {
            return Err(TelemetryError::config_validation(
                "project_id",
                "must not be empty",
            ));
        }
        if self.write_key.is_empty() {
            return Err(TelemetryError::config_validation(
                "write_key",
                "must not be empty",
            ));
        }
        Ok(())
    }
}

/// Collector endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Collector hostname (no scheme, no trailing slash)
    #[serde(default = "default_host")]
    pub host: String,

    /// Collector API version segment
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_host() -> String {
    "api.telemeter.dev".to_string()
}

fn default_version() -> String {
    "3.0".to_string()
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            version: default_version(),
        }
    }
}

impl CollectorConfig {
    /// Validate required fields
    pub fn validate(&self) -> Result<(), TelemetryError> {
        if self.host.is_empty() {
            return Err(TelemetryError::config_validation(
                "host",
                "must not be empty",
            ));
        }
        if self.version.is_empty() {
            return Err(TelemetryError::config_validation(
                "version",
                "must not be empty",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_validate() {
        let config = ClientConfig::new("project-1", "wk-secret");
        assert!(config.validate().is_ok());

        let missing_key = ClientConfig::new("project-1", "");
        assert!(missing_key.validate().is_err());

        let missing_project = ClientConfig::new("", "wk-secret");
        assert!(missing_project.validate().is_err());
    }

    #[test]
    fn test_collector_config_defaults() {
        let config = CollectorConfig::default();
        assert!(!config.host.is_empty());
        assert_eq!(config.version, "3.0");
        assert!(config.validate().is_ok());
    }
}
