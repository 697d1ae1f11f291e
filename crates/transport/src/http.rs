//! HttpTransport - blocking HTTPS delivery to the collector

use std::time::Duration;

use contracts::{TelemetryError, Transport};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};

/// Configuration for HttpTransport
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Per-request timeout
    pub timeout: Duration,

    /// User-Agent header value
    pub user_agent: String,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: format!("telemeter/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Transport that POSTs the JSON payload to the event address
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a new HttpTransport
    pub fn new(config: HttpTransportConfig) -> Result<Self, TelemetryError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| TelemetryError::transport_setup(e.to_string()))?;

        Ok(Self { client })
    }

    /// Create with default configuration
    pub fn with_defaults() -> Result<Self, TelemetryError> {
        Self::new(HttpTransportConfig::default())
    }
}

impl Transport for HttpTransport {
    #[instrument(name = "http_send", skip(self, payload), fields(bytes = payload.len()))]
    fn send_event(&self, address: &str, payload: &str) -> Result<(), TelemetryError> {
        let response = self
            .client
            .post(address)
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_string())
            .send()
            .map_err(|e| TelemetryError::transport(address, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TelemetryError::transport(
                address,
                format!("collector returned {}", status),
            ));
        }

        debug!(address, status = status.as_u16(), "Event delivered");
        Ok(())
    }
}
