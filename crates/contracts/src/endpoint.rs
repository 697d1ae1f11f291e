//! Collector address construction

use crate::{ClientConfig, CollectorConfig, TelemetryError};

/// Build the collector URL for a named event
///
/// Format: `https://<host>/<version>/projects/<id>/events/<name>?api_key=<key>`
pub fn event_address(
    collector: &CollectorConfig,
    client: &ClientConfig,
    event_name: &str,
) -> Result<String, TelemetryError> {
    if event_name.is_empty() {
        return Err(TelemetryError::endpoint(
            event_name,
            "event name must not be empty",
        ));
    }
    collector.validate()?;
    client.validate()?;

    Ok(format!(
        "https://{}/{}/projects/{}/events/{}?api_key={}",
        collector.host, collector.version, client.project_id, event_name, client.write_key
    ))
}
