//! Command implementations.

mod drain;
mod send;
mod status;

pub use drain::run_drain;
pub use send::run_send;
pub use status::run_status;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use contracts::{ClientConfig, CollectorConfig, RetryStore};
use dispatch::CoreRegistry;
use retry_cache::FileRetryStore;
use transport::{HttpTransport, HttpTransportConfig};

use crate::cli::ConnectArgs;

/// Everything a command needs: registry, cache handle and configs
pub(crate) struct CliContext {
    pub registry: CoreRegistry,
    pub store: Arc<FileRetryStore>,
    pub client: ClientConfig,
    pub collector: CollectorConfig,
}

/// Build the command context from connection arguments
pub(crate) fn build_context(args: &ConnectArgs) -> Result<CliContext> {
    let mut collector = CollectorConfig::default();
    if let Some(ref host) = args.collector_host {
        collector.host = host.clone();
    }
    if let Some(ref version) = args.api_version {
        collector.version = version.clone();
    }

    let client = ClientConfig::new(args.project_id.clone(), args.write_key.clone());

    let transport = HttpTransport::new(HttpTransportConfig {
        timeout: Duration::from_secs(args.timeout),
        ..Default::default()
    })
    .context("Failed to build HTTP transport")?;

    let store = Arc::new(
        FileRetryStore::open(&args.cache_path).with_context(|| {
            format!("Failed to open retry cache at {}", args.cache_path.display())
        })?,
    );

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let store_dyn: Arc<dyn RetryStore> = store.clone();
    let registry = CoreRegistry::new(Arc::new(transport), store_dyn, collector.clone());

    Ok(CliContext {
        registry,
        store,
        client,
        collector,
    })
}
