//! `status` command implementation.

use anyhow::Result;
use contracts::RetryStore;
use serde::Serialize;

use crate::cli::StatusArgs;
use crate::commands::build_context;

/// Machine-readable status report
#[derive(Debug, Serialize)]
struct StatusReport {
    collector_host: String,
    api_version: String,
    project_id: String,
    cache_path: String,
    cached_events: usize,
}

/// Execute the `status` command
///
/// Inspects configuration and the retry cache without spinning up a
/// dispatch core.
pub fn run_status(args: &StatusArgs) -> Result<()> {
    let ctx = build_context(&args.connect)?;

    let report = StatusReport {
        collector_host: ctx.collector.host.clone(),
        api_version: ctx.collector.version.clone(),
        project_id: ctx.client.project_id.clone(),
        cache_path: ctx.store.path().display().to_string(),
        cached_events: ctx.store.len(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Collector:     https://{}/{}", report.collector_host, report.api_version);
        println!("Project:       {}", display_or_unset(&report.project_id));
        println!("Retry cache:   {}", report.cache_path);
        println!("Cached events: {}", report.cached_events);
    }

    Ok(())
}

fn display_or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(unset)"
    } else {
        value
    }
}
