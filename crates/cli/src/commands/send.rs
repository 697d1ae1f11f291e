//! `send` command implementation.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::SendArgs;
use crate::commands::build_context;

/// Execute the `send` command
pub fn run_send(args: &SendArgs) -> Result<()> {
    let ctx = build_context(&args.connect)?;

    ctx.client
        .validate()
        .context("Invalid client configuration (set --project-id / --write-key)")?;

    // Reject malformed CLI input before it reaches the wire
    serde_json::from_str::<serde_json::Value>(&args.data)
        .context("Event payload is not valid JSON")?;

    let core = ctx
        .registry
        .instance()
        .context("Dispatch core unavailable")?;

    info!(
        event = %args.name,
        repeat = args.repeat,
        collector = %ctx.collector.host,
        "Posting events"
    );

    for _ in 0..args.repeat {
        core.post_event(&ctx.client, &args.name, &args.data);
    }

    // Settle: execute everything still queued before the process exits
    core.flush();

    let snapshot = core.metrics();
    info!(
        delivered = snapshot.delivered,
        cached = snapshot.cached,
        lost = snapshot.lost,
        "Send complete"
    );

    if snapshot.cached > 0 {
        warn!(
            cached = snapshot.cached,
            cache = %ctx.store.path().display(),
            "Undelivered events were parked for retry; run `telemeter drain`"
        );
    }

    drop(core);
    ctx.registry.release();
    Ok(())
}
