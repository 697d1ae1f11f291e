//! `drain` command implementation.

use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::RetryStore;
use tracing::info;

use crate::cli::DrainArgs;
use crate::commands::build_context;

/// Execute the `drain` command
pub fn run_drain(args: &DrainArgs) -> Result<()> {
    let ctx = build_context(&args.connect)?;

    let before = ctx.store.len();
    if before == 0 {
        info!(cache = %ctx.store.path().display(), "Retry cache is empty, nothing to drain");
        return Ok(());
    }

    let core = ctx
        .registry
        .instance()
        .context("Dispatch core unavailable")?;

    info!(
        cached = before,
        count = args.count,
        "Re-delivering cached events"
    );
    core.flush_retry_cache(args.count);

    // The store shrinks only when a retry send succeeds; wait until every
    // selected entry is gone or the wait window closes (some may keep failing).
    let target = before.saturating_sub(args.count);
    let deadline = Instant::now() + Duration::from_secs(args.wait);
    while Instant::now() < deadline && ctx.store.len() > target {
        thread::sleep(Duration::from_millis(200));
    }

    core.flush();

    let after = ctx.store.len();
    info!(
        redelivered = before - after,
        remaining = after,
        "Drain complete"
    );

    drop(core);
    ctx.registry.release();
    Ok(())
}
