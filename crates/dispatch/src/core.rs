//! DispatchCore - send/retry orchestrator owning the pool and ledger

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use contracts::{
    event_address, CachedEvent, ClientConfig, CollectorConfig, RetryStore, Transport,
};
use tracing::{debug, error, info, instrument, warn};

use crate::error::DispatchError;
use crate::ledger::{lock, TaskLedger, TaskRecord};
use crate::metrics::{DispatchMetrics, MetricsSnapshot};
use crate::pool::{run_record, WorkQueue, WorkerPool};

/// Uniform recover-and-log wrapper for public operations
///
/// No error or panic from the dispatch core may reach the host application;
/// every public entry point funnels through here.
fn guard<F>(op: &'static str, f: F)
where
    F: FnOnce() -> Result<(), DispatchError>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(op, error = %e, "Dispatch operation failed"),
        Err(_) => error!(op, "Dispatch operation panicked"),
    }
}

/// The dispatch-and-retry orchestrator
///
/// Owns the worker pool, the task ledger and handles to the transport and
/// retry store. Obtained through [`crate::CoreRegistry`]; dropped when the
/// last holder releases it, which stops the queue and joins every worker.
pub struct DispatchCore {
    transport: Arc<dyn Transport>,
    store: Arc<dyn RetryStore>,
    collector: CollectorConfig,
    ledger: Arc<TaskLedger>,
    queue: WorkQueue,
    pool: Mutex<WorkerPool>,
    metrics: Arc<DispatchMetrics>,
}

impl DispatchCore {
    /// Construct a core and bring its pool to a running state
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn RetryStore>,
        collector: CollectorConfig,
    ) -> Result<Self, DispatchError> {
        let ledger = Arc::new(TaskLedger::new());
        let queue = WorkQueue::new();
        let pool = WorkerPool::new(queue.clone(), Arc::clone(&ledger));

        let core = Self {
            transport,
            store,
            collector,
            ledger,
            queue,
            pool: Mutex::new(pool),
            metrics: Arc::new(DispatchMetrics::new()),
        };

        core.flush_inner()?;
        Ok(core)
    }

    /// Post one named event, fire-and-forget
    ///
    /// Builds the collector address, registers the send task in the ledger
    /// and schedules it. A failed send parks the event in the retry store.
    /// Never blocks, never panics, never returns an error.
    #[instrument(name = "post_event", skip(self, client, payload), fields(event = %name))]
    pub fn post_event(&self, client: &ClientConfig, name: &str, payload: &str) {
        guard("post_event", || {
            let address = event_address(&self.collector, client, name)?;
            debug!(address = %address, bytes = payload.len(), "Posting event");
            self.metrics.inc_posted();

            let transport = Arc::clone(&self.transport);
            let store = Arc::clone(&self.store);
            let metrics = Arc::clone(&self.metrics);
            let payload = payload.to_string();

            let record = self.ledger.register(Box::new(move || {
                match transport.send_event(&address, &payload) {
                    Ok(()) => metrics.inc_delivered(),
                    Err(e) => {
                        warn!(error = %e, "Delivery failed, caching event");
                        match store.push(CachedEvent::new(address, payload)) {
                            Ok(()) => metrics.inc_cached(),
                            Err(e) => {
                                metrics.inc_lost();
                                error!(error = %e, "Retry cache rejected event, event lost");
                            }
                        }
                    }
                }
            }));

            self.queue.enqueue(record)?;
            Ok(())
        });
    }

    /// Schedule re-delivery of up to `count` cached events
    ///
    /// Each selected entry gets its own retry unit; an entry leaves the store
    /// only when its re-send succeeds. Retry units are not ledgered: the
    /// store still holds their entries, so a pool reset cannot lose them.
    #[instrument(name = "flush_retry_cache", skip(self))]
    pub fn flush_retry_cache(&self, count: usize) {
        guard("flush_retry_cache", || {
            debug!(count, "Scheduling retry cache flush");

            let transport = Arc::clone(&self.transport);
            let store = Arc::clone(&self.store);
            let metrics = Arc::clone(&self.metrics);
            let queue = self.queue.clone();

            let record = TaskRecord::detached(Box::new(move || {
                let entries = match store.pop(count) {
                    Ok(entries) => entries,
                    Err(e) => {
                        error!(error = %e, "Retry cache read failed");
                        return;
                    }
                };
                debug!(entries = entries.len(), "Cached events selected for retry");

                for entry in entries {
                    let transport = Arc::clone(&transport);
                    let store = Arc::clone(&store);
                    let metrics = Arc::clone(&metrics);

                    let retry = TaskRecord::detached(Box::new(move || {
                        match transport.send_event(&entry.address, &entry.payload) {
                            Ok(()) => {
                                metrics.inc_retried();
                                if let Err(e) = store.remove(&entry) {
                                    warn!(error = %e, "Could not evict delivered event");
                                }
                            }
                            Err(e) => {
                                debug!(address = %entry.address, error = %e, "Retry failed, event stays cached");
                            }
                        }
                    }));

                    if queue.enqueue(retry).is_err() {
                        warn!("Work queue closed during retry flush");
                        break;
                    }
                }
            }));

            self.queue.enqueue(record)?;
            Ok(())
        });
    }

    /// Settle and restart: stop the pool, drain the ledger, respawn workers
    ///
    /// Blocks the calling thread until every worker has joined and every
    /// ledgered task has executed. A post racing this call lands either in
    /// the drain or in the restarted pool, never in a void.
    #[instrument(name = "dispatch_flush", skip(self))]
    pub fn flush(&self) {
        guard("flush", || self.flush_inner());
    }

    fn flush_inner(&self) -> Result<(), DispatchError> {
        let mut pool = lock(&self.pool);

        info!("Stopping worker pool");
        pool.stop_and_join();

        let pending = self.ledger.take_all();
        if !pending.is_empty() {
            info!(tasks = pending.len(), "Executing pending tasks");
            for record in pending {
                run_record(&record);
            }
        }

        pool.restart()
    }

    /// Snapshot of dispatch counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Number of running workers
    pub fn worker_count(&self) -> usize {
        lock(&self.pool).worker_count()
    }

    /// Number of scheduled-but-unfinished ledgered tasks
    pub fn pending_tasks(&self) -> usize {
        self.ledger.len()
    }

    /// Entries currently parked in the retry store
    pub fn cached_events(&self) -> usize {
        self.store.len()
    }
}

impl Drop for DispatchCore {
    fn drop(&mut self) {
        info!("Stopping dispatch core");
        lock(&self.pool).stop_and_join();
        info!("Dispatch core shut down");
    }
}
