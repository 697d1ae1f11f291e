//! WorkerPool - fixed-size OS-thread pool draining a shared queue

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, error, info, warn};

use crate::error::DispatchError;
use crate::ledger::{TaskLedger, TaskRecord};

/// One unit on the shared work queue
pub(crate) enum Job {
    /// Execute a task record, then deregister it
    Run(Arc<TaskRecord>),
    /// Worker exit sentinel, one per worker
    Shutdown,
}

/// Handle to the shared work queue
///
/// The channel outlives pool resets: jobs enqueued while the pool is stopped
/// wait for the restarted workers. The `running` gate makes stopped workers
/// skip execution, leaving ledgered bodies for the drain.
#[derive(Clone)]
pub(crate) struct WorkQueue {
    tx: Sender<Job>,
    rx: Receiver<Job>,
    running: Arc<AtomicBool>,
}

impl WorkQueue {
    pub(crate) fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Schedule a record for execution
    pub(crate) fn enqueue(&self, record: Arc<TaskRecord>) -> Result<(), DispatchError> {
        self.tx
            .send(Job::Run(record))
            .map_err(|_| DispatchError::QueueClosed)
    }
}

/// Fixed-size set of worker threads
///
/// Either fully stopped (no workers) or fully running
/// (`available_parallelism().max(1)` workers); transitions happen only in
/// `stop_and_join` / `restart`, serialized by the owning core.
pub(crate) struct WorkerPool {
    queue: WorkQueue,
    ledger: Arc<TaskLedger>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Create a stopped pool sharing `queue` and `ledger`
    pub(crate) fn new(queue: WorkQueue, ledger: Arc<TaskLedger>) -> Self {
        Self {
            queue,
            ledger,
            workers: Vec::new(),
        }
    }

    /// Number of running workers
    pub(crate) fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Stop processing and join every worker, best-effort
    ///
    /// Never panics: a failed join is logged and shutdown proceeds.
    pub(crate) fn stop_and_join(&mut self) {
        self.queue.running.store(false, Ordering::SeqCst);

        for _ in 0..self.workers.len() {
            // send cannot fail while self holds a receiver clone
            let _ = self.queue.tx.send(Job::Shutdown);
        }

        for handle in self.workers.drain(..) {
            let name = handle.thread().name().unwrap_or("worker").to_string();
            debug!(worker = %name, "Joining worker");
            if handle.join().is_err() {
                warn!(worker = %name, "Worker join failed");
            }
        }
    }

    /// Spawn `available_parallelism().max(1)` workers and open the gate
    ///
    /// On a spawn failure the partially-started pool is stopped again so the
    /// pool never stays half-running.
    pub(crate) fn restart(&mut self) -> Result<(), DispatchError> {
        self.queue.running.store(true, Ordering::SeqCst);

        let count = target_worker_count();
        for index in 0..count {
            let rx = self.queue.rx.clone();
            let running = Arc::clone(&self.queue.running);
            let ledger = Arc::clone(&self.ledger);

            let spawned = thread::Builder::new()
                .name(format!("telemeter-worker-{index}"))
                .spawn(move || worker_loop(rx, running, ledger));

            match spawned {
                Ok(handle) => self.workers.push(handle),
                Err(e) => {
                    self.stop_and_join();
                    return Err(DispatchError::spawn(e.to_string()));
                }
            }
        }

        info!(workers = self.workers.len(), "Worker pool running");
        Ok(())
    }
}

/// Worker count derived from hardware parallelism, minimum 1
fn target_worker_count() -> usize {
    match thread::available_parallelism() {
        Ok(n) => n.get(),
        Err(e) => {
            warn!(error = %e, "available_parallelism unavailable, forcing one worker");
            1
        }
    }
}

fn worker_loop(rx: Receiver<Job>, running: Arc<AtomicBool>, ledger: Arc<TaskLedger>) {
    debug!("Worker started");

    while let Ok(job) = rx.recv() {
        match job {
            Job::Shutdown => break,
            Job::Run(record) => {
                if !running.load(Ordering::SeqCst) {
                    // stopped mid-cycle: ledgered bodies run in the drain,
                    // detached retry bodies stay represented in the store
                    continue;
                }
                run_record(&record);
                ledger.remove(record.id());
            }
        }
    }

    debug!("Worker stopped");
}

/// Execute a record, containing any panic from the task body
pub(crate) fn run_record(record: &TaskRecord) {
    if catch_unwind(AssertUnwindSafe(|| record.run())).is_err() {
        error!(task_id = record.id(), "Task panicked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::time::Duration;

    fn counting_record(counter: &Arc<AtomicU32>) -> Arc<TaskRecord> {
        let counter = Arc::clone(counter);
        TaskRecord::detached(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }))
    }

    fn wait_for(counter: &Arc<AtomicU32>, expected: u32) {
        for _ in 0..200 {
            if counter.load(Ordering::SeqCst) == expected {
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!(
            "expected {} executions, saw {}",
            expected,
            counter.load(Ordering::SeqCst)
        );
    }

    #[test]
    fn test_pool_executes_queued_jobs() {
        let queue = WorkQueue::new();
        let ledger = Arc::new(TaskLedger::new());
        let mut pool = WorkerPool::new(queue.clone(), Arc::clone(&ledger));
        pool.restart().unwrap();

        let counter = Arc::new(AtomicU32::new(0));
        for _ in 0..5 {
            queue.enqueue(counting_record(&counter)).unwrap();
        }

        wait_for(&counter, 5);
        pool.stop_and_join();
    }

    #[test]
    fn test_pool_size_is_hardware_parallelism() {
        let queue = WorkQueue::new();
        let ledger = Arc::new(TaskLedger::new());
        let mut pool = WorkerPool::new(queue, ledger);
        pool.restart().unwrap();

        assert_eq!(pool.worker_count(), target_worker_count());
        assert!(pool.worker_count() >= 1);

        pool.stop_and_join();
        assert_eq!(pool.worker_count(), 0);
    }

    #[test]
    fn test_stop_join_restart_cycle() {
        let queue = WorkQueue::new();
        let ledger = Arc::new(TaskLedger::new());
        let mut pool = WorkerPool::new(queue.clone(), Arc::clone(&ledger));

        pool.restart().unwrap();
        pool.stop_and_join();

        // jobs enqueued while stopped wait for the restarted pool
        let counter = Arc::new(AtomicU32::new(0));
        queue.enqueue(counting_record(&counter)).unwrap();

        pool.restart().unwrap();
        wait_for(&counter, 1);
        pool.stop_and_join();
    }

    #[test]
    fn test_panicking_job_does_not_kill_worker() {
        let queue = WorkQueue::new();
        let ledger = Arc::new(TaskLedger::new());
        let mut pool = WorkerPool::new(queue.clone(), Arc::clone(&ledger));
        pool.restart().unwrap();

        queue
            .enqueue(TaskRecord::detached(Box::new(|| panic!("task boom"))))
            .unwrap();

        let counter = Arc::new(AtomicU32::new(0));
        queue.enqueue(counting_record(&counter)).unwrap();

        wait_for(&counter, 1);
        pool.stop_and_join();
    }
}
