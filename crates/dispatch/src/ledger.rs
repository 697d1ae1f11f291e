//! TaskLedger - live-task tracking for drain-before-shutdown

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the guard if a panicking task poisoned it
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A unit of deferred work
pub type TaskBody = Box<dyn FnOnce() + Send + 'static>;

/// Ledger id reserved for tasks that are never tracked (retry jobs)
const DETACHED_ID: u64 = 0;

/// One scheduled-but-unfinished unit of work
///
/// The body can be claimed exactly once: either a worker runs it, or the
/// flush drain does. The record stays in the ledger until the body has
/// finished, never while it is still executing.
pub struct TaskRecord {
    id: u64,
    body: Mutex<Option<TaskBody>>,
}

impl TaskRecord {
    fn new(id: u64, body: TaskBody) -> Self {
        Self {
            id,
            body: Mutex::new(Some(body)),
        }
    }

    /// Create a record that is not tracked by any ledger
    pub fn detached(body: TaskBody) -> Arc<Self> {
        Arc::new(Self::new(DETACHED_ID, body))
    }

    /// Ledger membership key
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Claim and execute the body
    ///
    /// Returns false when another claimant already ran it.
    pub fn run(&self) -> bool {
        let body = lock(&self.body).take();
        match body {
            Some(f) => {
                f();
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for TaskRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRecord").field("id", &self.id).finish()
    }
}

struct LedgerInner {
    next_id: u64,
    tasks: BTreeMap<u64, Arc<TaskRecord>>,
}

impl Default for LedgerInner {
    fn default() -> Self {
        Self {
            // id 0 is DETACHED_ID
            next_id: 1,
            tasks: BTreeMap::new(),
        }
    }
}

/// Ordered collection of live task records, keyed by a monotonically
/// increasing id
#[derive(Default)]
pub struct TaskLedger {
    inner: Mutex<LedgerInner>,
}

impl TaskLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task body, returning its record
    pub fn register(&self, body: TaskBody) -> Arc<TaskRecord> {
        let mut inner = lock(&self.inner);
        let id = inner.next_id;
        inner.next_id += 1;
        let record = Arc::new(TaskRecord::new(id, body));
        inner.tasks.insert(id, Arc::clone(&record));
        record
    }

    /// Remove a finished task; no-op when the id is unknown
    pub fn remove(&self, id: u64) {
        lock(&self.inner).tasks.remove(&id);
    }

    /// Atomically take every tracked record, leaving the ledger empty
    ///
    /// The drain executes the returned records on the calling thread; a
    /// record whose body was already claimed by a worker runs as a no-op.
    pub fn take_all(&self) -> Vec<Arc<TaskRecord>> {
        let mut inner = lock(&self.inner);
        std::mem::take(&mut inner.tasks).into_values().collect()
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        lock(&self.inner).tasks.len()
    }

    /// Whether no records are live
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
