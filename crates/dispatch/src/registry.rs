//! CoreRegistry - three-mode singleton access to the dispatch core

use std::sync::{Arc, Mutex};

use contracts::{CollectorConfig, RetryStore, Transport};
use tracing::{debug, error};

use crate::core::DispatchCore;
use crate::ledger::lock;

/// Access mode for [`CoreRegistry::access`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Return the live core, if any; no side effect
    Current,
    /// Construct a core when none is live, then return it
    Renew,
    /// Drop the registry's reference; the core is destroyed once every
    /// other holder releases it
    Release,
}

/// Application-owned registry holding at most one live [`DispatchCore`]
///
/// Collaborator handles live in the registry and are reused for every
/// renewal, so cached events survive a release/renew cycle. All access
/// modes run under one mutex; concurrent callers never race create against
/// destroy.
pub struct CoreRegistry {
    transport: Arc<dyn Transport>,
    store: Arc<dyn RetryStore>,
    collector: CollectorConfig,
    slot: Mutex<Option<Arc<DispatchCore>>>,
}

impl CoreRegistry {
    /// Create a registry with no live core
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn RetryStore>,
        collector: CollectorConfig,
    ) -> Self {
        Self {
            transport,
            store,
            collector,
            slot: Mutex::new(None),
        }
    }

    /// Three-mode access under the registry lock
    ///
    /// A Renew that fails to construct the core logs the error and returns
    /// None; registry access never panics and never propagates an error.
    pub fn access(&self, access: Access) -> Option<Arc<DispatchCore>> {
        let mut slot = lock(&self.slot);

        match access {
            Access::Current => {}
            Access::Release => {
                if slot.take().is_some() {
                    debug!("Dispatch core released");
                }
            }
            Access::Renew => {
                if slot.is_none() {
                    let built = DispatchCore::new(
                        Arc::clone(&self.transport),
                        Arc::clone(&self.store),
                        self.collector.clone(),
                    );
                    match built {
                        Ok(core) => {
                            debug!("Dispatch core constructed");
                            *slot = Some(Arc::new(core));
                        }
                        Err(e) => error!(error = %e, "Dispatch core construction failed"),
                    }
                }
            }
        }

        slot.clone()
    }

    /// Return the live core, constructing one when none exists
    pub fn instance(&self) -> Option<Arc<DispatchCore>> {
        match self.access(Access::Current) {
            Some(core) => Some(core),
            None => self.access(Access::Renew),
        }
    }

    /// Drop the registry's reference to the live core
    pub fn release(&self) {
        self.access(Access::Release);
    }

    /// External holders of the live core, excluding the registry's own
    /// reference; zero when no core is live
    ///
    /// Diagnostic only, never used for lifetime decisions.
    pub fn ref_count(&self) -> usize {
        let slot = lock(&self.slot);
        match slot.as_ref() {
            None => 0,
            Some(core) => Arc::strong_count(core) - 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retry_cache::MemoryRetryStore;
    use transport::MockTransport;

    fn registry() -> CoreRegistry {
        CoreRegistry::new(
            Arc::new(MockTransport::new()),
            Arc::new(MemoryRetryStore::new()),
            CollectorConfig::default(),
        )
    }

    #[test]
    fn test_current_without_instance_is_none() {
        let registry = registry();
        assert!(registry.access(Access::Current).is_none());
        assert_eq!(registry.ref_count(), 0);
    }

    #[test]
    fn test_instance_is_shared_until_released() {
        let registry = registry();

        let first = registry.instance().unwrap();
        let second = registry.instance().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.ref_count(), 2);

        drop(second);
        assert_eq!(registry.ref_count(), 1);
    }

    #[test]
    fn test_release_then_renew_constructs_fresh_core() {
        let registry = registry();

        let first = registry.instance().unwrap();
        registry.release();
        assert_eq!(registry.ref_count(), 0);
        assert!(registry.access(Access::Current).is_none());

        let second = registry.instance().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_renew_is_idempotent() {
        let registry = registry();

        let first = registry.access(Access::Renew).unwrap();
        let second = registry.access(Access::Renew).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_release_without_instance_is_noop() {
        let registry = registry();
        registry.release();
        assert_eq!(registry.ref_count(), 0);
    }

    #[test]
    fn test_store_survives_renewal() {
        let store = Arc::new(MemoryRetryStore::new());
        let store_dyn: Arc<dyn RetryStore> = store.clone();
        let registry = CoreRegistry::new(
            Arc::new(MockTransport::failing()),
            store_dyn,
            CollectorConfig::default(),
        );

        let core = registry.instance().unwrap();
        core.post_event(
            &contracts::ClientConfig::new("proj", "key"),
            "purchase",
            "{}",
        );
        core.flush();
        drop(core);
        registry.release();
        assert_eq!(store.len(), 1);

        // renewed core sees the same cache
        let renewed = registry.instance().unwrap();
        assert_eq!(renewed.cached_events(), 1);
    }
}
