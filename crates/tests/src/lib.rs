//! # Integration Tests
//!
//! Cross-crate end-to-end tests.
//!
//! Responsibilities:
//! - Contract smoke tests
//! - Dispatch e2e through the public registry API (no network)
//! - Retry cache durability across core renewals

#[cfg(test)]
mod contract_tests {
    use contracts::{event_address, ClientConfig, CollectorConfig};

    #[test]
    fn test_address_contract() {
        let collector = CollectorConfig {
            host: "collector.test".to_string(),
            version: "3.0".to_string(),
        };
        let client = ClientConfig::new("p1", "k1");
        assert_eq!(
            event_address(&collector, &client, "purchase").unwrap(),
            "https://collector.test/3.0/projects/p1/events/purchase?api_key=k1"
        );
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    use contracts::{CachedEvent, ClientConfig, CollectorConfig, RetryStore};
    use dispatch::CoreRegistry;
    use retry_cache::{FileRetryStore, MemoryRetryStore};
    use transport::MockTransport;

    fn collector() -> CollectorConfig {
        CollectorConfig {
            host: "collector.test".to_string(),
            version: "3.0".to_string(),
        }
    }

    fn client() -> ClientConfig {
        ClientConfig::new("proj", "key")
    }

    fn wait_until(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if done() {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        done()
    }

    /// Failed post lands in the cache; a later drain re-delivers it.
    #[test]
    fn test_e2e_post_cache_redeliver() {
        let transport = Arc::new(MockTransport::failing());
        let store = Arc::new(MemoryRetryStore::new());
        let registry = CoreRegistry::new(
            Arc::clone(&transport) as Arc<dyn contracts::Transport>,
            Arc::clone(&store) as Arc<dyn RetryStore>,
            collector(),
        );

        let core = registry.instance().unwrap();
        core.post_event(&client(), "purchase", "{}");
        core.flush();

        let expected =
            CachedEvent::new("https://collector.test/3.0/projects/proj/events/purchase?api_key=key", "{}");
        assert_eq!(store.pop(10).unwrap(), vec![expected.clone()]);

        // collector comes back; drain the cache
        transport.set_failing(false);
        core.flush_retry_cache(10);
        assert!(wait_until(Duration::from_secs(5), || store.is_empty()));
        assert!(wait_until(Duration::from_secs(5), || {
            core.metrics().retried == 1
        }));
        assert_eq!(transport.sent().last(), Some(&expected));

        registry.release();
    }

    /// flush_retry_cache(2) on a store of 3 leaves exactly the un-popped entry.
    #[test]
    fn test_e2e_bounded_drain() {
        let transport = Arc::new(MockTransport::new());
        let store = Arc::new(MemoryRetryStore::new());
        for n in 0..3 {
            store
                .push(CachedEvent::new(format!("https://collector.test/e{}", n), "{}"))
                .unwrap();
        }
        let registry = CoreRegistry::new(
            Arc::clone(&transport) as Arc<dyn contracts::Transport>,
            Arc::clone(&store) as Arc<dyn RetryStore>,
            collector(),
        );

        let core = registry.instance().unwrap();
        core.flush_retry_cache(2);

        assert!(wait_until(Duration::from_secs(5), || store.len() == 1));
        assert_eq!(
            store.pop(1).unwrap(),
            vec![CachedEvent::new("https://collector.test/e2", "{}")]
        );

        registry.release();
    }

    /// Singleton identity and ref-count lifecycle through the registry.
    #[test]
    fn test_e2e_singleton_lifecycle() {
        let registry = CoreRegistry::new(
            Arc::new(MockTransport::new()),
            Arc::new(MemoryRetryStore::new()),
            collector(),
        );

        let first = registry.instance().unwrap();
        let second = registry.instance().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.ref_count(), 2);

        drop(first);
        drop(second);
        registry.release();
        assert_eq!(registry.ref_count(), 0);

        let renewed = registry.instance().unwrap();
        assert_eq!(registry.ref_count(), 1);
        drop(renewed);
    }

    /// Construct and immediately destroy: no posted events, no hang.
    #[test]
    fn test_e2e_immediate_shutdown() {
        let registry = CoreRegistry::new(
            Arc::new(MockTransport::new()),
            Arc::new(MemoryRetryStore::new()),
            collector(),
        );

        let core = registry.instance().unwrap();
        drop(core);
        registry.release();
        assert_eq!(registry.ref_count(), 0);
    }

    /// Cached events persist on disk across a release/renew cycle.
    #[test]
    fn test_e2e_file_cache_survives_renewal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.jsonl");

        let transport = Arc::new(MockTransport::failing());
        let store = Arc::new(FileRetryStore::open(&path).unwrap());
        let registry = CoreRegistry::new(
            Arc::clone(&transport) as Arc<dyn contracts::Transport>,
            Arc::clone(&store) as Arc<dyn RetryStore>,
            collector(),
        );

        let core = registry.instance().unwrap();
        core.post_event(&client(), "purchase", "{\"sku\":7}");
        core.flush();
        drop(core);
        registry.release();

        // a fresh store over the same file sees the parked event
        let reopened = FileRetryStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 1);

        // renewed core drains it once the collector recovers
        transport.set_failing(false);
        let core = registry.instance().unwrap();
        core.flush_retry_cache(10);
        assert!(wait_until(Duration::from_secs(5), || store.is_empty()));
        registry.release();
    }
}
