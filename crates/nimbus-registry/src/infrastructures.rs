//! Infrastructure store

use arc_swap::ArcSwap;
use nimbus_core::Infrastructure;
use std::collections::HashMap;
use std::sync::Arc;

/// Concurrent store of registered infrastructures, keyed by id.
///
/// Writes go through `rcu`: clone the current snapshot, apply the one change,
/// and swap conditioned on the snapshot pointer being unchanged, retrying on
/// conflict. Two writers racing on different ids both land; two writers
/// racing on the same id resolve last-writer-wins.
pub struct InfrastructureStore {
    snapshot: ArcSwap<HashMap<String, Infrastructure>>,
}

impl InfrastructureStore {
    pub fn new() -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(HashMap::new()),
        }
    }

    /// Look up one infrastructure by id.
    pub fn get(&self, id: &str) -> Option<Infrastructure> {
        self.snapshot.load().get(id).cloned()
    }

    /// Point-in-time snapshot of all registered infrastructures.
    ///
    /// The returned map never changes, no matter what writers do afterwards.
    pub fn list(&self) -> Arc<HashMap<String, Infrastructure>> {
        self.snapshot.load_full()
    }

    /// Insert or replace by id. Replacement is whole-record, no merge.
    pub fn put(&self, infrastructure: Infrastructure) {
        tracing::debug!(id = %infrastructure.id, "registry: put infrastructure");
        self.snapshot.rcu(|current| {
            let mut next = HashMap::clone(current);
            next.insert(infrastructure.id.clone(), infrastructure.clone());
            next
        });
    }

    /// Remove by id; a no-op when the id is unknown.
    pub fn remove(&self, id: &str) {
        tracing::debug!(id = %id, "registry: remove infrastructure");
        self.snapshot.rcu(|current| {
            let mut next = HashMap::clone(current);
            next.remove(id);
            next
        });
    }

    pub fn len(&self) -> usize {
        self.snapshot.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.load().is_empty()
    }
}

impl Default for InfrastructureStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_core::Credentials;

    fn infra(id: &str) -> Infrastructure {
        Infrastructure::new(id, "mock", "https://mock.example", Credentials::default())
    }

    #[test]
    fn test_put_get_remove() {
        let store = InfrastructureStore::new();
        assert!(store.get("a").is_none());

        store.put(infra("a"));
        assert_eq!(store.get("a").unwrap().id, "a");

        store.remove("a");
        assert!(store.get("a").is_none());
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let store = InfrastructureStore::new();
        store.put(infra("a"));
        store.remove("ghost");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_last_writer_wins_on_same_id() {
        let store = InfrastructureStore::new();
        store.put(infra("x"));
        store.put(Infrastructure::new(
            "x",
            "aws",
            "https://ec2.example",
            Credentials::default(),
        ));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("x").unwrap().infra_type, "aws");
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_writes() {
        let store = InfrastructureStore::new();
        store.put(infra("a"));

        let snapshot = store.list();
        store.put(infra("b"));
        store.remove("a");

        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains_key("a"));
        assert_eq!(store.len(), 1);
        assert!(store.get("b").is_some());
    }

    #[test]
    fn test_concurrent_writers_lose_no_update() {
        let store = Arc::new(InfrastructureStore::new());
        let threads = 8;
        let per_thread = 50;

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..per_thread {
                        store.put(infra(&format!("infra-{t}-{i}")));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), threads * per_thread);
    }
}
