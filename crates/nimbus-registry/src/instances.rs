//! Instance store
//!
//! Keyed by (infrastructure id, instance id), held as a two-level map so the
//! per-infrastructure operations (cascade remove, refresh replace) are one
//! snapshot swap each, never a sequence of row removals a reader could catch
//! halfway through.

use arc_swap::ArcSwap;
use nimbus_core::Instance;
use std::collections::HashMap;
use std::sync::Arc;

type Snapshot = HashMap<String, HashMap<String, Instance>>;

/// Concurrent store of provisioned instances.
///
/// Same copy-on-write discipline as [`crate::InfrastructureStore`]; see the
/// crate docs for the read/write contract.
pub struct InstanceStore {
    snapshot: ArcSwap<Snapshot>,
}

impl InstanceStore {
    pub fn new() -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(Snapshot::new()),
        }
    }

    /// Look up one instance by its compound key.
    pub fn get(&self, infra_id: &str, instance_id: &str) -> Option<Instance> {
        self.snapshot
            .load()
            .get(infra_id)
            .and_then(|instances| instances.get(instance_id))
            .cloned()
    }

    /// Point-in-time snapshot of every (infrastructure id, instance id) entry.
    pub fn list(&self) -> Arc<Snapshot> {
        self.snapshot.load_full()
    }

    /// All instances currently recorded for one infrastructure.
    pub fn list_for(&self, infra_id: &str) -> Vec<Instance> {
        self.snapshot
            .load()
            .get(infra_id)
            .map(|instances| instances.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Insert or replace one instance under its infrastructure.
    pub fn put(&self, infra_id: &str, instance: Instance) {
        tracing::debug!(infra = %infra_id, instance = %instance.id, "registry: put instance");
        self.snapshot.rcu(|current| {
            let mut next = Snapshot::clone(current);
            next.entry(infra_id.to_string())
                .or_default()
                .insert(instance.id.clone(), instance.clone());
            next
        });
    }

    /// Remove one instance; a no-op when the key is unknown.
    pub fn remove(&self, infra_id: &str, instance_id: &str) {
        tracing::debug!(infra = %infra_id, instance = %instance_id, "registry: remove instance");
        self.snapshot.rcu(|current| {
            let mut next = Snapshot::clone(current);
            if let Some(instances) = next.get_mut(infra_id) {
                instances.remove(instance_id);
                if instances.is_empty() {
                    next.remove(infra_id);
                }
            }
            next
        });
    }

    /// Cascade removal: drop every instance of one infrastructure in a single
    /// snapshot transition.
    pub fn remove_all_for(&self, infra_id: &str) {
        tracing::debug!(infra = %infra_id, "registry: cascade remove instances");
        self.snapshot.rcu(|current| {
            let mut next = Snapshot::clone(current);
            next.remove(infra_id);
            next
        });
    }

    /// Replace the full instance set of one infrastructure in a single
    /// snapshot transition. Entries absent from `instances` disappear in the
    /// same swap that brings the fresh records in.
    pub fn replace_all_for(&self, infra_id: &str, instances: Vec<Instance>) {
        tracing::debug!(infra = %infra_id, count = instances.len(), "registry: replace instances");
        self.snapshot.rcu(|current| {
            let mut next = Snapshot::clone(current);
            if instances.is_empty() {
                next.remove(infra_id);
            } else {
                let fresh: HashMap<String, Instance> = instances
                    .iter()
                    .map(|instance| (instance.id.clone(), instance.clone()))
                    .collect();
                next.insert(infra_id.to_string(), fresh);
            }
            next
        });
    }

    /// Total instance count across all infrastructures.
    pub fn len(&self) -> usize {
        self.snapshot.load().values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.load().is_empty()
    }
}

impl Default for InstanceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(id: &str) -> Instance {
        Instance::new(id, "web").with_status("running")
    }

    #[test]
    fn test_put_get_remove() {
        let store = InstanceStore::new();
        store.put("infra1", instance("i-1"));

        assert_eq!(store.get("infra1", "i-1").unwrap().id, "i-1");
        assert!(store.get("infra1", "i-2").is_none());
        assert!(store.get("other", "i-1").is_none());

        store.remove("infra1", "i-1");
        assert!(store.get("infra1", "i-1").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let store = InstanceStore::new();
        store.put("infra1", instance("i-1"));

        store.remove("infra1", "ghost");
        store.remove("ghost", "i-1");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_cascade_remove_only_hits_one_infrastructure() {
        let store = InstanceStore::new();
        store.put("a", instance("i-1"));
        store.put("a", instance("i-2"));
        store.put("b", instance("i-3"));

        store.remove_all_for("a");

        assert!(store.list_for("a").is_empty());
        assert_eq!(store.list_for("b").len(), 1);
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_writes() {
        let store = InstanceStore::new();
        store.put("a", instance("i-1"));

        let snapshot = store.list();
        store.put("a", instance("i-2"));
        store.remove_all_for("a");

        assert_eq!(snapshot.get("a").unwrap().len(), 1);
        assert!(store.list_for("a").is_empty());
    }

    #[test]
    fn test_replace_all_for_swaps_stale_set() {
        let store = InstanceStore::new();
        store.put("a", Instance::new("i-1", "web").with_status("pending"));
        store.put("a", Instance::new("i-2", "web").with_status("running"));

        // i-2 vanished at the backend, i-1 progressed, i-3 appeared
        store.replace_all_for(
            "a",
            vec![
                Instance::new("i-1", "web").with_status("running"),
                Instance::new("i-3", "web").with_status("pending"),
            ],
        );

        let current = store.list_for("a");
        assert_eq!(current.len(), 2);
        assert_eq!(store.get("a", "i-1").unwrap().status, "running");
        assert!(store.get("a", "i-2").is_none());
        assert!(store.get("a", "i-3").is_some());
    }

    #[test]
    fn test_cascade_is_observed_all_or_nothing() {
        let store = Arc::new(InstanceStore::new());
        let n = 16;
        for i in 0..n {
            store.put("doomed", instance(&format!("i-{i}")));
        }
        store.put("survivor", instance("i-s"));

        let reader = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                // Every observed snapshot must hold all N doomed entries or none.
                loop {
                    let snapshot = store.list();
                    match snapshot.get("doomed") {
                        Some(instances) => assert_eq!(instances.len(), n),
                        None => break,
                    }
                }
            })
        };

        store.remove_all_for("doomed");
        reader.join().unwrap();
        assert_eq!(store.list_for("survivor").len(), 1);
    }

    #[test]
    fn test_concurrent_writers_lose_no_update() {
        let store = Arc::new(InstanceStore::new());
        let threads = 8;
        let per_thread = 50;

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..per_thread {
                        store.put(&format!("infra-{t}"), instance(&format!("i-{i}")));
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
