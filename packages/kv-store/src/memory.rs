//! In-memory store backed by an ordered map.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use bytes::Bytes;

use crate::{is_under, KvPair, KvStore, StoreError};

/// An in-memory, `BTreeMap`-based store.
///
/// Intended for tests and embedding. Keys are kept in lexicographic order,
/// which is also the order `list` returns them in, matching what most
/// hierarchical backends (Consul, etcd) do. An empty listing or deletion
/// reports `StoreError::NotFound`, as those backends do.
///
/// # Example
///
/// ```rust
/// use kvstructure_store::{KvStore, MemoryStore};
/// use bytes::Bytes;
///
/// let store = MemoryStore::new();
/// store.put("users/0", Bytes::from_static(b"alice")).unwrap();
/// store.put("users/1", Bytes::from_static(b"bob")).unwrap();
///
/// assert_eq!(store.list("users").unwrap().len(), 2);
///
/// store.delete_tree("users").unwrap();
/// assert!(store.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Bytes>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given pairs.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Bytes>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }

    /// Sorted list of every stored key.
    pub fn keys(&self) -> Vec<String> {
        self.read_entries().keys().cloned().collect()
    }

    /// Copy of the whole key space.
    pub fn snapshot(&self) -> BTreeMap<String, Bytes> {
        self.read_entries().clone()
    }

    fn read_entries(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, Bytes>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_entries(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<String, Bytes>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KvStore for MemoryStore {
    fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        tracing::trace!(key, len = value.len(), "memory put");
        self.write_entries().insert(key.to_string(), value);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<KvPair, StoreError> {
        self.read_entries()
            .get(key)
            .map(|value| KvPair::new(key, value.clone()))
            .ok_or_else(|| StoreError::not_found(key))
    }

    fn list(&self, prefix: &str) -> Result<Vec<KvPair>, StoreError> {
        let pairs: Vec<KvPair> = self
            .read_entries()
            .iter()
            .filter(|(key, _)| is_under(key, prefix))
            .map(|(key, value)| KvPair::new(key.clone(), value.clone()))
            .collect();

        if pairs.is_empty() {
            return Err(StoreError::not_found(prefix));
        }
        Ok(pairs)
    }

    fn delete_tree(&self, prefix: &str) -> Result<(), StoreError> {
        let mut entries = self.write_entries();
        let before = entries.len();
        entries.retain(|key, _| !is_under(key, prefix));
        let removed = before - entries.len();

        tracing::trace!(prefix, removed, "memory delete_tree");
        if removed == 0 {
            return Err(StoreError::not_found(prefix));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_put_get() {
        let store = MemoryStore::new();

        store.put("foo", Bytes::from_static(b"bar")).unwrap();

        let pair = store.get("foo").unwrap();
        assert_eq!(pair.key, "foo");
        assert_eq!(pair.value, Bytes::from_static(b"bar"));
    }

    #[test]
    fn get_nonexistent_is_not_found() {
        let store = MemoryStore::new();
        let err = store.get("nonexistent").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn overwrite_works() {
        let store = MemoryStore::new();

        store.put("value", Bytes::from_static(b"first")).unwrap();
        store.put("value", Bytes::from_static(b"second")).unwrap();

        assert_eq!(store.get("value").unwrap().value, Bytes::from_static(b"second"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn list_is_ordered_and_bounded_by_segment() {
        let store = MemoryStore::with_entries([
            ("app/items/1", "b"),
            ("app/items/0", "a"),
            ("app/items/10", "k"),
            ("app/itemsx", "no"),
        ]);

        let keys: Vec<String> = store
            .list("app/items")
            .unwrap()
            .into_iter()
            .map(|p| p.key)
            .collect();
        assert_eq!(keys, vec!["app/items/0", "app/items/1", "app/items/10"]);
    }

    #[test]
    fn list_empty_is_not_found() {
        let store = MemoryStore::with_entries([("a", "1")]);
        assert!(store.list("b").unwrap_err().is_not_found());
    }

    #[test]
    fn delete_tree_removes_subtree_only() {
        let store = MemoryStore::with_entries([
            ("app/items/0", "a"),
            ("app/items/1/name", "b"),
            ("app/other", "c"),
        ]);

        store.delete_tree("app/items").unwrap();

        assert_eq!(store.keys(), vec!["app/other"]);
    }

    #[test]
    fn delete_absent_tree_is_not_found() {
        let store = MemoryStore::new();
        assert!(store.delete_tree("nothing").unwrap_err().is_not_found());
    }

    #[test]
    fn snapshot_copies_entries() {
        let store = MemoryStore::with_entries([("k", "v")]);
        let snapshot = store.snapshot();
        store.put("k2", Bytes::from_static(b"v2")).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.len(), 2);
    }
}
