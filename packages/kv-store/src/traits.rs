//! The store capability trait.

use std::sync::Arc;

use bytes::Bytes;

use crate::StoreError;

/// A key together with the bytes stored under it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KvPair {
    /// Full key, including any prefix the caller supplied.
    pub key: String,
    /// Raw payload.
    pub value: Bytes,
}

impl KvPair {
    pub fn new(key: impl Into<String>, value: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Hierarchical key-value store addressed by slash-delimited keys.
///
/// Every method takes `&self`: the encoder and decoder share one store
/// between concurrently running field tasks, so implementations synchronize
/// internally.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn KvStore>` or
/// `Arc<dyn KvStore>`.
pub trait KvStore: Send + Sync {
    /// Write `value` at `key`, replacing whatever was there.
    fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError>;

    /// Read the pair stored at `key`.
    ///
    /// # Returns
    ///
    /// * `Ok(pair)` - The data at the key.
    /// * `Err(StoreError::NotFound)` - Nothing is stored at the key.
    /// * `Err(_)` - A transport or system error occurred.
    fn get(&self, key: &str) -> Result<KvPair, StoreError>;

    /// List every pair at or under `prefix`, in the store's native key order.
    ///
    /// Stores may report an empty listing either as `Ok(vec![])` or as
    /// `Err(StoreError::NotFound)`; callers must accept both.
    fn list(&self, prefix: &str) -> Result<Vec<KvPair>, StoreError>;

    /// Delete every pair at or under `prefix`.
    ///
    /// Deleting an absent subtree may fail with `StoreError::NotFound`.
    fn delete_tree(&self, prefix: &str) -> Result<(), StoreError>;
}

// Blanket implementations for references and smart pointers

impl<T: KvStore + ?Sized> KvStore for &T {
    fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        (**self).put(key, value)
    }

    fn get(&self, key: &str) -> Result<KvPair, StoreError> {
        (**self).get(key)
    }

    fn list(&self, prefix: &str) -> Result<Vec<KvPair>, StoreError> {
        (**self).list(prefix)
    }

    fn delete_tree(&self, prefix: &str) -> Result<(), StoreError> {
        (**self).delete_tree(prefix)
    }
}

impl<T: KvStore + ?Sized> KvStore for Box<T> {
    fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        self.as_ref().put(key, value)
    }

    fn get(&self, key: &str) -> Result<KvPair, StoreError> {
        self.as_ref().get(key)
    }

    fn list(&self, prefix: &str) -> Result<Vec<KvPair>, StoreError> {
        self.as_ref().list(prefix)
    }

    fn delete_tree(&self, prefix: &str) -> Result<(), StoreError> {
        self.as_ref().delete_tree(prefix)
    }
}

impl<T: KvStore + ?Sized> KvStore for Arc<T> {
    fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        self.as_ref().put(key, value)
    }

    fn get(&self, key: &str) -> Result<KvPair, StoreError> {
        self.as_ref().get(key)
    }

    fn list(&self, prefix: &str) -> Result<Vec<KvPair>, StoreError> {
        self.as_ref().list(prefix)
    }

    fn delete_tree(&self, prefix: &str) -> Result<(), StoreError> {
        self.as_ref().delete_tree(prefix)
    }
}
