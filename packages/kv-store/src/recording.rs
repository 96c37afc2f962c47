//! A store wrapper that records every call made through it.

use std::sync::{Mutex, PoisonError};

use bytes::Bytes;

use crate::{KvPair, KvStore, StoreError};

/// One call observed by a [`RecordingStore`].
///
/// Calls order by operation first, in declaration order, then by key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum StoreCall {
    Put { key: String, value: Bytes },
    Get { key: String },
    List { prefix: String },
    DeleteTree { prefix: String },
}

impl StoreCall {
    pub fn put(key: impl Into<String>, value: impl Into<Bytes>) -> Self {
        StoreCall::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn get(key: impl Into<String>) -> Self {
        StoreCall::Get { key: key.into() }
    }

    pub fn list(prefix: impl Into<String>) -> Self {
        StoreCall::List {
            prefix: prefix.into(),
        }
    }

    pub fn delete_tree(prefix: impl Into<String>) -> Self {
        StoreCall::DeleteTree {
            prefix: prefix.into(),
        }
    }
}

/// Forwards every operation to an inner store and keeps a log of the calls.
///
/// Calls are logged in the order they reach the wrapper, which under
/// concurrent fan-out is only meaningful per key. Use [`calls_sorted`] when
/// comparing against an expected set.
///
/// [`calls_sorted`]: RecordingStore::calls_sorted
#[derive(Debug)]
pub struct RecordingStore<S> {
    inner: S,
    calls: Mutex<Vec<StoreCall>>,
}

impl<S: KvStore> RecordingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Calls in arrival order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Calls sorted by operation and key, for order-insensitive comparison.
    pub fn calls_sorted(&self) -> Vec<StoreCall> {
        let mut calls = self.calls();
        calls.sort();
        calls
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn record(&self, call: StoreCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

impl<S: KvStore> KvStore for RecordingStore<S> {
    fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        self.record(StoreCall::put(key, value.clone()));
        self.inner.put(key, value)
    }

    fn get(&self, key: &str) -> Result<KvPair, StoreError> {
        self.record(StoreCall::get(key));
        self.inner.get(key)
    }

    fn list(&self, prefix: &str) -> Result<Vec<KvPair>, StoreError> {
        self.record(StoreCall::list(prefix));
        self.inner.list(prefix)
    }

    fn delete_tree(&self, prefix: &str) -> Result<(), StoreError> {
        self.record(StoreCall::delete_tree(prefix));
        self.inner.delete_tree(prefix)
    }
}
