//! Optional record of which keys a traversal touched.

use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};

use crate::KeyPath;

/// Keys visited by an encode or decode, and keys nothing accounted for.
///
/// Attach one with `with_metadata` on an [`Encoder`](crate::Encoder) or
/// [`Decoder`](crate::Decoder). Keys are relative to the prefix.
///
/// - `keys`: every key successfully written or read, opaque ones included.
/// - `unused`: keys found under the root once the traversal finished that no
///   field wrote or read, e.g. leftovers of a removed field.
#[derive(Debug, Default)]
pub struct Metadata {
    keys: Mutex<BTreeSet<String>>,
    unused: Mutex<BTreeSet<String>>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        lock(&self.keys).iter().cloned().collect()
    }

    pub fn unused(&self) -> Vec<String> {
        lock(&self.unused).iter().cloned().collect()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        lock(&self.keys).contains(key)
    }

    pub fn clear(&self) {
        lock(&self.keys).clear();
        lock(&self.unused).clear();
    }

    pub(crate) fn record_key(&self, path: &KeyPath) {
        lock(&self.keys).insert(path.to_string());
    }

    /// Mark every listed path that was not recorded as visited.
    pub(crate) fn record_unused(&self, listed: impl IntoIterator<Item = KeyPath>) {
        let keys = lock(&self.keys);
        let mut unused = lock(&self.unused);
        for path in listed {
            let key = path.to_string();
            if !keys.contains(&key) {
                unused.insert(key);
            }
        }
    }
}

fn lock(set: &Mutex<BTreeSet<String>>) -> std::sync::MutexGuard<'_, BTreeSet<String>> {
    set.lock().unwrap_or_else(PoisonError::into_inner)
}
