//! Store capability for kvstructure.
//!
//! This is the only boundary the encoder and decoder talk to. A store is a
//! hierarchical key-value backend addressed by slash-delimited keys and
//! exposing four operations:
//!
//! - `put`: write bytes at a key
//! - `get`: read the pair at a key
//! - `list`: every pair at or under a prefix, ordered by key
//! - `delete_tree`: remove every pair at or under a prefix
//!
//! Connections, retries and topology belong to the implementation, never to
//! the engine.
//!
//! # Example
//!
//! ```rust
//! use kvstructure_store::{KvStore, MemoryStore, StoreError};
//! use bytes::Bytes;
//!
//! let store = MemoryStore::new();
//! store.put("app/name", Bytes::from_static(b"demo")).unwrap();
//!
//! assert_eq!(store.get("app/name").unwrap().value, Bytes::from_static(b"demo"));
//! assert!(matches!(store.get("app/missing"), Err(StoreError::NotFound { .. })));
//! ```

pub use bytes::Bytes;

mod error;
mod memory;
mod recording;
mod traits;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use recording::{RecordingStore, StoreCall};
pub use traits::{KvPair, KvStore};

/// Check whether `key` lives at or under `prefix`, on a segment boundary.
///
/// `app/items` is under `app/items` and `app`, but not under `app/item`.
/// An empty prefix (or `/`) covers every key.
pub fn is_under(key: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match key.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
