//! Map typed structures onto a hierarchical key-value store and back.
//!
//! A value is flattened into slash-delimited keys: struct fields become path
//! segments, sequence elements become numeric segments and scalars become
//! leaf values in canonical text. Decoding walks the shape of a target value
//! and reads the same keys back.
//!
//! ```text
//! Service { name: "api", ports: [80, 443] }  under  "services/api"
//!
//!   services/api/name     = "api"
//!   services/api/ports/0  = "80"
//!   services/api/ports/1  = "443"
//! ```
//!
//! # Declaring structures
//!
//! Structs opt in with the [`structure!`] macro, which lists the persisted
//! fields and their tags. A `kvstructure` tag renames the segment, `"-"`
//! skips the field and a `json` tag stores the field as one opaque JSON
//! document instead of walking into it.
//!
//! ```rust
//! use kvstructure::{Decoder, Encoder};
//! use kvstructure_store::MemoryStore;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
//! struct Service {
//!     name: String,
//!     ports: Vec<u16>,
//!     settings: std::collections::BTreeMap<String, String>,
//! }
//!
//! kvstructure::structure! {
//!     Service {
//!         name { kvstructure = "service_name" },
//!         ports,
//!         settings { json = "settings" },
//!     }
//! }
//!
//! let store = MemoryStore::new();
//! let service = Service {
//!     name: "api".into(),
//!     ports: vec![80, 443],
//!     settings: [("mode".to_string(), "fast".to_string())].into(),
//! };
//!
//! Encoder::new(&store).with_prefix("services").encode("api", &service).unwrap();
//! assert_eq!(
//!     store.keys(),
//!     vec![
//!         "services/api/ports/0",
//!         "services/api/ports/1",
//!         "services/api/service_name",
//!         "services/api/settings",
//!     ]
//! );
//!
//! let mut back = Service::default();
//! Decoder::new(&store).with_prefix("services").decode("api", &mut back).unwrap();
//! assert_eq!(back, service);
//! ```
//!
//! # Concurrency
//!
//! Sibling fields of a struct are processed concurrently according to
//! [`Fanout`]. Each task borrows its own field, so the store is the only
//! shared state and must be `Send + Sync`.

mod decoder;
mod encoder;
mod engine;
mod error;
mod fanout;
mod kind;
mod metadata;
mod options;
mod path;
mod reflect;
mod structure;
mod tag;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::Error;
pub use kind::Kind;
pub use metadata::Metadata;
pub use options::{Fanout, FloatPolicy, Options, DEFAULT_MAX_TASKS, DEFAULT_TAG_NAME};
pub use path::{KeyPath, Prefix};
pub use reflect::{Node, NodeMut, Reflect, Scalar, ScalarMut, Sequence, SequenceMut};
pub use structure::{Document, DocumentMut, Field, FieldMut, Structure};
pub use tag::{Disposition, OpaqueConvention, ResolvedField, TagResolver, Tags, DOCUMENT_TAG};

pub use kvstructure_store::{KvPair, KvStore, MemoryStore, RecordingStore, StoreCall, StoreError};

/// Encode `value` under `name` below `prefix` with default options.
pub fn encode<T, S>(name: &str, value: &T, prefix: &str, store: S) -> Result<(), Error>
where
    T: Reflect,
    S: KvStore,
{
    Encoder::new(store).with_prefix(prefix).encode(name, value)
}

/// Decode the keys under `name` below `prefix` into `target` with default
/// options.
pub fn decode<T, S>(name: &str, target: &mut T, prefix: &str, store: S) -> Result<(), Error>
where
    T: Reflect,
    S: KvStore,
{
    Decoder::new(store).with_prefix(prefix).decode(name, target)
}
