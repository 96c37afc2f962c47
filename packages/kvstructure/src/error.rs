//! Error types for encoding and decoding.

use kvstructure_store::StoreError;

use crate::Kind;

/// Errors raised while mapping a value onto a store or back.
///
/// Paths in these errors are relative to the configured prefix; keys are
/// full store keys.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The root cannot address a location in the store. Raised before any
    /// I/O.
    #[error("invalid target at '{path}': {reason}")]
    InvalidTarget { path: String, reason: String },

    /// The walkers met a kind they cannot decompose.
    #[error("unsupported type {kind} at '{path}'")]
    UnsupportedType { path: String, kind: Kind },

    /// A read found nothing at the key.
    #[error("key not found: {key}")]
    KeyNotFound { key: String },

    /// The stored text does not parse as the target's type.
    #[error("malformed {kind} value at '{path}': {message}")]
    MalformedValue {
        path: String,
        kind: Kind,
        message: String,
    },

    /// The stored text holds another kind than the destination, such as a
    /// fraction read into an integer.
    #[error("type mismatch at '{path}': expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: Kind,
        found: Kind,
    },

    /// An opaque field could not be serialized or deserialized.
    #[error("document error at '{path}': {source}")]
    Document {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The worker pool for a bounded fan-out could not be started.
    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    /// Error from the store, propagated verbatim.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    /// Whether this error reports a missing key.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::KeyNotFound { .. } | Error::Store(StoreError::NotFound { .. })
        )
    }
}
