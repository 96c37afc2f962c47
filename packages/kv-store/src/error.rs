//! Error types for the store layer.
//!
//! Errors at this level are transport-focused. Type mismatches and parse
//! failures belong to the engine, not to the store.

/// Errors returned by a [`KvStore`](crate::KvStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Nothing exists at the key (or under the prefix).
    #[error("key not found: {key}")]
    NotFound { key: String },

    /// Generic I/O or transport failure.
    ///
    /// Use this for network errors, file I/O errors, IPC failures, etc.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The operation is not supported by this store.
    ///
    /// For example, deleting from a read-only snapshot.
    #[error("operation not supported")]
    NotSupported,

    /// Backend-specific failure with a message.
    #[error("{message}")]
    Other { message: String },
}

impl StoreError {
    /// Shorthand for [`StoreError::NotFound`].
    pub fn not_found(key: impl Into<String>) -> Self {
        StoreError::NotFound { key: key.into() }
    }

    /// Whether this error reports absence rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Transport(Box::new(e))
    }
}
