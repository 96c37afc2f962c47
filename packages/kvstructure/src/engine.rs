//! State and store access shared by the encoder and the decoder.

use std::sync::Arc;

use bytes::Bytes;
use kvstructure_store::{KvPair, KvStore, StoreError};

use crate::{Error, Kind, KeyPath, Metadata, Options, Prefix, TagResolver};

pub(crate) struct Engine<S> {
    store: S,
    options: Options,
    prefix: Prefix,
    metadata: Option<Arc<Metadata>>,
}

impl<S: KvStore> Engine<S> {
    pub(crate) fn new(store: S) -> Self {
        Self {
            store,
            options: Options::default(),
            prefix: Prefix::default(),
            metadata: None,
        }
    }

    pub(crate) fn set_options(&mut self, options: Options) {
        self.prefix = Prefix::new(&options.prefix);
        self.options = options;
    }

    pub(crate) fn set_metadata(&mut self, metadata: Arc<Metadata>) {
        self.metadata = Some(metadata);
    }

    pub(crate) fn options(&self) -> &Options {
        &self.options
    }

    pub(crate) fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn resolver(&self) -> TagResolver<'_> {
        TagResolver::new(self.options.tag_name(), self.options.opaque)
    }

    /// Scalars and sequences need a name of their own: at the empty root
    /// they would address the bare prefix.
    pub(crate) fn check_root(&self, root: &KeyPath, kind: Kind) -> Result<(), Error> {
        if root.is_empty() && (kind.is_scalar() || kind == Kind::Sequence) {
            return Err(Error::InvalidTarget {
                path: root.to_string(),
                reason: format!("a {} needs a non-empty root name", kind),
            });
        }
        Ok(())
    }

    pub(crate) fn put(&self, path: &KeyPath, value: Bytes) -> Result<(), Error> {
        let key = self.prefix.key(path);
        tracing::debug!(key = %key, len = value.len(), "put");
        self.store.put(&key, value)?;
        self.record(path);
        Ok(())
    }

    pub(crate) fn get(&self, path: &KeyPath) -> Result<KvPair, Error> {
        let key = self.prefix.key(path);
        tracing::debug!(key = %key, "get");
        self.store.get(&key).map_err(|e| match e {
            StoreError::NotFound { .. } => Error::KeyNotFound { key },
            other => Error::Store(other),
        })
    }

    /// List a subtree; an absent subtree is an empty listing.
    pub(crate) fn list(&self, path: &KeyPath) -> Result<Vec<KvPair>, Error> {
        let key = self.prefix.key(path);
        tracing::debug!(key = %key, "list");
        match self.store.list(&key) {
            Ok(pairs) => Ok(pairs),
            Err(StoreError::NotFound { .. }) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a subtree; an absent subtree is already deleted.
    pub(crate) fn delete_tree(&self, path: &KeyPath) -> Result<(), Error> {
        let key = self.prefix.key(path);
        tracing::debug!(key = %key, "delete_tree");
        match self.store.delete_tree(&key) {
            Ok(()) | Err(StoreError::NotFound { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn record(&self, path: &KeyPath) {
        if let Some(metadata) = &self.metadata {
            metadata.record_key(path);
        }
    }

    /// With a recorder attached, list the root and mark what no field
    /// accounted for.
    pub(crate) fn finish(&self, root: &KeyPath) -> Result<(), Error> {
        let Some(metadata) = &self.metadata else {
            return Ok(());
        };
        let listed = self
            .list(root)?
            .into_iter()
            .filter_map(|pair| self.prefix.relative(&pair.key));
        metadata.record_unused(listed);
        Ok(())
    }
}
