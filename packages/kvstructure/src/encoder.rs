//! Writing values into a store.

use std::sync::Arc;

use bytes::Bytes;
use kvstructure_store::KvStore;

use crate::engine::Engine;
use crate::fanout::{first_error, Scheduler};
use crate::{
    Disposition, Document, Error, FloatPolicy, Kind, KeyPath, Metadata, Node, Options, Reflect,
    Scalar, Sequence, Structure, TagResolver,
};

/// Walks a value and writes it into a store.
///
/// ```rust
/// use kvstructure::{Encoder, Options};
/// use kvstructure_store::MemoryStore;
///
/// let store = MemoryStore::new();
/// let encoder = Encoder::new(&store).with_options(Options::new().with_prefix("prefix"));
///
/// encoder.encode("foo", &vec!["foo".to_string(), "bar".to_string()]).unwrap();
///
/// assert_eq!(store.keys(), vec!["prefix/foo/0", "prefix/foo/1"]);
/// ```
pub struct Encoder<S> {
    engine: Engine<S>,
}

impl<S: KvStore> Encoder<S> {
    pub fn new(store: S) -> Self {
        Self {
            engine: Engine::new(store),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.engine.set_options(options);
        self
    }

    /// Shorthand for replacing only the prefix.
    #[must_use]
    pub fn with_prefix(self, prefix: impl Into<String>) -> Self {
        let options = self.engine.options().clone().with_prefix(prefix);
        self.with_options(options)
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Arc<Metadata>) -> Self {
        self.engine.set_metadata(metadata);
        self
    }

    pub fn options(&self) -> &Options {
        self.engine.options()
    }

    pub fn store(&self) -> &S {
        self.engine.store()
    }

    /// Write `value` under `name`.
    ///
    /// Errors leave the store partially written: sibling fields already
    /// dispatched run to completion and nothing is rolled back.
    pub fn encode<T: Reflect>(&self, name: &str, value: &T) -> Result<(), Error> {
        let root = KeyPath::parse(name);
        self.engine.check_root(&root, value.kind())?;

        let span = tracing::debug_span!("encode", root = %root, prefix = %self.engine.prefix());
        let _entered = span.enter();

        let walk = Walk {
            engine: &self.engine,
            resolver: self.engine.resolver(),
            scheduler: Scheduler::new(self.engine.options().fanout)?,
        };
        walk.value(&root, value)?;
        self.engine.finish(&root)
    }
}

struct Walk<'e, S> {
    engine: &'e Engine<S>,
    resolver: TagResolver<'e>,
    scheduler: Scheduler,
}

impl<S: KvStore> Walk<'_, S> {
    fn value(&self, path: &KeyPath, value: &dyn Reflect) -> Result<(), Error> {
        match value.node() {
            Node::Scalar(scalar) => self.scalar(path, scalar),
            Node::Struct(structure) => self.structure(path, structure),
            Node::Sequence(sequence) => self.sequence(path, sequence),
            Node::Unsupported(kind) => Err(Error::UnsupportedType {
                path: path.to_string(),
                kind,
            }),
        }
    }

    fn scalar(&self, path: &KeyPath, scalar: &dyn Scalar) -> Result<(), Error> {
        if scalar.kind() == Kind::Float && self.engine.options().floats == FloatPolicy::Skip {
            tracing::trace!(path = %path, "skipping float");
            return Ok(());
        }
        self.engine.put(path, Bytes::from(scalar.to_text()))
    }

    fn structure(&self, path: &KeyPath, structure: &dyn Structure) -> Result<(), Error> {
        let mut tasks: Vec<(KeyPath, &dyn Document)> = Vec::new();

        for field in structure.fields() {
            let (child, disposition) = self.resolver.resolve_at(path, field.name(), &field.tags());
            match disposition {
                Disposition::Skip => {
                    tracing::trace!(path = %child, field = field.name(), "skipping field");
                }
                Disposition::Opaque => {
                    let document = field.value().to_document().map_err(|source| {
                        Error::Document {
                            path: child.to_string(),
                            source,
                        }
                    })?;
                    self.engine.put(&child, Bytes::from(document))?;
                }
                Disposition::Structural => tasks.push((child, field.value())),
            }
        }

        let errors = self
            .scheduler
            .run_all(tasks, |(child, value)| self.value(&child, value.as_reflect()));
        first_error(&path.to_string(), errors)
    }

    fn sequence(&self, path: &KeyPath, sequence: &dyn Sequence) -> Result<(), Error> {
        let Some(first) = sequence.element(0) else {
            return Ok(());
        };

        // Elements share one type, so the first one decides whether the
        // stored sequence may be replaced at all.
        let width = self.engine.options().index_width;
        let kind = first.kind();
        if !kind.is_structural() {
            return Err(Error::UnsupportedType {
                path: path.index(0, width).to_string(),
                kind,
            });
        }

        self.engine.delete_tree(path)?;

        for index in 0..sequence.len() {
            if let Some(element) = sequence.element(index) {
                self.value(&path.index(index, width), element)?;
            }
        }
        Ok(())
    }
}
