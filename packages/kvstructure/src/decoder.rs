//! Reading values back out of a store.

use std::collections::HashMap;
use std::sync::Arc;

use kvstructure_store::{KvPair, KvStore};

use crate::engine::Engine;
use crate::fanout::{first_error, Scheduler};
use crate::{
    Disposition, DocumentMut, Error, FloatPolicy, Kind, KeyPath, Metadata, NodeMut, Options,
    Reflect, ScalarMut, SequenceMut, Structure, TagResolver,
};

/// Walks the shape of a target value and fills it from a store.
///
/// The target's type drives the traversal: each listed field is read at the
/// key it would have been written to. Sequences are rebuilt from whatever
/// indices the store holds, so stored data with fewer elements shrinks the
/// target.
///
/// ```rust
/// use kvstructure::Decoder;
/// use kvstructure_store::MemoryStore;
///
/// let store = MemoryStore::with_entries([("prefix/foo/0", "a"), ("prefix/foo/1", "b")]);
///
/// let mut items: Vec<String> = Vec::new();
/// Decoder::new(&store).with_prefix("prefix").decode("foo", &mut items).unwrap();
///
/// assert_eq!(items, vec!["a", "b"]);
/// ```
pub struct Decoder<S> {
    engine: Engine<S>,
}

impl<S: KvStore> Decoder<S> {
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

    /// Fill `target` from the keys under `name`.
    ///
    /// On error the target may be partially filled.
    pub fn decode<T: Reflect>(&self, name: &str, target: &mut T) -> Result<(), Error> {
        let root = KeyPath::parse(name);
        self.engine.check_root(&root, target.kind())?;

        let span = tracing::debug_span!("decode", root = %root, prefix = %self.engine.prefix());
        let _entered = span.enter();

        let walk = Walk {
            engine: &self.engine,
            resolver: self.engine.resolver(),
            scheduler: Scheduler::new(self.engine.options().fanout)?,
        };
        walk.value(&root, target, None)?;
        self.engine.finish(&root)
    }
}

/// Children of a sequence found in the store, one per index segment.
#[derive(Debug)]
struct Child {
    segment: String,
    /// The entry stored exactly at the child's path, if any.
    leaf: Option<KvPair>,
}

struct Walk<'e, S> {
    engine: &'e Engine<S>,
    resolver: TagResolver<'e>,
    scheduler: Scheduler,
}

impl<S: KvStore> Walk<'_, S> {
    fn value(
        &self,
        path: &KeyPath,
        target: &mut dyn Reflect,
        cached: Option<&KvPair>,
    ) -> Result<(), Error> {
        match target.node_mut() {
            NodeMut::Scalar(scalar) => self.scalar(path, scalar, cached),
            NodeMut::Struct(structure) => self.structure(path, structure),
            NodeMut::Sequence(sequence) => self.sequence(path, sequence),
            NodeMut::Unsupported(kind) => Err(Error::UnsupportedType {
                path: path.to_string(),
                kind,
            }),
        }
    }

    fn scalar(
        &self,
        path: &KeyPath,
        scalar: &mut dyn ScalarMut,
        cached: Option<&KvPair>,
    ) -> Result<(), Error> {
        let kind = scalar.kind();
        if kind == Kind::Float && self.engine.options().floats == FloatPolicy::Skip {
            tracing::trace!(path = %path, "skipping float");
            return Ok(());
        }

        let fetched;
        let pair = match cached {
            Some(pair) => pair,
            None => {
                fetched = self.engine.get(path)?;
                &fetched
            }
        };

        let malformed = |message: String| Error::MalformedValue {
            path: path.to_string(),
            kind,
            message,
        };
        let text = std::str::from_utf8(&pair.value).map_err(|e| malformed(e.to_string()))?;

        scalar.parse_text(text).map_err(|message| {
            if matches!(kind, Kind::Int | Kind::Uint) && is_float_text(text) {
                Error::TypeMismatch {
                    path: path.to_string(),
                    expected: kind,
                    found: Kind::Float,
                }
            } else {
                malformed(message)
            }
        })?;

        self.engine.record(path);
        Ok(())
    }

    fn structure(&self, path: &KeyPath, structure: &mut dyn Structure) -> Result<(), Error> {
        let mut tasks: Vec<(KeyPath, &mut dyn DocumentMut)> = Vec::new();

        for field in structure.fields_mut() {
            let name = field.name();
            let (child, disposition) = self.resolver.resolve_at(path, name, &field.tags());
            match disposition {
                Disposition::Skip => {
                    tracing::trace!(path = %child, field = name, "skipping field");
                }
                Disposition::Opaque => {
                    let pair = self.engine.get(&child)?;
                    field
                        .into_value()
                        .load_document(&pair.value)
                        .map_err(|source| Error::Document {
                            path: child.to_string(),
                            source,
                        })?;
                    self.engine.record(&child);
                }
                Disposition::Structural => tasks.push((child, field.into_value())),
            }
        }

        let errors = self.scheduler.run_all(tasks, |(child, value)| {
            self.value(&child, value.as_reflect_mut(), None)
        });
        first_error(&path.to_string(), errors)
    }

    fn sequence(&self, path: &KeyPath, sequence: &mut dyn SequenceMut) -> Result<(), Error> {
        let children = self.children(path)?;
        sequence.reset(children.len());

        for (index, child) in children.iter().enumerate() {
            let Some(element) = sequence.element_mut(index) else {
                continue;
            };
            let child_path = path.child(&child.segment);
            let kind = element.kind();
            if !kind.is_structural() {
                return Err(Error::UnsupportedType {
                    path: child_path.to_string(),
                    kind,
                });
            }
            let cached = if kind.is_scalar() {
                child.leaf.as_ref()
            } else {
                None
            };
            self.value(&child_path, element, cached)?;
        }
        Ok(())
    }

    /// Group the entries under `path` by their first segment below it.
    ///
    /// Numeric segments come first in numeric order, so `10` follows `9`;
    /// other segments keep the order the store listed them in.
    fn children(&self, path: &KeyPath) -> Result<Vec<Child>, Error> {
        let mut children: Vec<Child> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for pair in self.engine.list(path)? {
            let Some(rest) = self
                .engine
                .prefix()
                .relative(&pair.key)
                .and_then(|relative| relative.strip_prefix(path))
            else {
                continue;
            };
            let Some(segment) = rest.first() else {
                continue;
            };

            let position = match positions.get(segment) {
                Some(&position) => position,
                None => {
                    positions.insert(segment.to_string(), children.len());
                    children.push(Child {
                        segment: segment.to_string(),
                        leaf: None,
                    });
                    children.len() - 1
                }
            };
            if rest.len() == 1 {
                children[position].leaf = Some(pair);
            }
        }

        children.sort_by_key(|child| match child.segment.parse::<u64>() {
            Ok(index) => (false, index),
            Err(_) => (true, 0),
        });
        tracing::trace!(path = %path, count = children.len(), "sequence children");
        Ok(children)
    }
}

/// Whether `text` is a decimal float that no integer type can hold, such as
/// `1.5` or `2e3`.
fn is_float_text(text: &str) -> bool {
    text.bytes().any(|b| b.is_ascii_digit())
        && text.parse::<i128>().is_err()
        && text.parse::<u128>().is_err()
        && text.parse::<f64>().is_ok()
}
