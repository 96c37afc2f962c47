//! Field tags and how they resolve to key segments.
//!
//! A field carries tag metadata as `(identifier, text)` pairs, e.g.
//! `kvstructure = "description,omitempty"` and `json = "peer"`. The engine
//! reads its own identifier (configurable, `kvstructure` by default) to find
//! a name override, and decides whether the field is walked structurally,
//! stored as one opaque JSON document, or skipped.

use serde::{Deserialize, Serialize};

use crate::KeyPath;

/// Identifier of the general-purpose document tag.
pub const DOCUMENT_TAG: &str = "json";

/// Tag metadata attached to a field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tags(&'static [(&'static str, &'static str)]);

impl Tags {
    pub const fn new(pairs: &'static [(&'static str, &'static str)]) -> Self {
        Tags(pairs)
    }

    pub const fn empty() -> Self {
        Tags(&[])
    }

    /// Text of the first tag with the given identifier.
    pub fn get(&self, identifier: &str) -> Option<&'static str> {
        self.0
            .iter()
            .find(|(key, _)| *key == identifier)
            .map(|(_, value)| *value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Which tag convention marks a field as opaque.
///
/// Structures have been written for both; a store is read with one of them,
/// chosen explicitly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpaqueConvention {
    /// A non-empty `json` tag without an engine name override makes the field
    /// opaque. `json = "-"` skips the field.
    #[default]
    DocumentTag,
    /// A `json` option on the engine tag makes the field opaque, e.g.
    /// `kvstructure = "settings,json"`.
    TagOption,
}

/// How a field takes part in a traversal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    Structural,
    Opaque,
    Skip,
}

/// Result of resolving one field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedField {
    pub segment: String,
    pub disposition: Disposition,
}

/// Resolves field names and tags into key segments.
#[derive(Clone, Copy, Debug)]
pub struct TagResolver<'a> {
    tag_name: &'a str,
    convention: OpaqueConvention,
}

impl<'a> TagResolver<'a> {
    pub fn new(tag_name: &'a str, convention: OpaqueConvention) -> Self {
        Self {
            tag_name,
            convention,
        }
    }

    /// Resolve a field. Never fails: an empty or missing tag falls back to
    /// the lower-cased field name.
    ///
    /// ```rust
    /// use kvstructure::{Disposition, OpaqueConvention, TagResolver, Tags};
    ///
    /// let resolver = TagResolver::new("kvstructure", OpaqueConvention::DocumentTag);
    ///
    /// let tags = Tags::new(&[("kvstructure", "description,omitempty")]);
    /// let field = resolver.resolve("Desc", &tags);
    /// assert_eq!(field.segment, "description");
    /// assert_eq!(field.disposition, Disposition::Structural);
    ///
    /// let field = resolver.resolve("Proto", &Tags::new(&[("json", "proto")]));
    /// assert_eq!(field.segment, "proto");
    /// assert_eq!(field.disposition, Disposition::Opaque);
    /// ```
    pub fn resolve(&self, name: &str, tags: &Tags) -> ResolvedField {
        let engine_tag = tags.get(self.tag_name).unwrap_or("");
        let mut parts = engine_tag.split(',').map(str::trim);
        let rename = parts.next().unwrap_or("");
        let mut options = parts;

        let segment = if rename.is_empty() {
            name.to_lowercase()
        } else {
            rename.to_string()
        };

        let disposition = if rename == "-" {
            Disposition::Skip
        } else {
            match self.convention {
                OpaqueConvention::DocumentTag => match tags.get(DOCUMENT_TAG) {
                    Some(doc) if !doc.is_empty() && rename.is_empty() => {
                        if doc.split(',').next() == Some("-") {
                            Disposition::Skip
                        } else {
                            Disposition::Opaque
                        }
                    }
                    _ => Disposition::Structural,
                },
                OpaqueConvention::TagOption => {
                    if options.any(|option| option == DOCUMENT_TAG) {
                        Disposition::Opaque
                    } else {
                        Disposition::Structural
                    }
                }
            }
        };

        ResolvedField {
            segment,
            disposition,
        }
    }

    /// Resolve a field and build its full path under `parent`.
    pub fn resolve_at(&self, parent: &KeyPath, name: &str, tags: &Tags) -> (KeyPath, Disposition) {
        let resolved = self.resolve(name, tags);
        (parent.child(&resolved.segment), resolved.disposition)
    }
}
