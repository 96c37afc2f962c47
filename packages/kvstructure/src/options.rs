//! Encoder and decoder configuration.

use serde::{Deserialize, Serialize};

use crate::OpaqueConvention;

/// Tag identifier read for field overrides when none is configured.
pub const DEFAULT_TAG_NAME: &str = "kvstructure";

/// Thread budget of [`Fanout::Bounded`] when none is configured.
pub const DEFAULT_MAX_TASKS: usize = 64;

/// What happens to floating point fields.
///
/// Both directions follow the same policy, so a value encoded under one
/// policy decodes under the same one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloatPolicy {
    /// Floats are neither written nor read.
    #[default]
    Skip,
    /// Floats are stored as their shortest round-tripping decimal form.
    Encode,
}

/// How sibling fields of a struct are scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fanout {
    /// Every field runs in the calling thread.
    Sequential,
    /// Fields run on a pool of this many worker threads shared by the
    /// whole traversal. `Bounded(0)` runs everything in the calling thread.
    Bounded(usize),
    /// Every structural field is spawned onto the global rayon pool.
    Unbounded,
}

impl Default for Fanout {
    fn default() -> Self {
        Fanout::Bounded(DEFAULT_MAX_TASKS)
    }
}

/// Options shared by [`Encoder`](crate::Encoder) and
/// [`Decoder`](crate::Decoder).
///
/// Deserializable so hosts can keep it in their own configuration files:
///
/// ```rust
/// use kvstructure::{Fanout, FloatPolicy, Options};
///
/// let options: Options = serde_json::from_str(
///     r#"{ "prefix": "services", "floats": "encode", "fanout": { "bounded": 8 } }"#,
/// ).unwrap();
///
/// assert_eq!(options.prefix, "services");
/// assert_eq!(options.floats, FloatPolicy::Encode);
/// assert_eq!(options.fanout, Fanout::Bounded(8));
/// assert_eq!(options.tag_name, "kvstructure");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Key prefix every path is rooted under.
    pub prefix: String,
    /// Tag identifier read for name overrides. Empty means the default.
    pub tag_name: String,
    pub opaque: OpaqueConvention,
    pub floats: FloatPolicy,
    pub fanout: Fanout,
    /// Zero padding applied to sequence indices on encode.
    pub index_width: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            tag_name: DEFAULT_TAG_NAME.to_string(),
            opaque: OpaqueConvention::default(),
            floats: FloatPolicy::default(),
            fanout: Fanout::default(),
            index_width: 0,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_tag_name(mut self, tag_name: impl Into<String>) -> Self {
        self.tag_name = tag_name.into();
        self
    }

    #[must_use]
    pub fn with_opaque_convention(mut self, convention: OpaqueConvention) -> Self {
        self.opaque = convention;
        self
    }

    #[must_use]
    pub fn with_floats(mut self, floats: FloatPolicy) -> Self {
        self.floats = floats;
        self
    }

    #[must_use]
    pub fn with_fanout(mut self, fanout: Fanout) -> Self {
        self.fanout = fanout;
        self
    }

    #[must_use]
    pub fn with_index_width(mut self, width: usize) -> Self {
        self.index_width = width;
        self
    }

    /// The tag identifier in effect.
    pub fn tag_name(&self) -> &str {
        if self.tag_name.is_empty() {
            DEFAULT_TAG_NAME
        } else {
            &self.tag_name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = Options::default();
        assert_eq!(options.prefix, "");
        assert_eq!(options.tag_name(), "kvstructure");
        assert_eq!(options.opaque, OpaqueConvention::DocumentTag);
        assert_eq!(options.floats, FloatPolicy::Skip);
        assert_eq!(options.fanout, Fanout::Bounded(DEFAULT_MAX_TASKS));
        assert_eq!(options.index_width, 0);
    }

    #[test]
    fn empty_tag_name_falls_back() {
        let options = Options::new().with_tag_name("");
        assert_eq!(options.tag_name(), DEFAULT_TAG_NAME);
    }

    #[test]
    fn builder_sets_fields() {
        let options = Options::new()
            .with_prefix("prefix")
            .with_tag_name("kv")
            .with_opaque_convention(OpaqueConvention::TagOption)
            .with_floats(FloatPolicy::Encode)
            .with_fanout(Fanout::Sequential)
            .with_index_width(5);

        assert_eq!(options.prefix, "prefix");
        assert_eq!(options.tag_name(), "kv");
        assert_eq!(options.opaque, OpaqueConvention::TagOption);
        assert_eq!(options.floats, FloatPolicy::Encode);
        assert_eq!(options.fanout, Fanout::Sequential);
        assert_eq!(options.index_width, 5);
    }

    #[test]
    fn deserialize_partial_config() {
        let options: Options =
            serde_json::from_str(r#"{ "opaque": "tag_option", "fanout": "unbounded" }"#).unwrap();
        assert_eq!(options.opaque, OpaqueConvention::TagOption);
        assert_eq!(options.fanout, Fanout::Unbounded);
        assert_eq!(options.tag_name(), "kvstructure");
    }

    #[test]
    fn serialize_roundtrip() {
        let options = Options::new().with_fanout(Fanout::Bounded(4)).with_index_width(3);
        let json = serde_json::to_string(&options).unwrap();
        let back: Options = serde_json::from_str(&json).unwrap();
        assert_eq!(back, options);
    }
}
