//! Key paths and the store prefix they are rooted under.

use std::fmt;

/// A path below the configured prefix.
///
/// Components are separated by `/` when rendered. Empty components are
/// never stored, so `a//b/` and `a/b` are the same path, and building a
/// path step by step gives the same result as parsing it whole.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct KeyPath {
    components: Vec<String>,
}

impl KeyPath {
    /// The empty path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a slash-delimited path.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kvstructure::KeyPath;
    ///
    /// let path = KeyPath::parse("users/0/name");
    /// assert_eq!(path.len(), 3);
    ///
    /// // Redundant slashes are normalized
    /// assert_eq!(KeyPath::parse("/users//0/"), KeyPath::parse("users/0"));
    /// ```
    pub fn parse(s: &str) -> Self {
        KeyPath {
            components: s
                .split('/')
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Append a field segment. A segment containing `/` appends several
    /// components.
    #[must_use]
    pub fn child(&self, segment: &str) -> KeyPath {
        self.join(&KeyPath::parse(segment))
    }

    /// Append a sequence index, zero-padded to `width` digits.
    #[must_use]
    pub fn index(&self, index: usize, width: usize) -> KeyPath {
        let mut components = self.components.clone();
        components.push(format!("{:0width$}", index, width = width));
        KeyPath { components }
    }

    /// Join this path with another.
    #[must_use]
    pub fn join(&self, other: &KeyPath) -> KeyPath {
        let mut components = self.components.clone();
        components.extend(other.components.iter().cloned());
        KeyPath { components }
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn first(&self) -> Option<&str> {
        self.components.first().map(String::as_str)
    }

    /// Check if this path has the given prefix.
    pub fn has_prefix(&self, prefix: &KeyPath) -> bool {
        prefix.components.len() <= self.components.len()
            && prefix.components == self.components[..prefix.components.len()]
    }

    /// Strip a prefix from this path.
    ///
    /// Returns `None` if the prefix doesn't match.
    #[must_use]
    pub fn strip_prefix(&self, prefix: &KeyPath) -> Option<KeyPath> {
        if self.has_prefix(prefix) {
            Some(KeyPath {
                components: self.components[prefix.components.len()..].to_vec(),
            })
        } else {
            None
        }
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.components.join("/"))
    }
}

/// The configured key prefix, normalized to end in exactly one `/`.
///
/// An empty prefix stays empty, so keys are then rendered without a leading
/// slash.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Prefix(String);

impl Prefix {
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim_end_matches('/');
        if trimmed.is_empty() {
            Prefix(String::new())
        } else {
            Prefix(format!("{}/", trimmed))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The full store key for a path.
    pub fn key(&self, path: &KeyPath) -> String {
        format!("{}{}", self.0, path)
    }

    /// The path a full store key refers to, if the key lives under this
    /// prefix.
    pub fn relative(&self, key: &str) -> Option<KeyPath> {
        key.strip_prefix(self.0.as_str()).map(KeyPath::parse)
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
