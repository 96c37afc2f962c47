//! Struct field enumeration.
//!
//! A [`Structure`] lists the fields the engine may touch. Each field carries
//! its declared name, its tag metadata and a reference to the value. Fields a
//! structure does not list are invisible to both walkers, which is how
//! computed or transient fields coexist with persisted ones.
//!
//! Structures are normally declared with the [`structure!`](crate::structure)
//! macro rather than by hand.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{Reflect, Tags};

/// A struct whose fields can be enumerated.
pub trait Structure: Send + Sync {
    /// Fields in declaration order, for encoding.
    fn fields(&self) -> Vec<Field<'_>>;

    /// Fields in declaration order, for decoding. Each field is borrowed
    /// exclusively, so fields can be filled concurrently.
    fn fields_mut(&mut self) -> Vec<FieldMut<'_>>;
}

/// A value that can also be written as one JSON document.
pub trait Document: Reflect {
    fn to_document(&self) -> Result<Vec<u8>, serde_json::Error>;

    fn as_reflect(&self) -> &dyn Reflect;
}

impl<T: Reflect + Serialize> Document for T {
    fn to_document(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    fn as_reflect(&self) -> &dyn Reflect {
        self
    }
}

/// A value that can be replaced wholesale from one JSON document.
pub trait DocumentMut: Reflect {
    fn load_document(&mut self, bytes: &[u8]) -> Result<(), serde_json::Error>;

    fn as_reflect_mut(&mut self) -> &mut dyn Reflect;
}

impl<T: Reflect + DeserializeOwned> DocumentMut for T {
    fn load_document(&mut self, bytes: &[u8]) -> Result<(), serde_json::Error> {
        *self = serde_json::from_slice(bytes)?;
        Ok(())
    }

    fn as_reflect_mut(&mut self) -> &mut dyn Reflect {
        self
    }
}

/// A borrowed field, for encoding.
pub struct Field<'a> {
    name: &'static str,
    tags: Tags,
    value: &'a dyn Document,
}

impl<'a> Field<'a> {
    pub fn new<T: Document>(name: &'static str, tags: Tags, value: &'a T) -> Self {
        Self { name, tags, value }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn tags(&self) -> Tags {
        self.tags
    }

    pub fn value(&self) -> &'a dyn Document {
        self.value
    }
}

/// An exclusively borrowed field, for decoding.
pub struct FieldMut<'a> {
    name: &'static str,
    tags: Tags,
    value: &'a mut dyn DocumentMut,
}

impl<'a> FieldMut<'a> {
    pub fn new<T: DocumentMut>(name: &'static str, tags: Tags, value: &'a mut T) -> Self {
        Self { name, tags, value }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn tags(&self) -> Tags {
        self.tags
    }

    pub fn into_value(self) -> &'a mut dyn DocumentMut {
        self.value
    }
}

/// Implement [`Reflect`] and [`Structure`] for a struct.
///
/// List the persisted fields, each optionally followed by its tags in
/// braces. Unlisted fields are skipped in both directions. Every listed
/// field type must implement [`Reflect`], `Serialize` and
/// `DeserializeOwned`.
///
/// ```rust
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
/// struct Service {
///     name: String,
///     port: u16,
///     labels: std::collections::BTreeMap<String, String>,
///     #[serde(skip)]
///     cached_url: String,
/// }
///
/// kvstructure::structure! {
///     Service {
///         name,
///         port { kvstructure = "listen_port" },
///         labels { json = "labels" },
///     }
/// }
/// ```
#[macro_export]
macro_rules! structure {
    ($(
        $ty:ty {
            $( $field:ident $({ $( $key:ident = $val:literal ),* $(,)? })? ),* $(,)?
        }
    )*) => {
        $(
            impl $crate::Reflect for $ty {
                fn kind(&self) -> $crate::Kind {
                    $crate::Kind::Struct
                }

                fn node(&self) -> $crate::Node<'_> {
                    $crate::Node::Struct(self)
                }

                fn node_mut(&mut self) -> $crate::NodeMut<'_> {
                    $crate::NodeMut::Struct(self)
                }
            }

            impl $crate::Structure for $ty {
                fn fields(&self) -> ::std::vec::Vec<$crate::Field<'_>> {
                    ::std::vec![$(
                        $crate::Field::new(
                            stringify!($field),
                            $crate::Tags::new(&[$($( (stringify!($key), $val) ),*)?]),
                            &self.$field,
                        )
                    ),*]
                }

                fn fields_mut(&mut self) -> ::std::vec::Vec<$crate::FieldMut<'_>> {
                    ::std::vec![$(
                        $crate::FieldMut::new(
                            stringify!($field),
                            $crate::Tags::new(&[$($( (stringify!($key), $val) ),*)?]),
                            &mut self.$field,
                        )
                    ),*]
                }
            }
        )*
    };
}
