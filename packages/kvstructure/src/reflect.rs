//! Runtime view of values: kinds, scalar leaves and sequences.
//!
//! [`Reflect`] is the one trait the walkers need. It classifies a value into
//! a [`Kind`] and hands out a [`Node`] (for encoding) or a [`NodeMut`] (for
//! decoding) that exposes the value in the shape the walkers dispatch on.
//!
//! Implementations are provided for strings, booleans, every integer width,
//! floats, `Vec<T>` and `Box<T>`. Structs implement it through the
//! [`structure!`](crate::structure) macro. Maps, options, unit and
//! `serde_json::Value` classify but are rejected by the walkers; they can
//! still be stored through opaque fields.

use std::collections::{BTreeMap, HashMap};

use crate::{Kind, Structure};

/// A value the encoder and decoder can walk.
pub trait Reflect: Send + Sync {
    /// Classify the value. Depends only on the type.
    fn kind(&self) -> Kind;

    /// Read-only view for encoding.
    fn node(&self) -> Node<'_>;

    /// Mutable view for decoding.
    fn node_mut(&mut self) -> NodeMut<'_>;
}

/// Read-only view of a value, by kind.
pub enum Node<'a> {
    Scalar(&'a dyn Scalar),
    Struct(&'a dyn Structure),
    Sequence(&'a dyn Sequence),
    Unsupported(Kind),
}

/// Mutable view of a value, by kind.
pub enum NodeMut<'a> {
    Scalar(&'a mut dyn ScalarMut),
    Struct(&'a mut dyn Structure),
    Sequence(&'a mut dyn SequenceMut),
    Unsupported(Kind),
}

/// A leaf stored as one textual value.
pub trait Scalar: Send + Sync {
    fn kind(&self) -> Kind;

    /// Canonical text: `true`/`false`, base-10 integers, shortest
    /// round-tripping floats, raw strings.
    fn to_text(&self) -> String;
}

/// A leaf that can be overwritten from its textual form.
pub trait ScalarMut: Scalar {
    /// Parse `text` with this value's exact type and store the result.
    fn parse_text(&mut self, text: &str) -> Result<(), String>;
}

/// An ordered collection walked element by element.
pub trait Sequence: Send + Sync {
    fn len(&self) -> usize;

    fn element(&self, index: usize) -> Option<&dyn Reflect>;
}

/// A sequence the decoder can rebuild.
pub trait SequenceMut: Sequence {
    /// Replace the contents with `len` freshly allocated elements.
    fn reset(&mut self, len: usize);

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;
}

// Scalars

macro_rules! reflect_scalar {
    ($kind:ident => $($ty:ty),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn kind(&self) -> Kind {
                    Kind::$kind
                }

                fn node(&self) -> Node<'_> {
                    Node::Scalar(self)
                }

                fn node_mut(&mut self) -> NodeMut<'_> {
                    NodeMut::Scalar(self)
                }
            }

            impl Scalar for $ty {
                fn kind(&self) -> Kind {
                    Kind::$kind
                }

                fn to_text(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

macro_rules! parse_integer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ScalarMut for $ty {
                fn parse_text(&mut self, text: &str) -> Result<(), String> {
                    *self = text.parse::<$ty>().map_err(|e| e.to_string())?;
                    Ok(())
                }
            }
        )*
    };
}

reflect_scalar!(Int => i8, i16, i32, i64, i128, isize);
reflect_scalar!(Uint => u8, u16, u32, u64, u128, usize);
reflect_scalar!(Float => f32, f64);
reflect_scalar!(Bool => bool);
reflect_scalar!(String => String);

parse_integer!(i8, i16, i32, i64, i128, isize);
parse_integer!(u8, u16, u32, u64, u128, usize);

// Stored floats are read at 64 bits and narrowed to the destination.

impl ScalarMut for f32 {
    fn parse_text(&mut self, text: &str) -> Result<(), String> {
        *self = text.parse::<f64>().map_err(|e| e.to_string())? as f32;
        Ok(())
    }
}

impl ScalarMut for f64 {
    fn parse_text(&mut self, text: &str) -> Result<(), String> {
        *self = text.parse::<f64>().map_err(|e| e.to_string())?;
        Ok(())
    }
}

impl ScalarMut for bool {
    fn parse_text(&mut self, text: &str) -> Result<(), String> {
        *self = parse_bool(text)?;
        Ok(())
    }
}

impl ScalarMut for String {
    fn parse_text(&mut self, text: &str) -> Result<(), String> {
        text.clone_into(self);
        Ok(())
    }
}

/// Accepts the spellings common KV tooling writes, not just `true`/`false`.
fn parse_bool(text: &str) -> Result<bool, String> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        other => Err(format!("invalid boolean '{}'", other)),
    }
}

// Sequences

impl<T: Reflect + Default> Reflect for Vec<T> {
    fn kind(&self) -> Kind {
        Kind::Sequence
    }

    fn node(&self) -> Node<'_> {
        Node::Sequence(self)
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        NodeMut::Sequence(self)
    }
}

impl<T: Reflect + Default> Sequence for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn element(&self, index: usize) -> Option<&dyn Reflect> {
        self.get(index).map(|e| e as &dyn Reflect)
    }
}

impl<T: Reflect + Default> SequenceMut for Vec<T> {
    fn reset(&mut self, len: usize) {
        self.clear();
        self.resize_with(len, T::default);
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.get_mut(index).map(|e| e as &mut dyn Reflect)
    }
}

// Pointers are transparent

impl<T: Reflect> Reflect for Box<T> {
    fn kind(&self) -> Kind {
        self.as_ref().kind()
    }

    fn node(&self) -> Node<'_> {
        self.as_ref().node()
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        self.as_mut().node_mut()
    }
}

// Kinds only storable as opaque documents

macro_rules! reflect_unsupported {
    ($kind:ident => $(impl<$($gen:ident),*> for $ty:ty;)*) => {
        $(
            impl<$($gen: Send + Sync),*> Reflect for $ty {
                fn kind(&self) -> Kind {
                    Kind::$kind
                }

                fn node(&self) -> Node<'_> {
                    Node::Unsupported(Kind::$kind)
                }

                fn node_mut(&mut self) -> NodeMut<'_> {
                    NodeMut::Unsupported(Kind::$kind)
                }
            }
        )*
    };
}

reflect_unsupported!(Map =>
    impl<K, V, S> for HashMap<K, V, S>;
    impl<K, V> for BTreeMap<K, V>;
);
reflect_unsupported!(Option =>
    impl<T> for Option<T>;
);
reflect_unsupported!(Unit =>
    impl<> for ();
);
reflect_unsupported!(Document =>
    impl<> for serde_json::Value;
);
