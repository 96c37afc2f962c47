//! Semantic type kinds the engine dispatches on.

use std::fmt;

/// The category a value is classified into.
///
/// Bit widths are collapsed: every signed integer is `Int`, every unsigned
/// integer is `Uint`, `f32` and `f64` are both `Float`. Classification comes
/// from the type alone, never from the current contents, so an empty `Vec`
/// is still a `Sequence`.
///
/// The last four kinds exist so that types the structural walkers cannot
/// decompose still classify; they are only usable through opaque fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    String,
    Bool,
    Int,
    Uint,
    Float,
    Struct,
    Sequence,
    Map,
    Option,
    Unit,
    Document,
}

impl Kind {
    /// Leaf kinds stored as a single textual value.
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            Kind::String | Kind::Bool | Kind::Int | Kind::Uint | Kind::Float
        )
    }

    /// Kinds the structural walkers know how to traverse.
    pub fn is_structural(self) -> bool {
        self.is_scalar() || matches!(self, Kind::Struct | Kind::Sequence)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Float => "float",
            Kind::Struct => "struct",
            Kind::Sequence => "sequence",
            Kind::Map => "map",
            Kind::Option => "option",
            Kind::Unit => "unit",
            Kind::Document => "document",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
