//! Type names and arities.
//!
//! A [`Type`] pairs a [`TypeName`] with an [`Arity`]. The name selects the
//! registered representation (host value shape, shader type, coercions); the
//! arity records whether the value is a single element or a list that the
//! dispatcher broadcasts over.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of value types the engine knows about.
///
/// Packages register metadata (shader representation, coercions, garbage
/// values) for these names at load time; the set of names itself is fixed so
/// dispatch and coercion lookups stay exhaustive matches rather than
/// stringly-typed table probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeName {
    /// Boolean.
    Bool,
    /// 32-bit real number (native shader float).
    R32,
    /// 64-bit real number (emulated hi/lo pair on the shader target).
    R64,
    /// 32-bit complex number.
    C32,
    /// 2D point with 32-bit components.
    Point32,
    /// RGBA color, four components.
    Color,
    /// Quaternion, four components.
    Quat,
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeName::Bool => "bool",
            TypeName::R32 => "r32",
            TypeName::R64 => "r64",
            TypeName::C32 => "c32",
            TypeName::Point32 => "point32",
            TypeName::Color => "color",
            TypeName::Quat => "quat",
        };
        write!(f, "{name}")
    }
}

/// Scalar-or-list shape of a value.
///
/// `List(0)` is legal and denotes an empty broadcast result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arity {
    /// A single element.
    Scalar,
    /// A list of `N` elements.
    List(usize),
}

impl Arity {
    /// List length, or `None` for scalars.
    pub fn len(&self) -> Option<usize> {
        match self {
            Arity::Scalar => None,
            Arity::List(n) => Some(*n),
        }
    }

    /// Whether this arity is list-shaped.
    pub fn is_list(&self) -> bool {
        matches!(self, Arity::List(_))
    }
}

/// A type name together with its arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Type {
    /// The element type.
    pub name: TypeName,
    /// Scalar or list shape.
    pub arity: Arity,
}

impl Type {
    /// A scalar-shaped type.
    pub fn scalar(name: TypeName) -> Self {
        Type {
            name,
            arity: Arity::Scalar,
        }
    }

    /// A list-shaped type of the given length.
    pub fn list(name: TypeName, len: usize) -> Self {
        Type {
            name,
            arity: Arity::List(len),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.arity {
            Arity::Scalar => write!(f, "{}", self.name),
            Arity::List(n) => write!(f, "{}[{}]", self.name, n),
        }
    }
}
