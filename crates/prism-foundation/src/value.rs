//! Host-target runtime values.

use serde::{Deserialize, Serialize};

use crate::scalar::Num;

/// Concrete data for one element under host evaluation.
///
/// Composite variants are built from [`Num`] components so exactness
/// survives component-wise arithmetic the same way it does for plain
/// numbers. On the shader target values are source-text expressions instead;
/// see the codegen crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Boolean.
    Bool(bool),
    /// Real number (`r32` or `r64`).
    Number(Num),
    /// Complex number as `[re, im]`.
    Complex([Num; 2]),
    /// 2D point as `[x, y]`.
    Point([Num; 2]),
    /// Color as `[r, g, b, a]`.
    Color([Num; 4]),
    /// Quaternion as `[x, y, z, w]`.
    Quat([Num; 4]),
}

impl Value {
    /// The numeric payload, if this is a number.
    pub fn as_number(&self) -> Option<Num> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The boolean payload, if this is a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Look up a component by name.
    ///
    /// Numbers answer every name with themselves; composites answer their
    /// registered component names (`x`/`y` for points, `re`/`im` for complex
    /// numbers, `r`/`g`/`b`/`a` for colors, `x`/`y`/`z`/`w` for quaternions).
    pub fn component(&self, name: &str) -> Option<Num> {
        match (self, name) {
            (Value::Number(n), _) => Some(*n),
            (Value::Complex(v), "re") => Some(v[0]),
            (Value::Complex(v), "im") => Some(v[1]),
            (Value::Point(v), "x") => Some(v[0]),
            (Value::Point(v), "y") => Some(v[1]),
            (Value::Color(v), "r") => Some(v[0]),
            (Value::Color(v), "g") => Some(v[1]),
            (Value::Color(v), "b") => Some(v[2]),
            (Value::Color(v), "a") => Some(v[3]),
            (Value::Quat(v), "x") => Some(v[0]),
            (Value::Quat(v), "y") => Some(v[1]),
            (Value::Quat(v), "z") => Some(v[2]),
            (Value::Quat(v), "w") => Some(v[3]),
            _ => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Number(Num::int(0))
    }
}
