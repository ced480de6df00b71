//! Typed operands for both evaluation targets.

use std::fmt;

use prism_codegen::ShaderExpr;
use prism_foundation::{Type, TypeName, Value};

/// Which of the two evaluation targets a call runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Direct computation over concrete values.
    Host,
    /// WGSL source emission.
    Shader,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Host => write!(f, "host"),
            Target::Shader => write!(f, "shader"),
        }
    }
}

/// Payload of a host operand: one element, or a broadcastable list.
#[derive(Debug, Clone, PartialEq)]
pub enum HostData {
    /// A single value.
    Scalar(Value),
    /// A list of values, element-wise broadcast by the dispatcher.
    List(Vec<Value>),
}

/// A typed argument or result under host evaluation.
///
/// Invariant: `ty.arity` matches the data shape (`Scalar` with one value,
/// `List(n)` with `n` values). The constructors uphold this.
#[derive(Debug, Clone, PartialEq)]
pub struct HostOperand {
    /// Element type and shape.
    pub ty: Type,
    /// The data.
    pub data: HostData,
}

impl HostOperand {
    /// A scalar operand.
    pub fn scalar(name: TypeName, value: Value) -> Self {
        HostOperand {
            ty: Type::scalar(name),
            data: HostData::Scalar(value),
        }
    }

    /// A list operand; the arity records the list length.
    pub fn list(name: TypeName, values: Vec<Value>) -> Self {
        HostOperand {
            ty: Type::list(name, values.len()),
            data: HostData::List(values),
        }
    }

    /// The single value, if scalar-shaped.
    pub fn as_scalar(&self) -> Option<&Value> {
        match &self.data {
            HostData::Scalar(v) => Some(v),
            HostData::List(_) => None,
        }
    }

    /// The element at `index`: the value itself for scalars (reused across
    /// every broadcast index), the `index`-th element for lists.
    pub fn element(&self, index: usize) -> Option<&Value> {
        match &self.data {
            HostData::Scalar(v) => Some(v),
            HostData::List(vs) => vs.get(index),
        }
    }
}

/// A typed argument or result under shader evaluation.
///
/// List-shaped operands carry a single expression of array type; the
/// dispatcher subscripts it inside a generated loop rather than unrolling.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderOperand {
    /// Element type and shape.
    pub ty: Type,
    /// WGSL expression text.
    pub expr: ShaderExpr,
}

impl ShaderOperand {
    /// A scalar operand.
    pub fn scalar(name: TypeName, expr: impl Into<ShaderExpr>) -> Self {
        ShaderOperand {
            ty: Type::scalar(name),
            expr: expr.into(),
        }
    }

    /// A list operand of the given length.
    pub fn list(name: TypeName, len: usize, expr: impl Into<ShaderExpr>) -> Self {
        ShaderOperand {
            ty: Type::list(name, len),
            expr: expr.into(),
        }
    }
}
