//! Prism Foundation
//!
//! Core data model for the Prism expression engine. Provides the closed set
//! of type names, scalar/list arities, exact-or-approximate scalar numbers,
//! and the composite runtime values built from them.
//!
//! Everything here is plain data: behavior (coercion, dispatch, code
//! generation) lives in the engine crates that consume these types.

pub mod scalar;
pub mod types;
pub mod value;

pub use scalar::{Num, SAFE_BOUND};
pub use types::{Arity, Type, TypeName};
pub use value::Value;
