//! Prism Engine
//!
//! The dispatch core of the Prism expression engine: one declared function
//! evaluates under two targets — direct host computation over
//! [`Value`](prism_foundation::Value)s, and WGSL source emission through a
//! [`CodegenContext`](prism_codegen::CodegenContext).
//!
//! # Architecture
//!
//! - [`Registry`] — explicit, pass-by-reference table of types, coercions,
//!   and named function dispatchers. Mutable during the sequential load
//!   phase, frozen by [`Registry::tidy`] before any evaluation.
//! - [`Dispatcher`] — an ordered table of [`Overload`]s for one function.
//!   Resolution is first-match-wins in declaration order.
//! - [`broadcast`] — scalar/list shape unification; list calls apply the
//!   scalar overload element-wise.
//! - [`fold`] — left-folds N-ary calls through a binary dispatcher.
//! - [`eval`] — post-order evaluation of typed expression trees for either
//!   target.
//!
//! Execution is single-threaded and synchronous throughout; a failure
//! anywhere aborts the whole enclosing evaluation.

pub mod broadcast;
pub mod dispatch;
pub mod error;
pub mod eval;
pub mod fold;
pub mod operand;
pub mod registry;

pub use dispatch::{Dispatcher, HostFn, Overload, ShaderFn};
pub use error::{EvalError, RegistryError};
pub use eval::{eval_host, eval_shader, Expr, HostExpr, ShaderTree};
pub use operand::{HostData, HostOperand, ShaderOperand, Target};
pub use registry::{Coercion, Registry, TypeInfo};
