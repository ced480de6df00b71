//! Prism Codegen
//!
//! Per-compilation state for the shader target. One [`CodegenContext`] is
//! created per compiled expression and discarded after use; it owns fresh
//! symbol generation, a deduplicated pool of helper-function source, an
//! append-only statement buffer, and sub-expression caching into named
//! temporaries.
//!
//! The context knows nothing about shader program structure, uniforms, or
//! the raster pipeline. The caller splices [`CodegenContext::helper_source`]
//! and [`CodegenContext::statements`] verbatim into its final program.

pub mod context;
pub mod trivial;

pub use context::{CodegenContext, Fill, HelperId, ShaderExpr};
pub use trivial::is_trivial;
