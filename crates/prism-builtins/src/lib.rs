//! Prism Builtins
//!
//! The standard registrant packages: type metadata and coercions, numeric
//! arithmetic, trigonometry, color construction, and the WGSL double-float
//! helpers backing emulated 64-bit shader math.
//!
//! Packages install sequentially, dependencies first. The full catalogue of
//! functions in a deployment is much larger; these packages are the
//! representative set that exercises every engine feature, and external
//! packages extend the same registry the same way.

pub mod color;
pub mod math;
pub mod r64;
pub mod types;

use prism_engine::{Registry, RegistryError};

/// Install every builtin package into `registry`, in dependency order.
///
/// The caller finishes the load phase with [`Registry::tidy`].
pub fn install(registry: &mut Registry) -> Result<(), RegistryError> {
    types::install(registry)?;
    math::install(registry)?;
    color::install(registry)?;
    Ok(())
}
