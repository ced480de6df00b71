//! Variadic calls over binary dispatchers.
//!
//! An N-ary call against a binary overload table is evaluated as a strict
//! left fold: `f(a, b, c, d) == f(f(f(a, b), c), d)`. The fold works at
//! resolution time — each step resolves `(interim return type, next argument
//! type)` against the same table and wraps the pair into a synthetic
//! [`Overload`] whose implementations chain the previous step with the new
//! one. The dispatcher then broadcasts and coerces the synthetic overload
//! exactly like a declared one.

use std::sync::Arc;

use tracing::trace;

use prism_foundation::TypeName;

use crate::dispatch::{render_types, Dispatcher, HostFn, Overload, ShaderFn};
use crate::error::EvalError;
use crate::registry::Registry;

/// Resolve an N-ary (`N > 2`) call by left-folding binary resolutions.
///
/// The synthesized overload is rebuilt on each call; nothing is cached.
pub(crate) fn fold_resolve(
    dispatcher: &Dispatcher,
    registry: &Registry,
    arg_types: &[TypeName],
) -> Result<Overload, EvalError> {
    debug_assert!(arg_types.len() > 2);
    trace!(
        function = dispatcher.name(),
        supplied = %render_types(arg_types),
        "folding variadic call"
    );

    let mut folded = dispatcher.resolve(registry, &arg_types[..2])?.clone();
    for &next in &arg_types[2..] {
        let step = dispatcher.resolve(registry, &[folded.ret, next])?.clone();
        folded = chain(folded, step);
    }
    Ok(folded)
}

/// Wrap `prev` (covering the leading arguments) and `step` (consuming the
/// interim result plus one more argument) into a single overload.
fn chain(prev: Overload, step: Overload) -> Overload {
    let lead = prev.params.len();
    let params: Vec<_> = prev
        .params
        .iter()
        .copied()
        .chain([step.params[1]])
        .collect();
    let interim_ty = prev.ret;
    let step_param = step.params[0];

    let host: HostFn = {
        let (prev_host, step_host) = (prev.host.clone(), step.host.clone());
        Arc::new(move |registry, values| {
            let interim = prev_host(registry, &values[..lead])?;
            let interim = registry.coerce_host(&interim, interim_ty, step_param)?;
            step_host(registry, &[interim, values[lead].clone()])
        })
    };

    let shader: ShaderFn = {
        let (prev_shader, step_shader) = (prev.shader.clone(), step.shader.clone());
        Arc::new(move |registry, ctx, exprs| {
            let interim = prev_shader(registry, ctx, &exprs[..lead])?;
            let interim = registry.coerce_shader(ctx, &interim, interim_ty, step_param)?;
            step_shader(registry, ctx, &[interim, exprs[lead].clone()])
        })
    };

    Overload {
        params,
        ret: step.ret,
        host,
        shader,
    }
}
