//! Overload tables and dual-target dispatch.
//!
//! A [`Dispatcher`] is the ordered overload table for one named function.
//! Resolution scans in declaration order and returns the **first** overload
//! whose parameter types are reachable by coercion from the argument types.
//! The order is a semantic contract, not an accident: registrants put exact
//! representations before approximate ones and narrower precision before
//! wider, and resolution must honor that rather than hunt for a "most
//! specific" match.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use prism_codegen::{CodegenContext, ShaderExpr};
use prism_foundation::{Arity, TypeName, Value};

use crate::broadcast::unify_arity;
use crate::error::EvalError;
use crate::fold;
use crate::operand::{HostOperand, ShaderOperand, Target};
use crate::registry::Registry;

/// Scalar host implementation of one overload.
pub type HostFn = Arc<dyn Fn(&Registry, &[Value]) -> Result<Value, EvalError>>;

/// Scalar shader implementation of one overload.
pub type ShaderFn =
    Arc<dyn Fn(&Registry, &mut CodegenContext, &[ShaderExpr]) -> Result<ShaderExpr, EvalError>>;

/// One concrete implementation for a specific parameter-type tuple.
///
/// Implementations are scalar: the dispatcher supplies list broadcasting
/// around them.
#[derive(Clone)]
pub struct Overload {
    /// Parameter types, in order.
    pub params: Vec<TypeName>,
    /// Return type.
    pub ret: TypeName,
    /// Host implementation.
    pub host: HostFn,
    /// Shader implementation.
    pub shader: ShaderFn,
}

impl Overload {
    /// An overload implemented for both targets.
    pub fn new(
        params: Vec<TypeName>,
        ret: TypeName,
        host: impl Fn(&Registry, &[Value]) -> Result<Value, EvalError> + 'static,
        shader: impl Fn(&Registry, &mut CodegenContext, &[ShaderExpr]) -> Result<ShaderExpr, EvalError>
            + 'static,
    ) -> Self {
        Overload {
            params,
            ret,
            host: Arc::new(host),
            shader: Arc::new(shader),
        }
    }

    /// An overload meaningful only under host evaluation; its shader
    /// implementation fails with [`EvalError::UnsupportedTarget`]. This is
    /// the only mechanism for target restrictions — the dispatcher itself
    /// never knows which targets an overload supports.
    pub fn host_only(
        label: impl Into<String>,
        params: Vec<TypeName>,
        ret: TypeName,
        host: impl Fn(&Registry, &[Value]) -> Result<Value, EvalError> + 'static,
    ) -> Self {
        let label = label.into();
        Overload {
            params,
            ret,
            host: Arc::new(host),
            shader: Arc::new(move |_, _, _| {
                Err(EvalError::UnsupportedTarget {
                    function: label.clone(),
                    target: Target::Shader,
                })
            }),
        }
    }

    /// An overload meaningful only under shader evaluation.
    pub fn shader_only(
        label: impl Into<String>,
        params: Vec<TypeName>,
        ret: TypeName,
        shader: impl Fn(&Registry, &mut CodegenContext, &[ShaderExpr]) -> Result<ShaderExpr, EvalError>
            + 'static,
    ) -> Self {
        let label = label.into();
        Overload {
            params,
            ret,
            host: Arc::new(move |_, _| {
                Err(EvalError::UnsupportedTarget {
                    function: label.clone(),
                    target: Target::Host,
                })
            }),
            shader: Arc::new(shader),
        }
    }
}

impl fmt::Debug for Overload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overload")
            .field("params", &self.params)
            .field("ret", &self.ret)
            .finish_non_exhaustive()
    }
}

/// Ordered, append-only overload table for one named function.
pub struct Dispatcher {
    name: String,
    overloads: Vec<Overload>,
    /// When set, calls with more than two arguments left-fold through the
    /// binary overloads instead of resolving directly.
    fold_binary: bool,
}

impl Dispatcher {
    /// A dispatcher resolving calls at their literal arity.
    pub fn new(name: impl Into<String>) -> Self {
        Dispatcher {
            name: name.into(),
            overloads: Vec::new(),
            fold_binary: false,
        }
    }

    /// A dispatcher over binary overloads that accepts N-ary calls by
    /// left-folding.
    pub fn variadic(name: impl Into<String>) -> Self {
        Dispatcher {
            name: name.into(),
            overloads: Vec::new(),
            fold_binary: true,
        }
    }

    /// Display name, used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of registered overloads.
    pub fn len(&self) -> usize {
        self.overloads.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.overloads.is_empty()
    }

    /// Append an overload. Declaration order is resolution order.
    pub fn add(&mut self, overload: Overload) -> &mut Self {
        self.overloads.push(overload);
        self
    }

    /// Append all of `other`'s overloads after this table's own, preserving
    /// both declaration orders. Used when a second package registers the
    /// same function name.
    pub(crate) fn absorb(&mut self, other: Dispatcher) {
        self.overloads.extend(other.overloads);
        self.fold_binary |= other.fold_binary;
    }

    /// Find the first overload matching the argument types.
    ///
    /// A match requires equal length and `can_coerce` at every position.
    pub fn resolve(
        &self,
        registry: &Registry,
        arg_types: &[TypeName],
    ) -> Result<&Overload, EvalError> {
        for (index, overload) in self.overloads.iter().enumerate() {
            if overload.params.len() == arg_types.len()
                && overload
                    .params
                    .iter()
                    .zip(arg_types)
                    .all(|(&p, &a)| registry.can_coerce(a, p))
            {
                trace!(function = %self.name, index, "overload resolved");
                return Ok(overload);
            }
        }
        Err(EvalError::NoMatch {
            function: self.name.clone(),
            supplied: render_types(arg_types),
        })
    }

    /// Resolve, synthesizing a folded overload for variadic calls.
    ///
    /// Synthetic overloads are rebuilt on every call; caching them per
    /// argument-type tuple would be an optimization, not a correctness
    /// requirement.
    fn resolved(&self, registry: &Registry, arg_types: &[TypeName]) -> Result<Overload, EvalError> {
        if self.fold_binary && arg_types.len() > 2 {
            fold::fold_resolve(self, registry, arg_types)
        } else {
            self.resolve(registry, arg_types).cloned()
        }
    }

    /// Evaluate under the host target: resolve, broadcast, coerce, invoke.
    pub fn eval_host(
        &self,
        registry: &Registry,
        args: &[HostOperand],
    ) -> Result<HostOperand, EvalError> {
        let arg_types: Vec<TypeName> = args.iter().map(|a| a.ty.name).collect();
        let overload = self.resolved(registry, &arg_types)?;

        match unify_arity(args.iter().map(|a| a.ty.arity)) {
            Arity::Scalar => {
                let values = self.coerced_row(registry, &overload, args, 0)?;
                let result = (overload.host)(registry, &values)?;
                Ok(HostOperand::scalar(overload.ret, result))
            }
            Arity::List(len) => {
                let mut results = Vec::with_capacity(len);
                for index in 0..len {
                    let values = self.coerced_row(registry, &overload, args, index)?;
                    results.push((overload.host)(registry, &values)?);
                }
                Ok(HostOperand::list(overload.ret, results))
            }
        }
    }

    /// One scalar argument tuple for broadcast index `index`, coerced to the
    /// overload's parameter types.
    fn coerced_row(
        &self,
        registry: &Registry,
        overload: &Overload,
        args: &[HostOperand],
        index: usize,
    ) -> Result<Vec<Value>, EvalError> {
        let mut values = Vec::with_capacity(args.len());
        for (arg, &param) in args.iter().zip(&overload.params) {
            let value = arg.element(index).ok_or(EvalError::MalformedOperand)?;
            values.push(registry.coerce_host(value, arg.ty.name, param)?);
        }
        Ok(values)
    }

    /// Evaluate under the shader target.
    ///
    /// Scalar calls coerce each argument expression and invoke the overload
    /// directly. List calls are not unrolled: every list argument is
    /// materialized into a cached array temporary, a destination array is
    /// declared, and one generated `for` loop applies the scalar overload
    /// per index. This is the only place the engine synthesizes raw shader
    /// control flow.
    pub fn eval_shader(
        &self,
        registry: &Registry,
        ctx: &mut CodegenContext,
        args: &[ShaderOperand],
    ) -> Result<ShaderOperand, EvalError> {
        let arg_types: Vec<TypeName> = args.iter().map(|a| a.ty.name).collect();
        let overload = self.resolved(registry, &arg_types)?;

        match unify_arity(args.iter().map(|a| a.ty.arity)) {
            Arity::Scalar => {
                let mut exprs = Vec::with_capacity(args.len());
                for (arg, &param) in args.iter().zip(&overload.params) {
                    exprs.push(registry.coerce_shader(ctx, &arg.expr, arg.ty.name, param)?);
                }
                let result = (overload.shader)(registry, ctx, &exprs)?;
                Ok(ShaderOperand::scalar(overload.ret, result))
            }
            Arity::List(len) => self.eval_shader_loop(registry, ctx, args, &overload, len),
        }
    }

    fn eval_shader_loop(
        &self,
        registry: &Registry,
        ctx: &mut CodegenContext,
        args: &[ShaderOperand],
        overload: &Overload,
        len: usize,
    ) -> Result<ShaderOperand, EvalError> {
        // Materialize every argument once, outside the loop. List arguments
        // become array temporaries subscripted per index; scalar arguments
        // are coerced up front and reused at every index.
        enum Slot {
            PerIndex(ShaderExpr),
            Fixed(ShaderExpr),
        }
        let mut slots = Vec::with_capacity(args.len());
        for (arg, &param) in args.iter().zip(&overload.params) {
            match arg.ty.arity {
                Arity::List(n) => {
                    // Each list keeps its own extent; truncation to the
                    // shortest happens at the loop bound, not here.
                    let elem_ty = registry.shader_type(arg.ty.name)?.to_string();
                    slots.push(Slot::PerIndex(ctx.cache(&arg.expr, &elem_ty, Some(n))));
                }
                Arity::Scalar => {
                    let coerced = registry.coerce_shader(ctx, &arg.expr, arg.ty.name, param)?;
                    let param_ty = registry.shader_type(param)?.to_string();
                    slots.push(Slot::Fixed(ctx.cache(&coerced, &param_ty, None)));
                }
            }
        }

        let ret_ty = registry.shader_type(overload.ret)?.to_string();
        let dest = ctx.fresh_name();
        ctx.push(format!("var {dest}: array<{ret_ty}, {}>;", len.max(1)));
        let idx = ctx.fresh_name();
        ctx.push(format!(
            "for (var {idx}: u32 = 0u; {idx} < {len}u; {idx} = {idx} + 1u) {{"
        ));

        let mut exprs = Vec::with_capacity(args.len());
        for ((slot, arg), &param) in slots.iter().zip(args).zip(&overload.params) {
            let expr = match slot {
                Slot::PerIndex(array) => {
                    let element = ShaderExpr::new(format!("{array}[{idx}]"));
                    registry.coerce_shader(ctx, &element, arg.ty.name, param)?
                }
                Slot::Fixed(expr) => expr.clone(),
            };
            exprs.push(expr);
        }
        let result = (overload.shader)(registry, ctx, &exprs)?;
        ctx.push(format!("{dest}[{idx}] = {result};"));
        ctx.push("}");

        Ok(ShaderOperand::list(overload.ret, len, dest))
    }
}

/// Human-readable rendering of a type list for diagnostics.
pub(crate) fn render_types(types: &[TypeName]) -> String {
    types
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
