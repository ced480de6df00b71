//! Type, coercion, and function registration.
//!
//! The [`Registry`] is an explicit object passed by reference to every
//! load-time and evaluation-time call; there is no ambient global state.
//! Packages populate it sequentially during the load phase (dependencies
//! before dependents), then [`Registry::tidy`] computes the transitive
//! closure of coercion edges and freezes it. Evaluation only ever sees the
//! frozen registry.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace};

use prism_codegen::{CodegenContext, ShaderExpr};
use prism_foundation::{TypeName, Value};

use crate::dispatch::Dispatcher;
use crate::error::{EvalError, RegistryError};

/// Host-target conversion between two registered types.
pub type HostCoerceFn = Arc<dyn Fn(&Value) -> Value>;

/// Shader-target conversion; may declare helpers through the context.
pub type ShaderCoerceFn = Arc<dyn Fn(&mut CodegenContext, &ShaderExpr) -> ShaderExpr>;

/// A directed coercion edge with one implementation per target.
#[derive(Clone)]
pub struct Coercion {
    /// Host-value conversion.
    pub host: HostCoerceFn,
    /// Shader-expression conversion.
    pub shader: ShaderCoerceFn,
}

impl Coercion {
    /// Build an edge from its two implementations.
    pub fn new(
        host: impl Fn(&Value) -> Value + 'static,
        shader: impl Fn(&mut CodegenContext, &ShaderExpr) -> ShaderExpr + 'static,
    ) -> Self {
        Coercion {
            host: Arc::new(host),
            shader: Arc::new(shader),
        }
    }

    /// Compose `first` then `second`, for closing A→B→C into A→C.
    fn compose(first: &Coercion, second: &Coercion) -> Coercion {
        let (h1, h2) = (first.host.clone(), second.host.clone());
        let (s1, s2) = (first.shader.clone(), second.shader.clone());
        Coercion {
            host: Arc::new(move |v| h2(&h1(v))),
            shader: Arc::new(move |ctx, e| {
                let mid = s1(ctx, e);
                s2(ctx, &mid)
            }),
        }
    }
}

/// Metadata registered for one type name.
pub struct TypeInfo {
    /// The type's WGSL representation (`"f32"`, `"vec4<f32>"`, ...).
    pub shader_type: String,
    /// NaN-analog value for this type.
    pub garbage: Value,
    /// Component names for decomposable types.
    pub components: Option<Vec<&'static str>>,
    /// Coercions out of this type, keyed by destination.
    coercions: IndexMap<TypeName, Coercion>,
}

impl TypeInfo {
    /// Metadata with no components and no coercions.
    pub fn new(shader_type: impl Into<String>, garbage: Value) -> Self {
        TypeInfo {
            shader_type: shader_type.into(),
            garbage,
            components: None,
            coercions: IndexMap::new(),
        }
    }

    /// Attach component names.
    pub fn with_components(mut self, components: Vec<&'static str>) -> Self {
        self.components = Some(components);
        self
    }
}

/// The process-wide registration table: types, coercions, and functions.
///
/// Append-only while loading; immutable after [`Registry::tidy`]. Not a
/// concurrency-safe structure — loading is explicitly sequential and
/// evaluation takes `&self`.
#[derive(Default)]
pub struct Registry {
    types: IndexMap<TypeName, TypeInfo>,
    functions: IndexMap<String, Dispatcher>,
    /// Coercions whose source type had not been registered yet, flushed when
    /// it arrives.
    pending: Vec<(TypeName, TypeName, Coercion)>,
    frozen: bool,
}

impl Registry {
    /// An empty, unfrozen registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `tidy()` has run.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Register metadata for a type name.
    ///
    /// Idempotent per name: a second registration keeps the first and
    /// succeeds. Queued coercions whose source is `name` are flushed into
    /// the new entry.
    pub fn register_type(&mut self, name: TypeName, info: TypeInfo) -> Result<(), RegistryError> {
        if self.frozen {
            return Err(RegistryError::Frozen(format!("type {name}")));
        }
        if !self.types.contains_key(&name) {
            debug!(%name, shader_type = %info.shader_type, "type registered");
            self.types.insert(name, info);
            let mut kept = Vec::new();
            for (from, to, coercion) in self.pending.drain(..) {
                if from == name {
                    trace!(%from, %to, "queued coercion flushed");
                    let entry = self.types.get_mut(&name).map(|i| &mut i.coercions);
                    if let Some(edges) = entry {
                        edges.entry(to).or_insert(coercion);
                    }
                } else {
                    kept.push((from, to, coercion));
                }
            }
            self.pending = kept;
        }
        Ok(())
    }

    /// Register a directed coercion edge.
    ///
    /// If `from` has no entry yet the edge is queued until the type
    /// arrives. A duplicate `(from, to)` pair keeps the first edge.
    pub fn register_coercion(
        &mut self,
        from: TypeName,
        to: TypeName,
        coercion: Coercion,
    ) -> Result<(), RegistryError> {
        if self.frozen {
            return Err(RegistryError::Frozen(format!("coercion {from} -> {to}")));
        }
        match self.types.get_mut(&from) {
            Some(info) => {
                trace!(%from, %to, "coercion registered");
                info.coercions.entry(to).or_insert(coercion);
            }
            None => {
                trace!(%from, %to, "coercion queued for unregistered source");
                self.pending.push((from, to, coercion));
            }
        }
        Ok(())
    }

    /// Register a function dispatcher under `name`.
    ///
    /// A second registration for the same name appends its overloads to the
    /// existing dispatcher rather than replacing it, so load order directly
    /// determines resolution order.
    pub fn register_function(
        &mut self,
        name: impl Into<String>,
        dispatcher: Dispatcher,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.frozen {
            return Err(RegistryError::Frozen(format!("function {name}")));
        }
        debug!(%name, overloads = dispatcher.len(), "function registered");
        match self.functions.get_mut(&name) {
            Some(existing) => existing.absorb(dispatcher),
            None => {
                self.functions.insert(name, dispatcher);
            }
        }
        Ok(())
    }

    /// Look up a function dispatcher.
    pub fn function(&self, name: &str) -> Result<&Dispatcher, EvalError> {
        self.functions
            .get(name)
            .ok_or_else(|| EvalError::UnknownFunction(name.to_string()))
    }

    /// Metadata for a type name, if registered.
    pub fn type_info(&self, name: TypeName) -> Option<&TypeInfo> {
        self.types.get(&name)
    }

    /// The WGSL representation of a type.
    pub fn shader_type(&self, name: TypeName) -> Result<&str, EvalError> {
        self.types
            .get(&name)
            .map(|info| info.shader_type.as_str())
            .ok_or(EvalError::UnknownType(name))
    }

    /// Whether `from` converts to `to` — trivially, directly, or (after
    /// `tidy()`) transitively. Total: never panics, never errors.
    pub fn can_coerce(&self, from: TypeName, to: TypeName) -> bool {
        from == to
            || self
                .types
                .get(&from)
                .is_some_and(|info| info.coercions.contains_key(&to))
    }

    /// Convert a host value. Callers are expected to have checked
    /// [`can_coerce`](Self::can_coerce); a missing edge is an invariant
    /// violation reported as [`EvalError::CoercionMissing`].
    pub fn coerce_host(
        &self,
        value: &Value,
        from: TypeName,
        to: TypeName,
    ) -> Result<Value, EvalError> {
        if from == to {
            return Ok(value.clone());
        }
        let edge = self.edge(from, to)?;
        Ok((edge.host)(value))
    }

    /// Convert a shader expression, threading the codegen context so the
    /// conversion may declare helpers.
    pub fn coerce_shader(
        &self,
        ctx: &mut CodegenContext,
        expr: &ShaderExpr,
        from: TypeName,
        to: TypeName,
    ) -> Result<ShaderExpr, EvalError> {
        if from == to {
            return Ok(expr.clone());
        }
        let edge = self.edge(from, to)?;
        Ok((edge.shader)(ctx, expr))
    }

    fn edge(&self, from: TypeName, to: TypeName) -> Result<&Coercion, EvalError> {
        self.types
            .get(&from)
            .and_then(|info| info.coercions.get(&to))
            .ok_or(EvalError::CoercionMissing { from, to })
    }

    /// Close the coercion graph and freeze the registry.
    ///
    /// Iterates composition to a fixpoint: whenever `A→B` and `B→C` exist
    /// without `A→C`, the composed edge is added. Self-edges are never
    /// added and existing edges are never replaced, so cyclic registrations
    /// terminate and a second `tidy()` changes nothing.
    pub fn tidy(&mut self) {
        if self.frozen {
            return;
        }
        if !self.pending.is_empty() {
            debug!(
                unresolved = self.pending.len(),
                "coercions still queued at freeze; their source types never arrived"
            );
        }
        loop {
            let mut additions: Vec<(TypeName, TypeName, Coercion)> = Vec::new();
            for (&a, info) in &self.types {
                for (&b, ab) in &info.coercions {
                    let Some(b_info) = self.types.get(&b) else {
                        continue;
                    };
                    for (&c, bc) in &b_info.coercions {
                        if c == a || info.coercions.contains_key(&c) {
                            continue;
                        }
                        if additions.iter().any(|(x, y, _)| *x == a && *y == c) {
                            continue;
                        }
                        additions.push((a, c, Coercion::compose(ab, bc)));
                    }
                }
            }
            if additions.is_empty() {
                break;
            }
            for (a, c, edge) in additions {
                trace!(from = %a, to = %c, "transitive coercion added");
                if let Some(info) = self.types.get_mut(&a) {
                    info.coercions.entry(c).or_insert(edge);
                }
            }
        }
        self.frozen = true;
        debug!(
            types = self.types.len(),
            functions = self.functions.len(),
            "registry tidied and frozen"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_foundation::Num;

    fn approx_nan() -> Value {
        Value::Number(Num::approx(f64::NAN))
    }

    fn identity_coercion() -> Coercion {
        Coercion::new(|v| v.clone(), |_ctx, e| e.clone())
    }

    fn registry_with(names: &[TypeName]) -> Registry {
        let mut reg = Registry::new();
        for &name in names {
            reg.register_type(name, TypeInfo::new("f32", approx_nan()))
                .unwrap();
        }
        reg
    }

    #[test]
    fn coerce_to_self_always_works() {
        let reg = registry_with(&[TypeName::R32]);
        assert!(reg.can_coerce(TypeName::R32, TypeName::R32));
        let v = Value::Number(Num::int(1));
        assert_eq!(
            reg.coerce_host(&v, TypeName::R32, TypeName::R32).unwrap(),
            v
        );
    }

    #[test]
    fn transitive_closure_after_tidy() {
        let mut reg = registry_with(&[TypeName::R32, TypeName::R64, TypeName::C32]);
        reg.register_coercion(
            TypeName::R32,
            TypeName::R64,
            Coercion::new(
                |v| v.clone(),
                |_ctx, e| ShaderExpr::new(format!("widen({e})")),
            ),
        )
        .unwrap();
        reg.register_coercion(
            TypeName::R64,
            TypeName::C32,
            Coercion::new(
                |v| match v {
                    Value::Number(n) => Value::Complex([*n, Num::int(0)]),
                    other => other.clone(),
                },
                |_ctx, e| ShaderExpr::new(format!("lift({e})")),
            ),
        )
        .unwrap();

        assert!(!reg.can_coerce(TypeName::R32, TypeName::C32));
        reg.tidy();
        assert!(reg.can_coerce(TypeName::R32, TypeName::C32));

        let got = reg
            .coerce_host(
                &Value::Number(Num::int(5)),
                TypeName::R32,
                TypeName::C32,
            )
            .unwrap();
        assert_eq!(got, Value::Complex([Num::int(5), Num::int(0)]));

        let mut ctx = CodegenContext::new();
        let expr = reg
            .coerce_shader(&mut ctx, &ShaderExpr::new("x"), TypeName::R32, TypeName::C32)
            .unwrap();
        assert_eq!(expr.as_str(), "lift(widen(x))");
    }

    #[test]
    fn tidy_is_idempotent_and_cycle_safe() {
        let mut reg = registry_with(&[TypeName::R32, TypeName::R64]);
        reg.register_coercion(TypeName::R32, TypeName::R64, identity_coercion())
            .unwrap();
        reg.register_coercion(TypeName::R64, TypeName::R32, identity_coercion())
            .unwrap();
        reg.tidy();
        reg.tidy();
        assert!(reg.can_coerce(TypeName::R32, TypeName::R64));
        assert!(reg.can_coerce(TypeName::R64, TypeName::R32));
        // No self-edges were materialized by the cycle.
        assert!(!reg
            .type_info(TypeName::R32)
            .unwrap()
            .coercions
            .contains_key(&TypeName::R32));
    }

    #[test]
    fn pending_coercion_flushes_on_type_arrival() {
        let mut reg = Registry::new();
        reg.register_coercion(TypeName::R32, TypeName::R64, identity_coercion())
            .unwrap();
        assert!(!reg.can_coerce(TypeName::R32, TypeName::R64));

        reg.register_type(TypeName::R32, TypeInfo::new("f32", approx_nan()))
            .unwrap();
        assert!(reg.can_coerce(TypeName::R32, TypeName::R64));
    }

    #[test]
    fn frozen_registry_rejects_registration() {
        let mut reg = registry_with(&[TypeName::R32]);
        reg.tidy();
        let err = reg
            .register_type(TypeName::R64, TypeInfo::new("vec2<f32>", approx_nan()))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Frozen(_)));
        assert!(reg
            .register_coercion(TypeName::R32, TypeName::R64, identity_coercion())
            .is_err());
    }

    #[test]
    fn missing_edge_is_invariant_violation() {
        let reg = registry_with(&[TypeName::R32, TypeName::Bool]);
        let err = reg
            .coerce_host(&Value::Bool(true), TypeName::Bool, TypeName::R32)
            .unwrap_err();
        assert!(matches!(
            err,
            EvalError::CoercionMissing {
                from: TypeName::Bool,
                to: TypeName::R32
            }
        ));
    }
}
