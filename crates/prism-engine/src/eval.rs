//! Typed-expression evaluation for both targets.
//!
//! The editor hands the engine a typed, syntax-error-free expression tree of
//! function applications over leaf operands. Evaluation is a plain
//! post-order walk through the registry's function table; failure anywhere
//! aborts the whole tree with no partial result.

use prism_codegen::CodegenContext;

use crate::error::EvalError;
use crate::operand::{HostOperand, ShaderOperand};
use crate::registry::Registry;

/// A typed expression tree, generic over the leaf operand representation.
#[derive(Debug, Clone)]
pub enum Expr<L> {
    /// An already-evaluated operand.
    Leaf(L),
    /// A function application.
    Call {
        /// Registered function name.
        function: String,
        /// Argument subtrees.
        args: Vec<Expr<L>>,
    },
}

impl<L> Expr<L> {
    /// Leaf constructor.
    pub fn leaf(operand: L) -> Self {
        Expr::Leaf(operand)
    }

    /// Call constructor.
    pub fn call(function: impl Into<String>, args: Vec<Expr<L>>) -> Self {
        Expr::Call {
            function: function.into(),
            args,
        }
    }
}

/// Host-target expression tree.
pub type HostExpr = Expr<HostOperand>;

/// Shader-target expression tree.
pub type ShaderTree = Expr<ShaderOperand>;

/// Evaluate a tree under the host target.
pub fn eval_host(registry: &Registry, expr: &HostExpr) -> Result<HostOperand, EvalError> {
    match expr {
        Expr::Leaf(operand) => Ok(operand.clone()),
        Expr::Call { function, args } => {
            let operands = args
                .iter()
                .map(|arg| eval_host(registry, arg))
                .collect::<Result<Vec<_>, _>>()?;
            registry.function(function)?.eval_host(registry, &operands)
        }
    }
}

/// Evaluate a tree under the shader target, threading one context.
///
/// The caller splices the context's accumulated helper pool and statement
/// buffer into its final shader program; the engine does not know where.
pub fn eval_shader(
    registry: &Registry,
    ctx: &mut CodegenContext,
    expr: &ShaderTree,
) -> Result<ShaderOperand, EvalError> {
    match expr {
        Expr::Leaf(operand) => Ok(operand.clone()),
        Expr::Call { function, args } => {
            let mut operands = Vec::with_capacity(args.len());
            for arg in args {
                operands.push(eval_shader(registry, ctx, arg)?);
            }
            registry
                .function(function)?
                .eval_shader(registry, ctx, &operands)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{Dispatcher, Overload};
    use crate::registry::TypeInfo;
    use prism_codegen::ShaderExpr;
    use prism_foundation::{Num, TypeName, Value};

    fn registry() -> Registry {
        let mut reg = Registry::new();
        reg.register_type(
            TypeName::R32,
            TypeInfo::new("f32", Value::Number(Num::approx(f64::NAN))),
        )
        .unwrap();
        let mut add = Dispatcher::variadic("add");
        add.add(Overload::new(
            vec![TypeName::R32, TypeName::R32],
            TypeName::R32,
            |_reg, vals| {
                let a = vals[0].as_number().ok_or(EvalError::MalformedOperand)?;
                let b = vals[1].as_number().ok_or(EvalError::MalformedOperand)?;
                Ok(Value::Number(a + b))
            },
            |_reg, _ctx, exprs| Ok(ShaderExpr::new(format!("({} + {})", exprs[0], exprs[1]))),
        ));
        reg.register_function("add", add).unwrap();
        reg.tidy();
        reg
    }

    fn leaf(n: i64) -> HostExpr {
        Expr::leaf(HostOperand::scalar(
            TypeName::R32,
            Value::Number(Num::int(n)),
        ))
    }

    #[test]
    fn nested_host_tree() {
        let reg = registry();
        let tree = Expr::call("add", vec![leaf(1), Expr::call("add", vec![leaf(2), leaf(3)])]);
        let out = eval_host(&reg, &tree).unwrap();
        assert_eq!(out.as_scalar().unwrap(), &Value::Number(Num::int(6)));
    }

    #[test]
    fn shader_tree_threads_one_context() {
        let reg = registry();
        let tree: ShaderTree = Expr::call(
            "add",
            vec![
                Expr::leaf(ShaderOperand::scalar(TypeName::R32, "u_a")),
                Expr::call(
                    "add",
                    vec![
                        Expr::leaf(ShaderOperand::scalar(TypeName::R32, "u_b")),
                        Expr::leaf(ShaderOperand::scalar(TypeName::R32, "u_c")),
                    ],
                ),
            ],
        );
        let mut ctx = CodegenContext::new();
        let out = eval_shader(&reg, &mut ctx, &tree).unwrap();
        assert_eq!(out.expr.as_str(), "(u_a + (u_b + u_c))");
    }

    #[test]
    fn unknown_function_aborts() {
        let reg = registry();
        let tree = Expr::call("nope", vec![leaf(1)]);
        assert!(matches!(
            eval_host(&reg, &tree),
            Err(EvalError::UnknownFunction(name)) if name == "nope"
        ));
    }
}
