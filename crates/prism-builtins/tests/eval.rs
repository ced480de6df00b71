//! End-to-end scenarios through the full builtin package set.

use prism_builtins::r64;
use prism_codegen::CodegenContext;
use prism_engine::{
    eval_host, eval_shader, Dispatcher, EvalError, Expr, HostOperand, Overload, Registry,
    ShaderOperand,
};
use prism_foundation::{Num, Type, TypeName, Value};

fn registry() -> Registry {
    let mut reg = Registry::new();
    prism_builtins::install(&mut reg).unwrap();
    reg.tidy();
    reg
}

fn r32(n: Num) -> Expr<HostOperand> {
    Expr::leaf(HostOperand::scalar(TypeName::R32, Value::Number(n)))
}

#[test]
fn exact_arithmetic_through_a_tree() {
    let reg = registry();
    // (1/2 + 1/3) * 6 == 5, exactly.
    let tree = Expr::call(
        "mul",
        vec![
            Expr::call("add", vec![r32(Num::ratio(1, 2)), r32(Num::ratio(1, 3))]),
            r32(Num::int(6)),
        ],
    );
    let out = eval_host(&reg, &tree).unwrap();
    assert_eq!(out.as_scalar().unwrap(), &Value::Number(Num::int(5)));
}

#[test]
fn variadic_add_folds_left() {
    let reg = registry();
    let folded = eval_host(
        &reg,
        &Expr::call(
            "add",
            vec![
                r32(Num::int(1)),
                r32(Num::int(2)),
                r32(Num::int(3)),
                r32(Num::int(4)),
            ],
        ),
    )
    .unwrap();

    let nested = eval_host(
        &reg,
        &Expr::call(
            "add",
            vec![
                Expr::call(
                    "add",
                    vec![
                        Expr::call("add", vec![r32(Num::int(1)), r32(Num::int(2))]),
                        r32(Num::int(3)),
                    ],
                ),
                r32(Num::int(4)),
            ],
        ),
    )
    .unwrap();

    assert_eq!(folded, nested);
    assert_eq!(folded.as_scalar().unwrap(), &Value::Number(Num::int(10)));
}

#[test]
fn mixed_precision_widens_and_emulates() {
    let reg = registry();
    // r32 + r64 lands on the r64 overload; the r32 side widens.
    let tree = Expr::call(
        "add",
        vec![
            Expr::leaf(ShaderOperand::scalar(TypeName::R32, "u_small")),
            Expr::leaf(ShaderOperand::scalar(TypeName::R64, "u_wide")),
        ],
    );
    let mut ctx = CodegenContext::new();
    let out = eval_shader(&reg, &mut ctx, &tree).unwrap();

    assert_eq!(out.ty, Type::scalar(TypeName::R64));
    assert_eq!(out.expr.as_str(), "add64(split64(u_small), u_wide)");
    assert_eq!(ctx.helper_source().matches("fn add64").count(), 1);
}

#[test]
fn emulation_helpers_emit_once_across_calls() {
    let reg = registry();
    let wide = |name: &str| Expr::leaf(ShaderOperand::scalar(TypeName::R64, name));
    let tree = Expr::call(
        "add",
        vec![
            Expr::call("mul", vec![wide("u_a"), wide("u_b")]),
            Expr::call("add", vec![wide("u_c"), wide("u_d")]),
        ],
    );
    let mut ctx = CodegenContext::new();
    let out = eval_shader(&reg, &mut ctx, &tree).unwrap();

    assert_eq!(
        out.expr.as_str(),
        "add64(mul64(u_a, u_b), add64(u_c, u_d))"
    );
    // Three helper-using call sites, one helper block.
    assert_eq!(ctx.helper_source().matches("fn add64").count(), 1);
    assert_eq!(ctx.helper_source().matches("fn mul64").count(), 1);
}

#[test]
fn list_broadcast_host() {
    let reg = registry();
    let xs = Expr::leaf(HostOperand::list(
        TypeName::R32,
        vec![
            Value::Number(Num::int(1)),
            Value::Number(Num::int(2)),
            Value::Number(Num::int(3)),
        ],
    ));
    let ys = Expr::leaf(HostOperand::list(
        TypeName::R32,
        (0..5).map(|i| Value::Number(Num::int(10 * i))).collect(),
    ));
    let out = eval_host(&reg, &Expr::call("add", vec![xs, ys])).unwrap();
    assert_eq!(out.ty, Type::list(TypeName::R32, 3));

    let scalar = Expr::leaf(HostOperand::scalar(TypeName::R32, Value::Number(Num::int(1))));
    let list = Expr::leaf(HostOperand::list(
        TypeName::R32,
        (0..4).map(|i| Value::Number(Num::int(i))).collect(),
    ));
    let out = eval_host(&reg, &Expr::call("add", vec![scalar, list])).unwrap();
    assert_eq!(out.ty, Type::list(TypeName::R32, 4));
}

#[test]
fn list_broadcast_shader_emits_loop() {
    let reg = registry();
    let tree = Expr::call(
        "sin",
        vec![Expr::leaf(ShaderOperand::list(
            TypeName::R32,
            8,
            "u_samples",
        ))],
    );
    let mut ctx = CodegenContext::new();
    let out = eval_shader(&reg, &mut ctx, &tree).unwrap();

    assert_eq!(out.ty, Type::list(TypeName::R32, 8));
    let stmts = ctx.statements();
    assert_eq!(stmts.matches("for (").count(), 1);
    assert!(stmts.contains("< 8u"));
    assert!(stmts.contains("sin(u_samples["));
}

#[test]
fn hsv_builds_a_color_on_both_targets() {
    let reg = registry();
    let host = eval_host(
        &reg,
        &Expr::call(
            "hsv",
            vec![r32(Num::int(0)), r32(Num::int(1)), r32(Num::int(1))],
        ),
    )
    .unwrap();
    assert_eq!(host.ty, Type::scalar(TypeName::Color));

    let mut ctx = CodegenContext::new();
    let shader = eval_shader(
        &reg,
        &mut ctx,
        &Expr::call(
            "hsv",
            vec![
                Expr::leaf(ShaderOperand::scalar(TypeName::R32, "u_h")),
                Expr::leaf(ShaderOperand::scalar(TypeName::R32, "u_s")),
                Expr::leaf(ShaderOperand::scalar(TypeName::R32, "u_v")),
            ],
        ),
    )
    .unwrap();
    assert_eq!(shader.expr.as_str(), "hsv2rgba(u_h, u_s, u_v)");
    assert!(ctx.helper_source().contains("fn hsv2rgba"));
}

/// The precision-ordering scenario: a registrant that declares the wide
/// overload first routes *all* real addition through emulation, and exact
/// values survive because host widening is the identity.
#[test]
fn wide_first_ordering_routes_through_emulation() {
    let mut reg = Registry::new();
    prism_builtins::types::install(&mut reg).unwrap();

    let mut add = Dispatcher::variadic("wadd");
    let host = |_: &Registry, vals: &[Value]| {
        let a = vals[0].as_number().ok_or(EvalError::MalformedOperand)?;
        let b = vals[1].as_number().ok_or(EvalError::MalformedOperand)?;
        Ok(Value::Number(a + b))
    };
    add.add(Overload::new(
        vec![TypeName::R64, TypeName::R64],
        TypeName::R64,
        host,
        |_reg, ctx, exprs| {
            r64::declare(ctx);
            Ok(prism_codegen::ShaderExpr::new(format!(
                "add64({}, {})",
                exprs[0], exprs[1]
            )))
        },
    ));
    add.add(Overload::new(
        vec![TypeName::R32, TypeName::R32],
        TypeName::R32,
        host,
        |_reg, _ctx, exprs| {
            Ok(prism_codegen::ShaderExpr::new(format!(
                "({} + {})",
                exprs[0], exprs[1]
            )))
        },
    ));
    reg.register_function("wadd", add).unwrap();
    reg.tidy();

    // Two exact r32 values: the r64 overload wins, widening is lossless,
    // and the sum stays exact.
    let out = eval_host(
        &reg,
        &Expr::call("wadd", vec![r32(Num::int(2)), r32(Num::ratio(3, 1))]),
    )
    .unwrap();
    assert_eq!(out.ty, Type::scalar(TypeName::R64));
    assert_eq!(out.as_scalar().unwrap(), &Value::Number(Num::int(5)));

    // The shader path goes through the emulated helper, not native floats.
    let mut ctx = CodegenContext::new();
    let shader = eval_shader(
        &reg,
        &mut ctx,
        &Expr::call(
            "wadd",
            vec![
                Expr::leaf(ShaderOperand::scalar(TypeName::R32, "u_a")),
                Expr::leaf(ShaderOperand::scalar(TypeName::R64, "u_b")),
            ],
        ),
    )
    .unwrap();
    assert_eq!(shader.expr.as_str(), "add64(split64(u_a), u_b)");
    assert_eq!(ctx.helper_source().matches("fn add64").count(), 1);
}

/// What a caller does with the result: splice helpers and statements into
/// its own program skeleton.
#[test]
fn assembled_program_contains_spliced_output() {
    let reg = registry();
    let tree = Expr::call(
        "add",
        vec![
            Expr::leaf(ShaderOperand::list(TypeName::R64, 2, "u_xs")),
            Expr::leaf(ShaderOperand::scalar(TypeName::R32, "u_y")),
        ],
    );
    let mut ctx = CodegenContext::new();
    let out = eval_shader(&reg, &mut ctx, &tree).unwrap();

    let program = format!(
        "{}fn main() {{\n{}return {};\n}}\n",
        ctx.helper_source(),
        ctx.statements(),
        out.expr
    );
    // Helpers precede the body; the loop and its destination are inside.
    let helper_pos = program.find("fn add64").unwrap();
    let main_pos = program.find("fn main").unwrap();
    assert!(helper_pos < main_pos);
    assert!(program.contains("for ("));
}
