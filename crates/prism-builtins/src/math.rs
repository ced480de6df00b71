//! Numeric arithmetic and trigonometry packages.
//!
//! Overload order follows the registry-wide convention: exact/narrow
//! representations first (`r32` before `r64`), composites after. Resolution
//! is first-match-wins, so a mixed `r32`/`r64` call falls through the `r32`
//! overload (no `r64 → r32` edge exists) and lands on the `r64` one via the
//! widening coercion.

use prism_codegen::{CodegenContext, HelperId, ShaderExpr};
use prism_engine::{Dispatcher, EvalError, Overload, Registry, RegistryError};
use prism_foundation::{Num, TypeName, Value};

use crate::r64;

/// Register `add`, `sub`, `mul`, `div`, `sin`, and `cos`.
pub fn install(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register_function("add", addition())?;
    registry.register_function("sub", subtraction())?;
    registry.register_function("mul", multiplication())?;
    registry.register_function("div", division())?;
    registry.register_function("sin", unary_trig("sin", f64::sin))?;
    registry.register_function("cos", unary_trig("cos", f64::cos))?;
    Ok(())
}

// === Host helpers ===

/// Apply `f` component-wise across any pair of same-shaped values.
fn elementwise(
    f: fn(Num, Num) -> Num,
) -> impl Fn(&Registry, &[Value]) -> Result<Value, EvalError> {
    move |_reg, vals| match (&vals[0], &vals[1]) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(f(*a, *b))),
        (Value::Complex(a), Value::Complex(b)) => {
            Ok(Value::Complex([f(a[0], b[0]), f(a[1], b[1])]))
        }
        (Value::Point(a), Value::Point(b)) => Ok(Value::Point([f(a[0], b[0]), f(a[1], b[1])])),
        (Value::Color(a), Value::Color(b)) => Ok(Value::Color([
            f(a[0], b[0]),
            f(a[1], b[1]),
            f(a[2], b[2]),
            f(a[3], b[3]),
        ])),
        (Value::Quat(a), Value::Quat(b)) => Ok(Value::Quat([
            f(a[0], b[0]),
            f(a[1], b[1]),
            f(a[2], b[2]),
            f(a[3], b[3]),
        ])),
        _ => Err(EvalError::MalformedOperand),
    }
}

fn complex(v: &Value) -> Result<[Num; 2], EvalError> {
    match v {
        Value::Complex(c) => Ok(*c),
        _ => Err(EvalError::MalformedOperand),
    }
}

fn quat(v: &Value) -> Result<[Num; 4], EvalError> {
    match v {
        Value::Quat(q) => Ok(*q),
        _ => Err(EvalError::MalformedOperand),
    }
}

// === Shader helpers ===

/// Plain WGSL infix operator; vectors apply it component-wise already.
fn infix(
    op: &'static str,
) -> impl Fn(&Registry, &mut CodegenContext, &[ShaderExpr]) -> Result<ShaderExpr, EvalError> {
    move |_reg, _ctx, exprs| {
        Ok(ShaderExpr::new(format!(
            "({} {op} {})",
            exprs[0], exprs[1]
        )))
    }
}

/// Call into the double-float helper block.
fn r64_call(
    f: &'static str,
) -> impl Fn(&Registry, &mut CodegenContext, &[ShaderExpr]) -> Result<ShaderExpr, EvalError> {
    move |_reg, ctx, exprs| {
        r64::declare(ctx);
        Ok(ShaderExpr::new(format!("{f}({}, {})", exprs[0], exprs[1])))
    }
}

const COMPLEX_HELPERS: HelperId = HelperId("c32-arithmetic");

const COMPLEX_WGSL: &str = r#"fn cmul(a: vec2<f32>, b: vec2<f32>) -> vec2<f32> {
    return vec2<f32>(a.x * b.x - a.y * b.y, a.x * b.y + a.y * b.x);
}

fn cdiv(a: vec2<f32>, b: vec2<f32>) -> vec2<f32> {
    let d = b.x * b.x + b.y * b.y;
    return vec2<f32>((a.x * b.x + a.y * b.y) / d, (a.y * b.x - a.x * b.y) / d);
}
"#;

const QUAT_HELPERS: HelperId = HelperId("quat-arithmetic");

const QUAT_WGSL: &str = r#"fn qmul(a: vec4<f32>, b: vec4<f32>) -> vec4<f32> {
    return vec4<f32>(
        a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
        a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
        a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
        a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z
    );
}
"#;

fn complex_call(
    f: &'static str,
) -> impl Fn(&Registry, &mut CodegenContext, &[ShaderExpr]) -> Result<ShaderExpr, EvalError> {
    move |_reg, ctx, exprs| {
        ctx.declare_helper_once(COMPLEX_HELPERS, COMPLEX_WGSL);
        Ok(ShaderExpr::new(format!("{f}({}, {})", exprs[0], exprs[1])))
    }
}

// === Dispatchers ===

fn pair(name: TypeName) -> Vec<TypeName> {
    vec![name, name]
}

fn addition() -> Dispatcher {
    let mut d = Dispatcher::variadic("add");
    d.add(Overload::new(
        pair(TypeName::R32),
        TypeName::R32,
        elementwise(|a, b| a + b),
        infix("+"),
    ));
    d.add(Overload::new(
        pair(TypeName::R64),
        TypeName::R64,
        elementwise(|a, b| a + b),
        r64_call("add64"),
    ));
    for name in [
        TypeName::C32,
        TypeName::Point32,
        TypeName::Color,
        TypeName::Quat,
    ] {
        d.add(Overload::new(
            pair(name),
            name,
            elementwise(|a, b| a + b),
            infix("+"),
        ));
    }
    d
}

fn subtraction() -> Dispatcher {
    let mut d = Dispatcher::variadic("sub");
    d.add(Overload::new(
        pair(TypeName::R32),
        TypeName::R32,
        elementwise(|a, b| a - b),
        infix("-"),
    ));
    d.add(Overload::new(
        pair(TypeName::R64),
        TypeName::R64,
        elementwise(|a, b| a - b),
        |_reg, ctx, exprs: &[ShaderExpr]| {
            r64::declare(ctx);
            Ok(ShaderExpr::new(format!(
                "add64({}, -({}))",
                exprs[0], exprs[1]
            )))
        },
    ));
    for name in [
        TypeName::C32,
        TypeName::Point32,
        TypeName::Color,
        TypeName::Quat,
    ] {
        d.add(Overload::new(
            pair(name),
            name,
            elementwise(|a, b| a - b),
            infix("-"),
        ));
    }
    d
}

fn multiplication() -> Dispatcher {
    let mut d = Dispatcher::variadic("mul");
    d.add(Overload::new(
        pair(TypeName::R32),
        TypeName::R32,
        elementwise(|a, b| a * b),
        infix("*"),
    ));
    d.add(Overload::new(
        pair(TypeName::R64),
        TypeName::R64,
        elementwise(|a, b| a * b),
        r64_call("mul64"),
    ));
    d.add(Overload::new(
        pair(TypeName::C32),
        TypeName::C32,
        |_reg, vals: &[Value]| {
            let (a, b) = (complex(&vals[0])?, complex(&vals[1])?);
            Ok(Value::Complex([
                a[0] * b[0] - a[1] * b[1],
                a[0] * b[1] + a[1] * b[0],
            ]))
        },
        complex_call("cmul"),
    ));
    d.add(Overload::new(
        pair(TypeName::Quat),
        TypeName::Quat,
        |_reg, vals: &[Value]| {
            let (a, b) = (quat(&vals[0])?, quat(&vals[1])?);
            // Hamilton product, components [x, y, z, w].
            Ok(Value::Quat([
                a[3] * b[0] + a[0] * b[3] + a[1] * b[2] - a[2] * b[1],
                a[3] * b[1] - a[0] * b[2] + a[1] * b[3] + a[2] * b[0],
                a[3] * b[2] + a[0] * b[1] - a[1] * b[0] + a[2] * b[3],
                a[3] * b[3] - a[0] * b[0] - a[1] * b[1] - a[2] * b[2],
            ]))
        },
        |_reg, ctx, exprs: &[ShaderExpr]| {
            ctx.declare_helper_once(QUAT_HELPERS, QUAT_WGSL);
            Ok(ShaderExpr::new(format!("qmul({}, {})", exprs[0], exprs[1])))
        },
    ));
    d
}

fn division() -> Dispatcher {
    let mut d = Dispatcher::variadic("div");
    d.add(Overload::new(
        pair(TypeName::R32),
        TypeName::R32,
        elementwise(|a, b| a / b),
        infix("/"),
    ));
    d.add(Overload::new(
        pair(TypeName::R64),
        TypeName::R64,
        elementwise(|a, b| a / b),
        r64_call("div64"),
    ));
    d.add(Overload::new(
        pair(TypeName::C32),
        TypeName::C32,
        |_reg, vals: &[Value]| {
            let (a, b) = (complex(&vals[0])?, complex(&vals[1])?);
            let denom = b[0] * b[0] + b[1] * b[1];
            Ok(Value::Complex([
                (a[0] * b[0] + a[1] * b[1]) / denom,
                (a[1] * b[0] - a[0] * b[1]) / denom,
            ]))
        },
        complex_call("cdiv"),
    ));
    d
}

/// Single-argument trig over `r32`. Results are always approximate — there
/// is no exact representation to preserve through transcendentals.
fn unary_trig(name: &'static str, f: fn(f64) -> f64) -> Dispatcher {
    let mut d = Dispatcher::new(name);
    d.add(Overload::new(
        vec![TypeName::R32],
        TypeName::R32,
        move |_reg, vals: &[Value]| {
            let x = vals[0].as_number().ok_or(EvalError::MalformedOperand)?;
            Ok(Value::Number(Num::approx(f(x.to_f64()))))
        },
        move |_reg, _ctx, exprs: &[ShaderExpr]| {
            Ok(ShaderExpr::new(format!("{name}({})", exprs[0])))
        },
    ));
    d
}
