//! WGSL double-float helpers for emulated 64-bit reals.
//!
//! Shaders have no native `f64`, so `r64` is represented as a `vec2<f32>`
//! hi/lo pair and arithmetic goes through error-compensated helper
//! functions (two-sum / Dekker splitting). Every shader overload touching
//! `r64` declares the helper block through the shared identity token, so it
//! lands in the program exactly once no matter how many call sites use it.

use prism_codegen::{CodegenContext, HelperId};

/// Identity token for the double-float helper block.
pub const HELPERS: HelperId = HelperId("r64-double-float");

/// Declare the helper block into `ctx` (no-op after the first call).
pub fn declare(ctx: &mut CodegenContext) {
    ctx.declare_helper_once(HELPERS, WGSL);
}

const WGSL: &str = r#"fn two_sum64(a: f32, b: f32) -> vec2<f32> {
    let s = a + b;
    let bb = s - a;
    let err = (a - (s - bb)) + (b - bb);
    return vec2<f32>(s, err);
}

fn split64(x: f32) -> vec2<f32> {
    return vec2<f32>(x, 0.0);
}

fn add64(a: vec2<f32>, b: vec2<f32>) -> vec2<f32> {
    let s = two_sum64(a.x, b.x);
    let e = s.y + a.y + b.y;
    let hi = s.x + e;
    return vec2<f32>(hi, e - (hi - s.x));
}

fn mul64(a: vec2<f32>, b: vec2<f32>) -> vec2<f32> {
    // 2^12 + 1: Dekker splitter for an f32 mantissa.
    let c = 4097.0;
    let ap = a.x * c;
    let ahi = ap - (ap - a.x);
    let alo = a.x - ahi;
    let bp = b.x * c;
    let bhi = bp - (bp - b.x);
    let blo = b.x - bhi;
    let p = a.x * b.x;
    let err = ((ahi * bhi - p) + ahi * blo + alo * bhi) + alo * blo;
    let lo = err + (a.x * b.y + a.y * b.x);
    let hi = p + lo;
    return vec2<f32>(hi, lo - (hi - p));
}

fn div64(a: vec2<f32>, b: vec2<f32>) -> vec2<f32> {
    let q1 = a.x / b.x;
    let r = add64(a, -mul64(vec2<f32>(q1, 0.0), b));
    let q2 = r.x / b.x;
    let hi = q1 + q2;
    return vec2<f32>(hi, q2 - (hi - q1));
}
"#;
