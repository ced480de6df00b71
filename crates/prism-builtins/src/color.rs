//! Color construction package.

use prism_codegen::{HelperId, ShaderExpr};
use prism_engine::{Dispatcher, EvalError, Overload, Registry, RegistryError};
use prism_foundation::{Num, TypeName, Value};

const HSV_HELPERS: HelperId = HelperId("color-hsv");

const HSV_WGSL: &str = r#"fn hsv2rgba(h: f32, s: f32, v: f32) -> vec4<f32> {
    let p = abs(fract(vec3<f32>(h) + vec3<f32>(1.0, 2.0 / 3.0, 1.0 / 3.0)) * 6.0 - vec3<f32>(3.0));
    let rgb = v * mix(vec3<f32>(1.0), clamp(p - vec3<f32>(1.0), vec3<f32>(0.0), vec3<f32>(1.0)), s);
    return vec4<f32>(rgb, 1.0);
}
"#;

/// Register `hsv(h, s, v) -> color`, hue in turns.
pub fn install(registry: &mut Registry) -> Result<(), RegistryError> {
    let mut hsv = Dispatcher::new("hsv");
    hsv.add(Overload::new(
        vec![TypeName::R32, TypeName::R32, TypeName::R32],
        TypeName::Color,
        |_reg, vals: &[Value]| {
            let mut parts = [0.0; 3];
            for (slot, v) in parts.iter_mut().zip(vals) {
                *slot = v.as_number().ok_or(EvalError::MalformedOperand)?.to_f64();
            }
            let [h, s, v] = parts;
            let (r, g, b) = hsv_to_rgb(h, s, v);
            Ok(Value::Color([
                Num::approx(r),
                Num::approx(g),
                Num::approx(b),
                Num::approx(1.0),
            ]))
        },
        |_reg, ctx, exprs: &[ShaderExpr]| {
            ctx.declare_helper_once(HSV_HELPERS, HSV_WGSL);
            Ok(ShaderExpr::new(format!(
                "hsv2rgba({}, {}, {})",
                exprs[0], exprs[1], exprs[2]
            )))
        },
    ));
    registry.register_function("hsv", hsv)
}

fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    let h = h.rem_euclid(1.0) * 6.0;
    let sector = h.floor();
    let f = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);
    match sector as u32 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_engine::HostOperand;

    fn close(a: (f64, f64, f64), b: (f64, f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9 && (a.2 - b.2).abs() < 1e-9
    }

    #[test]
    fn primary_hues() {
        assert!(close(hsv_to_rgb(0.0, 1.0, 1.0), (1.0, 0.0, 0.0)));
        assert!(close(hsv_to_rgb(1.0 / 3.0, 1.0, 1.0), (0.0, 1.0, 0.0)));
        assert!(close(hsv_to_rgb(2.0 / 3.0, 1.0, 1.0), (0.0, 0.0, 1.0)));
    }

    #[test]
    fn zero_saturation_is_gray() {
        let (r, g, b) = hsv_to_rgb(0.42, 0.0, 0.5);
        assert_eq!((r, g, b), (0.5, 0.5, 0.5));
    }

    #[test]
    fn dispatches_to_color() {
        let mut reg = Registry::new();
        crate::types::install(&mut reg).unwrap();
        install(&mut reg).unwrap();
        reg.tidy();

        let arg = |v: f64| HostOperand::scalar(TypeName::R32, Value::Number(Num::approx(v)));
        let out = reg
            .function("hsv")
            .unwrap()
            .eval_host(&reg, &[arg(0.0), arg(1.0), arg(1.0)])
            .unwrap();
        assert_eq!(
            out.as_scalar().unwrap(),
            &Value::Color([
                Num::approx(1.0),
                Num::approx(0.0),
                Num::approx(0.0),
                Num::approx(1.0),
            ])
        );
    }
}
