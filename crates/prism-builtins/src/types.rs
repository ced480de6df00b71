//! The standard type package: metadata and coercions for every type name.

use prism_codegen::ShaderExpr;
use prism_engine::{Coercion, Registry, RegistryError, TypeInfo};
use prism_foundation::{Num, TypeName, Value};

use crate::r64;

fn nan() -> Num {
    Num::approx(f64::NAN)
}

/// Register all type metadata and the standard coercion edges.
pub fn install(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register_type(TypeName::Bool, TypeInfo::new("bool", Value::Bool(false)))?;
    registry.register_type(TypeName::R32, TypeInfo::new("f32", Value::Number(nan())))?;
    registry.register_type(
        TypeName::R64,
        TypeInfo::new("vec2<f32>", Value::Number(nan())),
    )?;
    registry.register_type(
        TypeName::C32,
        TypeInfo::new("vec2<f32>", Value::Complex([nan(), nan()]))
            .with_components(vec!["re", "im"]),
    )?;
    registry.register_type(
        TypeName::Point32,
        TypeInfo::new("vec2<f32>", Value::Point([nan(), nan()]))
            .with_components(vec!["x", "y"]),
    )?;
    registry.register_type(
        TypeName::Color,
        TypeInfo::new("vec4<f32>", Value::Color([nan(), nan(), nan(), nan()]))
            .with_components(vec!["r", "g", "b", "a"]),
    )?;
    registry.register_type(
        TypeName::Quat,
        TypeInfo::new("vec4<f32>", Value::Quat([nan(), nan(), nan(), nan()]))
            .with_components(vec!["x", "y", "z", "w"]),
    )?;

    // r32 widens to r64. Host values already carry full precision, so the
    // conversion is the identity there; the shader side splits into the
    // hi/lo pair.
    registry.register_coercion(
        TypeName::R32,
        TypeName::R64,
        Coercion::new(
            |v| v.clone(),
            |ctx, e| {
                r64::declare(ctx);
                ShaderExpr::new(format!("split64({e})"))
            },
        ),
    )?;

    // Reals embed into the complex plane.
    registry.register_coercion(
        TypeName::R32,
        TypeName::C32,
        Coercion::new(
            |v| match v {
                Value::Number(n) => Value::Complex([*n, Num::int(0)]),
                other => other.clone(),
            },
            |_ctx, e| ShaderExpr::new(format!("vec2<f32>({e}, 0.0)")),
        ),
    )?;

    // Points reinterpret as complex numbers; the shader representation is
    // already identical.
    registry.register_coercion(
        TypeName::Point32,
        TypeName::C32,
        Coercion::new(
            |v| match v {
                Value::Point(p) => Value::Complex(*p),
                other => other.clone(),
            },
            |_ctx, e| e.clone(),
        ),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_types_registered() {
        let mut reg = Registry::new();
        install(&mut reg).unwrap();
        reg.tidy();
        for name in [
            TypeName::Bool,
            TypeName::R32,
            TypeName::R64,
            TypeName::C32,
            TypeName::Point32,
            TypeName::Color,
            TypeName::Quat,
        ] {
            assert!(reg.type_info(name).is_some(), "{name} missing");
        }
        assert_eq!(reg.shader_type(TypeName::Color).unwrap(), "vec4<f32>");
    }

    #[test]
    fn standard_edges() {
        let mut reg = Registry::new();
        install(&mut reg).unwrap();
        reg.tidy();
        assert!(reg.can_coerce(TypeName::R32, TypeName::R64));
        assert!(reg.can_coerce(TypeName::R32, TypeName::C32));
        assert!(reg.can_coerce(TypeName::Point32, TypeName::C32));
        assert!(!reg.can_coerce(TypeName::R64, TypeName::R32));
        assert!(!reg.can_coerce(TypeName::Bool, TypeName::R32));
    }

    #[test]
    fn point_reads_as_complex() {
        let mut reg = Registry::new();
        install(&mut reg).unwrap();
        reg.tidy();
        let p = Value::Point([Num::int(1), Num::int(2)]);
        let c = reg
            .coerce_host(&p, TypeName::Point32, TypeName::C32)
            .unwrap();
        assert_eq!(c, Value::Complex([Num::int(1), Num::int(2)]));
    }
}
