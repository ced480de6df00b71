//! List-shape unification for broadcast calls.

use prism_foundation::Arity;

/// Unify argument shapes into the result shape.
///
/// Scalar when no argument is a list; otherwise a list whose length is the
/// **minimum** among the list-shaped arguments. Mismatched lengths truncate
/// silently to the shortest — zip-shortest, never an error. Whether mismatch
/// ought to be a hard error instead is an open question; until that is
/// decided the truncating behavior is the contract and is tested as such.
pub fn unify_arity<I>(arities: I) -> Arity
where
    I: IntoIterator<Item = Arity>,
{
    let mut unified = Arity::Scalar;
    for arity in arities {
        if let Arity::List(n) = arity {
            unified = match unified {
                Arity::Scalar => Arity::List(n),
                Arity::List(m) => Arity::List(m.min(n)),
            };
        }
    }
    unified
}
