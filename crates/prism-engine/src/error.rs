//! Error types for registration and evaluation.

use thiserror::Error;

use prism_foundation::TypeName;

use crate::operand::Target;

/// Errors during the load phase.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The registry was frozen by `tidy()` before this registration.
    #[error("registry is frozen; cannot register {0}")]
    Frozen(String),
}

/// Errors during evaluation under either target.
#[derive(Error, Debug)]
pub enum EvalError {
    /// No overload's parameter types are reachable by coercion from the
    /// supplied argument types. Surfaced to the user as an expression error.
    #[error("no overload of `{function}` accepts ({supplied})")]
    NoMatch {
        /// The dispatcher's display name.
        function: String,
        /// Human-readable rendering of the supplied type list.
        supplied: String,
    },

    /// The expression tree names a function the registry does not know.
    #[error("unknown function `{0}`")]
    UnknownFunction(String),

    /// A type name with no registered metadata was used in evaluation.
    #[error("type {0} is not registered")]
    UnknownType(TypeName),

    /// A registrant implements only one target and this call used the other.
    /// Enforced by the failing implementation itself, never by the
    /// dispatcher — the dispatcher has no notion of per-target validity.
    #[error("`{function}` is not available under {target} evaluation")]
    UnsupportedTarget {
        /// The registrant's display name.
        function: String,
        /// The target that was requested.
        target: Target,
    },

    /// Coercion was attempted for a pair with no registered edge. Resolution
    /// checks `can_coerce` first, so reaching this is a programming error in
    /// the caller, not a user-facing condition.
    #[error("no coercion registered from {from} to {to}")]
    CoercionMissing {
        /// Source type.
        from: TypeName,
        /// Destination type.
        to: TypeName,
    },

    /// An operand's declared arity disagrees with its data shape.
    #[error("operand shape does not match its declared arity")]
    MalformedOperand,
}
