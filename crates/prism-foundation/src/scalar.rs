//! Exact and approximate scalar numbers.
//!
//! Numbers are tagged as either *exact* (a normalized rational) or
//! *approximate* (an `f64`). Exactness is preserved through `+ - * /` as long
//! as every operand and intermediate stays within the safe integer bound
//! [`SAFE_BOUND`]; past that the result silently degrades to an approximate
//! value. This lets chains of arithmetic over integers and simple fractions
//! stay bit-perfect without ever surprising the caller with an overflow
//! error.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Largest magnitude representable exactly: `2^53`.
///
/// Numerators and denominators beyond this lose integer precision in an
/// `f64`, so exact arithmetic falls back to approximate past it.
pub const SAFE_BOUND: i64 = 1 << 53;

/// A scalar number, exact while it can be.
///
/// # Invariants
///
/// For the `Exact` variant: `den > 0`, `gcd(|num|, den) == 1`, and both
/// `|num|` and `den` are at most [`SAFE_BOUND`]. Construction normalizes;
/// arithmetic that would violate the bound returns `Approx` instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Num {
    /// Normalized rational `num / den`.
    Exact {
        /// Numerator, carries the sign.
        num: i64,
        /// Denominator, always positive.
        den: i64,
    },
    /// Floating-point fallback.
    Approx(f64),
}

impl Num {
    /// An exact integer.
    pub fn int(n: i64) -> Self {
        if n.unsigned_abs() > SAFE_BOUND as u64 {
            Num::Approx(n as f64)
        } else {
            Num::Exact { num: n, den: 1 }
        }
    }

    /// An exact ratio, normalized. A zero denominator yields `Approx(NAN)`.
    pub fn ratio(num: i64, den: i64) -> Self {
        if den == 0 {
            return Num::Approx(f64::NAN);
        }
        normalize(num as i128, den as i128)
    }

    /// An approximate value.
    pub fn approx(v: f64) -> Self {
        Num::Approx(v)
    }

    /// Whether this number is still exact.
    pub fn is_exact(&self) -> bool {
        matches!(self, Num::Exact { .. })
    }

    /// Numeric value as an `f64` (lossy for large exact ratios).
    pub fn to_f64(&self) -> f64 {
        match self {
            Num::Exact { num, den } => *num as f64 / *den as f64,
            Num::Approx(v) => *v,
        }
    }
}

/// Reduce `num / den` to lowest terms, falling back to `Approx` when the
/// reduced terms exceed [`SAFE_BOUND`].
fn normalize(num: i128, den: i128) -> Num {
    debug_assert!(den != 0);
    let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
    if num == 0 {
        return Num::Exact { num: 0, den: 1 };
    }
    let g = gcd(num.unsigned_abs(), den.unsigned_abs());
    let num = num / g as i128;
    let den = den / g as i128;
    let bound = SAFE_BOUND as i128;
    if num.abs() <= bound && den <= bound {
        Num::Exact {
            num: num as i64,
            den: den as i64,
        }
    } else {
        Num::Approx(num as f64 / den as f64)
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

impl Add for Num {
    type Output = Num;

    fn add(self, rhs: Num) -> Num {
        match (self, rhs) {
            (Num::Exact { num: a, den: b }, Num::Exact { num: c, den: d }) => {
                normalize(a as i128 * d as i128 + c as i128 * b as i128, b as i128 * d as i128)
            }
            _ => Num::Approx(self.to_f64() + rhs.to_f64()),
        }
    }
}

impl Sub for Num {
    type Output = Num;

    fn sub(self, rhs: Num) -> Num {
        match (self, rhs) {
            (Num::Exact { num: a, den: b }, Num::Exact { num: c, den: d }) => {
                normalize(a as i128 * d as i128 - c as i128 * b as i128, b as i128 * d as i128)
            }
            _ => Num::Approx(self.to_f64() - rhs.to_f64()),
        }
    }
}

impl Mul for Num {
    type Output = Num;

    fn mul(self, rhs: Num) -> Num {
        match (self, rhs) {
            (Num::Exact { num: a, den: b }, Num::Exact { num: c, den: d }) => {
                normalize(a as i128 * c as i128, b as i128 * d as i128)
            }
            _ => Num::Approx(self.to_f64() * rhs.to_f64()),
        }
    }
}

impl Div for Num {
    type Output = Num;

    /// Division by exact zero yields `Approx(NAN)`, the numeric garbage
    /// value, rather than an error.
    fn div(self, rhs: Num) -> Num {
        match (self, rhs) {
            (Num::Exact { .. }, Num::Exact { num: 0, .. }) => Num::Approx(f64::NAN),
            (Num::Exact { num: a, den: b }, Num::Exact { num: c, den: d }) => {
                normalize(a as i128 * d as i128, b as i128 * c as i128)
            }
            _ => Num::Approx(self.to_f64() / rhs.to_f64()),
        }
    }
}

impl Neg for Num {
    type Output = Num;

    fn neg(self) -> Num {
        match self {
            Num::Exact { num, den } => Num::Exact { num: -num, den },
            Num::Approx(v) => Num::Approx(-v),
        }
    }
}

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Num::Exact { num, den: 1 } => write!(f, "{num}"),
            Num::Exact { num, den } => write!(f, "{num}/{den}"),
            Num::Approx(v) => write!(f, "{v}"),
        }
    }
}
