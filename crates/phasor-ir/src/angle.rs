//! Rotation angles.
//!
//! Gadget angles are either concrete radians or symbolic expressions over free
//! parameters. Concrete angles are kept in the canonical range `(-π, π]` so that
//! gadgets can be compared and merged.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::f64::consts::PI;
use std::fmt;

use crate::error::{IrError, IrResult};

/// Tolerance used when deciding whether an angle is a multiple of 2π.
pub const ANGLE_EPSILON: f64 = 1e-10;

/// A symbolic or concrete rotation angle in radians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Angle {
    /// A constant value in radians.
    Constant(f64),
    /// A free parameter.
    Symbol(String),
    /// Negation.
    Neg(Box<Angle>),
    /// Sum of two angles.
    Add(Box<Angle>, Box<Angle>),
    /// Scalar multiple of an angle.
    Scale(f64, Box<Angle>),
}

impl Angle {
    /// Create a constant angle, normalized into `(-π, π]`.
    pub fn constant(radians: f64) -> Self {
        Angle::Constant(wrap(radians))
    }

    /// `num/den · π`.
    pub fn pi_frac(num: i32, den: i32) -> Self {
        Self::constant(PI * f64::from(num) / f64::from(den))
    }

    /// Create a symbolic angle.
    pub fn symbol(name: impl Into<String>) -> Self {
        Angle::Symbol(name.into())
    }

    /// The zero angle.
    pub fn zero() -> Self {
        Angle::Constant(0.0)
    }

    /// Check if this angle contains any symbols.
    pub fn is_symbolic(&self) -> bool {
        match self {
            Angle::Constant(_) => false,
            Angle::Symbol(_) => true,
            Angle::Neg(a) | Angle::Scale(_, a) => a.is_symbolic(),
            Angle::Add(a, b) => a.is_symbolic() || b.is_symbolic(),
        }
    }

    /// Evaluate to radians, if no symbols are left. The result is not wrapped.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Angle::Constant(v) => Some(*v),
            Angle::Symbol(_) => None,
            Angle::Neg(a) => a.as_f64().map(|v| -v),
            Angle::Add(a, b) => Some(a.as_f64()? + b.as_f64()?),
            Angle::Scale(k, a) => a.as_f64().map(|v| k * v),
        }
    }

    /// Evaluate to radians or fail with [`IrError::SymbolicAngle`].
    pub fn value(&self) -> IrResult<f64> {
        self.as_f64()
            .ok_or_else(|| IrError::SymbolicAngle(self.to_string()))
    }

    /// True if the angle is a concrete multiple of 2π.
    pub fn is_zero(&self) -> bool {
        self.as_f64()
            .is_some_and(|v| wrap(v).abs() < ANGLE_EPSILON)
    }

    /// All symbol names in this angle, sorted.
    pub fn symbols(&self) -> BTreeSet<String> {
        let mut set = BTreeSet::new();
        self.collect_symbols(&mut set);
        set
    }

    fn collect_symbols(&self, set: &mut BTreeSet<String>) {
        match self {
            Angle::Constant(_) => {}
            Angle::Symbol(name) => {
                set.insert(name.clone());
            }
            Angle::Neg(a) | Angle::Scale(_, a) => a.collect_symbols(set),
            Angle::Add(a, b) => {
                a.collect_symbols(set);
                b.collect_symbols(set);
            }
        }
    }

    /// Bind a symbol to a value, returning a new angle.
    pub fn bind(&self, name: &str, value: f64) -> Self {
        match self {
            Angle::Symbol(n) if n == name => Angle::Constant(value),
            Angle::Constant(_) | Angle::Symbol(_) => self.clone(),
            Angle::Neg(a) => Angle::Neg(Box::new(a.bind(name, value))),
            Angle::Add(a, b) => {
                Angle::Add(Box::new(a.bind(name, value)), Box::new(b.bind(name, value)))
            }
            Angle::Scale(k, a) => Angle::Scale(*k, Box::new(a.bind(name, value))),
        }
    }

    /// Fold constant subexpressions and wrap constants into `(-π, π]`.
    pub fn normalized(&self) -> Self {
        if let Some(v) = self.as_f64() {
            return Angle::constant(v);
        }
        match self {
            Angle::Neg(a) => Angle::Neg(Box::new(a.normalized())),
            Angle::Add(a, b) => {
                let (a, b) = (a.normalized(), b.normalized());
                if a.is_zero() {
                    b
                } else if b.is_zero() {
                    a
                } else {
                    Angle::Add(Box::new(a), Box::new(b))
                }
            }
            Angle::Scale(k, a) => Angle::Scale(*k, Box::new(a.normalized())),
            Angle::Constant(_) | Angle::Symbol(_) => self.clone(),
        }
    }
}

/// Wrap radians into `(-π, π]`.
fn wrap(radians: f64) -> f64 {
    let two_pi = 2.0 * PI;
    let mut v = radians.rem_euclid(two_pi);
    if v > PI + ANGLE_EPSILON {
        v -= two_pi;
    }
    if (v - PI).abs() <= ANGLE_EPSILON {
        return PI;
    }
    if v.abs() < ANGLE_EPSILON {
        return 0.0;
    }
    v
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Angle::Constant(v) => {
                let ratio = v / PI;
                if (ratio - ratio.round()).abs() < ANGLE_EPSILON && ratio.round() != 0.0 {
                    write!(f, "{}π", ratio.round())
                } else {
                    write!(f, "{v}")
                }
            }
            Angle::Symbol(name) => write!(f, "{name}"),
            Angle::Neg(a) => write!(f, "-({a})"),
            Angle::Add(a, b) => write!(f, "({a} + {b})"),
            Angle::Scale(k, a) => write!(f, "{k}·{a}"),
        }
    }
}

impl From<f64> for Angle {
    fn from(value: f64) -> Self {
        Angle::constant(value)
    }
}

impl std::ops::Add for Angle {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Angle::Add(Box::new(self), Box::new(rhs)).normalized()
    }
}

impl std::ops::Sub for Angle {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self + (-rhs)
    }
}

impl std::ops::Neg for Angle {
    type Output = Self;

    fn neg(self) -> Self::Output {
        match self {
            Angle::Constant(v) => Angle::constant(-v),
            Angle::Neg(a) => *a,
            other => Angle::Neg(Box::new(other)),
        }
    }
}

impl std::ops::Mul<Angle> for f64 {
    type Output = Angle;

    fn mul(self, rhs: Angle) -> Self::Output {
        Angle::Scale(self, Box::new(rhs)).normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_is_wrapped() {
        let a = Angle::constant(3.0 * PI);
        assert_eq!(a.as_f64(), Some(PI));

        let b = Angle::constant(-PI / 2.0 + 4.0 * PI);
        assert!((b.as_f64().unwrap() + PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_negative_pi_maps_to_pi() {
        assert_eq!(Angle::constant(-PI).as_f64(), Some(PI));
    }

    #[test]
    fn test_symbol() {
        let theta = Angle::symbol("theta");
        assert!(theta.is_symbolic());
        assert_eq!(theta.as_f64(), None);
        assert!(theta.symbols().contains("theta"));
        assert!(matches!(theta.value(), Err(IrError::SymbolicAngle(_))));
    }

    #[test]
    fn test_bind() {
        let expr = Angle::symbol("theta") + Angle::pi_frac(1, 2);
        let bound = expr.bind("theta", PI / 2.0).normalized();
        assert!(!bound.is_symbolic());
        assert!((bound.as_f64().unwrap() - PI).abs() < 1e-10);
    }

    #[test]
    fn test_sum_to_zero() {
        let sum = Angle::pi_frac(3, 2) + Angle::pi_frac(1, 2);
        assert!(sum.is_zero());

        let diff = Angle::symbol("a") - Angle::symbol("a");
        // Symbolic cancellation is not attempted.
        assert!(!diff.is_zero());
    }

    #[test]
    fn test_scale() {
        let half = 0.5 * Angle::pi_frac(1, 1);
        assert!((half.as_f64().unwrap() - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_display() {
        assert_eq!(Angle::pi_frac(1, 1).to_string(), "1π");
        assert_eq!(Angle::symbol("phi").to_string(), "phi");
    }
}
