//! Phase gadgets.
//!
//! A phase gadget with basis `B`, support `S` and angle `θ` is the rotation
//! `exp(-i·θ/2 · B⊗B⊗…⊗B)` acting on the qubits in `S`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::angle::Angle;
use crate::error::{IrError, IrResult};

/// Basis of a phase gadget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Basis {
    /// Z-basis gadget (diagonal).
    Z,
    /// X-basis gadget.
    X,
}

impl Basis {
    /// The other basis.
    pub fn dual(self) -> Self {
        match self {
            Basis::Z => Basis::X,
            Basis::X => Basis::Z,
        }
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Basis::Z => write!(f, "Z"),
            Basis::X => write!(f, "X"),
        }
    }
}

/// A phase gadget: angle, basis and a sorted, duplicate-free qubit support.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gadget {
    basis: Basis,
    angle: Angle,
    qubits: Vec<u32>,
}

impl Gadget {
    /// Create a gadget. The support is sorted and must not repeat qubits.
    pub fn new(
        basis: Basis,
        angle: impl Into<Angle>,
        qubits: impl IntoIterator<Item = u32>,
    ) -> IrResult<Self> {
        let mut qubits: Vec<u32> = qubits.into_iter().collect();
        if qubits.is_empty() {
            return Err(IrError::EmptyGadget);
        }
        qubits.sort_unstable();
        if let Some(w) = qubits.windows(2).find(|w| w[0] == w[1]) {
            return Err(IrError::DuplicateQubit {
                qubit: w[0],
                context: Some("gadget"),
            });
        }
        Ok(Self {
            basis,
            angle: angle.into().normalized(),
            qubits,
        })
    }

    /// Z-basis gadget.
    pub fn z(angle: impl Into<Angle>, qubits: impl IntoIterator<Item = u32>) -> IrResult<Self> {
        Self::new(Basis::Z, angle, qubits)
    }

    /// X-basis gadget.
    pub fn x(angle: impl Into<Angle>, qubits: impl IntoIterator<Item = u32>) -> IrResult<Self> {
        Self::new(Basis::X, angle, qubits)
    }

    /// The gadget basis.
    #[inline]
    pub fn basis(&self) -> Basis {
        self.basis
    }

    /// The rotation angle.
    #[inline]
    pub fn angle(&self) -> &Angle {
        &self.angle
    }

    /// The sorted support.
    #[inline]
    pub fn qubits(&self) -> &[u32] {
        &self.qubits
    }

    /// Number of legs (support size).
    pub fn num_legs(&self) -> usize {
        self.qubits.len()
    }

    /// Largest qubit index in the support.
    pub fn max_qubit(&self) -> u32 {
        // Support is non-empty by construction.
        self.qubits[self.qubits.len() - 1]
    }

    /// The support as a bit vector of width `num_qubits`.
    pub fn support_bits(&self, num_qubits: usize) -> Vec<bool> {
        let mut bits = vec![false; num_qubits];
        for &q in &self.qubits {
            bits[q as usize] = true;
        }
        bits
    }

    /// Number of qubits in both supports.
    pub fn overlap(&self, other: &Gadget) -> usize {
        let (mut i, mut j, mut count) = (0, 0, 0);
        while i < self.qubits.len() && j < other.qubits.len() {
            match self.qubits[i].cmp(&other.qubits[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    count += 1;
                    i += 1;
                    j += 1;
                }
            }
        }
        count
    }

    /// Gadgets of equal basis always commute; Z and X gadgets commute iff
    /// their supports overlap in an even number of qubits.
    pub fn commutes_with(&self, other: &Gadget) -> bool {
        self.basis == other.basis || self.overlap(other) % 2 == 0
    }

    /// Same basis and support.
    pub fn same_axis(&self, other: &Gadget) -> bool {
        self.basis == other.basis && self.qubits == other.qubits
    }

    /// Copy of this gadget with another angle.
    #[must_use]
    pub fn with_angle(&self, angle: Angle) -> Gadget {
        Gadget {
            basis: self.basis,
            angle: angle.normalized(),
            qubits: self.qubits.clone(),
        }
    }

    /// Copy of this gadget with its support replaced by `bits`.
    ///
    /// Returns `None` when `bits` is all zero.
    pub fn with_support_bits(&self, bits: &[bool]) -> Option<Gadget> {
        let qubits: Vec<u32> = bits
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b)
            .map(|(q, _)| q as u32)
            .collect();
        if qubits.is_empty() {
            return None;
        }
        Some(Gadget {
            basis: self.basis,
            angle: self.angle.clone(),
            qubits,
        })
    }
}

impl fmt::Display for Gadget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let qubits: Vec<String> = self.qubits.iter().map(u32::to_string).collect();
        write!(f, "{}({}) @ {{{}}}", self.basis, self.angle, qubits.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_support_sorted() {
        let g = Gadget::z(PI / 2.0, [3, 0, 2]).unwrap();
        assert_eq!(g.qubits(), &[0, 2, 3]);
        assert_eq!(g.max_qubit(), 3);
        assert_eq!(g.support_bits(4), vec![true, false, true, true]);
    }

    #[test]
    fn test_invalid_supports() {
        assert!(matches!(
            Gadget::z(1.0, std::iter::empty()),
            Err(IrError::EmptyGadget)
        ));
        assert!(matches!(
            Gadget::x(1.0, [1, 1]),
            Err(IrError::DuplicateQubit { qubit: 1, .. })
        ));
    }

    #[test]
    fn test_commutation() {
        let z01 = Gadget::z(0.3, [0, 1]).unwrap();
        let x01 = Gadget::x(0.3, [0, 1]).unwrap();
        let x12 = Gadget::x(0.3, [1, 2]).unwrap();
        let z12 = Gadget::z(0.7, [1, 2]).unwrap();

        assert!(z01.commutes_with(&z12));
        assert!(z01.commutes_with(&x01)); // overlap 2
        assert!(!z01.commutes_with(&x12)); // overlap 1
        assert!(x12.commutes_with(&x01));
    }

    #[test]
    fn test_with_support_bits() {
        let g = Gadget::x(0.5, [0]).unwrap();
        let moved = g.with_support_bits(&[false, true, true]).unwrap();
        assert_eq!(moved.qubits(), &[1, 2]);
        assert_eq!(moved.basis(), Basis::X);
        assert!(g.with_support_bits(&[false, false]).is_none());
    }
}
