//! Pauli gadgets and Pauli polynomials.
//!
//! A Pauli gadget generalizes a phase gadget by allowing a different Pauli
//! on every leg: `exp(-i·θ/2 · P_0⊗P_1⊗…)`. A Pauli polynomial is an ordered
//! product of such gadgets.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::angle::Angle;
use crate::error::{IrError, IrResult, check_qubit};
use crate::gadget::{Basis, Gadget};
use crate::gate::Gate;
use crate::tableau::quarter_turns;

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Pauli {
    #[default]
    I,
    X,
    Y,
    Z,
}

impl Pauli {
    /// True unless identity.
    #[inline]
    pub fn is_nontrivial(self) -> bool {
        self != Pauli::I
    }

    /// Whether the two single-qubit Paulis commute.
    #[inline]
    pub fn commutes(self, other: Pauli) -> bool {
        self == Pauli::I || other == Pauli::I || self == other
    }

    /// Symplectic `(x, z)` bits.
    #[inline]
    pub fn bits(self) -> (bool, bool) {
        match self {
            Pauli::I => (false, false),
            Pauli::X => (true, false),
            Pauli::Y => (true, true),
            Pauli::Z => (false, true),
        }
    }

    /// Pauli with the given symplectic bits.
    #[inline]
    pub fn from_bits(x: bool, z: bool) -> Self {
        match (x, z) {
            (false, false) => Pauli::I,
            (true, false) => Pauli::X,
            (true, true) => Pauli::Y,
            (false, true) => Pauli::Z,
        }
    }

    /// Parse a single character (`I`, `X`, `Y`, `Z`).
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'I' => Some(Pauli::I),
            'X' => Some(Pauli::X),
            'Y' => Some(Pauli::Y),
            'Z' => Some(Pauli::Z),
            _ => None,
        }
    }
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Pauli::I => 'I',
            Pauli::X => 'X',
            Pauli::Y => 'Y',
            Pauli::Z => 'Z',
        };
        write!(f, "{c}")
    }
}

impl From<Basis> for Pauli {
    fn from(basis: Basis) -> Self {
        match basis {
            Basis::Z => Pauli::Z,
            Basis::X => Pauli::X,
        }
    }
}

/// A rotation about a Pauli string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauliGadget {
    angle: Angle,
    paulis: Vec<Pauli>,
}

impl PauliGadget {
    /// Create a Pauli gadget. At least one leg must be non-identity.
    pub fn new(angle: impl Into<Angle>, paulis: Vec<Pauli>) -> IrResult<Self> {
        if !paulis.iter().any(|p| p.is_nontrivial()) {
            return Err(IrError::EmptyGadget);
        }
        Ok(Self {
            angle: angle.into().normalized(),
            paulis,
        })
    }

    /// Parse a Pauli string such as `"XIZY"` (qubit 0 first).
    pub fn parse(angle: impl Into<Angle>, string: &str) -> Option<IrResult<Self>> {
        let paulis: Option<Vec<Pauli>> = string.chars().map(Pauli::from_char).collect();
        paulis.map(|p| Self::new(angle, p))
    }

    /// The rotation angle.
    pub fn angle(&self) -> &Angle {
        &self.angle
    }

    /// One Pauli per qubit.
    pub fn paulis(&self) -> &[Pauli] {
        &self.paulis
    }

    /// Number of qubits the string is defined over.
    pub fn num_qubits(&self) -> u32 {
        self.paulis.len() as u32
    }

    /// Qubits carrying a non-identity Pauli, ascending.
    pub fn support(&self) -> Vec<u32> {
        self.paulis
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_nontrivial())
            .map(|(q, _)| q as u32)
            .collect()
    }

    /// Number of non-identity legs.
    pub fn num_legs(&self) -> usize {
        self.paulis.iter().filter(|p| p.is_nontrivial()).count()
    }

    /// Two Pauli strings commute iff they anticommute on an even number of legs.
    pub fn commutes(&self, other: &PauliGadget) -> bool {
        let anti = self
            .paulis
            .iter()
            .zip(&other.paulis)
            .filter(|(a, b)| !a.commutes(**b))
            .count();
        anti % 2 == 0
    }

    /// Score of the overlap between two strings: every qubit where both act
    /// non-trivially counts `+1`, whatever the Paulis, and every other qubit
    /// (identity on either side) counts `-1`.
    pub fn mutual_legs(&self, other: &PauliGadget) -> i64 {
        self.paulis
            .iter()
            .zip(&other.paulis)
            .map(|(a, b)| {
                if a.is_nontrivial() && b.is_nontrivial() {
                    1
                } else {
                    -1
                }
            })
            .sum()
    }

    /// Same Pauli string.
    pub fn same_axis(&self, other: &PauliGadget) -> bool {
        self.paulis == other.paulis
    }

    /// Copy with a different angle.
    #[must_use]
    pub fn with_angle(&self, angle: Angle) -> PauliGadget {
        PauliGadget {
            angle: angle.normalized(),
            paulis: self.paulis.clone(),
        }
    }

    /// Conjugate the gadget by a Clifford gate: the string becomes `U·P·U†`.
    ///
    /// A sign picked up by the string is folded into the angle, so that
    /// `exp(-i·θ/2·P) = U†·exp(-i·θ'/2·P')·U`. `Rz` is accepted for multiples
    /// of π/2 only.
    pub fn propagate(&mut self, gate: &Gate) -> IrResult<()> {
        for q in gate.qubits() {
            check_qubit(q.0, self.num_qubits(), "pauli propagation")?;
        }
        let flip = match gate {
            Gate::Cx { control, target } => self.conjugate_cx(control.0, target.0),
            Gate::Rz { angle, qubit } => {
                let mut flip = false;
                for _ in 0..quarter_turns(gate, angle.as_f64())? {
                    flip ^= self.conjugate_single(&Gate::s(*qubit), qubit.0);
                }
                flip
            }
            _ => {
                let qubit = gate.qubits()[0].0;
                self.conjugate_single(gate, qubit)
            }
        };
        if flip {
            self.angle = (-self.angle.clone()).normalized();
        }
        Ok(())
    }

    /// Returns true if the sign flipped.
    fn conjugate_single(&mut self, gate: &Gate, qubit: u32) -> bool {
        use Pauli::{I, X, Y, Z};
        let p = self.paulis[qubit as usize];
        let (image, flip) = match (gate, p) {
            (_, I) => (I, false),
            (Gate::H { .. }, X) => (Z, false),
            (Gate::H { .. }, Y) => (Y, true),
            (Gate::H { .. }, Z) => (X, false),
            (Gate::S { .. }, X) => (Y, false),
            (Gate::S { .. }, Y) => (X, true),
            (Gate::Sdg { .. }, X) => (Y, true),
            (Gate::Sdg { .. }, Y) => (X, false),
            (Gate::V { .. }, Y) => (Z, false),
            (Gate::V { .. }, Z) => (Y, true),
            (Gate::Vdg { .. }, Y) => (Z, true),
            (Gate::Vdg { .. }, Z) => (Y, false),
            (Gate::X { .. }, Y | Z) | (Gate::Y { .. }, X | Z) | (Gate::Z { .. }, X | Y) => {
                (p, true)
            }
            _ => (p, false),
        };
        self.paulis[qubit as usize] = image;
        flip
    }

    /// Returns true if the sign flipped.
    fn conjugate_cx(&mut self, control: u32, target: u32) -> bool {
        let (c, t) = (control as usize, target as usize);
        let (xc, zc) = self.paulis[c].bits();
        let (xt, zt) = self.paulis[t].bits();
        self.paulis[c] = Pauli::from_bits(xc, zc ^ zt);
        self.paulis[t] = Pauli::from_bits(xt ^ xc, zt);
        xc && zt && !(xt ^ zc)
    }

    /// Widen the string to `num_qubits` by padding with identities.
    #[must_use]
    pub fn padded(&self, num_qubits: u32) -> PauliGadget {
        let mut paulis = self.paulis.clone();
        if paulis.len() < num_qubits as usize {
            paulis.resize(num_qubits as usize, Pauli::I);
        }
        PauliGadget {
            angle: self.angle.clone(),
            paulis,
        }
    }
}

impl From<&Gadget> for PauliGadget {
    fn from(gadget: &Gadget) -> Self {
        let width = gadget.max_qubit() as usize + 1;
        let mut paulis = vec![Pauli::I; width];
        for &q in gadget.qubits() {
            paulis[q as usize] = gadget.basis().into();
        }
        PauliGadget {
            angle: gadget.angle().clone(),
            paulis,
        }
    }
}

impl fmt::Display for PauliGadget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string: String = self.paulis.iter().map(Pauli::to_string).collect();
        write!(f, "{string}({})", self.angle)
    }
}

/// An ordered product of Pauli gadgets over a fixed register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauliPolynomial {
    num_qubits: u32,
    gadgets: Vec<PauliGadget>,
}

impl PauliPolynomial {
    /// Create an empty polynomial.
    pub fn new(num_qubits: u32) -> Self {
        Self {
            num_qubits,
            gadgets: vec![],
        }
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// The gadgets in application order.
    pub fn gadgets(&self) -> &[PauliGadget] {
        &self.gadgets
    }

    /// Number of gadgets.
    pub fn len(&self) -> usize {
        self.gadgets.len()
    }

    /// True if there are no gadgets.
    pub fn is_empty(&self) -> bool {
        self.gadgets.is_empty()
    }

    /// Append a gadget. Shorter strings are padded with identities.
    pub fn append(&mut self, gadget: PauliGadget) -> IrResult<&mut Self> {
        if gadget.num_qubits() > self.num_qubits {
            // Trailing identities beyond the register are harmless.
            let support = gadget.support();
            if let Some(&q) = support.last().filter(|&&q| q >= self.num_qubits) {
                return Err(IrError::QubitOutOfRange {
                    qubit: q,
                    num_qubits: self.num_qubits,
                    context: Some("pauli gadget"),
                });
            }
            let mut paulis = gadget.paulis.clone();
            paulis.truncate(self.num_qubits as usize);
            self.gadgets.push(PauliGadget {
                angle: gadget.angle,
                paulis,
            });
        } else {
            self.gadgets.push(gadget.padded(self.num_qubits));
        }
        Ok(self)
    }

    /// Append every gadget of `other`.
    pub fn extend(&mut self, other: &PauliPolynomial) -> IrResult<&mut Self> {
        if other.num_qubits > self.num_qubits {
            return Err(IrError::DimensionMismatch {
                expected: self.num_qubits,
                got: other.num_qubits,
            });
        }
        for gadget in &other.gadgets {
            self.gadgets.push(gadget.padded(self.num_qubits));
        }
        Ok(self)
    }

    /// Total number of non-identity legs.
    pub fn num_legs(&self) -> usize {
        self.gadgets.iter().map(PauliGadget::num_legs).sum()
    }

    /// The polynomial with every gadget conjugated by `gate`.
    pub fn propagate(&self, gate: &Gate) -> IrResult<PauliPolynomial> {
        let mut gadgets = self.gadgets.clone();
        for gadget in &mut gadgets {
            gadget.propagate(gate)?;
        }
        Ok(PauliPolynomial {
            num_qubits: self.num_qubits,
            gadgets,
        })
    }

    /// Merge equal Pauli strings separated only by commuting gadgets and
    /// drop zero-angle gadgets, until nothing changes.
    #[must_use]
    pub fn simplified(&self) -> PauliPolynomial {
        let mut gadgets = self.gadgets.clone();
        loop {
            let before = gadgets.len();
            let mut slots: Vec<Option<PauliGadget>> = gadgets.into_iter().map(Some).collect();
            for i in 0..slots.len() {
                let Some(current) = slots[i].clone() else {
                    continue;
                };
                for j in i + 1..slots.len() {
                    let Some(other) = &slots[j] else {
                        continue;
                    };
                    if other.same_axis(&current) {
                        let merged =
                            other.with_angle(other.angle().clone() + current.angle().clone());
                        slots[j] = Some(merged);
                        slots[i] = None;
                        break;
                    }
                    if !other.commutes(&current) {
                        break;
                    }
                }
            }
            gadgets = slots
                .into_iter()
                .flatten()
                .filter(|g| !g.angle().is_zero())
                .collect();
            if gadgets.len() == before {
                break;
            }
        }
        PauliPolynomial {
            num_qubits: self.num_qubits,
            gadgets,
        }
    }
}

impl From<&crate::phase_circuit::PhaseCircuit> for PauliPolynomial {
    fn from(circuit: &crate::phase_circuit::PhaseCircuit) -> Self {
        let num_qubits = circuit.num_qubits();
        PauliPolynomial {
            num_qubits,
            gadgets: circuit
                .gadgets()
                .iter()
                .map(|g| PauliGadget::from(g).padded(num_qubits))
                .collect(),
        }
    }
}

impl fmt::Display for PauliPolynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<String> = self.gadgets.iter().map(PauliGadget::to_string).collect();
        write!(f, "{}", terms.join(" · "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pg(angle: f64, s: &str) -> PauliGadget {
        PauliGadget::parse(angle, s).unwrap().unwrap()
    }

    #[test]
    fn test_parse_and_support() {
        let g = pg(0.5, "XIYZ");
        assert_eq!(g.paulis(), &[Pauli::X, Pauli::I, Pauli::Y, Pauli::Z]);
        assert_eq!(g.support(), vec![0, 2, 3]);
        assert_eq!(g.num_legs(), 3);
        assert!(PauliGadget::parse(0.5, "XQ").is_none());
        assert!(matches!(
            PauliGadget::parse(0.5, "II").unwrap(),
            Err(IrError::EmptyGadget)
        ));
    }

    #[test]
    fn test_commutation() {
        assert!(pg(0.1, "XX").commutes(&pg(0.1, "ZZ")));
        assert!(!pg(0.1, "XI").commutes(&pg(0.1, "ZI")));
        assert!(pg(0.1, "XY").commutes(&pg(0.1, "YX")));
        assert!(!pg(0.1, "XZ").commutes(&pg(0.1, "XY")));
    }

    #[test]
    fn test_mutual_legs() {
        // differing Paulis still count as shared legs
        assert_eq!(pg(0.1, "XXI").mutual_legs(&pg(0.1, "XZZ")), 1);
        // identity on both sides counts against
        assert_eq!(pg(0.1, "YYI").mutual_legs(&pg(0.1, "YYI")), 1);
        assert_eq!(pg(0.1, "XII").mutual_legs(&pg(0.1, "IIZ")), -3);
        assert_eq!(pg(0.1, "ZZZZ").mutual_legs(&pg(0.1, "XYZX")), 4);
    }

    #[test]
    fn test_bits_round_trip() {
        for p in [Pauli::I, Pauli::X, Pauli::Y, Pauli::Z] {
            let (x, z) = p.bits();
            assert_eq!(Pauli::from_bits(x, z), p);
        }
    }

    #[test]
    fn test_propagate_single_qubit() {
        let mut g = pg(0.5, "X");
        g.propagate(&Gate::h(0u32)).unwrap();
        assert_eq!(g.paulis(), &[Pauli::Z]);
        assert!((g.angle().as_f64().unwrap() - 0.5).abs() < 1e-12);

        // S·Y·S† = -X
        let mut g = pg(0.5, "Y");
        g.propagate(&Gate::s(0u32)).unwrap();
        assert_eq!(g.paulis(), &[Pauli::X]);
        assert!((g.angle().as_f64().unwrap() + 0.5).abs() < 1e-12);

        // V·Y·V† = Z
        let mut g = pg(0.5, "Y");
        g.propagate(&Gate::V { qubit: 0u32.into() }).unwrap();
        assert_eq!(g.paulis(), &[Pauli::Z]);
        assert!((g.angle().as_f64().unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_propagate_cnot() {
        // CX·(X⊗Z)·CX = -(Y⊗Y)
        let mut g = pg(0.3, "XZ");
        g.propagate(&Gate::cx(0u32, 1u32)).unwrap();
        assert_eq!(g.paulis(), &[Pauli::Y, Pauli::Y]);
        assert!((g.angle().as_f64().unwrap() + 0.3).abs() < 1e-12);

        // Z⊗Z collapses onto the target
        let mut g = pg(0.3, "ZZ");
        g.propagate(&Gate::cx(0u32, 1u32)).unwrap();
        assert_eq!(g.paulis(), &[Pauli::I, Pauli::Z]);
    }

    #[test]
    fn test_propagate_rejects_non_clifford() {
        let mut g = pg(0.3, "ZI");
        g.propagate(&Gate::rz(std::f64::consts::PI, 0u32)).unwrap();
        assert_eq!(g.paulis(), &[Pauli::Z, Pauli::I]);
        assert!(matches!(
            g.propagate(&Gate::rz(0.3, 0u32)),
            Err(IrError::NonClifford(_))
        ));
        assert!(matches!(
            g.propagate(&Gate::h(5u32)),
            Err(IrError::QubitOutOfRange { qubit: 5, .. })
        ));
    }

    #[test]
    fn test_polynomial_propagate() {
        let mut poly = PauliPolynomial::new(2);
        poly.append(pg(0.2, "XY")).unwrap();
        poly.append(pg(0.4, "ZI")).unwrap();
        let moved = poly.propagate(&Gate::h(0u32)).unwrap();
        assert_eq!(moved.gadgets()[0].paulis(), &[Pauli::Z, Pauli::Y]);
        assert_eq!(moved.gadgets()[1].paulis(), &[Pauli::X, Pauli::I]);
        assert_eq!(moved.num_legs(), poly.num_legs());
    }

    #[test]
    fn test_from_gadget() {
        let g = Gadget::x(0.5, [0, 2]).unwrap();
        let p = PauliGadget::from(&g).padded(4);
        assert_eq!(p.paulis(), &[Pauli::X, Pauli::I, Pauli::X, Pauli::I]);
    }

    #[test]
    fn test_polynomial_simplify() {
        let mut poly = PauliPolynomial::new(2);
        poly.append(pg(0.2, "XY")).unwrap();
        poly.append(pg(0.4, "ZZ")).unwrap(); // commutes with XY
        poly.append(pg(-0.2, "XY")).unwrap();
        let simple = poly.simplified();
        assert_eq!(simple.len(), 1);
        assert_eq!(simple.gadgets()[0].paulis(), &[Pauli::Z, Pauli::Z]);
    }

    #[test]
    fn test_append_rejects_out_of_range() {
        let mut poly = PauliPolynomial::new(2);
        assert!(poly.append(pg(0.1, "IIX")).is_err());
        poly.append(pg(0.1, "XZI")).unwrap();
        assert_eq!(poly.gadgets()[0].num_qubits(), 2);
        poly.append(pg(0.1, "Y")).unwrap();
        assert_eq!(poly.gadgets()[1].paulis(), &[Pauli::Y, Pauli::I]);
    }
}
