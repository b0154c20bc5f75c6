//! Dense state-vector evaluation for verifying synthesis results.
//!
//! Only meant for small registers: a unitary on `n` qubits is built column by
//! column from `2^n` basis states. Qubit `q` is bit `q` of a basis index.

use num_complex::Complex64;

use phasor_ir::{Angle, Circuit, Gate, Pauli, PauliPolynomial, PhaseCircuit};

use crate::error::{SynthError, SynthResult};

/// Tolerance for floating point comparisons.
const EPSILON: f64 = 1e-9;

/// Largest register accepted by the dense routines.
pub const MAX_DENSE_QUBITS: u32 = 12;

/// A dense unitary stored as columns: `columns[j]` is `U·|j⟩`.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseUnitary {
    num_qubits: u32,
    columns: Vec<Vec<Complex64>>,
}

impl DenseUnitary {
    /// Number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Entry `⟨i|U|j⟩`.
    pub fn get(&self, i: usize, j: usize) -> Complex64 {
        self.columns[j][i]
    }

    /// True if `self = e^{iφ}·other` for some global phase `φ`.
    pub fn equals_up_to_phase(&self, other: &DenseUnitary) -> bool {
        if self.num_qubits != other.num_qubits {
            return false;
        }
        let mut phase = None;
        for (a_col, b_col) in self.columns.iter().zip(&other.columns) {
            for (&a, &b) in a_col.iter().zip(b_col) {
                match phase {
                    None if a.norm() > EPSILON => {
                        let p = b / a;
                        if (p.norm() - 1.0).abs() > EPSILON {
                            return false;
                        }
                        phase = Some(p);
                    }
                    None => {
                        if b.norm() > EPSILON {
                            return false;
                        }
                    }
                    Some(p) => {
                        if (p * a - b).norm() > EPSILON {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }
}

/// A state vector on a small register.
#[derive(Debug, Clone)]
pub struct StateVector {
    num_qubits: u32,
    amplitudes: Vec<Complex64>,
}

impl StateVector {
    /// The basis state `|index⟩`.
    pub fn basis(num_qubits: u32, index: usize) -> SynthResult<Self> {
        if num_qubits > MAX_DENSE_QUBITS {
            return Err(SynthError::InvalidConfig(format!(
                "dense evaluation supports at most {MAX_DENSE_QUBITS} qubits, got {num_qubits}"
            )));
        }
        let dim = 1usize << num_qubits;
        if index >= dim {
            return Err(SynthError::InvalidConfig(format!(
                "basis index {index} out of range for {num_qubits} qubits"
            )));
        }
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); dim];
        amplitudes[index] = Complex64::new(1.0, 0.0);
        Ok(Self {
            num_qubits,
            amplitudes,
        })
    }

    /// The amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Apply one gate. Symbolic angles are rejected.
    pub fn apply_gate(&mut self, gate: &Gate) -> SynthResult<()> {
        let c = Complex64::new;
        let half = 0.5;
        match gate {
            Gate::H { qubit } => {
                let s = 1.0 / 2.0_f64.sqrt();
                self.apply_1q(qubit.0, [c(s, 0.0), c(s, 0.0), c(s, 0.0), c(-s, 0.0)]);
            }
            Gate::S { qubit } => {
                self.apply_1q(qubit.0, [c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(0.0, 1.0)]);
            }
            Gate::Sdg { qubit } => {
                self.apply_1q(qubit.0, [c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(0.0, -1.0)]);
            }
            Gate::V { qubit } => self.apply_1q(
                qubit.0,
                [c(half, half), c(half, -half), c(half, -half), c(half, half)],
            ),
            Gate::Vdg { qubit } => self.apply_1q(
                qubit.0,
                [c(half, -half), c(half, half), c(half, half), c(half, -half)],
            ),
            Gate::X { qubit } => {
                self.apply_1q(qubit.0, [c(0.0, 0.0), c(1.0, 0.0), c(1.0, 0.0), c(0.0, 0.0)]);
            }
            Gate::Y { qubit } => {
                self.apply_1q(qubit.0, [c(0.0, 0.0), c(0.0, -1.0), c(0.0, 1.0), c(0.0, 0.0)]);
            }
            Gate::Z { qubit } => {
                self.apply_1q(qubit.0, [c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(-1.0, 0.0)]);
            }
            Gate::Rz { angle, qubit } => {
                let theta = angle.value()?;
                let zero = c(0.0, 0.0);
                self.apply_1q(
                    qubit.0,
                    [
                        Complex64::from_polar(1.0, -theta / 2.0),
                        zero,
                        zero,
                        Complex64::from_polar(1.0, theta / 2.0),
                    ],
                );
            }
            Gate::Cx { control, target } => {
                let (cm, tm) = (1usize << control.0, 1usize << target.0);
                for x in 0..self.amplitudes.len() {
                    if x & cm != 0 && x & tm == 0 {
                        self.amplitudes.swap(x, x | tm);
                    }
                }
            }
        }
        Ok(())
    }

    /// Apply `exp(-i·θ/2·P)` for the Pauli string given leg by leg.
    pub fn apply_pauli_rotation(&mut self, legs: &[(u32, Pauli)], angle: &Angle) -> SynthResult<()> {
        let theta = angle.value()?;
        let (cos, sin) = ((theta / 2.0).cos(), (theta / 2.0).sin());
        let flip: usize = legs
            .iter()
            .filter(|(_, p)| matches!(p, Pauli::X | Pauli::Y))
            .map(|&(q, _)| 1usize << q)
            .fold(0, |acc, m| acc | m);
        let mut next = vec![Complex64::new(0.0, 0.0); self.amplitudes.len()];
        for (x, &amp) in self.amplitudes.iter().enumerate() {
            let mut phase = Complex64::new(1.0, 0.0);
            for &(q, pauli) in legs {
                let bit = (x >> q) & 1 == 1;
                let sign = if bit { -1.0 } else { 1.0 };
                phase *= match pauli {
                    Pauli::I | Pauli::X => Complex64::new(1.0, 0.0),
                    Pauli::Z => Complex64::new(sign, 0.0),
                    Pauli::Y => Complex64::new(0.0, sign),
                };
            }
            next[x] += amp * cos;
            next[x ^ flip] += Complex64::new(0.0, -sin) * phase * amp;
        }
        self.amplitudes = next;
        Ok(())
    }

    fn apply_1q(&mut self, qubit: u32, m: [Complex64; 4]) {
        let mask = 1usize << qubit;
        for x in 0..self.amplitudes.len() {
            if x & mask == 0 {
                let (a0, a1) = (self.amplitudes[x], self.amplitudes[x | mask]);
                self.amplitudes[x] = m[0] * a0 + m[1] * a1;
                self.amplitudes[x | mask] = m[2] * a0 + m[3] * a1;
            }
        }
    }
}

pub(crate) fn build_unitary<F>(num_qubits: u32, mut evolve: F) -> SynthResult<DenseUnitary>
where
    F: FnMut(&mut StateVector) -> SynthResult<()>,
{
    let dim = 1usize << num_qubits.min(MAX_DENSE_QUBITS);
    let mut columns = Vec::with_capacity(dim);
    for j in 0..dim {
        let mut state = StateVector::basis(num_qubits, j)?;
        evolve(&mut state)?;
        columns.push(state.amplitudes);
    }
    Ok(DenseUnitary {
        num_qubits,
        columns,
    })
}

/// Unitary of a gate sequence.
pub fn circuit_unitary(circuit: &Circuit) -> SynthResult<DenseUnitary> {
    build_unitary(circuit.num_qubits(), |state| {
        circuit.gates().iter().try_for_each(|g| state.apply_gate(g))
    })
}

/// Unitary of a phase-gadget circuit.
pub fn phase_circuit_unitary(circuit: &PhaseCircuit) -> SynthResult<DenseUnitary> {
    build_unitary(circuit.num_qubits(), |state| {
        for gadget in circuit.gadgets() {
            let pauli = Pauli::from(gadget.basis());
            let legs: Vec<(u32, Pauli)> = gadget.qubits().iter().map(|&q| (q, pauli)).collect();
            state.apply_pauli_rotation(&legs, gadget.angle())?;
        }
        Ok(())
    })
}

/// Unitary of a Pauli polynomial.
pub fn pauli_polynomial_unitary(poly: &PauliPolynomial) -> SynthResult<DenseUnitary> {
    build_unitary(poly.num_qubits(), |state| {
        for gadget in poly.gadgets() {
            let legs: Vec<(u32, Pauli)> = gadget
                .paulis()
                .iter()
                .enumerate()
                .map(|(q, &p)| (q as u32, p))
                .collect();
            state.apply_pauli_rotation(&legs, gadget.angle())?;
        }
        Ok(())
    })
}
