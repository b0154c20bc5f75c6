//! Clifford tableaux.
//!
//! An `n`-qubit Clifford `C` is stored as the images of the Pauli generators
//! under conjugation: row `i` holds `C·X_i·C†` and row `n + i` holds
//! `C·Z_i·C†`, each as X bits (columns `0..n`), Z bits (columns `n..2n`) and
//! a sign bit.
//!
//! `append_*` composes a gate after the Clifford (`C ← G·C`) and updates
//! columns; `prepend_*` composes it before (`C ← C·G`) and updates rows.

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use std::fmt;

use crate::angle::ANGLE_EPSILON;
use crate::circuit::Circuit;
use crate::error::{IrError, IrResult, check_qubit};
use crate::gate::Gate;
use crate::gf2::BitMatrix;
use crate::pauli::Pauli;

/// Symplectic representation of an `n`-qubit Clifford operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliffordTableau {
    num_qubits: u32,
    matrix: BitMatrix,
    signs: Vec<bool>,
}

impl CliffordTableau {
    /// The identity tableau on `num_qubits` qubits.
    pub fn new(num_qubits: u32) -> Self {
        let n = num_qubits as usize;
        Self {
            num_qubits,
            matrix: BitMatrix::identity(2 * n),
            signs: vec![false; 2 * n],
        }
    }

    /// Alias of [`CliffordTableau::new`].
    pub fn identity(num_qubits: u32) -> Self {
        Self::new(num_qubits)
    }

    /// Build from raw parts, checking shape and symplecticity.
    pub fn from_parts(num_qubits: u32, matrix: BitMatrix, signs: Vec<bool>) -> IrResult<Self> {
        let size = 2 * num_qubits as usize;
        for got in [matrix.rows(), matrix.cols(), signs.len()] {
            if got != size {
                return Err(IrError::DimensionMismatch {
                    expected: num_qubits,
                    got: (got / 2) as u32,
                });
            }
        }
        let tableau = Self {
            num_qubits,
            matrix,
            signs,
        };
        if !tableau.is_symplectic() {
            return Err(IrError::NonClifford("non-symplectic matrix".into()));
        }
        Ok(tableau)
    }

    /// The tableau of a Clifford circuit.
    pub fn from_circuit(circuit: &Circuit) -> IrResult<Self> {
        let mut tableau = Self::new(circuit.num_qubits());
        for gate in circuit.gates() {
            tableau.apply_gate(gate)?;
        }
        Ok(tableau)
    }

    /// Number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// The `2n × 2n` binary part.
    pub fn matrix(&self) -> &BitMatrix {
        &self.matrix
    }

    /// The `2n` sign bits.
    pub fn signs(&self) -> &[bool] {
        &self.signs
    }

    /// X bit of `row` on qubit `qubit`.
    #[inline]
    pub fn x_bit(&self, row: usize, qubit: usize) -> bool {
        self.matrix.get(row, qubit)
    }

    /// Z bit of `row` on qubit `qubit`.
    #[inline]
    pub fn z_bit(&self, row: usize, qubit: usize) -> bool {
        self.matrix.get(row, self.n() + qubit)
    }

    /// Sign bit of `row` (`true` means a `-1` phase).
    #[inline]
    pub fn sign(&self, row: usize) -> bool {
        self.signs[row]
    }

    /// The Pauli on `qubit` in `row`.
    pub fn pauli(&self, row: usize, qubit: usize) -> Pauli {
        match (self.x_bit(row, qubit), self.z_bit(row, qubit)) {
            (false, false) => Pauli::I,
            (true, false) => Pauli::X,
            (true, true) => Pauli::Y,
            (false, true) => Pauli::Z,
        }
    }

    /// Row `row` as a signed Pauli string.
    pub fn row_string(&self, row: usize) -> (bool, Vec<Pauli>) {
        (
            self.signs[row],
            (0..self.n()).map(|q| self.pauli(row, q)).collect(),
        )
    }

    /// True if the binary part preserves the symplectic form.
    pub fn is_symplectic(&self) -> bool {
        let n = self.n();
        for i in 0..2 * n {
            for j in i..2 * n {
                let product = (0..n).fold(false, |acc, k| {
                    acc ^ (self.matrix.get(i, k) & self.matrix.get(j, n + k))
                        ^ (self.matrix.get(i, n + k) & self.matrix.get(j, k))
                });
                if product != (j == i + n) {
                    return false;
                }
            }
        }
        true
    }

    // =========================================================================
    // Append (G·C): column updates
    // =========================================================================

    /// Compose a Hadamard after the Clifford.
    pub fn append_h(&mut self, qubit: u32) -> IrResult<&mut Self> {
        check_qubit(qubit, self.num_qubits, "h")?;
        self.h_cols(qubit as usize);
        Ok(self)
    }

    /// Compose an S after the Clifford.
    pub fn append_s(&mut self, qubit: u32) -> IrResult<&mut Self> {
        check_qubit(qubit, self.num_qubits, "s")?;
        self.s_cols(qubit as usize);
        Ok(self)
    }

    /// Compose an S-dagger after the Clifford.
    pub fn append_sdg(&mut self, qubit: u32) -> IrResult<&mut Self> {
        check_qubit(qubit, self.num_qubits, "sdg")?;
        self.sdg_cols(qubit as usize);
        Ok(self)
    }

    /// Compose a V (sqrt(X) = H·S·H) after the Clifford.
    pub fn append_v(&mut self, qubit: u32) -> IrResult<&mut Self> {
        check_qubit(qubit, self.num_qubits, "v")?;
        let q = qubit as usize;
        self.h_cols(q);
        self.s_cols(q);
        self.h_cols(q);
        Ok(self)
    }

    /// Compose a V-dagger after the Clifford.
    pub fn append_vdg(&mut self, qubit: u32) -> IrResult<&mut Self> {
        check_qubit(qubit, self.num_qubits, "vdg")?;
        let q = qubit as usize;
        self.h_cols(q);
        self.sdg_cols(q);
        self.h_cols(q);
        Ok(self)
    }

    /// Compose a Pauli X after the Clifford.
    pub fn append_x(&mut self, qubit: u32) -> IrResult<&mut Self> {
        check_qubit(qubit, self.num_qubits, "x")?;
        let z = self.n() + qubit as usize;
        for row in 0..2 * self.n() {
            self.signs[row] ^= self.matrix.get(row, z);
        }
        Ok(self)
    }

    /// Compose a Pauli Y after the Clifford.
    pub fn append_y(&mut self, qubit: u32) -> IrResult<&mut Self> {
        check_qubit(qubit, self.num_qubits, "y")?;
        let (x, z) = (qubit as usize, self.n() + qubit as usize);
        for row in 0..2 * self.n() {
            self.signs[row] ^= self.matrix.get(row, x) ^ self.matrix.get(row, z);
        }
        Ok(self)
    }

    /// Compose a Pauli Z after the Clifford.
    pub fn append_z(&mut self, qubit: u32) -> IrResult<&mut Self> {
        check_qubit(qubit, self.num_qubits, "z")?;
        let x = qubit as usize;
        for row in 0..2 * self.n() {
            self.signs[row] ^= self.matrix.get(row, x);
        }
        Ok(self)
    }

    /// Compose a CNOT after the Clifford.
    pub fn append_cnot(&mut self, control: u32, target: u32) -> IrResult<&mut Self> {
        self.check_pair(control, target)?;
        let n = self.n();
        let (xc, xt) = (control as usize, target as usize);
        let (zc, zt) = (n + xc, n + xt);
        for row in 0..2 * n {
            let m = &self.matrix;
            let flip = m.get(row, xc) & m.get(row, zt) & !(m.get(row, xt) ^ m.get(row, zc));
            self.signs[row] ^= flip;
            if self.matrix.get(row, xc) {
                self.matrix.toggle(row, xt);
            }
            if self.matrix.get(row, zt) {
                self.matrix.toggle(row, zc);
            }
        }
        Ok(self)
    }

    // =========================================================================
    // Prepend (C·G): row updates
    // =========================================================================

    /// Compose a Hadamard before the Clifford.
    pub fn prepend_h(&mut self, qubit: u32) -> IrResult<&mut Self> {
        check_qubit(qubit, self.num_qubits, "h")?;
        let (q, n) = (qubit as usize, self.n());
        self.matrix.swap_rows(q, n + q);
        self.signs.swap(q, n + q);
        Ok(self)
    }

    /// Compose an S before the Clifford.
    pub fn prepend_s(&mut self, qubit: u32) -> IrResult<&mut Self> {
        check_qubit(qubit, self.num_qubits, "s")?;
        let (q, n) = (qubit as usize, self.n());
        // S·X·S† = i·X·Z
        self.multiply_rows_into(q, n + q, q, 1);
        Ok(self)
    }

    /// Compose an S-dagger before the Clifford.
    pub fn prepend_sdg(&mut self, qubit: u32) -> IrResult<&mut Self> {
        check_qubit(qubit, self.num_qubits, "sdg")?;
        let (q, n) = (qubit as usize, self.n());
        // S†·X·S = -i·X·Z
        self.multiply_rows_into(q, n + q, q, 3);
        Ok(self)
    }

    /// Compose a V before the Clifford.
    pub fn prepend_v(&mut self, qubit: u32) -> IrResult<&mut Self> {
        self.prepend_h(qubit)?;
        self.prepend_s(qubit)?;
        self.prepend_h(qubit)
    }

    /// Compose a V-dagger before the Clifford.
    pub fn prepend_vdg(&mut self, qubit: u32) -> IrResult<&mut Self> {
        self.prepend_h(qubit)?;
        self.prepend_sdg(qubit)?;
        self.prepend_h(qubit)
    }

    /// Compose a Pauli X before the Clifford.
    pub fn prepend_x(&mut self, qubit: u32) -> IrResult<&mut Self> {
        check_qubit(qubit, self.num_qubits, "x")?;
        let n = self.n();
        self.signs[n + qubit as usize] ^= true;
        Ok(self)
    }

    /// Compose a Pauli Y before the Clifford.
    pub fn prepend_y(&mut self, qubit: u32) -> IrResult<&mut Self> {
        check_qubit(qubit, self.num_qubits, "y")?;
        let n = self.n();
        self.signs[qubit as usize] ^= true;
        self.signs[n + qubit as usize] ^= true;
        Ok(self)
    }

    /// Compose a Pauli Z before the Clifford.
    pub fn prepend_z(&mut self, qubit: u32) -> IrResult<&mut Self> {
        check_qubit(qubit, self.num_qubits, "z")?;
        self.signs[qubit as usize] ^= true;
        Ok(self)
    }

    /// Compose a CNOT before the Clifford.
    pub fn prepend_cnot(&mut self, control: u32, target: u32) -> IrResult<&mut Self> {
        self.check_pair(control, target)?;
        let (c, t, n) = (control as usize, target as usize, self.n());
        // X_c ↦ X_c·X_t, Z_t ↦ Z_c·Z_t
        self.multiply_rows_into(c, t, c, 0);
        self.multiply_rows_into(n + c, n + t, n + t, 0);
        Ok(self)
    }

    // =========================================================================
    // Gate-level entry points
    // =========================================================================

    /// Compose `gate` after the Clifford.
    ///
    /// `Rz` is accepted when its angle is a multiple of π/2 (it is then an S
    /// power up to global phase).
    pub fn apply_gate(&mut self, gate: &Gate) -> IrResult<&mut Self> {
        match gate {
            Gate::H { qubit } => self.append_h(qubit.0),
            Gate::S { qubit } => self.append_s(qubit.0),
            Gate::Sdg { qubit } => self.append_sdg(qubit.0),
            Gate::V { qubit } => self.append_v(qubit.0),
            Gate::Vdg { qubit } => self.append_vdg(qubit.0),
            Gate::X { qubit } => self.append_x(qubit.0),
            Gate::Y { qubit } => self.append_y(qubit.0),
            Gate::Z { qubit } => self.append_z(qubit.0),
            Gate::Cx { control, target } => self.append_cnot(control.0, target.0),
            Gate::Rz { angle, qubit } => {
                let turns = quarter_turns(gate, angle.as_f64())?;
                for _ in 0..turns {
                    self.append_s(qubit.0)?;
                }
                Ok(self)
            }
        }
    }

    /// Compose `gate` before the Clifford.
    pub fn prepend_gate(&mut self, gate: &Gate) -> IrResult<&mut Self> {
        match gate {
            Gate::H { qubit } => self.prepend_h(qubit.0),
            Gate::S { qubit } => self.prepend_s(qubit.0),
            Gate::Sdg { qubit } => self.prepend_sdg(qubit.0),
            Gate::V { qubit } => self.prepend_v(qubit.0),
            Gate::Vdg { qubit } => self.prepend_vdg(qubit.0),
            Gate::X { qubit } => self.prepend_x(qubit.0),
            Gate::Y { qubit } => self.prepend_y(qubit.0),
            Gate::Z { qubit } => self.prepend_z(qubit.0),
            Gate::Cx { control, target } => self.prepend_cnot(control.0, target.0),
            Gate::Rz { angle, qubit } => {
                let turns = quarter_turns(gate, angle.as_f64())?;
                for _ in 0..turns {
                    self.prepend_s(qubit.0)?;
                }
                Ok(self)
            }
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    #[inline]
    fn n(&self) -> usize {
        self.num_qubits as usize
    }

    fn check_pair(&self, control: u32, target: u32) -> IrResult<()> {
        check_qubit(control, self.num_qubits, "cx")?;
        check_qubit(target, self.num_qubits, "cx")?;
        if control == target {
            return Err(IrError::DuplicateQubit {
                qubit: control,
                context: Some("cx"),
            });
        }
        Ok(())
    }

    fn h_cols(&mut self, q: usize) {
        let (x, z) = (q, self.n() + q);
        for row in 0..2 * self.n() {
            self.signs[row] ^= self.matrix.get(row, x) & self.matrix.get(row, z);
        }
        self.matrix.swap_cols(x, z);
    }

    fn s_cols(&mut self, q: usize) {
        let (x, z) = (q, self.n() + q);
        for row in 0..2 * self.n() {
            let (xb, zb) = (self.matrix.get(row, x), self.matrix.get(row, z));
            self.signs[row] ^= xb & zb;
            self.matrix.set(row, z, zb ^ xb);
        }
    }

    fn sdg_cols(&mut self, q: usize) {
        let (x, z) = (q, self.n() + q);
        for row in 0..2 * self.n() {
            let (xb, zb) = (self.matrix.get(row, x), self.matrix.get(row, z));
            self.signs[row] ^= xb & !zb;
            self.matrix.set(row, z, zb ^ xb);
        }
    }

    /// Overwrite row `dest` with `i^phase · row_a · row_b`.
    fn multiply_rows_into(&mut self, a: usize, b: usize, dest: usize, phase: i32) {
        let n = self.n();
        let mut exponent = phase + 2 * i32::from(self.signs[a]) + 2 * i32::from(self.signs[b]);
        let mut bits = Vec::with_capacity(2 * n);
        for k in 0..n {
            let (x1, z1) = (self.matrix.get(a, k), self.matrix.get(a, n + k));
            let (x2, z2) = (self.matrix.get(b, k), self.matrix.get(b, n + k));
            exponent += pauli_product_phase(x1, z1, x2, z2);
            bits.push(x1 ^ x2);
        }
        for k in 0..n {
            bits.push(self.matrix.get(a, n + k) ^ self.matrix.get(b, n + k));
        }
        let exponent = exponent.rem_euclid(4);
        debug_assert!(exponent % 2 == 0, "row product is not Hermitian");
        for (k, bit) in bits.into_iter().enumerate() {
            self.matrix.set(dest, k, bit);
        }
        self.signs[dest] = exponent == 2;
    }
}

/// Power of `i` picked up when multiplying the single-qubit Paulis
/// `(x1, z1)·(x2, z2)`.
fn pauli_product_phase(x1: bool, z1: bool, x2: bool, z2: bool) -> i32 {
    let (x2, z2) = (i32::from(x2), i32::from(z2));
    match (x1, z1) {
        (false, false) => 0,
        (true, true) => z2 - x2,
        (true, false) => z2 * (2 * x2 - 1),
        (false, true) => x2 * (1 - 2 * z2),
    }
}

/// Number of S gates equivalent to an `Rz` angle, if it is a multiple of π/2.
pub(crate) fn quarter_turns(gate: &Gate, radians: Option<f64>) -> IrResult<u32> {
    let radians = radians.ok_or_else(|| IrError::NonClifford(gate.to_string()))?;
    let turns = radians / FRAC_PI_2;
    if (turns - turns.round()).abs() > ANGLE_EPSILON {
        return Err(IrError::NonClifford(gate.to_string()));
    }
    Ok((turns.round() as i64).rem_euclid(4) as u32)
}

impl fmt::Display for CliffordTableau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.n();
        for row in 0..2 * n {
            let (kind, q) = if row < n { ('X', row) } else { ('Z', row - n) };
            let (sign, paulis) = self.row_string(row);
            let string: String = paulis.iter().map(Pauli::to_string).collect();
            writeln!(
                f,
                "{kind}{q} -> {}{string}",
                if sign { '-' } else { '+' }
            )?;
        }
        Ok(())
    }
}
