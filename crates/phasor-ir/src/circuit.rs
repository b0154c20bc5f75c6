//! Gate-sequence circuits produced by synthesis.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::angle::Angle;
use crate::error::{IrError, IrResult, check_qubit};
use crate::gate::Gate;
use crate::qubit::QubitId;

/// An ordered sequence of primitive gates on a fixed number of qubits.
///
/// Gates are stored in time order: `gates()[0]` is applied first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    num_qubits: u32,
    gates: Vec<Gate>,
}

impl Circuit {
    /// Create an empty circuit.
    pub fn new(num_qubits: u32) -> Self {
        Self {
            num_qubits,
            gates: vec![],
        }
    }

    /// Number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// The gates in time order.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Consume the circuit and return its gates.
    pub fn into_gates(self) -> Vec<Gate> {
        self.gates
    }

    /// Number of gates.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// True if there are no gates.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Append a gate after checking its qubit indices.
    pub fn push(&mut self, gate: Gate) -> IrResult<&mut Self> {
        let qubits = gate.qubits();
        for q in &qubits {
            check_qubit(q.0, self.num_qubits, gate.name())?;
        }
        if let [control, target] = qubits.as_slice() {
            if control == target {
                return Err(IrError::DuplicateQubit {
                    qubit: control.0,
                    context: Some("cx"),
                });
            }
        }
        self.gates.push(gate);
        Ok(self)
    }

    // =========================================================================
    // Gate shorthands
    // =========================================================================

    /// Apply Hadamard.
    pub fn h(&mut self, qubit: u32) -> IrResult<&mut Self> {
        self.push(Gate::h(qubit))
    }

    /// Apply S.
    pub fn s(&mut self, qubit: u32) -> IrResult<&mut Self> {
        self.push(Gate::s(qubit))
    }

    /// Apply S-dagger.
    pub fn sdg(&mut self, qubit: u32) -> IrResult<&mut Self> {
        self.push(Gate::sdg(qubit))
    }

    /// Apply V (sqrt(X)).
    pub fn v(&mut self, qubit: u32) -> IrResult<&mut Self> {
        self.push(Gate::V {
            qubit: QubitId(qubit),
        })
    }

    /// Apply V-dagger.
    pub fn vdg(&mut self, qubit: u32) -> IrResult<&mut Self> {
        self.push(Gate::Vdg {
            qubit: QubitId(qubit),
        })
    }

    /// Apply Pauli-X.
    pub fn x(&mut self, qubit: u32) -> IrResult<&mut Self> {
        self.push(Gate::X {
            qubit: QubitId(qubit),
        })
    }

    /// Apply Pauli-Z.
    pub fn z(&mut self, qubit: u32) -> IrResult<&mut Self> {
        self.push(Gate::Z {
            qubit: QubitId(qubit),
        })
    }

    /// Apply `Rz(angle)`.
    pub fn rz(&mut self, angle: impl Into<Angle>, qubit: u32) -> IrResult<&mut Self> {
        self.push(Gate::rz(angle, qubit))
    }

    /// Apply CNOT.
    pub fn cx(&mut self, control: u32, target: u32) -> IrResult<&mut Self> {
        self.push(Gate::cx(control, target))
    }

    // =========================================================================
    // Whole-circuit operations
    // =========================================================================

    /// Append all gates of `other`.
    pub fn extend(&mut self, other: &Circuit) -> IrResult<&mut Self> {
        if other.num_qubits > self.num_qubits {
            return Err(IrError::DimensionMismatch {
                expected: self.num_qubits,
                got: other.num_qubits,
            });
        }
        self.gates.extend(other.gates.iter().cloned());
        Ok(self)
    }

    /// The inverse circuit: reversed order, every gate inverted.
    #[must_use]
    pub fn inverse(&self) -> Circuit {
        Circuit {
            num_qubits: self.num_qubits,
            gates: self.gates.iter().rev().map(Gate::inverse).collect(),
        }
    }

    /// Number of CNOT gates.
    pub fn cx_count(&self) -> usize {
        self.gates.iter().filter(|g| g.is_two_qubit()).count()
    }

    /// `(control, target)` pairs of every CNOT, in time order.
    pub fn two_qubit_pairs(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.gates.iter().filter_map(|g| match g {
            Gate::Cx { control, target } => Some((control.0, target.0)),
            _ => None,
        })
    }

    /// Circuit depth: the longest chain of gates sharing a qubit.
    pub fn depth(&self) -> usize {
        let mut level = vec![0usize; self.num_qubits as usize];
        for gate in &self.gates {
            let qubits = gate.qubits();
            let next = qubits.iter().map(|q| level[q.index()]).max().unwrap_or(0) + 1;
            for q in qubits {
                level[q.index()] = next;
            }
        }
        level.into_iter().max().unwrap_or(0)
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "circuit({} qubits, {} gates)", self.num_qubits, self.len())?;
        for gate in &self.gates {
            writeln!(f, "  {gate}")?;
        }
        Ok(())
    }
}
