//! Primitive gates emitted by synthesis.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::angle::Angle;
use crate::qubit::QubitId;

/// A primitive gate together with the qubits it acts on.
///
/// Synthesis only ever emits Clifford generators, Paulis, `Rz` rotations and
/// CNOTs; this is the whole gate vocabulary of the crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gate", rename_all = "lowercase")]
pub enum Gate {
    /// Hadamard.
    H { qubit: QubitId },
    /// S gate (sqrt(Z)).
    S { qubit: QubitId },
    /// S-dagger.
    Sdg { qubit: QubitId },
    /// V gate (sqrt(X)).
    V { qubit: QubitId },
    /// V-dagger.
    Vdg { qubit: QubitId },
    /// Pauli-X.
    X { qubit: QubitId },
    /// Pauli-Y.
    Y { qubit: QubitId },
    /// Pauli-Z.
    Z { qubit: QubitId },
    /// Rotation `exp(-i·θ/2·Z)`.
    Rz { angle: Angle, qubit: QubitId },
    /// Controlled-NOT.
    Cx { control: QubitId, target: QubitId },
}

impl Gate {
    /// Hadamard on `qubit`.
    pub fn h(qubit: impl Into<QubitId>) -> Self {
        Gate::H {
            qubit: qubit.into(),
        }
    }

    /// S on `qubit`.
    pub fn s(qubit: impl Into<QubitId>) -> Self {
        Gate::S {
            qubit: qubit.into(),
        }
    }

    /// S-dagger on `qubit`.
    pub fn sdg(qubit: impl Into<QubitId>) -> Self {
        Gate::Sdg {
            qubit: qubit.into(),
        }
    }

    /// CNOT from `control` to `target`.
    pub fn cx(control: impl Into<QubitId>, target: impl Into<QubitId>) -> Self {
        Gate::Cx {
            control: control.into(),
            target: target.into(),
        }
    }

    /// Rz on `qubit`.
    pub fn rz(angle: impl Into<Angle>, qubit: impl Into<QubitId>) -> Self {
        Gate::Rz {
            angle: angle.into(),
            qubit: qubit.into(),
        }
    }

    /// Lowercase gate name, as used in serialized output.
    pub fn name(&self) -> &'static str {
        match self {
            Gate::H { .. } => "h",
            Gate::S { .. } => "s",
            Gate::Sdg { .. } => "sdg",
            Gate::V { .. } => "v",
            Gate::Vdg { .. } => "vdg",
            Gate::X { .. } => "x",
            Gate::Y { .. } => "y",
            Gate::Z { .. } => "z",
            Gate::Rz { .. } => "rz",
            Gate::Cx { .. } => "cx",
        }
    }

    /// Qubits this gate touches, control first for CNOT.
    pub fn qubits(&self) -> Vec<QubitId> {
        match self {
            Gate::H { qubit }
            | Gate::S { qubit }
            | Gate::Sdg { qubit }
            | Gate::V { qubit }
            | Gate::Vdg { qubit }
            | Gate::X { qubit }
            | Gate::Y { qubit }
            | Gate::Z { qubit }
            | Gate::Rz { qubit, .. } => vec![*qubit],
            Gate::Cx { control, target } => vec![*control, *target],
        }
    }

    /// True for entangling gates.
    #[inline]
    pub fn is_two_qubit(&self) -> bool {
        matches!(self, Gate::Cx { .. })
    }

    /// True for gates that are Clifford operations.
    pub fn is_clifford(&self) -> bool {
        !matches!(self, Gate::Rz { .. })
    }

    /// The inverse gate.
    pub fn inverse(&self) -> Gate {
        match self {
            Gate::S { qubit } => Gate::Sdg { qubit: *qubit },
            Gate::Sdg { qubit } => Gate::S { qubit: *qubit },
            Gate::V { qubit } => Gate::Vdg { qubit: *qubit },
            Gate::Vdg { qubit } => Gate::V { qubit: *qubit },
            Gate::Rz { angle, qubit } => Gate::Rz {
                angle: -angle.clone(),
                qubit: *qubit,
            },
            Gate::H { .. }
            | Gate::X { .. }
            | Gate::Y { .. }
            | Gate::Z { .. }
            | Gate::Cx { .. } => self.clone(),
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Rz { angle, qubit } => write!(f, "rz({angle}) {qubit}"),
            Gate::Cx { control, target } => write!(f, "cx {control}, {target}"),
            other => write!(f, "{} {}", other.name(), other.qubits()[0]),
        }
    }
}
