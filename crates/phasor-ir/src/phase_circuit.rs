//! Ordered sequences of phase gadgets.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::angle::Angle;
use crate::error::{IrError, IrResult, check_qubit};
use crate::gadget::{Basis, Gadget};

/// A circuit made only of phase gadgets, applied in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseCircuit {
    num_qubits: u32,
    gadgets: Vec<Gadget>,
}

impl PhaseCircuit {
    /// Create an empty phase circuit.
    pub fn new(num_qubits: u32) -> Self {
        Self {
            num_qubits,
            gadgets: vec![],
        }
    }

    /// Build from a gadget list, validating every support.
    pub fn from_gadgets(num_qubits: u32, gadgets: Vec<Gadget>) -> IrResult<Self> {
        let mut circuit = Self::new(num_qubits);
        for gadget in gadgets {
            circuit.append(gadget)?;
        }
        Ok(circuit)
    }

    /// Number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// The gadgets in application order.
    pub fn gadgets(&self) -> &[Gadget] {
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

    /// Append an existing gadget.
    pub fn append(&mut self, gadget: Gadget) -> IrResult<&mut Self> {
        check_qubit(gadget.max_qubit(), self.num_qubits, "gadget")?;
        self.gadgets.push(gadget);
        Ok(self)
    }

    /// Build and append a gadget.
    pub fn append_gadget(
        &mut self,
        angle: impl Into<Angle>,
        basis: Basis,
        qubits: impl IntoIterator<Item = u32>,
    ) -> IrResult<&mut Self> {
        let gadget = Gadget::new(basis, angle, qubits)?;
        self.append(gadget)
    }

    /// Append every gadget of `other`.
    pub fn extend(&mut self, other: &PhaseCircuit) -> IrResult<&mut Self> {
        if other.num_qubits > self.num_qubits {
            return Err(IrError::DimensionMismatch {
                expected: self.num_qubits,
                got: other.num_qubits,
            });
        }
        self.gadgets.extend(other.gadgets.iter().cloned());
        Ok(self)
    }

    /// Total number of legs over all gadgets.
    pub fn num_legs(&self) -> usize {
        self.gadgets.iter().map(Gadget::num_legs).sum()
    }

    /// Merge gadgets that share basis and support and can be moved next to
    /// each other, then drop zero-angle gadgets. Repeats until nothing changes.
    #[must_use]
    pub fn simplified(&self) -> PhaseCircuit {
        let mut gadgets = self.gadgets.clone();
        loop {
            let before = gadgets.len();
            gadgets = merge_pass(gadgets);
            gadgets.retain(|g| !g.angle().is_zero());
            if gadgets.len() == before {
                break;
            }
        }
        PhaseCircuit {
            num_qubits: self.num_qubits,
            gadgets,
        }
    }

    /// True if every gadget angle is concrete.
    pub fn is_numeric(&self) -> bool {
        self.gadgets.iter().all(|g| !g.angle().is_symbolic())
    }

    /// Bind a symbol in every gadget angle.
    #[must_use]
    pub fn bind(&self, name: &str, value: f64) -> PhaseCircuit {
        PhaseCircuit {
            num_qubits: self.num_qubits,
            gadgets: self
                .gadgets
                .iter()
                .map(|g| g.with_angle(g.angle().bind(name, value)))
                .collect(),
        }
    }
}

/// One left-to-right pass: each gadget is folded into the first later gadget
/// on the same axis, provided everything in between commutes with it.
fn merge_pass(gadgets: Vec<Gadget>) -> Vec<Gadget> {
    let mut slots: Vec<Option<Gadget>> = gadgets.into_iter().map(Some).collect();
    for i in 0..slots.len() {
        let Some(current) = slots[i].clone() else {
            continue;
        };
        for j in i + 1..slots.len() {
            let Some(other) = &slots[j] else {
                continue;
            };
            if other.same_axis(&current) {
                let merged = other.with_angle(other.angle().clone() + current.angle().clone());
                slots[j] = Some(merged);
                slots[i] = None;
                break;
            }
            if !other.commutes_with(&current) {
                break;
            }
        }
    }
    slots.into_iter().flatten().collect()
}

impl fmt::Display for PhaseCircuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "phase_circuit({} qubits, {} gadgets)",
            self.num_qubits,
            self.len()
        )?;
        for gadget in &self.gadgets {
            writeln!(f, "  {gadget}")?;
        }
        Ok(())
    }
}
