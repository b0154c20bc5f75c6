//! Synthesis of phase gadgets and Pauli gadgets along Steiner trees.
//!
//! A gadget on support `S` is realised as a CNOT ladder that collects the
//! parity of `S` on the root of a Steiner tree, one `Rz` on the root, and the
//! mirrored ladder. X and Y legs are conjugated into the Z basis with H and
//! V/V† respectively.

use rustc_hash::FxHashMap;
use tracing::debug;

use phasor_ir::{Angle, Circuit, Gadget, Pauli, PauliGadget, PauliPolynomial, PhaseCircuit};

use crate::error::{SynthError, SynthResult};
use crate::topology::{SteinerTree, Topology};

/// CNOTs `(control, target)` that move the parity of every terminal of
/// `tree` onto its root.
///
/// Steiner (non-terminal) vertices are cleaned up on the way so that they
/// contribute nothing to the parity.
pub fn parity_ladder(tree: &SteinerTree) -> Vec<(u32, u32)> {
    let mut cnots = vec![];
    for &v in tree.vertices().iter().rev() {
        let children = tree.children(v);
        let Some((&first, rest)) = children.split_first() else {
            continue;
        };
        if tree.is_terminal(v) {
            cnots.push((first, v));
        } else {
            cnots.push((v, first));
            cnots.push((first, v));
        }
        cnots.extend(rest.iter().map(|&c| (c, v)));
    }
    cnots
}

/// CNOT count of a full gadget (ladder, rotation, mirrored ladder).
pub fn ladder_cost(tree: &SteinerTree) -> usize {
    2 * (tree.num_edges() + tree.steiner_vertices().count())
}

/// Memoized gadget costs, keyed by support.
///
/// The CNOT cost of a gadget depends only on its support, so repeated
/// queries during optimization hit the cache.
#[derive(Debug, Default)]
pub struct GadgetCostCache {
    costs: FxHashMap<Vec<u32>, usize>,
    hits: u64,
    misses: u64,
}

impl GadgetCostCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// CNOT cost of a gadget on `support` (sorted, non-empty).
    pub fn cost(&mut self, support: &[u32], topology: &Topology) -> SynthResult<usize> {
        if support.len() <= 1 {
            return Ok(0);
        }
        if let Some(&cost) = self.costs.get(support) {
            self.hits += 1;
            return Ok(cost);
        }
        self.misses += 1;
        let cost = ladder_cost(&topology.steiner_subgraph(support)?);
        self.costs.insert(support.to_vec(), cost);
        Ok(cost)
    }

    /// Number of distinct supports seen.
    pub fn len(&self) -> usize {
        self.costs.len()
    }

    /// True if nothing has been cached.
    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

/// Append the circuit for `exp(-i·θ/2·P)` where `P` is given leg by leg.
fn push_rotation(
    circuit: &mut Circuit,
    legs: &[(u32, Pauli)],
    angle: &Angle,
    topology: &Topology,
) -> SynthResult<()> {
    let support: Vec<u32> = legs.iter().map(|&(q, _)| q).collect();
    let tree = topology.steiner_subgraph(&support)?;
    let ladder = parity_ladder(&tree);

    for &(q, pauli) in legs {
        match pauli {
            Pauli::X => {
                circuit.h(q)?;
            }
            Pauli::Y => {
                circuit.v(q)?;
            }
            Pauli::Z | Pauli::I => {}
        }
    }
    for &(c, t) in &ladder {
        circuit.cx(c, t)?;
    }
    circuit.rz(angle.clone(), tree.root())?;
    for &(c, t) in ladder.iter().rev() {
        circuit.cx(c, t)?;
    }
    for &(q, pauli) in legs {
        match pauli {
            Pauli::X => {
                circuit.h(q)?;
            }
            Pauli::Y => {
                circuit.vdg(q)?;
            }
            Pauli::Z | Pauli::I => {}
        }
    }
    Ok(())
}

fn gadget_legs(gadget: &Gadget) -> Vec<(u32, Pauli)> {
    let pauli = Pauli::from(gadget.basis());
    gadget.qubits().iter().map(|&q| (q, pauli)).collect()
}

fn pauli_legs(gadget: &PauliGadget) -> Vec<(u32, Pauli)> {
    gadget
        .paulis()
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_nontrivial())
        .map(|(q, &p)| (q as u32, p))
        .collect()
}

/// Append the circuit of one phase gadget to `circuit`.
pub fn append_gadget_circuit(
    circuit: &mut Circuit,
    gadget: &Gadget,
    topology: &Topology,
) -> SynthResult<()> {
    push_rotation(circuit, &gadget_legs(gadget), gadget.angle(), topology)
}

/// Append the circuit of one Pauli gadget to `circuit`.
pub fn append_pauli_gadget_circuit(
    circuit: &mut Circuit,
    gadget: &PauliGadget,
    topology: &Topology,
) -> SynthResult<()> {
    push_rotation(circuit, &pauli_legs(gadget), gadget.angle(), topology)
}

pub(crate) fn check_dims(input: u32, topology: &Topology) -> SynthResult<()> {
    if input == topology.num_qubits() {
        Ok(())
    } else {
        Err(SynthError::DimensionMismatch {
            topology: topology.num_qubits(),
            input,
        })
    }
}

/// Direct synthesis of gadget sequences, one Steiner ladder per gadget.
pub trait GadgetSynthesis {
    /// Topology-compliant circuit, gadgets synthesized independently.
    fn to_circuit(&self, topology: &Topology) -> SynthResult<Circuit>;

    /// CNOT count of [`GadgetSynthesis::to_circuit`], using a support cache.
    fn two_qubit_count(&self, topology: &Topology) -> SynthResult<usize>;
}

impl GadgetSynthesis for PhaseCircuit {
    fn to_circuit(&self, topology: &Topology) -> SynthResult<Circuit> {
        check_dims(self.num_qubits(), topology)?;
        let mut circuit = Circuit::new(self.num_qubits());
        for gadget in self.gadgets() {
            append_gadget_circuit(&mut circuit, gadget, topology)?;
        }
        debug!(
            gadgets = self.len(),
            cx = circuit.cx_count(),
            "synthesized phase circuit"
        );
        Ok(circuit)
    }

    fn two_qubit_count(&self, topology: &Topology) -> SynthResult<usize> {
        check_dims(self.num_qubits(), topology)?;
        let mut cache = GadgetCostCache::new();
        self.gadgets()
            .iter()
            .map(|g| cache.cost(g.qubits(), topology))
            .sum()
    }
}

impl GadgetSynthesis for PauliPolynomial {
    fn to_circuit(&self, topology: &Topology) -> SynthResult<Circuit> {
        check_dims(self.num_qubits(), topology)?;
        let mut circuit = Circuit::new(self.num_qubits());
        for gadget in self.gadgets() {
            append_pauli_gadget_circuit(&mut circuit, gadget, topology)?;
        }
        debug!(
            gadgets = self.len(),
            cx = circuit.cx_count(),
            "synthesized pauli polynomial"
        );
        Ok(circuit)
    }

    fn two_qubit_count(&self, topology: &Topology) -> SynthResult<usize> {
        check_dims(self.num_qubits(), topology)?;
        let mut cache = GadgetCostCache::new();
        self.gadgets()
            .iter()
            .map(|g| cache.cost(&g.support(), topology))
            .sum()
    }
}

/// True if the gadget's support is confined to one component of `topology`.
pub(crate) fn gadget_is_routable(gadget: &Gadget, topology: &Topology) -> bool {
    let first = gadget.qubits()[0];
    gadget
        .qubits()
        .iter()
        .all(|&q| topology.same_component(first, q))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::RespectsTopology;
    use phasor_ir::{Basis, Gate};
    use std::f64::consts::PI;

    #[test]
    fn test_single_leg_needs_no_cnot() {
        let mut pc = PhaseCircuit::new(3);
        pc.append_gadget(0.3, Basis::Z, [2]).unwrap();
        pc.append_gadget(0.3, Basis::X, [0]).unwrap();
        let circuit = pc.to_circuit(&Topology::line(3)).unwrap();
        assert_eq!(circuit.cx_count(), 0);
        assert_eq!(pc.two_qubit_count(&Topology::line(3)).unwrap(), 0);
    }

    #[test]
    fn test_adjacent_pair_costs_two() {
        let mut pc = PhaseCircuit::new(4);
        pc.append_gadget(PI / 2.0, Basis::Z, [0, 1]).unwrap();
        let ring = Topology::cycle(4);
        let circuit = pc.to_circuit(&ring).unwrap();
        assert_eq!(circuit.cx_count(), 2);
        assert_eq!(pc.two_qubit_count(&ring).unwrap(), 2);
    }

    #[test]
    fn test_steiner_vertex_is_cleaned() {
        // Support {0, 2} on a line routes through qubit 1.
        let tree = Topology::line(3).steiner_subgraph(&[0, 2]).unwrap();
        let ladder = parity_ladder(&tree);
        assert_eq!(ladder, vec![(1, 2), (2, 1), (1, 0)]);
        assert_eq!(ladder_cost(&tree), 6);
    }

    #[test]
    fn test_x_gadget_uses_hadamards() {
        let mut pc = PhaseCircuit::new(4);
        pc.append_gadget(PI, Basis::X, [0, 2]).unwrap();
        let ring = Topology::cycle(4);
        let circuit = pc.to_circuit(&ring).unwrap();
        assert!(circuit.respects(&ring));
        let hadamards = circuit
            .gates()
            .iter()
            .filter(|g| matches!(g, Gate::H { .. }))
            .count();
        assert_eq!(hadamards, 4);
        // routed through qubit 1 or 3
        assert!(
            circuit
                .two_qubit_pairs()
                .any(|(c, t)| c == 1 || t == 1 || c == 3 || t == 3)
        );
    }

    #[test]
    fn test_cache_hits() {
        let line = Topology::line(4);
        let mut cache = GadgetCostCache::new();
        assert_eq!(cache.cost(&[0, 3], &line).unwrap(), 10);
        assert_eq!(cache.cost(&[0, 3], &line).unwrap(), 10);
        assert_eq!(cache.stats(), (1, 1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_pauli_gadget_legs() {
        let mut poly = PauliPolynomial::new(3);
        poly.append(PauliGadget::parse(0.4, "XYZ").unwrap().unwrap())
            .unwrap();
        let line = Topology::line(3);
        let circuit = poly.to_circuit(&line).unwrap();
        assert!(circuit.respects(&line));
        assert_eq!(circuit.cx_count(), 4);
        assert_eq!(poly.two_qubit_count(&line).unwrap(), 4);
        assert!(circuit.gates().contains(&Gate::V { qubit: 1u32.into() }));
        assert!(circuit.gates().contains(&Gate::Vdg { qubit: 1u32.into() }));
    }

    #[test]
    fn test_dimension_mismatch() {
        let pc = PhaseCircuit::new(2);
        assert!(matches!(
            pc.to_circuit(&Topology::line(3)),
            Err(SynthError::DimensionMismatch { .. })
        ));
    }
}
