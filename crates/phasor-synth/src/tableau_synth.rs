//! Topology-constrained synthesis of Clifford tableaux.
//!
//! The target tableau is copied and reduced to the identity by composing
//! gates after it, one pivot qubit at a time. Every CNOT acts on an edge of
//! the alive subgraph, and a pivot is only retired when its removal keeps
//! that subgraph connected. The emitted circuit is the inverse of the
//! reduction.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use phasor_ir::{Circuit, CliffordTableau, Gate, Pauli};

use crate::error::{SynthError, SynthResult};
use crate::gadget_synth::check_dims;
use crate::topology::Topology;

/// Result of [`synthesize_tableau`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableauSynthesis {
    /// Gate sequence whose tableau equals the input, signs included.
    pub circuit: Circuit,
    /// Number of CNOTs in `circuit`.
    pub cost: usize,
}

/// Synthesize `tableau` using H, S, V, Pauli gates and CNOTs on `topology`
/// edges only.
#[instrument(skip(tableau, topology), fields(num_qubits = tableau.num_qubits()))]
pub fn synthesize_tableau(
    tableau: &CliffordTableau,
    topology: &Topology,
) -> SynthResult<TableauSynthesis> {
    check_dims(tableau.num_qubits(), topology)?;
    if !topology.is_connected() {
        return Err(SynthError::InfeasibleTopology(
            "tableau synthesis needs a connected topology".into(),
        ));
    }

    let mut reducer = Reducer::new(tableau.clone(), topology);
    reducer.run()?;

    let mut circuit = Circuit::new(tableau.num_qubits());
    for gate in reducer.applied.iter().rev() {
        circuit.push(gate.inverse())?;
    }
    let cost = circuit.cx_count();
    debug!(cost, gates = circuit.len(), "synthesized tableau");
    Ok(TableauSynthesis { circuit, cost })
}

/// Inverse of a Clifford, computed by synthesizing it on a complete graph
/// and replaying the reversed circuit.
pub fn tableau_inverse(tableau: &CliffordTableau) -> SynthResult<CliffordTableau> {
    let topology = Topology::complete(tableau.num_qubits());
    let synthesis = synthesize_tableau(tableau, &topology)?;
    Ok(CliffordTableau::from_circuit(&synthesis.circuit.inverse())?)
}

struct Reducer<'a> {
    work: CliffordTableau,
    topology: &'a Topology,
    alive: Vec<bool>,
    applied: Vec<Gate>,
}

impl<'a> Reducer<'a> {
    fn new(work: CliffordTableau, topology: &'a Topology) -> Self {
        let n = work.num_qubits() as usize;
        Self {
            work,
            topology,
            alive: vec![true; n],
            applied: vec![],
        }
    }

    fn n(&self) -> usize {
        self.work.num_qubits() as usize
    }

    fn apply(&mut self, gate: Gate) -> SynthResult<()> {
        self.work.apply_gate(&gate)?;
        self.applied.push(gate);
        Ok(())
    }

    fn run(&mut self) -> SynthResult<()> {
        for _ in 0..self.n() {
            let pivot = self.next_pivot()?;
            trace!(pivot, "eliminating qubit");
            self.reduce_x_row(pivot)?;
            self.reduce_z_row(pivot)?;
            self.alive[pivot as usize] = false;
        }
        self.fix_signs()?;
        debug_assert_eq!(self.work, CliffordTableau::identity(self.n() as u32));
        Ok(())
    }

    /// Alive, non-cutting qubit whose two rows sit closest to it.
    fn next_pivot(&self) -> SynthResult<u32> {
        let n = self.n();
        let mut best: Option<(u32, u64)> = None;
        for q in 0..n as u32 {
            if !self.alive[q as usize] || self.topology.is_cutting(q, &self.alive) {
                continue;
            }
            let (dist, _) = self.topology.bfs_within(&[q], &self.alive);
            let spread: u64 = [q as usize, n + q as usize]
                .iter()
                .flat_map(|&row| {
                    (0..n).filter(move |&c| self.alive[c] && self.work.pauli(row, c) != Pauli::I)
                })
                .map(|c| u64::from(dist[c]))
                .sum();
            if best.is_none_or(|(_, s)| spread < s) {
                best = Some((q, spread));
            }
        }
        best.map(|(q, _)| q)
            .ok_or_else(|| SynthError::InfeasibleTopology("no removable pivot".into()))
    }

    /// Alive qubits other than `pivot` where `row` acts non-trivially,
    /// preceded by `pivot`.
    fn terminals(&self, row: usize, pivot: u32) -> Vec<u32> {
        let mut terminals = vec![pivot];
        terminals.extend(
            (0..self.n() as u32)
                .filter(|&q| q != pivot && self.alive[q as usize])
                .filter(|&q| self.work.pauli(row, q as usize) != Pauli::I),
        );
        terminals
    }

    /// Bring the image of `X_p` to `±X_p`.
    fn reduce_x_row(&mut self, pivot: u32) -> SynthResult<()> {
        let row = pivot as usize;
        for q in 0..self.n() as u32 {
            if !self.alive[q as usize] {
                continue;
            }
            match self.work.pauli(row, q as usize) {
                Pauli::Z => self.apply(Gate::h(q))?,
                Pauli::Y => self.apply(Gate::s(q))?,
                Pauli::X | Pauli::I => {}
            }
        }

        let terminals = self.terminals(row, pivot);
        let tree = self.topology.steiner_tree(pivot, &terminals, &self.alive)?;
        for &(u, w) in tree.edges().iter().rev() {
            if !self.work.x_bit(row, u as usize) && self.work.x_bit(row, w as usize) {
                self.apply(Gate::cx(w, u))?;
            }
        }
        for &(u, w) in tree.edges().iter().rev() {
            self.apply(Gate::cx(u, w))?;
        }
        debug_assert!((0..self.n()).all(|q| self.work.pauli(row, q)
            == if q == row { Pauli::X } else { Pauli::I }));
        Ok(())
    }

    /// Bring the image of `Z_p` to `±Z_p`, leaving row `p` untouched.
    fn reduce_z_row(&mut self, pivot: u32) -> SynthResult<()> {
        let row = self.n() + pivot as usize;
        for q in 0..self.n() as u32 {
            if !self.alive[q as usize] {
                continue;
            }
            match (self.work.pauli(row, q as usize), q == pivot) {
                (Pauli::Y, true) => self.apply(Gate::V { qubit: q.into() })?,
                (Pauli::X, false) => self.apply(Gate::h(q))?,
                (Pauli::Y, false) => {
                    self.apply(Gate::s(q))?;
                    self.apply(Gate::h(q))?;
                }
                _ => {}
            }
        }

        let terminals = self.terminals(row, pivot);
        let tree = self.topology.steiner_tree(pivot, &terminals, &self.alive)?;
        // the pivot's entry is Z, so no fill step has the pivot as control
        for &(u, w) in tree.edges().iter().rev() {
            if !self.work.z_bit(row, u as usize) && self.work.z_bit(row, w as usize) {
                self.apply(Gate::cx(u, w))?;
            }
        }
        for &(u, w) in tree.edges().iter().rev() {
            self.apply(Gate::cx(w, u))?;
        }
        debug_assert!((0..self.n()).all(|q| self.work.pauli(row, q)
            == if q == pivot as usize { Pauli::Z } else { Pauli::I }));
        Ok(())
    }

    fn fix_signs(&mut self) -> SynthResult<()> {
        let n = self.n();
        for q in 0..n {
            if self.work.sign(q) {
                self.apply(Gate::Z { qubit: (q as u32).into() })?;
            }
            if self.work.sign(n + q) {
                self.apply(Gate::X { qubit: (q as u32).into() })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::RespectsTopology;

    fn replay(synthesis: &TableauSynthesis) -> CliffordTableau {
        CliffordTableau::from_circuit(&synthesis.circuit).unwrap()
    }

    #[test]
    fn test_identity_is_empty() {
        let tableau = CliffordTableau::identity(4);
        let result = synthesize_tableau(&tableau, &Topology::line(4)).unwrap();
        assert!(result.circuit.is_empty());
        assert_eq!(result.cost, 0);
    }

    #[test]
    fn test_routes_long_cnot_on_line() {
        let mut tableau = CliffordTableau::new(3);
        tableau.append_h(0).unwrap();
        tableau.append_cnot(0, 2).unwrap();
        tableau.append_s(1).unwrap();

        let line = Topology::line(3);
        let result = synthesize_tableau(&tableau, &line).unwrap();
        assert!(result.circuit.respects(&line));
        assert!(result.cost > 0);
        assert_eq!(result.cost, result.circuit.cx_count());
        assert_eq!(replay(&result), tableau);
    }

    #[test]
    fn test_signs_are_reproduced() {
        let mut tableau = CliffordTableau::new(2);
        tableau.append_x(0).unwrap();
        tableau.append_z(1).unwrap();
        tableau.append_h(1).unwrap();
        tableau.append_sdg(0).unwrap();

        let result = synthesize_tableau(&tableau, &Topology::line(2)).unwrap();
        assert_eq!(result.cost, 0);
        assert_eq!(replay(&result), tableau);
    }

    #[test]
    fn test_entangled_on_grid() {
        let mut tableau = CliffordTableau::new(4);
        tableau.append_h(0).unwrap();
        tableau.append_cnot(0, 3).unwrap();
        tableau.append_cnot(1, 2).unwrap();
        tableau.append_v(2).unwrap();
        tableau.append_cnot(3, 1).unwrap();
        tableau.append_y(3).unwrap();

        let grid = Topology::grid(2, 2).unwrap();
        let result = synthesize_tableau(&tableau, &grid).unwrap();
        assert!(result.circuit.respects(&grid));
        assert_eq!(replay(&result), tableau);
    }

    #[test]
    fn test_inverse() {
        let mut tableau = CliffordTableau::new(3);
        tableau.append_h(1).unwrap();
        tableau.append_cnot(1, 0).unwrap();
        tableau.append_s(2).unwrap();
        tableau.append_cnot(2, 1).unwrap();

        let inverse = tableau_inverse(&tableau).unwrap();
        let mut product = tableau.clone();
        let undo = synthesize_tableau(&inverse, &Topology::complete(3)).unwrap();
        for gate in undo.circuit.gates() {
            product.apply_gate(gate).unwrap();
        }
        assert_eq!(product, CliffordTableau::identity(3));
    }

    #[test]
    fn test_rejects_bad_topology() {
        let tableau = CliffordTableau::new(3);
        assert!(matches!(
            synthesize_tableau(&tableau, &Topology::line(4)),
            Err(SynthError::DimensionMismatch { .. })
        ));
        let split = Topology::from_edges(3, [(0, 1)]).unwrap();
        assert!(matches!(
            synthesize_tableau(&tableau, &split),
            Err(SynthError::InfeasibleTopology(_))
        ));
    }
}
