//! Topology-aware synthesis of CNOT circuits.
//!
//! A CNOT circuit is described by its parity map: an invertible matrix `A`
//! over GF(2) with `|x⟩ ↦ |A·x⟩`. Steiner–Gauss elimination reduces `A` to
//! the identity using only row additions along topology edges, one pivot at
//! a time, and reads the circuit off the recorded row operations.

use tracing::trace;

use phasor_ir::{BitMatrix, Circuit, Gate};

use crate::error::{SynthError, SynthResult};
use crate::topology::Topology;

/// Synthesize a CNOT circuit with parity map `matrix` on `topology`.
///
/// Every CNOT in the result acts on a topology edge.
pub fn steiner_gauss(matrix: &BitMatrix, topology: &Topology) -> SynthResult<Circuit> {
    let n = topology.num_qubits() as usize;
    if matrix.rows() != n || matrix.cols() != n {
        return Err(SynthError::DimensionMismatch {
            topology: topology.num_qubits(),
            input: matrix.rows().max(matrix.cols()) as u32,
        });
    }
    if !matrix.is_invertible() {
        return Err(SynthError::SingularMatrix);
    }
    for i in 0..n {
        for j in 0..n {
            if matrix.get(i, j) && !topology.same_component(i as u32, j as u32) {
                return Err(SynthError::InfeasibleTopology(format!(
                    "parity of qubit {j} flows into disconnected qubit {i}"
                )));
            }
        }
    }

    let ops = eliminate(matrix.clone(), topology)?;
    let mut circuit = Circuit::new(topology.num_qubits());
    for &(control, target) in ops.iter().rev() {
        circuit.push(Gate::cx(control, target))?;
    }
    trace!(cx = circuit.cx_count(), "steiner-gauss");
    Ok(circuit)
}

/// CNOT count of [`steiner_gauss`] without building the circuit.
pub fn steiner_gauss_cost(matrix: &BitMatrix, topology: &Topology) -> SynthResult<usize> {
    steiner_gauss(matrix, topology).map(|c| c.cx_count())
}

/// Parity map of a circuit made of CNOTs only.
pub fn parity_map(circuit: &Circuit) -> SynthResult<BitMatrix> {
    let n = circuit.num_qubits() as usize;
    let mut matrix = BitMatrix::identity(n);
    for gate in circuit.gates() {
        match gate {
            Gate::Cx { control, target } => matrix.add_row(control.index(), target.index()),
            other => {
                return Err(SynthError::InvalidConfig(format!(
                    "gate '{other}' is not a CNOT"
                )));
            }
        }
    }
    Ok(matrix)
}

/// Reduce `a` to the identity. Returns the row operations `(c, t)`, meaning
/// `row[t] ^= row[c]`, in the order they were applied.
fn eliminate(mut a: BitMatrix, topology: &Topology) -> SynthResult<Vec<(u32, u32)>> {
    let n = topology.num_qubits() as usize;
    let mut alive = vec![true; n];
    let mut ops = vec![];

    for _ in 0..n {
        let pivot = (0..n as u32)
            .find(|&q| alive[q as usize] && !topology.is_cutting(q, &alive))
            .ok_or_else(|| SynthError::InfeasibleTopology("no removable pivot".into()))?;
        let p = pivot as usize;

        // Column step: clear column p everywhere but row p.
        let mut terminals = vec![pivot];
        terminals.extend((0..n).filter(|&r| r != p && alive[r] && a.get(r, p)).map(|r| r as u32));
        let tree = topology.steiner_tree(pivot, &terminals, &alive)?;
        for &(u, w) in tree.edges().iter().rev() {
            if !a.get(u as usize, p) && a.get(w as usize, p) {
                add(&mut a, &mut ops, w, u);
            }
        }
        for &(u, w) in tree.edges().iter().rev() {
            add(&mut a, &mut ops, u, w);
        }
        debug_assert!((0..n).all(|r| a.get(r, p) == (r == p)));

        // Row step: add into row p the rows whose sum matches row p off the
        // diagonal.
        let others: Vec<usize> = (0..n).filter(|&q| q != p && alive[q]).collect();
        let rhs: Vec<bool> = others.iter().map(|&c| a.get(p, c)).collect();
        if rhs.iter().any(|&b| b) {
            let block = a.submatrix(&others, &others).transpose();
            let y = block.solve(&rhs).ok_or(SynthError::SingularMatrix)?;
            let mut terminals = vec![pivot];
            terminals.extend(
                others
                    .iter()
                    .zip(&y)
                    .filter(|&(_, &take)| take)
                    .map(|(&r, _)| r as u32),
            );
            let tree = topology.steiner_tree(pivot, &terminals, &alive)?;
            for &v in tree.vertices().iter().rev() {
                let children = tree.children(v);
                let Some((&first, rest)) = children.split_first() else {
                    continue;
                };
                if v != pivot && !tree.is_terminal(v) {
                    add(&mut a, &mut ops, v, first);
                    add(&mut a, &mut ops, first, v);
                } else {
                    add(&mut a, &mut ops, first, v);
                }
                for &c in rest {
                    add(&mut a, &mut ops, c, v);
                }
            }
        }
        debug_assert!((0..n).all(|c| a.get(p, c) == (c == p)));

        alive[p] = false;
    }

    debug_assert_eq!(a, BitMatrix::identity(n));
    Ok(ops)
}

fn add(a: &mut BitMatrix, ops: &mut Vec<(u32, u32)>, source: u32, target: u32) {
    a.add_row(source as usize, target as usize);
    ops.push((source, target));
}
