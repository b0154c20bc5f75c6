//! Gray-code style synthesis of Pauli polynomials.
//!
//! The polynomial is cut into blocks of mutually commuting gadgets. Inside a
//! block, gadgets are partitioned by the Pauli they carry on one qubit, the
//! qubit is conjugated away with CNOTs on topology edges, and the recursion
//! continues on each partition. Conjugations are shared by every gadget of a
//! partition, which is where the savings over one ladder per gadget come
//! from. Only non-cutting qubits of the live subgraph are eliminated, so all
//! routing stays inside it.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use phasor_ir::{Circuit, Gate, Pauli, PauliGadget, PauliPolynomial};

use crate::error::{SynthError, SynthResult};
use crate::gadget_synth::check_dims;
use crate::topology::Topology;

/// Result of [`synthesize_pauli_polynomial`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauliSynthesis {
    /// Topology-compliant circuit equal to the polynomial up to global phase.
    pub circuit: Circuit,
    /// Input gadget indices, in the order their rotations appear in `circuit`.
    pub order: Vec<usize>,
    /// Number of CNOTs in `circuit`.
    pub cost: usize,
}

/// Synthesize a Pauli polynomial with CNOTs on `topology` edges only.
///
/// Gadgets are only reordered across gadgets they commute with, so the
/// circuit implements the polynomial itself. `order` records the emitted
/// order.
#[instrument(skip(poly, topology), fields(num_qubits = poly.num_qubits(), gadgets = poly.len()))]
pub fn synthesize_pauli_polynomial(
    poly: &PauliPolynomial,
    topology: &Topology,
) -> SynthResult<PauliSynthesis> {
    check_dims(poly.num_qubits(), topology)?;
    if !poly.is_empty() && !topology.is_connected() {
        return Err(SynthError::InfeasibleTopology(
            "pauli polynomial synthesis needs a connected topology".into(),
        ));
    }

    let blocks = commuting_blocks(poly);
    let mut synth = GraySynth::new(poly, topology);
    let alive = vec![true; poly.num_qubits() as usize];
    for block in &blocks {
        trace!(size = block.len(), "synthesizing commuting block");
        synth.identity_recurse(block.clone(), alive.clone())?;
    }

    let cost = synth.circuit.cx_count();
    debug!(
        cost,
        blocks = blocks.len(),
        gates = synth.circuit.len(),
        "synthesized pauli polynomial"
    );
    Ok(PauliSynthesis {
        circuit: synth.circuit,
        order: synth.order,
        cost,
    })
}

/// Split gadget indices into blocks of mutually commuting gadgets whose
/// concatenation is equivalent to the polynomial.
///
/// The next gadget joins the open block when it commutes with every member.
/// A gadget further down is pulled forward into the block only when it also
/// commutes with every gadget it jumps over and has non-negative
/// [`mutual_legs`](PauliGadget::mutual_legs) with some member.
pub fn commuting_blocks(poly: &PauliPolynomial) -> Vec<Vec<usize>> {
    let gadgets = poly.gadgets();
    let mut remaining: Vec<usize> = (0..gadgets.len()).collect();
    let mut blocks = vec![];
    while !remaining.is_empty() {
        let mut block = vec![remaining[0]];
        let mut skipped: Vec<usize> = vec![];
        for &idx in &remaining[1..] {
            let gadget = &gadgets[idx];
            let fits = block.iter().all(|&b| gadgets[b].commutes(gadget))
                && skipped.iter().all(|&s| gadgets[s].commutes(gadget))
                && (skipped.is_empty()
                    || block.iter().any(|&b| gadgets[b].mutual_legs(gadget) >= 0));
            if fits {
                block.push(idx);
            } else {
                skipped.push(idx);
            }
        }
        blocks.push(block);
        remaining = skipped;
    }
    blocks
}

/// Gate that conjugates `pauli` into Z on `qubit`, if one is needed.
fn to_z_basis(pauli: Pauli, qubit: u32) -> Option<Gate> {
    match pauli {
        Pauli::X => Some(Gate::h(qubit)),
        Pauli::Y => Some(Gate::V {
            qubit: qubit.into(),
        }),
        Pauli::Z | Pauli::I => None,
    }
}

/// Image of `p` under the basis change taking `axis` to Z, sign dropped.
fn rotated(p: Pauli, axis: Pauli) -> Pauli {
    match (axis, p) {
        (Pauli::X, Pauli::X) | (Pauli::Y, Pauli::Y) => Pauli::Z,
        (Pauli::X, Pauli::Z) => Pauli::X,
        (Pauli::Y, Pauli::Z) => Pauli::Y,
        _ => p,
    }
}

/// Images of `(control, target)` under a CNOT, sign dropped.
fn cx_image(control: Pauli, target: Pauli) -> (Pauli, Pauli) {
    let (xc, zc) = control.bits();
    let (xt, zt) = target.bits();
    (Pauli::from_bits(xc, zc ^ zt), Pauli::from_bits(xt ^ xc, zt))
}

fn legs(ps: [Pauli; 2]) -> i64 {
    ps.iter().filter(|p| p.is_nontrivial()).count() as i64
}

/// Working state of one synthesis run.
///
/// Gadgets are kept in the frame of the gates emitted so far: emitting `U`
/// replaces a gadget string `P` by `U·P·U†`. Every recursion level undoes
/// its own conjugations, so siblings start from the same frame.
struct GraySynth<'a> {
    topology: &'a Topology,
    gadgets: Vec<PauliGadget>,
    circuit: Circuit,
    order: Vec<usize>,
}

impl<'a> GraySynth<'a> {
    fn new(poly: &PauliPolynomial, topology: &'a Topology) -> Self {
        Self {
            topology,
            gadgets: poly.gadgets().to_vec(),
            circuit: Circuit::new(poly.num_qubits()),
            order: Vec::with_capacity(poly.len()),
        }
    }

    fn pauli(&self, col: usize, qubit: u32) -> Pauli {
        self.gadgets[col].paulis()[qubit as usize]
    }

    /// Emit `gate` and conjugate the gadgets in `cols` by it.
    fn emit(&mut self, gate: Gate, cols: &[usize]) -> SynthResult<()> {
        for &col in cols {
            self.gadgets[col].propagate(&gate)?;
        }
        self.circuit.push(gate)?;
        Ok(())
    }

    /// Emit the inverse of `setup`. The gadgets it was applied to are
    /// finished by then and are not touched.
    fn undo(&mut self, setup: &[Gate]) -> SynthResult<()> {
        for gate in setup.iter().rev() {
            self.circuit.push(gate.inverse())?;
        }
        Ok(())
    }

    fn live_qubits(alive: &[bool]) -> Vec<u32> {
        (0..alive.len() as u32)
            .filter(|&q| alive[q as usize])
            .collect()
    }

    /// `cols` split by their Pauli on `qubit`, as `[I, X, Y, Z]`.
    fn partition(&self, cols: &[usize], qubit: u32) -> [Vec<usize>; 4] {
        let mut parts: [Vec<usize>; 4] = Default::default();
        for &col in cols {
            let slot = match self.pauli(col, qubit) {
                Pauli::I => 0,
                Pauli::X => 1,
                Pauli::Y => 2,
                Pauli::Z => 3,
            };
            parts[slot].push(col);
        }
        parts
    }

    /// Candidate whose Paulis across `cols` are most lopsided: the largest
    /// gap between the most and least frequent of I, X, Y, Z. Ties go to the
    /// earliest candidate.
    fn pick_row(&self, cols: &[usize], candidates: &[u32]) -> Option<u32> {
        candidates
            .iter()
            .enumerate()
            .max_by_key(|&(i, &q)| {
                let counts = self.partition(cols, q).map(|part| part.len());
                let spread = counts.iter().max().copied().unwrap_or(0)
                    - counts.iter().min().copied().unwrap_or(0);
                (spread, Reverse(i))
            })
            .map(|(_, &q)| q)
    }

    /// Synthesize `cols`, whose supports lie in the connected live set.
    fn identity_recurse(&mut self, cols: Vec<usize>, alive: Vec<bool>) -> SynthResult<()> {
        if cols.is_empty() {
            return Ok(());
        }
        let mut setup = vec![];
        self.reduce_pairs(&cols, &alive, &mut setup)?;

        let candidates: Vec<u32> = Self::live_qubits(&alive)
            .into_iter()
            .filter(|&q| !self.topology.is_cutting(q, &alive))
            .collect();
        let row = self
            .pick_row(&cols, &candidates)
            .ok_or_else(|| SynthError::InfeasibleTopology("no removable qubit".into()))?;
        let [ident, xs, ys, zs] = self.partition(&cols, row);

        let mut rest = alive.clone();
        rest[row as usize] = false;
        self.identity_recurse(ident, rest)?;

        for (pauli, group) in [(Pauli::X, xs), (Pauli::Y, ys), (Pauli::Z, zs)] {
            if group.is_empty() {
                continue;
            }
            let basis: Vec<Gate> = to_z_basis(pauli, row).into_iter().collect();
            for gate in &basis {
                self.emit(gate.clone(), &group)?;
            }
            self.pauli_recurse(group, alive.clone(), row)?;
            self.undo(&basis)?;
        }
        self.undo(&setup)
    }

    /// Synthesize `cols`, which all carry Z on `row`. Legs elsewhere are
    /// folded towards `row` until only the rotation on `row` is left.
    fn pauli_recurse(&mut self, cols: Vec<usize>, alive: Vec<bool>, row: u32) -> SynthResult<()> {
        let (done, cols): (Vec<usize>, Vec<usize>) = cols
            .into_iter()
            .partition(|&c| self.gadgets[c].num_legs() == 1);
        for col in done {
            debug_assert_eq!(self.pauli(col, row), Pauli::Z);
            self.circuit.rz(self.gadgets[col].angle().clone(), row)?;
            self.order.push(col);
        }
        if cols.is_empty() {
            return Ok(());
        }

        let (dist, _) = self.topology.bfs_within(&[row], &alive);
        let mut candidates: Vec<u32> = Self::live_qubits(&alive)
            .into_iter()
            .filter(|&q| q != row && !self.topology.is_cutting(q, &alive))
            .collect();
        // farthest first
        candidates.sort_by_key(|&q| (Reverse(dist[q as usize]), q));
        let v = self.pick_row(&cols, &candidates).ok_or_else(|| {
            SynthError::InfeasibleTopology(format!("no removable qubit besides {row}"))
        })?;
        let [ident, xs, ys, zs] = self.partition(&cols, v);

        let mut rest = alive;
        rest[v as usize] = false;
        if !ident.is_empty() {
            self.pauli_recurse(ident, rest.clone(), row)?;
        }
        for (pauli, group) in [(Pauli::X, xs), (Pauli::Y, ys), (Pauli::Z, zs)] {
            if group.is_empty() {
                continue;
            }
            let basis: Vec<Gate> = to_z_basis(pauli, v).into_iter().collect();
            for gate in &basis {
                self.emit(gate.clone(), &group)?;
            }
            self.fold_leg(group, &rest, v, row, &dist)?;
            self.undo(&basis)?;
        }
        Ok(())
    }

    /// Move the Z leg on `v` onto a live neighbour, then continue on `rest`.
    fn fold_leg(
        &mut self,
        cols: Vec<usize>,
        rest: &[bool],
        v: u32,
        row: u32,
        dist: &[u32],
    ) -> SynthResult<()> {
        let u = self
            .topology
            .neighbors(v)
            .iter()
            .copied()
            .filter(|&u| rest[u as usize])
            .min_by_key(|&u| {
                let idle = cols.iter().filter(|&&c| self.pauli(c, u) == Pauli::I).count();
                (u != row, idle, dist[u as usize], u)
            })
            .ok_or_else(|| {
                SynthError::InfeasibleTopology(format!("qubit {v} has no live neighbour"))
            })?;
        trace!(from = v, to = u, gadgets = cols.len(), "folding leg");

        if u == row {
            let cx = [Gate::cx(v, row)];
            self.emit(cx[0].clone(), &cols)?;
            self.pauli_recurse(cols, rest.to_vec(), row)?;
            return self.undo(&cx);
        }

        let [ident, xs, ys, zs] = self.partition(&cols, u);
        for (pauli, group) in [
            (Pauli::I, ident),
            (Pauli::X, xs),
            (Pauli::Y, ys),
            (Pauli::Z, zs),
        ] {
            if group.is_empty() {
                continue;
            }
            let setup: Vec<Gate> = if pauli == Pauli::I {
                vec![Gate::cx(u, v), Gate::cx(v, u)]
            } else {
                to_z_basis(pauli, u)
                    .into_iter()
                    .chain([Gate::cx(v, u)])
                    .collect()
            };
            for gate in &setup {
                self.emit(gate.clone(), &group)?;
            }
            self.pauli_recurse(group, rest.to_vec(), row)?;
            self.undo(&setup)?;
        }
        Ok(())
    }

    /// Greedily conjugate live edges by a CNOT, with basis changes on both
    /// ends, wherever that empties one endpoint on every gadget in `cols`
    /// and removes legs overall. Each qubit takes part in at most one pair.
    fn reduce_pairs(
        &mut self,
        cols: &[usize],
        alive: &[bool],
        setup: &mut Vec<Gate>,
    ) -> SynthResult<()> {
        let axes = [Pauli::X, Pauli::Y, Pauli::Z];
        let mut used = vec![false; alive.len()];
        loop {
            let mut best: Option<(i64, u32, u32, Pauli, Pauli)> = None;
            for &(a, b) in self.topology.edges() {
                let free = |q: u32| alive[q as usize] && !used[q as usize];
                if !free(a) || !free(b) {
                    continue;
                }
                for (c, t) in [(a, b), (b, a)] {
                    for pc in axes {
                        for pt in axes {
                            let Some(saved) = self.pair_saving(cols, c, t, pc, pt) else {
                                continue;
                            };
                            if best.is_none_or(|(s, ..)| saved > s) {
                                best = Some((saved, c, t, pc, pt));
                            }
                        }
                    }
                }
            }
            let Some((saved, c, t, pc, pt)) = best else {
                return Ok(());
            };
            trace!(control = c, target = t, saved, "pair reduction");
            let gates: Vec<Gate> = to_z_basis(pc, c)
                .into_iter()
                .chain(to_z_basis(pt, t))
                .chain([Gate::cx(c, t)])
                .collect();
            for gate in gates {
                self.emit(gate.clone(), cols)?;
                setup.push(gate);
            }
            used[c as usize] = true;
            used[t as usize] = true;
        }
    }

    /// Legs removed by the pair conjugation, if it empties `c` or `t` and
    /// removes at least one leg.
    fn pair_saving(&self, cols: &[usize], c: u32, t: u32, pc: Pauli, pt: Pauli) -> Option<i64> {
        let (mut saved, mut c_used, mut t_used) = (0, false, false);
        for &col in cols {
            let before = [self.pauli(col, c), self.pauli(col, t)];
            let (pc_after, pt_after) = cx_image(rotated(before[0], pc), rotated(before[1], pt));
            saved += legs(before) - legs([pc_after, pt_after]);
            c_used |= pc_after.is_nontrivial();
            t_used |= pt_after.is_nontrivial();
        }
        (saved > 0 && !(c_used && t_used)).then_some(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gadget_synth::GadgetSynthesis;
    use crate::topology::RespectsTopology;
    use crate::unitary::{build_unitary, circuit_unitary, pauli_polynomial_unitary};

    fn poly(num_qubits: u32, terms: &[(f64, &str)]) -> PauliPolynomial {
        let mut poly = PauliPolynomial::new(num_qubits);
        for &(angle, string) in terms {
            poly.append(PauliGadget::parse(angle, string).unwrap().unwrap())
                .unwrap();
        }
        poly
    }

    fn assert_equivalent(poly: &PauliPolynomial, result: &PauliSynthesis) {
        let expected = pauli_polynomial_unitary(poly).unwrap();
        assert!(
            circuit_unitary(&result.circuit)
                .unwrap()
                .equals_up_to_phase(&expected)
        );
        let mut order = result.order.clone();
        order.sort_unstable();
        assert_eq!(order, (0..poly.len()).collect::<Vec<_>>());
        assert_eq!(result.cost, result.circuit.cx_count());
    }

    #[test]
    fn test_single_z_gadget_on_line() {
        let p = poly(3, &[(0.7, "ZZZ")]);
        let line = Topology::line(3);
        let result = synthesize_pauli_polynomial(&p, &line).unwrap();
        assert!(result.circuit.respects(&line));
        assert_eq!(result.cost, 4);
        assert_equivalent(&p, &result);
    }

    #[test]
    fn test_mixed_legs() {
        let p = poly(3, &[(0.4, "XYZ"), (-1.1, "YIX")]);
        let line = Topology::line(3);
        let result = synthesize_pauli_polynomial(&p, &line).unwrap();
        assert!(result.circuit.respects(&line));
        assert_equivalent(&p, &result);
    }

    #[test]
    fn test_shared_structure_beats_per_gadget_ladders() {
        let p = poly(4, &[(0.1, "ZZII"), (0.2, "ZZZI"), (0.3, "ZZZZ")]);
        let line = Topology::line(4);
        let result = synthesize_pauli_polynomial(&p, &line).unwrap();
        assert!(result.circuit.respects(&line));
        assert_eq!(p.two_qubit_count(&line).unwrap(), 12);
        assert!(result.cost < 12, "cost {}", result.cost);
        assert_equivalent(&p, &result);
    }

    #[test]
    fn test_non_commuting_gadgets_keep_their_order() {
        let p = poly(3, &[(0.3, "XXI"), (0.5, "ZIZ"), (0.9, "IYY"), (0.2, "XXI")]);
        let star = Topology::star(3);
        let result = synthesize_pauli_polynomial(&p, &star).unwrap();
        assert!(result.circuit.respects(&star));
        assert_equivalent(&p, &result);
    }

    #[test]
    fn test_routes_around_cutting_qubits() {
        // Legs on both ends of a line must travel through the middle.
        let p = poly(5, &[(0.6, "XIIIZ"), (0.8, "ZIIIZ"), (-0.3, "IIYII")]);
        let line = Topology::line(5);
        let result = synthesize_pauli_polynomial(&p, &line).unwrap();
        assert!(result.circuit.respects(&line));
        assert_equivalent(&p, &result);
    }

    #[test]
    fn test_empty_and_errors() {
        let empty = PauliPolynomial::new(3);
        let split = Topology::from_edges(3, [(0, 1)]).unwrap();
        let result = synthesize_pauli_polynomial(&empty, &split).unwrap();
        assert!(result.circuit.is_empty());

        let p = poly(3, &[(0.1, "ZIZ")]);
        assert!(matches!(
            synthesize_pauli_polynomial(&p, &split),
            Err(SynthError::InfeasibleTopology(_))
        ));
        assert!(matches!(
            synthesize_pauli_polynomial(&p, &Topology::line(4)),
            Err(SynthError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_commuting_blocks() {
        // IZ is hoisted past XI: it commutes with it and shares a leg with ZZ
        let p = poly(2, &[(0.1, "ZZ"), (0.1, "XI"), (0.1, "IZ"), (0.1, "IX")]);
        assert_eq!(commuting_blocks(&p), vec![vec![0, 2], vec![1, 3]]);

        // IIZ commutes with everything but shares nothing with ZZI
        let p = poly(3, &[(0.1, "ZZI"), (0.1, "XII"), (0.1, "IIZ")]);
        assert_eq!(commuting_blocks(&p), vec![vec![0], vec![1, 2]]);

        let p = poly(3, &[(0.1, "ZII"), (0.1, "IIZ"), (0.1, "ZZZ")]);
        assert_eq!(commuting_blocks(&p), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_propagation_matches_conjugation() {
        let gates = [
            Gate::h(0u32),
            Gate::s(1u32),
            Gate::sdg(0u32),
            Gate::V { qubit: 1u32.into() },
            Gate::Vdg { qubit: 0u32.into() },
            Gate::X { qubit: 1u32.into() },
            Gate::Y { qubit: 0u32.into() },
            Gate::Z { qubit: 1u32.into() },
            Gate::cx(0u32, 1u32),
            Gate::cx(1u32, 0u32),
            Gate::rz(std::f64::consts::FRAC_PI_2, 1u32),
        ];
        let strings = ["XI", "YZ", "ZY", "XX", "IY", "YY"];
        for gate in &gates {
            for string in strings {
                let gadget = PauliGadget::parse(0.7, string).unwrap().unwrap();
                let mut moved = gadget.clone();
                moved.propagate(gate).unwrap();
                let legs_of = |g: &PauliGadget| -> Vec<(u32, Pauli)> {
                    g.paulis()
                        .iter()
                        .enumerate()
                        .map(|(q, &p)| (q as u32, p))
                        .collect()
                };

                // U†·exp(-iθ'/2·P')·U, applied right to left
                let conjugated = build_unitary(2, |state| {
                    state.apply_gate(gate)?;
                    state.apply_pauli_rotation(&legs_of(&moved), moved.angle())?;
                    state.apply_gate(&gate.inverse())
                })
                .unwrap();
                let direct = build_unitary(2, |state| {
                    state.apply_pauli_rotation(&legs_of(&gadget), gadget.angle())
                })
                .unwrap();
                assert!(
                    conjugated.equals_up_to_phase(&direct),
                    "{gate} on {string} gave {moved}"
                );
            }
        }
    }
}
