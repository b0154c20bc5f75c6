//! Simulated-annealing optimization of phase circuits.
//!
//! The optimizer searches over three things at once:
//!
//! - the gadget order, changed by swapping adjacent commuting gadgets,
//! - `L` cut points splitting the order into `L + 1` segments,
//! - one invertible parity matrix `A_k` per CNOT layer between segments.
//!
//! Segment `b` is applied in the frame `M_b = A_b ⋯ A_1`: a Z gadget on
//! support `s` becomes a Z gadget on `(M_b⁻¹)ᵀ·s`, an X gadget becomes one
//! on `M_b·s`. A final layer synthesized from `M_L⁻¹` restores the frame, so
//! the output implements the input circuit exactly with the identity qubit
//! permutation. The cost of a state is the total CNOT count: every layer and
//! the undo layer through Steiner–Gauss, every gadget through its Steiner
//! ladder.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};

use phasor_ir::{Basis, BitMatrix, Circuit, Gadget, PhaseCircuit};

use crate::config::AnnealSchedule;
use crate::error::{SynthError, SynthResult};
use crate::gadget_synth::{GadgetCostCache, append_gadget_circuit, check_dims, gadget_is_routable};
use crate::linear::steiner_gauss;
use crate::topology::Topology;

/// Result of [`optimize_phase_circuit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedCircuit {
    /// The synthesized, topology-compliant circuit.
    pub circuit: Circuit,
    /// CNOT count of `circuit`.
    pub cost: usize,
    /// CNOT count of the starting state (gadgets synthesized in input order
    /// without CNOT layers).
    pub initial_cost: usize,
    /// Output qubit `i` carries logical qubit `permutation[i]`. Always the
    /// identity.
    pub permutation: Vec<u32>,
}

/// Optimize a phase circuit for `topology`.
///
/// Runs simulated annealing with `num_cx_layers` CNOT layers, seeded with
/// `seed`. Identical inputs produce identical outputs.
pub fn optimize_phase_circuit(
    circuit: &PhaseCircuit,
    topology: &Topology,
    num_cx_layers: usize,
    seed: u64,
    schedule: Option<AnnealSchedule>,
) -> SynthResult<OptimizedCircuit> {
    let optimizer = PhaseCircuitOptimizer::new(topology, num_cx_layers)?
        .with_schedule(schedule.unwrap_or_default())?;
    optimizer.optimize(circuit, seed)
}

/// Reusable annealing optimizer bound to one topology.
#[derive(Debug, Clone)]
pub struct PhaseCircuitOptimizer<'a> {
    topology: &'a Topology,
    num_cx_layers: usize,
    schedule: AnnealSchedule,
}

impl<'a> PhaseCircuitOptimizer<'a> {
    /// Optimizer with the default schedule.
    pub fn new(topology: &'a Topology, num_cx_layers: usize) -> SynthResult<Self> {
        if num_cx_layers == 0 {
            return Err(SynthError::InvalidConfig(
                "num_cx_layers must be at least 1".into(),
            ));
        }
        Ok(Self {
            topology,
            num_cx_layers,
            schedule: AnnealSchedule::default(),
        })
    }

    /// Replace the annealing schedule.
    pub fn with_schedule(mut self, schedule: AnnealSchedule) -> SynthResult<Self> {
        schedule.validate()?;
        self.schedule = schedule;
        Ok(self)
    }

    /// The active schedule.
    pub fn schedule(&self) -> &AnnealSchedule {
        &self.schedule
    }

    /// Optimize with a `StdRng` seeded from `seed`.
    pub fn optimize(&self, circuit: &PhaseCircuit, seed: u64) -> SynthResult<OptimizedCircuit> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.optimize_with_rng(circuit, &mut rng)
    }

    /// Optimize with a caller-supplied random source.
    #[instrument(skip(self, circuit, rng), fields(gadgets = circuit.len(), layers = self.num_cx_layers))]
    pub fn optimize_with_rng<R: Rng>(
        &self,
        circuit: &PhaseCircuit,
        rng: &mut R,
    ) -> SynthResult<OptimizedCircuit> {
        let topology = self.topology;
        check_dims(circuit.num_qubits(), topology)?;
        if let Some(g) = circuit
            .gadgets()
            .iter()
            .find(|g| !gadget_is_routable(g, topology))
        {
            return Err(SynthError::InfeasibleTopology(format!(
                "gadget {g} spans disconnected qubits"
            )));
        }

        let n = topology.num_qubits();
        let permutation: Vec<u32> = (0..n).collect();
        if circuit.is_empty() {
            return Ok(OptimizedCircuit {
                circuit: Circuit::new(n),
                cost: 0,
                initial_cost: 0,
                permutation,
            });
        }

        let gadgets = circuit.gadgets();
        let mut model = CostModel::new(topology);
        let mut current = AnnealState::initial(gadgets.len(), self.num_cx_layers, n as usize);
        let mut current_cost = model.cost(gadgets, &current)?;
        let initial_cost = current_cost;
        let mut best = current.clone();
        let mut best_cost = current_cost;
        let mut accepted = 0usize;

        for i in 0..self.schedule.iterations {
            let Some(candidate) = current.propose(gadgets, topology, rng) else {
                continue;
            };
            let candidate_cost = model.cost(gadgets, &candidate)?;
            let delta = candidate_cost as f64 - current_cost as f64;
            let temperature = self.schedule.temperature(i);
            let accept = delta <= 0.0 || rng.gen_bool((-delta / temperature).exp().clamp(0.0, 1.0));
            if !accept {
                continue;
            }
            accepted += 1;
            current = candidate;
            current_cost = candidate_cost;
            if current_cost < best_cost {
                best = current.clone();
                best_cost = current_cost;
                debug!(iteration = i, cost = best_cost, temperature, "new best state");
            }
        }

        let circuit_out = realize(gadgets, &best, topology)?;
        debug_assert_eq!(circuit_out.cx_count(), best_cost);
        let (hits, misses) = model.gadget_costs.stats();
        trace!(hits, misses, "gadget cost cache");
        info!(
            initial_cost,
            cost = best_cost,
            accepted,
            iterations = self.schedule.iterations,
            "annealing finished"
        );

        Ok(OptimizedCircuit {
            cost: circuit_out.cx_count(),
            circuit: circuit_out,
            initial_cost,
            permutation,
        })
    }
}

// =============================================================================
// Search state
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
struct AnnealState {
    /// Gadget indices in application order.
    order: Vec<usize>,
    /// Non-decreasing segment boundaries in `0..=order.len()`.
    cuts: Vec<usize>,
    /// Parity matrix of each CNOT layer.
    layers: Vec<BitMatrix>,
}

impl AnnealState {
    fn initial(num_gadgets: usize, num_layers: usize, num_qubits: usize) -> Self {
        let cuts = (1..=num_layers)
            .map(|k| ((k * num_gadgets) as f64 / (num_layers + 1) as f64).round() as usize)
            .collect();
        Self {
            order: (0..num_gadgets).collect(),
            cuts,
            layers: vec![BitMatrix::identity(num_qubits); num_layers],
        }
    }

    /// Segment bounds `[0, cuts.., len]`.
    fn bounds(&self) -> Vec<usize> {
        let mut bounds = Vec::with_capacity(self.cuts.len() + 2);
        bounds.push(0);
        bounds.extend_from_slice(&self.cuts);
        bounds.push(self.order.len());
        bounds
    }

    /// A random neighbouring state, or `None` if the drawn move is not
    /// applicable.
    fn propose<R: Rng>(&self, gadgets: &[Gadget], topology: &Topology, rng: &mut R) -> Option<Self> {
        let mut kinds = vec![];
        if self.order.len() >= 2 {
            kinds.push(MoveKind::Swap);
        }
        if !topology.edges().is_empty() {
            kinds.push(MoveKind::LayerOp);
        }
        kinds.push(MoveKind::ShiftCut);

        let mut next = self.clone();
        match kinds[rng.gen_range(0..kinds.len())] {
            MoveKind::Swap => {
                let i = rng.gen_range(0..self.order.len() - 1);
                let (a, b) = (&gadgets[self.order[i]], &gadgets[self.order[i + 1]]);
                if !a.commutes_with(b) {
                    return None;
                }
                next.order.swap(i, i + 1);
            }
            MoveKind::LayerOp => {
                let layer = rng.gen_range(0..self.layers.len());
                let (a, b) = topology.edges()[rng.gen_range(0..topology.edges().len())];
                let (control, target) = if rng.gen_bool(0.5) { (a, b) } else { (b, a) };
                next.layers[layer].add_row(control as usize, target as usize);
            }
            MoveKind::ShiftCut => {
                let k = rng.gen_range(0..self.cuts.len());
                let lower = if k == 0 { 0 } else { self.cuts[k - 1] };
                let upper = self.cuts.get(k + 1).copied().unwrap_or(self.order.len());
                let cut = self.cuts[k];
                let moved = if rng.gen_bool(0.5) {
                    cut.checked_sub(1).filter(|&c| c >= lower)
                } else {
                    Some(cut + 1).filter(|&c| c <= upper)
                };
                next.cuts[k] = moved?;
            }
        }
        Some(next)
    }
}

#[derive(Debug, Clone, Copy)]
enum MoveKind {
    Swap,
    LayerOp,
    ShiftCut,
}

// =============================================================================
// Realization
// =============================================================================

/// One piece of the realized circuit.
enum Block {
    /// CNOT layer with this parity map.
    Linear(BitMatrix),
    /// Gadget already mapped into the current frame.
    Rotation(Gadget),
}

/// Lay out the blocks of `state` in circuit order.
fn blocks(gadgets: &[Gadget], state: &AnnealState, num_qubits: usize) -> SynthResult<Vec<Block>> {
    let bounds = state.bounds();
    let mut out = Vec::with_capacity(gadgets.len() + state.layers.len() + 1);
    let mut frame = BitMatrix::identity(num_qubits);

    for segment in 0..bounds.len() - 1 {
        let z_frame = if segment == 0 {
            None
        } else {
            let layer = &state.layers[segment - 1];
            out.push(Block::Linear(layer.clone()));
            frame = layer.mul(&frame);
            Some(frame.inverse().ok_or(SynthError::SingularMatrix)?.transpose())
        };
        for &idx in &state.order[bounds[segment]..bounds[segment + 1]] {
            let gadget = &gadgets[idx];
            let mapped = match (&z_frame, gadget.basis()) {
                (None, _) => gadget.clone(),
                (Some(z), Basis::Z) => map_support(gadget, z)?,
                (Some(_), Basis::X) => map_support(gadget, &frame)?,
            };
            out.push(Block::Rotation(mapped));
        }
    }
    out.push(Block::Linear(
        frame.inverse().ok_or(SynthError::SingularMatrix)?,
    ));
    Ok(out)
}

fn map_support(gadget: &Gadget, matrix: &BitMatrix) -> SynthResult<Gadget> {
    let bits = matrix.mul_vec(&gadget.support_bits(matrix.cols()));
    gadget
        .with_support_bits(&bits)
        .ok_or(SynthError::SingularMatrix)
}

/// Build the circuit of `state`.
fn realize(gadgets: &[Gadget], state: &AnnealState, topology: &Topology) -> SynthResult<Circuit> {
    let n = topology.num_qubits();
    let mut circuit = Circuit::new(n);
    for block in blocks(gadgets, state, n as usize)? {
        match block {
            Block::Linear(matrix) => {
                circuit.extend(&steiner_gauss(&matrix, topology)?)?;
            }
            Block::Rotation(gadget) => append_gadget_circuit(&mut circuit, &gadget, topology)?,
        }
    }
    Ok(circuit)
}

/// CNOT cost evaluation with memoized gadget and layer costs.
struct CostModel<'a> {
    topology: &'a Topology,
    gadget_costs: GadgetCostCache,
    layer_costs: FxHashMap<BitMatrix, usize>,
}

impl<'a> CostModel<'a> {
    fn new(topology: &'a Topology) -> Self {
        Self {
            topology,
            gadget_costs: GadgetCostCache::new(),
            layer_costs: FxHashMap::default(),
        }
    }

    fn cost(&mut self, gadgets: &[Gadget], state: &AnnealState) -> SynthResult<usize> {
        let n = self.topology.num_qubits() as usize;
        let mut total = 0;
        for block in blocks(gadgets, state, n)? {
            total += match block {
                Block::Linear(matrix) => self.layer_cost(matrix)?,
                Block::Rotation(gadget) => self.gadget_costs.cost(gadget.qubits(), self.topology)?,
            };
        }
        Ok(total)
    }

    fn layer_cost(&mut self, matrix: BitMatrix) -> SynthResult<usize> {
        if let Some(&cost) = self.layer_costs.get(&matrix) {
            return Ok(cost);
        }
        let cost = steiner_gauss(&matrix, self.topology)?.cx_count();
        self.layer_costs.insert(matrix, cost);
        Ok(cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn small_schedule() -> AnnealSchedule {
        AnnealSchedule::with_iterations(200)
    }

    #[test]
    fn test_empty_circuit() {
        let result =
            optimize_phase_circuit(&PhaseCircuit::new(4), &Topology::cycle(4), 1, 7, None).unwrap();
        assert!(result.circuit.is_empty());
        assert_eq!(result.cost, 0);
        assert_eq!(result.permutation, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_zero_layers_rejected() {
        let ring = Topology::cycle(4);
        assert!(matches!(
            PhaseCircuitOptimizer::new(&ring, 0),
            Err(SynthError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut pc = PhaseCircuit::new(3);
        pc.append_gadget(0.5, Basis::Z, [0, 1]).unwrap();
        assert!(matches!(
            optimize_phase_circuit(&pc, &Topology::line(4), 1, 0, None),
            Err(SynthError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_disconnected_support_rejected() {
        let split = Topology::from_edges(4, [(0, 1), (2, 3)]).unwrap();
        let mut pc = PhaseCircuit::new(4);
        pc.append_gadget(0.5, Basis::Z, [1, 2]).unwrap();
        assert!(matches!(
            optimize_phase_circuit(&pc, &split, 1, 0, None),
            Err(SynthError::InfeasibleTopology(_))
        ));
    }

    #[test]
    fn test_initial_state_cuts() {
        let state = AnnealState::initial(6, 2, 3);
        assert_eq!(state.cuts, vec![2, 4]);
        assert_eq!(state.bounds(), vec![0, 2, 4, 6]);
    }

    #[test]
    fn test_never_worse_than_initial() {
        let mut pc = PhaseCircuit::new(4);
        pc.append_gadget(PI / 4.0, Basis::Z, [0, 2]).unwrap();
        pc.append_gadget(PI / 4.0, Basis::Z, [0, 1, 2]).unwrap();
        pc.append_gadget(PI / 8.0, Basis::X, [1, 3]).unwrap();
        pc.append_gadget(PI / 8.0, Basis::Z, [2, 3]).unwrap();
        let ring = Topology::cycle(4);

        let result = optimize_phase_circuit(&pc, &ring, 2, 11, Some(small_schedule())).unwrap();
        assert!(result.cost <= result.initial_cost);
        assert_eq!(result.cost, result.circuit.cx_count());
    }

    #[test]
    fn test_identity_state_cost_matches_direct_synthesis() {
        use crate::gadget_synth::GadgetSynthesis;

        let mut pc = PhaseCircuit::new(5);
        pc.append_gadget(0.1, Basis::Z, [0, 4]).unwrap();
        pc.append_gadget(0.2, Basis::X, [1, 2, 3]).unwrap();
        let line = Topology::line(5);

        let state = AnnealState::initial(2, 1, 5);
        let mut model = CostModel::new(&line);
        let cost = model.cost(pc.gadgets(), &state).unwrap();
        assert_eq!(cost, pc.two_qubit_count(&line).unwrap());
        assert_eq!(realize(pc.gadgets(), &state, &line).unwrap().cx_count(), cost);
    }
}
