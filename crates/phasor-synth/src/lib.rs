//! Phasor Architecture-Aware Synthesis
//!
//! This crate turns the abstract objects of [`phasor_ir`] into gate sequences
//! whose every CNOT acts on an edge of a device [`Topology`].
//!
//! # Overview
//!
//! - **Topology**: qubit connectivity graph with all-pairs distances,
//!   neighbour queries and approximate Steiner trees
//! - **Gadget synthesis**: one Steiner CNOT ladder per phase or Pauli gadget
//! - **Annealing optimizer**: [`optimize_phase_circuit`] interleaves CNOT
//!   layers with the gadgets of a [`PhaseCircuit`](phasor_ir::PhaseCircuit)
//!   and searches for a cheap arrangement with simulated annealing
//! - **Pauli polynomial synthesis**: [`synthesize_pauli_polynomial`] shares
//!   CNOT conjugations between commuting Pauli gadgets, Gray-code style
//! - **Linear synthesis**: [`steiner_gauss`] for CNOT-only circuits
//! - **Tableau synthesis**: [`synthesize_tableau`] for Clifford tableaux
//!
//! ```text
//! PhaseCircuit ──► PhaseCircuitOptimizer ──┐
//!                                          ├──► Circuit (topology edges only)
//! CliffordTableau ─► synthesize_tableau ───┘
//!                         ▲
//!                      Topology
//! ```
//!
//! # Example: Optimizing a Phase Circuit
//!
//! ```rust
//! use phasor_ir::{Basis, PhaseCircuit};
//! use phasor_synth::{AnnealSchedule, RespectsTopology, Topology, optimize_phase_circuit};
//! use std::f64::consts::PI;
//!
//! let mut circuit = PhaseCircuit::new(4);
//! circuit.append_gadget(PI / 2.0, Basis::Z, [0, 1]).unwrap();
//! circuit.append_gadget(PI, Basis::X, [0, 2]).unwrap();
//!
//! let ring = Topology::cycle(4);
//! let schedule = AnnealSchedule::with_iterations(200);
//! let result = optimize_phase_circuit(&circuit, &ring, 2, 42, Some(schedule)).unwrap();
//!
//! assert!(result.circuit.respects(&ring));
//! assert!(result.cost <= result.initial_cost);
//! ```
//!
//! # Example: Synthesizing a Clifford Tableau
//!
//! ```rust
//! use phasor_ir::CliffordTableau;
//! use phasor_synth::{RespectsTopology, Topology, synthesize_tableau};
//!
//! let mut tableau = CliffordTableau::new(3);
//! tableau.append_h(0).unwrap();
//! tableau.append_cnot(0, 2).unwrap();
//!
//! let line = Topology::line(3);
//! let result = synthesize_tableau(&tableau, &line).unwrap();
//! assert!(result.circuit.respects(&line));
//! assert_eq!(CliffordTableau::from_circuit(&result.circuit).unwrap(), tableau);
//! ```

pub mod anneal;
pub mod config;
pub mod error;
pub mod gadget_synth;
pub mod linear;
pub mod pauli_synth;
pub mod tableau_synth;
pub mod topology;
pub mod unitary;

pub use anneal::{OptimizedCircuit, PhaseCircuitOptimizer, optimize_phase_circuit};
pub use config::AnnealSchedule;
pub use error::{SynthError, SynthResult};
pub use gadget_synth::{GadgetCostCache, GadgetSynthesis, ladder_cost, parity_ladder};
pub use linear::{parity_map, steiner_gauss, steiner_gauss_cost};
pub use pauli_synth::{PauliSynthesis, commuting_blocks, synthesize_pauli_polynomial};
pub use tableau_synth::{TableauSynthesis, synthesize_tableau, tableau_inverse};
pub use topology::{RespectsTopology, SteinerTree, Topology, TopologySpec};
pub use unitary::{
    DenseUnitary, StateVector, circuit_unitary, pauli_polynomial_unitary, phase_circuit_unitary,
};
