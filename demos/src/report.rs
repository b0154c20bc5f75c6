//! Job execution and JSON reports.

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use phasor_ir::Gate;
use phasor_synth::{
    GadgetSynthesis, optimize_phase_circuit, synthesize_pauli_polynomial, synthesize_tableau,
};

use crate::job::{AnnealJob, PauliJob, TableauJob};

/// Outcome of an anneal job.
#[derive(Debug, Clone, Serialize)]
pub struct AnnealReport {
    pub num_qubits: u32,
    pub gadgets: usize,
    /// CNOT count of synthesizing each gadget on its own.
    pub naive_cost: usize,
    /// CNOT count of the optimized circuit.
    pub cost: usize,
    pub permutation: Vec<u32>,
    pub gates: Vec<Gate>,
}

/// Outcome of a Pauli polynomial job.
#[derive(Debug, Clone, Serialize)]
pub struct PauliReport {
    pub num_qubits: u32,
    pub gadgets: usize,
    /// CNOT count of one Steiner ladder per gadget.
    pub naive_cost: usize,
    /// CNOT count of the synthesized circuit.
    pub cost: usize,
    /// Job gadget indices in emitted order.
    pub order: Vec<usize>,
    pub gates: Vec<Gate>,
}

/// Outcome of a tableau job.
#[derive(Debug, Clone, Serialize)]
pub struct TableauReport {
    pub num_qubits: u32,
    /// CNOT count of the job's own gate list.
    pub input_cost: usize,
    /// CNOT count of the synthesized circuit.
    pub cost: usize,
    pub gates: Vec<Gate>,
}

/// Run an anneal job.
pub fn run_anneal(job: &AnnealJob) -> Result<AnnealReport> {
    let circuit = job.phase_circuit()?;
    let naive_cost = circuit.two_qubit_count(&job.topology)?;
    let result = optimize_phase_circuit(&circuit, &job.topology, job.layers, job.seed, job.schedule)?;
    info!(naive_cost, cost = result.cost, "anneal job finished");

    Ok(AnnealReport {
        num_qubits: circuit.num_qubits(),
        gadgets: circuit.len(),
        naive_cost,
        cost: result.cost,
        permutation: result.permutation,
        gates: result.circuit.into_gates(),
    })
}

/// Run a Pauli polynomial job.
pub fn run_pauli(job: &PauliJob) -> Result<PauliReport> {
    let poly = job.polynomial()?;
    let naive_cost = poly.two_qubit_count(&job.topology)?;
    let result = synthesize_pauli_polynomial(&poly, &job.topology)?;
    info!(naive_cost, cost = result.cost, "pauli job finished");

    Ok(PauliReport {
        num_qubits: poly.num_qubits(),
        gadgets: poly.len(),
        naive_cost,
        cost: result.cost,
        order: result.order,
        gates: result.circuit.into_gates(),
    })
}

/// Run a tableau job.
pub fn run_tableau(job: &TableauJob) -> Result<TableauReport> {
    let tableau = job.tableau()?;
    let result = synthesize_tableau(&tableau, &job.topology)?;
    let input_cost = job
        .gates
        .iter()
        .filter(|g| matches!(g, Gate::Cx { .. }))
        .count();
    info!(input_cost, cost = result.cost, "tableau job finished");

    Ok(TableauReport {
        num_qubits: tableau.num_qubits(),
        input_cost,
        cost: result.cost,
        gates: result.circuit.into_gates(),
    })
}
