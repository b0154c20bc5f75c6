//! Integration tests for the demo job files.
//!
//! These run every bundled job end to end and check the reports against
//! the job's topology.

use std::path::PathBuf;

use phasor_demos::{AnnealJob, PauliJob, TableauJob, load_job, run_anneal, run_pauli, run_tableau};
use phasor_ir::{Circuit, CliffordTableau};
use phasor_synth::{RespectsTopology, circuit_unitary, pauli_polynomial_unitary};

fn job_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("jobs").join(name)
}

fn circuit_of(num_qubits: u32, gates: &[phasor_ir::Gate]) -> Circuit {
    let mut circuit = Circuit::new(num_qubits);
    for gate in gates {
        circuit.push(gate.clone()).unwrap();
    }
    circuit
}

/// Test the YAML anneal job on a ring.
#[test]
fn test_ring_anneal_job() {
    let job: AnnealJob = load_job(&job_path("ring_gadgets.yaml")).unwrap();
    assert_eq!(job.layers, 2);
    assert_eq!(job.gadgets.len(), 2);

    let report = run_anneal(&job).unwrap();
    assert!(report.cost <= report.naive_cost);
    let circuit = circuit_of(report.num_qubits, &report.gates);
    assert!(circuit.respects(&job.topology));
    assert_eq!(circuit.cx_count(), report.cost);
}

/// Test the JSON anneal job on a grid, including determinism.
#[test]
fn test_grid_anneal_job_is_deterministic() {
    let job: AnnealJob = load_job(&job_path("grid_gadgets.json")).unwrap();
    assert!(job.schedule.is_none());

    let first = run_anneal(&job).unwrap();
    let second = run_anneal(&job).unwrap();
    assert_eq!(first.gates, second.gates);
    assert_eq!(first.cost, second.cost);
    assert!(circuit_of(first.num_qubits, &first.gates).respects(&job.topology));
}

/// Test that a schedule file replaces the job's schedule.
#[test]
fn test_schedule_file_overrides_job() {
    let mut job: AnnealJob = load_job(&job_path("ring_gadgets.yaml")).unwrap();
    job.load_schedule(&job_path("quick_schedule.yaml")).unwrap();

    let schedule = job.schedule.unwrap();
    assert_eq!(schedule.iterations, 200);
    assert!((schedule.initial_temperature - 2.0).abs() < 1e-12);

    let report = run_anneal(&job).unwrap();
    assert!(report.cost <= report.naive_cost);
    assert!(job.load_schedule(&job_path("missing.yaml")).is_err());
}

/// Test the tableau job reproduces the tableau of its gate list.
#[test]
fn test_line_tableau_job() {
    let job: TableauJob = load_job(&job_path("line_tableau.yaml")).unwrap();
    let report = run_tableau(&job).unwrap();

    let circuit = circuit_of(report.num_qubits, &report.gates);
    assert!(circuit.respects(&job.topology));
    assert_eq!(
        CliffordTableau::from_circuit(&circuit).unwrap(),
        job.tableau().unwrap()
    );
}

/// Test the Pauli job on a 2x2 grid against the job's own polynomial.
#[test]
fn test_grid_pauli_job() {
    let job: PauliJob = load_job(&job_path("grid_paulis.yaml")).unwrap();
    assert_eq!(job.gadgets.len(), 4);

    let report = run_pauli(&job).unwrap();
    assert!(report.cost <= report.naive_cost);
    let mut order = report.order.clone();
    order.sort_unstable();
    assert_eq!(order, vec![0, 1, 2, 3]);

    let circuit = circuit_of(report.num_qubits, &report.gates);
    assert!(circuit.respects(&job.topology));
    let expected = pauli_polynomial_unitary(&job.polynomial().unwrap()).unwrap();
    assert!(circuit_unitary(&circuit).unwrap().equals_up_to_phase(&expected));
}

/// Test that missing and malformed jobs are reported.
#[test]
fn test_bad_jobs_rejected() {
    assert!(load_job::<AnnealJob>(&job_path("missing.yaml")).is_err());
    assert!(load_job::<TableauJob>(&job_path("ring_gadgets.yaml")).is_err());

    let mut job: PauliJob = load_job(&job_path("grid_paulis.yaml")).unwrap();
    job.gadgets[0].paulis = "XQ".into();
    assert!(job.polynomial().is_err());
    job.gadgets[0].paulis = "IIII".into();
    assert!(job.polynomial().is_err());
}
