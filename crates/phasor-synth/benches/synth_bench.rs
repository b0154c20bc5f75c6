//! Benchmarks for phasor synthesis
//!
//! Run with: cargo bench -p phasor-synth

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use phasor_ir::{Basis, CliffordTableau, PauliPolynomial, PhaseCircuit};
use phasor_synth::{
    AnnealSchedule, GadgetSynthesis, Topology, optimize_phase_circuit,
    synthesize_pauli_polynomial, synthesize_tableau,
};
use std::collections::BTreeSet;

/// Phase circuit with overlapping Z and X gadgets spread over the register.
fn layered_phase_circuit(n: u32) -> PhaseCircuit {
    let mut pc = PhaseCircuit::new(n);
    for i in 0..n {
        let basis = if i % 2 == 0 { Basis::Z } else { Basis::X };
        let qubits: BTreeSet<u32> = [i, (i + 2) % n, (i + n / 2) % n].into_iter().collect();
        pc.append_gadget(0.1 * f64::from(i + 1), basis, qubits).unwrap();
    }
    pc
}

/// Tableau of layered H, S and long-range CNOTs.
fn brickwork_tableau(n: u32, depth: u32) -> CliffordTableau {
    let mut tableau = CliffordTableau::new(n);
    for layer in 0..depth {
        for q in 0..n {
            if (q + layer) % 3 == 0 {
                tableau.append_h(q).unwrap();
            } else {
                tableau.append_s(q).unwrap();
            }
        }
        for q in (layer % 2..n.saturating_sub(1)).step_by(2) {
            tableau.append_cnot(q, (q + 3) % n).unwrap();
        }
    }
    tableau
}

/// Benchmark direct per-gadget synthesis
fn bench_gadget_synthesis(c: &mut Criterion) {
    let mut group = c.benchmark_group("gadget_synthesis");

    for n in &[4u32, 9, 16] {
        let side = (f64::from(*n).sqrt()) as u32;
        let grid = Topology::grid(side, side).unwrap();
        let pc = layered_phase_circuit(*n);
        group.bench_with_input(BenchmarkId::new("grid", n), &pc, |b, pc| {
            b.iter(|| black_box(pc.to_circuit(&grid).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark the annealing optimizer
fn bench_annealing(c: &mut Criterion) {
    let mut group = c.benchmark_group("annealing");
    group.sample_size(10);

    for n in &[4u32, 6, 8] {
        let ring = Topology::cycle(*n);
        let pc = layered_phase_circuit(*n);
        let schedule = AnnealSchedule::with_iterations(500);
        group.bench_with_input(BenchmarkId::new("cycle", n), &pc, |b, pc| {
            b.iter(|| {
                black_box(optimize_phase_circuit(pc, &ring, 2, black_box(7), Some(schedule)).unwrap())
            });
        });
    }

    group.finish();
}

/// Benchmark Gray-code Pauli polynomial synthesis
fn bench_pauli_synthesis(c: &mut Criterion) {
    let mut group = c.benchmark_group("pauli_synthesis");

    for n in &[4u32, 9, 16] {
        let side = (f64::from(*n).sqrt()) as u32;
        let grid = Topology::grid(side, side).unwrap();
        let poly = PauliPolynomial::from(&layered_phase_circuit(*n));
        group.bench_with_input(BenchmarkId::new("grid", n), &poly, |b, poly| {
            b.iter(|| black_box(synthesize_pauli_polynomial(poly, &grid).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark Clifford tableau synthesis
fn bench_tableau_synthesis(c: &mut Criterion) {
    let mut group = c.benchmark_group("tableau_synthesis");

    for n in &[5u32, 10, 20] {
        let line = Topology::line(*n);
        let tableau = brickwork_tableau(*n, 6);
        group.bench_with_input(BenchmarkId::new("line", n), &tableau, |b, t| {
            b.iter(|| black_box(synthesize_tableau(t, &line).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_gadget_synthesis,
    bench_annealing,
    bench_pauli_synthesis,
    bench_tableau_synthesis,
);
criterion_main!(benches);
