//! Property-based tests for Clifford tableau mutators.
//!
//! Covers the symplectic invariant, the inverse laws for append and prepend,
//! and the agreement between appending in order and prepending in reverse.

use phasor_ir::{Circuit, CliffordTableau, Gate};
use proptest::prelude::*;

/// Generate a random Clifford gate for a register of the given width.
fn arb_clifford_gate(num_qubits: u32) -> impl Strategy<Value = Gate> {
    let single = prop_oneof![
        (0..num_qubits).prop_map(Gate::h),
        (0..num_qubits).prop_map(Gate::s),
        (0..num_qubits).prop_map(Gate::sdg),
        (0..num_qubits).prop_map(|q| Gate::V { qubit: q.into() }),
        (0..num_qubits).prop_map(|q| Gate::X { qubit: q.into() }),
        (0..num_qubits).prop_map(|q| Gate::Y { qubit: q.into() }),
        (0..num_qubits).prop_map(|q| Gate::Z { qubit: q.into() }),
    ];
    if num_qubits < 2 {
        single.boxed()
    } else {
        prop_oneof![
            3 => single,
            2 => (0..num_qubits, 0..num_qubits)
                .prop_filter("Control and target must differ", |(c, t)| c != t)
                .prop_map(|(c, t)| Gate::cx(c, t)),
        ]
        .boxed()
    }
}

/// Generate a random Clifford circuit with 1-5 qubits and up to 30 gates.
fn arb_clifford_circuit() -> impl Strategy<Value = Circuit> {
    (1_u32..=5).prop_flat_map(|num_qubits| {
        prop::collection::vec(arb_clifford_gate(num_qubits), 0..=30).prop_map(move |gates| {
            let mut circuit = Circuit::new(num_qubits);
            for gate in gates {
                circuit.push(gate).expect("generated gate is in range");
            }
            circuit
        })
    })
}

proptest! {
    #[test]
    fn test_mutators_preserve_symplectic_form(circuit in arb_clifford_circuit()) {
        let tableau = CliffordTableau::from_circuit(&circuit).unwrap();
        prop_assert!(tableau.is_symplectic());

        let mut prepended = CliffordTableau::new(circuit.num_qubits());
        for gate in circuit.gates() {
            prepended.prepend_gate(gate).unwrap();
        }
        prop_assert!(prepended.is_symplectic());
    }

    #[test]
    fn test_append_then_inverse_restores(circuit in arb_clifford_circuit(), seed in 0usize..1000) {
        let base = CliffordTableau::from_circuit(&circuit).unwrap();
        let width = circuit.num_qubits();
        let gate = pick_gate(width, seed);

        let mut tableau = base.clone();
        tableau.apply_gate(&gate).unwrap();
        tableau.apply_gate(&gate.inverse()).unwrap();
        prop_assert_eq!(tableau, base);
    }

    #[test]
    fn test_prepend_then_inverse_restores(circuit in arb_clifford_circuit(), seed in 0usize..1000) {
        let base = CliffordTableau::from_circuit(&circuit).unwrap();
        let width = circuit.num_qubits();
        let gate = pick_gate(width, seed);

        let mut tableau = base.clone();
        tableau.prepend_gate(&gate).unwrap();
        tableau.prepend_gate(&gate.inverse()).unwrap();
        prop_assert_eq!(tableau, base);
    }

    #[test]
    fn test_append_order_equals_reverse_prepend(circuit in arb_clifford_circuit()) {
        let appended = CliffordTableau::from_circuit(&circuit).unwrap();

        let mut prepended = CliffordTableau::new(circuit.num_qubits());
        for gate in circuit.gates().iter().rev() {
            prepended.prepend_gate(gate).unwrap();
        }
        prop_assert_eq!(appended, prepended);
    }

    #[test]
    fn test_circuit_then_inverse_is_identity(circuit in arb_clifford_circuit()) {
        let mut full = circuit.clone();
        full.extend(&circuit.inverse()).unwrap();
        let tableau = CliffordTableau::from_circuit(&full).unwrap();
        prop_assert_eq!(tableau, CliffordTableau::new(circuit.num_qubits()));
    }
}

/// Deterministically pick one gate of every kind from a seed.
fn pick_gate(num_qubits: u32, seed: usize) -> Gate {
    let q = (seed % num_qubits as usize) as u32;
    match (seed / 7) % 8 {
        0 => Gate::h(q),
        1 => Gate::s(q),
        2 => Gate::sdg(q),
        3 => Gate::V { qubit: q.into() },
        4 => Gate::Vdg { qubit: q.into() },
        5 => Gate::Y { qubit: q.into() },
        6 if num_qubits > 1 => Gate::cx(q, (q + 1) % num_qubits),
        _ => Gate::X { qubit: q.into() },
    }
}
