//! Phasor Demo Suite
//!
//! Job-file driven runs of the phasor synthesis engines:
//!
//! - **Anneal jobs**: a topology plus a list of phase gadgets, optimized with
//!   [`phasor_synth::optimize_phase_circuit`]
//! - **Pauli jobs**: a topology plus a list of Pauli strings with angles,
//!   synthesized with [`phasor_synth::synthesize_pauli_polynomial`]
//! - **Tableau jobs**: a topology plus a Clifford gate list, turned into a
//!   tableau and resynthesized with [`phasor_synth::synthesize_tableau`]
//!
//! Jobs are YAML or JSON, chosen by file extension:
//!
//! ```yaml
//! topology:
//!   num_qubits: 4
//!   edges: [[0, 1], [1, 2], [2, 3], [3, 0]]
//! layers: 2
//! seed: 42
//! gadgets:
//!   - { basis: Z, angle: 1.5707963267948966, qubits: [0, 1] }
//!   - { basis: X, angle: 3.141592653589793, qubits: [0, 2] }
//! ```

pub mod job;
pub mod report;

pub use job::{AnnealJob, GadgetSpec, PauliJob, PauliTermSpec, TableauJob, load_job};
pub use report::{
    AnnealReport, PauliReport, TableauReport, run_anneal, run_pauli, run_tableau,
};

use console::style;

/// Print a demo header.
pub fn print_header(title: &str) {
    println!();
    println!("{}", style("═".repeat(60)).cyan());
    println!("{}", style(format!("  {title}")).cyan().bold());
    println!("{}", style("═".repeat(60)).cyan());
    println!();
}

/// Print a demo section.
pub fn print_section(title: &str) {
    println!();
    println!("{}", style(format!("▶ {title}")).green().bold());
    println!("{}", style("─".repeat(40)).dim());
}

/// Print a result line.
pub fn print_result(label: &str, value: impl std::fmt::Display) {
    println!("  {} {}", style(format!("{label}:")).dim(), value);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}
