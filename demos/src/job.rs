//! Job file formats.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use phasor_ir::{Basis, CliffordTableau, Gate, PauliGadget, PauliPolynomial, PhaseCircuit};
use phasor_synth::{AnnealSchedule, Topology};

/// One phase gadget in a job file.
#[derive(Debug, Clone, Deserialize)]
pub struct GadgetSpec {
    pub basis: Basis,
    /// Angle in radians.
    pub angle: f64,
    pub qubits: Vec<u32>,
}

/// Phase circuit optimization job.
#[derive(Debug, Clone, Deserialize)]
pub struct AnnealJob {
    pub topology: Topology,
    #[serde(default = "default_layers")]
    pub layers: usize,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub schedule: Option<AnnealSchedule>,
    pub gadgets: Vec<GadgetSpec>,
}

fn default_layers() -> usize {
    1
}

impl AnnealJob {
    /// The phase circuit described by the job, sized to the topology.
    pub fn phase_circuit(&self) -> Result<PhaseCircuit> {
        let mut circuit = PhaseCircuit::new(self.topology.num_qubits());
        for (i, spec) in self.gadgets.iter().enumerate() {
            circuit
                .append_gadget(spec.angle, spec.basis, spec.qubits.iter().copied())
                .with_context(|| format!("gadget #{i}"))?;
        }
        Ok(circuit)
    }

    /// Replace the job's schedule with one loaded from a schedule file.
    pub fn load_schedule(&mut self, path: &Path) -> Result<()> {
        let schedule = AnnealSchedule::from_file(path)
            .with_context(|| format!("Invalid schedule: {}", path.display()))?;
        self.schedule = Some(schedule);
        Ok(())
    }
}

/// One Pauli gadget in a job file.
#[derive(Debug, Clone, Deserialize)]
pub struct PauliTermSpec {
    /// Pauli string, qubit 0 first, e.g. `"XIZY"`.
    pub paulis: String,
    /// Angle in radians.
    pub angle: f64,
}

/// Pauli polynomial synthesis job.
#[derive(Debug, Clone, Deserialize)]
pub struct PauliJob {
    pub topology: Topology,
    pub gadgets: Vec<PauliTermSpec>,
}

impl PauliJob {
    /// The Pauli polynomial described by the job, sized to the topology.
    pub fn polynomial(&self) -> Result<PauliPolynomial> {
        let mut poly = PauliPolynomial::new(self.topology.num_qubits());
        for (i, spec) in self.gadgets.iter().enumerate() {
            let gadget = PauliGadget::parse(spec.angle, &spec.paulis)
                .with_context(|| format!("gadget #{i}: bad Pauli string {:?}", spec.paulis))?
                .with_context(|| format!("gadget #{i}"))?;
            poly.append(gadget).with_context(|| format!("gadget #{i}"))?;
        }
        Ok(poly)
    }
}

/// Clifford tableau synthesis job.
#[derive(Debug, Clone, Deserialize)]
pub struct TableauJob {
    pub topology: Topology,
    /// Clifford gates applied to the identity, in order.
    pub gates: Vec<Gate>,
}

impl TableauJob {
    /// The tableau built by applying the job's gates to the identity.
    pub fn tableau(&self) -> Result<CliffordTableau> {
        let mut tableau = CliffordTableau::new(self.topology.num_qubits());
        for (i, gate) in self.gates.iter().enumerate() {
            tableau
                .apply_gate(gate)
                .with_context(|| format!("gate #{i} ({gate})"))?;
        }
        Ok(tableau)
    }
}

/// Load a job file. `.json` files are parsed as JSON, anything else as YAML.
pub fn load_job<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext.to_lowercase().as_str() {
        "json" => serde_json::from_str(&source)
            .with_context(|| format!("Invalid JSON job: {}", path.display())),
        _ => serde_yaml_ng::from_str(&source)
            .with_context(|| format!("Invalid YAML job: {}", path.display())),
    }
}
