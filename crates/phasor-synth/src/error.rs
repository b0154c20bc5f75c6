//! Error types for the synthesis crate.

use thiserror::Error;

/// Errors that can occur during synthesis and optimization.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SynthError {
    /// Error from the IR crate.
    #[error("IR error: {0}")]
    Ir(#[from] phasor_ir::IrError),

    /// The edge list does not describe a simple graph on `0..n`.
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    /// Two qubits lie in different connected components.
    #[error("Qubits {from} and {to} are disconnected")]
    Disconnected { from: u32, to: u32 },

    /// The topology cannot support the requested synthesis.
    #[error("Infeasible topology: {0}")]
    InfeasibleTopology(String),

    /// Object and topology disagree on the number of qubits.
    #[error("Dimension mismatch: topology has {topology} qubits, input has {input}")]
    DimensionMismatch { topology: u32, input: u32 },

    /// A qubit index is outside the topology.
    #[error("Qubit {qubit} out of range for topology with {num_qubits} qubits")]
    QubitOutOfRange { qubit: u32, num_qubits: u32 },

    /// A parity matrix has no inverse.
    #[error("Parity matrix is singular")]
    SingularMatrix,

    /// Invalid optimizer or schedule configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configuration file could not be read or parsed.
    #[error("Failed to load configuration: {0}")]
    ConfigLoad(String),
}

/// Result type for synthesis operations.
pub type SynthResult<T> = Result<T, SynthError>;
