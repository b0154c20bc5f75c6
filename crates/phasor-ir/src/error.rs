//! Error types for the IR crate.

use thiserror::Error;

/// Errors that can occur while building or mutating IR values.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum IrError {
    /// A qubit index is outside `0..num_qubits`.
    #[error("Qubit {qubit} out of range for {num_qubits} qubits{}", format_context(.context))]
    QubitOutOfRange {
        /// The offending qubit index.
        qubit: u32,
        /// Number of qubits of the object being addressed.
        num_qubits: u32,
        /// Optional operation name for context.
        context: Option<&'static str>,
    },

    /// The same qubit was given twice where distinct qubits are required.
    #[error("Duplicate qubit {qubit}{}", format_context(.context))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: u32,
        /// Optional operation name for context.
        context: Option<&'static str>,
    },

    /// Two objects disagree on their qubit count.
    #[error("Dimension mismatch: expected {expected} qubits, got {got}")]
    DimensionMismatch {
        /// The qubit count of the receiving object.
        expected: u32,
        /// The qubit count that was supplied.
        got: u32,
    },

    /// A gadget was built with an empty support.
    #[error("Gadget must act on at least one qubit")]
    EmptyGadget,

    /// An angle still contains unbound symbols.
    #[error("Angle '{0}' is symbolic and cannot be evaluated")]
    SymbolicAngle(String),

    /// A gate has no Clifford tableau representation.
    #[error("Gate '{0}' is not a Clifford operation")]
    NonClifford(String),
}

fn format_context(context: &Option<&'static str>) -> String {
    match context {
        Some(name) => format!(" (in {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;

/// Check that `qubit < num_qubits`.
pub(crate) fn check_qubit(qubit: u32, num_qubits: u32, context: &'static str) -> IrResult<()> {
    if qubit < num_qubits {
        Ok(())
    } else {
        Err(IrError::QubitOutOfRange {
            qubit,
            num_qubits,
            context: Some(context),
        })
    }
}
