//! Phasor Intermediate Representation
//!
//! This crate provides the data model shared by the phasor synthesis engines:
//! phase gadgets and the circuits built from them, Pauli gadgets, Clifford
//! tableaux, and the plain gate sequences that synthesis produces.
//!
//! # Core Components
//!
//! - **Angles**: [`Angle`] for concrete or symbolic rotation angles
//! - **Gadgets**: [`Gadget`] (Z or X [`Basis`]) and [`PhaseCircuit`], an ordered
//!   product of gadgets
//! - **Pauli gadgets**: [`PauliGadget`] and [`PauliPolynomial`] with a
//!   different [`Pauli`] on every leg
//! - **Clifford tableaux**: [`CliffordTableau`] with append/prepend of
//!   Clifford generators
//! - **Gate sequences**: [`Gate`] and [`Circuit`], the output of synthesis
//! - **GF(2) matrices**: [`BitMatrix`] for CNOT parity maps
//!
//! # Example: Building a Phase Circuit
//!
//! ```rust
//! use phasor_ir::{Basis, PhaseCircuit};
//! use std::f64::consts::PI;
//!
//! let mut circuit = PhaseCircuit::new(4);
//! circuit.append_gadget(PI / 2.0, Basis::Z, [0, 1]).unwrap();
//! circuit.append_gadget(PI, Basis::X, [0, 2]).unwrap();
//!
//! assert_eq!(circuit.len(), 2);
//! assert_eq!(circuit.num_legs(), 4);
//! ```
//!
//! # Example: Building a Clifford Tableau
//!
//! ```rust
//! use phasor_ir::{CliffordTableau, Pauli};
//!
//! let mut tableau = CliffordTableau::new(3);
//! tableau.append_h(0).unwrap();
//! tableau.append_cnot(0, 2).unwrap();
//! tableau.append_s(1).unwrap();
//!
//! assert!(tableau.is_symplectic());
//! // X_0 is mapped to Z_0
//! assert_eq!(tableau.pauli(0, 0), Pauli::Z);
//! ```

pub mod angle;
pub mod circuit;
pub mod error;
pub mod gadget;
pub mod gate;
pub mod gf2;
pub mod pauli;
pub mod phase_circuit;
pub mod qubit;
pub mod tableau;

pub use angle::{ANGLE_EPSILON, Angle};
pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gadget::{Basis, Gadget};
pub use gate::Gate;
pub use gf2::BitMatrix;
pub use pauli::{Pauli, PauliGadget, PauliPolynomial};
pub use phase_circuit::PhaseCircuit;
pub use qubit::QubitId;
pub use tableau::CliffordTableau;
