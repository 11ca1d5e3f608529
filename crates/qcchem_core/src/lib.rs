//! # qcchem Core
//!
//! Core types, circuits, and topology shared by the qcchem measurement
//! pipeline.
//!
//! ## Quick Start
//!
//! ```rust
//! use qcchem_core::prelude::*;
//!
//! // Prepare a Bell pair and measure qubit i into clbit n-1-i
//! let mut circuit = CircuitBuilder::new(2).h(0).cnot(0, 1).build();
//! circuit.add_classical_register();
//! circuit.measure(0, 1).unwrap();
//! circuit.measure(1, 0).unwrap();
//!
//! assert_eq!(circuit.count_measurements(), 2);
//! println!("{}", circuit.to_qasm());
//! ```
//!
//! ## Marginal Counts
//!
//! ```rust
//! use qcchem_core::prelude::*;
//!
//! let mut counts = Counts::new();
//! counts.insert("010".to_string(), 3);
//! counts.insert("111".to_string(), 1);
//!
//! let pair = marginal_counts(&counts, &[0, 2]).unwrap();
//! assert_eq!(pair["00"], 3);
//! assert_eq!(pair["11"], 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Core types
pub mod types;

/// Constants
pub mod constants;

/// Error types
pub mod error;

/// Quantum gates
pub mod gate;

/// Circuit structure
pub mod circuit;

/// Circuit builder
pub mod builder;

/// Qubit topology
pub mod topology;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::CircuitBuilder;
pub use circuit::Circuit;
pub use constants::{execution, names, noise_scaling};
pub use error::{QcchemError, QcchemResult};
pub use gate::{Gate, Operands};
pub use topology::Topology;
pub use types::{
    marginal_counts, Angle, Bitstring, ClbitId, Counts, Probability, QubitId, Statevector,
};

/// Complex amplitude type used by statevectors
pub use num_complex::Complex64;

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use qcchem_core::prelude::*;
    //! ```

    pub use crate::builder::CircuitBuilder;
    pub use crate::circuit::Circuit;
    pub use crate::constants::{execution, names, noise_scaling};
    pub use crate::error::{QcchemError, QcchemResult};
    pub use crate::gate::{Gate, Operands};
    pub use crate::topology::Topology;
    pub use crate::types::{
        marginal_counts, Angle, Bitstring, ClbitId, Counts, Probability, QubitId, Statevector,
    };
    pub use num_complex::Complex64;
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_measurement_circuit_on_linear_device() {
        let topo = Topology::linear(3);

        let mut circuit = CircuitBuilder::new(3).h(0).cx_chain().build();
        circuit.add_classical_register();
        for q in 0..3 {
            circuit.measure(q, 2 - q).unwrap();
        }

        assert!(topo.validate_circuit(&circuit).is_ok());
        assert_eq!(circuit.measurements(), vec![(0, 2), (1, 1), (2, 0)]);
    }

    #[test]
    fn test_execution_defaults() {
        assert_eq!(execution::DEFAULT_SHOTS, 8192);
        assert_eq!(execution::DEFAULT_MAX_EXPERIMENTS, 300);
        assert_eq!(execution::POLL_INTERVAL_MS, 5000);
    }

    #[test]
    fn test_noise_scaling_factors() {
        assert!((noise_scaling::GATE_ERROR_1Q_PER_LEVEL - 0.001).abs() < 1e-12);
        assert!((noise_scaling::GATE_ERROR_2Q_PER_LEVEL - 0.01).abs() < 1e-12);
        assert!((noise_scaling::READOUT_0_TO_1_PER_LEVEL - 0.015).abs() < 1e-12);
        assert!((noise_scaling::READOUT_1_TO_0_PER_LEVEL - 0.03).abs() < 1e-12);
    }

    #[test]
    fn test_probability_validation() {
        assert!(Probability::new(0.0).is_ok());
        assert!(Probability::new(1.1).is_err());
        let p = Probability::try_from(0.25).unwrap();
        approx::assert_relative_eq!(p.complement(), 0.75);
    }
}
