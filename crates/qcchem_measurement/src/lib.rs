//! # qcchem Measurement
//!
//! Pauli measurement bases, qubitwise-commuting grouping, and the
//! reduction of measured counts to expectation values and energies.
//!
//! ## Quick Start
//!
//! ```rust
//! use qcchem_measurement::prelude::*;
//! use qcchem_core::Circuit;
//!
//! let basis = PauliBasis::from("IX");
//! assert!(basis.contains("IX"));
//! assert!(!basis.contains("XX"));
//! assert_eq!(basis.difference("XI").unwrap(), 1);
//!
//! // Y gets Sdg then H, X gets H; only non-I qubits are measured
//! let circuit = PauliBasis::from("YZ").apply(Circuit::new(2)).unwrap();
//! assert_eq!(circuit.count_measurements(), 2);
//! ```
//!
//! ## Energies
//!
//! ```rust
//! use qcchem_measurement::prelude::*;
//!
//! let h = Hamiltonian::from_terms([("ZI", 0.5), ("IZ", 0.5)]).unwrap();
//! let mut bases = h.measurement_bases().unwrap();
//! assert_eq!(bases.len(), 1);
//!
//! bases[0].set_results([("00".to_string(), 10u64)].into_iter().collect());
//! assert!((h.energy_from_bases(&bases).unwrap() - 1.0).abs() < 1e-12);
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Pauli measurement bases
pub mod pauli_basis;

/// Qubitwise-commuting grouping
pub mod grouping;

/// Expectation values and Hamiltonians
pub mod expectation;

// ============================================================================
// Re-exports
// ============================================================================

pub use expectation::{
    evaluate_pauli, evaluate_pauli_mitigated, statevector_expectation, Hamiltonian,
};
pub use grouping::group_qubitwise;
pub use pauli_basis::{Pauli, PauliBasis};

// ============================================================================
// Prelude
// ============================================================================

/// Convenient imports for common use cases
pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use qcchem_measurement::prelude::*;
    //! ```

    pub use crate::expectation::{
        evaluate_pauli, evaluate_pauli_mitigated, statevector_expectation, Hamiltonian,
    };
    pub use crate::grouping::group_qubitwise;
    pub use crate::pauli_basis::{Pauli, PauliBasis};
}

// ============================================================================
// Integration Tests
// ============================================================================
