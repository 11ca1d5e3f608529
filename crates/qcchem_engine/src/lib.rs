//! # qcchem Engine
//!
//! Measurement orchestration: resolve a backend by name, expand a
//! state-preparation circuit into one circuit per Pauli basis, batch and
//! submit them, wait for the jobs, and attach the histograms back onto the
//! bases. Pairwise readout-error mitigation sits on the counts pipeline.
//!
//! ## Quick Start
//!
//! ```rust
//! use qcchem_engine::prelude::*;
//! use qcchem_core::CircuitBuilder;
//! use qcchem_measurement::{evaluate_pauli, PauliBasis};
//!
//! let session = Session::local().with_config(EngineConfig::testing());
//! let backend = resolve_backend(&session, "sim0").unwrap().into_counts().unwrap();
//!
//! let bell = CircuitBuilder::new(2).h(0).cnot(0, 1).build();
//! let bases = MeasurementBases::Explicit(vec![PauliBasis::from("XX"), PauliBasis::from("ZZ")]);
//! let measured = backend.run(&bell, bases, 1000).unwrap();
//!
//! let zz = evaluate_pauli("ZZ", measured[1].results().unwrap()).unwrap();
//! assert!((zz - 1.0).abs() < 1e-12);
//! ```
//!
//! ## Statevector Backends
//!
//! ```rust
//! use qcchem_engine::prelude::*;
//! use qcchem_core::CircuitBuilder;
//!
//! let session = Session::local();
//! let resolved = resolve_backend(&session, "vec").unwrap();
//! assert!(resolved.wrapper().is_noiseless());
//!
//! let state = resolved
//!     .as_statevector()
//!     .unwrap()
//!     .run(&CircuitBuilder::new(1).x(0).build(), MeasurementBases::Default, 1)
//!     .unwrap();
//! assert!((state[1].norm() - 1.0).abs() < 1e-12);
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Engine configuration
pub mod config;

/// Job completion polling
pub mod polling;

/// Backend wrapper
pub mod wrapper;

/// Counts pipeline and readout mitigation
pub mod counts;

/// Statevector pipeline
pub mod statevector;

/// Session and backend lookup
pub mod account;

/// Backend resolution
pub mod interface;

#[cfg(test)]
mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use account::Session;
pub use config::EngineConfig;
pub use counts::{CountsBackend, MeasurementBases};
pub use interface::{resolve_backend, BackendSpec, ResolvedBackend};
pub use polling::{PollingPolicy, Sleeper, ThreadSleeper};
pub use statevector::StatevectorBackend;
pub use wrapper::BackendWrapper;

// ============================================================================
// Prelude
// ============================================================================

/// Convenient imports for common use cases
pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use qcchem_engine::prelude::*;
    //! ```

    pub use crate::account::Session;
    pub use crate::config::EngineConfig;
    pub use crate::counts::{CountsBackend, MeasurementBases};
    pub use crate::interface::{resolve_backend, BackendSpec, ResolvedBackend};
    pub use crate::polling::{PollingPolicy, Sleeper, ThreadSleeper};
    pub use crate::statevector::StatevectorBackend;
    pub use crate::wrapper::BackendWrapper;
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use qcchem_core::{Circuit, CircuitBuilder};
    use qcchem_measurement::{evaluate_pauli, evaluate_pauli_mitigated, Hamiltonian};

    /// Two-qubit ansatz; at theta = 0 it prepares |10>
    fn ansatz(theta: f64) -> Circuit {
        CircuitBuilder::new(2)
            .x(0)
            .h(0)
            .cx(0, 1)
            .ry(0, theta)
            .ry(1, theta)
            .cx(0, 1)
            .h(0)
            .build()
    }

    fn heisenberg() -> Hamiltonian {
        Hamiltonian::from_terms([("XX", 1.0), ("YY", 1.0), ("ZZ", 1.0)]).unwrap()
    }

    #[test]
    fn test_estimator_on_noiseless_counts() {
        let session = Session::local().with_config(EngineConfig::testing().with_shots(8192));
        let backend = resolve_backend(&session, "sim0")
            .unwrap()
            .into_counts()
            .unwrap();

        let h = heisenberg();
        let bases = h.measurement_bases().unwrap();
        assert_eq!(bases.len(), 3);

        let measured = backend
            .run(&ansatz(0.0), MeasurementBases::Explicit(bases), session.config().shots)
            .unwrap();
        let energy = h.energy_from_bases(&measured).unwrap();

        assert!((energy + 1.0).abs() < 0.1, "energy {}", energy);
    }

    #[test]
    fn test_estimator_on_statevector() {
        let session = Session::local();
        let backend = resolve_backend(&session, "statevector_simulator")
            .unwrap()
            .into_statevector()
            .unwrap();

        let state = backend
            .run(&ansatz(0.0), MeasurementBases::Default, 1)
            .unwrap();
        let energy = heisenberg().energy_from_statevector(&state).unwrap();

        approx::assert_relative_eq!(energy, -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_mitigation_recovers_noisy_parity() {
        let session = Session::local().with_config(EngineConfig::testing().with_shots(8192));
        let mut resolved = resolve_backend(&session, "sim2").unwrap();
        let backend = resolved.as_counts_mut().unwrap();

        backend.calibrate_pairwise_qrem(Some(&[0, 1]), Some(8192)).unwrap();
        let measured = backend
            .run(
                &ansatz(0.0),
                MeasurementBases::Explicit(vec!["ZZ".into()]),
                8192,
            )
            .unwrap();

        let raw = evaluate_pauli("ZZ", measured[0].results().unwrap()).unwrap();
        let corrected = backend
            .apply_pairwise_qrem_to_basis(&measured[0], (0, 1))
            .unwrap();
        let mitigated = evaluate_pauli_mitigated("ZZ", &corrected).unwrap();

        assert!(raw > -0.95, "raw {}", raw);
        assert!((mitigated + 1.0).abs() < (raw + 1.0).abs());
    }
}
