//! # qcchem Backend
//!
//! The `Backend` trait with its job and result types, a local simulator,
//! a native-basis transpiler, and an in-memory backend provider.
//!
//! ## Quick Start
//!
//! ```rust
//! use qcchem_backend::prelude::*;
//! use qcchem_core::CircuitBuilder;
//!
//! let backend = SimulatorBackend::qasm().with_seed(42);
//!
//! let mut circuit = CircuitBuilder::new(2).h(0).cnot(0, 1).build();
//! circuit.add_classical_register();
//! circuit.measure(0, 1).unwrap();
//! circuit.measure(1, 0).unwrap();
//!
//! let job = backend.submit(&[circuit], 1000).unwrap();
//! assert!(backend.job_status(&job).unwrap().is_success());
//!
//! let counts = &backend.job_result(&job).unwrap().get_counts().unwrap()[0];
//! assert!(counts.keys().all(|k| k == "00" || k == "11"));
//! ```
//!
//! ## Device Simulators
//!
//! ```rust
//! use qcchem_backend::prelude::*;
//! use qcchem_calibration::fake_device;
//! use qcchem_core::CircuitBuilder;
//!
//! let backend = SimulatorBackend::from_device(fake_device("quito").unwrap());
//! assert_eq!(backend.name(), "qasm_simulator(fake_quito)");
//!
//! // Lowered to id/rz/sx/x/cx on the device coupling map
//! let native = backend
//!     .transpile(&CircuitBuilder::new(2).h(0).cnot(0, 1).build())
//!     .unwrap();
//! assert!(native.gates().iter().all(|g| backend.configuration().supports_gate(g.name())));
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Backend trait, jobs and results
pub mod execution;

/// Local simulator backend
pub mod simulator;

/// Native-basis transpiler
pub mod transpiler;

/// Backend discovery
pub mod provider;

// ============================================================================
// Re-exports
// ============================================================================

pub use execution::{
    Backend, BackendConfiguration, ExperimentResult, JobId, JobResult, JobStatus,
};
pub use provider::{BackendCriteria, BackendProvider, LocalProvider};
pub use simulator::{SimulationMethod, SimulatorBackend};
pub use transpiler::{Transpiler, TranspilerConfig, DEVICE_BASIS_GATES};

// ============================================================================
// Prelude
// ============================================================================

/// Convenient imports for common use cases
pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use qcchem_backend::prelude::*;
    //! ```

    pub use crate::execution::{
        Backend, BackendConfiguration, ExperimentResult, JobId, JobResult, JobStatus,
    };
    pub use crate::provider::{BackendCriteria, BackendProvider, LocalProvider};
    pub use crate::simulator::{SimulationMethod, SimulatorBackend};
    pub use crate::transpiler::{Transpiler, TranspilerConfig, DEVICE_BASIS_GATES};
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use qcchem_calibration::fake_device;
    use qcchem_core::{Circuit, CircuitBuilder, Counts};
    use std::sync::Arc;

    fn measure_all(mut circuit: Circuit) -> Circuit {
        let n = circuit.num_qubits();
        circuit.add_classical_register();
        for q in 0..n {
            circuit.measure(q, n - 1 - q).unwrap();
        }
        circuit
    }

    fn counts_of(backend: &dyn Backend, circuit: &Circuit, shots: u64) -> Counts {
        let native = backend.transpile(circuit).unwrap();
        let job = backend.submit(&[native], shots).unwrap();
        backend.job_result(&job).unwrap().get_counts().unwrap().remove(0)
    }

    #[test]
    fn test_transpiled_circuit_keeps_semantics() {
        let circuit = measure_all(
            CircuitBuilder::new(3)
                .x(0)
                .ry(1, std::f64::consts::PI)
                .swap(1, 2)
                .cz(0, 1)
                .build(),
        );

        let ideal = SimulatorBackend::qasm();
        let device_like = SimulatorBackend::qasm()
            .with_name("linear_device")
            .with_max_experiments(10);
        let native = Transpiler::new(TranspilerConfig::for_device(3, vec![(0, 1), (1, 2)]))
            .run(&circuit)
            .unwrap();

        let expected = counts_of(&ideal, &circuit, 100);
        assert_eq!(expected, [("101".to_string(), 100)].into_iter().collect());
        assert_eq!(counts_of(&device_like, &native, 100), expected);
    }

    #[test]
    fn test_provider_serves_device_simulators() {
        let device = Arc::new(SimulatorBackend::from_device(fake_device("belem").unwrap()));
        let provider = LocalProvider::default().with_backend(device);

        let found = provider.backends(&BackendCriteria::by_name("qasm_simulator(fake_belem)"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].configuration().n_qubits, 5);
        assert!(found[0].is_simulator());
    }

    #[test]
    fn test_device_noise_is_visible() {
        let backend = SimulatorBackend::from_device(fake_device("quito").unwrap()).with_seed(3);
        let counts = counts_of(&backend, &measure_all(CircuitBuilder::new(5).build()), 4000);

        // Readout errors leak some shots out of the all-zeros state
        assert!(counts["00000"] < 4000);
        assert!(counts["00000"] > 3000);
    }
}
