//! Constants for qcchem
//!
//! Execution defaults, `sim<level>` noise scaling factors, and the
//! backend names the resolution logic treats specially.

// ============================================================================
// Execution Defaults
// ============================================================================

pub mod execution {
    //! Defaults for job submission and polling

    /// Measurements taken per basis unless the caller overrides it
    pub const DEFAULT_SHOTS: u64 = 8192;

    /// Circuits per job when a device does not report `max_experiments`
    pub const DEFAULT_MAX_EXPERIMENTS: usize = 300;

    /// Fixed interval between job status polls (milliseconds)
    pub const POLL_INTERVAL_MS: u64 = 5000;
}

// ============================================================================
// Synthetic Noise Scaling
// ============================================================================

pub mod noise_scaling {
    //! Per-level error probabilities for `sim<level>` backends

    /// Single-qubit depolarizing probability per level
    pub const GATE_ERROR_1Q_PER_LEVEL: f64 = 0.001;

    /// Two-qubit depolarizing probability per level
    pub const GATE_ERROR_2Q_PER_LEVEL: f64 = 0.01;

    /// P(measure 1 | prepared 0) per level
    pub const READOUT_0_TO_1_PER_LEVEL: f64 = 0.015;

    /// P(measure 0 | prepared 1) per level
    pub const READOUT_1_TO_0_PER_LEVEL: f64 = 0.03;

    /// Largest depolarizing probability a channel can carry
    pub const MAX_GATE_ERROR: f64 = 1.0;

    /// Largest readout flip probability (beyond it the outcome carries no information)
    pub const MAX_READOUT_ERROR: f64 = 0.5;
}

// ============================================================================
// Backend Names
// ============================================================================

pub mod names {
    //! Names with special meaning during backend resolution

    /// Local statevector simulator
    pub const STATEVECTOR_SIMULATOR: &str = "statevector_simulator";

    /// Shorthand for the statevector simulator
    pub const STATEVECTOR_ALIAS: &str = "vec";

    /// Local counts simulator
    pub const QASM_SIMULATOR: &str = "qasm_simulator";

    /// Vendor-hosted simulator, treated as hardware
    pub const HOSTED_QASM_SIMULATOR: &str = "ibmq_qasm_simulator";

    /// Noiseless synthetic-noise simulator
    pub const NOISELESS_SIM: &str = "sim0";

    /// Prefix of synthetic-noise simulators
    pub const SIM_PREFIX: &str = "sim";

    /// Check whether a name denotes the statevector simulator, ignoring case
    pub fn is_statevector(name: &str) -> bool {
        name.eq_ignore_ascii_case(STATEVECTOR_SIMULATOR)
            || name.eq_ignore_ascii_case(STATEVECTOR_ALIAS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statevector_names() {
        assert!(names::is_statevector("vec"));
        assert!(names::is_statevector("statevector_simulator"));
        assert!(!names::is_statevector("qasm_simulator"));
        assert!(names::is_statevector("VEC"));
        assert!(names::is_statevector("Statevector_Simulator"));
        assert!(!names::is_statevector("vector"));
    }

    #[test]
    fn test_readout_caps() {
        assert!(noise_scaling::MAX_READOUT_ERROR < noise_scaling::MAX_GATE_ERROR);
        assert!(noise_scaling::READOUT_1_TO_0_PER_LEVEL > noise_scaling::READOUT_0_TO_1_PER_LEVEL);
    }
}
