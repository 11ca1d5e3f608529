//! # qcchem Noise
//!
//! Readout errors, depolarizing noise models, and the synthetic
//! `sim<level>` models used by the local simulator.
//!
//! ## Quick Start
//!
//! ```rust
//! use qcchem_noise::prelude::*;
//!
//! // sim2: twice the reference error rates
//! let noise = ScaledNoise::from_name("sim2").unwrap();
//! assert!((noise.model().gate_error_2q() - 0.02).abs() < 1e-12);
//!
//! // Rows are the prepared state, columns the observed state
//! let m = noise.model().readout_error().matrix();
//! assert!((m[0][1] - 0.03).abs() < 1e-12);
//! ```
//!
//! ## Clamped Levels
//!
//! ```rust
//! use qcchem_noise::prelude::*;
//!
//! let noise = ScaledNoise::from_level(500.0).unwrap();
//! assert!(noise.is_limited());
//! assert_eq!(noise.model().readout_error().prob_meas0_prep1(), 0.5);
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Single-qubit readout errors
pub mod readout;

/// Depolarizing noise model
pub mod noise_model;

/// `sim<level>` scaled models
pub mod scaled;

// ============================================================================
// Re-exports
// ============================================================================

pub use noise_model::{NoiseModel, PairGateError};
pub use readout::ReadoutError;
pub use scaled::{parse_sim_name, ErrorChannel, ScaledNoise};

// ============================================================================
// Prelude
// ============================================================================

/// Convenient imports for common use cases
pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use qcchem_noise::prelude::*;
    //! ```

    pub use crate::noise_model::{NoiseModel, PairGateError};
    pub use crate::readout::ReadoutError;
    pub use crate::scaled::{parse_sim_name, ErrorChannel, ScaledNoise};
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_scaled_model_is_valid_noise_model() {
        for level in [0.0, 0.5, 1.0, 7.0, 40.0, 1000.0] {
            let noise = ScaledNoise::from_level(level).unwrap();
            assert!(noise.model().validate().is_ok());
        }
    }

    #[test]
    fn test_unparsable_level_is_noiseless() {
        let noise = ScaledNoise::from_name("simple").unwrap();
        assert_eq!(noise.name(), "sim0");
        assert_eq!(noise.level(), 0.0);
        assert!(noise.into_model().is_ideal());
    }

    #[test]
    fn test_readout_asymmetry_of_scaled_model() {
        let noise = ScaledNoise::from_level(1.0).unwrap();
        let ro = noise.model().readout_error();
        assert!(ro.prob_meas0_prep1() > ro.prob_meas1_prep0());
        assert!((ro.average_error() - 0.0225).abs() < 1e-12);
    }
}
