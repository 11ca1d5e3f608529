//! # qcchem Calibration
//!
//! Backend calibration snapshots, the fake device catalog, and pairwise
//! measurement filters for readout-error mitigation.
//!
//! ## Quick Start
//!
//! ```rust
//! use qcchem_calibration::prelude::*;
//!
//! let props = fake_device("fake_lima").unwrap();
//! assert_eq!(props.num_qubits(), 5);
//!
//! // Qubit 1 sits in the middle of the T
//! assert_eq!(props.connectivity()[&1], vec![0, 2, 3]);
//!
//! // Per-qubit noise for the local simulator
//! let model = props.to_noise_model();
//! assert!(!model.is_ideal());
//! ```
//!
//! ## Pairwise Filters
//!
//! ```rust
//! use qcchem_calibration::prelude::*;
//! use qcchem_core::Counts;
//!
//! let circuits = calibration_circuits(2, (0, 1)).unwrap();
//! assert_eq!(circuits.len(), calibration_labels().len());
//!
//! // Perfect readout: each label reads back as itself
//! let results: Vec<Counts> = calibration_labels()
//!     .iter()
//!     .map(|l| [(l.to_string(), 1000u64)].into_iter().collect())
//!     .collect();
//! let filter = MeasurementFilter::fit((0, 1), &results).unwrap();
//! assert!((filter.readout_fidelity() - 1.0).abs() < 1e-12);
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Backend calibration snapshots
pub mod properties;

/// Fake device catalog
pub mod devices;

/// Pairwise readout-error mitigation
pub mod measurement_filter;

// ============================================================================
// Re-exports
// ============================================================================

pub use devices::{fake_device, fake_device_names};
pub use measurement_filter::{
    calibration_circuits, calibration_labels, validate_pair, MeasurementFilter,
};
pub use properties::{BackendProperties, GateProperties, Nduv};

// ============================================================================
// Prelude
// ============================================================================

/// Convenient imports for common use cases
pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use qcchem_calibration::prelude::*;
    //! ```

    pub use crate::devices::{fake_device, fake_device_names};
    pub use crate::measurement_filter::{
        calibration_circuits, calibration_labels, validate_pair, MeasurementFilter,
    };
    pub use crate::properties::{BackendProperties, GateProperties, Nduv};
}

// ============================================================================
// Integration Tests
// ============================================================================
