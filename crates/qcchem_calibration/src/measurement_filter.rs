//! Pairwise readout-error mitigation
//!
//! Each filter corrects the joint readout of one qubit pair. It is fitted
//! from four calibration circuits, one per computational basis state of
//! the pair, and applied to counts marginalised onto that pair.

use qcchem_core::circuit::Circuit;
use qcchem_core::error::{QcchemError, QcchemResult};
use qcchem_core::gate::Gate;
use nalgebra::{Matrix4, Vector4};
use qcchem_core::types::{marginal_counts, Counts, QubitId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of basis states of a qubit pair
const PAIR_STATES: usize = 4;

/// Basis-state labels of a pair; character 0 is the lower qubit
pub fn calibration_labels() -> [&'static str; PAIR_STATES] {
    ["00", "01", "10", "11"]
}

/// Check that a pair is two distinct qubits, lower first
pub fn validate_pair(pair: (QubitId, QubitId)) -> QcchemResult<()> {
    if pair.0 >= pair.1 {
        return Err(QcchemError::InvalidQubitPair(pair.0, pair.1));
    }
    Ok(())
}

/// Calibration circuits for a pair, in label order
///
/// Each circuit prepares its label with X gates and measures both qubits,
/// qubit `q` into clbit `num_qubits - 1 - q`.
pub fn calibration_circuits(
    num_qubits: usize,
    pair: (QubitId, QubitId),
) -> QcchemResult<Vec<Circuit>> {
    validate_pair(pair)?;
    if pair.1 >= num_qubits {
        return Err(QcchemError::QubitOutOfRange {
            qubit: pair.1,
            max: num_qubits.saturating_sub(1),
        });
    }

    calibration_labels()
        .iter()
        .map(|label| {
            let mut circuit =
                Circuit::with_name(num_qubits, format!("mcal_{}_{}_{}", pair.0, pair.1, label));
            circuit.add_classical_register();

            for (bit, q) in label.chars().zip([pair.0, pair.1]) {
                if bit == '1' {
                    circuit.add_gate(Gate::X(q))?;
                }
            }
            circuit.barrier();
            for q in [pair.0, pair.1] {
                circuit.measure(q, num_qubits - 1 - q)?;
            }
            Ok(circuit)
        })
        .collect()
}

/// Fitted correction for one qubit pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementFilter {
    pair: (QubitId, QubitId),

    /// Row = observed label, column = prepared label
    assignment: Matrix4<f64>,

    inverse: Matrix4<f64>,
}
impl MeasurementFilter {
    /// Fit from calibration results, one counts table per label in label order
    pub fn fit(pair: (QubitId, QubitId), results: &[Counts]) -> QcchemResult<Self> {
        validate_pair(pair)?;
        if results.len() != PAIR_STATES {
            return Err(QcchemError::ResultCountMismatch {
                expected: PAIR_STATES,
                found: results.len(),
            });
        }

        let labels = calibration_labels();
        let mut assignment = Matrix4::<f64>::zeros();

        for (prepared, counts) in results.iter().enumerate() {
            let marginal = marginal_counts(counts, &[pair.0, pair.1])?;
            let total: u64 = marginal.values().sum();
            if total == 0 {
                return Err(QcchemError::CalibrationError(format!(
                    "No shots recorded for calibration state {}",
                    labels[prepared]
                )));
            }
            for (observed, label) in labels.iter().enumerate() {
                let count = marginal.get(*label).copied().unwrap_or(0);
                assignment[(observed, prepared)] = count as f64 / total as f64;
            }
        }

        let inverse = assignment.try_inverse().ok_or(QcchemError::SingularMatrix)?;

        Ok(Self {
            pair,
            assignment,
            inverse,
        })
    }

    /// Qubit pair this filter corrects
    pub fn pair(&self) -> (QubitId, QubitId) {
        self.pair
    }

    /// Assignment matrix, indexed `(observed, prepared)`
    pub fn assignment_matrix(&self) -> &Matrix4<f64> {
        &self.assignment
    }

    /// Inverse of the assignment matrix
    pub fn inverse_matrix(&self) -> &Matrix4<f64> {
        &self.inverse
    }

    /// Mean probability of reading back the prepared state
    pub fn readout_fidelity(&self) -> f64 {
        self.assignment.trace() / PAIR_STATES as f64
    }

    /// Corrected pair counts for full-width counts
    ///
    /// Negative quasi-probabilities are clipped to zero and the result is
    /// renormalised to the original shot total.
    pub fn apply(&self, counts: &Counts) -> QcchemResult<BTreeMap<String, f64>> {
        let marginal = marginal_counts(counts, &[self.pair.0, self.pair.1])?;
        let labels = calibration_labels();

        let observed = Vector4::from_iterator(
            labels
                .iter()
                .map(|l| marginal.get(*l).copied().unwrap_or(0) as f64),
        );
        let total = observed.sum();

        let mut corrected = self.inverse * observed;
        if corrected.iter().any(|&v| v < 0.0) {
            log::warn!(
                "Clipping negative mitigated counts for pair {:?}: {:?}",
                self.pair,
                corrected.as_slice()
            );
            corrected.apply(|v| *v = v.max(0.0));
        }

        let sum = corrected.sum();
        if sum > 0.0 {
            corrected *= total / sum;
        }

        Ok(labels
            .iter()
            .zip(corrected.iter())
            .map(|(l, &v)| (l.to_string(), v))
            .collect())
    }
}

// ============================================================================
// Tests
// ============================================================================
