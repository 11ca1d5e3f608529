//! Readout error for qcchem
//!
//! A single-qubit assignment matrix. Rows are the true (prepared) state,
//! columns the observed state:
//!
//! ```text
//!            observed 0   observed 1
//! true 0  [   1 - a,         a      ]
//! true 1  [     b,         1 - b    ]
//! ```
//!
//! with `a = P(measure 1 | prepared 0)` and `b = P(measure 0 | prepared 1)`.

use qcchem_core::error::{QcchemError, QcchemResult};
use qcchem_core::types::Probability;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance when checking that a matrix row sums to one
const ROW_SUM_TOLERANCE: f64 = 1e-9;

/// Single-qubit readout (assignment) error
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadoutError {
    /// P(measure 1 | prepared 0)
    prob_meas1_prep0: f64,

    /// P(measure 0 | prepared 1)
    prob_meas0_prep1: f64,
}

impl ReadoutError {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create from the two flip probabilities
    pub fn new(prob_meas1_prep0: f64, prob_meas0_prep1: f64) -> QcchemResult<Self> {
        Probability::new(prob_meas1_prep0)?;
        Probability::new(prob_meas0_prep1)?;
        Ok(Self {
            prob_meas1_prep0,
            prob_meas0_prep1,
        })
    }

    /// Same flip probability in both directions
    pub fn symmetric(p: f64) -> QcchemResult<Self> {
        Self::new(p, p)
    }

    /// Perfect readout
    pub fn ideal() -> Self {
        Self {
            prob_meas1_prep0: 0.0,
            prob_meas0_prep1: 0.0,
        }
    }

    /// Create from an assignment matrix (rows = true state)
    pub fn from_matrix(matrix: [[f64; 2]; 2]) -> QcchemResult<Self> {
        for row in &matrix {
            for &p in row {
                Probability::new(p)?;
            }
            let sum = row[0] + row[1];
            if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
                return Err(QcchemError::CalibrationError(format!(
                    "Readout matrix row {:?} sums to {} instead of 1",
                    row, sum
                )));
            }
        }
        Self::new(matrix[0][1], matrix[1][0])
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// P(measure 1 | prepared 0)
    pub fn prob_meas1_prep0(&self) -> f64 {
        self.prob_meas1_prep0
    }

    /// P(measure 0 | prepared 1)
    pub fn prob_meas0_prep1(&self) -> f64 {
        self.prob_meas0_prep1
    }

    /// Assignment matrix, rows = true state, columns = observed state
    pub fn matrix(&self) -> [[f64; 2]; 2] {
        [
            [1.0 - self.prob_meas1_prep0, self.prob_meas1_prep0],
            [self.prob_meas0_prep1, 1.0 - self.prob_meas0_prep1],
        ]
    }

    /// Probability that the true bit is reported flipped
    pub fn flip_probability(&self, true_bit: bool) -> f64 {
        if true_bit {
            self.prob_meas0_prep1
        } else {
            self.prob_meas1_prep0
        }
    }

    /// Mean of the two flip probabilities
    pub fn average_error(&self) -> f64 {
        (self.prob_meas1_prep0 + self.prob_meas0_prep1) / 2.0
    }

    /// Check if readout is perfect
    pub fn is_ideal(&self) -> bool {
        self.prob_meas1_prep0 == 0.0 && self.prob_meas0_prep1 == 0.0
    }
}

impl Default for ReadoutError {
    fn default() -> Self {
        Self::ideal()
    }
}

impl fmt::Display for ReadoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ReadoutError(P(1|0)={:.4}, P(0|1)={:.4})",
            self.prob_meas1_prep0, self.prob_meas0_prep1
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_matrix_rows_are_true_state() {
        let ro = ReadoutError::new(0.015, 0.03).unwrap();
        let m = ro.matrix();

        assert_relative_eq!(m[0][0], 0.985);
        assert_relative_eq!(m[0][1], 0.015);
        assert_relative_eq!(m[1][0], 0.03);
        assert_relative_eq!(m[1][1], 0.97);
    }

    #[test]
    fn test_from_matrix_round_trips_orientation() {
        let ro = ReadoutError::from_matrix([[0.9, 0.1], [0.2, 0.8]]).unwrap();
        assert_relative_eq!(ro.prob_meas1_prep0(), 0.1);
        assert_relative_eq!(ro.prob_meas0_prep1(), 0.2);
        assert_relative_eq!(ro.flip_probability(true), 0.2);
    }

    #[test]
    fn test_from_matrix_rejects_bad_rows() {
        assert!(ReadoutError::from_matrix([[0.9, 0.2], [0.2, 0.8]]).is_err());
        assert!(ReadoutError::from_matrix([[1.1, -0.1], [0.0, 1.0]]).is_err());
    }

    #[test]
    fn test_ideal() {
        assert!(ReadoutError::ideal().is_ideal());
        assert!(!ReadoutError::symmetric(0.01).unwrap().is_ideal());
        assert!(ReadoutError::new(1.5, 0.0).is_err());
    }
}
