//! Noise model for qcchem
//!
//! Depolarizing gate errors and readout errors applied by the local
//! simulator. Defaults cover all qubits; device-calibrated models add
//! per-qubit and per-pair overrides.

use crate::readout::ReadoutError;
use qcchem_core::error::{QcchemError, QcchemResult};
use qcchem_core::types::{Probability, QubitId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Two-qubit gate error on a specific pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairGateError {
    /// Qubit pair (unordered)
    pub qubits: (QubitId, QubitId),

    /// Depolarizing probability
    pub error: f64,
}

/// Noise model for the local simulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseModel {
    /// All-qubit single-qubit depolarizing probability
    gate_error_1q: f64,

    /// All-qubit two-qubit depolarizing probability
    gate_error_2q: f64,

    /// All-qubit readout error
    readout: ReadoutError,

    /// Per-qubit single-qubit gate errors
    #[serde(default)]
    qubit_gate_errors: BTreeMap<QubitId, f64>,

    /// Per-pair two-qubit gate errors
    #[serde(default)]
    pair_gate_errors: Vec<PairGateError>,

    /// Per-qubit readout errors
    #[serde(default)]
    qubit_readout_errors: BTreeMap<QubitId, ReadoutError>,
}

impl NoiseModel {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a new noise model with validation
    pub fn new(gate_error_1q: f64, gate_error_2q: f64, readout: ReadoutError) -> QcchemResult<Self> {
        let model = Self {
            gate_error_1q,
            gate_error_2q,
            readout,
            ..Self::ideal()
        };
        model.validate()?;
        Ok(model)
    }

    /// Create ideal (noiseless) model
    pub fn ideal() -> Self {
        Self {
            gate_error_1q: 0.0,
            gate_error_2q: 0.0,
            readout: ReadoutError::ideal(),
            qubit_gate_errors: BTreeMap::new(),
            pair_gate_errors: Vec::new(),
            qubit_readout_errors: BTreeMap::new(),
        }
    }

    /// Gate errors only, perfect readout
    pub fn depolarizing(gate_error_1q: f64, gate_error_2q: f64) -> QcchemResult<Self> {
        Self::new(gate_error_1q, gate_error_2q, ReadoutError::ideal())
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Set single-qubit gate error
    pub fn with_gate_error_1q(mut self, error: f64) -> Self {
        self.gate_error_1q = error;
        self
    }

    /// Set two-qubit gate error
    pub fn with_gate_error_2q(mut self, error: f64) -> Self {
        self.gate_error_2q = error;
        self
    }

    /// Set all-qubit readout error
    pub fn with_readout_error(mut self, readout: ReadoutError) -> Self {
        self.readout = readout;
        self
    }

    /// Override the single-qubit gate error of one qubit
    pub fn with_qubit_gate_error(mut self, qubit: QubitId, error: f64) -> Self {
        self.qubit_gate_errors.insert(qubit, error);
        self
    }

    /// Override the two-qubit gate error of one pair (either orientation)
    pub fn with_pair_gate_error(mut self, q1: QubitId, q2: QubitId, error: f64) -> Self {
        self.pair_gate_errors
            .retain(|p| !Self::same_pair(p.qubits, (q1, q2)));
        self.pair_gate_errors.push(PairGateError {
            qubits: (q1, q2),
            error,
        });
        self
    }

    /// Override the readout error of one qubit
    pub fn with_qubit_readout_error(mut self, qubit: QubitId, readout: ReadoutError) -> Self {
        self.qubit_readout_errors.insert(qubit, readout);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// All-qubit single-qubit gate error
    pub fn gate_error_1q(&self) -> f64 {
        self.gate_error_1q
    }

    /// All-qubit two-qubit gate error
    pub fn gate_error_2q(&self) -> f64 {
        self.gate_error_2q
    }

    /// All-qubit readout error
    pub fn readout_error(&self) -> &ReadoutError {
        &self.readout
    }

    /// Single-qubit gate error on a qubit
    pub fn gate_error_1q_on(&self, qubit: QubitId) -> f64 {
        self.qubit_gate_errors
            .get(&qubit)
            .copied()
            .unwrap_or(self.gate_error_1q)
    }

    /// Two-qubit gate error on a pair
    pub fn gate_error_2q_on(&self, q1: QubitId, q2: QubitId) -> f64 {
        self.pair_gate_errors
            .iter()
            .find(|p| Self::same_pair(p.qubits, (q1, q2)))
            .map(|p| p.error)
            .unwrap_or(self.gate_error_2q)
    }

    /// Readout error on a qubit
    pub fn readout_error_on(&self, qubit: QubitId) -> &ReadoutError {
        self.qubit_readout_errors.get(&qubit).unwrap_or(&self.readout)
    }

    /// Check if no channel carries any error
    pub fn is_ideal(&self) -> bool {
        self.gate_error_1q == 0.0
            && self.gate_error_2q == 0.0
            && self.readout.is_ideal()
            && self.qubit_gate_errors.values().all(|&e| e == 0.0)
            && self.pair_gate_errors.iter().all(|p| p.error == 0.0)
            && self.qubit_readout_errors.values().all(|r| r.is_ideal())
    }

    fn same_pair(a: (QubitId, QubitId), b: (QubitId, QubitId)) -> bool {
        a == b || a == (b.1, b.0)
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check every probability lies in [0, 1]
    pub fn validate(&self) -> QcchemResult<()> {
        let gate_errors = [self.gate_error_1q, self.gate_error_2q]
            .into_iter()
            .chain(self.qubit_gate_errors.values().copied())
            .chain(self.pair_gate_errors.iter().map(|p| p.error));

        for e in gate_errors {
            Probability::new(e).map_err(|_| {
                QcchemError::CalibrationError(format!("Gate error must be in [0,1]: {}", e))
            })?;
        }

        for ro in std::iter::once(&self.readout).chain(self.qubit_readout_errors.values()) {
            ReadoutError::new(ro.prob_meas1_prep0(), ro.prob_meas0_prep1())?;
        }

        Ok(())
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Serialize to JSON
    pub fn to_json(&self) -> QcchemResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON, validating the result
    pub fn from_json(json: &str) -> QcchemResult<Self> {
        let model: Self = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }
}

impl Default for NoiseModel {
    fn default() -> Self {
        Self::ideal()
    }
}

impl fmt::Display for NoiseModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NoiseModel(1Q={:.4}, 2Q={:.4}, RO=({:.4}, {:.4}), {} overrides)",
            self.gate_error_1q,
            self.gate_error_2q,
            self.readout.prob_meas1_prep0(),
            self.readout.prob_meas0_prep1(),
            self.qubit_gate_errors.len()
                + self.pair_gate_errors.len()
                + self.qubit_readout_errors.len()
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
