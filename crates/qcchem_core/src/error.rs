//! Error types for qcchem
//!
//! A single error enum shared by every crate in the workspace.

// Error variant fields are self-documenting via error messages
#![allow(missing_docs)]

use thiserror::Error;

/// Main error type for qcchem
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QcchemError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// Probability value out of range [0, 1]
    #[error("Invalid probability {0}: must be in range [0, 1]")]
    InvalidProbability(f64),

    /// Qubit index out of range
    #[error("Qubit {qubit} out of range: max is {max}")]
    QubitOutOfRange { qubit: usize, max: usize },

    /// Invalid bitstring format
    #[error("Invalid bitstring '{0}': must contain only '0' and '1'")]
    InvalidBitstring(String),

    /// Negative or non-finite noise scaling level
    #[error("Invalid noise level {0}: cannot have a negative error level")]
    InvalidNoiseLevel(f64),

    // ========================================================================
    // Measurement Basis Errors
    // ========================================================================
    /// Basis string contains a symbol outside {I, X, Y, Z}
    #[error("Unknown Pauli operator '{symbol}' in basis '{basis}'")]
    InvalidBasisSymbol { symbol: char, basis: String },

    /// Two bases disagree on a shared qubit
    #[error("The operators do not commute: {left} and {right} conflict on qubit {qubit}")]
    CommutationError {
        left: String,
        right: String,
        qubit: usize,
    },

    /// Results read from a basis before a run assigned them
    #[error("No results assigned yet for basis {0}")]
    ResultsNotYetAvailable(String),

    /// A Hamiltonian term that none of the measured bases contains
    #[error("Term {0} is not contained in any measured basis")]
    UnmeasuredTerm(String),

    // ========================================================================
    // Circuit Errors
    // ========================================================================
    /// Gate on non-existent qubit
    #[error("Gate references qubit {qubit} but circuit has only {num_qubits} qubits")]
    GateQubitMismatch { qubit: usize, num_qubits: usize },

    /// Measurement into a non-existent classical bit
    #[error("Measurement targets clbit {clbit} but circuit has only {num_clbits} clbits")]
    ClbitOutOfRange { clbit: usize, num_clbits: usize },

    /// Topology violation (qubits not connected)
    #[error("Topology violation: qubits {q1} and {q2} are not connected")]
    TopologyViolation { q1: usize, q2: usize },

    /// Gate that cannot be expressed in the target basis
    #[error("Gate '{0}' is not supported by the target")]
    UnsupportedGate(String),

    // ========================================================================
    // Topology Errors
    // ========================================================================
    /// Empty coupling map
    #[error("Coupling map is empty")]
    EmptyCouplingMap,

    /// Invalid coupling
    #[error("Invalid coupling ({0}, {1}): qubits must be different")]
    InvalidCoupling(usize, usize),

    // ========================================================================
    // Backend Errors
    // ========================================================================
    /// Backend resolution found no candidates
    #[error("No available backends match the specified criteria: {criteria}")]
    NoBackendsMatch { criteria: String },

    /// Backend execution error
    #[error("Backend error: {0}")]
    BackendError(String),

    /// Shots out of range
    #[error("Shots {0} out of range [1, {1}]")]
    ShotsOutOfRange(u64, u64),

    // ========================================================================
    // Job Errors
    // ========================================================================
    /// Job id unknown to the backend
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Job reached the failed terminal state
    #[error("Job {job_id} failed: {reason}")]
    JobFailed { job_id: String, reason: String },

    /// Job reached the cancelled terminal state
    #[error("Job {0} was cancelled")]
    JobCancelled(String),

    /// Polling gave up before the job reached a terminal state
    #[error("Job {job_id} not finished after {attempts} polls")]
    PollTimeout { job_id: String, attempts: u32 },

    /// Wrong number of jobs for an operation
    #[error("Expected {expected} job(s), got {found}")]
    InvalidJobCount { expected: usize, found: usize },

    /// Number of results does not match the number of bases
    #[error("Expected {expected} result(s), got {found}")]
    ResultCountMismatch { expected: usize, found: usize },

    /// Result has no counts
    #[error("No counts for experiment in job {0}")]
    MissingCounts(String),

    /// Result has no statevector
    #[error("No statevector for experiment in job {0}")]
    MissingStatevector(String),

    // ========================================================================
    // Calibration Errors
    // ========================================================================
    /// Qubit count needed for calibration is unknown
    #[error("Number of qubits cannot be inferred from the backend and none were supplied")]
    MissingQubitCount,

    /// No measurement filter stored for a pair
    #[error("No calibration filter for qubit pair ({0}, {1})")]
    CalibrationMissing(usize, usize),

    /// Pair must be two distinct qubits, lower first
    #[error("Invalid qubit pair ({0}, {1}): expected two distinct qubits, lower first")]
    InvalidQubitPair(usize, usize),

    /// Calibration error
    #[error("Calibration error: {0}")]
    CalibrationError(String),

    /// Assignment matrix cannot be inverted
    #[error("Calibration matrix is singular")]
    SingularMatrix,

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(String),

    /// File I/O error
    #[error("File error: {0}")]
    FileError(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result type alias for qcchem operations
pub type QcchemResult<T> = Result<T, QcchemError>;

// ============================================================================
// Error Conversion Helpers
// ============================================================================

impl From<serde_json::Error> for QcchemError {
    fn from(err: serde_json::Error) -> Self {
        QcchemError::JsonError(err.to_string())
    }
}

impl From<std::io::Error> for QcchemError {
    fn from(err: std::io::Error) -> Self {
        QcchemError::FileError(err.to_string())
    }
}

// ============================================================================
// Error Helpers
// ============================================================================

impl QcchemError {
    /// Check if error comes from job tracking
    pub fn is_job_error(&self) -> bool {
        matches!(
            self,
            QcchemError::JobNotFound(_)
                | QcchemError::JobFailed { .. }
                | QcchemError::JobCancelled(_)
                | QcchemError::PollTimeout { .. }
                | QcchemError::InvalidJobCount { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
