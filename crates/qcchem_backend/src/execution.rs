//! Backend execution types and traits
//!
//! Job identifiers and states, per-experiment results, the static
//! configuration a backend reports, and the `Backend` trait itself.
//!
//! Job states:
//!
//! ```text
//!   submit() ──→ Queued ──→ Validating ──→ Running ──→ Completed
//!                  │                          │
//!                  │                          ├──→ Failed(reason)
//!                  └──────────────────────────┴──→ Cancelled
//! ```

use crate::transpiler::{Transpiler, TranspilerConfig};
use qcchem_calibration::BackendProperties;
use qcchem_core::error::{QcchemError, QcchemResult};
use qcchem_core::types::{Counts, QubitId, Statevector};
use qcchem_core::Circuit;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Jobs
// ============================================================================

/// Unique identifier of a submitted job
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    /// Create a job id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<&JobId> for JobId {
    fn from(id: &JobId) -> Self {
        id.clone()
    }
}

/// Job status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Waiting in queue
    Queued,
    /// Being validated by the backend
    Validating,
    /// Executing
    Running,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Failed(String),
    /// Cancelled before finishing
    Cancelled,
}

impl JobStatus {
    /// Check if job is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed(_) | JobStatus::Cancelled
        )
    }

    /// Check if job is still in flight
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            JobStatus::Queued | JobStatus::Validating | JobStatus::Running
        )
    }

    /// Check if job completed successfully
    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Completed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "Queued"),
            JobStatus::Validating => write!(f, "Validating"),
            JobStatus::Running => write!(f, "Running"),
            JobStatus::Completed => write!(f, "Completed"),
            JobStatus::Failed(reason) => write!(f, "Failed: {}", reason),
            JobStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

// ============================================================================
// Results
// ============================================================================

/// Result of one circuit within a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResult {
    /// Circuit name
    pub name: Option<String>,

    /// Shots executed
    pub shots: u64,

    /// Measurement counts (counts method)
    pub counts: Option<Counts>,

    /// Final amplitudes (statevector method)
    pub statevector: Option<Statevector>,

    /// Whether the experiment ran successfully
    pub success: bool,
}

impl ExperimentResult {
    /// Successful counts result
    pub fn from_counts(name: Option<String>, shots: u64, counts: Counts) -> Self {
        Self {
            name,
            shots,
            counts: Some(counts),
            statevector: None,
            success: true,
        }
    }

    /// Successful statevector result
    pub fn from_statevector(name: Option<String>, statevector: Statevector) -> Self {
        Self {
            name,
            shots: 1,
            counts: None,
            statevector: Some(statevector),
            success: true,
        }
    }

    /// Sum of all counts
    pub fn total_counts(&self) -> u64 {
        self.counts
            .as_ref()
            .map(|c| c.values().sum())
            .unwrap_or(0)
    }

    /// Relative frequency of a bitstring
    pub fn probability(&self, bitstring: &str) -> f64 {
        let total = self.total_counts();
        if total == 0 {
            return 0.0;
        }
        let count = self
            .counts
            .as_ref()
            .and_then(|c| c.get(bitstring))
            .copied()
            .unwrap_or(0);
        count as f64 / total as f64
    }
}

/// Final result of a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    /// Job the result belongs to
    pub job_id: JobId,

    /// Backend that ran the job
    pub backend: String,

    /// One entry per submitted circuit, in submission order
    pub results: Vec<ExperimentResult>,
}

impl JobResult {
    /// Counts of every experiment, in submission order
    pub fn get_counts(&self) -> QcchemResult<Vec<Counts>> {
        self.results
            .iter()
            .map(|r| {
                r.counts
                    .clone()
                    .ok_or_else(|| QcchemError::MissingCounts(self.job_id.to_string()))
            })
            .collect()
    }

    /// Statevector of the first experiment
    pub fn get_statevector(&self) -> QcchemResult<Statevector> {
        self.results
            .first()
            .and_then(|r| r.statevector.clone())
            .ok_or_else(|| QcchemError::MissingStatevector(self.job_id.to_string()))
    }

    /// Number of experiments
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Check if the job carried no experiments
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> QcchemResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> QcchemResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Static description of a backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfiguration {
    /// Intrinsic backend name
    pub backend_name: String,

    /// Number of qubits
    pub n_qubits: usize,

    /// Native gate names
    pub basis_gates: Vec<String>,

    /// Allowed two-qubit couplings (None = all-to-all)
    pub coupling_map: Option<Vec<(QubitId, QubitId)>>,

    /// Largest shot count per job
    pub max_shots: u64,

    /// Largest number of circuits per job (None = not reported)
    #[serde(default)]
    pub max_experiments: Option<usize>,

    /// Whether the backend is a simulator
    pub simulator: bool,
}

impl BackendConfiguration {
    /// Check a shot count against `max_shots`
    pub fn validate_shots(&self, shots: u64) -> QcchemResult<()> {
        if shots == 0 || shots > self.max_shots {
            return Err(QcchemError::ShotsOutOfRange(shots, self.max_shots));
        }
        Ok(())
    }

    /// Check if a gate name is native
    pub fn supports_gate(&self, name: &str) -> bool {
        self.basis_gates.iter().any(|g| g == name)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> QcchemResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON; `max_experiments` may be absent
    pub fn from_json(json: &str) -> QcchemResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// Backend Trait
// ============================================================================

/// Quantum backend: a device or simulator that runs jobs
pub trait Backend: Send + Sync {
    /// Intrinsic backend name
    fn name(&self) -> &str;

    /// Name assigned to synthetic backends, preferred for display
    fn custom_name(&self) -> Option<&str> {
        None
    }

    /// Static configuration
    fn configuration(&self) -> &BackendConfiguration;

    /// Calibration snapshot, if the backend reports one
    fn properties(&self) -> Option<&BackendProperties> {
        None
    }

    /// Compile a circuit for this backend
    fn transpile(&self, circuit: &Circuit) -> QcchemResult<Circuit> {
        Transpiler::new(TranspilerConfig::for_configuration(self.configuration())).run(circuit)
    }

    /// Submit circuits as one job
    fn submit(&self, circuits: &[Circuit], shots: u64) -> QcchemResult<JobId>;

    /// Current status of a job
    fn job_status(&self, job_id: &JobId) -> QcchemResult<JobStatus>;

    /// Result of a completed job
    fn job_result(&self, job_id: &JobId) -> QcchemResult<JobResult>;

    /// Check if this backend is a simulator
    fn is_simulator(&self) -> bool {
        self.configuration().simulator
    }
}

// ============================================================================
// Tests
// ============================================================================
