//! Statevector pipeline
//!
//! Same call shape as the counts pipeline, but one circuit per request and
//! exact amplitudes back. Bases and shots are accepted and ignored.

use crate::counts::MeasurementBases;
use crate::wrapper::BackendWrapper;
use qcchem_backend::JobId;
use qcchem_core::error::{QcchemError, QcchemResult};
use qcchem_core::types::Statevector;
use qcchem_core::Circuit;

/// Amplitude-returning backend
#[derive(Debug, Clone)]
pub struct StatevectorBackend {
    wrapper: BackendWrapper,
}

impl StatevectorBackend {
    /// Create from a wrapped backend
    pub fn new(wrapper: BackendWrapper) -> Self {
        Self { wrapper }
    }

    /// Underlying wrapper
    pub fn wrapper(&self) -> &BackendWrapper {
        &self.wrapper
    }

    /// The compiled circuit, alone
    pub fn circ2circuits(&self, circuit: &Circuit) -> QcchemResult<Vec<Circuit>> {
        Ok(vec![self.wrapper.transpile(circuit)?])
    }

    /// Statevector of the single job
    pub fn jobs2vector<I, J>(&self, jobs: I) -> QcchemResult<Statevector>
    where
        I: IntoIterator<Item = J>,
        J: Into<JobId>,
    {
        let jobs: Vec<JobId> = jobs.into_iter().map(Into::into).collect();
        let [job_id] = jobs.as_slice() else {
            return Err(QcchemError::InvalidJobCount {
                expected: 1,
                found: jobs.len(),
            });
        };

        self.wrapper.backend().job_result(job_id)?.get_statevector()
    }

    /// Alias of `jobs2vector`
    pub fn jobs2counts<I, J>(&self, jobs: I) -> QcchemResult<Statevector>
    where
        I: IntoIterator<Item = J>,
        J: Into<JobId>,
    {
        self.jobs2vector(jobs)
    }

    /// Final amplitudes of a circuit
    pub fn run(
        &self,
        circuit: &Circuit,
        _bases: MeasurementBases,
        _shots: u64,
    ) -> QcchemResult<Statevector> {
        let circuits = self.circ2circuits(circuit)?;
        let jobs = self.wrapper.circuits2jobs(&circuits, 1)?;
        self.jobs2vector(jobs)
    }
}

// ============================================================================
// Tests
// ============================================================================
