//! Backend wrapper
//!
//! Uniform view over any backend: capability classification, batching of
//! circuits into jobs within the backend's per-job limit, and blocking
//! retrieval of job results.

use crate::config::EngineConfig;
use crate::polling::{PollingPolicy, Sleeper, ThreadSleeper};
use log::{debug, warn};
use qcchem_backend::{Backend, BackendConfiguration, JobId, JobResult};
use qcchem_calibration::BackendProperties;
use qcchem_core::error::QcchemResult;
use qcchem_core::names;
use qcchem_core::types::QubitId;
use qcchem_core::Circuit;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Capability façade over a backend
#[derive(Clone)]
pub struct BackendWrapper {
    backend: Arc<dyn Backend>,
    config: EngineConfig,
    sleeper: Arc<dyn Sleeper>,
}

impl BackendWrapper {
    /// Wrap a backend with default configuration
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            config: EngineConfig::default(),
            sleeper: Arc::new(ThreadSleeper),
        }
    }

    /// Set engine configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the sleeper used between polls
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    // ========================================================================
    // Derived Properties
    // ========================================================================

    /// Custom name if assigned, else the backend's own name
    pub fn name(&self) -> &str {
        self.backend.custom_name().unwrap_or_else(|| self.backend.name())
    }

    /// Qubit count from calibration data; None without it
    pub fn n_qubits(&self) -> Option<usize> {
        self.backend.properties().map(BackendProperties::num_qubits)
    }

    /// Qubit -> neighbours through a 2-qubit gate; None without calibration data
    pub fn connectivity(&self) -> Option<BTreeMap<QubitId, Vec<QubitId>>> {
        self.backend.properties().map(BackendProperties::connectivity)
    }

    /// Local simulator (the hosted simulator counts as hardware)
    pub fn is_aer(&self) -> bool {
        (self.backend.name().contains(names::QASM_SIMULATOR)
            && self.name() != names::HOSTED_QASM_SIMULATOR)
            || self.is_statevector()
    }

    /// Returns amplitudes rather than counts
    pub fn is_statevector(&self) -> bool {
        names::is_statevector(self.name())
    }

    /// Carries no noise at all
    pub fn is_noiseless(&self) -> bool {
        self.is_statevector() || self.name() == names::NOISELESS_SIM
    }

    /// Circuits per job (None = unbounded)
    pub fn max_experiments(&self) -> Option<usize> {
        if self.is_aer() {
            return None;
        }
        Some(
            self.backend
                .configuration()
                .max_experiments
                .unwrap_or(self.config.default_max_experiments),
        )
    }

    // ========================================================================
    // Capabilities
    // ========================================================================

    /// Wrapped backend
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Backend configuration
    pub fn configuration(&self) -> &BackendConfiguration {
        self.backend.configuration()
    }

    /// Backend calibration data
    pub fn properties(&self) -> Option<&BackendProperties> {
        self.backend.properties()
    }

    /// Compile a circuit for the backend
    pub fn transpile(&self, circuit: &Circuit) -> QcchemResult<Circuit> {
        self.backend.transpile(circuit)
    }

    /// Look up a previously submitted job by id
    pub fn retrieve_job(&self, job_id: impl Into<JobId>) -> QcchemResult<JobId> {
        let job_id = job_id.into();
        self.backend.job_status(&job_id)?;
        Ok(job_id)
    }

    /// Polling policy derived from the engine configuration
    pub fn polling(&self) -> PollingPolicy {
        self.config.polling_policy()
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Submit circuits in consecutive chunks of at most `max_experiments`
    ///
    /// Jobs are returned in submission order; concatenating their circuits
    /// gives back the input order.
    pub fn circuits2jobs(&self, circuits: &[Circuit], shots: u64) -> QcchemResult<Vec<JobId>> {
        let chunk = self.max_experiments().unwrap_or(circuits.len()).max(1);
        debug!(
            "{}: {} circuits in chunks of {}",
            self.name(),
            circuits.len(),
            chunk
        );

        circuits
            .chunks(chunk)
            .map(|c| self.backend.submit(c, shots))
            .collect()
    }

    /// Block until a job is terminal and return its result
    pub fn wait_for(&self, job_id: &JobId) -> QcchemResult<JobResult> {
        self.polling()
            .wait_for(self.backend.as_ref(), job_id, self.sleeper.as_ref())
            .map_err(|err| {
                if err.is_job_error() {
                    warn!("{}: job {} did not complete: {}", self.name(), job_id, err);
                }
                err
            })
    }
}

impl fmt::Debug for BackendWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendWrapper")
            .field("name", &self.name())
            .field("is_aer", &self.is_aer())
            .field("is_statevector", &self.is_statevector())
            .finish()
    }
}

impl fmt::Display for BackendWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BackendWrapper({})", self.name())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedBackend;
    use qcchem_backend::SimulatorBackend;
    use qcchem_calibration::fake_device;
    use qcchem_core::CircuitBuilder;

    fn wrap(backend: impl Backend + 'static) -> BackendWrapper {
        BackendWrapper::new(Arc::new(backend))
    }

    fn named_circuits(n: usize) -> Vec<Circuit> {
        (0..n)
            .map(|i| {
                let mut c = CircuitBuilder::with_clbits(1, 1).measure(0, 0).build();
                c.set_name(format!("c{}", i));
                c
            })
            .collect()
    }

    #[test]
    fn test_classification() {
        let qasm = wrap(SimulatorBackend::qasm());
        assert!(qasm.is_aer());
        assert!(!qasm.is_statevector());
        assert!(!qasm.is_noiseless());
        assert_eq!(qasm.n_qubits(), None);
        assert_eq!(qasm.connectivity(), None);

        let sv = wrap(SimulatorBackend::statevector());
        assert!(sv.is_aer() && sv.is_statevector() && sv.is_noiseless());

        let sim0 = wrap(SimulatorBackend::qasm().with_custom_name("sim0"));
        assert_eq!(sim0.name(), "sim0");
        assert!(sim0.is_aer() && sim0.is_noiseless());

        let hosted = wrap(SimulatorBackend::hosted());
        assert!(!hosted.is_aer());
        assert_eq!(hosted.max_experiments(), Some(300));

        let hardware = wrap(ScriptedBackend::new(7));
        assert!(!hardware.is_aer());
        assert_eq!(hardware.max_experiments(), Some(7));
    }

    #[test]
    fn test_device_simulator_properties() {
        let wrapper = wrap(SimulatorBackend::from_device(fake_device("manila").unwrap()));
        assert!(wrapper.is_aer());
        assert_eq!(wrapper.n_qubits(), Some(5));
        assert_eq!(wrapper.connectivity().unwrap()[&2], vec![1, 3]);
    }

    #[test]
    fn test_default_max_experiments_when_unreported() {
        let wrapper = wrap(SimulatorBackend::qasm().with_name("ibmq_device"));
        assert!(wrapper.configuration().max_experiments.is_none());
        assert_eq!(wrapper.max_experiments(), Some(300));

        let wrapper = wrapper.with_config(EngineConfig::default().with_default_max_experiments(12));
        assert_eq!(wrapper.max_experiments(), Some(12));
    }

    #[test]
    fn test_chunking_preserves_order() {
        let backend = Arc::new(ScriptedBackend::new(3));
        let wrapper = BackendWrapper::new(backend.clone());

        let jobs = wrapper.circuits2jobs(&named_circuits(7), 10).unwrap();
        assert_eq!(jobs.len(), 3);
        assert_eq!(backend.submissions(), vec![3, 3, 1]);

        let names: Vec<String> = jobs
            .iter()
            .flat_map(|j| wrapper.wait_for(j).unwrap().results)
            .map(|r| r.name.unwrap())
            .collect();
        let expected: Vec<String> = (0..7).map(|i| format!("c{}", i)).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_simulators_take_one_job() {
        let wrapper = wrap(SimulatorBackend::qasm());
        assert_eq!(wrapper.circuits2jobs(&named_circuits(500), 1).unwrap().len(), 1);
        assert!(wrapper.circuits2jobs(&[], 1).unwrap().is_empty());
    }

    #[test]
    fn test_retrieve_job() {
        let wrapper = wrap(SimulatorBackend::qasm());
        let jobs = wrapper.circuits2jobs(&named_circuits(1), 1).unwrap();

        assert_eq!(wrapper.retrieve_job(jobs[0].as_str()).unwrap(), jobs[0]);
        assert!(wrapper.retrieve_job("nope").is_err());
    }
}
