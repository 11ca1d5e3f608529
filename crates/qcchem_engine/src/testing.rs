//! Test doubles: a hardware-like backend with scripted job states and a
//! sleeper that records instead of blocking.

use crate::polling::Sleeper;
use qcchem_backend::{
    Backend, BackendConfiguration, JobId, JobResult, JobStatus, SimulatorBackend,
};
use qcchem_calibration::{fake_device, BackendProperties};
use qcchem_core::error::QcchemResult;
use qcchem_core::Circuit;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Device-like backend: finite `max_experiments`, scripted status sequence
pub(crate) struct ScriptedBackend {
    inner: SimulatorBackend,
    configuration: BackendConfiguration,
    script: Vec<JobStatus>,
    polls: Mutex<HashMap<JobId, usize>>,
    submissions: Mutex<Vec<usize>>,
}

impl ScriptedBackend {
    /// Noiseless device without calibration data
    pub(crate) fn new(max_experiments: usize) -> Self {
        Self::wrap(SimulatorBackend::qasm().with_seed(11), "ibmq_scripted", max_experiments)
    }

    /// Device backed by a fake calibration snapshot
    pub(crate) fn from_device(device: &str, max_experiments: usize) -> Self {
        let props = fake_device(device).unwrap();
        let name = format!("ibmq_{}", device);
        Self::wrap(
            SimulatorBackend::from_device(props).with_seed(11),
            &name,
            max_experiments,
        )
    }

    fn wrap(inner: SimulatorBackend, name: &str, max_experiments: usize) -> Self {
        let mut configuration = inner.configuration().clone();
        configuration.backend_name = name.to_string();
        configuration.max_experiments = Some(max_experiments);
        configuration.simulator = false;
        Self {
            inner,
            configuration,
            script: Vec::new(),
            polls: Mutex::new(HashMap::new()),
            submissions: Mutex::new(Vec::new()),
        }
    }

    /// Statuses reported on successive polls; the last one repeats
    pub(crate) fn with_script(mut self, script: Vec<JobStatus>) -> Self {
        self.script = script;
        self
    }

    /// Circuits per submitted job, in submission order
    pub(crate) fn submissions(&self) -> Vec<usize> {
        self.submissions.lock().unwrap().clone()
    }
}

impl Backend for ScriptedBackend {
    fn name(&self) -> &str {
        &self.configuration.backend_name
    }

    fn configuration(&self) -> &BackendConfiguration {
        &self.configuration
    }

    fn properties(&self) -> Option<&BackendProperties> {
        self.inner.properties()
    }

    fn submit(&self, circuits: &[Circuit], shots: u64) -> QcchemResult<JobId> {
        self.submissions.lock().unwrap().push(circuits.len());
        self.inner.submit(circuits, shots)
    }

    fn job_status(&self, job_id: &JobId) -> QcchemResult<JobStatus> {
        self.inner.job_status(job_id)?;
        if self.script.is_empty() {
            return Ok(JobStatus::Completed);
        }
        let mut polls = self.polls.lock().unwrap();
        let n = polls.entry(job_id.clone()).or_insert(0);
        let status = self.script[(*n).min(self.script.len() - 1)].clone();
        *n += 1;
        Ok(status)
    }

    fn job_result(&self, job_id: &JobId) -> QcchemResult<JobResult> {
        self.inner.job_result(job_id)
    }
}

/// Records requested sleeps
#[derive(Default)]
pub(crate) struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub(crate) fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}
