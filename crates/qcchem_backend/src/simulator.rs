//! Local simulator backend
//!
//! Statevector simulation with optional depolarizing gate noise and
//! per-qubit readout flips. Jobs execute synchronously on submit and the
//! results are kept in an in-memory store until fetched.

use crate::execution::{
    Backend, BackendConfiguration, ExperimentResult, JobId, JobResult, JobStatus,
};
use crate::transpiler::{DEVICE_BASIS_GATES, SIMULATOR_BASIS_GATES};
use log::debug;
use num_complex::Complex64;
use qcchem_calibration::BackendProperties;
use qcchem_core::constants::{execution, names};
use qcchem_core::error::{QcchemError, QcchemResult};
use qcchem_core::types::{ClbitId, Counts, QubitId, Statevector};
use qcchem_core::{Circuit, Gate};
use qcchem_noise::NoiseModel;
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;
use std::collections::{HashMap, HashSet};
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_4};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Widest circuit the local simulator accepts
pub const SIMULATOR_MAX_QUBITS: usize = 20;

/// Largest shot count per job
pub const SIMULATOR_MAX_SHOTS: u64 = 1_000_000;

/// What a simulator job returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationMethod {
    /// Sampled measurement counts
    Counts,
    /// Exact final amplitudes, measurements and noise ignored
    Statevector,
}

/// Simulator backend with noise model
pub struct SimulatorBackend {
    /// Name assigned by whoever built this backend
    custom_name: Option<String>,

    method: SimulationMethod,

    noise_model: NoiseModel,

    configuration: BackendConfiguration,

    /// Calibration snapshot of the device being imitated
    properties: Option<BackendProperties>,

    /// Base seed; job `k` runs with `seed + k`
    seed: Option<u64>,

    jobs: RwLock<HashMap<JobId, JobResult>>,

    next_job: AtomicU64,
}

impl SimulatorBackend {
    // ========================================================================
    // Constructors
    // ========================================================================

    fn new(name: &str, method: SimulationMethod, noise_model: NoiseModel) -> Self {
        Self {
            custom_name: None,
            method,
            noise_model,
            configuration: BackendConfiguration {
                backend_name: name.to_string(),
                n_qubits: SIMULATOR_MAX_QUBITS,
                basis_gates: SIMULATOR_BASIS_GATES.iter().map(|s| s.to_string()).collect(),
                coupling_map: None,
                max_shots: SIMULATOR_MAX_SHOTS,
                max_experiments: None,
                simulator: true,
            },
            properties: None,
            seed: None,
            jobs: RwLock::new(HashMap::new()),
            next_job: AtomicU64::new(0),
        }
    }

    /// Noiseless counts simulator
    pub fn qasm() -> Self {
        Self::new(names::QASM_SIMULATOR, SimulationMethod::Counts, NoiseModel::ideal())
    }

    /// Statevector simulator
    pub fn statevector() -> Self {
        Self::new(
            names::STATEVECTOR_SIMULATOR,
            SimulationMethod::Statevector,
            NoiseModel::ideal(),
        )
    }

    /// Counts simulator with a noise model
    pub fn from_noise_model(noise_model: NoiseModel) -> Self {
        Self::new(names::QASM_SIMULATOR, SimulationMethod::Counts, noise_model)
    }

    /// Counts simulator imitating a device's basis, coupling and noise
    pub fn from_device(properties: BackendProperties) -> Self {
        let name = format!("{}({})", names::QASM_SIMULATOR, properties.backend_name);
        let mut backend = Self::new(
            &name,
            SimulationMethod::Counts,
            properties.to_noise_model(),
        );
        backend.configuration.n_qubits = properties.num_qubits();
        backend.configuration.basis_gates =
            DEVICE_BASIS_GATES.iter().map(|s| s.to_string()).collect();
        backend.configuration.coupling_map = Some(properties.coupling_map());
        backend.properties = Some(properties);
        backend
    }

    /// Vendor-hosted simulator: runs locally but batches like hardware
    pub fn hosted() -> Self {
        Self::qasm()
            .with_name(names::HOSTED_QASM_SIMULATOR)
            .with_max_experiments(execution::DEFAULT_MAX_EXPERIMENTS)
    }

    /// Set seed for reproducibility
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the name shown in place of the intrinsic one
    pub fn with_custom_name(mut self, name: impl Into<String>) -> Self {
        self.custom_name = Some(name.into());
        self
    }

    /// Set intrinsic backend name
    pub fn with_name(mut self, name: &str) -> Self {
        self.configuration.backend_name = name.to_string();
        self
    }

    /// Report a per-job circuit limit
    pub fn with_max_experiments(mut self, max: usize) -> Self {
        self.configuration.max_experiments = Some(max);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Simulation method
    pub fn method(&self) -> SimulationMethod {
        self.method
    }

    /// Noise model applied to counts jobs
    pub fn noise_model(&self) -> &NoiseModel {
        &self.noise_model
    }

    // ========================================================================
    // Simulation
    // ========================================================================

    fn run_experiment(
        &self,
        circuit: &Circuit,
        shots: u64,
        rng: &mut StdRng,
    ) -> QcchemResult<ExperimentResult> {
        let name = circuit.name().map(str::to_string);
        match self.method {
            SimulationMethod::Statevector => {
                let mut state = initial_state(circuit.num_qubits());
                for gate in circuit.gates() {
                    apply_gate(&mut state, gate);
                }
                Ok(ExperimentResult::from_statevector(name, state))
            }
            SimulationMethod::Counts => {
                let counts = self.sample_counts(circuit, shots, rng)?;
                Ok(ExperimentResult::from_counts(name, shots, counts))
            }
        }
    }

    fn sample_counts(
        &self,
        circuit: &Circuit,
        shots: u64,
        rng: &mut StdRng,
    ) -> QcchemResult<Counts> {
        let measurements = terminal_measurements(circuit)?;
        let mut counts = Counts::new();

        if measurements.is_empty() {
            counts.insert("0".repeat(circuit.num_clbits()), shots);
            return Ok(counts);
        }

        let noisy = circuit.gates().iter().any(|g| self.gate_error(g) > 0.0);

        if noisy {
            for _ in 0..shots {
                let mut state = initial_state(circuit.num_qubits());
                for gate in circuit.gates() {
                    apply_gate(&mut state, gate);
                    self.depolarize(&mut state, gate, rng);
                }
                let index = sample_index(&probabilities(&state), rng)?;
                let key = self.readout(index, &measurements, circuit.num_clbits(), rng);
                *counts.entry(key).or_insert(0) += 1;
            }
        } else {
            let mut state = initial_state(circuit.num_qubits());
            for gate in circuit.gates() {
                apply_gate(&mut state, gate);
            }
            let dist = WeightedIndex::new(probabilities(&state))
                .map_err(|e| QcchemError::InternalError(e.to_string()))?;
            for _ in 0..shots {
                let index = dist.sample(rng);
                let key = self.readout(index, &measurements, circuit.num_clbits(), rng);
                *counts.entry(key).or_insert(0) += 1;
            }
        }

        Ok(counts)
    }

    /// Depolarizing probability attached to a gate
    fn gate_error(&self, gate: &Gate) -> f64 {
        if gate.is_virtual() {
            return 0.0;
        }
        match gate.qubits().as_slice() {
            [a, b] if gate.is_two_qubit() => self.noise_model.gate_error_2q_on(*a, *b),
            [q] if gate.is_single_qubit() => self.noise_model.gate_error_1q_on(*q),
            _ => 0.0,
        }
    }

    /// With the gate's error probability, apply a random Pauli to each of its qubits
    fn depolarize(&self, state: &mut [Complex64], gate: &Gate, rng: &mut StdRng) {
        let p = self.gate_error(gate);
        if p <= 0.0 || rng.gen::<f64>() >= p {
            return;
        }
        for q in gate.qubits() {
            match rng.gen_range(0..4) {
                1 => apply_x(state, q),
                2 => apply_y(state, q),
                3 => apply_z(state, q),
                _ => {}
            }
        }
    }

    /// Classical key for a sampled basis state, highest clbit first
    fn readout(
        &self,
        index: usize,
        measurements: &[(QubitId, ClbitId)],
        num_clbits: usize,
        rng: &mut StdRng,
    ) -> String {
        let mut bits = vec![false; num_clbits];
        for &(q, c) in measurements {
            let bit = (index >> q) & 1 == 1;
            let flip = self.noise_model.readout_error_on(q).flip_probability(bit);
            bits[c] = if flip > 0.0 && rng.gen::<f64>() < flip {
                !bit
            } else {
                bit
            };
        }
        bits.iter()
            .rev()
            .map(|&b| if b { '1' } else { '0' })
            .collect()
    }
}

impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.configuration.backend_name
    }

    fn custom_name(&self) -> Option<&str> {
        self.custom_name.as_deref()
    }

    fn configuration(&self) -> &BackendConfiguration {
        &self.configuration
    }

    fn properties(&self) -> Option<&BackendProperties> {
        self.properties.as_ref()
    }

    fn submit(&self, circuits: &[Circuit], shots: u64) -> QcchemResult<JobId> {
        self.configuration.validate_shots(shots)?;
        for circuit in circuits {
            if circuit.num_qubits() > self.configuration.n_qubits {
                return Err(QcchemError::QubitOutOfRange {
                    qubit: circuit.num_qubits() - 1,
                    max: self.configuration.n_qubits.saturating_sub(1),
                });
            }
        }

        let k = self.next_job.fetch_add(1, Ordering::SeqCst);
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(k)),
            None => StdRng::from_entropy(),
        };

        let results = circuits
            .iter()
            .map(|c| self.run_experiment(c, shots, &mut rng))
            .collect::<QcchemResult<Vec<_>>>()?;

        let job_id = JobId::new(format!("{}-{}", self.name(), k));
        debug!(
            "{}: job {} ran {} circuits x {} shots",
            self.name(),
            job_id,
            circuits.len(),
            shots
        );

        let result = JobResult {
            job_id: job_id.clone(),
            backend: self.name().to_string(),
            results,
        };
        self.jobs
            .write()
            .map_err(|_| QcchemError::InternalError("job store lock poisoned".into()))?
            .insert(job_id.clone(), result);

        Ok(job_id)
    }

    fn job_status(&self, job_id: &JobId) -> QcchemResult<JobStatus> {
        let jobs = self
            .jobs
            .read()
            .map_err(|_| QcchemError::InternalError("job store lock poisoned".into()))?;
        if jobs.contains_key(job_id) {
            Ok(JobStatus::Completed)
        } else {
            Err(QcchemError::JobNotFound(job_id.to_string()))
        }
    }

    fn job_result(&self, job_id: &JobId) -> QcchemResult<JobResult> {
        self.jobs
            .read()
            .map_err(|_| QcchemError::InternalError("job store lock poisoned".into()))?
            .get(job_id)
            .cloned()
            .ok_or_else(|| QcchemError::JobNotFound(job_id.to_string()))
    }
}

// ============================================================================
// Sampling Helpers
// ============================================================================

/// Measured (qubit, clbit) pairs; no unitary may follow a measurement on its qubit
fn terminal_measurements(circuit: &Circuit) -> QcchemResult<Vec<(QubitId, ClbitId)>> {
    let mut measured = HashSet::new();
    for gate in circuit.gates() {
        match gate {
            Gate::Measure(q, _) => {
                measured.insert(*q);
            }
            Gate::Barrier(_) => {}
            g => {
                if let Some(q) = g.qubits().into_iter().find(|q| measured.contains(q)) {
                    return Err(QcchemError::BackendError(format!(
                        "Gate {} acts on qubit {} after it was measured",
                        g, q
                    )));
                }
            }
        }
    }
    Ok(circuit.measurements())
}

fn initial_state(num_qubits: usize) -> Statevector {
    let mut state = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
    state[0] = Complex64::new(1.0, 0.0);
    state
}

fn probabilities(state: &[Complex64]) -> Vec<f64> {
    state.iter().map(|c| c.norm_sqr()).collect()
}

fn sample_index(probs: &[f64], rng: &mut StdRng) -> QcchemResult<usize> {
    let dist =
        WeightedIndex::new(probs).map_err(|e| QcchemError::InternalError(e.to_string()))?;
    Ok(dist.sample(rng))
}

// ============================================================================
// Gate Kernels
// ============================================================================

fn apply_gate(state: &mut [Complex64], gate: &Gate) {
    let i = Complex64::i();
    match *gate {
        Gate::H(q) => apply_single_qubit_gate(state, q, |a, b| {
            ((a + b) * FRAC_1_SQRT_2, (a - b) * FRAC_1_SQRT_2)
        }),
        Gate::X(q) => apply_x(state, q),
        Gate::Y(q) => apply_y(state, q),
        Gate::Z(q) => apply_z(state, q),
        Gate::S(q) => apply_single_qubit_gate(state, q, |a, b| (a, b * i)),
        Gate::Sdg(q) => apply_single_qubit_gate(state, q, |a, b| (a, -b * i)),
        Gate::T(q) => apply_phase(state, q, FRAC_PI_4),
        Gate::Tdg(q) => apply_phase(state, q, -FRAC_PI_4),
        Gate::P(q, lambda) => apply_phase(state, q, lambda),
        Gate::Sx(q) => {
            let (p, m) = (Complex64::new(0.5, 0.5), Complex64::new(0.5, -0.5));
            apply_single_qubit_gate(state, q, |a, b| (p * a + m * b, m * a + p * b))
        }
        Gate::Sxdg(q) => {
            let (p, m) = (Complex64::new(0.5, -0.5), Complex64::new(0.5, 0.5));
            apply_single_qubit_gate(state, q, |a, b| (p * a + m * b, m * a + p * b))
        }
        Gate::Rx(q, theta) => {
            let (c, s) = ((theta / 2.0).cos(), (theta / 2.0).sin());
            let ms = Complex64::new(0.0, -s);
            apply_single_qubit_gate(state, q, |a, b| (a * c + b * ms, a * ms + b * c))
        }
        Gate::Ry(q, theta) => {
            let (c, s) = ((theta / 2.0).cos(), (theta / 2.0).sin());
            apply_single_qubit_gate(state, q, |a, b| (a * c - b * s, a * s + b * c))
        }
        Gate::Rz(q, theta) => {
            let neg = Complex64::from_polar(1.0, -theta / 2.0);
            let pos = Complex64::from_polar(1.0, theta / 2.0);
            apply_single_qubit_gate(state, q, |a, b| (a * neg, b * pos))
        }
        Gate::Cnot(c, t) => apply_cnot(state, c, t),
        Gate::Cz(a, b) => apply_cz(state, a, b),
        Gate::Swap(a, b) => apply_swap(state, a, b),
        Gate::Id(_) | Gate::Measure(_, _) | Gate::Barrier(_) => {}
    }
}

fn apply_x(state: &mut [Complex64], q: QubitId) {
    apply_single_qubit_gate(state, q, |a, b| (b, a));
}

fn apply_y(state: &mut [Complex64], q: QubitId) {
    let i = Complex64::i();
    apply_single_qubit_gate(state, q, |a, b| (-i * b, i * a));
}

fn apply_z(state: &mut [Complex64], q: QubitId) {
    apply_single_qubit_gate(state, q, |a, b| (a, -b));
}

fn apply_phase(state: &mut [Complex64], q: QubitId, lambda: f64) {
    let phase = Complex64::from_polar(1.0, lambda);
    apply_single_qubit_gate(state, q, |a, b| (a, b * phase));
}

fn apply_single_qubit_gate<F>(state: &mut [Complex64], q: QubitId, f: F)
where
    F: Fn(Complex64, Complex64) -> (Complex64, Complex64),
{
    let mask = 1 << q;
    for i in 0..state.len() {
        if i & mask == 0 {
            let j = i | mask;
            let (new_i, new_j) = f(state[i], state[j]);
            state[i] = new_i;
            state[j] = new_j;
        }
    }
}

fn apply_cnot(state: &mut [Complex64], control: QubitId, target: QubitId) {
    let control_mask = 1 << control;
    let target_mask = 1 << target;

    for i in 0..state.len() {
        if (i & control_mask) != 0 && (i & target_mask) == 0 {
            state.swap(i, i | target_mask);
        }
    }
}

fn apply_cz(state: &mut [Complex64], q1: QubitId, q2: QubitId) {
    let mask = (1 << q1) | (1 << q2);
    for (i, amp) in state.iter_mut().enumerate() {
        if i & mask == mask {
            *amp = -*amp;
        }
    }
}

fn apply_swap(state: &mut [Complex64], q1: QubitId, q2: QubitId) {
    let mask1 = 1 << q1;
    let mask2 = 1 << q2;

    for i in 0..state.len() {
        let bit1 = (i & mask1) != 0;
        let bit2 = (i & mask2) != 0;
        if bit1 != bit2 {
            let j = i ^ mask1 ^ mask2;
            if i < j {
                state.swap(i, j);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
