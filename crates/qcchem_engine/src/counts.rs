//! Counts pipeline
//!
//! Expands a state-preparation circuit into one measurement circuit per
//! basis, runs them through the wrapper's batching, and attaches the
//! returned histograms back onto the bases. Pairwise readout-error
//! mitigation filters are calibrated and applied here.

use crate::wrapper::BackendWrapper;
use log::{debug, info};
use qcchem_backend::JobId;
use qcchem_calibration::{calibration_circuits, validate_pair, MeasurementFilter};
use qcchem_core::error::{QcchemError, QcchemResult};
use qcchem_core::types::{Counts, QubitId};
use qcchem_core::Circuit;
use qcchem_measurement::PauliBasis;
use std::collections::BTreeMap;

/// Circuits per calibrated pair
const CIRCUITS_PER_PAIR: usize = 4;

/// Bases to measure a circuit in
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MeasurementBases {
    /// Computational basis on every qubit
    #[default]
    Default,
    /// No rotation and no measurement
    Identity,
    /// Caller-supplied bases, measured in order
    Explicit(Vec<PauliBasis>),
}

impl MeasurementBases {
    /// Concrete bases for a circuit of `num_qubits` qubits
    pub fn resolve(&self, num_qubits: usize) -> Vec<PauliBasis> {
        match self {
            MeasurementBases::Default => vec![PauliBasis::all_z(num_qubits)],
            MeasurementBases::Identity => vec![PauliBasis::identity(num_qubits)],
            MeasurementBases::Explicit(bases) => bases.clone(),
        }
    }
}

impl From<Vec<PauliBasis>> for MeasurementBases {
    fn from(bases: Vec<PauliBasis>) -> Self {
        MeasurementBases::Explicit(bases)
    }
}

/// Counts-returning backend with pairwise readout mitigation
#[derive(Debug, Clone)]
pub struct CountsBackend {
    wrapper: BackendWrapper,

    /// Keyed by (lower, upper) qubit pair
    filters: BTreeMap<(QubitId, QubitId), MeasurementFilter>,
}

impl CountsBackend {
    /// Create from a wrapped backend
    pub fn new(wrapper: BackendWrapper) -> Self {
        Self {
            wrapper,
            filters: BTreeMap::new(),
        }
    }

    /// Underlying wrapper
    pub fn wrapper(&self) -> &BackendWrapper {
        &self.wrapper
    }

    /// Fitted mitigation filters
    pub fn filters(&self) -> &BTreeMap<(QubitId, QubitId), MeasurementFilter> {
        &self.filters
    }

    // ========================================================================
    // Pipeline
    // ========================================================================

    /// One compiled measurement circuit per basis, in basis order
    pub fn circ2circuits(&self, circuit: &Circuit, bases: &[PauliBasis]) -> QcchemResult<Vec<Circuit>> {
        let mut base = circuit.clone();
        if base.num_clbits() == 0 {
            base.add_classical_register();
        }
        let compiled = self.wrapper.transpile(&base)?;

        bases
            .iter()
            .map(|basis| {
                let mut measured = basis.apply(compiled.clone())?;
                let name = match circuit.name() {
                    Some(prefix) => format!("{}_{}", prefix, basis.basis()),
                    None => basis.basis().to_string(),
                };
                measured.set_name(name);
                self.wrapper.transpile(&measured)
            })
            .collect()
    }

    /// Wait for jobs and flatten their counts in submission order
    pub fn jobs2counts<I, J>(&self, jobs: I) -> QcchemResult<Vec<Counts>>
    where
        I: IntoIterator<Item = J>,
        J: Into<JobId>,
    {
        let mut counts = Vec::new();
        for job in jobs {
            let job_id = job.into();
            let result = self.wrapper.wait_for(&job_id)?;
            counts.extend(result.get_counts()?);
        }
        Ok(counts)
    }

    /// Wait for jobs and assign each result to the basis at the same position
    pub fn jobs2bases<I, J>(&self, jobs: I, bases: &mut [PauliBasis]) -> QcchemResult<()>
    where
        I: IntoIterator<Item = J>,
        J: Into<JobId>,
    {
        let counts = self.jobs2counts(jobs)?;
        if counts.len() != bases.len() {
            return Err(QcchemError::ResultCountMismatch {
                expected: bases.len(),
                found: counts.len(),
            });
        }

        for (basis, result) in bases.iter_mut().zip(counts) {
            basis.set_results(result);
        }
        Ok(())
    }

    /// Measure a circuit in each basis and return the bases with results
    pub fn run(
        &self,
        circuit: &Circuit,
        bases: MeasurementBases,
        shots: u64,
    ) -> QcchemResult<Vec<PauliBasis>> {
        let mut bases = bases.resolve(circuit.num_qubits());
        let circuits = self.circ2circuits(circuit, &bases)?;
        let jobs = self.wrapper.circuits2jobs(&circuits, shots)?;
        self.jobs2bases(jobs, &mut bases)?;
        Ok(bases)
    }

    /// `run` over several circuits, results in input order
    pub fn run_batch(
        &self,
        circuits: &[Circuit],
        bases: MeasurementBases,
        shots: u64,
    ) -> QcchemResult<Vec<Vec<PauliBasis>>> {
        circuits
            .iter()
            .map(|c| self.run(c, bases.clone(), shots))
            .collect()
    }

    // ========================================================================
    // Readout Mitigation
    // ========================================================================

    /// Fit a filter for every pair of the given qubits (all device qubits by default)
    ///
    /// Calibration shots default to `calibration_shots` from the config.
    pub fn calibrate_pairwise_qrem(
        &mut self,
        qubits: Option<&[QubitId]>,
        shots: Option<u64>,
    ) -> QcchemResult<()> {
        let n_qubits = self.wrapper.n_qubits();
        let mut qubits = match (qubits, n_qubits) {
            (Some(qubits), _) => qubits.to_vec(),
            (None, Some(n)) => (0..n).collect(),
            (None, None) => return Err(QcchemError::MissingQubitCount),
        };
        qubits.sort_unstable();
        qubits.dedup();

        let width = match n_qubits {
            Some(n) => n,
            None => qubits.last().map_or(0, |q| q + 1),
        };
        let shots = shots.unwrap_or(self.wrapper.config().calibration_shots);

        let pairs: Vec<(QubitId, QubitId)> = qubits
            .iter()
            .enumerate()
            .flat_map(|(i, &lo)| qubits[i + 1..].iter().map(move |&hi| (lo, hi)))
            .collect();

        let mut circuits = Vec::with_capacity(pairs.len() * CIRCUITS_PER_PAIR);
        for &pair in &pairs {
            for circuit in calibration_circuits(width, pair)? {
                circuits.push(self.wrapper.transpile(&circuit)?);
            }
        }
        debug!(
            "{}: {} calibration circuits for {} pairs",
            self.wrapper.name(),
            circuits.len(),
            pairs.len()
        );

        let jobs = self.wrapper.circuits2jobs(&circuits, shots)?;
        let counts = self.jobs2counts(jobs)?;
        if counts.len() != circuits.len() {
            return Err(QcchemError::ResultCountMismatch {
                expected: circuits.len(),
                found: counts.len(),
            });
        }

        for (&pair, results) in pairs.iter().zip(counts.chunks(CIRCUITS_PER_PAIR)) {
            let filter = MeasurementFilter::fit(pair, results)?;
            debug!(
                "Pair {:?}: readout fidelity {:.4}",
                pair,
                filter.readout_fidelity()
            );
            self.filters.insert(pair, filter);
        }

        info!(
            "{}: calibrated {} qubit pairs with {} shots",
            self.wrapper.name(),
            pairs.len(),
            shots
        );
        Ok(())
    }

    /// Mitigated two-qubit distribution of `pair` from full-width counts
    pub fn apply_pairwise_qrem(
        &self,
        counts: &Counts,
        pair: (QubitId, QubitId),
    ) -> QcchemResult<BTreeMap<String, f64>> {
        validate_pair(pair)?;
        self.filters
            .get(&pair)
            .ok_or(QcchemError::CalibrationMissing(pair.0, pair.1))?
            .apply(counts)
    }

    /// `apply_pairwise_qrem` on a measured basis
    pub fn apply_pairwise_qrem_to_basis(
        &self,
        basis: &PauliBasis,
        pair: (QubitId, QubitId),
    ) -> QcchemResult<BTreeMap<String, f64>> {
        self.apply_pairwise_qrem(basis.results()?, pair)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::testing::{RecordingSleeper, ScriptedBackend};
    use qcchem_backend::{Backend, JobStatus, SimulatorBackend};
    use qcchem_calibration::fake_device;
    use qcchem_core::CircuitBuilder;
    use qcchem_measurement::evaluate_pauli;
    use std::sync::Arc;

    fn counts_backend(backend: impl Backend + 'static) -> CountsBackend {
        CountsBackend::new(
            BackendWrapper::new(Arc::new(backend)).with_config(EngineConfig::testing()),
        )
    }

    fn bell() -> Circuit {
        CircuitBuilder::new(2).h(0).cx(0, 1).build()
    }

    fn bases(strings: &[&str]) -> MeasurementBases {
        MeasurementBases::Explicit(strings.iter().map(|s| PauliBasis::from(*s)).collect())
    }

    fn keys(basis: &PauliBasis) -> Vec<String> {
        let mut keys: Vec<String> = basis.results().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    #[test]
    fn test_resolve_measurement_bases() {
        assert_eq!(MeasurementBases::Default.resolve(3), vec![PauliBasis::from("ZZZ")]);
        assert_eq!(MeasurementBases::Identity.resolve(2), vec![PauliBasis::from("II")]);
        assert_eq!(bases(&["XY"]).resolve(5), vec![PauliBasis::from("XY")]);
    }

    #[test]
    fn test_circ2circuits_one_per_basis() {
        let backend = counts_backend(SimulatorBackend::qasm());
        let circuit = bell();
        let bases = bases(&["XX", "ZI"]).resolve(2);

        let circuits = backend.circ2circuits(&circuit, &bases).unwrap();

        assert_eq!(circuits.len(), 2);
        assert_eq!(circuits[0].name(), Some("XX"));
        assert_eq!(circuits[0].count_measurements(), 2);
        assert_eq!(circuits[1].measurements(), vec![(0, 1)]);
        assert!(circuits.iter().all(|c| c.num_clbits() == 2));
        assert_eq!(circuit.num_clbits(), 0);
    }

    #[test]
    fn test_run_bell_state_parities() {
        let backend = counts_backend(SimulatorBackend::qasm().with_seed(3));
        let bases = backend.run(&bell(), bases(&["XX", "YY", "ZZ"]), 500).unwrap();

        let xx = evaluate_pauli("XX", bases[0].results().unwrap()).unwrap();
        let yy = evaluate_pauli("YY", bases[1].results().unwrap()).unwrap();
        let zz = evaluate_pauli("ZZ", bases[2].results().unwrap()).unwrap();

        approx::assert_relative_eq!(xx, 1.0);
        approx::assert_relative_eq!(yy, -1.0);
        approx::assert_relative_eq!(zz, 1.0);
    }

    #[test]
    fn test_run_default_and_identity_bases() {
        let backend = counts_backend(SimulatorBackend::qasm().with_seed(5));

        let measured = backend.run(&bell(), MeasurementBases::Default, 200).unwrap();
        assert_eq!(measured.len(), 1);
        assert_eq!(measured[0].basis(), "ZZ");
        assert_eq!(keys(&measured[0]), vec!["00", "11"]);

        let trivial = backend.run(&bell(), MeasurementBases::Identity, 200).unwrap();
        assert_eq!(trivial[0].basis(), "II");
        assert_eq!(trivial[0].results().unwrap()["00"], 200);
    }

    #[test]
    fn test_run_chunked_results_stay_in_basis_order() {
        let device = Arc::new(ScriptedBackend::new(2));
        let backend = CountsBackend::new(
            BackendWrapper::new(device.clone()).with_config(EngineConfig::testing()),
        );

        let measured = backend
            .run(&bell(), bases(&["ZZ", "XX", "ZI", "IZ", "ZZ"]), 100)
            .unwrap();

        assert_eq!(device.submissions(), vec![2, 2, 1]);
        assert_eq!(keys(&measured[2]), vec!["00", "10"]);
        assert_eq!(keys(&measured[3]), vec!["00", "01"]);
        assert_eq!(keys(&measured[4]), vec!["00", "11"]);
    }

    #[test]
    fn test_run_batch() {
        let backend = counts_backend(SimulatorBackend::qasm().with_seed(1));
        let flipped = CircuitBuilder::new(2).x(1).build();

        let results = backend
            .run_batch(&[bell(), flipped], MeasurementBases::Default, 50)
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[1][0].results().unwrap()["01"], 50);
    }

    #[test]
    fn test_jobs2counts_accepts_id_strings() {
        let backend = counts_backend(SimulatorBackend::qasm());
        let circuits = backend
            .circ2circuits(&bell(), &bases(&["ZZ", "XX"]).resolve(2))
            .unwrap();
        let jobs = backend.wrapper().circuits2jobs(&circuits, 10).unwrap();
        let ids: Vec<String> = jobs.iter().map(|j| j.to_string()).collect();

        let counts = backend.jobs2counts(ids.iter().map(String::as_str)).unwrap();
        assert_eq!(counts.len(), 2);
        assert!(counts.iter().all(|c| c.values().sum::<u64>() == 10));

        assert!(matches!(
            backend.jobs2counts(["missing-job"]),
            Err(QcchemError::JobNotFound(_))
        ));
    }

    #[test]
    fn test_jobs2bases_count_mismatch() {
        let backend = counts_backend(SimulatorBackend::qasm());
        let circuits = backend
            .circ2circuits(&bell(), &bases(&["ZZ"]).resolve(2))
            .unwrap();
        let jobs = backend.wrapper().circuits2jobs(&circuits, 10).unwrap();

        let mut too_many = bases(&["ZZ", "XX"]).resolve(2);
        assert!(matches!(
            backend.jobs2bases(&jobs, &mut too_many),
            Err(QcchemError::ResultCountMismatch { expected: 2, found: 1 })
        ));
        assert!(!too_many[0].has_results());
    }

    #[test]
    fn test_calibration_needs_qubit_count() {
        let mut backend = counts_backend(SimulatorBackend::qasm());
        assert!(matches!(
            backend.calibrate_pairwise_qrem(None, None),
            Err(QcchemError::MissingQubitCount)
        ));

        backend.calibrate_pairwise_qrem(Some(&[1, 0]), Some(100)).unwrap();
        let filter = &backend.filters()[&(0, 1)];
        approx::assert_relative_eq!(filter.readout_fidelity(), 1.0);
    }

    #[test]
    fn test_pairwise_mitigation_on_device() {
        let device = SimulatorBackend::from_device(fake_device("athens").unwrap()).with_seed(17);
        let mut backend = counts_backend(device);

        backend.calibrate_pairwise_qrem(None, Some(4096)).unwrap();
        assert_eq!(backend.filters().len(), 10);

        let prepared = CircuitBuilder::new(5).x(0).x(1).build();
        let measured = backend.run(&prepared, MeasurementBases::Default, 4096).unwrap();

        let raw: u64 = measured[0]
            .results()
            .unwrap()
            .iter()
            .filter(|(k, _)| k.starts_with("11"))
            .map(|(_, v)| v)
            .sum();
        let mitigated = backend
            .apply_pairwise_qrem_to_basis(&measured[0], (0, 1))
            .unwrap();

        assert!(mitigated["11"] > raw as f64);
        let total: f64 = mitigated.values().sum();
        approx::assert_relative_eq!(total, 4096.0, epsilon = 1e-6);
    }

    #[test]
    fn test_calibration_on_queued_hardware() {
        let device = Arc::new(
            ScriptedBackend::from_device("lima", 7).with_script(vec![
                JobStatus::Queued,
                JobStatus::Running,
                JobStatus::Completed,
            ]),
        );
        let sleeper = Arc::new(RecordingSleeper::default());
        let mut backend = CountsBackend::new(
            BackendWrapper::new(device.clone())
                .with_config(EngineConfig::testing())
                .with_sleeper(sleeper.clone()),
        );

        backend.calibrate_pairwise_qrem(Some(&[0, 1, 2]), Some(200)).unwrap();

        assert_eq!(device.submissions(), vec![7, 5]);
        assert_eq!(sleeper.sleeps().len(), 4);
        let pairs: Vec<_> = backend.filters().keys().copied().collect();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn test_mitigation_requires_calibrated_pair() {
        let mut backend = counts_backend(SimulatorBackend::qasm());
        backend.calibrate_pairwise_qrem(Some(&[0, 1]), Some(50)).unwrap();
        let counts = Counts::from([("000".to_string(), 5)]);

        assert!(matches!(
            backend.apply_pairwise_qrem(&counts, (0, 2)),
            Err(QcchemError::CalibrationMissing(0, 2))
        ));
        assert!(matches!(
            backend.apply_pairwise_qrem(&counts, (1, 0)),
            Err(QcchemError::InvalidQubitPair(1, 0))
        ));
        assert!(matches!(
            backend.apply_pairwise_qrem_to_basis(&PauliBasis::from("ZZ"), (0, 1)),
            Err(QcchemError::ResultsNotYetAvailable(_))
        ));
    }
}
