//! Session and backend lookup
//!
//! A `Session` owns the provider and the engine configuration for the
//! lifetime the caller chooses. `get_backend` turns a name into a backend:
//!
//! ```text
//!   fake_<dev> | fake(<dev>) | qasm_simulator(fake_<dev>)  → device-calibrated simulator
//!   sim<level>                                             → scaled-noise simulator
//!   statevector_simulator | vec                            → statevector simulator
//!   anything else                                          → provider lookup by name
//! ```

use crate::config::EngineConfig;
use crate::polling::{Sleeper, ThreadSleeper};
use crate::wrapper::BackendWrapper;
use log::{info, warn};
use qcchem_backend::{Backend, BackendCriteria, BackendProvider, LocalProvider, SimulatorBackend};
use qcchem_calibration::fake_device;
use qcchem_core::error::{QcchemError, QcchemResult};
use qcchem_core::names;
use qcchem_noise::ScaledNoise;
use std::sync::Arc;

const FAKE_PREFIXES: [&str; 3] = ["fake_", "fake(", "qasm_simulator(fake_"];

/// Backend provider plus engine settings
#[derive(Clone)]
pub struct Session {
    provider: Arc<dyn BackendProvider>,
    config: EngineConfig,
    sleeper: Arc<dyn Sleeper>,
}

impl Session {
    /// Create a session over a provider
    pub fn new(provider: Arc<dyn BackendProvider>) -> Self {
        Self {
            provider,
            config: EngineConfig::default(),
            sleeper: Arc::new(ThreadSleeper),
        }
    }

    /// Session over the default in-process provider
    pub fn local() -> Self {
        Self::new(Arc::new(LocalProvider::default()))
    }

    /// Set engine configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the sleeper handed to wrappers
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Wrap a backend with this session's settings
    pub fn wrap(&self, backend: Arc<dyn Backend>) -> BackendWrapper {
        BackendWrapper::new(backend)
            .with_config(self.config.clone())
            .with_sleeper(self.sleeper.clone())
    }

    /// Backend for a name
    pub fn get_backend(&self, name: &str) -> QcchemResult<Arc<dyn Backend>> {
        let lower = name.to_lowercase();

        let backend: Arc<dyn Backend> = if FAKE_PREFIXES.iter().any(|p| lower.starts_with(p)) {
            let device = lower
                .strip_prefix("qasm_simulator(")
                .or_else(|| lower.strip_prefix("fake("))
                .unwrap_or(&lower)
                .trim_end_matches(')');
            Arc::new(self.seeded(SimulatorBackend::from_device(fake_device(device)?)))
        } else if lower.starts_with(names::SIM_PREFIX) {
            let noise = ScaledNoise::from_name(name)?;
            let custom_name = noise.name().to_string();
            Arc::new(
                self.seeded(SimulatorBackend::from_noise_model(noise.into_model()))
                    .with_custom_name(custom_name),
            )
        } else if names::is_statevector(&lower) {
            Arc::new(SimulatorBackend::statevector())
        } else {
            let criteria = BackendCriteria::by_name(name);
            let mut matches = self.provider.backends(&criteria);
            if matches.len() > 1 {
                warn!(
                    "More than one backend matches '{}', using the first of {}",
                    name,
                    matches.len()
                );
            }
            if matches.is_empty() {
                return Err(QcchemError::NoBackendsMatch {
                    criteria: criteria.to_string(),
                });
            }
            matches.swap_remove(0)
        };

        info!(
            "Resolved '{}' to {}",
            name,
            backend.custom_name().unwrap_or_else(|| backend.name())
        );
        Ok(backend)
    }

    /// Provider backends, optionally filtered by name
    pub fn all_backends(&self, name: Option<&str>) -> Vec<Arc<dyn Backend>> {
        let criteria = name.map_or_else(BackendCriteria::any, BackendCriteria::by_name);
        self.provider.backends(&criteria)
    }

    fn seeded(&self, backend: SimulatorBackend) -> SimulatorBackend {
        match self.config.seed {
            Some(seed) => backend.with_seed(seed),
            None => backend,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::local()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::local().with_config(EngineConfig::testing())
    }

    #[test]
    fn test_fake_device_names() {
        let session = session();
        for name in ["fake_athens", "FAKE(athens)", "qasm_simulator(fake_athens)"] {
            let backend = session.get_backend(name).unwrap();
            assert_eq!(backend.name(), "qasm_simulator(fake_athens)");
            assert_eq!(backend.properties().unwrap().num_qubits(), 5);
        }
        assert!(matches!(
            session.get_backend("fake_montreal"),
            Err(QcchemError::NoBackendsMatch { .. })
        ));
    }

    #[test]
    fn test_scaled_noise_names() {
        let session = session();

        let sim0 = session.get_backend("sim0").unwrap();
        assert_eq!(sim0.custom_name(), Some("sim0"));
        assert_eq!(sim0.name(), "qasm_simulator");

        let sim2 = session.get_backend("sim2").unwrap();
        assert_eq!(sim2.custom_name(), Some("sim2"));

        assert_eq!(session.get_backend("simfoo").unwrap().custom_name(), Some("sim0"));
        assert_eq!(session.get_backend("SIM3").unwrap().custom_name(), Some("SIM3"));
        assert!(matches!(
            session.get_backend("sim-1"),
            Err(QcchemError::InvalidNoiseLevel(_))
        ));
    }

    #[test]
    fn test_statevector_names() {
        let session = session();
        for name in ["vec", "VEC", "statevector_simulator", "StateVector_Simulator"] {
            assert_eq!(
                session.get_backend(name).unwrap().name(),
                names::STATEVECTOR_SIMULATOR
            );
        }
    }

    #[test]
    fn test_provider_lookup() {
        let session = session();
        assert_eq!(
            session.get_backend("ibmq_qasm_simulator").unwrap().name(),
            "ibmq_qasm_simulator"
        );

        match session.get_backend("ibmq_nowhere") {
            Err(QcchemError::NoBackendsMatch { criteria }) => {
                assert_eq!(criteria, "name='ibmq_nowhere'")
            }
            other => panic!("unexpected: {:?}", other.map(|b| b.name().to_string())),
        }
    }

    #[test]
    fn test_ambiguous_match_uses_first() {
        let provider = LocalProvider::new()
            .with_backend(Arc::new(SimulatorBackend::qasm().with_name("ibmq_twin")))
            .with_backend(Arc::new(
                SimulatorBackend::qasm().with_name("ibmq_twin").with_max_experiments(5),
            ));
        let session = Session::new(Arc::new(provider));

        let backend = session.get_backend("ibmq_twin").unwrap();
        assert_eq!(backend.configuration().max_experiments, None);
        assert_eq!(session.all_backends(Some("ibmq_twin")).len(), 2);
        assert_eq!(session.all_backends(None).len(), 2);
    }

    #[test]
    fn test_wrap_carries_session_config() {
        let session = session();
        let wrapper = session.wrap(session.get_backend("sim0").unwrap());
        assert_eq!(wrapper.config(), &EngineConfig::testing());
        assert!(wrapper.is_noiseless());
    }
}
