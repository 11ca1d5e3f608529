//! Backend discovery
//!
//! A provider answers "which backends match these criteria", in a stable
//! order. `LocalProvider` is an in-memory registry of ready backends.

use crate::execution::Backend;
use crate::simulator::SimulatorBackend;
use log::debug;
use std::fmt;
use std::sync::Arc;

/// Filter applied when listing backends
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendCriteria {
    /// Exact backend name
    pub name: Option<String>,

    /// Only simulators (`Some(true)`) or only devices (`Some(false)`)
    pub simulator: Option<bool>,

    /// Smallest acceptable qubit count
    pub min_qubits: Option<usize>,
}

impl BackendCriteria {
    /// Match every backend
    pub fn any() -> Self {
        Self::default()
    }

    /// Match a backend by name
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Restrict to simulators or devices
    pub fn with_simulator(mut self, simulator: bool) -> Self {
        self.simulator = Some(simulator);
        self
    }

    /// Require at least this many qubits
    pub fn with_min_qubits(mut self, min_qubits: usize) -> Self {
        self.min_qubits = Some(min_qubits);
        self
    }

    /// Check a backend against every set field
    pub fn matches(&self, backend: &dyn Backend) -> bool {
        let config = backend.configuration();
        self.name.as_deref().map_or(true, |n| backend.name() == n)
            && self.simulator.map_or(true, |s| config.simulator == s)
            && self.min_qubits.map_or(true, |m| config.n_qubits >= m)
    }
}

impl fmt::Display for BackendCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(name) = &self.name {
            parts.push(format!("name='{}'", name));
        }
        if let Some(simulator) = self.simulator {
            parts.push(format!("simulator={}", simulator));
        }
        if let Some(min) = self.min_qubits {
            parts.push(format!("min_qubits={}", min));
        }
        if parts.is_empty() {
            write!(f, "any backend")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

/// Source of backends
pub trait BackendProvider: Send + Sync {
    /// Backends matching the criteria, in provider order
    fn backends(&self, criteria: &BackendCriteria) -> Vec<Arc<dyn Backend>>;
}

/// In-memory provider, listing backends in registration order
pub struct LocalProvider {
    backends: Vec<Arc<dyn Backend>>,
}

impl LocalProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self {
            backends: Vec::new(),
        }
    }

    /// Register a backend
    pub fn register(&mut self, backend: Arc<dyn Backend>) {
        debug!("Registering backend: {}", backend.name());
        self.backends.push(backend);
    }

    /// Register a backend, builder style
    pub fn with_backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.register(backend);
        self
    }

    /// Number of registered backends
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl Default for LocalProvider {
    /// Counts simulator plus the hosted-style simulator
    fn default() -> Self {
        Self::new()
            .with_backend(Arc::new(SimulatorBackend::qasm()))
            .with_backend(Arc::new(SimulatorBackend::hosted()))
    }
}

impl BackendProvider for LocalProvider {
    fn backends(&self, criteria: &BackendCriteria) -> Vec<Arc<dyn Backend>> {
        self.backends
            .iter()
            .filter(|b| criteria.matches(b.as_ref()))
            .cloned()
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use qcchem_core::names;

    #[test]
    fn test_default_registry() {
        let provider = LocalProvider::default();
        assert_eq!(provider.len(), 2);

        let all = provider.backends(&BackendCriteria::any());
        assert_eq!(all[0].name(), names::QASM_SIMULATOR);
        assert_eq!(all[1].name(), names::HOSTED_QASM_SIMULATOR);
    }

    #[test]
    fn test_match_by_name() {
        let provider = LocalProvider::default();
        let found = provider.backends(&BackendCriteria::by_name("ibmq_qasm_simulator"));
        assert_eq!(found.len(), 1);
        assert!(provider.backends(&BackendCriteria::by_name("ibmq_lima")).is_empty());
    }

    #[test]
    fn test_registration_order_kept_for_duplicates() {
        let provider = LocalProvider::new()
            .with_backend(Arc::new(SimulatorBackend::qasm().with_custom_name("first")))
            .with_backend(Arc::new(SimulatorBackend::qasm().with_custom_name("second")));

        let found = provider.backends(&BackendCriteria::by_name(names::QASM_SIMULATOR));
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].custom_name(), Some("first"));
    }

    #[test]
    fn test_capability_filters() {
        let provider = LocalProvider::default();
        assert!(provider
            .backends(&BackendCriteria::any().with_simulator(false))
            .is_empty());
        assert!(provider
            .backends(&BackendCriteria::any().with_min_qubits(1000))
            .is_empty());
    }

    #[test]
    fn test_criteria_display() {
        assert_eq!(BackendCriteria::any().to_string(), "any backend");
        assert_eq!(
            BackendCriteria::by_name("x").with_min_qubits(5).to_string(),
            "name='x', min_qubits=5"
        );
    }
}
