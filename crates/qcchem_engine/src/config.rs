//! Engine configuration
//!
//! Shot counts, polling behaviour, batching defaults and the seed handed
//! to local simulators.

use crate::polling::PollingPolicy;
use qcchem_core::constants::execution;
use qcchem_core::error::QcchemResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // ========================================================================
    // Execution Parameters
    // ========================================================================
    /// Shots per measurement basis
    pub shots: u64,

    /// Shots per calibration circuit
    pub calibration_shots: u64,

    /// Circuits per job when the backend reports no limit
    pub default_max_experiments: usize,

    // ========================================================================
    // Polling Parameters
    // ========================================================================
    /// Interval between job status polls (milliseconds)
    pub poll_interval_ms: u64,

    /// Give up after this many polls (None = wait forever)
    pub max_poll_attempts: Option<u32>,

    // ========================================================================
    // Simulation Parameters
    // ========================================================================
    /// Seed for local simulators
    pub seed: Option<u64>,
}

impl EngineConfig {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Fast, bounded and reproducible settings for tests
    pub fn testing() -> Self {
        Self {
            shots: 1024,
            calibration_shots: 1024,
            poll_interval_ms: 0,
            max_poll_attempts: Some(100),
            seed: Some(42),
            ..Self::default()
        }
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Set shots
    pub fn with_shots(mut self, shots: u64) -> Self {
        self.shots = shots;
        self
    }

    /// Set calibration shots
    pub fn with_calibration_shots(mut self, shots: u64) -> Self {
        self.calibration_shots = shots;
        self
    }

    /// Set poll interval
    pub fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Bound the number of polls per job
    pub fn with_max_poll_attempts(mut self, attempts: u32) -> Self {
        self.max_poll_attempts = Some(attempts);
        self
    }

    /// Set default max experiments
    pub fn with_default_max_experiments(mut self, max: usize) -> Self {
        self.default_max_experiments = max;
        self
    }

    /// Set seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    // ========================================================================
    // Conversions
    // ========================================================================

    /// Polling policy for job completion
    pub fn polling_policy(&self) -> PollingPolicy {
        PollingPolicy {
            interval: Duration::from_millis(self.poll_interval_ms),
            max_attempts: self.max_poll_attempts,
        }
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.shots == 0 {
            return Err("shots must be > 0".to_string());
        }

        if self.calibration_shots == 0 {
            return Err("calibration_shots must be > 0".to_string());
        }

        if self.default_max_experiments == 0 {
            return Err("default_max_experiments must be > 0".to_string());
        }

        if self.max_poll_attempts == Some(0) {
            return Err("max_poll_attempts must be > 0 when set".to_string());
        }

        Ok(())
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Serialize to JSON
    pub fn to_json(&self) -> QcchemResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> QcchemResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> QcchemResult<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Save to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> QcchemResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shots: execution::DEFAULT_SHOTS,
            calibration_shots: execution::DEFAULT_SHOTS,
            default_max_experiments: execution::DEFAULT_MAX_EXPERIMENTS,
            poll_interval_ms: execution::POLL_INTERVAL_MS,
            max_poll_attempts: None,
            seed: None,
        }
    }
}

impl fmt::Display for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EngineConfig(shots={}, poll={}ms, max_experiments={})",
            self.shots, self.poll_interval_ms, self.default_max_experiments
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.shots, 8192);
        assert_eq!(config.poll_interval_ms, 5000);
        assert_eq!(config.default_max_experiments, 300);
        assert_eq!(config.max_poll_attempts, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_testing_preset() {
        let config = EngineConfig::testing();
        assert_eq!(config.poll_interval_ms, 0);
        assert_eq!(config.seed, Some(42));
        assert!(config.max_poll_attempts.is_some());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_polling_policy() {
        let policy = EngineConfig::default().with_max_poll_attempts(3).polling_policy();
        assert_eq!(policy.interval, Duration::from_secs(5));
        assert_eq!(policy.max_attempts, Some(3));
    }

    #[test]
    fn test_validation() {
        assert!(EngineConfig::default().with_shots(0).validate().is_err());
        assert!(EngineConfig::default().with_max_poll_attempts(0).validate().is_err());
    }

    #[test]
    fn test_json_round_trip_and_partial() {
        let config = EngineConfig::testing().with_shots(77);
        assert_eq!(EngineConfig::from_json(&config.to_json().unwrap()).unwrap(), config);

        let partial = EngineConfig::from_json(r#"{"shots": 10}"#).unwrap();
        assert_eq!(partial.shots, 10);
        assert_eq!(partial.poll_interval_ms, 5000);
    }

    #[test]
    fn test_file_persistence() {
        let path = std::env::temp_dir().join("qcchem_engine_config_test.json");
        let config = EngineConfig::default().with_seed(9);
        config.save(&path).unwrap();
        assert_eq!(EngineConfig::load(&path).unwrap(), config);
        let _ = std::fs::remove_file(&path);
    }
}
