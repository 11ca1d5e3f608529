//! Synthetic `sim<level>` noise models
//!
//! A level `L` scales every error channel linearly from the noiseless
//! `sim0`. Channels that would exceed their physical maximum are held at
//! the maximum and reported with a warning.

use crate::noise_model::NoiseModel;
use crate::readout::ReadoutError;
use qcchem_core::constants::{names, noise_scaling};
use qcchem_core::error::{QcchemError, QcchemResult};
use std::fmt;

/// Error channel of a scaled model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorChannel {
    /// Single-qubit depolarizing
    Gate1q,
    /// Two-qubit depolarizing
    Gate2q,
    /// Prepared 0, measured 1
    Meas1Prep0,
    /// Prepared 1, measured 0
    Meas0Prep1,
}

impl ErrorChannel {
    /// Label used in warnings
    pub fn label(&self) -> &'static str {
        match self {
            ErrorChannel::Gate1q => "1-qubit gate",
            ErrorChannel::Gate2q => "2-qubit gate",
            ErrorChannel::Meas1Prep0 => "Readout 0->1",
            ErrorChannel::Meas0Prep1 => "Readout 1->0",
        }
    }
}

impl fmt::Display for ErrorChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Noise model built from a `sim<level>` name
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledNoise {
    level: f64,
    name: String,
    model: NoiseModel,
    limited: Vec<ErrorChannel>,
}

impl ScaledNoise {
    /// Build the model for a level, named `sim<level>`
    pub fn from_level(level: f64) -> QcchemResult<Self> {
        Self::build(level, format!("{}{}", names::SIM_PREFIX, level))
    }

    /// Build the model for a backend name such as `"sim2"` or `"sim0.5"`
    pub fn from_name(name: &str) -> QcchemResult<Self> {
        let (level, name) = parse_sim_name(name);
        Self::build(level, name)
    }

    fn build(level: f64, name: String) -> QcchemResult<Self> {
        if level < 0.0 {
            return Err(QcchemError::InvalidNoiseLevel(level));
        }

        let mut limited = Vec::new();
        let mut scale = |per_level: f64, max: f64, channel: ErrorChannel| {
            let p = per_level * level;
            if p > max {
                limited.push(channel);
                max
            } else {
                p
            }
        };

        let p1 = scale(
            noise_scaling::GATE_ERROR_1Q_PER_LEVEL,
            noise_scaling::MAX_GATE_ERROR,
            ErrorChannel::Gate1q,
        );
        let p2 = scale(
            noise_scaling::GATE_ERROR_2Q_PER_LEVEL,
            noise_scaling::MAX_GATE_ERROR,
            ErrorChannel::Gate2q,
        );
        let p_meas1_prep0 = scale(
            noise_scaling::READOUT_0_TO_1_PER_LEVEL,
            noise_scaling::MAX_READOUT_ERROR,
            ErrorChannel::Meas1Prep0,
        );
        let p_meas0_prep1 = scale(
            noise_scaling::READOUT_1_TO_0_PER_LEVEL,
            noise_scaling::MAX_READOUT_ERROR,
            ErrorChannel::Meas0Prep1,
        );

        if !limited.is_empty() {
            let labels: Vec<&str> = limited.iter().map(ErrorChannel::label).collect();
            log::warn!(
                "{}: the following error types cannot be increased further: {}",
                name,
                labels.join(", ")
            );
        }

        let model = NoiseModel::new(p1, p2, ReadoutError::new(p_meas1_prep0, p_meas0_prep1)?)?;

        Ok(Self {
            level,
            name,
            model,
            limited,
        })
    }

    /// Requested level
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Backend name (`sim0` when the requested level was unparsable)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resulting noise model
    pub fn model(&self) -> &NoiseModel {
        &self.model
    }

    /// Consume into the noise model
    pub fn into_model(self) -> NoiseModel {
        self.model
    }

    /// Channels held at their maximum
    pub fn limited(&self) -> &[ErrorChannel] {
        &self.limited
    }

    /// Check if any channel was clamped
    pub fn is_limited(&self) -> bool {
        !self.limited.is_empty()
    }
}

/// Split a `sim<level>` name into its level and the name to report.
///
/// Anything after the three-character prefix that is not a number falls
/// back to the noiseless `(0, "sim0")`.
pub fn parse_sim_name(name: &str) -> (f64, String) {
    match name.get(3..).map(|rest| rest.trim().parse::<f64>()) {
        Some(Ok(level)) if !level.is_nan() => (level, name.to_string()),
        _ => (0.0, names::NOISELESS_SIM.to_string()),
    }
}

// ============================================================================
// Tests
// ============================================================================
