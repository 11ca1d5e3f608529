//! Core types for qcchem
//!
//! Provides fundamental type aliases and validated wrapper types
//! used throughout the workspace.

use crate::error::{QcchemError, QcchemResult};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// Qubit identifier (0-indexed)
pub type QubitId = usize;

/// Classical bit identifier (0-indexed)
pub type ClbitId = usize;

/// Rotation angle in radians
pub type Angle = f64;

/// Measurement counts: bitstring -> count
///
/// Keys print the highest classical bit first, so with the measurement
/// convention used by `PauliBasis` character `i` is the outcome of qubit `i`.
pub type Counts = HashMap<String, u64>;

/// Exact amplitudes, index bit `q` is qubit `q`
pub type Statevector = Vec<Complex64>;

// ============================================================================
// Probability (Validated Wrapper)
// ============================================================================

/// Probability checked to lie in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Probability(f64);

impl Probability {
    /// Reject values outside `[0, 1]`, NaN included
    pub fn new(value: f64) -> QcchemResult<Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(QcchemError::InvalidProbability(value))
        }
    }

    /// Raw value
    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    /// `1 - p`
    #[inline]
    pub fn complement(self) -> f64 {
        1.0 - self.0
    }
}

impl TryFrom<f64> for Probability {
    type Error = QcchemError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Probability> for f64 {
    fn from(p: Probability) -> Self {
        p.0
    }
}

// ============================================================================
// Bitstring
// ============================================================================

/// Counts key as bits, in printed order
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bitstring(Vec<bool>);

impl Bitstring {
    /// Parse a key made of `0` and `1`
    pub fn parse(key: &str) -> QcchemResult<Self> {
        key.chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(QcchemError::InvalidBitstring(key.to_string())),
            })
            .collect::<QcchemResult<Vec<bool>>>()
            .map(Self)
    }

    /// Width in bits
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Zero width
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bit at a printed position
    pub fn get(&self, position: usize) -> Option<bool> {
        self.0.get(position).copied()
    }

    /// Bits at `positions`, in that order
    pub fn project(&self, positions: &[usize]) -> QcchemResult<Self> {
        let max = self.len().saturating_sub(1);
        positions
            .iter()
            .map(|&p| self.get(p).ok_or(QcchemError::QubitOutOfRange { qubit: p, max }))
            .collect::<QcchemResult<Vec<bool>>>()
            .map(Self)
    }
}

impl fmt::Display for Bitstring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0
            .iter()
            .try_for_each(|&b| f.write_str(if b { "1" } else { "0" }))
    }
}

/// Sum counts over every position not in `positions`
///
/// The marginal keys hold the kept positions in the order given.
pub fn marginal_counts(counts: &Counts, positions: &[usize]) -> QcchemResult<Counts> {
    counts.iter().try_fold(Counts::new(), |mut marginal, (key, &count)| {
        let key = Bitstring::parse(key)?.project(positions)?.to_string();
        *marginal.entry(key).or_insert(0) += count;
        Ok(marginal)
    })
}

// ============================================================================
// Tests
// ============================================================================
