//! Pauli measurement bases
//!
//! A basis is one Pauli symbol per qubit. Applying it to a circuit rotates
//! X and Y positions onto Z and measures every non-identity qubit `q` into
//! classical bit `num_clbits - 1 - q`, so character `q` of a result key is
//! the outcome of qubit `q`.

use qcchem_core::error::{QcchemError, QcchemResult};
use qcchem_core::types::{Counts, QubitId};
use qcchem_core::{Circuit, Gate};
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter;
use std::str::FromStr;

// ============================================================================
// Pauli
// ============================================================================

/// Single-qubit Pauli operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pauli {
    /// Identity
    I,
    /// Pauli X
    X,
    /// Pauli Y
    Y,
    /// Pauli Z
    Z,
}

impl Pauli {
    /// Parse a symbol, case-insensitive
    pub fn from_char(symbol: char) -> QcchemResult<Self> {
        match symbol.to_ascii_uppercase() {
            'I' => Ok(Pauli::I),
            'X' => Ok(Pauli::X),
            'Y' => Ok(Pauli::Y),
            'Z' => Ok(Pauli::Z),
            _ => Err(QcchemError::InvalidBasisSymbol {
                symbol,
                basis: symbol.to_string(),
            }),
        }
    }

    /// Symbol character
    pub fn as_char(&self) -> char {
        match self {
            Pauli::I => 'I',
            Pauli::X => 'X',
            Pauli::Y => 'Y',
            Pauli::Z => 'Z',
        }
    }

    /// Gates rotating this operator's eigenbasis onto the Z basis
    pub fn rotation(&self, qubit: QubitId) -> Vec<Gate> {
        match self {
            Pauli::I | Pauli::Z => vec![],
            Pauli::X => vec![Gate::H(qubit)],
            Pauli::Y => vec![Gate::Sdg(qubit), Gate::H(qubit)],
        }
    }

    /// Check if this is the identity
    pub fn is_identity(&self) -> bool {
        matches!(self, Pauli::I)
    }
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// ============================================================================
// PauliBasis
// ============================================================================

/// Measurement basis: one Pauli symbol per qubit, stored uppercase
///
/// Equality, ordering and hashing use the basis string only.
#[derive(Debug, Clone, Default)]
pub struct PauliBasis {
    basis: String,

    /// Non-identity positions, computed on first use
    active: OnceCell<Vec<QubitId>>,

    results: Option<Counts>,
}

impl PauliBasis {
    /// Create a basis, rejecting symbols outside {I, X, Y, Z}
    pub fn new(basis: impl Into<String>) -> QcchemResult<Self> {
        let basis = Self::from(basis.into());
        basis.paulis()?;
        Ok(basis)
    }

    /// All-Z basis (computational-basis measurement)
    pub fn all_z(num_qubits: usize) -> Self {
        Self::from("Z".repeat(num_qubits))
    }

    /// All-I basis (no rotation, no measurement)
    pub fn identity(num_qubits: usize) -> Self {
        Self::from("I".repeat(num_qubits))
    }

    /// Basis string
    pub fn basis(&self) -> &str {
        &self.basis
    }

    /// Replace the basis string; active qubits are recomputed on next use
    pub fn set_basis(&mut self, basis: impl Into<String>) {
        self.basis = basis.into().to_uppercase();
        self.active = OnceCell::new();
    }

    /// Number of qubit positions
    pub fn len(&self) -> usize {
        self.basis.chars().count()
    }

    /// Check if the basis string is empty
    pub fn is_empty(&self) -> bool {
        self.basis.is_empty()
    }

    /// Parsed symbols
    pub fn paulis(&self) -> QcchemResult<Vec<Pauli>> {
        self.basis
            .chars()
            .map(|c| {
                Pauli::from_char(c).map_err(|_| QcchemError::InvalidBasisSymbol {
                    symbol: c,
                    basis: self.basis.clone(),
                })
            })
            .collect()
    }

    /// Qubits with a non-identity symbol, ascending
    pub fn active(&self) -> &[QubitId] {
        self.active.get_or_init(|| {
            self.basis
                .chars()
                .enumerate()
                .filter(|(_, c)| *c != 'I')
                .map(|(i, _)| i)
                .collect()
        })
    }

    // ========================================================================
    // Results
    // ========================================================================

    /// Counts assigned by a run
    pub fn results(&self) -> QcchemResult<&Counts> {
        self.results
            .as_ref()
            .ok_or_else(|| QcchemError::ResultsNotYetAvailable(self.basis.clone()))
    }

    /// Assign counts
    pub fn set_results(&mut self, counts: Counts) {
        self.results = Some(counts);
    }

    /// Check if counts have been assigned
    pub fn has_results(&self) -> bool {
        self.results.is_some()
    }

    // ========================================================================
    // Circuit Transformation
    // ========================================================================

    /// Rotate into this basis and measure the active qubits
    ///
    /// A classical register sized to the qubit count is added when the
    /// circuit has none.
    pub fn apply(&self, circuit: Circuit) -> QcchemResult<Circuit> {
        self.apply_inner(circuit, false)
    }

    /// As `apply`, with a barrier before the rotations
    pub fn apply_with_barrier(&self, circuit: Circuit) -> QcchemResult<Circuit> {
        self.apply_inner(circuit, true)
    }

    fn apply_inner(&self, mut circuit: Circuit, barrier: bool) -> QcchemResult<Circuit> {
        let paulis = self.paulis()?;

        if barrier {
            circuit.barrier();
        }
        for (q, pauli) in paulis.iter().enumerate() {
            circuit.add_gates(pauli.rotation(q))?;
        }

        if circuit.num_clbits() == 0 {
            circuit.add_classical_register();
        }
        let num_clbits = circuit.num_clbits();
        for &q in self.active() {
            if q >= num_clbits {
                return Err(QcchemError::ClbitOutOfRange {
                    clbit: q,
                    num_clbits,
                });
            }
            circuit.measure(q, num_clbits - 1 - q)?;
        }

        Ok(circuit)
    }

    // ========================================================================
    // Compatibility
    // ========================================================================

    /// Qubits `other` measures that this basis leaves as identity
    ///
    /// The shorter string is padded with identities. Two different
    /// non-identity symbols on the same qubit are a `CommutationError`.
    pub fn difference(&self, other: impl AsRef<str>) -> QcchemResult<usize> {
        let other = other.as_ref().to_uppercase();
        let mut diff = 0;

        for (qubit, (p1, p2)) in zip_padded(&self.basis, &other).enumerate() {
            if p2 == p1 || p2 == 'I' {
                continue;
            }
            if p1 == 'I' {
                diff += 1;
                continue;
            }
            return Err(QcchemError::CommutationError {
                left: self.basis.clone(),
                right: other.clone(),
                qubit,
            });
        }

        Ok(diff)
    }

    /// Check if `other` can be read off this basis's outcomes
    pub fn contains(&self, other: impl AsRef<str>) -> bool {
        matches!(self.difference(other), Ok(0))
    }

    /// Check if no qubit carries two different non-identity symbols
    pub fn commutes_qubitwise(&self, other: impl AsRef<str>) -> bool {
        self.difference(other).is_ok()
    }

    /// Smallest basis containing both, if they commute qubitwise
    pub fn merge(&self, other: impl AsRef<str>) -> QcchemResult<PauliBasis> {
        let other = other.as_ref().to_uppercase();
        self.difference(&other)?;

        let merged: String = zip_padded(&self.basis, &other)
            .map(|(p1, p2)| if p1 == 'I' { p2 } else { p1 })
            .collect();
        Ok(PauliBasis::from(merged))
    }
}

/// Pairs of symbols, the shorter side padded with 'I'
fn zip_padded<'a>(a: &'a str, b: &'a str) -> impl Iterator<Item = (char, char)> + 'a {
    let len = a.chars().count().max(b.chars().count());
    a.chars()
        .chain(iter::repeat('I'))
        .zip(b.chars().chain(iter::repeat('I')))
        .take(len)
}

// ============================================================================
// Trait Implementations
// ============================================================================

impl From<&str> for PauliBasis {
    fn from(basis: &str) -> Self {
        Self::from(basis.to_string())
    }
}

impl From<String> for PauliBasis {
    fn from(basis: String) -> Self {
        Self {
            basis: basis.to_uppercase(),
            active: OnceCell::new(),
            results: None,
        }
    }
}

impl FromStr for PauliBasis {
    type Err = QcchemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for PauliBasis {
    fn as_ref(&self) -> &str {
        &self.basis
    }
}

impl PartialEq for PauliBasis {
    fn eq(&self, other: &Self) -> bool {
        self.basis == other.basis
    }
}

impl Eq for PauliBasis {}

impl PartialEq<str> for PauliBasis {
    fn eq(&self, other: &str) -> bool {
        self.basis == other.to_uppercase()
    }
}

impl PartialEq<&str> for PauliBasis {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl PartialOrd for PauliBasis {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PauliBasis {
    fn cmp(&self, other: &Self) -> Ordering {
        self.basis.cmp(&other.basis)
    }
}

impl Hash for PauliBasis {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.basis.hash(state);
    }
}

impl fmt::Display for PauliBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Basis({})", self.basis)
    }
}

// ============================================================================
// Tests
// ============================================================================
