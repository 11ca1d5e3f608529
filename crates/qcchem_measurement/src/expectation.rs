//! Expectation values
//!
//! Reduces measured counts (or exact amplitudes) to Pauli expectation
//! values and Hamiltonian energies. Result keys follow the measurement
//! convention of `PauliBasis`: character `q` is the outcome of qubit `q`.

use crate::grouping::group_qubitwise;
use crate::pauli_basis::{Pauli, PauliBasis};
use num_complex::Complex64;
use qcchem_core::error::{QcchemError, QcchemResult};
use qcchem_core::types::Counts;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Pauli Expectations
// ============================================================================

/// ⟨P⟩ from counts: each shot contributes (-1)^(ones at non-I positions)
pub fn evaluate_pauli(pauli: &str, counts: &Counts) -> QcchemResult<f64> {
    parity_average(pauli, counts.iter().map(|(k, &v)| (k.as_str(), v as f64)))
}

/// ⟨P⟩ from mitigated (fractional) counts
pub fn evaluate_pauli_mitigated(pauli: &str, counts: &BTreeMap<String, f64>) -> QcchemResult<f64> {
    parity_average(pauli, counts.iter().map(|(k, &v)| (k.as_str(), v)))
}

fn parity_average<'a>(
    pauli: &str,
    entries: impl Iterator<Item = (&'a str, f64)>,
) -> QcchemResult<f64> {
    let active = PauliBasis::new(pauli)?.active().to_vec();

    let mut total = 0.0;
    let mut signed = 0.0;
    for (key, weight) in entries {
        let bits = key.as_bytes();
        let mut odd = false;
        for &q in &active {
            match bits.get(q) {
                Some(b'1') => odd = !odd,
                Some(b'0') => {}
                Some(_) => return Err(QcchemError::InvalidBitstring(key.to_string())),
                None => {
                    return Err(QcchemError::QubitOutOfRange {
                        qubit: q,
                        max: bits.len().saturating_sub(1),
                    })
                }
            }
        }
        total += weight;
        signed += if odd { -weight } else { weight };
    }

    if total == 0.0 {
        return Ok(0.0);
    }
    Ok(signed / total)
}

/// ⟨ψ|P|ψ⟩ for amplitudes whose index bit `q` is qubit `q`
pub fn statevector_expectation(pauli: &str, state: &[Complex64]) -> QcchemResult<f64> {
    let paulis = PauliBasis::new(pauli)?.paulis()?;
    let num_qubits = state.len().trailing_zeros() as usize;
    if !state.len().is_power_of_two() || paulis.len() > num_qubits {
        return Err(QcchemError::QubitOutOfRange {
            qubit: paulis.len().saturating_sub(1),
            max: num_qubits.saturating_sub(1),
        });
    }

    let flip_mask = paulis
        .iter()
        .enumerate()
        .filter(|(_, p)| matches!(p, Pauli::X | Pauli::Y))
        .fold(0usize, |m, (q, _)| m | (1 << q));

    let mut value = Complex64::new(0.0, 0.0);
    for (i, amp) in state.iter().enumerate() {
        let mut phase = Complex64::new(1.0, 0.0);
        for (q, p) in paulis.iter().enumerate() {
            let one = (i >> q) & 1 == 1;
            phase *= match (p, one) {
                (Pauli::Z, true) => Complex64::new(-1.0, 0.0),
                (Pauli::Y, false) => Complex64::new(0.0, 1.0),
                (Pauli::Y, true) => Complex64::new(0.0, -1.0),
                _ => Complex64::new(1.0, 0.0),
            };
        }
        value += state[i ^ flip_mask].conj() * phase * amp;
    }

    Ok(value.re)
}

// ============================================================================
// Hamiltonian
// ============================================================================

/// Weighted sum of Pauli strings, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hamiltonian {
    terms: Vec<(String, f64)>,
}

impl Hamiltonian {
    /// Create an empty Hamiltonian
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from (term, coefficient) pairs
    pub fn from_terms<S: AsRef<str>>(
        terms: impl IntoIterator<Item = (S, f64)>,
    ) -> QcchemResult<Self> {
        let mut h = Self::new();
        for (term, coefficient) in terms {
            h.add_term(term.as_ref(), coefficient)?;
        }
        Ok(h)
    }

    /// Add a term; repeated terms accumulate
    pub fn add_term(&mut self, term: &str, coefficient: f64) -> QcchemResult<()> {
        let term = PauliBasis::new(term)?.basis().to_string();
        match self.terms.iter_mut().find(|(t, _)| *t == term) {
            Some((_, c)) => *c += coefficient,
            None => self.terms.push((term, coefficient)),
        }
        Ok(())
    }

    /// Terms in insertion order
    pub fn terms(&self) -> &[(String, f64)] {
        &self.terms
    }

    /// Number of terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Check if there are no terms
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Length of the longest term
    pub fn num_qubits(&self) -> usize {
        self.terms.iter().map(|(t, _)| t.len()).max().unwrap_or(0)
    }

    /// Qubitwise-commuting bases covering every term
    pub fn measurement_bases(&self) -> QcchemResult<Vec<PauliBasis>> {
        let strings: Vec<&str> = self.terms.iter().map(|(t, _)| t.as_str()).collect();
        group_qubitwise(&strings)
    }

    /// Energy from measured bases
    ///
    /// Each term is evaluated on the first basis that contains it.
    pub fn energy_from_bases(&self, bases: &[PauliBasis]) -> QcchemResult<f64> {
        let mut energy = 0.0;
        for (term, coefficient) in &self.terms {
            let basis = bases
                .iter()
                .find(|b| b.contains(term))
                .ok_or_else(|| QcchemError::UnmeasuredTerm(term.clone()))?;
            energy += coefficient * evaluate_pauli(term, basis.results()?)?;
        }
        Ok(energy)
    }

    /// Exact energy from amplitudes
    pub fn energy_from_statevector(&self, state: &[Complex64]) -> QcchemResult<f64> {
        let mut energy = 0.0;
        for (term, coefficient) in &self.terms {
            energy += coefficient * statevector_expectation(term, state)?;
        }
        Ok(energy)
    }
}

impl fmt::Display for Hamiltonian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .terms
            .iter()
            .map(|(t, c)| format!("{:+} {}", c, t))
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_1_SQRT_2;

    fn counts(entries: &[(&str, u64)]) -> Counts {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn bell() -> Vec<Complex64> {
        vec![
            Complex64::new(FRAC_1_SQRT_2, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(FRAC_1_SQRT_2, 0.0),
        ]
    }

    #[test]
    fn test_evaluate_pauli_parity() {
        let c = counts(&[("00", 40), ("01", 10), ("10", 30), ("11", 20)]);

        assert_relative_eq!(evaluate_pauli("ZZ", &c).unwrap(), 0.2);
        // Z on qubit 0 reads character 0
        assert_relative_eq!(evaluate_pauli("ZI", &c).unwrap(), 0.0);
        assert_relative_eq!(evaluate_pauli("IZ", &c).unwrap(), 0.4);
        assert_relative_eq!(evaluate_pauli("II", &c).unwrap(), 1.0);
    }

    #[test]
    fn test_evaluate_pauli_errors() {
        let c = counts(&[("0", 1)]);
        assert!(evaluate_pauli("IZ", &c).is_err());
        assert!(evaluate_pauli("Q", &c).is_err());
        assert_eq!(evaluate_pauli("Z", &Counts::new()).unwrap(), 0.0);
    }

    #[test]
    fn test_mitigated_counts() {
        let mitigated: BTreeMap<String, f64> =
            [("00".to_string(), 75.5), ("11".to_string(), 24.5)].into_iter().collect();
        assert_relative_eq!(evaluate_pauli_mitigated("ZZ", &mitigated).unwrap(), 1.0);
        assert_relative_eq!(evaluate_pauli_mitigated("ZI", &mitigated).unwrap(), 0.51);
    }

    #[test]
    fn test_statevector_expectation_bell() {
        let state = bell();
        assert_relative_eq!(statevector_expectation("XX", &state).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(statevector_expectation("YY", &state).unwrap(), -1.0, epsilon = 1e-12);
        assert_relative_eq!(statevector_expectation("ZZ", &state).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(statevector_expectation("ZI", &state).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_statevector_expectation_qubit_order() {
        // |q0=1, q1=0> is index 1
        let mut state = vec![Complex64::new(0.0, 0.0); 4];
        state[1] = Complex64::new(1.0, 0.0);
        assert_relative_eq!(statevector_expectation("ZI", &state).unwrap(), -1.0);
        assert_relative_eq!(statevector_expectation("IZ", &state).unwrap(), 1.0);
        assert!(statevector_expectation("ZZZ", &state).is_err());
    }

    #[test]
    fn test_hamiltonian_terms_accumulate() {
        let mut h = Hamiltonian::from_terms([("xx", 1.0), ("ZZ", 0.5)]).unwrap();
        h.add_term("ZZ", 0.5).unwrap();

        assert_eq!(h.len(), 2);
        assert_eq!(h.terms()[1], ("ZZ".to_string(), 1.0));
        assert_eq!(h.num_qubits(), 2);
        assert_eq!(h.to_string(), "+1 XX +1 ZZ");
    }

    #[test]
    fn test_energy_from_bases_uses_first_containing_basis() {
        let h = Hamiltonian::from_terms([("ZI", 1.0), ("IZ", 2.0)]).unwrap();

        let mut zz = PauliBasis::from("ZZ");
        zz.set_results(counts(&[("01", 100)]));
        let mut zi = PauliBasis::from("ZI");
        zi.set_results(counts(&[("10", 100)]));

        // ZI comes from the ZZ basis, not the later ZI basis
        let energy = h.energy_from_bases(&[zz, zi]).unwrap();
        assert_relative_eq!(energy, 1.0 - 2.0);
    }

    #[test]
    fn test_energy_from_bases_errors() {
        let h = Hamiltonian::from_terms([("XX", 1.0)]).unwrap();
        assert!(matches!(
            h.energy_from_bases(&[PauliBasis::from("ZZ")]),
            Err(QcchemError::UnmeasuredTerm(_))
        ));
        assert!(matches!(
            h.energy_from_bases(&[PauliBasis::from("XX")]),
            Err(QcchemError::ResultsNotYetAvailable(_))
        ));
    }

    #[test]
    fn test_energy_from_statevector() {
        let h = Hamiltonian::from_terms([("XX", 1.0), ("YY", 1.0), ("ZZ", 1.0)]).unwrap();
        assert_relative_eq!(h.energy_from_statevector(&bell()).unwrap(), 1.0, epsilon = 1e-12);
        assert_eq!(h.measurement_bases().unwrap().len(), 3);
    }
}
