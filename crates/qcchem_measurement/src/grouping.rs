//! Qubitwise-commuting grouping
//!
//! Greedy first-fit: each term joins the first group it commutes with
//! qubitwise, widening that group's basis, or opens a new group.

use crate::pauli_basis::PauliBasis;
use qcchem_core::error::QcchemResult;

/// Measurement bases covering every term
///
/// Groups keep the order in which they were opened. Every term is
/// contained in at least one returned basis.
pub fn group_qubitwise<S: AsRef<str>>(terms: &[S]) -> QcchemResult<Vec<PauliBasis>> {
    let mut groups: Vec<PauliBasis> = Vec::new();

    for term in terms {
        let term = PauliBasis::new(term.as_ref())?;
        match groups.iter_mut().find(|g| g.commutes_qubitwise(&term)) {
            Some(group) => *group = group.merge(&term)?,
            None => groups.push(term),
        }
    }

    log::debug!("Grouped {} terms into {} bases", terms.len(), groups.len());
    Ok(groups)
}

// ============================================================================
// Tests
// ============================================================================
