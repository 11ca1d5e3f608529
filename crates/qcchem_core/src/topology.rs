//! Device coupling layouts
//!
//! Couplings are undirected: a two-qubit gate may run either way along an
//! edge. Edges are stored lower qubit first, in first-seen order.

use crate::circuit::Circuit;
use crate::error::{QcchemError, QcchemResult};
use crate::types::QubitId;
use serde::{Deserialize, Serialize};

/// Undirected coupling graph of a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    edges: Vec<(QubitId, QubitId)>,
    num_qubits: usize,
}

impl Topology {
    /// Build from coupling pairs; direction and repeats are ignored
    pub fn from_coupling_map(
        coupling_map: impl IntoIterator<Item = (QubitId, QubitId)>,
    ) -> QcchemResult<Self> {
        let mut edges: Vec<(QubitId, QubitId)> = Vec::new();
        for (a, b) in coupling_map {
            if a == b {
                return Err(QcchemError::InvalidCoupling(a, b));
            }
            let edge = (a.min(b), a.max(b));
            if !edges.contains(&edge) {
                edges.push(edge);
            }
        }

        let num_qubits = match edges.iter().map(|&(_, hi)| hi).max() {
            Some(hi) => hi + 1,
            None => return Err(QcchemError::EmptyCouplingMap),
        };
        Ok(Self { edges, num_qubits })
    }

    /// Chain 0-1-...-(n-1)
    pub fn linear(n: usize) -> Self {
        Self {
            edges: (1..n).map(|q| (q - 1, q)).collect(),
            num_qubits: n,
        }
    }

    /// Five-qubit T layout: 0-1-2 with 1-3-4 hanging off the middle
    pub fn t_shape() -> Self {
        Self {
            edges: vec![(0, 1), (1, 2), (1, 3), (3, 4)],
            num_qubits: 5,
        }
    }

    /// Number of qubits
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Edges, lower qubit first
    pub fn coupling_map(&self) -> &[(QubitId, QubitId)] {
        &self.edges
    }

    /// Check if a two-qubit gate can act on `q1` and `q2`
    pub fn is_coupled(&self, q1: QubitId, q2: QubitId) -> bool {
        self.edges.contains(&(q1.min(q2), q1.max(q2)))
    }

    /// Check that a circuit fits the device and only uses coupled pairs
    pub fn validate_circuit(&self, circuit: &Circuit) -> QcchemResult<()> {
        if circuit.num_qubits() > self.num_qubits {
            return Err(QcchemError::QubitOutOfRange {
                qubit: circuit.num_qubits() - 1,
                max: self.num_qubits.saturating_sub(1),
            });
        }

        match circuit
            .two_qubit_pairs()
            .into_iter()
            .find(|&(q1, q2)| !self.is_coupled(q1, q2))
        {
            Some((q1, q2)) => Err(QcchemError::TopologyViolation { q1, q2 }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::CircuitBuilder;
    use crate::gate::Gate;

    #[test]
    fn test_linear_edges() {
        let topo = Topology::linear(4);
        assert_eq!(topo.coupling_map(), &[(0, 1), (1, 2), (2, 3)]);
        assert!(topo.is_coupled(2, 1));
        assert!(!topo.is_coupled(0, 2));
        assert!(Topology::linear(1).coupling_map().is_empty());
    }

    #[test]
    fn test_directed_map_collapses() {
        let topo = Topology::from_coupling_map(vec![(1, 0), (0, 1), (3, 4), (4, 3)]).unwrap();
        assert_eq!(topo.coupling_map(), &[(0, 1), (3, 4)]);
        assert_eq!(topo.num_qubits(), 5);

        assert!(matches!(
            Topology::from_coupling_map(Vec::<(QubitId, QubitId)>::new()),
            Err(QcchemError::EmptyCouplingMap)
        ));
        assert!(matches!(
            Topology::from_coupling_map(vec![(2, 2)]),
            Err(QcchemError::InvalidCoupling(2, 2))
        ));
    }

    #[test]
    fn test_validate_circuit() {
        let topo = Topology::t_shape();
        let valid = CircuitBuilder::new(5).h(0).cx(1, 0).cx(3, 4).build();
        assert!(topo.validate_circuit(&valid).is_ok());

        let mut invalid = CircuitBuilder::new(5).build();
        invalid.add_gate(Gate::Cnot(2, 3)).unwrap();
        assert!(matches!(
            topo.validate_circuit(&invalid),
            Err(QcchemError::TopologyViolation { q1: 2, q2: 3 })
        ));

        assert!(topo.validate_circuit(&CircuitBuilder::new(6).build()).is_err());
    }
}
