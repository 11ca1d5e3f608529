//! Circuit builder for qcchem
//!
//! Provides a fluent builder for state-preparation circuits.

use crate::circuit::Circuit;
use crate::gate::Gate;
use crate::types::{Angle, ClbitId, QubitId};

/// Fluent circuit builder (consuming self pattern)
///
/// Invalid gates (qubit or clbit out of range) are skipped.
pub struct CircuitBuilder {
    circuit: Circuit,
}

impl CircuitBuilder {
    // ========================================================================
    // Constructor
    // ========================================================================

    /// Create a new circuit builder
    pub fn new(num_qubits: usize) -> Self {
        Self {
            circuit: Circuit::new(num_qubits),
        }
    }

    /// Create with a classical register of the given size
    pub fn with_clbits(num_qubits: usize, num_clbits: usize) -> Self {
        Self {
            circuit: Circuit::with_clbits(num_qubits, num_clbits),
        }
    }

    /// Create with circuit name
    pub fn with_name(num_qubits: usize, name: impl Into<String>) -> Self {
        Self {
            circuit: Circuit::with_name(num_qubits, name),
        }
    }

    fn push(mut self, gate: Gate) -> Self {
        let _ = self.circuit.add_gate(gate);
        self
    }

    // ========================================================================
    // Single-Qubit Gates (Non-Parameterized)
    // ========================================================================

    /// Add Hadamard gate
    pub fn h(self, qubit: QubitId) -> Self {
        self.push(Gate::H(qubit))
    }

    /// Add Pauli-X gate
    pub fn x(self, qubit: QubitId) -> Self {
        self.push(Gate::X(qubit))
    }

    /// Add Pauli-Y gate
    pub fn y(self, qubit: QubitId) -> Self {
        self.push(Gate::Y(qubit))
    }

    /// Add Pauli-Z gate
    pub fn z(self, qubit: QubitId) -> Self {
        self.push(Gate::Z(qubit))
    }

    /// Add S gate
    pub fn s(self, qubit: QubitId) -> Self {
        self.push(Gate::S(qubit))
    }

    /// Add S-dagger gate
    pub fn sdg(self, qubit: QubitId) -> Self {
        self.push(Gate::Sdg(qubit))
    }

    /// Add T gate
    pub fn t(self, qubit: QubitId) -> Self {
        self.push(Gate::T(qubit))
    }

    /// Add SX gate
    pub fn sx(self, qubit: QubitId) -> Self {
        self.push(Gate::Sx(qubit))
    }

    // ========================================================================
    // Single-Qubit Parameterized Gates
    // ========================================================================

    /// Add Rx rotation
    pub fn rx(self, qubit: QubitId, angle: Angle) -> Self {
        self.push(Gate::Rx(qubit, angle))
    }

    /// Add Ry rotation
    pub fn ry(self, qubit: QubitId, angle: Angle) -> Self {
        self.push(Gate::Ry(qubit, angle))
    }

    /// Add Rz rotation
    pub fn rz(self, qubit: QubitId, angle: Angle) -> Self {
        self.push(Gate::Rz(qubit, angle))
    }

    /// Add phase gate
    pub fn p(self, qubit: QubitId, lambda: Angle) -> Self {
        self.push(Gate::P(qubit, lambda))
    }

    // ========================================================================
    // Two-Qubit Gates
    // ========================================================================

    /// Add CNOT gate
    pub fn cnot(self, control: QubitId, target: QubitId) -> Self {
        self.push(Gate::Cnot(control, target))
    }

    /// Alias for cnot
    pub fn cx(self, control: QubitId, target: QubitId) -> Self {
        self.cnot(control, target)
    }

    /// Add CZ gate
    pub fn cz(self, control: QubitId, target: QubitId) -> Self {
        self.push(Gate::Cz(control, target))
    }

    /// Add SWAP gate
    pub fn swap(self, qubit1: QubitId, qubit2: QubitId) -> Self {
        self.push(Gate::Swap(qubit1, qubit2))
    }

    // ========================================================================
    // Measurement and Control
    // ========================================================================

    /// Measure a qubit into a classical bit
    pub fn measure(self, qubit: QubitId, clbit: ClbitId) -> Self {
        self.push(Gate::Measure(qubit, clbit))
    }

    /// Barrier across every qubit
    pub fn barrier(mut self) -> Self {
        self.circuit.barrier();
        self
    }

    // ========================================================================
    // Entanglers
    // ========================================================================

    /// Nearest-neighbour CNOT chain 0→1→…→n-1
    pub fn cx_chain(self) -> Self {
        let n = self.circuit.num_qubits();
        (0..n.saturating_sub(1)).fold(self, |b, q| b.cnot(q, q + 1))
    }

    /// Finish building
    pub fn build(self) -> Circuit {
        self.circuit
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_bell() {
        let circuit = CircuitBuilder::new(2).h(0).cnot(0, 1).build();
        assert_eq!(circuit.gates(), &[Gate::H(0), Gate::Cnot(0, 1)]);
    }

    #[test]
    fn test_builder_skips_invalid_gates() {
        let circuit = CircuitBuilder::new(2).h(0).x(7).measure(0, 0).build();
        assert_eq!(circuit.gate_count(), 1);
    }

    #[test]
    fn test_builder_cx_chain() {
        let circuit = CircuitBuilder::with_clbits(4, 4)
            .h(0)
            .cx_chain()
            .ry(3, 0.4)
            .measure(3, 0)
            .build();

        assert_eq!(circuit.two_qubit_pairs(), vec![(0, 1), (1, 2), (2, 3)]);
        assert_eq!(circuit.count_ops()["ry"], 1);
        assert_eq!(circuit.count_measurements(), 1);
    }
}
