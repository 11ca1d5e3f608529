//! Quantum gate definitions for qcchem
//!
//! The gate set covers state preparation, basis rotation before
//! measurement, and the native gates backends compile into.

use crate::types::{Angle, ClbitId, QubitId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Gate applied to a circuit
///
/// Two-qubit variants are `(control, target)`; `Swap` is symmetric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Gate {
    /// Hadamard
    H(QubitId),
    /// Pauli X
    X(QubitId),
    /// Pauli Y
    Y(QubitId),
    /// Pauli Z
    Z(QubitId),
    /// Phase quarter turn, sqrt(Z)
    S(QubitId),
    /// Inverse of `S`; with `H` it rotates Y onto Z
    Sdg(QubitId),
    /// sqrt(S)
    T(QubitId),
    /// Inverse of `T`
    Tdg(QubitId),
    /// sqrt(X), native on IBM devices
    Sx(QubitId),
    /// Inverse of `Sx`
    Sxdg(QubitId),
    /// Explicit idle slot
    Id(QubitId),

    /// exp(-i θ X / 2)
    Rx(QubitId, Angle),
    /// exp(-i θ Y / 2)
    Ry(QubitId, Angle),
    /// exp(-i θ Z / 2)
    Rz(QubitId, Angle),
    /// diag(1, e^{iλ})
    P(QubitId, Angle),

    /// Controlled X
    Cnot(QubitId, QubitId),
    /// Controlled Z
    Cz(QubitId, QubitId),
    /// Exchange two qubits
    Swap(QubitId, QubitId),

    /// Read a qubit into a classical bit
    Measure(QubitId, ClbitId),
    /// Scheduling fence; an empty list spans every qubit
    Barrier(Vec<QubitId>),
}

/// Operand shape of a gate, borrowed from it
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operands<'a> {
    /// Fixed single-qubit unitary
    Fixed(QubitId),
    /// Single-qubit rotation by an angle
    Rotation(QubitId, Angle),
    /// Two-qubit unitary
    Pair(QubitId, QubitId),
    /// Qubit read into a classical bit
    Readout(QubitId, ClbitId),
    /// Barrier span
    Fence(&'a [QubitId]),
}

impl Gate {
    /// Mnemonic and operands in one view
    pub fn operands(&self) -> Operands<'_> {
        use Operands::*;
        match *self {
            Gate::H(q) | Gate::X(q) | Gate::Y(q) | Gate::Z(q) => Fixed(q),
            Gate::S(q) | Gate::Sdg(q) | Gate::T(q) | Gate::Tdg(q) => Fixed(q),
            Gate::Sx(q) | Gate::Sxdg(q) | Gate::Id(q) => Fixed(q),
            Gate::Rx(q, a) | Gate::Ry(q, a) | Gate::Rz(q, a) | Gate::P(q, a) => Rotation(q, a),
            Gate::Cnot(a, b) | Gate::Cz(a, b) | Gate::Swap(a, b) => Pair(a, b),
            Gate::Measure(q, c) => Readout(q, c),
            Gate::Barrier(ref span) => Fence(span),
        }
    }

    /// Qubits touched, in operand order
    pub fn qubits(&self) -> Vec<QubitId> {
        match self.operands() {
            Operands::Fixed(q) | Operands::Rotation(q, _) | Operands::Readout(q, _) => vec![q],
            Operands::Pair(a, b) => vec![a, b],
            Operands::Fence(span) => span.to_vec(),
        }
    }

    /// Classical bit written, for measurements
    pub fn clbit(&self) -> Option<ClbitId> {
        match self.operands() {
            Operands::Readout(_, c) => Some(c),
            _ => None,
        }
    }

    /// Single-qubit unitary (measurement excluded)
    pub fn is_single_qubit(&self) -> bool {
        matches!(self.operands(), Operands::Fixed(_) | Operands::Rotation(..))
    }

    /// Two-qubit unitary
    pub fn is_two_qubit(&self) -> bool {
        matches!(self.operands(), Operands::Pair(..))
    }

    /// Frame change with no physical pulse
    pub fn is_virtual(&self) -> bool {
        matches!(self, Gate::Rz(..) | Gate::P(..) | Gate::Id(_))
    }

    /// Measurement
    pub fn is_measurement(&self) -> bool {
        matches!(self.operands(), Operands::Readout(..))
    }

    /// Barrier
    pub fn is_barrier(&self) -> bool {
        matches!(self.operands(), Operands::Fence(_))
    }

    /// OpenQASM 2 mnemonic
    pub fn name(&self) -> &'static str {
        match self {
            Gate::H(_) => "h",
            Gate::X(_) => "x",
            Gate::Y(_) => "y",
            Gate::Z(_) => "z",
            Gate::S(_) => "s",
            Gate::Sdg(_) => "sdg",
            Gate::T(_) => "t",
            Gate::Tdg(_) => "tdg",
            Gate::Sx(_) => "sx",
            Gate::Sxdg(_) => "sxdg",
            Gate::Id(_) => "id",
            Gate::Rx(..) => "rx",
            Gate::Ry(..) => "ry",
            Gate::Rz(..) => "rz",
            Gate::P(..) => "p",
            Gate::Cnot(..) => "cx",
            Gate::Cz(..) => "cz",
            Gate::Swap(..) => "swap",
            Gate::Measure(..) => "measure",
            Gate::Barrier(_) => "barrier",
        }
    }

    /// One OpenQASM 2 statement against `qreg q` / `creg c`
    pub fn to_qasm(&self) -> String {
        let name = self.name();
        match self.operands() {
            Operands::Fixed(q) => format!("{name} q[{q}];"),
            Operands::Rotation(q, angle) => format!("{name}({angle}) q[{q}];"),
            Operands::Pair(a, b) => format!("{name} q[{a}],q[{b}];"),
            Operands::Readout(q, c) => format!("measure q[{q}] -> c[{c}];"),
            Operands::Fence([]) => "barrier q;".to_string(),
            Operands::Fence(span) => {
                let span: Vec<String> = span.iter().map(|q| format!("q[{q}]")).collect();
                format!("barrier {};", span.join(","))
            }
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_qasm())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operands_and_qubits() {
        assert_eq!(Gate::Sdg(2).operands(), Operands::Fixed(2));
        assert_eq!(Gate::Ry(1, 0.5).operands(), Operands::Rotation(1, 0.5));
        assert_eq!(Gate::Cnot(0, 1).qubits(), vec![0, 1]);
        assert_eq!(Gate::Measure(2, 0).qubits(), vec![2]);
        assert_eq!(Gate::Measure(2, 0).clbit(), Some(0));
        assert_eq!(Gate::Barrier(vec![1, 3]).qubits(), vec![1, 3]);
        assert_eq!(Gate::H(0).clbit(), None);
    }

    #[test]
    fn test_classification() {
        assert!(Gate::Sxdg(0).is_single_qubit());
        assert!(Gate::P(0, 0.1).is_single_qubit());
        assert!(Gate::Swap(0, 1).is_two_qubit());
        assert!(!Gate::Cz(0, 1).is_single_qubit());
        assert!(!Gate::Measure(0, 0).is_single_qubit());
        assert!(Gate::Measure(0, 0).is_measurement());
        assert!(Gate::Barrier(vec![]).is_barrier());

        assert!(Gate::Rz(0, 1.0).is_virtual());
        assert!(!Gate::Sx(0).is_virtual());
    }

    #[test]
    fn test_qasm_statements() {
        assert_eq!(Gate::Sdg(3).to_qasm(), "sdg q[3];");
        assert_eq!(Gate::Cnot(0, 1).to_qasm(), "cx q[0],q[1];");
        assert_eq!(Gate::Ry(0, 0.25).to_qasm(), "ry(0.25) q[0];");
        assert_eq!(Gate::Measure(0, 1).to_qasm(), "measure q[0] -> c[1];");
        assert_eq!(Gate::Barrier(vec![]).to_qasm(), "barrier q;");
        assert_eq!(Gate::Barrier(vec![0, 2]).to_string(), "barrier q[0],q[2];");
    }
}
