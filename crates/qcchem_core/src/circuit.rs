//! Quantum circuit structure for qcchem
//!
//! Provides the core Circuit struct used for state preparation and
//! for the per-basis measurement circuits submitted to backends.

use crate::error::{QcchemError, QcchemResult};
use crate::gate::{Gate, Operands};
use crate::types::{ClbitId, QubitId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Gate list over one quantum register `q` and one classical register `c`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    num_qubits: usize,
    num_clbits: usize,
    gates: Vec<Gate>,
    name: Option<String>,
}

impl Circuit {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Empty circuit with no classical bits
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            num_clbits: 0,
            gates: Vec::new(),
            name: None,
        }
    }

    /// Empty circuit with `num_clbits` classical bits
    pub fn with_clbits(num_qubits: usize, num_clbits: usize) -> Self {
        Self {
            num_clbits,
            ..Self::new(num_qubits)
        }
    }

    /// Empty named circuit
    pub fn with_name(num_qubits: usize, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(num_qubits)
        }
    }

    /// Circuit holding `gates`, each checked against the register sizes
    pub fn from_gates(num_qubits: usize, num_clbits: usize, gates: Vec<Gate>) -> QcchemResult<Self> {
        let mut circuit = Self::with_clbits(num_qubits, num_clbits);
        circuit.add_gates(gates)?;
        Ok(circuit)
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Append a gate after checking its qubit and clbit operands
    pub fn add_gate(&mut self, gate: Gate) -> QcchemResult<()> {
        let num_qubits = self.num_qubits;
        if let Some(qubit) = gate.qubits().into_iter().find(|&q| q >= num_qubits) {
            return Err(QcchemError::GateQubitMismatch { qubit, num_qubits });
        }
        match gate.clbit() {
            Some(clbit) if clbit >= self.num_clbits => Err(QcchemError::ClbitOutOfRange {
                clbit,
                num_clbits: self.num_clbits,
            }),
            _ => {
                self.gates.push(gate);
                Ok(())
            }
        }
    }

    /// Append gates in order, stopping at the first invalid one
    pub fn add_gates(&mut self, gates: impl IntoIterator<Item = Gate>) -> QcchemResult<()> {
        gates.into_iter().try_for_each(|gate| self.add_gate(gate))
    }

    /// Grow the classical register by one bit per qubit
    pub fn add_classical_register(&mut self) {
        self.num_clbits += self.num_qubits;
    }

    /// Append `measure qubit -> clbit`
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> QcchemResult<()> {
        self.add_gate(Gate::Measure(qubit, clbit))
    }

    /// Append a barrier spanning every qubit
    pub fn barrier(&mut self) {
        self.gates.push(Gate::Barrier(Vec::new()));
    }

    /// Rename the circuit
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Quantum register width
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Classical register width
    pub fn num_clbits(&self) -> usize {
        self.num_clbits
    }

    /// Gates in program order
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Circuit name, if set
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// No gates at all
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Number of gates, barriers and measurements included
    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    // ========================================================================
    // Analysis
    // ========================================================================

    /// Occurrences of each gate mnemonic
    pub fn count_ops(&self) -> BTreeMap<&'static str, usize> {
        let mut ops = BTreeMap::new();
        for gate in &self.gates {
            *ops.entry(gate.name()).or_insert(0) += 1;
        }
        ops
    }

    /// Number of measurements
    pub fn count_measurements(&self) -> usize {
        self.gates.iter().filter(|g| g.is_measurement()).count()
    }

    /// Layers of non-barrier gates along the busiest qubit
    ///
    /// Barriers add no layer but align the qubits they span.
    pub fn depth(&self) -> usize {
        let mut layer = vec![0usize; self.num_qubits];
        for gate in &self.gates {
            let span = match gate.qubits() {
                qs if qs.is_empty() => (0..self.num_qubits).collect(),
                qs => qs,
            };
            let front = span.iter().filter_map(|&q| layer.get(q)).max().copied().unwrap_or(0);
            let next = if gate.is_barrier() { front } else { front + 1 };
            for q in span {
                if let Some(slot) = layer.get_mut(q) {
                    *slot = next;
                }
            }
        }
        layer.into_iter().max().unwrap_or(0)
    }

    /// `(qubit, clbit)` of every measurement, in program order
    pub fn measurements(&self) -> Vec<(QubitId, ClbitId)> {
        self.gates
            .iter()
            .filter_map(|g| match g.operands() {
                Operands::Readout(q, c) => Some((q, c)),
                _ => None,
            })
            .collect()
    }

    /// Operand pairs of every two-qubit gate, in program order
    pub fn two_qubit_pairs(&self) -> Vec<(QubitId, QubitId)> {
        self.gates
            .iter()
            .filter_map(|g| match g.operands() {
                Operands::Pair(a, b) => Some((a, b)),
                _ => None,
            })
            .collect()
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// OpenQASM 2.0 program with registers `q` and `c`
    pub fn to_qasm(&self) -> String {
        let mut qasm = format!(
            "OPENQASM 2.0;\ninclude \"qelib1.inc\";\n\nqreg q[{}];\n",
            self.num_qubits
        );
        if self.num_clbits > 0 {
            qasm.push_str(&format!("creg c[{}];\n", self.num_clbits));
        }
        for gate in &self.gates {
            qasm.push('\n');
            qasm.push_str(&gate.to_qasm());
        }
        qasm
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} qubits, {} clbits, depth {}",
            self.name().unwrap_or("circuit"),
            self.num_qubits,
            self.num_clbits,
            self.depth()
        )?;
        for (op, n) in self.count_ops() {
            write!(f, ", {}={}", op, n)?;
        }
        Ok(())
    }
}
