//! Circuit transpilation
//!
//! Rewrites circuits into a backend's native gate set with exact
//! decompositions (up to global phase), merges neighbouring `rz` on the
//! same qubit, and checks the result against the coupling map. There is
//! no routing: a two-qubit gate on an uncoupled pair is rejected.

use crate::execution::BackendConfiguration;
use qcchem_core::error::{QcchemError, QcchemResult};
use qcchem_core::{Circuit, Gate, QubitId};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// Native gate set of device-like backends
pub const DEVICE_BASIS_GATES: &[&str] = &["id", "rz", "sx", "x", "cx"];

/// Every gate the local simulator executes directly
pub const SIMULATOR_BASIS_GATES: &[&str] = &[
    "h", "x", "y", "z", "s", "sdg", "t", "tdg", "sx", "sxdg", "id", "rx", "ry", "rz", "p", "cx",
    "cz", "swap",
];

/// Nesting bound for decompositions
const MAX_DECOMPOSITION_DEPTH: usize = 4;

/// Transpiler configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TranspilerConfig {
    /// Target basis gates
    pub basis_gates: Vec<String>,

    /// Coupling map (allowed 2-qubit connections, either direction)
    pub coupling_map: Option<Vec<(QubitId, QubitId)>>,

    /// Number of qubits on target
    pub num_qubits: usize,

    /// Merge neighbouring rz on the same qubit
    pub merge_rotations: bool,
}

impl Default for TranspilerConfig {
    fn default() -> Self {
        Self {
            basis_gates: DEVICE_BASIS_GATES.iter().map(|s| s.to_string()).collect(),
            coupling_map: None,
            num_qubits: usize::MAX,
            merge_rotations: true,
        }
    }
}

impl TranspilerConfig {
    /// Config matching a backend configuration
    pub fn for_configuration(config: &BackendConfiguration) -> Self {
        Self {
            basis_gates: config.basis_gates.clone(),
            coupling_map: config.coupling_map.clone(),
            num_qubits: config.n_qubits,
            merge_rotations: true,
        }
    }

    /// Device basis on a given coupling map
    pub fn for_device(num_qubits: usize, coupling_map: Vec<(QubitId, QubitId)>) -> Self {
        Self {
            num_qubits,
            coupling_map: Some(coupling_map),
            ..Default::default()
        }
    }

    /// Enable or disable rz merging
    pub fn with_merge_rotations(mut self, merge: bool) -> Self {
        self.merge_rotations = merge;
        self
    }

    fn is_native(&self, gate: &Gate) -> bool {
        gate.is_measurement()
            || gate.is_barrier()
            || self.basis_gates.iter().any(|g| g == gate.name())
    }
}

/// Circuit transpiler
pub struct Transpiler {
    config: TranspilerConfig,
}

impl Transpiler {
    /// Create new transpiler
    pub fn new(config: TranspilerConfig) -> Self {
        Self { config }
    }

    /// Get configuration
    pub fn config(&self) -> &TranspilerConfig {
        &self.config
    }

    /// Compile a circuit for the target
    pub fn run(&self, circuit: &Circuit) -> QcchemResult<Circuit> {
        if circuit.num_qubits() > self.config.num_qubits {
            return Err(QcchemError::QubitOutOfRange {
                qubit: circuit.num_qubits() - 1,
                max: self.config.num_qubits.saturating_sub(1),
            });
        }

        let mut native = Vec::with_capacity(circuit.gate_count());
        for gate in circuit.gates() {
            self.lower(gate, 0, &mut native)?;
        }

        let gates = if self.config.merge_rotations {
            merge_rz(native, circuit.num_qubits())
        } else {
            native
        };

        self.check_coupling(&gates)?;

        let mut out = Circuit::from_gates(circuit.num_qubits(), circuit.num_clbits(), gates)?;
        if let Some(name) = circuit.name() {
            out.set_name(name);
        }
        Ok(out)
    }

    fn lower(&self, gate: &Gate, depth: usize, out: &mut Vec<Gate>) -> QcchemResult<()> {
        if self.config.is_native(gate) {
            out.push(gate.clone());
            return Ok(());
        }
        if depth >= MAX_DECOMPOSITION_DEPTH {
            return Err(QcchemError::UnsupportedGate(gate.name().to_string()));
        }
        let parts =
            decompose(gate).ok_or_else(|| QcchemError::UnsupportedGate(gate.name().to_string()))?;
        for part in &parts {
            self.lower(part, depth + 1, out)?;
        }
        Ok(())
    }

    fn check_coupling(&self, gates: &[Gate]) -> QcchemResult<()> {
        let Some(map) = &self.config.coupling_map else {
            return Ok(());
        };
        for gate in gates.iter().filter(|g| g.is_two_qubit()) {
            if let [a, b] = gate.qubits().as_slice() {
                let coupled = map
                    .iter()
                    .any(|&(x, y)| (x, y) == (*a, *b) || (y, x) == (*a, *b));
                if !coupled {
                    return Err(QcchemError::TopologyViolation { q1: *a, q2: *b });
                }
            }
        }
        Ok(())
    }
}

/// One decomposition step towards `rz`, `sx`, `x`, `cx`
fn decompose(gate: &Gate) -> Option<Vec<Gate>> {
    let parts = match *gate {
        Gate::H(q) => vec![Gate::Rz(q, FRAC_PI_2), Gate::Sx(q), Gate::Rz(q, FRAC_PI_2)],
        Gate::S(q) => vec![Gate::Rz(q, FRAC_PI_2)],
        Gate::Sdg(q) => vec![Gate::Rz(q, -FRAC_PI_2)],
        Gate::Z(q) => vec![Gate::Rz(q, PI)],
        Gate::T(q) => vec![Gate::Rz(q, FRAC_PI_4)],
        Gate::Tdg(q) => vec![Gate::Rz(q, -FRAC_PI_4)],
        Gate::P(q, lambda) => vec![Gate::Rz(q, lambda)],
        Gate::Y(q) => vec![Gate::Rz(q, PI), Gate::X(q)],
        Gate::Sxdg(q) => vec![Gate::Rz(q, PI), Gate::Sx(q), Gate::Rz(q, PI)],
        Gate::Id(_) => vec![],
        Gate::Rx(q, theta) => vec![Gate::H(q), Gate::Rz(q, theta), Gate::H(q)],
        Gate::Ry(q, theta) => vec![
            Gate::Sdg(q),
            Gate::H(q),
            Gate::Rz(q, theta),
            Gate::H(q),
            Gate::S(q),
        ],
        Gate::Cz(c, t) => vec![Gate::H(t), Gate::Cnot(c, t), Gate::H(t)],
        Gate::Swap(a, b) => vec![Gate::Cnot(a, b), Gate::Cnot(b, a), Gate::Cnot(a, b)],
        Gate::X(_)
        | Gate::Sx(_)
        | Gate::Rz(_, _)
        | Gate::Cnot(_, _)
        | Gate::Measure(_, _)
        | Gate::Barrier(_) => return None,
    };
    Some(parts)
}

/// Fold each rz into the previous gate on its qubit when that is also an rz
fn merge_rz(gates: Vec<Gate>, num_qubits: usize) -> Vec<Gate> {
    let mut out: Vec<Gate> = Vec::with_capacity(gates.len());
    let mut last_on: Vec<Option<usize>> = vec![None; num_qubits];

    for gate in gates {
        if let Gate::Rz(q, theta) = &gate {
            if let Some(Some(i)) = last_on.get(*q) {
                if let Gate::Rz(_, phi) = &mut out[*i] {
                    *phi += *theta;
                    continue;
                }
            }
        }

        let idx = out.len();
        let qubits = gate.qubits();
        if gate.is_barrier() && qubits.is_empty() {
            last_on.iter_mut().for_each(|l| *l = Some(idx));
        } else {
            for q in qubits {
                if let Some(l) = last_on.get_mut(q) {
                    *l = Some(idx);
                }
            }
        }
        out.push(gate);
    }

    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use qcchem_core::CircuitBuilder;

    fn device(n: usize) -> Transpiler {
        let map = (0..n - 1).map(|i| (i, i + 1)).collect();
        Transpiler::new(TranspilerConfig::for_device(n, map))
    }

    fn only_native(circuit: &Circuit) -> bool {
        circuit
            .gates()
            .iter()
            .all(|g| g.is_measurement() || g.is_barrier() || DEVICE_BASIS_GATES.contains(&g.name()))
    }

    #[test]
    fn test_hadamard_lowering() {
        let circuit = CircuitBuilder::new(1).h(0).build();
        let out = device(2).run(&circuit).unwrap();
        assert_eq!(
            out.gates(),
            &[Gate::Rz(0, FRAC_PI_2), Gate::Sx(0), Gate::Rz(0, FRAC_PI_2)]
        );
    }

    #[test]
    fn test_sdg_then_h_merges_rotations() {
        let circuit = CircuitBuilder::new(1).sdg(0).h(0).build();
        let out = device(2).run(&circuit).unwrap();

        // rz(-pi/2) rz(pi/2) collapse into one rz(0)
        assert_eq!(out.gate_count(), 3);
        match &out.gates()[0] {
            Gate::Rz(0, angle) => assert!(angle.abs() < 1e-12),
            g => panic!("unexpected gate {}", g),
        }
    }

    #[test]
    fn test_all_gates_reach_native_basis() {
        let circuit = CircuitBuilder::with_clbits(3, 3)
            .h(0)
            .y(1)
            .rx(2, 0.3)
            .ry(0, 0.7)
            .cz(0, 1)
            .swap(1, 2)
            .t(2)
            .p(1, 0.1)
            .measure(0, 2)
            .build();
        let out = device(3).run(&circuit).unwrap();

        assert!(only_native(&out));
        assert_eq!(out.count_measurements(), 1);
        assert_eq!(out.num_clbits(), 3);
    }

    #[test]
    fn test_uncoupled_pair_is_rejected() {
        let circuit = CircuitBuilder::new(3).cnot(0, 2).build();
        assert!(matches!(
            device(3).run(&circuit),
            Err(QcchemError::TopologyViolation { q1: 0, q2: 2 })
        ));

        // Reverse direction of a coupled pair is accepted
        let reversed = CircuitBuilder::new(3).cnot(1, 0).build();
        assert!(device(3).run(&reversed).is_ok());
    }

    #[test]
    fn test_too_many_qubits() {
        let circuit = CircuitBuilder::new(4).h(3).build();
        assert!(matches!(
            device(3).run(&circuit),
            Err(QcchemError::QubitOutOfRange { .. })
        ));
    }

    #[test]
    fn test_simulator_basis_keeps_gates() {
        let config = TranspilerConfig {
            basis_gates: SIMULATOR_BASIS_GATES.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        };
        let circuit = CircuitBuilder::new(2).h(0).sdg(1).cnot(0, 1).build();
        let out = Transpiler::new(config).run(&circuit).unwrap();
        assert_eq!(out.gates(), circuit.gates());
    }

    #[test]
    fn test_unsupported_target() {
        let config = TranspilerConfig {
            basis_gates: vec!["cx".to_string()],
            ..Default::default()
        };
        let circuit = CircuitBuilder::new(1).h(0).build();
        assert!(matches!(
            Transpiler::new(config).run(&circuit),
            Err(QcchemError::UnsupportedGate(_))
        ));
    }

    #[test]
    fn test_barrier_blocks_merging() {
        let mut circuit = CircuitBuilder::new(1).rz(0, 0.1).build();
        circuit.barrier();
        circuit.add_gate(Gate::Rz(0, 0.2)).unwrap();

        let out = device(2).run(&circuit).unwrap();
        assert_eq!(out.gate_count(), 3);
    }
}
