//! Backend properties (calibration snapshots)
//!
//! Per-qubit and per-gate calibration data in the layout devices report
//! it: a list of named values for every qubit and one entry per gate
//! instance.

use qcchem_core::error::QcchemResult;
use qcchem_core::topology::Topology;
use qcchem_core::types::QubitId;
use qcchem_noise::{NoiseModel, ReadoutError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Property names used in qubit lists
pub mod keys {
    //! Standard property names

    /// Relaxation time
    pub const T1: &str = "T1";
    /// Dephasing time
    pub const T2: &str = "T2";
    /// Symmetric readout error
    pub const READOUT_ERROR: &str = "readout_error";
    /// P(measure 0 | prepared 1)
    pub const PROB_MEAS0_PREP1: &str = "prob_meas0_prep1";
    /// P(measure 1 | prepared 0)
    pub const PROB_MEAS1_PREP0: &str = "prob_meas1_prep0";
    /// Gate error probability
    pub const GATE_ERROR: &str = "gate_error";
    /// Gate duration
    pub const GATE_LENGTH: &str = "gate_length";
}

/// Gates whose error stands in for single-qubit noise
const SINGLE_QUBIT_REFERENCE_GATES: [&str; 3] = ["sx", "x", "u2"];

/// Named value with unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nduv {
    /// Property name
    pub name: String,

    /// Value
    pub value: f64,

    /// Unit (empty when dimensionless)
    #[serde(default)]
    pub unit: String,
}

impl Nduv {
    /// Create a property value
    pub fn new(name: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            unit: unit.into(),
        }
    }
}

/// Calibration of one gate instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateProperties {
    /// Gate name (e.g. "cx")
    pub gate: String,

    /// Qubits the gate acts on, in order
    pub qubits: Vec<QubitId>,

    /// Calibrated parameters (gate_error, gate_length)
    pub parameters: Vec<Nduv>,
}

impl GateProperties {
    /// Look up a parameter
    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value)
    }
}

/// Calibration snapshot of a backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendProperties {
    /// Backend name
    pub backend_name: String,

    /// Per-qubit property lists, indexed by qubit
    pub qubits: Vec<Vec<Nduv>>,

    /// Gate calibrations
    pub gates: Vec<GateProperties>,
}

impl BackendProperties {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create an empty snapshot
    pub fn new(backend_name: impl Into<String>) -> Self {
        Self {
            backend_name: backend_name.into(),
            qubits: Vec::new(),
            gates: Vec::new(),
        }
    }

    /// Append a qubit with the usual properties
    pub fn add_qubit(
        &mut self,
        t1_us: f64,
        t2_us: f64,
        prob_meas1_prep0: f64,
        prob_meas0_prep1: f64,
    ) -> QubitId {
        self.qubits.push(vec![
            Nduv::new(keys::T1, t1_us, "us"),
            Nduv::new(keys::T2, t2_us, "us"),
            Nduv::new(
                keys::READOUT_ERROR,
                (prob_meas1_prep0 + prob_meas0_prep1) / 2.0,
                "",
            ),
            Nduv::new(keys::PROB_MEAS0_PREP1, prob_meas0_prep1, ""),
            Nduv::new(keys::PROB_MEAS1_PREP0, prob_meas1_prep0, ""),
        ]);
        self.qubits.len() - 1
    }

    /// Append a gate calibration
    pub fn add_gate(
        &mut self,
        gate: impl Into<String>,
        qubits: Vec<QubitId>,
        gate_error: f64,
        gate_length_ns: f64,
    ) {
        self.gates.push(GateProperties {
            gate: gate.into(),
            qubits,
            parameters: vec![
                Nduv::new(keys::GATE_ERROR, gate_error, ""),
                Nduv::new(keys::GATE_LENGTH, gate_length_ns, "ns"),
            ],
        });
    }

    // ========================================================================
    // Qubit Properties
    // ========================================================================

    /// Number of qubits with properties
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Look up a named property of a qubit
    pub fn qubit_property(&self, qubit: QubitId, name: &str) -> Option<f64> {
        self.qubits
            .get(qubit)?
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value)
    }

    /// T1 of a qubit (microseconds)
    pub fn t1(&self, qubit: QubitId) -> Option<f64> {
        self.qubit_property(qubit, keys::T1)
    }

    /// T2 of a qubit (microseconds)
    pub fn t2(&self, qubit: QubitId) -> Option<f64> {
        self.qubit_property(qubit, keys::T2)
    }

    /// Symmetric readout error of a qubit
    pub fn readout_error(&self, qubit: QubitId) -> Option<f64> {
        self.qubit_property(qubit, keys::READOUT_ERROR)
    }

    /// Readout error of a qubit, asymmetric when both directions are known
    pub fn readout(&self, qubit: QubitId) -> Option<ReadoutError> {
        let p10 = self.qubit_property(qubit, keys::PROB_MEAS1_PREP0);
        let p01 = self.qubit_property(qubit, keys::PROB_MEAS0_PREP1);
        match (p10, p01) {
            (Some(a), Some(b)) => ReadoutError::new(a, b).ok(),
            _ => self
                .readout_error(qubit)
                .and_then(|p| ReadoutError::symmetric(p).ok()),
        }
    }

    // ========================================================================
    // Gate Properties
    // ========================================================================

    /// Error of a gate on specific qubits (qubit order matters)
    pub fn gate_error(&self, gate: &str, qubits: &[QubitId]) -> Option<f64> {
        self.find_gate(gate, qubits)?.parameter(keys::GATE_ERROR)
    }

    /// Duration of a gate on specific qubits (nanoseconds)
    pub fn gate_length(&self, gate: &str, qubits: &[QubitId]) -> Option<f64> {
        self.find_gate(gate, qubits)?.parameter(keys::GATE_LENGTH)
    }

    fn find_gate(&self, gate: &str, qubits: &[QubitId]) -> Option<&GateProperties> {
        self.gates
            .iter()
            .find(|g| g.gate == gate && g.qubits == qubits)
    }

    /// Ordered pairs of every two-qubit gate entry, first-seen order, no duplicates
    pub fn two_qubit_pairs(&self) -> Vec<(QubitId, QubitId)> {
        let mut pairs: Vec<(QubitId, QubitId)> = Vec::new();
        for g in &self.gates {
            if let [q0, q1] = g.qubits.as_slice() {
                if !pairs.contains(&(*q0, *q1)) {
                    pairs.push((*q0, *q1));
                }
            }
        }
        pairs
    }

    /// Coupling map derived from two-qubit gate entries
    pub fn coupling_map(&self) -> Vec<(QubitId, QubitId)> {
        self.two_qubit_pairs()
    }

    /// Qubit -> neighbours reachable by a two-qubit gate, in first-seen order
    pub fn connectivity(&self) -> BTreeMap<QubitId, Vec<QubitId>> {
        let mut connectivity: BTreeMap<QubitId, Vec<QubitId>> = BTreeMap::new();
        for (q0, q1) in self.two_qubit_pairs() {
            connectivity.entry(q0).or_default().push(q1);
        }
        connectivity
    }

    /// Topology from the coupling map
    pub fn topology(&self) -> QcchemResult<Topology> {
        Topology::from_coupling_map(self.coupling_map())
    }

    // ========================================================================
    // Conversions
    // ========================================================================

    /// Per-qubit noise model built from this snapshot
    ///
    /// Single-qubit gate noise uses the first of `sx`, `x`, `u2` calibrated
    /// on each qubit. Two-qubit noise uses each pair's gate error.
    pub fn to_noise_model(&self) -> NoiseModel {
        let mut model = NoiseModel::ideal();

        for q in 0..self.num_qubits() {
            if let Some(e) = SINGLE_QUBIT_REFERENCE_GATES
                .iter()
                .find_map(|g| self.gate_error(g, &[q]))
            {
                model = model.with_qubit_gate_error(q, e.clamp(0.0, 1.0));
            }
            if let Some(ro) = self.readout(q) {
                model = model.with_qubit_readout_error(q, ro);
            }
        }

        for (q0, q1) in self.two_qubit_pairs() {
            if let Some(e) = self
                .gates
                .iter()
                .filter(|g| g.qubits == [q0, q1])
                .find_map(|g| g.parameter(keys::GATE_ERROR))
            {
                model = model.with_pair_gate_error(q0, q1, e.clamp(0.0, 1.0));
            }
        }

        model
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> QcchemResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> QcchemResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Display for BackendProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BackendProperties({}, {} qubits, {} gates)",
            self.backend_name,
            self.num_qubits(),
            self.gates.len()
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn three_qubit_line() -> BackendProperties {
        let mut props = BackendProperties::new("line3");
        for _ in 0..3 {
            props.add_qubit(100.0, 80.0, 0.01, 0.03);
        }
        for q in 0..3 {
            props.add_gate("sx", vec![q], 0.0003, 35.0);
        }
        props.add_gate("cx", vec![0, 1], 0.01, 300.0);
        props.add_gate("cx", vec![1, 0], 0.01, 300.0);
        props.add_gate("cx", vec![1, 2], 0.02, 400.0);
        props.add_gate("cx", vec![2, 1], 0.02, 400.0);
        props
    }

    #[test]
    fn test_qubit_properties() {
        let props = three_qubit_line();
        assert_eq!(props.num_qubits(), 3);
        assert_eq!(props.t1(0), Some(100.0));
        assert_eq!(props.qubit_property(5, keys::T1), None);

        let ro = props.readout(2).unwrap();
        assert_eq!(ro.prob_meas1_prep0(), 0.01);
        assert_eq!(ro.prob_meas0_prep1(), 0.03);
        assert!((props.readout_error(2).unwrap() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_gate_lookup_is_order_sensitive() {
        let props = three_qubit_line();
        assert_eq!(props.gate_error("cx", &[1, 2]), Some(0.02));
        assert_eq!(props.gate_error("cx", &[0, 2]), None);
        assert_eq!(props.gate_length("sx", &[1]), Some(35.0));
    }

    #[test]
    fn test_connectivity_first_seen_order() {
        let mut props = three_qubit_line();
        // Duplicate entry must not repeat the neighbour
        props.add_gate("cx", vec![1, 0], 0.01, 300.0);

        let connectivity = props.connectivity();
        assert_eq!(connectivity[&0], vec![1]);
        assert_eq!(connectivity[&1], vec![0, 2]);
        assert_eq!(connectivity[&2], vec![1]);
        assert_eq!(props.coupling_map().len(), 4);
    }

    #[test]
    fn test_to_noise_model() {
        let model = three_qubit_line().to_noise_model();
        assert_eq!(model.gate_error_1q_on(1), 0.0003);
        assert_eq!(model.gate_error_2q_on(2, 1), 0.02);
        assert_eq!(model.readout_error_on(0).prob_meas0_prep1(), 0.03);
    }

    #[test]
    fn test_json_round_trip() {
        let props = three_qubit_line();
        let json = props.to_json().unwrap();
        assert!(json.contains("prob_meas0_prep1"));
        assert_eq!(BackendProperties::from_json(&json).unwrap(), props);
    }

    #[test]
    fn test_no_gates_means_no_topology() {
        let props = BackendProperties::new("empty");
        assert!(props.connectivity().is_empty());
        assert!(props.topology().is_err());
    }
}
