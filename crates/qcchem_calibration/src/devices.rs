//! Fake device catalog
//!
//! Deterministic five-qubit calibration snapshots standing in for real
//! devices. `fake_<device>` backends simulate these with per-qubit noise.

use crate::properties::BackendProperties;
use qcchem_core::error::{QcchemError, QcchemResult};
use qcchem_core::topology::Topology;

/// Coupling layout of a catalog device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Linear,
    TShape,
}

/// Reference values a snapshot is derived from
struct DeviceSpec {
    name: &'static str,
    layout: Layout,
    t1_us: f64,
    t2_us: f64,
    sx_error: f64,
    cx_error: f64,
    prob_meas1_prep0: f64,
    prob_meas0_prep1: f64,
}

const NUM_QUBITS: usize = 5;

const SX_LENGTH_NS: f64 = 35.5;

const CX_LENGTH_NS: f64 = 320.0;

const CATALOG: [DeviceSpec; 6] = [
    DeviceSpec {
        name: "athens",
        layout: Layout::Linear,
        t1_us: 72.0,
        t2_us: 95.0,
        sx_error: 3.6e-4,
        cx_error: 9.8e-3,
        prob_meas1_prep0: 0.008,
        prob_meas0_prep1: 0.022,
    },
    DeviceSpec {
        name: "belem",
        layout: Layout::TShape,
        t1_us: 88.0,
        t2_us: 101.0,
        sx_error: 2.9e-4,
        cx_error: 1.2e-2,
        prob_meas1_prep0: 0.012,
        prob_meas0_prep1: 0.031,
    },
    DeviceSpec {
        name: "bogota",
        layout: Layout::Linear,
        t1_us: 110.0,
        t2_us: 142.0,
        sx_error: 3.1e-4,
        cx_error: 1.5e-2,
        prob_meas1_prep0: 0.018,
        prob_meas0_prep1: 0.046,
    },
    DeviceSpec {
        name: "lima",
        layout: Layout::TShape,
        t1_us: 96.0,
        t2_us: 110.0,
        sx_error: 4.2e-4,
        cx_error: 1.0e-2,
        prob_meas1_prep0: 0.011,
        prob_meas0_prep1: 0.028,
    },
    DeviceSpec {
        name: "manila",
        layout: Layout::Linear,
        t1_us: 150.0,
        t2_us: 60.0,
        sx_error: 2.4e-4,
        cx_error: 7.5e-3,
        prob_meas1_prep0: 0.014,
        prob_meas0_prep1: 0.035,
    },
    DeviceSpec {
        name: "quito",
        layout: Layout::TShape,
        t1_us: 84.0,
        t2_us: 120.0,
        sx_error: 3.8e-4,
        cx_error: 1.1e-2,
        prob_meas1_prep0: 0.021,
        prob_meas0_prep1: 0.052,
    },
];

/// Names of every catalog device
pub fn fake_device_names() -> Vec<&'static str> {
    CATALOG.iter().map(|d| d.name).collect()
}

/// Calibration snapshot of a catalog device (case-insensitive, `fake_` prefix optional)
pub fn fake_device(name: &str) -> QcchemResult<BackendProperties> {
    let lower = name.to_lowercase();
    let short = lower.strip_prefix("fake_").unwrap_or(&lower);

    let spec = CATALOG
        .iter()
        .find(|d| d.name == short)
        .ok_or_else(|| QcchemError::NoBackendsMatch {
            criteria: format!("fake device '{}'", name),
        })?;

    Ok(build(spec))
}

fn build(spec: &DeviceSpec) -> BackendProperties {
    let mut props = BackendProperties::new(format!("fake_{}", spec.name));

    // Qubits further along the chip are progressively worse
    for q in 0..NUM_QUBITS {
        let drift = 1.0 + 0.1 * q as f64;
        props.add_qubit(
            spec.t1_us / drift,
            spec.t2_us / drift,
            spec.prob_meas1_prep0 * drift,
            spec.prob_meas0_prep1 * drift,
        );
    }

    for q in 0..NUM_QUBITS {
        let drift = 1.0 + 0.1 * q as f64;
        props.add_gate("id", vec![q], spec.sx_error * drift, SX_LENGTH_NS);
        props.add_gate("sx", vec![q], spec.sx_error * drift, SX_LENGTH_NS);
        props.add_gate("x", vec![q], spec.sx_error * drift, SX_LENGTH_NS);
    }

    let topology = match spec.layout {
        Layout::Linear => Topology::linear(NUM_QUBITS),
        Layout::TShape => Topology::t_shape(),
    };

    for (i, &(q0, q1)) in topology.coupling_map().iter().enumerate() {
        let error = spec.cx_error * (1.0 + 0.15 * i as f64);
        props.add_gate("cx", vec![q0, q1], error, CX_LENGTH_NS);
        props.add_gate("cx", vec![q1, q0], error, CX_LENGTH_NS);
    }

    props
}

// ============================================================================
// Tests
// ============================================================================
