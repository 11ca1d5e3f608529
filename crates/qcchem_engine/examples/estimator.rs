//! Two-qubit energy estimator
//!
//! Measures H = XX + YY + ZZ on a small ansatz over a range of angles,
//! first on the noiseless `sim0`, then on a noisy `sim<level>` with and
//! without pairwise readout mitigation.
//!
//! Usage:
//! ```bash
//! RUST_LOG=info cargo run --example estimator --release -- sim3
//! ```

use anyhow::Context;
use qcchem_core::{Circuit, CircuitBuilder};
use qcchem_engine::prelude::*;
use qcchem_measurement::{evaluate_pauli_mitigated, Hamiltonian, PauliBasis};
use std::f64::consts::PI;

fn ansatz(theta: f64) -> Circuit {
    CircuitBuilder::new(2)
        .x(0)
        .h(0)
        .cx(0, 1)
        .ry(0, theta)
        .ry(1, theta)
        .cx(0, 1)
        .h(0)
        .build()
}

/// Energy with every term evaluated on mitigated pair counts
fn mitigated_energy(
    backend: &CountsBackend,
    hamiltonian: &Hamiltonian,
    bases: &[PauliBasis],
) -> anyhow::Result<f64> {
    let mut energy = 0.0;
    for (term, coefficient) in hamiltonian.terms() {
        let basis = bases
            .iter()
            .find(|b| b.contains(term))
            .with_context(|| format!("term {} was not measured", term))?;
        let corrected = backend.apply_pairwise_qrem_to_basis(basis, (0, 1))?;
        energy += coefficient * evaluate_pauli_mitigated(term, &corrected)?;
    }
    Ok(energy)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let noisy_name = std::env::args().nth(1).unwrap_or_else(|| "sim3".to_string());
    let session = Session::local().with_config(EngineConfig::default().with_seed(7));
    let shots = session.config().shots;

    let hamiltonian = Hamiltonian::from_terms([("XX", 1.0), ("YY", 1.0), ("ZZ", 1.0)])?;
    let bases = hamiltonian.measurement_bases()?;
    println!("H = {}", hamiltonian);
    println!("Bases: {:?}\n", bases.iter().map(PauliBasis::basis).collect::<Vec<_>>());

    let exact = resolve_backend(&session, "vec")?
        .into_statevector()
        .context("vec did not resolve to a statevector backend")?;
    let ideal = resolve_backend(&session, "sim0")?
        .into_counts()
        .context("sim0 did not resolve to a counts backend")?;
    let mut noisy = resolve_backend(&session, noisy_name.as_str())?
        .into_counts()
        .with_context(|| format!("{} did not resolve to a counts backend", noisy_name))?;

    noisy.calibrate_pairwise_qrem(Some(&[0, 1]), None)?;
    if let Some(filter) = noisy.filters().get(&(0, 1)) {
        println!(
            "{}: pair (0, 1) readout fidelity {:.4}\n",
            noisy.wrapper().name(),
            filter.readout_fidelity()
        );
    }

    println!(
        "{:>8} {:>10} {:>10} {:>10} {:>10}",
        "theta", "exact", "sim0", "noisy", "mitigated"
    );
    for step in 0..=8 {
        let theta = step as f64 * PI / 8.0;
        let circuit = ansatz(theta);

        let state = exact.run(&circuit, MeasurementBases::Default, shots)?;
        let e_exact = hamiltonian.energy_from_statevector(&state)?;

        let measured = ideal.run(&circuit, MeasurementBases::Explicit(bases.clone()), shots)?;
        let e_ideal = hamiltonian.energy_from_bases(&measured)?;

        let measured = noisy.run(&circuit, MeasurementBases::Explicit(bases.clone()), shots)?;
        let e_noisy = hamiltonian.energy_from_bases(&measured)?;
        let e_mitigated = mitigated_energy(&noisy, &hamiltonian, &measured)?;

        println!(
            "{:>8.4} {:>+10.4} {:>+10.4} {:>+10.4} {:>+10.4}",
            theta, e_exact, e_ideal, e_noisy, e_mitigated
        );
    }

    Ok(())
}
