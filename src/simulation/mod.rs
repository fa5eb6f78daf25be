// src/simulation/mod.rs

//! Executes a `qfsm::circuits::Circuit` on a state-vector engine and samples
//! measurement shots into a [`StateResult`].

mod results;
pub(crate) mod engine;

pub use results::StateResult;
pub(crate) use results::all_bitstrings;

use crate::circuits::Circuit;
use crate::core::{FsmError, FsmResult, QubitId};
use crate::operations::Operation;
use crate::validation::{check_counts, validate_state};
use engine::{MAX_QUBITS, StateVectorEngine};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Simulator settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Seed for shot sampling. `None` draws a fresh seed from the OS for every run.
    pub seed: Option<u64>,
}

/// The main simulator orchestrating the execution of circuits.
#[derive(Debug, Default)]
pub struct Simulator {
    config: SimulatorConfig,
}

impl Simulator {
    /// Creates a new Simulator with default settings (unseeded sampling).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a simulator with explicit settings.
    pub fn with_config(config: SimulatorConfig) -> Self {
        Self { config }
    }

    /// Creates a simulator whose sampling is reproducible.
    pub fn seeded(seed: u64) -> Self {
        Self::with_config(SimulatorConfig { seed: Some(seed) })
    }

    /// Runs `circuit` and samples `shots` measurement outcomes.
    ///
    /// Gates are applied in order to |0...0>. Measurements are treated as
    /// terminal: the final state's distribution over the classical register is
    /// sampled `shots` times.
    ///
    /// # Returns
    /// * `Ok(StateResult)` whose counts sum to exactly `shots`.
    /// * `Err(FsmError::InvalidInput)` if `shots` is zero.
    /// * `Err(FsmError::SimulationError)` if either register is wider than the
    ///   engine supports.
    /// * `Err(FsmError::InvalidOperation)` if the circuit has no measurements,
    ///   or applies a gate to a qubit after measuring it.
    /// * `Err(FsmError::Incoherence)` if the final state is not normalized.
    pub fn run(&self, circuit: &Circuit, shots: u64) -> FsmResult<StateResult> {
        if shots == 0 {
            return Err(FsmError::invalid_input("shots must be a positive integer"));
        }
        // The outcome table holds 2^clbits entries, bounded like the state vector
        if circuit.num_clbits() > MAX_QUBITS {
            return Err(FsmError::SimulationError {
                message: format!(
                    "{} classical bits exceeds the supported maximum of {}",
                    circuit.num_clbits(),
                    MAX_QUBITS
                ),
            });
        }

        let mut engine = StateVectorEngine::init(circuit.num_qubits())?;
        let mut measured: HashSet<QubitId> = HashSet::new();
        let mut measurements: Vec<(QubitId, usize)> = Vec::new();

        for op in circuit.operations() {
            match op {
                Operation::Measure { qubit, clbit } => {
                    measured.insert(*qubit);
                    // A later measurement into the same classical bit overwrites the earlier one
                    measurements.retain(|(_, c)| *c != clbit.0);
                    measurements.push((*qubit, clbit.0));
                }
                _ => {
                    if let Some(q) = op.involved_qubits().into_iter().find(|q| measured.contains(q)) {
                        return Err(FsmError::invalid_operation(format!(
                            "Mid-circuit measurement is not supported: '{}' acts on {} after it was measured",
                            op, q
                        )));
                    }
                    engine.apply_operation(op)?;
                }
            }
        }

        if measurements.is_empty() {
            return Err(FsmError::invalid_operation("Circuit has no measurements; nothing to count"));
        }

        validate_state(engine.state(), None)?;

        let distribution = engine.outcome_distribution(&measurements, circuit.num_clbits());
        debug!(
            qubits = engine.num_qubits(),
            clbits = circuit.num_clbits(),
            operations = circuit.len(),
            "state evolved; sampling {} shots",
            shots
        );

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let histogram = sample_histogram(&distribution, shots, &mut rng)?;
        let result = StateResult::from_histogram(shots, circuit.num_clbits(), &histogram);
        check_counts(&result)?;
        debug!(counts = %result, "sampling complete");
        Ok(result)
    }
}

/// Draws `shots` outcomes from `distribution` by inverse-CDF sampling.
fn sample_histogram<R: Rng>(distribution: &[f64], shots: u64, rng: &mut R) -> FsmResult<Vec<u64>> {
    let total: f64 = distribution.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(FsmError::SimulationError {
            message: format!("Outcome distribution has invalid total weight {}", total),
        });
    }
    // Only outcomes with weight take part, so floating-point slack can never select an impossible one
    let support: Vec<(usize, f64)> = distribution
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, p)| *p > 1e-15)
        .collect();
    let last = support.last().map(|(idx, _)| *idx).ok_or_else(|| FsmError::SimulationError {
        message: "Outcome distribution has no support".to_string(),
    })?;

    let mut histogram = vec![0u64; distribution.len()];
    for _ in 0..shots {
        let p_sample: f64 = rng.random::<f64>() * total;
        let mut cumulative = 0.0;
        let mut chosen = last;
        for (idx, p) in &support {
            cumulative += *p;
            if p_sample < cumulative {
                chosen = *idx;
                break;
            }
        }
        histogram[chosen] += 1;
    }
    Ok(histogram)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::CircuitBuilder;
    use crate::core::ClbitId;
    use crate::operations::Gate;

    fn q(i: usize) -> QubitId {
        QubitId(i)
    }

    fn c(i: usize) -> ClbitId {
        ClbitId(i)
    }

    #[test]
    fn test_zero_shots_rejected() -> FsmResult<()> {
        let circuit = CircuitBuilder::new(1, 1).add_op(Operation::measure(q(0), c(0))).build()?;
        let err = Simulator::seeded(1).run(&circuit, 0).unwrap_err();
        assert!(matches!(err, FsmError::InvalidInput { .. }));
        Ok(())
    }

    #[test]
    fn test_no_measurement_rejected() -> FsmResult<()> {
        let circuit = CircuitBuilder::new(1, 1).add_op(Operation::x(q(0))).build()?;
        let err = Simulator::seeded(1).run(&circuit, 10).unwrap_err();
        assert!(matches!(err, FsmError::InvalidOperation { .. }));
        Ok(())
    }

    #[test]
    fn test_gate_after_measure_rejected() -> FsmResult<()> {
        let circuit = CircuitBuilder::new(1, 1)
            .add_op(Operation::measure(q(0), c(0)))
            .add_op(Operation::x(q(0)))
            .build()?;
        let err = Simulator::seeded(1).run(&circuit, 10).unwrap_err();
        assert!(matches!(err, FsmError::InvalidOperation { .. }));
        Ok(())
    }

    #[test]
    fn test_oversized_classical_register_rejected() -> FsmResult<()> {
        let circuit = CircuitBuilder::new(1, 64).add_op(Operation::measure(q(0), c(63))).build()?;
        let err = Simulator::seeded(1).run(&circuit, 4).unwrap_err();
        assert!(matches!(err, FsmError::SimulationError { .. }));

        let circuit = CircuitBuilder::new(1, MAX_QUBITS + 1)
            .add_op(Operation::measure(q(0), c(MAX_QUBITS)))
            .build()?;
        assert!(matches!(Simulator::seeded(1).run(&circuit, 4), Err(FsmError::SimulationError { .. })));
        Ok(())
    }

    #[test]
    fn test_deterministic_circuit_puts_all_shots_on_one_outcome() -> FsmResult<()> {
        let circuit = CircuitBuilder::new(2, 2)
            .add_op(Operation::x(q(1)))
            .add_op(Operation::measure(q(0), c(0)))
            .add_op(Operation::measure(q(1), c(1)))
            .build()?;
        let result = Simulator::new().run(&circuit, 500)?;
        assert_eq!(result.count("10"), 500);
        assert_eq!(result.counts().len(), 1);
        Ok(())
    }

    #[test]
    fn test_unmeasured_clbits_read_zero() -> FsmResult<()> {
        let circuit = CircuitBuilder::new(1, 3)
            .add_op(Operation::x(q(0)))
            .add_op(Operation::measure(q(0), c(1)))
            .build()?;
        let result = Simulator::seeded(3).run(&circuit, 16)?;
        assert_eq!(result.count("010"), 16);
        Ok(())
    }

    #[test]
    fn test_same_seed_same_counts() -> FsmResult<()> {
        let circuit = CircuitBuilder::new(2, 2)
            .add_op(Operation::Apply { gate: Gate::H, target: q(0) })
            .add_op(Operation::Apply { gate: Gate::H, target: q(1) })
            .add_op(Operation::measure(q(0), c(0)))
            .add_op(Operation::measure(q(1), c(1)))
            .build()?;
        let a = Simulator::seeded(42).run(&circuit, 1024)?;
        let b = Simulator::seeded(42).run(&circuit, 1024)?;
        assert_eq!(a, b);
        assert_eq!(a.total(), 1024);
        Ok(())
    }

    #[test]
    fn test_sample_histogram_skips_zero_weight_outcomes() -> FsmResult<()> {
        let mut rng = StdRng::seed_from_u64(7);
        let histogram = sample_histogram(&[0.0, 0.25, 0.0, 0.75], 4000, &mut rng)?;
        assert_eq!(histogram[0], 0);
        assert_eq!(histogram[2], 0);
        assert_eq!(histogram.iter().sum::<u64>(), 4000);
        assert!(histogram[3] > histogram[1]);
        Ok(())
    }
}
