// src/simulation/engine.rs
use crate::core::{FsmError, FsmResult, QubitId, StateVector};
use crate::operations::{GateMatrix, Operation};
use num_complex::Complex;
use tracing::trace;

/// Largest register the engine will allocate (2^24 amplitudes, 256 MiB).
pub(crate) const MAX_QUBITS: usize = 24;

/// State-vector engine evolving an `n`-qubit register from |0...0>.
/// (Internal visibility)
#[derive(Debug)]
pub(crate) struct StateVectorEngine {
    state: StateVector,
    num_qubits: usize,
}

impl StateVectorEngine {
    /// Initializes the engine in |0...0>.
    pub(crate) fn init(num_qubits: usize) -> FsmResult<Self> {
        if num_qubits == 0 {
            return Err(FsmError::InvalidOperation {
                message: "Cannot initialize simulation engine with zero qubits".to_string(),
            });
        }
        if num_qubits > MAX_QUBITS {
            return Err(FsmError::SimulationError {
                message: format!("{} qubits exceeds the supported maximum of {}", num_qubits, MAX_QUBITS),
            });
        }
        let dim = 1usize << num_qubits;
        Ok(Self { state: StateVector::ground(dim), num_qubits })
    }

    #[cfg(test)]
    pub(crate) fn set_state(&mut self, state: StateVector) -> FsmResult<()> {
        if state.dim() != self.state.dim() {
            return Err(FsmError::SimulationError {
                message: format!(
                    "Cannot set state: provided dimension {} does not match engine dimension {}",
                    state.dim(),
                    self.state.dim()
                ),
            });
        }
        self.state = state;
        Ok(())
    }

    pub(crate) fn state(&self) -> &StateVector {
        &self.state
    }

    pub(crate) fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Applies a gate operation. Measurements are handled by the simulator and
    /// are rejected here.
    pub(crate) fn apply_operation(&mut self, op: &Operation) -> FsmResult<()> {
        match op {
            Operation::Apply { gate, target } => {
                self.check_qubit(target)?;
                self.apply_controlled_gate(0, target.0, &gate.matrix());
            }
            Operation::Controlled { gate, controls, target } => {
                self.check_qubit(target)?;
                let mut control_mask = 0usize;
                for control in controls {
                    self.check_qubit(control)?;
                    if control == target || control_mask & control.mask() != 0 {
                        return Err(FsmError::invalid_operation(format!(
                            "Controlled operation '{}' repeats a qubit",
                            op
                        )));
                    }
                    control_mask |= control.mask();
                }
                self.apply_controlled_gate(control_mask, target.0, &gate.matrix());
            }
            Operation::Measure { .. } => {
                return Err(FsmError::invalid_operation(
                    "Measure operation should not be passed directly to apply_operation",
                ));
            }
        }
        trace!(operation = %op, "applied");
        Ok(())
    }

    fn check_qubit(&self, qubit: &QubitId) -> FsmResult<()> {
        if qubit.0 >= self.num_qubits {
            return Err(FsmError::invalid_operation(format!(
                "{} not found in {}-qubit simulation context",
                qubit, self.num_qubits
            )));
        }
        Ok(())
    }

    /// Applies `matrix` to qubit `target` on every basis pair whose control bits
    /// (`control_mask`) are all set. An empty mask is an ordinary single-qubit gate.
    fn apply_controlled_gate(&mut self, control_mask: usize, target: usize, matrix: &GateMatrix) {
        let t_mask = 1usize << target;
        let dim = self.state.dim();
        let amplitudes = self.state.vector_mut();

        // Visit each pair (|..0..>, |..1..>) once via the index with the target bit clear
        for i0 in (0..dim).filter(|i| i & t_mask == 0) {
            if i0 & control_mask != control_mask {
                continue;
            }
            let i1 = i0 | t_mask;
            let psi_0: Complex<f64> = amplitudes[i0];
            let psi_1: Complex<f64> = amplitudes[i1];
            amplitudes[i0] = matrix[0][0] * psi_0 + matrix[0][1] * psi_1;
            amplitudes[i1] = matrix[1][0] * psi_0 + matrix[1][1] * psi_1;
        }
    }

    /// Probability distribution over the classical register.
    ///
    /// `measurements[j] = (qubit, clbit)` routes the value of `qubit` into bit
    /// `clbit` of the outcome index; classical bits never written stay 0.
    pub(crate) fn outcome_distribution(&self, measurements: &[(QubitId, usize)], num_clbits: usize) -> Vec<f64> {
        let mut distribution = vec![0.0; 1usize << num_clbits];
        for (basis, amplitude) in self.state.vector().iter().enumerate() {
            let p = amplitude.norm_sqr();
            if p < 1e-15 {
                continue;
            }
            let mut outcome = 0usize;
            for (qubit, clbit) in measurements {
                if basis & qubit.mask() != 0 {
                    outcome |= 1 << *clbit;
                }
            }
            distribution[outcome] += p;
        }
        distribution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::Gate;
    use num_traits::Zero;
    use std::f64::consts::FRAC_1_SQRT_2;

    const TEST_TOLERANCE: f64 = 1e-9;

    fn assert_complex_vec_approx_equal(actual: &[Complex<f64>], expected: &[Complex<f64>], context: &str) {
        assert_eq!(actual.len(), expected.len(), "Vector length mismatch - {}", context);
        for i in 0..actual.len() {
            let dist_sq = (actual[i] - expected[i]).norm_sqr();
            assert!(
                dist_sq < TEST_TOLERANCE * TEST_TOLERANCE,
                "Vector mismatch at index {} - Actual: {}, Expected: {}, Context: {}",
                i, actual[i], expected[i], context
            );
        }
    }

    fn basis(dim: usize, index: usize) -> Vec<Complex<f64>> {
        let mut v = vec![Complex::zero(); dim];
        v[index] = Complex::new(1.0, 0.0);
        v
    }

    #[test]
    fn test_init_rejects_zero_and_oversized_registers() {
        assert!(matches!(StateVectorEngine::init(0), Err(FsmError::InvalidOperation { .. })));
        assert!(matches!(StateVectorEngine::init(MAX_QUBITS + 1), Err(FsmError::SimulationError { .. })));
    }

    #[test]
    fn test_x_flips_little_endian_bit() -> FsmResult<()> {
        let mut engine = StateVectorEngine::init(3)?;
        engine.apply_operation(&Operation::x(QubitId(1)))?;
        assert_complex_vec_approx_equal(engine.state().vector(), &basis(8, 0b010), "X on q1");
        Ok(())
    }

    #[test]
    fn test_mcx_requires_all_controls() -> FsmResult<()> {
        let mut engine = StateVectorEngine::init(3)?;
        engine.apply_operation(&Operation::x(QubitId(0)))?;
        engine.apply_operation(&Operation::mcx(vec![QubitId(0), QubitId(1)], QubitId(2)))?;
        assert_complex_vec_approx_equal(engine.state().vector(), &basis(8, 0b001), "one control set");

        engine.apply_operation(&Operation::x(QubitId(1)))?;
        engine.apply_operation(&Operation::mcx(vec![QubitId(0), QubitId(1)], QubitId(2)))?;
        assert_complex_vec_approx_equal(engine.state().vector(), &basis(8, 0b111), "both controls set");
        Ok(())
    }

    #[test]
    fn test_hadamard_then_cnot_gives_bell_pair() -> FsmResult<()> {
        let mut engine = StateVectorEngine::init(2)?;
        engine.apply_operation(&Operation::Apply { gate: Gate::H, target: QubitId(0) })?;
        engine.apply_operation(&Operation::mcx(vec![QubitId(0)], QubitId(1)))?;
        let h = Complex::new(FRAC_1_SQRT_2, 0.0);
        let expected = vec![h, Complex::zero(), Complex::zero(), h];
        assert_complex_vec_approx_equal(engine.state().vector(), &expected, "Bell pair");
        Ok(())
    }

    #[test]
    fn test_controlled_phase_only_touches_controlled_subspace() -> FsmResult<()> {
        let mut engine = StateVectorEngine::init(2)?;
        let h = Complex::new(0.5, 0.0);
        engine.set_state(StateVector::new(vec![h, h, h, h]))?;
        engine.apply_operation(&Operation::Controlled { gate: Gate::Z, controls: vec![QubitId(0)], target: QubitId(1) })?;
        assert_complex_vec_approx_equal(engine.state().vector(), &[h, h, h, -h], "CZ");
        Ok(())
    }

    #[test]
    fn test_apply_rejects_measure_and_repeated_controls() -> FsmResult<()> {
        let mut engine = StateVectorEngine::init(2)?;
        let measure = Operation::measure(QubitId(0), crate::core::ClbitId(0));
        assert!(matches!(engine.apply_operation(&measure), Err(FsmError::InvalidOperation { .. })));
        let repeated = Operation::mcx(vec![QubitId(0), QubitId(0)], QubitId(1));
        assert!(matches!(engine.apply_operation(&repeated), Err(FsmError::InvalidOperation { .. })));
        Ok(())
    }

    #[test]
    fn test_outcome_distribution_routes_qubits_to_clbits() -> FsmResult<()> {
        let mut engine = StateVectorEngine::init(3)?;
        engine.apply_operation(&Operation::x(QubitId(0)))?;
        // q0 -> c2, q1 -> c1, q2 -> c0: |001> reads as outcome 0b100
        let dist = engine.outcome_distribution(&[(QubitId(0), 2), (QubitId(1), 1), (QubitId(2), 0)], 3);
        assert_eq!(dist.len(), 8);
        assert!((dist[0b100] - 1.0).abs() < TEST_TOLERANCE);
        Ok(())
    }
}
