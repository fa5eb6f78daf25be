// src/validation/mod.rs

//! Consistency checks on state vectors and measurement results.

use crate::core::{FsmError, FsmResult, StateVector};
use crate::simulation::StateResult;
use crate::simulation::engine::MAX_QUBITS;

// Default tolerance values (can be overridden by caller)
const DEFAULT_NORM_TOLERANCE: f64 = 1e-9;

/// Checks if the state vector is normalized (sum of squared amplitudes ≈ 1.0).
///
/// # Arguments
/// * `state` - The `StateVector` to check.
/// * `tolerance` - Allowed deviation from 1.0. Defaults to `1e-9`.
///
/// # Returns
/// * `Ok(())` if normalized within tolerance.
/// * `Err(FsmError::Incoherence)` if normalization fails.
pub fn check_normalization(state: &StateVector, tolerance: Option<f64>) -> FsmResult<()> {
    let effective_tolerance = tolerance.unwrap_or(DEFAULT_NORM_TOLERANCE);
    let norm_sq: f64 = state.vector().iter().map(|c| c.norm_sqr()).sum();
    if (norm_sq - 1.0).abs() > effective_tolerance {
        Err(FsmError::Incoherence {
            message: format!(
                "State vector normalization failed. Sum(|c_i|^2) = {} (Deviation > {})",
                norm_sq, effective_tolerance
            ),
        })
    } else {
        Ok(())
    }
}

/// Performs the validation run by the simulator before sampling.
/// Currently only checks normalization.
pub fn validate_state(state: &StateVector, norm_tolerance: Option<f64>) -> FsmResult<()> {
    if !state.dim().is_power_of_two() {
        return Err(FsmError::Incoherence {
            message: format!("State vector dimension {} is not a power of two", state.dim()),
        });
    }
    check_normalization(state, norm_tolerance)
}

/// Checks the invariants of a [`StateResult`]: the width is one the simulator
/// can produce, every key is a binary string of that width and the counts sum
/// to the shot count exactly.
///
/// # Errors
/// Returns `FsmError::InvalidInput` describing the first violation.
pub fn check_counts(result: &StateResult) -> FsmResult<()> {
    if result.width() == 0 || result.width() > MAX_QUBITS {
        return Err(FsmError::invalid_input(format!(
            "bitstring width {} is outside 1..={}",
            result.width(),
            MAX_QUBITS
        )));
    }
    for bitstring in result.counts().keys() {
        if bitstring.len() != result.width() || !bitstring.chars().all(|ch| ch == '0' || ch == '1') {
            return Err(FsmError::invalid_input(format!(
                "'{}' is not a {}-bit bitstring",
                bitstring,
                result.width()
            )));
        }
    }
    let total = result.total();
    if total != result.shots() {
        return Err(FsmError::invalid_input(format!(
            "Counts sum to {} but {} shots were taken",
            total,
            result.shots()
        )));
    }
    Ok(())
}
