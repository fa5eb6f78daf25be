// src/operations/mod.rs

//! Gates and operations that make up a circuit.
//!
//! An [`Operation`] either applies a single-qubit [`Gate`] (optionally
//! conditioned on a set of control qubits) or records a measurement into a
//! classical bit. Measurements are terminal: the simulator rejects a gate on a
//! qubit that has already been measured.

use crate::core::{ClbitId, QubitId};
use num_complex::Complex;
use num_traits::Zero;
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_4};
use std::fmt;

/// 2x2 unitary acting on a single qubit, row-major in the {|0>, |1>} basis.
pub type GateMatrix = [[Complex<f64>; 2]; 2];

/// Single-qubit gates supported by the simulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    /// Bit flip (NOT).
    X,
    /// Combined flip and phase.
    Y,
    /// Phase flip.
    Z,
    /// Hadamard: equal superposition of |0> and |1>.
    H,
    /// Quarter-turn phase, `diag(1, i)`.
    S,
    /// Eighth-turn phase, `diag(1, e^(iπ/4))`.
    T,
    /// Arbitrary phase `diag(1, e^(iθ))`, angle in radians.
    Phase(f64),
}

impl Gate {
    /// The gate's 2x2 matrix.
    pub fn matrix(&self) -> GateMatrix {
        let one = Complex::new(1.0, 0.0);
        let zero = Complex::zero();
        let i = Complex::i();
        match self {
            Gate::X => [[zero, one], [one, zero]],
            Gate::Y => [[zero, -i], [i, zero]],
            Gate::Z => [[one, zero], [zero, -one]],
            Gate::H => {
                let h = Complex::new(FRAC_1_SQRT_2, 0.0);
                [[h, h], [h, -h]]
            }
            Gate::S => [[one, zero], [zero, i]],
            Gate::T => [[one, zero], [zero, Complex::from_polar(1.0, FRAC_PI_4)]],
            Gate::Phase(theta) => [[one, zero], [zero, Complex::from_polar(1.0, *theta)]],
        }
    }

    /// Short label used by the text and SVG circuit diagrams.
    pub fn symbol(&self) -> &'static str {
        match self {
            Gate::X => "X",
            Gate::Y => "Y",
            Gate::Z => "Z",
            Gate::H => "H",
            Gate::S => "S",
            Gate::T => "T",
            Gate::Phase(_) => "P",
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Phase(theta) => write!(f, "P({:.4})", theta),
            other => write!(f, "{}", other.symbol()),
        }
    }
}

/// A single step of a circuit.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Apply `gate` to `target` unconditionally.
    Apply {
        /// Gate to apply.
        gate: Gate,
        /// Qubit the gate acts on.
        target: QubitId,
    },

    /// Apply `gate` to `target` on every basis state where all `controls` are |1>.
    ///
    /// With `Gate::X` and six controls this is the multi-controlled NOT used to
    /// realize a 6-input AND.
    Controlled {
        /// Gate applied to the target.
        gate: Gate,
        /// Qubits that must all be |1> for the gate to act.
        controls: Vec<QubitId>,
        /// Qubit the gate acts on.
        target: QubitId,
    },

    /// Measure `qubit` in the computational basis into `clbit`.
    Measure {
        /// Qubit being observed.
        qubit: QubitId,
        /// Classical bit receiving the outcome.
        clbit: ClbitId,
    },
}

impl Operation {
    /// Shorthand for `Apply { gate: Gate::X, target }`.
    pub fn x(target: QubitId) -> Self {
        Operation::Apply { gate: Gate::X, target }
    }

    /// Shorthand for `Apply { gate: Gate::H, target }`.
    pub fn h(target: QubitId) -> Self {
        Operation::Apply { gate: Gate::H, target }
    }

    /// Multi-controlled X.
    pub fn mcx(controls: Vec<QubitId>, target: QubitId) -> Self {
        Operation::Controlled { gate: Gate::X, controls, target }
    }

    /// Shorthand for `Measure { qubit, clbit }`.
    pub fn measure(qubit: QubitId, clbit: ClbitId) -> Self {
        Operation::Measure { qubit, clbit }
    }

    /// Returns every qubit referenced by the operation, controls first.
    pub fn involved_qubits(&self) -> Vec<QubitId> {
        match self {
            Operation::Apply { target, .. } => vec![*target],
            Operation::Controlled { controls, target, .. } => {
                let mut qubits = controls.clone();
                qubits.push(*target);
                qubits
            }
            Operation::Measure { qubit, .. } => vec![*qubit],
        }
    }

    /// The classical bit written by the operation, if any.
    pub fn written_clbit(&self) -> Option<ClbitId> {
        match self {
            Operation::Measure { clbit, .. } => Some(*clbit),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Apply { gate, target } => write!(f, "{} {}", gate, target),
            Operation::Controlled { gate, controls, target } => {
                write!(f, "{}C{} [", "C".repeat(controls.len().saturating_sub(1)), gate)?;
                for (i, c) in controls.iter().enumerate() {
                    write!(f, "{}{}", if i > 0 { ", " } else { "" }, c)?;
                }
                write!(f, "] -> {}", target)
            }
            Operation::Measure { qubit, clbit } => write!(f, "measure {} -> {}", qubit, clbit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_unitary(m: &GateMatrix) -> bool {
        // M * M^dagger == I
        for r in 0..2 {
            for c in 0..2 {
                let mut acc: Complex<f64> = Complex::zero();
                for k in 0..2 {
                    acc += m[r][k] * m[c][k].conj();
                }
                let expected = if r == c { 1.0 } else { 0.0 };
                if (acc - Complex::new(expected, 0.0)).norm() > 1e-12 {
                    return false;
                }
            }
        }
        true
    }

    #[test]
    fn test_all_gates_unitary() {
        for gate in [Gate::X, Gate::Y, Gate::Z, Gate::H, Gate::S, Gate::T, Gate::Phase(0.3)] {
            assert!(is_unitary(&gate.matrix()), "{} is not unitary", gate);
        }
    }

    #[test]
    fn test_involved_qubits_for_mcx() {
        let op = Operation::mcx(vec![QubitId(0), QubitId(1)], QubitId(6));
        assert_eq!(op.involved_qubits(), vec![QubitId(0), QubitId(1), QubitId(6)]);
        assert_eq!(op.written_clbit(), None);
        assert_eq!(op.to_string(), "CCX [q[0], q[1]] -> q[6]");
    }
}
