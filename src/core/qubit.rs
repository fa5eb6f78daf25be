// src/core/qubit.rs

use std::fmt;

/// Index of a qubit wire within a circuit's quantum register.
///
/// Qubit `i` corresponds to bit `i` of a basis-state index in the simulator,
/// so `QubitId(0)` is the least significant position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QubitId(pub usize);

impl QubitId {
    /// Bit mask selecting this qubit within a basis-state index.
    pub fn mask(&self) -> usize {
        1 << self.0
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q[{}]", self.0)
    }
}

/// Index of a classical bit receiving a measurement outcome.
///
/// Bitstrings are rendered high-to-low, so the classical bit with the
/// largest index is the leftmost character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClbitId(pub usize);

impl fmt::Display for ClbitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c[{}]", self.0)
    }
}
