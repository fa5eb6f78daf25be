// src/core/state.rs

use num_complex::Complex;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Amplitude vector of an `n`-qubit register before measurement.
///
/// The vector has `2^n` entries; entry `k` is the amplitude of the basis state
/// whose bit `i` is the value of qubit `i`.
#[derive(Debug, Clone, PartialEq)] // Avoid Eq for floating-point complex numbers
pub struct StateVector {
    amplitudes: Vec<Complex<f64>>,
}

impl StateVector {
    /// Creates a state from a raw amplitude vector.
    /// The caller is responsible for the length being a power of two.
    #[cfg(test)]
    pub(crate) fn new(amplitudes: Vec<Complex<f64>>) -> Self {
        Self { amplitudes }
    }

    /// The all-zero basis state |0...0> over `dim` amplitudes.
    pub(crate) fn ground(dim: usize) -> Self {
        let mut amplitudes = vec![Complex::zero(); dim];
        if let Some(first) = amplitudes.first_mut() {
            *first = Complex::new(1.0, 0.0);
        }
        Self { amplitudes }
    }

    /// Provides read-only access to the amplitudes.
    pub fn vector(&self) -> &[Complex<f64>] {
        &self.amplitudes
    }

    pub(crate) fn vector_mut(&mut self) -> &mut [Complex<f64>] {
        &mut self.amplitudes
    }

    /// Number of basis states represented.
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    /// Born-rule probability of each basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|c| c.norm_sqr()).collect()
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateVector[")?;
        for (i, c) in self.amplitudes.iter().enumerate() {
            write!(f, "{}{:.4}", if i > 0 { ", " } else { "" }, c)?;
        }
        write!(f, "]")
    }
}

/// A 3-bit output state of the sensor state machine, rendered high-to-low as
/// `c2c1c0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct OutputState(u8);

impl OutputState {
    /// Width of the state register in bits.
    pub const WIDTH: usize = 3;
    /// Default state: no rule fired.
    pub const NORMAL: OutputState = OutputState(0b000);
    /// All sensors abnormal: output bit 2 forced high.
    pub const EMERGENCY: OutputState = OutputState(0b100);

    /// Builds a state from its numeric value. Returns `None` above `0b111`.
    pub fn from_bits(bits: u8) -> Option<Self> {
        (usize::from(bits) < (1 << Self::WIDTH)).then_some(OutputState(bits))
    }

    /// Parses a bitstring such as `"100"`.
    pub fn from_bitstring(bitstring: &str) -> Option<Self> {
        if bitstring.len() != Self::WIDTH {
            return None;
        }
        u8::from_str_radix(bitstring, 2).ok().and_then(Self::from_bits)
    }

    /// Numeric value of the state.
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Value of output bit `index` (0 is the rightmost character).
    pub fn bit(&self, index: usize) -> bool {
        index < Self::WIDTH && (self.0 >> index) & 1 == 1
    }

    /// The `c2c1c0` bitstring.
    pub fn bitstring(&self) -> String {
        format!("{:0width$b}", self.0, width = Self::WIDTH)
    }

    /// Human-readable name of the state machine state.
    pub fn name(&self) -> &'static str {
        match *self {
            Self::NORMAL => "NORMAL",
            Self::EMERGENCY => "EMERGENCY",
            _ => "UNDEFINED",
        }
    }
}

impl fmt::Display for OutputState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bitstring())
    }
}

impl From<OutputState> for String {
    fn from(state: OutputState) -> Self {
        state.bitstring()
    }
}

impl TryFrom<String> for OutputState {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        OutputState::from_bitstring(&value).ok_or_else(|| format!("'{}' is not a 3-bit state", value))
    }
}
