// src/encoder/mod.rs

//! Sensor readings, the emergency decision rule, and its circuit encoding.
//!
//! The decision itself is plain boolean logic ([`EncodingRule`]): the output
//! state is `100` (emergency) exactly when all six sensors read abnormal, and
//! `000` otherwise. [`SensorStateEncoder`] realizes the same rule as a
//! 9-qubit circuit:
//!
//! * qubits 0..5 carry the sensors; each abnormal reading is inverted with X so
//!   that "abnormal" becomes the active control value,
//! * one 6-control X targets qubit 6 (output bit 2),
//! * qubits 6, 7, 8 are measured into classical bits 2, 1, 0.
//!
//! Partially abnormal inputs never satisfy all six controls and therefore
//! stay in `000`.

use crate::circuits::{Circuit, CircuitBuilder};
use crate::core::{ClbitId, FsmError, FsmResult, OutputState, QubitId};
use crate::operations::Operation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of sensor inputs.
pub const SENSOR_COUNT: usize = 6;

/// Total qubits in an encoded circuit: one per sensor plus the output register.
pub const ENCODED_QUBITS: usize = SENSOR_COUNT + OutputState::WIDTH;

/// A single binary sensor signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorReading {
    /// Reading `0`.
    Abnormal,
    /// Reading `1`.
    Normal,
}

impl SensorReading {
    /// The reading's wire value (0 abnormal, 1 normal).
    pub fn value(&self) -> u8 {
        match self {
            SensorReading::Abnormal => 0,
            SensorReading::Normal => 1,
        }
    }
}

impl TryFrom<u8> for SensorReading {
    type Error = FsmError;

    fn try_from(value: u8) -> FsmResult<Self> {
        match value {
            0 => Ok(SensorReading::Abnormal),
            1 => Ok(SensorReading::Normal),
            other => Err(FsmError::invalid_input(format!(
                "sensor values must be 0 (abnormal) or 1 (normal), got {}",
                other
            ))),
        }
    }
}

/// Exactly six validated sensor readings, in sensor order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct SensorVector([SensorReading; SENSOR_COUNT]);

impl SensorVector {
    /// Validates and wraps raw sensor values.
    ///
    /// # Errors
    /// Returns `FsmError::InvalidInput` if `values` does not hold exactly six
    /// elements or contains anything other than 0 and 1.
    pub fn new(values: &[u8]) -> FsmResult<Self> {
        if values.len() != SENSOR_COUNT {
            return Err(FsmError::invalid_input(format!(
                "expected {} sensor values, got {}",
                SENSOR_COUNT,
                values.len()
            )));
        }
        let mut readings = [SensorReading::Normal; SENSOR_COUNT];
        for (slot, value) in readings.iter_mut().zip(values) {
            *slot = SensorReading::try_from(*value)?;
        }
        Ok(SensorVector(readings))
    }

    /// Every sensor reading abnormal.
    pub fn all_abnormal() -> Self {
        SensorVector([SensorReading::Abnormal; SENSOR_COUNT])
    }

    /// Every sensor reading normal.
    pub fn all_normal() -> Self {
        SensorVector([SensorReading::Normal; SENSOR_COUNT])
    }

    /// Builds a vector from the low six bits of `bits`; bit `i` is sensor `i`.
    pub fn from_bits(bits: u8) -> Self {
        let mut readings = [SensorReading::Abnormal; SENSOR_COUNT];
        for (i, slot) in readings.iter_mut().enumerate() {
            if (bits >> i) & 1 == 1 {
                *slot = SensorReading::Normal;
            }
        }
        SensorVector(readings)
    }

    /// The readings in sensor order.
    pub fn readings(&self) -> &[SensorReading; SENSOR_COUNT] {
        &self.0
    }

    /// The readings as 0/1 values.
    pub fn values(&self) -> [u8; SENSOR_COUNT] {
        self.0.map(|r| r.value())
    }

    /// Number of sensors reading abnormal.
    pub fn abnormal_count(&self) -> usize {
        self.0.iter().filter(|r| **r == SensorReading::Abnormal).count()
    }
}

impl TryFrom<&[u8]> for SensorVector {
    type Error = FsmError;

    fn try_from(values: &[u8]) -> FsmResult<Self> {
        SensorVector::new(values)
    }
}

impl TryFrom<Vec<u8>> for SensorVector {
    type Error = FsmError;

    fn try_from(values: Vec<u8>) -> FsmResult<Self> {
        SensorVector::new(&values)
    }
}

impl From<SensorVector> for Vec<u8> {
    fn from(sensors: SensorVector) -> Self {
        sensors.values().to_vec()
    }
}

impl FromStr for SensorVector {
    type Err = FsmError;

    /// Accepts `"000000"` as well as separated forms like `"0,0,0,0,0,0"` or
    /// `"[1, 1, 1, 1, 1, 1]"`.
    fn from_str(s: &str) -> FsmResult<Self> {
        let mut values = Vec::with_capacity(SENSOR_COUNT);
        for ch in s.chars() {
            match ch {
                '0' => values.push(0),
                '1' => values.push(1),
                ',' | '[' | ']' | ' ' | '_' => {}
                other => {
                    return Err(FsmError::invalid_input(format!(
                        "unexpected character '{}' in sensor list '{}'",
                        other, s
                    )));
                }
            }
        }
        SensorVector::new(&values)
    }
}

impl fmt::Display for SensorVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.values().iter().enumerate() {
            write!(f, "{}{}", if i > 0 { ", " } else { "" }, value)?;
        }
        write!(f, "]")
    }
}

/// The classical decision rule: AND over "sensor is abnormal" feeding output
/// bit 2.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodingRule;

impl EncodingRule {
    /// Expected dominant output state for a sensor vector.
    pub fn evaluate(&self, sensors: &SensorVector) -> OutputState {
        if sensors.abnormal_count() == SENSOR_COUNT {
            OutputState::EMERGENCY
        } else {
            OutputState::NORMAL
        }
    }
}

/// Builds the circuit realizing [`EncodingRule`] for a given sensor vector.
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorStateEncoder;

impl SensorStateEncoder {
    /// Creates an encoder.
    pub fn new() -> Self {
        SensorStateEncoder
    }

    /// Qubit carrying sensor `index`.
    pub fn sensor_qubit(index: usize) -> QubitId {
        QubitId(index)
    }

    /// Qubit carrying output bit `bit` (bit 2 is the emergency flag).
    ///
    /// Output bit 2 sits right after the sensors, so `Q2, Q1, Q0` map to
    /// qubits 6, 7, 8.
    pub fn output_qubit(bit: usize) -> QubitId {
        QubitId(SENSOR_COUNT + (OutputState::WIDTH - 1 - bit))
    }

    /// Validates raw values, then encodes them.
    ///
    /// # Errors
    /// Returns `FsmError::InvalidInput` before any circuit is built if the values
    /// are not six binary readings.
    pub fn encode_values(&self, values: &[u8]) -> FsmResult<Circuit> {
        let sensors = SensorVector::new(values)?;
        self.encode(&sensors)
    }

    /// Builds the 9-qubit, 3-bit circuit for `sensors`.
    pub fn encode(&self, sensors: &SensorVector) -> FsmResult<Circuit> {
        let mut builder = CircuitBuilder::new(ENCODED_QUBITS, OutputState::WIDTH);
        for i in 0..SENSOR_COUNT {
            builder = builder.label(Self::sensor_qubit(i), format!("s{}", i));
        }
        for bit in 0..OutputState::WIDTH {
            builder = builder.label(Self::output_qubit(bit), format!("Q{}", bit));
        }

        // Abnormal (0) readings become active controls
        for (i, reading) in sensors.readings().iter().enumerate() {
            if *reading == SensorReading::Abnormal {
                builder = builder.add_op(Operation::x(Self::sensor_qubit(i)));
            }
        }

        let controls: Vec<QubitId> = (0..SENSOR_COUNT).map(Self::sensor_qubit).collect();
        builder = builder.add_op(Operation::mcx(controls, Self::output_qubit(2)));

        for bit in (0..OutputState::WIDTH).rev() {
            builder = builder.add_op(Operation::measure(Self::output_qubit(bit), ClbitId(bit)));
        }
        builder.build()
    }
}
