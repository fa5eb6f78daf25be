// src/lib.rs

//! `qfsm` - an emergency/normal decision over six binary sensors, expressed
//! as a quantum circuit and run on a built-in state-vector simulator.
//!
//! The pure decision rule lives in [`EncodingRule`]; [`SensorStateEncoder`]
//! realizes it as a 9-qubit circuit (inversions on abnormal sensors, one
//! six-control NOT onto output bit 2, three measurements). [`Simulator`]
//! samples that circuit into a [`StateResult`], and [`ResultExporter`]
//! writes diagrams, histograms and counts to disk.

pub mod core;
pub mod operations;
pub mod circuits;
pub mod simulation;
pub mod validation;
pub mod encoder;
pub mod config;
pub mod export;
pub mod pipeline;

// Re-export the most common types for easier top-level use
pub use core::{ClbitId, FsmError, FsmResult, OutputState, QubitId};
pub use operations::{Gate, Operation};
pub use circuits::{Circuit, CircuitBuilder};
pub use simulation::{Simulator, SimulatorConfig, StateResult};
pub use validation::{check_counts, check_normalization, validate_state};
pub use encoder::{EncodingRule, SensorReading, SensorStateEncoder, SensorVector};
pub use config::RunConfig;
pub use export::{ImageFormat, ResultExporter};
pub use pipeline::{ScenarioOutput, save_summary, simulate_scenario};

// Example 1: Encode and simulate the all-abnormal scenario
/// ```
/// use qfsm::{EncodingRule, FsmError, OutputState, SensorStateEncoder, SensorVector, Simulator};
///
/// let sensors: SensorVector = "000000".parse()?;
/// let circuit = SensorStateEncoder::new().encode(&sensors)?;
/// println!("Circuit:\n{}", circuit);
///
/// let result = Simulator::seeded(42).run(&circuit, 1024)?;
/// println!("Result: {}", result);
///
/// assert_eq!(result.total(), 1024);
/// assert_eq!(result.dominant_state(), Some(OutputState::EMERGENCY));
/// assert_eq!(EncodingRule.evaluate(&sensors), OutputState::EMERGENCY);
/// # Ok::<(), FsmError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: A hand-built Bell pair
// Measuring both halves of H + CNOT gives only "00" and "11".
/// ```
/// use qfsm::{CircuitBuilder, ClbitId, FsmError, Operation, QubitId, Simulator};
///
/// let (q0, q1) = (QubitId(0), QubitId(1));
/// let circuit = CircuitBuilder::new(2, 2)
///     .add_op(Operation::h(q0))
///     .add_op(Operation::mcx(vec![q0], q1))
///     .add_op(Operation::measure(q0, ClbitId(0)))
///     .add_op(Operation::measure(q1, ClbitId(1)))
///     .build()?;
///
/// let result = Simulator::seeded(7).run(&circuit, 2000)?;
/// assert_eq!(result.count("01") + result.count("10"), 0);
/// assert!(result.count("00") > 800 && result.count("11") > 800);
/// # Ok::<(), FsmError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item
