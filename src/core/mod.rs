// src/core/mod.rs

//! Core data structures and types

// Declare modules within core
pub mod error;
pub mod qubit;
pub mod state;

// Re-export public types for convenient access via `qfsm::core::TypeName`
pub use error::{FsmError, FsmResult};
pub use qubit::{ClbitId, QubitId};
pub use state::{OutputState, StateVector};
