// src/core/error.rs

//! Error handling logic

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used across the crate.
pub type FsmResult<T> = Result<T, FsmError>;

/// Errors raised while validating inputs, building or simulating circuits,
/// and exporting results.
///
/// Every stage of the pipeline propagates these unchanged; nothing is retried
/// or recovered, so a failure aborts the current invocation.
#[derive(Debug, Error)]
pub enum FsmError {
    /// Caller-supplied data is malformed (sensor vector, shot count, summary input).
    #[error("Invalid Input: {message}")]
    InvalidInput {
        /// InvalidInput failure message
        message: String,
    },

    /// A circuit operation is inconsistent with the circuit's registers or the
    /// simulator's capabilities.
    #[error("Invalid Operation: {message}")]
    InvalidOperation {
        /// InvalidOperation failure message
        message: String,
    },

    /// The state vector lost normalization during evolution.
    #[error("Incoherence Violation: {message}")]
    Incoherence {
        /// Incoherence failure message
        message: String,
    },

    /// General error encountered during the simulation process itself.
    #[error("Simulation Process Error: {message}")]
    SimulationError {
        /// SimulationError failure message
        message: String,
    },

    /// Invalid or unparsable run configuration.
    #[error("Configuration Error: {message}")]
    Config {
        /// Config failure message
        message: String,
    },

    /// The plotting backend failed while drawing a figure.
    #[error("Render Error: {message}")]
    Render {
        /// Render failure message
        message: String,
    },

    /// Counts could not be serialized.
    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Creating the output directory or writing an output file failed.
    #[error("I/O Error at {}: {source}", path.display())]
    Io {
        /// Path that could not be created or written
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },
}

impl FsmError {
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        FsmError::InvalidInput { message: message.into() }
    }

    pub(crate) fn invalid_operation(message: impl Into<String>) -> Self {
        FsmError::InvalidOperation { message: message.into() }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FsmError::Io { path: path.into(), source }
    }
}
