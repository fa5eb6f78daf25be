// src/config.rs

//! Per-invocation run configuration.

use crate::core::{FsmError, FsmResult};
use crate::simulation::SimulatorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default output directory.
pub const DEFAULT_OUTDIR: &str = "outputs";
/// Default number of shots per simulation.
pub const DEFAULT_SHOTS: u64 = 1024;

/// Settings for one scenario run.
///
/// Every field has a default, so a TOML file only needs the keys it overrides:
///
/// ```toml
/// outdir = "reports"
/// shots = 4096
/// seed = 7
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Directory receiving all output files. Created if absent.
    pub outdir: PathBuf,
    /// Number of measurement shots. Must be positive.
    pub shots: u64,
    /// Identifier embedded in file names (`circuit_<tag>.svg`, ...).
    pub tag: String,
    /// Also print the text diagram and histogram to stdout.
    pub show: bool,
    /// Seed for reproducible sampling.
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            outdir: PathBuf::from(DEFAULT_OUTDIR),
            shots: DEFAULT_SHOTS,
            tag: "case".to_string(),
            show: false,
            seed: None,
        }
    }
}

impl RunConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(content: &str) -> FsmResult<Self> {
        toml::from_str(content).map_err(|e| FsmError::Config {
            message: format!("Failed to parse run configuration: {}", e),
        })
    }

    /// Reads and parses a TOML file.
    pub fn load(path: &Path) -> FsmResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| FsmError::io(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Returns a copy with a different tag.
    pub fn with_tag(&self, tag: impl Into<String>) -> Self {
        Self { tag: tag.into(), ..self.clone() }
    }

    /// Checks that the configuration can drive a run.
    ///
    /// # Errors
    /// `FsmError::Config` if `shots` is zero or `tag` is empty or contains a
    /// path separator.
    pub fn validate(&self) -> FsmResult<()> {
        if self.shots == 0 {
            return Err(FsmError::Config { message: "shots must be a positive integer".to_string() });
        }
        if self.tag.trim().is_empty() {
            return Err(FsmError::Config { message: "tag must not be empty".to_string() });
        }
        if self.tag.contains(['/', '\\']) || self.tag == "." || self.tag == ".." {
            return Err(FsmError::Config {
                message: format!("tag '{}' must be a plain file-name fragment", self.tag),
            });
        }
        Ok(())
    }

    /// Simulator settings derived from this configuration.
    pub fn simulator_config(&self) -> SimulatorConfig {
        SimulatorConfig { seed: self.seed }
    }
}
