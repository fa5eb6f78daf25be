// src/pipeline.rs

//! The end-to-end scenario run: validate, encode, simulate, export.
//!
//! Each step either succeeds or aborts the whole run with its error; nothing
//! is retried and no partial result is returned.

use crate::core::{FsmResult, OutputState};
use crate::encoder::{EncodingRule, SensorStateEncoder, SensorVector};
use crate::export::{ResultExporter, text_histogram};
use crate::config::RunConfig;
use crate::simulation::{Simulator, StateResult};
use std::path::PathBuf;
use tracing::{info, warn};

/// Everything one scenario run produced.
#[derive(Debug, Clone)]
pub struct ScenarioOutput {
    /// The sensor vector that was encoded.
    pub sensors: SensorVector,
    /// What [`EncodingRule`] predicts for `sensors`.
    pub expected: OutputState,
    /// Sampled measurement counts.
    pub counts: StateResult,
    /// `circuit_<tag>.png`
    pub circuit_path: PathBuf,
    /// `circuit_<tag>.svg`, same drawing with text labels kept as text.
    pub circuit_svg_path: PathBuf,
    /// `hist_<tag>.png`
    pub histogram_path: PathBuf,
    /// `hist_<tag>.svg`
    pub histogram_svg_path: PathBuf,
    /// `counts_<tag>.json`
    pub counts_path: PathBuf,
}

impl ScenarioOutput {
    /// Whether the most frequent measured state is the predicted one.
    pub fn matches_rule(&self) -> bool {
        self.counts.dominant_state() == Some(self.expected)
    }

    /// Files written by the run.
    pub fn written_files(&self) -> [&PathBuf; 5] {
        [
            &self.circuit_path,
            &self.circuit_svg_path,
            &self.histogram_path,
            &self.histogram_svg_path,
            &self.counts_path,
        ]
    }
}

/// Runs one sensor vector through the encoder and simulator, writing
/// `circuit_<tag>.png`, `hist_<tag>.png` and `counts_<tag>.json` into
/// `config.outdir`. Each figure also gets an `.svg` twin.
///
/// # Errors
/// * `FsmError::Config` if `config` fails validation.
/// * `FsmError::Io` if the output directory or a file cannot be written.
/// * Any error raised while building or simulating the circuit.
pub fn simulate_scenario(sensors: &SensorVector, config: &RunConfig) -> FsmResult<ScenarioOutput> {
    config.validate()?;
    let exporter = ResultExporter::new(config.outdir.as_path())?;

    let expected = EncodingRule.evaluate(sensors);
    info!(tag = %config.tag, %sensors, expected = %expected, shots = config.shots, "running scenario");

    let circuit = SensorStateEncoder::new().encode(sensors)?;
    let circuit_path = exporter.circuit_path(&config.tag);
    let circuit_svg_path = circuit_path.with_extension("svg");
    exporter.export_circuit_diagram(&circuit, &circuit_path)?;
    exporter.export_circuit_diagram(&circuit, &circuit_svg_path)?;

    let counts = Simulator::with_config(config.simulator_config()).run(&circuit, config.shots)?;
    let histogram_path = exporter.histogram_path(&config.tag);
    let histogram_svg_path = histogram_path.with_extension("svg");
    exporter.export_histogram(&counts, &histogram_path)?;
    exporter.export_histogram(&counts, &histogram_svg_path)?;
    let counts_path = exporter.counts_path(&config.tag);
    exporter.export_counts(&counts, &counts_path)?;

    info!(tag = %config.tag, counts = %counts, "scenario finished");
    match counts.dominant_state() {
        Some(dominant) if dominant == expected => {}
        dominant => warn!(
            tag = %config.tag,
            expected = %expected,
            dominant = ?dominant.map(|s| s.bitstring()),
            "dominant state disagrees with the encoding rule"
        ),
    }

    if config.show {
        println!("{} {}", config.tag, sensors);
        println!("{}", circuit);
        print!("{}", text_histogram(&counts));
    }

    Ok(ScenarioOutput {
        sensors: *sensors,
        expected,
        counts,
        circuit_path,
        circuit_svg_path,
        histogram_path,
        histogram_svg_path,
        counts_path,
    })
}

/// Writes the grouped comparison histogram (`summary_hist.png`, plus
/// `summary_hist.svg`) for several labeled results and returns the PNG path.
///
/// # Errors
/// `FsmError::InvalidInput` if `results` is empty.
pub fn save_summary(results: &[(&str, &StateResult)], config: &RunConfig) -> FsmResult<PathBuf> {
    let exporter = ResultExporter::new(config.outdir.as_path())?;
    let path = exporter.summary_path();
    exporter.export_summary_histogram(results, &path)?;
    exporter.export_summary_histogram(results, &path.with_extension("svg"))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FsmError;

    fn config_in(dir: &std::path::Path, tag: &str) -> RunConfig {
        RunConfig { outdir: dir.join("out"), seed: Some(11), ..RunConfig::default() }.with_tag(tag)
    }

    #[test]
    fn test_scenario_writes_all_files() -> FsmResult<()> {
        let dir = tempfile::tempdir().map_err(|e| FsmError::io("tempdir", e))?;
        let output = simulate_scenario(&SensorVector::all_abnormal(), &config_in(dir.path(), "emergency"))?;
        assert!(output.matches_rule());
        assert_eq!(output.counts.total(), 1024);
        for path in output.written_files() {
            let len = std::fs::metadata(path).map_err(|e| FsmError::io(path, e))?.len();
            assert!(len > 0, "{} is empty", path.display());
        }
        assert!(output.circuit_path.ends_with("circuit_emergency.png"));
        assert!(output.histogram_path.ends_with("hist_emergency.png"));
        assert!(output.circuit_svg_path.ends_with("circuit_emergency.svg"));
        let png = std::fs::read(&output.histogram_path).map_err(|e| FsmError::io(&output.histogram_path, e))?;
        assert!(png.starts_with(b"\x89PNG"));
        Ok(())
    }

    #[test]
    fn test_invalid_config_aborts_before_writing() -> FsmResult<()> {
        let dir = tempfile::tempdir().map_err(|e| FsmError::io("tempdir", e))?;
        let config = RunConfig { shots: 0, ..config_in(dir.path(), "zero") };
        let err = simulate_scenario(&SensorVector::all_normal(), &config);
        assert!(matches!(err, Err(FsmError::Config { .. })));
        assert!(!dir.path().join("out").exists());
        Ok(())
    }

    #[test]
    fn test_empty_summary_rejected() -> FsmResult<()> {
        let dir = tempfile::tempdir().map_err(|e| FsmError::io("tempdir", e))?;
        let err = save_summary(&[], &config_in(dir.path(), "summary"));
        assert!(matches!(err, Err(FsmError::InvalidInput { .. })));
        Ok(())
    }
}
