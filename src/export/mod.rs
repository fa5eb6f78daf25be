// src/export/mod.rs

//! Writes circuit diagrams, count histograms, and raw counts to disk.
//!
//! Figures are rendered with `plotters` into an in-memory PNG or SVG
//! document, chosen by the target file's extension. The drawing area lives
//! only inside the render call, so it is released on every exit path before
//! any file is touched; the finished document is then written in one call.

mod diagram;
mod histogram;
mod render;

use crate::circuits::Circuit;
use crate::core::{FsmError, FsmResult};
use crate::simulation::StateResult;
use std::path::{Path, PathBuf};
use tracing::info;

pub use histogram::text_histogram;
pub use render::ImageFormat;

/// File name of the combined histogram.
pub const SUMMARY_FILE_NAME: &str = "summary_hist.png";

/// Creates `outdir` (and parents) if needed. Safe to call repeatedly.
pub fn ensure_outdir(outdir: &Path) -> FsmResult<PathBuf> {
    std::fs::create_dir_all(outdir).map_err(|e| FsmError::io(outdir, e))?;
    Ok(outdir.to_path_buf())
}

/// Persists figures and counts under one output directory.
#[derive(Debug, Clone)]
pub struct ResultExporter {
    outdir: PathBuf,
}

impl ResultExporter {
    /// Creates an exporter rooted at `outdir`, creating the directory.
    ///
    /// # Errors
    /// `FsmError::Io` if the directory cannot be created.
    pub fn new(outdir: impl Into<PathBuf>) -> FsmResult<Self> {
        let outdir = ensure_outdir(&outdir.into())?;
        Ok(Self { outdir })
    }

    /// The output directory.
    pub fn outdir(&self) -> &Path {
        &self.outdir
    }

    /// `<outdir>/circuit_<tag>.png`
    pub fn circuit_path(&self, tag: &str) -> PathBuf {
        self.outdir.join(format!("circuit_{}.png", tag))
    }

    /// `<outdir>/hist_<tag>.png`
    pub fn histogram_path(&self, tag: &str) -> PathBuf {
        self.outdir.join(format!("hist_{}.png", tag))
    }

    /// `<outdir>/counts_<tag>.json`
    pub fn counts_path(&self, tag: &str) -> PathBuf {
        self.outdir.join(format!("counts_{}.json", tag))
    }

    /// `<outdir>/summary_hist.png`
    pub fn summary_path(&self) -> PathBuf {
        self.outdir.join(SUMMARY_FILE_NAME)
    }

    /// Renders a diagram of `circuit` to `path`. The extension of `path`
    /// (`.png` or `.svg`) selects the format for this and the other figure
    /// exports.
    ///
    /// # Errors
    /// `FsmError::InvalidInput` for any other extension, `FsmError::Render`
    /// if drawing fails and `FsmError::Io` if the file cannot be written.
    pub fn export_circuit_diagram(&self, circuit: &Circuit, path: &Path) -> FsmResult<()> {
        let format = ImageFormat::from_path(path)?;
        let bytes = render::render(&diagram::CircuitDiagram::new(circuit), format)?;
        write_file(path, &bytes)?;
        info!(path = %path.display(), "circuit diagram written");
        Ok(())
    }

    /// Renders a bar chart of `result` to `path`.
    pub fn export_histogram(&self, result: &StateResult, path: &Path) -> FsmResult<()> {
        let title = format!("Measurement counts ({} shots)", result.shots());
        let format = ImageFormat::from_path(path)?;
        let series = [("counts", result)];
        let bytes = render::render(&histogram::Histogram::new(&title, &series)?, format)?;
        write_file(path, &bytes)?;
        info!(path = %path.display(), "histogram written");
        Ok(())
    }

    /// Renders one grouped bar chart comparing several labeled results, with a
    /// legend entry per label.
    ///
    /// # Errors
    /// `FsmError::InvalidInput` if `results` is empty or the results disagree on
    /// bitstring width.
    pub fn export_summary_histogram(&self, results: &[(&str, &StateResult)], path: &Path) -> FsmResult<()> {
        let format = ImageFormat::from_path(path)?;
        let bytes = render::render(&histogram::Histogram::new("Measurement counts by scenario", results)?, format)?;
        write_file(path, &bytes)?;
        info!(path = %path.display(), series = results.len(), "summary histogram written");
        Ok(())
    }

    /// Writes `result` as pretty JSON.
    pub fn export_counts(&self, result: &StateResult, path: &Path) -> FsmResult<()> {
        let json = result.to_json()?;
        write_file(path, json.as_bytes())?;
        info!(path = %path.display(), "counts written");
        Ok(())
    }
}

fn write_file(path: &Path, contents: &[u8]) -> FsmResult<()> {
    std::fs::write(path, contents).map_err(|e| FsmError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_follow_tag_naming() -> FsmResult<()> {
        let dir = tempfile::tempdir().map_err(|e| FsmError::io("tempdir", e))?;
        let exporter = ResultExporter::new(dir.path())?;
        assert_eq!(exporter.circuit_path("normal"), dir.path().join("circuit_normal.png"));
        assert_eq!(exporter.histogram_path("normal"), dir.path().join("hist_normal.png"));
        assert_eq!(exporter.counts_path("normal"), dir.path().join("counts_normal.json"));
        assert_eq!(exporter.summary_path(), dir.path().join("summary_hist.png"));
        Ok(())
    }

    #[test]
    fn test_figure_format_follows_extension() -> FsmResult<()> {
        let dir = tempfile::tempdir().map_err(|e| FsmError::io("tempdir", e))?;
        let exporter = ResultExporter::new(dir.path())?;
        let result = StateResult::from_histogram(8, 3, &[2, 0, 0, 0, 6, 0, 0, 0]);

        let png = exporter.histogram_path("x");
        exporter.export_histogram(&result, &png)?;
        let bytes = std::fs::read(&png).map_err(|e| FsmError::io(&png, e))?;
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));

        let svg = png.with_extension("svg");
        exporter.export_histogram(&result, &svg)?;
        let text = std::fs::read_to_string(&svg).map_err(|e| FsmError::io(&svg, e))?;
        assert!(text.contains("<svg"));

        let bmp = png.with_extension("bmp");
        assert!(matches!(exporter.export_histogram(&result, &bmp), Err(FsmError::InvalidInput { .. })));
        assert!(!bmp.exists());
        Ok(())
    }

    #[test]
    fn test_ensure_outdir_is_idempotent() -> FsmResult<()> {
        let dir = tempfile::tempdir().map_err(|e| FsmError::io("tempdir", e))?;
        let nested = dir.path().join("a").join("b");
        ensure_outdir(&nested)?;
        ensure_outdir(&nested)?;
        assert!(nested.is_dir());
        Ok(())
    }

    #[test]
    fn test_ensure_outdir_fails_under_a_file() -> FsmResult<()> {
        let dir = tempfile::tempdir().map_err(|e| FsmError::io("tempdir", e))?;
        let file = dir.path().join("occupied");
        std::fs::write(&file, b"x").map_err(|e| FsmError::io(&file, e))?;
        assert!(matches!(ensure_outdir(&file.join("sub")), Err(FsmError::Io { .. })));
        Ok(())
    }
}
