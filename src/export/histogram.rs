// src/export/histogram.rs

use super::render::Figure;
use crate::core::{FsmError, FsmResult};
use crate::simulation::StateResult;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

const WIDTH: u32 = 960;
const HEIGHT: u32 = 600;
/// Fraction of each bitstring slot covered by its bar group.
const GROUP_WIDTH: f64 = 0.8;

/// A (grouped) bar chart of bitstring -> count.
///
/// Every bitstring of the shared width gets a slot on the x axis, so states
/// with zero counts still appear. Each series is drawn in its own color and
/// named in the legend.
pub(crate) struct Histogram<'a> {
    title: &'a str,
    bitstrings: Vec<String>,
    series: &'a [(&'a str, &'a StateResult)],
    max_count: u64,
}

impl<'a> Histogram<'a> {
    /// Checks that there is at least one series and that all series share a
    /// bitstring width.
    pub(crate) fn new(title: &'a str, series: &'a [(&'a str, &'a StateResult)]) -> FsmResult<Self> {
        let width = match series.first() {
            Some((_, result)) => result.width(),
            None => return Err(FsmError::invalid_input("at least one labeled result is required")),
        };
        if let Some((label, result)) = series.iter().find(|(_, r)| r.width() != width) {
            return Err(FsmError::invalid_input(format!(
                "result '{}' has {}-bit states but '{}' has {}-bit states",
                label,
                result.width(),
                series[0].0,
                width
            )));
        }
        let max_count = series
            .iter()
            .flat_map(|(_, r)| r.counts().values().copied())
            .max()
            .unwrap_or(0);
        Ok(Self { title, bitstrings: series[0].1.all_bitstrings(), series, max_count })
    }
}

impl Figure for Histogram<'_> {
    fn size(&self) -> (u32, u32) {
        (WIDTH, HEIGHT)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        let slots = self.bitstrings.len();
        // Headroom above the tallest bar for its value label
        let y_max = self.max_count + self.max_count / 8 + 1;

        let mut chart = ChartBuilder::on(root)
            .caption(self.title, ("sans-serif", 24).into_font())
            .margin(16)
            .x_label_area_size(56)
            .y_label_area_size(64)
            .build_cartesian_2d(-0.5f64..slots as f64 - 0.5, 0u64..y_max)?;

        // Bitstring labels are placed under each slot below, not at the mesh's key points
        let no_label = |_: &f64| String::new();
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_label_formatter(&no_label)
            .x_desc("State (c2c1c0)")
            .y_desc("Count")
            .axis_desc_style(("sans-serif", 16).into_font())
            .draw()?;

        let slot_style = TextStyle::from(("sans-serif", 15).into_font()).pos(Pos::new(HPos::Center, VPos::Top));
        for (i, bitstring) in self.bitstrings.iter().enumerate() {
            let (x, y) = chart.backend_coord(&(i as f64, 0u64));
            root.draw(&Text::new(bitstring.clone(), (x, y + 6), slot_style.clone()))?;
        }

        let bar_width = GROUP_WIDTH / self.series.len() as f64;
        let value_style = TextStyle::from(("sans-serif", 13).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));

        for (series_idx, (label, result)) in self.series.iter().enumerate() {
            let color = Palette99::pick(series_idx).mix(0.9);
            let offset = -GROUP_WIDTH / 2.0 + series_idx as f64 * bar_width;
            let bars: Vec<(f64, u64)> = self
                .bitstrings
                .iter()
                .enumerate()
                .map(|(i, bitstring)| (i as f64 + offset, result.count(bitstring)))
                .collect();

            chart
                .draw_series(
                    bars.iter()
                        .map(|(x0, count)| Rectangle::new([(*x0, 0u64), (*x0 + bar_width, *count)], color.filled())),
                )?
                .label(*label)
                .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], color.filled()));

            chart.draw_series(
                bars.iter()
                    .filter(|(_, count)| *count > 0)
                    .map(|(x0, count)| Text::new(count.to_string(), (*x0 + bar_width / 2.0, *count), value_style.clone())),
            )?;
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .label_font(("sans-serif", 15).into_font())
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK)
            .draw()?;
        Ok(())
    }
}

/// Plain-text histogram for terminal output, one row per observed bitstring.
pub fn text_histogram(result: &StateResult) -> String {
    const BAR: usize = 40;
    let max = result.counts().values().copied().max().unwrap_or(0).max(1);
    let mut out = String::new();
    for (bitstring, count) in result.counts() {
        let len = (*count as usize * BAR).div_ceil(max as usize);
        out.push_str(&format!(
            "{} | {:<bar$} {} ({:.3})\n",
            bitstring,
            "#".repeat(len),
            count,
            result.probability(bitstring),
            bar = BAR
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::render::{ImageFormat, render, render_svg, svg_text_nodes};
    use crate::simulation::all_bitstrings;

    fn emergency() -> StateResult {
        StateResult::from_histogram(1024, 3, &[0, 0, 0, 0, 1024, 0, 0, 0])
    }

    fn normal() -> StateResult {
        StateResult::from_histogram(1024, 3, &[1024, 0, 0, 0, 0, 0, 0, 0])
    }

    #[test]
    fn test_every_bitstring_is_an_axis_label() -> FsmResult<()> {
        let e = emergency();
        let series = [("counts", &e)];
        let texts = svg_text_nodes(&render_svg(&Histogram::new("t", &series)?)?);
        for bitstring in all_bitstrings(3) {
            assert!(texts.contains(&bitstring), "missing axis label {} in {:?}", bitstring, texts);
        }
        Ok(())
    }

    #[test]
    fn test_summary_names_every_series() -> FsmResult<()> {
        let e = emergency();
        let n = normal();
        let series = [("Emergency", &e), ("Normal", &n)];
        let texts = svg_text_nodes(&render_svg(&Histogram::new("summary", &series)?)?);
        assert!(texts.iter().any(|t| t == "Emergency"));
        assert!(texts.iter().any(|t| t == "Normal"));
        assert!(texts.iter().any(|t| t == "1024"));
        Ok(())
    }

    #[test]
    fn test_png_rendering() -> FsmResult<()> {
        let e = emergency();
        let series = [("counts", &e)];
        let png = render(&Histogram::new("t", &series)?, ImageFormat::Png)?;
        assert!(png.starts_with(b"\x89PNG"));
        Ok(())
    }

    #[test]
    fn test_rejects_empty_and_mixed_widths() {
        assert!(matches!(Histogram::new("t", &[]), Err(FsmError::InvalidInput { .. })));
        let narrow = StateResult::from_histogram(2, 2, &[2, 0, 0, 0]);
        let wide = emergency();
        let series = [("a", &wide), ("b", &narrow)];
        assert!(matches!(Histogram::new("t", &series), Err(FsmError::InvalidInput { .. })));
    }

    #[test]
    fn test_text_histogram_rows() {
        let text = text_histogram(&StateResult::from_histogram(4, 3, &[1, 0, 0, 0, 3, 0, 0, 0]));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("000 | "));
        assert!(lines[1].starts_with("100 | "));
        assert!(lines[1].contains("3 (0.750)"));
    }
}
