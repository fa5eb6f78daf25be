// src/export/render.rs

//! Backend-independent figure rendering.
//!
//! A [`Figure`] draws itself onto any plotters drawing area; [`render`] picks
//! the backend for the requested [`ImageFormat`], draws into memory and
//! returns the encoded document. The drawing area never outlives `render`.

use crate::core::{FsmError, FsmResult};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::{FontStyle, register_font};
use std::io::Cursor;
use std::path::Path;
use std::sync::OnceLock;

/// Font used for every label, registered under the `sans-serif` family.
static SANS_SERIF: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// Encoded output format of a figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    /// Format implied by a file extension (`png` or `svg`, any case).
    ///
    /// # Errors
    /// `FsmError::InvalidInput` for any other extension.
    pub fn from_path(path: &Path) -> FsmResult<Self> {
        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("png") => Ok(ImageFormat::Png),
            Some("svg") => Ok(ImageFormat::Svg),
            _ => Err(FsmError::invalid_input(format!(
                "cannot infer an image format from '{}' (expected .png or .svg)",
                path.display()
            ))),
        }
    }

    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

/// Something that can be drawn onto a plotters canvas of a fixed size.
pub(crate) trait Figure {
    /// Canvas size in pixels.
    fn size(&self) -> (u32, u32);

    /// Draws the figure. `root` is already cleared to white.
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>>;
}

/// Renders `figure` into an encoded document.
pub(crate) fn render<F: Figure>(figure: &F, format: ImageFormat) -> FsmResult<Vec<u8>> {
    register_fonts()?;
    match format {
        ImageFormat::Svg => render_svg(figure).map(String::into_bytes),
        ImageFormat::Png => render_png(figure),
    }
}

pub(crate) fn render_svg<F: Figure>(figure: &F) -> FsmResult<String> {
    register_fonts()?;
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, figure.size()).into_drawing_area();
        paint(figure, &root).map_err(render_error)?;
    }
    Ok(svg)
}

fn render_png<F: Figure>(figure: &F) -> FsmResult<Vec<u8>> {
    let (width, height) = figure.size();
    let mut pixels = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
        paint(figure, &root).map_err(render_error)?;
    }
    let bitmap = image::RgbImage::from_raw(width, height, pixels).ok_or_else(|| FsmError::Render {
        message: format!("pixel buffer does not match a {}x{} image", width, height),
    })?;
    let mut encoded = Cursor::new(Vec::new());
    bitmap
        .write_to(&mut encoded, image::ImageFormat::Png)
        .map_err(|e| FsmError::Render { message: format!("PNG encoding failed: {}", e) })?;
    Ok(encoded.into_inner())
}

fn paint<F: Figure, DB: DrawingBackend>(
    figure: &F,
    root: &DrawingArea<DB, Shift>,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;
    figure.draw(root)?;
    root.present()
}

/// Makes the bundled font available to plotters. Runs once per process.
fn register_fonts() -> FsmResult<()> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    let ok = *REGISTERED.get_or_init(|| register_font("sans-serif", FontStyle::Normal, SANS_SERIF).is_ok());
    if ok {
        Ok(())
    } else {
        Err(FsmError::Render { message: "bundled sans-serif font could not be loaded".to_string() })
    }
}

/// Converts a plotters drawing failure into the crate error.
fn render_error<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> FsmError {
    FsmError::Render { message: e.to_string() }
}

/// Contents of every `<text>` element of an SVG document, trimmed.
#[cfg(test)]
pub(crate) fn svg_text_nodes(svg: &str) -> Vec<String> {
    svg.split("<text")
        .skip(1)
        .filter_map(|chunk| {
            let body = &chunk[chunk.find('>')? + 1..];
            Some(body[..body.find("</text>")?].trim().to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Label;

    impl Figure for Label {
        fn size(&self) -> (u32, u32) {
            (120, 40)
        }

        fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
            root.draw(&Text::new("hello", (10, 10), ("sans-serif", 14).into_font()))
        }
    }

    #[test]
    fn test_format_from_extension() -> FsmResult<()> {
        assert_eq!(ImageFormat::from_path(Path::new("a/circuit_x.png"))?, ImageFormat::Png);
        assert_eq!(ImageFormat::from_path(Path::new("hist.SVG"))?, ImageFormat::Svg);
        assert!(matches!(ImageFormat::from_path(Path::new("hist.jpg")), Err(FsmError::InvalidInput { .. })));
        assert!(ImageFormat::from_path(Path::new("noext")).is_err());
        Ok(())
    }

    #[test]
    fn test_png_has_signature() -> FsmResult<()> {
        let png = render(&Label, ImageFormat::Png)?;
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n']));
        Ok(())
    }

    #[test]
    fn test_svg_text_nodes_are_extracted() -> FsmResult<()> {
        let svg = render_svg(&Label)?;
        assert_eq!(svg_text_nodes(&svg), vec!["hello".to_string()]);
        Ok(())
    }
}
