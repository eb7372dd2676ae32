//! SVG drawing surface.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use quartier_composition_models::{ScreenPoint, ScreenSize};

use crate::OverlayError;
use crate::color::Rgba;
use crate::surface::DrawingSurface;

/// Builds a standalone SVG document from drawing calls.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    size: ScreenSize,
    elements: Vec<String>,
}

impl Default for SvgSurface {
    fn default() -> Self {
        Self {
            size: ScreenSize {
                width: 0.0,
                height: 0.0,
            },
            elements: Vec::new(),
        }
    }
}

impl SvgSurface {
    /// Creates an empty zero-size document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of drawn elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether nothing has been drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Renders the complete document.
    #[must_use]
    pub fn to_svg_string(&self) -> String {
        let ScreenSize { width, height } = self.size;
        let mut out = String::new();
        out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#);
        out.push('\n');
        out.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        ));
        out.push('\n');
        for element in &self.elements {
            out.push_str(element);
            out.push('\n');
        }
        out.push_str("</svg>\n");
        out
    }

    /// Writes the document to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn save(&self, path: &Path) -> Result<(), OverlayError> {
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(self.to_svg_string().as_bytes())?;
        writer.flush()?;
        log::info!("Wrote overlay to {}", path.display());
        Ok(())
    }
}

/// Builds an SVG path string: `M x,y L x,y ... Z` per subpath.
fn path_data(path: &[Vec<ScreenPoint>]) -> String {
    let mut out = String::new();
    for ring in path {
        let Some((first, rest)) = ring.split_first() else {
            continue;
        };
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&format!("M{:.3},{:.3}", first.x, first.y));
        for p in rest {
            out.push_str(&format!(" L{:.3},{:.3}", p.x, p.y));
        }
        out.push_str(" Z");
    }
    out
}

impl DrawingSurface for SvgSurface {
    fn resize(&mut self, size: ScreenSize) {
        self.size = size;
    }

    fn clear(&mut self) {
        self.elements.clear();
    }

    fn fill_path(&mut self, path: &[Vec<ScreenPoint>], color: Rgba) {
        self.elements.push(format!(
            r#"<path d="{}" fill="{color}" fill-rule="evenodd" stroke="none"/>"#,
            path_data(path)
        ));
    }

    fn stroke_path(&mut self, path: &[Vec<ScreenPoint>], color: Rgba, width: f64) {
        self.elements.push(format!(
            r#"<path d="{}" fill="none" stroke="{color}" stroke-width="{width}" stroke-linejoin="round"/>"#,
            path_data(path)
        ));
    }

    fn fill_disc(&mut self, center: ScreenPoint, radius: f64, color: Rgba) {
        self.elements.push(format!(
            r#"<circle cx="{:.3}" cy="{:.3}" r="{radius}" fill="{color}"/>"#,
            center.x, center.y
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Vec<Vec<ScreenPoint>> {
        vec![vec![
            ScreenPoint { x: 0.0, y: 0.0 },
            ScreenPoint { x: 10.0, y: 0.0 },
            ScreenPoint { x: 5.0, y: 8.5 },
        ]]
    }

    #[test]
    fn path_data_closes_each_subpath() {
        let mut path = triangle();
        path.push(vec![]);
        path.push(vec![ScreenPoint { x: 1.0, y: 1.0 }, ScreenPoint { x: 2.0, y: 1.0 }]);

        assert_eq!(
            path_data(&path),
            "M0.000,0.000 L10.000,0.000 L5.000,8.500 Z M1.000,1.000 L2.000,1.000 Z"
        );
    }

    #[test]
    fn document_contains_drawn_elements() {
        let mut surface = SvgSurface::new();
        surface.resize(ScreenSize {
            width: 40.0,
            height: 30.0,
        });
        surface.fill_path(&triangle(), Rgba::white(0.4));
        surface.fill_disc(ScreenPoint { x: 20.0, y: 15.0 }, 4.0, Rgba::black(0.8));

        let svg = surface.to_svg_string();
        assert!(svg.contains(r#"width="40" height="30""#));
        assert!(svg.contains(r#"fill="rgba(255,255,255,0.4)""#));
        assert!(svg.contains(r#"<circle cx="20.000" cy="15.000" r="4" fill="rgba(0,0,0,0.8)"/>"#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn clear_removes_elements() {
        let mut surface = SvgSurface::new();
        surface.fill_path(&triangle(), Rgba::white(1.0));
        assert_eq!(surface.len(), 1);

        surface.clear();
        assert!(surface.is_empty());
    }
}
