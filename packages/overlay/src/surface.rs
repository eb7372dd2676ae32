//! Drawing surfaces the overlay renders onto.
//!
//! A path is a list of closed subpaths in container pixels. Surfaces fill
//! paths with the even-odd rule so overlapping subpaths cut holes the same
//! way on every backend.

use quartier_composition_models::{ScreenPoint, ScreenSize};

use crate::color::Rgba;

/// A 2D canvas-like target.
pub trait DrawingSurface {
    /// Sets the surface size in pixels.
    fn resize(&mut self, size: ScreenSize);

    /// Removes everything drawn so far.
    fn clear(&mut self);

    /// Fills a path of closed subpaths.
    fn fill_path(&mut self, path: &[Vec<ScreenPoint>], color: Rgba);

    /// Strokes the outline of a path of closed subpaths.
    fn stroke_path(&mut self, path: &[Vec<ScreenPoint>], color: Rgba, width: f64);

    /// Fills a disc.
    fn fill_disc(&mut self, center: ScreenPoint, radius: f64, color: Rgba);
}

/// One drawing instruction received by a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// The surface was resized.
    Resize(ScreenSize),
    /// The surface was cleared.
    Clear,
    /// A path was filled.
    FillPath {
        /// Closed subpaths in pixels.
        path: Vec<Vec<ScreenPoint>>,
        /// Fill color.
        color: Rgba,
    },
    /// A path outline was stroked.
    StrokePath {
        /// Closed subpaths in pixels.
        path: Vec<Vec<ScreenPoint>>,
        /// Stroke color.
        color: Rgba,
        /// Stroke width in pixels.
        width: f64,
    },
    /// A disc was filled.
    FillDisc {
        /// Disc center in pixels.
        center: ScreenPoint,
        /// Radius in pixels.
        radius: f64,
        /// Fill color.
        color: Rgba,
    },
}

/// Records drawing instructions instead of rasterizing them.
///
/// `clear` is recorded but does not discard earlier commands, so the full
/// sequence of a render can be inspected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    /// Creates a surface with no recorded commands.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All commands in the order they were issued.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Commands issued after the last `clear`, i.e. what is visible.
    #[must_use]
    pub fn visible(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| *c == DrawCommand::Clear)
            .map_or(0, |i| i + 1);
        &self.commands[start..]
    }
}

impl DrawingSurface for RecordingSurface {
    fn resize(&mut self, size: ScreenSize) {
        self.commands.push(DrawCommand::Resize(size));
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_path(&mut self, path: &[Vec<ScreenPoint>], color: Rgba) {
        self.commands.push(DrawCommand::FillPath {
            path: path.to_vec(),
            color,
        });
    }

    fn stroke_path(&mut self, path: &[Vec<ScreenPoint>], color: Rgba, width: f64) {
        self.commands.push(DrawCommand::StrokePath {
            path: path.to_vec(),
            color,
            width,
        });
    }

    fn fill_disc(&mut self, center: ScreenPoint, radius: f64, color: Rgba) {
        self.commands.push(DrawCommand::FillDisc {
            center,
            radius,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_starts_after_last_clear() {
        let mut surface = RecordingSurface::new();
        let origin = ScreenPoint { x: 0.0, y: 0.0 };
        surface.fill_disc(origin, 1.0, Rgba::black(1.0));
        surface.clear();
        surface.fill_disc(origin, 2.0, Rgba::white(1.0));

        assert_eq!(surface.commands().len(), 3);
        assert_eq!(
            surface.visible(),
            [DrawCommand::FillDisc {
                center: origin,
                radius: 2.0,
                color: Rgba::white(1.0),
            }]
        );
    }
}
