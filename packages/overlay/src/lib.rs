#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Draws the analysis region on top of the map.
//!
//! The region's exterior rings are projected into container pixels through
//! a [`MapView`] and painted onto a [`DrawingSurface`]: a translucent fill,
//! a solid outline and a two-disc marker at the view center.

pub mod color;
pub mod surface;
pub mod svg;
pub mod view;

pub use color::Rgba;
pub use surface::{DrawCommand, DrawingSurface, RecordingSurface};
pub use svg::SvgSurface;
pub use view::WebMercatorView;

use quartier_composition_models::{MapView, Region, ScreenPoint};
use thiserror::Error;

/// Errors that can occur while writing overlay output.
#[derive(Debug, Error)]
pub enum OverlayError {
    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A filled disc of the center marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disc {
    /// Radius in pixels.
    pub radius: f64,
    /// Fill color.
    pub color: Rgba,
}

/// Colors and sizes of the overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    /// Fill of the region interior.
    pub fill: Rgba,
    /// Color of the region outline.
    pub outline: Rgba,
    /// Outline width in pixels.
    pub outline_width: f64,
    /// Discs drawn at the view center, in order.
    pub center_marker: Vec<Disc>,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            fill: Rgba::white(0.4),
            outline: Rgba::white(1.0),
            outline_width: 2.0,
            center_marker: vec![
                Disc {
                    radius: 4.0,
                    color: Rgba::white(0.8),
                },
                Disc {
                    radius: 2.0,
                    color: Rgba::black(0.8),
                },
            ],
        }
    }
}

/// Redraws the overlay for `region`.
///
/// The surface is always resized to the container and cleared first. With
/// an empty container, no region, or a region without vertices nothing else
/// is drawn.
pub fn render_overlay(
    region: Option<&Region>,
    view: &impl MapView,
    surface: &mut impl DrawingSurface,
    style: &OverlayStyle,
) {
    let size = view.container_bounds();
    surface.resize(size);
    surface.clear();

    if size.is_empty() {
        log::trace!("Container has no area, skipping overlay");
        return;
    }
    let Some(region) = region else {
        return;
    };

    let path: Vec<Vec<ScreenPoint>> = region
        .geometry()
        .iter()
        .map(|polygon| {
            polygon
                .exterior()
                .coords()
                .map(|c| view.project((*c).into()))
                .collect::<Vec<_>>()
        })
        .filter(|ring| !ring.is_empty())
        .collect();
    if path.is_empty() {
        return;
    }

    surface.fill_path(&path, style.fill);
    surface.stroke_path(&path, style.outline, style.outline_width);

    let center = view.project(view.view_center());
    for disc in &style.center_marker {
        surface.fill_disc(center, disc.radius, disc.color);
    }
}
