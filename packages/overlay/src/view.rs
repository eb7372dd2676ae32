//! Web-Mercator map view.
//!
//! Reproduces the projection of slippy maps with 512 px tiles: at zoom `z`
//! the world is `512 * 2^z` pixels wide, and the view center sits in the
//! middle of the container.

use std::f64::consts::PI;

use quartier_composition_models::{GeoPoint, MapView, ScreenPoint, ScreenSize};

/// Tile size in pixels.
pub const TILE_SIZE: f64 = 512.0;

/// Latitude limit of the square Web-Mercator world.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// A static map view: center, zoom and container size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WebMercatorView {
    center: GeoPoint,
    zoom: f64,
    size: ScreenSize,
}

impl WebMercatorView {
    /// Creates a view of `size` pixels centered on `center` at `zoom`.
    #[must_use]
    pub const fn new(center: GeoPoint, zoom: f64, size: ScreenSize) -> Self {
        Self { center, zoom, size }
    }

    /// Clamps the zoom into `[min_zoom, max_zoom]`.
    ///
    /// The zoom is left unchanged when the range is not finite or not
    /// ordered.
    #[must_use]
    pub fn clamp_zoom(mut self, min_zoom: f64, max_zoom: f64) -> Self {
        if !(min_zoom.is_finite() && max_zoom.is_finite() && min_zoom <= max_zoom) {
            log::warn!("Ignoring invalid zoom range {min_zoom}..{max_zoom}");
            return self;
        }
        let clamped = self.zoom.clamp(min_zoom, max_zoom);
        if (clamped - self.zoom).abs() > f64::EPSILON {
            log::debug!("Clamping zoom {} to {clamped}", self.zoom);
        }
        self.zoom = clamped;
        self
    }

    /// Current zoom level.
    #[must_use]
    pub const fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Position of `point` in world pixels at the current zoom.
    fn world_pixels(&self, point: GeoPoint) -> (f64, f64) {
        let world = TILE_SIZE * self.zoom.exp2();
        let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();

        let x = (point.lon + 180.0) / 360.0 * world;
        let y = (1.0 - lat.tan().asinh() / PI) / 2.0 * world;
        (x, y)
    }
}

impl MapView for WebMercatorView {
    fn project(&self, point: GeoPoint) -> ScreenPoint {
        let (x, y) = self.world_pixels(point);
        let (cx, cy) = self.world_pixels(self.center);

        ScreenPoint {
            x: x - cx + self.size.width / 2.0,
            y: y - cy + self.size.height / 2.0,
        }
    }

    fn view_center(&self) -> GeoPoint {
        self.center
    }

    fn container_bounds(&self) -> ScreenSize {
        self.size
    }
}
