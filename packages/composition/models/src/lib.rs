#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for land-use composition analysis.
//!
//! Defines the analysis region, the rendered land-use features handed over
//! by the map, the composition result produced for the diagram, and the two
//! capabilities the analysis consumes from the map engine:
//! [`RenderedFeatureSource`] and [`MapView`].

use std::collections::BTreeMap;

use geo::{Coord, Geometry, MultiPolygon, Point};
use serde::{Deserialize, Serialize};

/// A geographic position in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

impl GeoPoint {
    /// Creates a point from longitude and latitude.
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(p: GeoPoint) -> Self {
        Self::new(p.lon, p.lat)
    }
}

impl From<Point<f64>> for GeoPoint {
    fn from(p: Point<f64>) -> Self {
        Self::new(p.x(), p.y())
    }
}

impl From<Coord<f64>> for GeoPoint {
    fn from(c: Coord<f64>) -> Self {
        Self::new(c.x, c.y)
    }
}

/// A position on the drawing surface, in pixels from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    /// Horizontal offset.
    pub x: f64,
    /// Vertical offset (down is positive).
    pub y: f64,
}

/// Pixel dimensions of the map container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenSize {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl ScreenSize {
    /// Whether either dimension is zero (or not a positive number).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// A feature as currently rendered by the map, with its raw properties.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFeature {
    /// Feature geometry in longitude/latitude degrees.
    pub geometry: Geometry<f64>,
    /// Raw vector tile properties.
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl RenderedFeature {
    /// Creates a feature without properties.
    #[must_use]
    pub fn new(geometry: impl Into<Geometry<f64>>) -> Self {
        Self {
            geometry: geometry.into(),
            properties: serde_json::Map::new(),
        }
    }

    /// Adds a property, builder style.
    #[must_use]
    pub fn with_property(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    /// Returns a property as a string. Numbers and booleans are converted
    /// to their JSON text; null, arrays and objects yield `None`.
    #[must_use]
    pub fn property_str(&self, key: &str) -> Option<String> {
        match self.properties.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            serde_json::Value::Null
            | serde_json::Value::Array(_)
            | serde_json::Value::Object(_) => None,
        }
    }
}

/// Access to the features the map currently has rendered.
///
/// The snapshot may be incomplete near tile edges and has no guaranteed
/// order.
pub trait RenderedFeatureSource {
    /// Returns the rendered features of a named layer. Unknown layers yield
    /// an empty list.
    fn query_rendered_features(&self, layer: &str) -> Vec<RenderedFeature>;
}

/// The current view of the map.
pub trait MapView {
    /// Projects a geographic position to container pixels.
    fn project(&self, point: GeoPoint) -> ScreenPoint;

    /// Geographic center of the current view.
    fn view_center(&self) -> GeoPoint;

    /// Current pixel size of the map container.
    fn container_bounds(&self) -> ScreenSize;
}

/// How the analysis region is chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "modeId", rename_all = "camelCase")]
pub enum AnalysisMode {
    /// Circle around the view center.
    #[default]
    Circle,
    /// Administrative polygon of the given mode id.
    Polygon(String),
}

impl AnalysisMode {
    /// Mode identifier as used in the city configuration.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Circle => "circle",
            Self::Polygon(id) => id,
        }
    }
}

/// The geometry being analyzed.
#[derive(Debug, Clone, PartialEq)]
pub enum Region {
    /// A circle approximated by a polygon.
    Circle {
        /// Circle center.
        center: GeoPoint,
        /// Radius in meters.
        radius_m: f64,
        /// Polygon approximation.
        geometry: MultiPolygon<f64>,
    },
    /// An administrative polygon, used verbatim.
    Polygon {
        /// Area mode the polygon was taken from.
        mode_id: String,
        /// Value of the dataset's id property.
        feature_id: String,
        /// Value of the dataset's name property.
        name: String,
        /// Polygon geometry.
        geometry: MultiPolygon<f64>,
    },
}

impl Region {
    /// Region geometry.
    #[must_use]
    pub const fn geometry(&self) -> &MultiPolygon<f64> {
        match self {
            Self::Circle { geometry, .. } | Self::Polygon { geometry, .. } => geometry,
        }
    }

    /// Display name for polygon regions.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Circle { .. } => None,
            Self::Polygon { name, .. } => Some(name),
        }
    }
}

/// Area accumulated for one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySize {
    /// Intersected area in square meters.
    pub area_sqm: f64,
    /// Share of the total intersected area, 0-100.
    pub percent: f64,
}

/// How a region's area decomposes into land-use categories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionResult {
    /// Category id -> accumulated area and percentage.
    pub sizes: BTreeMap<String, CategorySize>,
    /// Sum of all category areas in square meters.
    pub total_area_sqm: f64,
    /// Raw land-use key -> intersected area that was left out of `sizes`
    /// and the total because the key has no category mapping.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub unmapped: BTreeMap<String, f64>,
}

impl CompositionResult {
    /// The result for a region that intersects nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether no category received any area.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Category sizes in the given display order, skipping categories that
    /// received no area.
    pub fn ordered<'a>(
        &'a self,
        category_ids: impl IntoIterator<Item = &'a str>,
    ) -> impl Iterator<Item = (&'a str, CategorySize)> {
        category_ids
            .into_iter()
            .filter_map(|id| self.sizes.get(id).map(|size| (id, *size)))
    }
}

/// Output of one analysis recomputation.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Mode the region was resolved in.
    pub mode: AnalysisMode,
    /// The region, or `None` when nothing is selected.
    pub region: Option<Region>,
    /// Land-use composition of the region.
    pub composition: CompositionResult,
    /// `true` when no rendered tile seam crosses the region boundary.
    pub fully_covered: bool,
    /// Name of the administrative area containing the view center, when a
    /// label mode is configured and the analysis runs in circle mode.
    pub location_label: Option<String>,
}
