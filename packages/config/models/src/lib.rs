#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! City configuration types.
//!
//! A [`CityConfig`] describes everything deployment-specific about a city:
//! map settings, the land-use category taxonomy, seasonal color palettes,
//! the mapping from raw land-use keys in the vector tiles to categories,
//! and the analysis area modes (circle plus administrative polygon sets).
//! Configurations are deserialized from TOML.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Identifier of the always-present circle analysis mode.
pub const CIRCLE_MODE_ID: &str = "circle";

/// A complete city configuration, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityConfig {
    /// Unique city identifier (e.g., `"basel"`).
    pub id: String,
    /// Human-readable project title.
    pub name: String,
    /// Map and analysis settings.
    pub settings: Settings,
    /// Category definitions in display order.
    pub categories: Vec<CategoryDefinition>,
    /// Season name -> category id -> CSS color.
    pub palettes: BTreeMap<String, BTreeMap<String, String>>,
    /// Raw land-use key (as found in the tiles) -> category id.
    pub landuse_mapping: BTreeMap<String, String>,
    /// Analysis area modes. Exactly one must be the circle mode.
    #[serde(default)]
    pub area_modes: Vec<AreaMode>,
    /// Polygon mode used to name the location of the view center while in
    /// circle mode (e.g. the neighbourhood the circle sits in).
    pub location_label_mode: Option<String>,
}

impl CityConfig {
    /// Returns the category id a raw land-use key maps to.
    #[must_use]
    pub fn category_of(&self, raw: &str) -> Option<&str> {
        self.landuse_mapping.get(raw).map(String::as_str)
    }

    /// Looks up an area mode by id.
    #[must_use]
    pub fn area_mode(&self, id: &str) -> Option<&AreaMode> {
        self.area_modes.iter().find(|m| m.id() == id)
    }

    /// Polygon modes only (excludes circle).
    pub fn polygon_area_modes(&self) -> impl Iterator<Item = &AreaMode> {
        self.area_modes.iter().filter(|m| m.is_polygon())
    }

    /// The mode flagged as default, falling back to the first configured
    /// mode.
    #[must_use]
    pub fn default_mode(&self) -> Option<&AreaMode> {
        self.area_modes
            .iter()
            .find(|m| m.is_default())
            .or_else(|| self.area_modes.first())
    }

    /// Category definition by id.
    #[must_use]
    pub fn category(&self, id: &str) -> Option<&CategoryDefinition> {
        self.categories.iter().find(|c| c.id == id)
    }
}

/// Map and analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Radius of the circle analysis region in meters.
    pub analysis_radius_m: f64,
    /// Number of vertices used to approximate the circle.
    #[serde(default = "default_circle_steps")]
    pub circle_steps: usize,
    /// Initial map center as `[lon, lat]`.
    pub initial_map_center: [f64; 2],
    /// Map bounds as `[[west, south], [east, north]]`.
    pub map_bounds: [[f64; 2]; 2],
    /// Minimum map zoom.
    pub min_zoom: f64,
    /// Maximum map zoom.
    pub max_zoom: f64,
    /// Vector tile property holding the raw land-use key.
    pub landuse_fieldname: String,
    /// Name of the rendered land-use layer.
    #[serde(default = "default_landuse_layer")]
    pub landuse_layer: String,
    /// Name of the rendered tile grid layer.
    #[serde(default = "default_grid_layer")]
    pub grid_layer: String,
    /// Default UI language.
    #[serde(default = "default_language")]
    pub default_language: String,
}

const fn default_circle_steps() -> usize {
    128
}

fn default_landuse_layer() -> String {
    "landuse".to_string()
}

fn default_grid_layer() -> String {
    "gridLayer".to_string()
}

fn default_language() -> String {
    "de".to_string()
}

/// A land-use category as defined in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDefinition {
    /// Category identifier (e.g., `"water"`).
    pub id: String,
    /// Localized name in the default language.
    pub name: String,
    /// English name.
    pub name_en: String,
}

/// A category with its color resolved for a season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Category identifier.
    pub id: String,
    /// CSS color (e.g., `"#4a90c2"`).
    pub color: String,
    /// Localized name in the default language.
    pub name: String,
    /// English name.
    pub name_en: String,
}

/// How the analysis region is chosen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AreaMode {
    /// A circle of the configured radius around the map center.
    Circle {
        /// Mode identifier (always [`CIRCLE_MODE_ID`]).
        id: String,
        /// Translation key for the mode label.
        label_key: String,
        /// Whether this is the initial mode.
        #[serde(default)]
        default: bool,
    },
    /// A polygon picked from an administrative dataset.
    Polygon {
        /// Mode identifier (e.g., `"wohnviertel"`).
        id: String,
        /// Translation key for the mode label.
        label_key: String,
        /// Translation key for the selection prompt.
        select_label_key: String,
        /// `GeoJSON` file with the polygons, relative to the data directory.
        dataset: String,
        /// Feature property holding the polygon id.
        id_property: String,
        /// Feature property holding the display name.
        name_property: String,
        /// Whether this is the initial mode.
        #[serde(default)]
        default: bool,
    },
}

impl AreaMode {
    /// Returns the mode identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Circle { id, .. } | Self::Polygon { id, .. } => id,
        }
    }

    /// Returns the label translation key.
    #[must_use]
    pub fn label_key(&self) -> &str {
        match self {
            Self::Circle { label_key, .. } | Self::Polygon { label_key, .. } => label_key,
        }
    }

    /// Whether this mode is flagged as default.
    #[must_use]
    pub const fn is_default(&self) -> bool {
        match self {
            Self::Circle { default, .. } | Self::Polygon { default, .. } => *default,
        }
    }

    /// Whether this is a polygon mode.
    #[must_use]
    pub const fn is_polygon(&self) -> bool {
        matches!(self, Self::Polygon { .. })
    }
}

/// Palette season.
///
/// `Always` is the season-independent palette; the others follow the
/// meteorological seasons of the northern hemisphere.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Season {
    /// Season-independent palette.
    Always,
    /// March through May.
    Spring,
    /// June through August.
    Summer,
    /// September through November.
    Autumn,
    /// December through February.
    Winter,
}

impl Season {
    /// All seasons, `Always` first.
    pub const ALL: &[Self] = &[
        Self::Always,
        Self::Spring,
        Self::Summer,
        Self::Autumn,
        Self::Winter,
    ];

    /// Meteorological season of a date.
    #[must_use]
    pub fn for_date(date: &impl Datelike) -> Self {
        match date.month() {
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            9..=11 => Self::Autumn,
            _ => Self::Winter,
        }
    }
}
