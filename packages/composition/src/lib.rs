#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Region composition analysis.
//!
//! Resolves the analysis region (a circle around the view center or an
//! administrative polygon), intersects it with the land-use features the
//! map currently renders, and sums the intersected area per land-use
//! category. Also checks whether the region boundary crosses a rendered
//! tile seam, where data beyond the viewport may be missing.
//!
//! The analysis functions are pure: they take the region, a snapshot of
//! rendered features and the city configuration, and return fresh values.
//! [`session::AnalysisSession`] is the thin stateful layer that feeds them
//! on each map or mode change.

pub mod aggregate;
pub mod coverage;
pub mod dataset;
pub mod features;
pub mod region;
pub mod session;

pub use aggregate::{CategoryResolver, Categorized, LanduseCategories, compute_composition};
pub use coverage::is_fully_covered;
pub use dataset::{AdminArea, AdminDataset};
pub use features::StaticMapSnapshot;
pub use region::{circle_region, polygon_region, resolve_region};
pub use session::AnalysisSession;

use thiserror::Error;

/// Errors that can occur while loading administrative datasets or
/// rendered feature snapshots.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The `GeoJSON` could not be parsed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The document is valid `GeoJSON` but not a `FeatureCollection`.
    #[error("Expected a GeoJSON FeatureCollection")]
    NotFeatureCollection,

    /// A dataset was requested for a mode that is not a polygon mode.
    #[error("Area mode '{mode_id}' has no polygon dataset")]
    NotPolygonMode {
        /// The offending mode id.
        mode_id: String,
    },
}

/// Errors returned when changing analysis session inputs.
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    /// The mode id is not configured for this city.
    #[error("Unknown area mode: {0}")]
    UnknownMode(String),

    /// The radius is zero, negative or not a number.
    #[error("Invalid radius: {0}")]
    InvalidRadius(f64),

    /// An area was selected while in circle mode.
    #[error("Cannot select an area in circle mode")]
    NotPolygonMode,
}
