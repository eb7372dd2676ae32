//! Rendered feature snapshots loaded from `GeoJSON`.
//!
//! In the browser the rendered features come straight from the map
//! engine. Outside of it, a [`StaticMapSnapshot`] stands in: each named
//! layer is a `GeoJSON` `FeatureCollection` captured from the map (or
//! exported from the tile source).

use std::collections::BTreeMap;
use std::path::Path;

use geojson::GeoJson;
use quartier_composition_models::{RenderedFeature, RenderedFeatureSource};

use crate::DatasetError;

/// Parses a `GeoJSON` `FeatureCollection` into rendered features.
///
/// Features without geometry, or whose geometry cannot be converted, are
/// skipped with a warning.
///
/// # Errors
///
/// Returns an error if the string is not valid `GeoJSON` or not a
/// `FeatureCollection`.
pub fn features_from_geojson(geojson_str: &str) -> Result<Vec<RenderedFeature>, DatasetError> {
    let GeoJson::FeatureCollection(collection) = geojson_str.parse::<GeoJson>()? else {
        return Err(DatasetError::NotFeatureCollection);
    };

    let mut features = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.into_iter().enumerate() {
        let Some(geometry) = feature.geometry else {
            log::warn!("Skipping feature {index} without geometry");
            continue;
        };
        let geometry: geo::Geometry<f64> = match geometry.try_into() {
            Ok(g) => g,
            Err(e) => {
                log::warn!("Skipping feature {index} with unsupported geometry: {e}");
                continue;
            }
        };

        features.push(RenderedFeature {
            geometry,
            properties: feature.properties.unwrap_or_default(),
        });
    }

    Ok(features)
}

/// An in-memory stand-in for the map's rendered feature query.
#[derive(Debug, Clone, Default)]
pub struct StaticMapSnapshot {
    layers: BTreeMap<String, Vec<RenderedFeature>>,
}

impl StaticMapSnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the features of a layer.
    pub fn set_layer(&mut self, layer: &str, features: Vec<RenderedFeature>) {
        self.layers.insert(layer.to_string(), features);
    }

    /// Adds a layer, builder style.
    #[must_use]
    pub fn with_layer(mut self, layer: &str, features: Vec<RenderedFeature>) -> Self {
        self.set_layer(layer, features);
        self
    }

    /// Loads a layer from a `GeoJSON` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_layer(&mut self, layer: &str, path: &Path) -> Result<(), DatasetError> {
        let contents = std::fs::read_to_string(path)?;
        let features = features_from_geojson(&contents)?;
        log::info!(
            "Loaded {} features into layer '{layer}' from {}",
            features.len(),
            path.display()
        );
        self.set_layer(layer, features);
        Ok(())
    }
}

impl RenderedFeatureSource for StaticMapSnapshot {
    fn query_rendered_features(&self, layer: &str) -> Vec<RenderedFeature> {
        self.layers.get(layer).cloned().unwrap_or_default()
    }
}
