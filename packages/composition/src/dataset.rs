//! Administrative polygon datasets for the polygon analysis modes.
//!
//! Each polygon mode (e.g. electoral districts, neighbourhoods) comes with
//! a `GeoJSON` `FeatureCollection` whose features carry an id property and
//! a name property. The dataset resolves selected ids to geometries and,
//! through an R-tree over the area bounding boxes, answers which area
//! contains a given point.

use std::path::Path;

use geo::{BoundingRect, Contains, MultiPolygon};
use quartier_composition_models::GeoPoint;
use quartier_config_models::AreaMode;
use quartier_geometry::polygonal;
use rstar::{AABB, RTree, RTreeObject};

use crate::DatasetError;
use crate::features::features_from_geojson;

/// One selectable administrative area.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminArea {
    /// Value of the id property, as a string.
    pub id: String,
    /// Value of the name property.
    pub name: String,
    /// Area geometry.
    pub geometry: MultiPolygon<f64>,
}

/// Bounding box of an area, stored in the R-tree.
struct AreaEnvelope {
    index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for AreaEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// The polygons of one polygon area mode.
pub struct AdminDataset {
    mode_id: String,
    areas: Vec<AdminArea>,
    index: RTree<AreaEnvelope>,
}

impl std::fmt::Debug for AdminDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminDataset")
            .field("mode_id", &self.mode_id)
            .field("areas", &self.areas.len())
            .finish_non_exhaustive()
    }
}

impl AdminDataset {
    /// Builds a dataset from already parsed areas.
    #[must_use]
    pub fn from_areas(mode_id: &str, areas: Vec<AdminArea>) -> Self {
        let envelopes = areas
            .iter()
            .enumerate()
            .filter_map(|(index, area)| {
                compute_envelope(&area.geometry).map(|envelope| AreaEnvelope { index, envelope })
            })
            .collect();

        Self {
            mode_id: mode_id.to_string(),
            areas,
            index: RTree::bulk_load(envelopes),
        }
    }

    /// Parses a dataset from a `GeoJSON` `FeatureCollection`.
    ///
    /// Ids may be strings or numbers and are stored in their string form.
    /// Features without the id property or without polygonal geometry are
    /// skipped with a warning; a missing name falls back to the id.
    ///
    /// # Errors
    ///
    /// Returns an error if the `GeoJSON` is invalid or not a
    /// `FeatureCollection`.
    pub fn from_geojson(
        mode_id: &str,
        geojson_str: &str,
        id_property: &str,
        name_property: &str,
    ) -> Result<Self, DatasetError> {
        let mut areas = Vec::new();

        for feature in features_from_geojson(geojson_str)? {
            let Some(id) = feature.property_str(id_property) else {
                log::warn!("Skipping {mode_id} feature without '{id_property}'");
                continue;
            };
            let Some(geometry) = polygonal(&feature.geometry) else {
                log::warn!("Skipping {mode_id} feature {id}: geometry is not polygonal");
                continue;
            };
            let name = feature.property_str(name_property).unwrap_or_else(|| {
                log::warn!("{mode_id} feature {id} has no '{name_property}', using its id");
                id.clone()
            });

            areas.push(AdminArea { id, name, geometry });
        }

        log::debug!("Loaded {} {mode_id} areas", areas.len());
        Ok(Self::from_areas(mode_id, areas))
    }

    /// Loads the dataset of a polygon area mode from `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if `mode` is the circle mode or the file cannot be
    /// read or parsed.
    pub fn load(mode: &AreaMode, data_dir: &Path) -> Result<Self, DatasetError> {
        let AreaMode::Polygon {
            id,
            dataset,
            id_property,
            name_property,
            ..
        } = mode
        else {
            return Err(DatasetError::NotPolygonMode {
                mode_id: mode.id().to_string(),
            });
        };

        let path = data_dir.join(dataset);
        log::info!("Loading {id} areas from {}", path.display());
        let contents = std::fs::read_to_string(&path)?;
        Self::from_geojson(id, &contents, id_property, name_property)
    }

    /// Area mode this dataset belongs to.
    #[must_use]
    pub fn mode_id(&self) -> &str {
        &self.mode_id
    }

    /// Number of areas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    /// Whether the dataset has no areas.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// `(id, name)` pairs sorted by name, for selection lists.
    #[must_use]
    pub fn areas(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .areas
            .iter()
            .map(|a| (a.id.as_str(), a.name.as_str()))
            .collect();
        entries.sort_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// Looks up an area by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&AdminArea> {
        self.areas.iter().find(|a| a.id == id)
    }

    /// The area containing `point`.
    ///
    /// Areas should not overlap; if they do, the one listed first in the
    /// dataset wins.
    #[must_use]
    pub fn locate(&self, point: GeoPoint) -> Option<&AdminArea> {
        let query = AABB::from_point([point.lon, point.lat]);
        let point: geo::Point<f64> = point.into();

        self.index
            .locate_in_envelope_intersecting(&query)
            .map(|entry| entry.index)
            .filter(|&index| self.areas[index].geometry.contains(&point))
            .min()
            .map(|index| &self.areas[index])
    }
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> Option<AABB<[f64; 2]>> {
    mp.bounding_rect()
        .map(|rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]))
}
