//! Land-use composition of a region.
//!
//! Every rendered land-use feature is clipped to the region and the
//! clipped area is summed per category. Features whose raw land-use key
//! has no category are reported separately and do not count towards the
//! total, so the category areas always add up to the total.

use std::collections::BTreeMap;

use geo::MultiPolygon;
use quartier_composition_models::{CategorySize, CompositionResult, Region, RenderedFeature};
use quartier_config_models::CityConfig;
use quartier_geometry::{area, bounds_overlap, intersect, polygonal, validate};

/// Key under which area of features without a land-use property is
/// reported in [`CompositionResult::unmapped`].
pub const UNTAGGED_KEY: &str = "(untagged)";

/// Category assignment of a single feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Categorized {
    /// The feature belongs to this category id.
    Mapped(String),
    /// The feature's raw land-use key has no category.
    Unmapped(String),
    /// The feature carries no land-use key at all.
    Untagged,
}

/// Assigns rendered features to categories.
pub trait CategoryResolver {
    /// Categorizes one feature.
    fn categorize(&self, feature: &RenderedFeature) -> Categorized;
}

impl<F> CategoryResolver for F
where
    F: Fn(&RenderedFeature) -> Categorized,
{
    fn categorize(&self, feature: &RenderedFeature) -> Categorized {
        self(feature)
    }
}

/// Categorizes features through a city's land-use mapping, reading the raw
/// key from the configured land-use property.
#[derive(Debug, Clone, Copy)]
pub struct LanduseCategories<'a> {
    config: &'a CityConfig,
}

impl<'a> LanduseCategories<'a> {
    /// Creates a resolver backed by `config`.
    #[must_use]
    pub const fn new(config: &'a CityConfig) -> Self {
        Self { config }
    }
}

impl CategoryResolver for LanduseCategories<'_> {
    fn categorize(&self, feature: &RenderedFeature) -> Categorized {
        let Some(raw) = feature.property_str(&self.config.settings.landuse_fieldname) else {
            return Categorized::Untagged;
        };
        self.config
            .category_of(&raw)
            .map_or(Categorized::Unmapped(raw), |id| {
                Categorized::Mapped(id.to_string())
            })
    }
}

/// Computes how the region's area splits into land-use categories.
///
/// Without a region, or when nothing intersects, the result is empty with
/// a total of zero. Malformed and non-polygonal features are skipped
/// without affecting the others. The result does not depend on the order
/// of `features`: per-category contributions are summed in sorted order.
#[must_use]
pub fn compute_composition(
    region: Option<&Region>,
    features: &[RenderedFeature],
    categories: &impl CategoryResolver,
) -> CompositionResult {
    let Some(region) = region else {
        return CompositionResult::empty();
    };
    let region_geometry = region.geometry();
    if let Err(e) = validate(region_geometry) {
        log::warn!("Region geometry rejected: {e}");
        return CompositionResult::empty();
    }

    let mut mapped: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut unmapped: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for feature in features {
        let Some(clipped_area) = intersection_area(region_geometry, feature) else {
            continue;
        };
        match categories.categorize(feature) {
            Categorized::Mapped(id) => mapped.entry(id).or_default().push(clipped_area),
            Categorized::Unmapped(raw) => unmapped.entry(raw).or_default().push(clipped_area),
            Categorized::Untagged => unmapped
                .entry(UNTAGGED_KEY.to_string())
                .or_default()
                .push(clipped_area),
        }
    }

    let unmapped: BTreeMap<String, f64> = unmapped
        .into_iter()
        .map(|(raw, pieces)| (raw, stable_sum(pieces)))
        .collect();
    for (raw, excluded) in &unmapped {
        log::warn!("No category for land use '{raw}'; {excluded:.1} m² left out of the composition");
    }

    let areas: BTreeMap<String, f64> = mapped
        .into_iter()
        .map(|(id, pieces)| (id, stable_sum(pieces)))
        .collect();
    let total_area_sqm: f64 = areas.values().sum();

    if total_area_sqm <= 0.0 {
        return CompositionResult {
            unmapped,
            ..CompositionResult::empty()
        };
    }

    let sizes = areas
        .into_iter()
        .map(|(id, area_sqm)| {
            let percent = area_sqm / total_area_sqm * 100.0;
            (id, CategorySize { area_sqm, percent })
        })
        .collect();

    CompositionResult {
        sizes,
        total_area_sqm,
        unmapped,
    }
}

/// Area of the part of `feature` inside `region`, or `None` if the feature
/// is not polygonal, is malformed, or does not overlap.
fn intersection_area(region: &MultiPolygon<f64>, feature: &RenderedFeature) -> Option<f64> {
    let Some(geometry) = polygonal(&feature.geometry) else {
        log::debug!("Skipping non-polygonal land-use feature");
        return None;
    };
    if !bounds_overlap(region, &geometry) {
        return None;
    }
    if let Err(e) = validate(&geometry) {
        log::warn!("Skipping malformed land-use feature: {e}");
        return None;
    }

    intersect(region, &geometry).map(|clipped| area(&clipped))
}

/// Sums in ascending order so the result is independent of input order.
fn stable_sum(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    values.into_iter().sum()
}
