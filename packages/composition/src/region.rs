//! Resolves the analysis region for the current mode.
//!
//! Circle mode builds a polygon approximation of a circle around the view
//! center. Polygon modes return the selected administrative area verbatim.
//! `None` means "no region", which is distinct from a region with an empty
//! geometry and makes the analysis short-circuit to an empty result.

use std::collections::BTreeMap;

use geo::MultiPolygon;
use quartier_composition_models::{AnalysisMode, GeoPoint, Region};
use quartier_config_models::CityConfig;
use quartier_geometry::geodesic_circle;

use crate::dataset::AdminDataset;

/// Builds the circle region around `center`.
#[must_use]
pub fn circle_region(center: GeoPoint, radius_m: f64, steps: usize) -> Region {
    let polygon = geodesic_circle(center.into(), radius_m, steps);
    Region::Circle {
        center,
        radius_m,
        geometry: MultiPolygon(vec![polygon]),
    }
}

/// Looks up the selected area of a polygon mode.
///
/// Returns `None` when nothing is selected or the id is not in the
/// dataset.
#[must_use]
pub fn polygon_region(selected: Option<&str>, dataset: &AdminDataset) -> Option<Region> {
    let id = selected?;
    let Some(area) = dataset.find(id) else {
        log::warn!("No {} area with id '{id}'", dataset.mode_id());
        return None;
    };

    Some(Region::Polygon {
        mode_id: dataset.mode_id().to_string(),
        feature_id: area.id.clone(),
        name: area.name.clone(),
        geometry: area.geometry.clone(),
    })
}

/// Resolves the region for `mode`.
///
/// Circle mode uses `radius_m` and the configured vertex count. Polygon
/// modes need a selected id and a loaded dataset; an unknown mode or a
/// missing dataset yields no region.
#[must_use]
pub fn resolve_region(
    mode: &AnalysisMode,
    center: GeoPoint,
    radius_m: f64,
    selected: Option<&str>,
    config: &CityConfig,
    datasets: &BTreeMap<String, AdminDataset>,
) -> Option<Region> {
    match mode {
        AnalysisMode::Circle => Some(circle_region(
            center,
            radius_m,
            config.settings.circle_steps,
        )),
        AnalysisMode::Polygon(mode_id) => {
            let Some(dataset) = datasets.get(mode_id) else {
                log::warn!("No dataset loaded for area mode '{mode_id}'");
                return None;
            };
            polygon_region(selected, dataset)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::AdminArea;
    use quartier_config::registry;
    use quartier_geometry::{area, geodesic_rect};

    const BASEL: GeoPoint = GeoPoint::new(7.589_79, 47.560_22);

    fn datasets() -> BTreeMap<String, AdminDataset> {
        let area = AdminArea {
            id: "1".to_string(),
            name: "Grossbasel West".to_string(),
            geometry: MultiPolygon(vec![geodesic_rect(BASEL.into(), 400.0, 300.0)]),
        };
        BTreeMap::from([(
            "wahlkreis".to_string(),
            AdminDataset::from_areas("wahlkreis", vec![area]),
        )])
    }

    #[test]
    fn circle_uses_configured_steps() {
        let config = registry::city("basel").unwrap();
        let region = resolve_region(
            &AnalysisMode::Circle,
            BASEL,
            250.0,
            None,
            &config,
            &datasets(),
        )
        .unwrap();

        let Region::Circle { center, radius_m, geometry } = &region else {
            panic!("expected a circle, got {region:?}");
        };
        assert_eq!(*center, BASEL);
        assert!((radius_m - 250.0).abs() < f64::EPSILON);
        // Closed ring: configured vertices plus the repeated first one.
        assert_eq!(
            geometry.0[0].exterior().0.len(),
            config.settings.circle_steps + 1
        );
    }

    #[test]
    fn circle_area_is_close_to_pi_r_squared() {
        let region = circle_region(BASEL, 250.0, 128);
        let expected = std::f64::consts::PI * 250.0 * 250.0;
        let actual = area(region.geometry());
        assert!((actual - expected).abs() / expected < 0.005, "{actual}");
    }

    #[test]
    fn circle_is_reproducible() {
        assert_eq!(circle_region(BASEL, 250.0, 128), circle_region(BASEL, 250.0, 128));
    }

    #[test]
    fn polygon_mode_returns_geometry_verbatim() {
        let config = registry::city("basel").unwrap();
        let datasets = datasets();
        let region = resolve_region(
            &AnalysisMode::Polygon("wahlkreis".to_string()),
            BASEL,
            250.0,
            Some("1"),
            &config,
            &datasets,
        )
        .unwrap();

        assert_eq!(region.name(), Some("Grossbasel West"));
        assert_eq!(
            region.geometry(),
            &datasets["wahlkreis"].find("1").unwrap().geometry
        );
    }

    #[test]
    fn polygon_mode_without_selection_has_no_region() {
        let config = registry::city("basel").unwrap();
        let mode = AnalysisMode::Polygon("wahlkreis".to_string());

        assert!(resolve_region(&mode, BASEL, 250.0, None, &config, &datasets()).is_none());
        assert!(resolve_region(&mode, BASEL, 250.0, Some("42"), &config, &datasets()).is_none());
    }

    #[test]
    fn polygon_mode_without_dataset_has_no_region() {
        let config = registry::city("basel").unwrap();
        let mode = AnalysisMode::Polygon("wohnviertel".to_string());
        assert!(resolve_region(&mode, BASEL, 250.0, Some("1"), &config, &datasets()).is_none());
    }
}
