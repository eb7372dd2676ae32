//! Analysis session state.
//!
//! Holds the user's current choices (area mode, selected area, circle
//! radius) for one city and recomputes the analysis from a map snapshot.
//! Every recomputation produces a fresh [`Analysis`] value; nothing is
//! cached between calls.

use std::collections::BTreeMap;
use std::path::Path;

use quartier_composition_models::{
    Analysis, AnalysisMode, GeoPoint, MapView, Region, RenderedFeatureSource,
};
use quartier_config_models::{AreaMode, CityConfig};

use crate::aggregate::{LanduseCategories, compute_composition};
use crate::coverage::is_fully_covered;
use crate::dataset::AdminDataset;
use crate::region::resolve_region;
use crate::{DatasetError, SessionError};

/// Current analysis inputs for one city.
#[derive(Debug)]
pub struct AnalysisSession {
    config: CityConfig,
    datasets: BTreeMap<String, AdminDataset>,
    mode: AnalysisMode,
    selected_area: Option<String>,
    radius_m: f64,
}

impl AnalysisSession {
    /// Starts a session in the city's default mode with the configured
    /// radius and no selected area.
    #[must_use]
    pub fn new(config: CityConfig, datasets: BTreeMap<String, AdminDataset>) -> Self {
        let mode = config.default_mode().map_or(AnalysisMode::Circle, to_analysis_mode);
        let radius_m = config.settings.analysis_radius_m;

        Self {
            config,
            datasets,
            mode,
            selected_area: None,
            radius_m,
        }
    }

    /// Loads the datasets of all polygon modes of `config` from `data_dir`,
    /// keyed by mode id.
    ///
    /// # Errors
    ///
    /// Returns the first dataset that fails to load.
    pub fn load_datasets(
        config: &CityConfig,
        data_dir: &Path,
    ) -> Result<BTreeMap<String, AdminDataset>, DatasetError> {
        config
            .polygon_area_modes()
            .map(|mode| {
                AdminDataset::load(mode, data_dir).map(|dataset| (mode.id().to_string(), dataset))
            })
            .collect()
    }

    /// The city configuration.
    #[must_use]
    pub const fn config(&self) -> &CityConfig {
        &self.config
    }

    /// The current mode.
    #[must_use]
    pub const fn mode(&self) -> &AnalysisMode {
        &self.mode
    }

    /// The selected area id of the current polygon mode.
    #[must_use]
    pub fn selected_area(&self) -> Option<&str> {
        self.selected_area.as_deref()
    }

    /// Circle radius in meters.
    #[must_use]
    pub const fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// The loaded dataset of a polygon mode.
    #[must_use]
    pub fn dataset(&self, mode_id: &str) -> Option<&AdminDataset> {
        self.datasets.get(mode_id)
    }

    /// Switches to the mode with the given id and clears the selection.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownMode`] if the city has no such mode.
    pub fn set_mode(&mut self, mode_id: &str) -> Result<(), SessionError> {
        let mode = self
            .config
            .area_mode(mode_id)
            .map(to_analysis_mode)
            .ok_or_else(|| SessionError::UnknownMode(mode_id.to_string()))?;

        log::debug!("Switching area mode from {} to {}", self.mode.id(), mode.id());
        self.mode = mode;
        self.selected_area = None;
        Ok(())
    }

    /// Selects an area of the current polygon mode, or clears the
    /// selection with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotPolygonMode`] when selecting in circle
    /// mode.
    pub fn select_area(&mut self, area_id: Option<String>) -> Result<(), SessionError> {
        if area_id.is_some() && self.mode == AnalysisMode::Circle {
            return Err(SessionError::NotPolygonMode);
        }
        self.selected_area = area_id;
        Ok(())
    }

    /// Sets the circle radius.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidRadius`] unless the radius is a
    /// positive, finite number.
    pub fn set_radius(&mut self, radius_m: f64) -> Result<(), SessionError> {
        if !(radius_m.is_finite() && radius_m > 0.0) {
            return Err(SessionError::InvalidRadius(radius_m));
        }
        self.radius_m = radius_m;
        Ok(())
    }

    /// Resolves the region for the current inputs around `center`.
    #[must_use]
    pub fn region(&self, center: GeoPoint) -> Option<Region> {
        resolve_region(
            &self.mode,
            center,
            self.radius_m,
            self.selected_area.as_deref(),
            &self.config,
            &self.datasets,
        )
    }

    /// Name of the label-mode area containing `center`.
    #[must_use]
    pub fn location_label(&self, center: GeoPoint) -> Option<String> {
        let mode_id = self.config.location_label_mode.as_deref()?;
        let dataset = self.datasets.get(mode_id)?;
        dataset.locate(center).map(|area| area.name.clone())
    }

    /// Recomputes the analysis for the current view.
    ///
    /// Reads the view center, resolves the region, and runs the composition
    /// and coverage checks against the configured land-use and grid layers.
    /// The location label is only resolved in circle mode.
    #[must_use]
    pub fn recompute(
        &self,
        view: &impl MapView,
        features: &impl RenderedFeatureSource,
    ) -> Analysis {
        let center = view.view_center();
        let region = self.region(center);

        let settings = &self.config.settings;
        let landuse = features.query_rendered_features(&settings.landuse_layer);
        let grid = features.query_rendered_features(&settings.grid_layer);
        log::debug!(
            "Recomputing {} analysis at ({}, {}) with {} land-use and {} grid features",
            self.mode.id(),
            center.lon,
            center.lat,
            landuse.len(),
            grid.len()
        );

        let composition = compute_composition(
            region.as_ref(),
            &landuse,
            &LanduseCategories::new(&self.config),
        );
        let fully_covered = is_fully_covered(region.as_ref(), &grid);
        let location_label = match self.mode {
            AnalysisMode::Circle => self.location_label(center),
            AnalysisMode::Polygon(_) => None,
        };

        Analysis {
            mode: self.mode.clone(),
            region,
            composition,
            fully_covered,
            location_label,
        }
    }
}

fn to_analysis_mode(mode: &AreaMode) -> AnalysisMode {
    match mode {
        AreaMode::Circle { .. } => AnalysisMode::Circle,
        AreaMode::Polygon { id, .. } => AnalysisMode::Polygon(id.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::AdminArea;
    use crate::features::StaticMapSnapshot;
    use geo::{Destination, Geodesic, MultiPolygon, Point};
    use quartier_composition_models::{RenderedFeature, ScreenPoint, ScreenSize};
    use quartier_config::registry;
    use quartier_geometry::geodesic_rect;

    const BASEL: GeoPoint = GeoPoint::new(7.589_79, 47.560_22);

    struct FixedView(GeoPoint);

    impl MapView for FixedView {
        fn project(&self, _point: GeoPoint) -> ScreenPoint {
            ScreenPoint { x: 0.0, y: 0.0 }
        }

        fn view_center(&self) -> GeoPoint {
            self.0
        }

        fn container_bounds(&self) -> ScreenSize {
            ScreenSize { width: 100.0, height: 100.0 }
        }
    }

    fn offset(east_m: f64) -> Point<f64> {
        Geodesic.destination(BASEL.into(), 90.0, east_m)
    }

    fn session() -> AnalysisSession {
        let config = registry::city("basel").unwrap();
        let wohnviertel = AdminDataset::from_areas(
            "wohnviertel",
            vec![AdminArea {
                id: "3".to_string(),
                name: "Altstadt Grossbasel".to_string(),
                geometry: MultiPolygon(vec![geodesic_rect(BASEL.into(), 2_000.0, 2_000.0)]),
            }],
        );
        let wahlkreis = AdminDataset::from_areas(
            "wahlkreis",
            vec![AdminArea {
                id: "1".to_string(),
                name: "Grossbasel Ost".to_string(),
                geometry: MultiPolygon(vec![geodesic_rect(BASEL.into(), 400.0, 400.0)]),
            }],
        );
        AnalysisSession::new(
            config,
            BTreeMap::from([
                ("wohnviertel".to_string(), wohnviertel),
                ("wahlkreis".to_string(), wahlkreis),
            ]),
        )
    }

    fn snapshot() -> StaticMapSnapshot {
        let water = |east_m: f64| {
            RenderedFeature::new(geodesic_rect(offset(east_m), 100.0, 100.0))
                .with_property("nutzung", "Fliessgewässer")
        };
        StaticMapSnapshot::new().with_layer("landuse", vec![water(-80.0), water(80.0)])
    }

    #[test]
    fn starts_in_default_circle_mode() {
        let session = session();
        assert_eq!(session.mode(), &AnalysisMode::Circle);
        assert!((session.radius_m() - 250.0).abs() < f64::EPSILON);
        assert_eq!(session.selected_area(), None);
    }

    #[test]
    fn circle_analysis_reports_water_and_location() {
        let analysis = session().recompute(&FixedView(BASEL), &snapshot());

        assert_eq!(analysis.mode, AnalysisMode::Circle);
        assert!(matches!(analysis.region, Some(Region::Circle { .. })));
        let water = analysis.composition.sizes["water"];
        assert!((water.area_sqm - 20_000.0).abs() < 20.0, "{}", water.area_sqm);
        assert!((water.percent - 100.0).abs() < 1e-9);
        assert!(analysis.fully_covered);
        assert_eq!(analysis.location_label.as_deref(), Some("Altstadt Grossbasel"));
    }

    #[test]
    fn polygon_mode_needs_a_selection() {
        let mut session = session();
        session.set_mode("wahlkreis").unwrap();

        let analysis = session.recompute(&FixedView(BASEL), &snapshot());
        assert!(analysis.region.is_none());
        assert!(analysis.composition.is_empty());
        assert!(analysis.fully_covered);
        assert_eq!(analysis.location_label, None);

        session.select_area(Some("1".to_string())).unwrap();
        let analysis = session.recompute(&FixedView(BASEL), &snapshot());
        assert_eq!(
            analysis.region.as_ref().and_then(Region::name),
            Some("Grossbasel Ost")
        );
        assert!((analysis.composition.total_area_sqm - 20_000.0).abs() < 20.0);
    }

    #[test]
    fn switching_mode_clears_selection() {
        let mut session = session();
        session.set_mode("wahlkreis").unwrap();
        session.select_area(Some("1".to_string())).unwrap();

        session.set_mode("wohnviertel").unwrap();
        assert_eq!(session.selected_area(), None);
        assert_eq!(session.mode(), &AnalysisMode::Polygon("wohnviertel".to_string()));
    }

    #[test]
    fn rejects_invalid_inputs() {
        let mut session = session();

        assert_eq!(
            session.set_mode("kanton"),
            Err(SessionError::UnknownMode("kanton".to_string()))
        );
        assert_eq!(
            session.select_area(Some("1".to_string())),
            Err(SessionError::NotPolygonMode)
        );
        assert!(session.set_radius(0.0).is_err());
        assert!(session.set_radius(f64::NAN).is_err());
        assert!(session.set_radius(-5.0).is_err());

        session.set_radius(500.0).unwrap();
        assert!((session.radius_m() - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn recompute_is_idempotent() {
        let session = session();
        let view = FixedView(BASEL);
        let snapshot = snapshot();
        assert_eq!(session.recompute(&view, &snapshot), session.recompute(&view, &snapshot));
    }
}
