//! JSON shapes printed by the CLI.

use quartier_composition::AdminDataset;
use quartier_composition_models::{Analysis, CompositionResult, GeoPoint, Region};
use quartier_config_models::{AreaMode, Category};
use serde::Serialize;

/// Result of one analysis, as printed by `quartier analyze`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport<'a> {
    /// City id.
    pub city: &'a str,
    /// Id of the area mode that was analyzed.
    pub mode: &'a str,
    /// Map center the analysis ran at.
    pub center: GeoPoint,
    /// The analyzed region, if one was resolved.
    pub region: Option<RegionSummary>,
    /// Categories with area, in display order, with this season's colors.
    pub categories: Vec<CategoryShare>,
    /// Raw per-category areas and percentages.
    pub composition: &'a CompositionResult,
    /// Whether the loaded tiles cover the whole region.
    pub fully_covered: bool,
    /// Name of the administrative area around the center, if labeled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_label: Option<&'a str>,
}

impl<'a> AnalysisReport<'a> {
    /// Builds the report, ordering shares by `categories`.
    pub fn new(
        city: &'a str,
        center: GeoPoint,
        analysis: &'a Analysis,
        categories: &[Category],
    ) -> Self {
        let shares = analysis
            .composition
            .ordered(categories.iter().map(|c| c.id.as_str()))
            .filter_map(|(id, size)| {
                let category = categories.iter().find(|c| c.id == id)?;
                Some(CategoryShare {
                    id: category.id.clone(),
                    name: category.name.clone(),
                    color: category.color.clone(),
                    area_sqm: size.area_sqm,
                    percent: size.percent,
                })
            })
            .collect();

        Self {
            city,
            mode: analysis.mode.id(),
            center,
            region: analysis.region.as_ref().map(RegionSummary::from),
            categories: shares,
            composition: &analysis.composition,
            fully_covered: analysis.fully_covered,
            location_label: analysis.location_label.as_deref(),
        }
    }
}

/// Shape and size of the analyzed region.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RegionSummary {
    /// A circle around the map center.
    #[serde(rename_all = "camelCase")]
    Circle {
        /// Radius in meters.
        radius_m: f64,
        /// Geodesic area in square meters.
        area_sqm: f64,
    },
    /// An administrative area.
    #[serde(rename_all = "camelCase")]
    Polygon {
        /// Area mode the polygon belongs to.
        mode_id: String,
        /// Feature id within the mode's dataset.
        feature_id: String,
        /// Display name.
        name: String,
        /// Geodesic area in square meters.
        area_sqm: f64,
    },
}

impl From<&Region> for RegionSummary {
    fn from(region: &Region) -> Self {
        let area_sqm = quartier_geometry::area(region.geometry());
        match region {
            Region::Circle { radius_m, .. } => Self::Circle {
                radius_m: *radius_m,
                area_sqm,
            },
            Region::Polygon {
                mode_id,
                feature_id,
                name,
                ..
            } => Self::Polygon {
                mode_id: mode_id.clone(),
                feature_id: feature_id.clone(),
                name: name.clone(),
                area_sqm,
            },
        }
    }
}

/// One category's part of the region.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    /// Category id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Color for the current season.
    pub color: String,
    /// Area in square meters.
    pub area_sqm: f64,
    /// Share of the total categorized area, 0 to 100.
    pub percent: f64,
}

/// An area mode, as printed by `quartier modes`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeSummary {
    /// Mode id.
    pub id: String,
    /// Translation key of the mode label.
    pub label_key: String,
    /// Whether the mode is selected on startup.
    pub default: bool,
    /// Dataset file of polygon modes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
    /// Selectable areas, when the dataset was loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub areas: Option<Vec<AreaSummary>>,
}

impl ModeSummary {
    /// Summarizes `mode`, listing its areas when `dataset` is given.
    pub fn new(mode: &AreaMode, dataset: Option<&AdminDataset>) -> Self {
        let file = match mode {
            AreaMode::Circle { .. } => None,
            AreaMode::Polygon { dataset, .. } => Some(dataset.clone()),
        };

        Self {
            id: mode.id().to_string(),
            label_key: mode.label_key().to_string(),
            default: mode.is_default(),
            dataset: file,
            areas: dataset.map(|d| {
                d.areas()
                    .into_iter()
                    .map(|(id, name)| AreaSummary {
                        id: id.to_string(),
                        name: name.to_string(),
                    })
                    .collect()
            }),
        }
    }
}

/// A selectable administrative area.
#[derive(Debug, Serialize)]
pub struct AreaSummary {
    /// Feature id.
    pub id: String,
    /// Display name.
    pub name: String,
}
