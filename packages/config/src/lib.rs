#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! City configuration loading and validation.
//!
//! Parses [`CityConfig`] TOML (either one of the embedded cities from
//! [`registry`] or a file on disk), checks it for internal consistency, and
//! resolves the seasonal category colors used by the composition diagram.

pub mod registry;

use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;

use quartier_config_models::{
    AreaMode, CIRCLE_MODE_ID, Category, CityConfig, Season,
};
use thiserror::Error;

/// Errors that can occur while loading a city configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML could not be deserialized.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The configuration is syntactically valid but inconsistent.
    #[error("Invalid configuration: {message}")]
    Invalid {
        /// Description of what went wrong.
        message: String,
    },

    /// No palette is configured for the requested season.
    #[error("Unknown season: {0}")]
    UnknownSeason(Season),
}

impl ConfigError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

/// Parses and validates a city configuration from TOML.
///
/// # Errors
///
/// Returns [`ConfigError::Toml`] for malformed TOML and
/// [`ConfigError::Invalid`] when [`validate`] rejects the result.
pub fn parse_city_config(toml_str: &str) -> Result<CityConfig, ConfigError> {
    let config: CityConfig = toml::de::from_str(toml_str)?;
    validate(&config)?;
    Ok(config)
}

/// Reads, parses and validates a city configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails to parse or
/// validate.
pub fn load_city_config(path: &Path) -> Result<CityConfig, ConfigError> {
    log::debug!("Loading city configuration from {}", path.display());
    let contents = std::fs::read_to_string(path)?;
    parse_city_config(&contents)
}

/// Checks a configuration for internal consistency.
///
/// * category ids are unique and non-empty
/// * every land-use mapping targets a defined category
/// * every palette is named after a known season and colors every category
/// * area mode ids are unique, exactly one circle mode exists and it uses
///   [`CIRCLE_MODE_ID`]
/// * `location_label_mode`, when set, names a polygon mode
/// * the analysis radius is positive and the zoom range is finite and
///   ordered
/// * the map center and bounds are finite coordinates
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] describing the first problem found.
pub fn validate(config: &CityConfig) -> Result<(), ConfigError> {
    let settings = &config.settings;
    if !(settings.analysis_radius_m.is_finite() && settings.analysis_radius_m > 0.0) {
        return Err(ConfigError::invalid(format!(
            "analysis_radius_m must be positive, got {}",
            settings.analysis_radius_m
        )));
    }
    if !(settings.min_zoom.is_finite() && settings.max_zoom.is_finite()) {
        return Err(ConfigError::invalid(format!(
            "zoom range must be finite, got {}..{}",
            settings.min_zoom, settings.max_zoom
        )));
    }
    if settings.min_zoom > settings.max_zoom {
        return Err(ConfigError::invalid(format!(
            "min_zoom {} exceeds max_zoom {}",
            settings.min_zoom, settings.max_zoom
        )));
    }

    let coordinates = settings
        .initial_map_center
        .iter()
        .chain(settings.map_bounds.iter().flatten());
    if let Some(bad) = coordinates.copied().find(|c| !c.is_finite()) {
        return Err(ConfigError::invalid(format!(
            "map center and bounds must be finite, got {bad}"
        )));
    }

    let mut category_ids = BTreeSet::new();
    for category in &config.categories {
        if category.id.is_empty() {
            return Err(ConfigError::invalid("category with empty id"));
        }
        if !category_ids.insert(category.id.as_str()) {
            return Err(ConfigError::invalid(format!(
                "duplicate category id '{}'",
                category.id
            )));
        }
    }

    for (raw, category) in &config.landuse_mapping {
        if !category_ids.contains(category.as_str()) {
            return Err(ConfigError::invalid(format!(
                "land use '{raw}' maps to unknown category '{category}'"
            )));
        }
    }

    for (season, palette) in &config.palettes {
        if Season::from_str(season).is_err() {
            return Err(ConfigError::invalid(format!("unknown palette season '{season}'")));
        }
        if let Some(missing) = category_ids.iter().find(|id| !palette.contains_key(**id)) {
            return Err(ConfigError::invalid(format!(
                "palette '{season}' has no color for category '{missing}'"
            )));
        }
    }

    let mut mode_ids = BTreeSet::new();
    let mut circle_modes = 0;
    for mode in &config.area_modes {
        if !mode_ids.insert(mode.id()) {
            return Err(ConfigError::invalid(format!(
                "duplicate area mode '{}'",
                mode.id()
            )));
        }
        if let AreaMode::Circle { id, .. } = mode {
            if id != CIRCLE_MODE_ID {
                return Err(ConfigError::invalid(format!(
                    "circle mode must use id '{CIRCLE_MODE_ID}', got '{id}'"
                )));
            }
            circle_modes += 1;
        }
    }
    if circle_modes != 1 {
        return Err(ConfigError::invalid(format!(
            "expected exactly one circle mode, found {circle_modes}"
        )));
    }

    if let Some(label_mode) = &config.location_label_mode {
        if !config.area_mode(label_mode).is_some_and(AreaMode::is_polygon) {
            return Err(ConfigError::invalid(format!(
                "location_label_mode '{label_mode}' is not a polygon area mode"
            )));
        }
    }

    Ok(())
}

/// Resolves the categories with their colors for a season, in the
/// configured display order.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownSeason`] if no palette exists for `season`,
/// or [`ConfigError::Invalid`] if the palette lacks a category color.
pub fn categories_for_season(
    config: &CityConfig,
    season: Season,
) -> Result<Vec<Category>, ConfigError> {
    let palette = config
        .palettes
        .get(season.as_ref())
        .ok_or(ConfigError::UnknownSeason(season))?;

    config
        .categories
        .iter()
        .map(|definition| {
            let color = palette.get(&definition.id).ok_or_else(|| {
                ConfigError::invalid(format!(
                    "palette '{season}' has no color for category '{}'",
                    definition.id
                ))
            })?;
            Ok(Category {
                id: definition.id.clone(),
                color: color.clone(),
                name: definition.name.clone(),
                name_en: definition.name_en.clone(),
            })
        })
        .collect()
}

/// Resolves the categories for the meteorological season of `date`,
/// falling back to the season-independent palette when the city has no
/// palette for that season.
///
/// # Errors
///
/// Returns an error if neither palette exists.
pub fn categories_for_date(
    config: &CityConfig,
    date: &impl chrono::Datelike,
) -> Result<Vec<Category>, ConfigError> {
    let season = Season::for_date(date);
    match categories_for_season(config, season) {
        Err(ConfigError::UnknownSeason(_)) => {
            log::debug!("No {season} palette for {}, using always", config.id);
            categories_for_season(config, Season::Always)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const MINIMAL: &str = r##"
        id = "testville"
        name = "Testville"

        [settings]
        analysis_radius_m = 100.0
        initial_map_center = [8.0, 47.0]
        map_bounds = [[7.9, 46.9], [8.1, 47.1]]
        min_zoom = 12.0
        max_zoom = 17.0
        landuse_fieldname = "kind"

        [[categories]]
        id = "water"
        name = "Wasser"
        name_en = "Water"

        [[categories]]
        id = "traffic"
        name = "Verkehr"
        name_en = "Traffic"

        [palettes.always]
        water = "#0000ff"
        traffic = "#888888"

        [palettes.summer]
        water = "#0000aa"
        traffic = "#777777"

        [landuse_mapping]
        lake = "water"
        road = "traffic"

        [[area_modes]]
        type = "circle"
        id = "circle"
        label_key = "useCircle"
    "##;

    #[test]
    fn parses_minimal_config_with_defaults() {
        let config = parse_city_config(MINIMAL).unwrap();
        assert_eq!(config.settings.circle_steps, 128);
        assert_eq!(config.settings.landuse_layer, "landuse");
        assert_eq!(config.settings.grid_layer, "gridLayer");
        assert_eq!(config.category_of("lake"), Some("water"));
        assert_eq!(config.category_of("swamp"), None);
        assert_eq!(config.default_mode().map(AreaMode::id), Some("circle"));
    }

    #[test]
    fn categories_keep_configured_order() {
        let config = parse_city_config(MINIMAL).unwrap();
        let categories = categories_for_season(&config, Season::Summer).unwrap();
        let ids: Vec<&str> = categories.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["water", "traffic"]);
        assert_eq!(categories[0].color, "#0000aa");
    }

    #[test]
    fn missing_season_palette_is_an_error() {
        let config = parse_city_config(MINIMAL).unwrap();
        assert!(matches!(
            categories_for_season(&config, Season::Winter),
            Err(ConfigError::UnknownSeason(Season::Winter))
        ));
    }

    #[test]
    fn date_falls_back_to_always_palette() {
        let config = parse_city_config(MINIMAL).unwrap();
        let january = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let july = NaiveDate::from_ymd_opt(2025, 7, 10).unwrap();

        assert_eq!(categories_for_date(&config, &january).unwrap()[0].color, "#0000ff");
        assert_eq!(categories_for_date(&config, &july).unwrap()[0].color, "#0000aa");
    }

    #[test]
    fn rejects_mapping_to_unknown_category() {
        let toml = MINIMAL.replace("road = \"traffic\"", "road = \"streets\"");
        let err = parse_city_config(&toml).unwrap_err();
        assert!(err.to_string().contains("unknown category 'streets'"), "{err}");
    }

    #[test]
    fn rejects_incomplete_palette() {
        let toml = MINIMAL.replace("traffic = \"#777777\"", "");
        let err = parse_city_config(&toml).unwrap_err();
        assert!(err.to_string().contains("palette 'summer'"), "{err}");
    }

    #[test]
    fn rejects_missing_circle_mode() {
        let without_modes = MINIMAL.split("[[area_modes]]").next().unwrap();
        let err = parse_city_config(without_modes).unwrap_err();
        assert!(err.to_string().contains("exactly one circle mode"), "{err}");
    }

    #[test]
    fn rejects_renamed_circle_mode() {
        let toml = MINIMAL.replace("id = \"circle\"", "id = \"ring\"");
        let err = parse_city_config(&toml).unwrap_err();
        assert!(err.to_string().contains("circle mode must use id"), "{err}");
    }

    #[test]
    fn rejects_non_positive_radius() {
        let toml = MINIMAL.replace("analysis_radius_m = 100.0", "analysis_radius_m = 0.0");
        assert!(matches!(
            parse_city_config(&toml),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn rejects_non_finite_zoom() {
        for replacement in ["min_zoom = nan", "min_zoom = inf"] {
            let toml = MINIMAL.replace("min_zoom = 12.0", replacement);
            assert!(matches!(
                parse_city_config(&toml),
                Err(ConfigError::Invalid { .. })
            ));
        }

        let toml = MINIMAL.replace("max_zoom = 17.0", "max_zoom = nan");
        assert!(matches!(
            parse_city_config(&toml),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn rejects_non_finite_map_center_and_bounds() {
        let toml = MINIMAL.replace(
            "initial_map_center = [8.0, 47.0]",
            "initial_map_center = [nan, 47.0]",
        );
        assert!(matches!(
            parse_city_config(&toml),
            Err(ConfigError::Invalid { .. })
        ));

        let toml = MINIMAL.replace(
            "map_bounds = [[7.9, 46.9], [8.1, 47.1]]",
            "map_bounds = [[7.9, 46.9], [inf, 47.1]]",
        );
        assert!(matches!(
            parse_city_config(&toml),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn rejects_label_mode_that_is_not_a_polygon_mode() {
        let toml = MINIMAL.replace(
            "name = \"Testville\"",
            "name = \"Testville\"\nlocation_label_mode = \"circle\"",
        );
        let err = parse_city_config(&toml).unwrap_err();
        assert!(err.to_string().contains("location_label_mode"), "{err}");
    }
}
