//! Compile-time registry of bundled city configurations.
//!
//! Each entry is a `(name, toml_content)` pair embedded via `include_str!`.
//! Deploying to a new city means adding a TOML file in `cities/` and a
//! corresponding entry here.

use quartier_config_models::CityConfig;

use crate::parse_city_config;

/// Number of bundled cities. Enforced by a test.
#[cfg(test)]
const EXPECTED_CITY_COUNT: usize = 1;

/// Embedded TOML city definitions.
const CITY_TOMLS: &[(&str, &str)] = &[("basel", include_str!("../cities/basel.toml"))];

/// Returns all bundled city configurations.
///
/// # Panics
///
/// Panics if any embedded TOML file fails to parse or validate. Since these
/// are compile-time constants, failures indicate a development error and
/// are caught by the tests below.
#[must_use]
pub fn all_cities() -> Vec<CityConfig> {
    CITY_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_city_config(toml)
                .unwrap_or_else(|e| panic!("Failed to parse city config '{name}': {e}"))
        })
        .collect()
}

/// Returns the bundled configuration with the given id, if any.
#[must_use]
pub fn city(id: &str) -> Option<CityConfig> {
    all_cities().into_iter().find(|c| c.id == id)
}

/// Ids of all bundled cities.
#[must_use]
pub fn city_ids() -> Vec<&'static str> {
    CITY_TOMLS.iter().map(|(name, _)| *name).collect()
}
