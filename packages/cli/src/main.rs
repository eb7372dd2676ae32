#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Land-use composition of a map region from the command line.
//!
//! Loads a city configuration, a snapshot of the rendered land-use (and
//! optionally tile grid) features as `GeoJSON`, and prints the analysis of a
//! circle or administrative area as JSON. The `overlay` command renders the
//! region overlay for a given view to SVG.

mod report;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use quartier_composition::{AdminDataset, AnalysisSession, StaticMapSnapshot};
use quartier_composition_models::{GeoPoint, MapView, ScreenSize};
use quartier_config::{categories_for_date, categories_for_season, load_city_config, registry};
use quartier_config_models::{CityConfig, Season};
use quartier_overlay::{OverlayStyle, SvgSurface, WebMercatorView, render_overlay};

use crate::report::{AnalysisReport, ModeSummary};

#[derive(Parser)]
#[command(name = "quartier", about = "Land-use composition analysis")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the land-use composition of a region as JSON
    Analyze {
        #[command(flatten)]
        region: RegionArgs,

        #[command(flatten)]
        view: ViewArgs,
    },
    /// Render the region overlay for a map view to SVG
    Overlay {
        #[command(flatten)]
        region: RegionArgs,

        #[command(flatten)]
        view: ViewArgs,

        /// Output SVG file
        #[arg(long, default_value = "overlay.svg")]
        out: PathBuf,
    },
    /// List the categories with their colors for a season
    Categories {
        #[command(flatten)]
        city: CityArgs,

        /// Palette season (defaults to the season of `--date`)
        #[arg(long, conflicts_with = "date")]
        season: Option<Season>,

        /// Date whose season selects the palette (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List the area modes and, with `--data-dir`, their selectable areas
    Modes {
        #[command(flatten)]
        city: CityArgs,

        /// Directory containing the area mode datasets
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[derive(Args)]
struct CityArgs {
    /// Bundled city id
    #[arg(long, default_value = "basel")]
    city: String,

    /// City configuration TOML file (overrides `--city`)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct RegionArgs {
    #[command(flatten)]
    city: CityArgs,

    /// Rendered land-use features (`GeoJSON` `FeatureCollection`)
    #[arg(long)]
    landuse: Option<PathBuf>,

    /// Rendered tile grid features (`GeoJSON` `FeatureCollection`)
    #[arg(long)]
    grid: Option<PathBuf>,

    /// Area mode id (defaults to the city's default mode)
    #[arg(long)]
    mode: Option<String>,

    /// Selected area id in a polygon mode
    #[arg(long)]
    area: Option<String>,

    /// Circle radius in meters (defaults to the configured radius)
    #[arg(long)]
    radius: Option<f64>,

    /// Directory containing the area mode datasets
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[derive(Args)]
struct ViewArgs {
    /// View center longitude (defaults to the configured map center)
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    /// View center latitude
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Map zoom, clamped to the configured range
    #[arg(long, default_value_t = 15.0)]
    zoom: f64,

    /// Container width in pixels
    #[arg(long, default_value_t = 800.0)]
    width: f64,

    /// Container height in pixels
    #[arg(long, default_value_t = 600.0)]
    height: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { region, view } => analyze(&region, &view)?,
        Commands::Overlay { region, view, out } => overlay(&region, &view, &out)?,
        Commands::Categories { city, season, date } => {
            let config = load_config(&city)?;
            let categories = match (season, date) {
                (Some(season), _) => categories_for_season(&config, season)?,
                (None, Some(date)) => categories_for_date(&config, &date)?,
                (None, None) => categories_for_date(&config, &chrono::Local::now().date_naive())?,
            };
            println!("{}", serde_json::to_string_pretty(&categories)?);
        }
        Commands::Modes { city, data_dir } => {
            let config = load_config(&city)?;
            let datasets = load_datasets(&config, data_dir.as_deref())?;
            let modes: Vec<ModeSummary> = config
                .area_modes
                .iter()
                .map(|mode| ModeSummary::new(mode, datasets.get(mode.id())))
                .collect();
            println!("{}", serde_json::to_string_pretty(&modes)?);
        }
    }

    Ok(())
}

fn analyze(region: &RegionArgs, view: &ViewArgs) -> Result<(), Box<dyn std::error::Error>> {
    let session = build_session(region)?;
    let view = build_view(session.config(), view);
    let snapshot = load_snapshot(session.config(), region)?;

    let analysis = session.recompute(&view, &snapshot);
    let categories = categories_for_date(session.config(), &chrono::Local::now().date_naive())?;
    let report = AnalysisReport::new(
        &session.config().id,
        view.view_center(),
        &analysis,
        &categories,
    );

    if !analysis.fully_covered {
        log::warn!("Region crosses a tile seam; the composition may be incomplete");
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn overlay(
    region: &RegionArgs,
    view: &ViewArgs,
    out: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = build_session(region)?;
    let view = build_view(session.config(), view);
    let center = view.view_center();

    let mut surface = SvgSurface::new();
    render_overlay(
        session.region(center).as_ref(),
        &view,
        &mut surface,
        &OverlayStyle::default(),
    );
    surface.save(out)?;
    Ok(())
}

fn load_config(args: &CityArgs) -> Result<CityConfig, Box<dyn std::error::Error>> {
    if let Some(path) = &args.config {
        log::info!("Loading city configuration from {}", path.display());
        return Ok(load_city_config(path)?);
    }

    registry::city(&args.city).ok_or_else(|| {
        format!(
            "Unknown city '{}' (available: {})",
            args.city,
            registry::city_ids().join(", ")
        )
        .into()
    })
}

fn load_datasets(
    config: &CityConfig,
    data_dir: Option<&Path>,
) -> Result<BTreeMap<String, AdminDataset>, Box<dyn std::error::Error>> {
    match data_dir {
        Some(dir) => Ok(AnalysisSession::load_datasets(config, dir)?),
        None => Ok(BTreeMap::new()),
    }
}

fn build_session(args: &RegionArgs) -> Result<AnalysisSession, Box<dyn std::error::Error>> {
    let config = load_config(&args.city)?;
    let datasets = load_datasets(&config, args.data_dir.as_deref())?;
    let mut session = AnalysisSession::new(config, datasets);

    if let Some(mode) = &args.mode {
        session.set_mode(mode)?;
    }
    if let Some(radius) = args.radius {
        session.set_radius(radius)?;
    }
    if let Some(area) = &args.area {
        if session.dataset(session.mode().id()).is_none() {
            return Err(format!(
                "No dataset loaded for mode '{}'; pass --data-dir",
                session.mode().id()
            )
            .into());
        }
        session.select_area(Some(area.clone()))?;
    }

    Ok(session)
}

fn build_view(config: &CityConfig, args: &ViewArgs) -> WebMercatorView {
    let settings = &config.settings;
    let center = match (args.lon, args.lat) {
        (Some(lon), Some(lat)) => GeoPoint::new(lon, lat),
        _ => GeoPoint::new(settings.initial_map_center[0], settings.initial_map_center[1]),
    };
    let size = ScreenSize {
        width: args.width,
        height: args.height,
    };

    WebMercatorView::new(center, args.zoom, size).clamp_zoom(settings.min_zoom, settings.max_zoom)
}

fn load_snapshot(
    config: &CityConfig,
    args: &RegionArgs,
) -> Result<StaticMapSnapshot, Box<dyn std::error::Error>> {
    let settings = &config.settings;
    let mut snapshot = StaticMapSnapshot::new();

    match &args.landuse {
        Some(path) => snapshot.load_layer(&settings.landuse_layer, path)?,
        None => log::warn!("No --landuse snapshot given; the composition will be empty"),
    }
    if let Some(path) = &args.grid {
        snapshot.load_layer(&settings.grid_layer, path)?;
    }

    Ok(snapshot)
}
