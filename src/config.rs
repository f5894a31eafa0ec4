use std::path::PathBuf;

use clap::Parser;

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Listings table to open at startup (.csv, .json, .parquet)
    #[arg(long)]
    pub listings: Option<PathBuf>,

    /// Borough boundaries to open at startup (GeoJSON)
    #[arg(long)]
    pub boroughs: Option<PathBuf>,

    /// GeoJSON feature property holding the borough display name
    #[arg(long, default_value = "boro_name")]
    pub name_property: String,

    /// Largest scale factor the map zooms to when fitting a borough
    #[arg(long, default_value_t = 8.0)]
    pub max_zoom: f64,
}

// ---------------------------------------------------------------------------
// View settings
// ---------------------------------------------------------------------------

/// Fixed geometry and timing of the linked views.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    /// Size of the map drawing frame in plane units.
    pub map_frame: [f64; 2],
    /// Share of the frame a fitted borough fills.
    pub fit_padding: f64,
    pub max_zoom: f64,
    /// Duration of a map pan/zoom transition.
    pub transition_secs: f64,
    pub name_property: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            map_frame: [800.0, 350.0],
            fit_padding: 0.9,
            max_zoom: 8.0,
            transition_secs: 0.75,
            name_property: "boro_name".to_string(),
        }
    }
}

impl From<&Cli> for ViewConfig {
    fn from(cli: &Cli) -> Self {
        // Zooming out past the whole city is never useful.
        let max_zoom = if cli.max_zoom.is_finite() {
            cli.max_zoom.max(1.0)
        } else {
            ViewConfig::default().max_zoom
        };
        Self {
            max_zoom,
            name_property: cli.name_property.clone(),
            ..Self::default()
        }
    }
}
