mod app;
mod bridge;
mod camera;
mod color;
mod config;
mod crossfilter;
mod data;
mod geography;
mod state;
mod ui;

use app::ListingsViewerApp;
use clap::Parser;
use config::{Cli, ViewConfig};
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();
    let cli = Cli::parse();

    let mut state = AppState::new(ViewConfig::from(&cli));
    if let Some(path) = &cli.boroughs {
        state.open_boroughs(path);
    }
    if let Some(path) = &cli.listings {
        state.open_listings(path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "NYC Airbnb Listings",
        options,
        Box::new(|_cc| Ok(Box::new(ListingsViewerApp::new(state)))),
    )
}
