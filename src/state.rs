use std::path::Path;

use crate::bridge::{SelectionEvent, dispatch};
use crate::camera::MapCamera;
use crate::color::{CategoryColors, PriceScale};
use crate::config::ViewConfig;
use crate::crossfilter::{CrossFilter, ViewUpdate};
use crate::data::loader::{load_boroughs, load_listings};
use crate::data::model::RawListing;
use crate::geography::boroughs::BoroughMap;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: ViewConfig,

    /// Listing rows as read from the last opened file.
    listings: Option<Vec<RawListing>>,

    /// Borough boundaries from the last opened GeoJSON file.
    boroughs: Option<BoroughMap>,

    /// Built once both inputs are present; rebuilt when either is replaced.
    pub crossfilter: Option<CrossFilter>,

    pub camera: MapCamera,

    /// Borough colours for the bar chart and scatter plot.
    pub borough_colors: CategoryColors,

    /// Point colours for the map.
    pub price_scale: Option<PriceScale>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl AppState {
    pub fn new(config: ViewConfig) -> Self {
        Self {
            camera: MapCamera::new(config.map_frame),
            config,
            listings: None,
            boroughs: None,
            crossfilter: None,
            borough_colors: CategoryColors::default(),
            price_scale: None,
            status_message: None,
            loading: false,
        }
    }

    pub fn has_listings(&self) -> bool {
        self.listings.is_some()
    }

    pub fn has_boroughs(&self) -> bool {
        self.boroughs.is_some()
    }

    /// Read a listings file and rebuild the views if boroughs are loaded.
    pub fn open_listings(&mut self, path: &Path) {
        match load_listings(path) {
            Ok(rows) => self.set_listings(rows),
            Err(e) => self.report_load_error(&e),
        }
    }

    /// Read a borough GeoJSON file and rebuild the views if listings are loaded.
    pub fn open_boroughs(&mut self, path: &Path) {
        match load_boroughs(path, &self.config.name_property) {
            Ok(map) => self.set_boroughs(map),
            Err(e) => self.report_load_error(&e),
        }
    }

    pub fn set_listings(&mut self, rows: Vec<RawListing>) {
        self.listings = Some(rows);
        self.loading = false;
        self.rebuild();
    }

    pub fn set_boroughs(&mut self, map: BoroughMap) {
        self.boroughs = Some(map);
        self.loading = false;
        self.rebuild();
    }

    fn report_load_error(&mut self, e: &anyhow::Error) {
        log::error!("{e:#}");
        self.status_message = Some(format!("Error: {e:#}"));
        self.loading = false;
    }

    /// Join point of the two loads: the cross-filter exists only when both
    /// inputs do. Filter selections start over.
    fn rebuild(&mut self) {
        let (Some(rows), Some(boroughs)) = (&self.listings, &self.boroughs) else {
            self.status_message = Some(match (self.has_listings(), self.has_boroughs()) {
                (true, false) => "Listings loaded. Open a borough GeoJSON file to draw the views.",
                (false, true) => "Boroughs loaded. Open a listings file to draw the views.",
                _ => "Open a listings file and a borough GeoJSON file.",
            }
            .to_string());
            return;
        };

        let crossfilter = CrossFilter::new(rows, boroughs.clone(), &self.config);
        self.borough_colors = CategoryColors::new(
            crossfilter.data().catalog.boroughs.iter().map(String::as_str),
        );
        self.price_scale = crossfilter
            .data()
            .price_extent()
            .map(|(lo, hi)| PriceScale::new(lo, hi));
        self.camera = MapCamera::new(self.config.map_frame);
        self.status_message = Some(format!(
            "{} rated, {} mapped listings",
            crossfilter.data().rated.len(),
            crossfilter.data().mapped.len()
        ));
        self.crossfilter = Some(crossfilter);
    }

    /// Route a view interaction through the cross-filter and move the map.
    /// `now` is the UI clock in seconds.
    pub fn handle(&mut self, event: SelectionEvent, now: f64) -> Option<ViewUpdate> {
        let crossfilter = self.crossfilter.as_mut()?;
        let update = dispatch(crossfilter, event);
        match &update.zoom {
            Ok(target) => {
                if let Some(target) = target {
                    self.camera.fly_to(*target, now, self.config.transition_secs);
                }
                self.status_message = None;
            }
            Err(e) => {
                log::warn!("{e}");
                self.status_message = Some(e.to_string());
            }
        }
        Some(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::Choice;
    use crate::geography::boroughs::tests::TWO_SQUARES;
    use geo::{Coord, Rect};

    fn rows() -> Vec<RawListing> {
        let row = |borough: &str, neighborhood: &str, lon: &str, price: &str| RawListing {
            borough: borough.to_string(),
            neighborhood: neighborhood.to_string(),
            room_type: "Private room".to_string(),
            review_score: "3".to_string(),
            price: price.to_string(),
            longitude: lon.to_string(),
            latitude: "40.65".to_string(),
            ..RawListing::default()
        };
        vec![
            row("West", "Alpha", "-73.95", "$100"),
            row("East", "Gamma", "-73.85", "$300"),
        ]
    }

    #[test]
    fn views_appear_once_both_files_are_loaded() {
        let mut state = AppState::new(ViewConfig::default());
        state.set_boroughs(BoroughMap::from_geojson(TWO_SQUARES, "boro_name").unwrap());
        assert!(state.crossfilter.is_none());
        assert!(state.status_message.is_some());

        state.set_listings(rows());
        let cf = state.crossfilter.as_ref().unwrap();
        assert_eq!(cf.listings_count(), 2);
        assert_eq!(state.price_scale, Some(PriceScale::new(100.0, 300.0)));
    }

    #[test]
    fn load_order_does_not_matter() {
        let mut a = AppState::new(ViewConfig::default());
        a.set_listings(rows());
        a.set_boroughs(BoroughMap::from_geojson(TWO_SQUARES, "boro_name").unwrap());

        let mut b = AppState::new(ViewConfig::default());
        b.set_boroughs(BoroughMap::from_geojson(TWO_SQUARES, "boro_name").unwrap());
        b.set_listings(rows());

        let (a, b) = (a.crossfilter.unwrap(), b.crossfilter.unwrap());
        assert_eq!(a.view(), b.view());
        assert_eq!(a.points(), b.points());
    }

    #[test]
    fn zoom_error_goes_to_status_line_and_camera_stays() {
        let mut state = AppState::new(ViewConfig::default());
        state.set_listings(rows());
        state.set_boroughs(BoroughMap::from_geojson(TWO_SQUARES, "boro_name").unwrap());
        state.camera.frame_bounds(0.0);

        let update = state
            .handle(SelectionEvent::NeighborhoodChosen(Choice::from("Gamma")), 1.0)
            .unwrap();
        assert!(update.zoom.is_err());
        assert!(!state.camera.is_animating());
        assert!(state.status_message.unwrap().contains("Gamma"));
    }

    #[test]
    fn room_type_change_keeps_the_users_pan() {
        let mut state = AppState::new(ViewConfig::default());
        state.set_listings(rows());
        state.set_boroughs(BoroughMap::from_geojson(TWO_SQUARES, "boro_name").unwrap());
        state.camera.frame_bounds(0.0);
        let panned = Rect::new(Coord { x: 100.0, y: 50.0 }, Coord { x: 500.0, y: 225.0 });
        state.camera.observe(panned);

        let update = state
            .handle(SelectionEvent::RoomTypeChosen("Private room".into()), 1.0)
            .unwrap();
        assert_eq!(update.zoom, Ok(None));
        assert!(!state.camera.is_animating());
        assert_eq!(state.camera.sample(2.0), panned);
        assert_eq!(state.camera.frame_bounds(2.0), None);

        state.handle(SelectionEvent::NeighborhoodChosen(Choice::All), 3.0);
        assert!(!state.camera.is_animating());
        assert_eq!(state.camera.sample(3.0), panned);
    }

    #[test]
    fn borough_click_starts_camera_transition() {
        let mut state = AppState::new(ViewConfig::default());
        state.set_listings(rows());
        state.set_boroughs(BoroughMap::from_geojson(TWO_SQUARES, "boro_name").unwrap());

        let update = state.handle(SelectionEvent::BoroughClicked("East".into()), 0.0).unwrap();
        assert_eq!(update.listings_count, 1);
        assert!(state.camera.is_animating());
    }

    #[test]
    fn events_before_loading_are_ignored() {
        let mut state = AppState::new(ViewConfig::default());
        assert!(state.handle(SelectionEvent::RoomTypeChosen(Choice::All), 0.0).is_none());
    }

    #[test]
    fn failed_load_is_reported() {
        let mut state = AppState::new(ViewConfig::default());
        state.open_listings(Path::new("/nonexistent/listings.csv"));
        assert!(!state.has_listings());
        assert!(state.status_message.unwrap().starts_with("Error"));
    }
}
