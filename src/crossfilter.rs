use geo::{Coord, Rect};
use thiserror::Error;

use crate::config::ViewConfig;
use crate::data::aggregate::{AggregateBucket, review_buckets};
use crate::data::filter::{Choice, FilterState, filtered_indices};
use crate::data::model::{Listing, LonLat, NormalizedData, RawListing};
use crate::data::normalize::normalize;
use crate::geography::boroughs::BoroughMap;
use crate::geography::projection::{Projection, ViewTransform};

// ---------------------------------------------------------------------------
// Update reporting
// ---------------------------------------------------------------------------

/// Why the map cannot be fitted to the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZoomError {
    #[error("neighbourhood \"{neighborhood}\" is selected without a borough, so there is no region to zoom to")]
    NoBoroughSelected { neighborhood: String },
    #[error("borough \"{0}\" has no boundary in the loaded map")]
    UnknownBorough(String),
}

/// Which renderers must redraw after a filter change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Redraw {
    pub bar: bool,
    pub map: bool,
    pub scatter: bool,
}

impl Redraw {
    pub const ALL: Redraw = Redraw {
        bar: true,
        map: true,
        scatter: true,
    };
    /// Map and scatter: the views drawn from individual listings.
    pub const POINTS: Redraw = Redraw {
        bar: false,
        map: true,
        scatter: true,
    };
}

/// Result of one filter-setting operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewUpdate {
    pub filter: FilterState,
    pub redraw: Redraw,
    /// Number of listings in the filtered map view.
    pub listings_count: usize,
    /// Where the map should move to. `Ok(None)` leaves the map where the
    /// user put it.
    pub zoom: Result<Option<ViewTransform>, ZoomError>,
}

// ---------------------------------------------------------------------------
// FilteredView – the derived data every renderer reads
// ---------------------------------------------------------------------------

/// Indices into [`NormalizedData`] passing the current filter, plus the
/// bar-chart aggregate over them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredView {
    /// Indices into `rated`, under the filter without its neighbourhood selector.
    pub rated: Vec<usize>,
    /// Indices into `mapped`, under the full filter.
    pub mapped: Vec<usize>,
    pub buckets: Vec<AggregateBucket>,
}

impl FilteredView {
    /// Derive the view from scratch. Pure: depends only on its arguments.
    pub fn derive(data: &NormalizedData, filter: &FilterState) -> Self {
        let mut view = FilteredView::default();
        view.refresh(data, filter, Redraw::ALL);
        view
    }

    fn refresh(&mut self, data: &NormalizedData, filter: &FilterState, redraw: Redraw) {
        if redraw.bar {
            // The bar chart picks neighbourhoods itself, so it is not narrowed by one.
            self.rated = filtered_indices(&data.rated, &filter.without_neighborhood());
            self.buckets = review_buckets(self.rated.iter().map(|&i| &data.rated[i]));
        }
        if redraw.map || redraw.scatter {
            self.mapped = filtered_indices(&data.mapped, filter);
        }
    }
}

// ---------------------------------------------------------------------------
// CrossFilter – the coordinator
// ---------------------------------------------------------------------------

/// A borough outline projected onto the map plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    pub name: String,
    /// Exterior rings, one per polygon part.
    pub rings: Vec<Vec<[f64; 2]>>,
}

/// Owns the normalized dataset and the current [`FilterState`], and is the
/// only place the filter changes.
#[derive(Debug, Clone)]
pub struct CrossFilter {
    data: NormalizedData,
    boroughs: BoroughMap,
    projection: Projection,
    /// Plane position of each mapped listing, aligned with `data.mapped`.
    points: Vec<[f64; 2]>,
    outlines: Vec<Outline>,
    config: ViewConfig,
    filter: FilterState,
    view: FilteredView,
}

impl CrossFilter {
    /// Normalize `raws` and join them with the borough map. Listings whose
    /// coordinate lies in no borough are dropped from the map path.
    pub fn new(raws: &[RawListing], boroughs: BoroughMap, config: &ViewConfig) -> Self {
        let mut data = normalize(raws);
        if !boroughs.is_empty() {
            let before = data.mapped.len();
            data.retain_mapped(|l| l.location.is_some_and(|at| boroughs.contains(at)));
            log::info!(
                "{} of {before} mappable listings fall inside a borough",
                data.mapped.len()
            );
        }

        let extent = boroughs.extent().unwrap_or_else(|| {
            Rect::new(Coord { x: -74.26, y: 40.49 }, Coord { x: -73.70, y: 40.92 })
        });
        let projection = Projection::fit(extent, config.map_frame);

        let points = data
            .mapped
            .iter()
            .map(|l| {
                let at = l.location.unwrap_or(LonLat::new(extent.center().x, extent.center().y));
                let p = projection.project(at);
                [p.x, p.y]
            })
            .collect();

        let outlines = boroughs
            .iter()
            .map(|b| Outline {
                name: b.name.clone(),
                rings: b
                    .shape
                    .iter()
                    .map(|polygon| {
                        polygon
                            .exterior()
                            .coords()
                            .map(|c| {
                                let p = projection.project(LonLat::new(c.x, c.y));
                                [p.x, p.y]
                            })
                            .collect()
                    })
                    .collect(),
            })
            .collect();

        let filter = FilterState::default();
        let view = FilteredView::derive(&data, &filter);
        CrossFilter {
            data,
            boroughs,
            projection,
            points,
            outlines,
            config: config.clone(),
            filter,
            view,
        }
    }

    pub fn data(&self) -> &NormalizedData {
        &self.data
    }

    pub fn boroughs(&self) -> &BoroughMap {
        &self.boroughs
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    pub fn outlines(&self) -> &[Outline] {
        &self.outlines
    }

    /// The listing on the map whose point lies nearest `at`, if one is
    /// within `radius` plane units. Only listings passing the filter count.
    pub fn nearest_listing(&self, at: [f64; 2], radius: f64) -> Option<&Listing> {
        self.view
            .mapped
            .iter()
            .map(|&i| {
                let [x, y] = self.points[i];
                (i, (x - at[0]).powi(2) + (y - at[1]).powi(2))
            })
            .filter(|&(_, d2)| d2 <= radius * radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| &self.data.mapped[i])
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn view(&self) -> &FilteredView {
        &self.view
    }

    pub fn listings_count(&self) -> usize {
        self.view.mapped.len()
    }

    /// "Update bar chart by borough": select a borough or clear with `All`.
    pub fn set_borough_filter(&mut self, choice: Choice) -> ViewUpdate {
        let next = self.filter.with_borough(choice);
        let mut update = self.apply(next, Redraw::ALL);
        // Clearing the borough zooms back out to the whole city.
        if let Ok(zoom @ None) = &mut update.zoom {
            *zoom = Some(ViewTransform::IDENTITY);
        }
        update
    }

    /// "Update map by neighbourhood".
    pub fn set_neighborhood_filter(&mut self, choice: Choice) -> ViewUpdate {
        let next = self.filter.with_neighborhood(choice);
        self.apply(next, Redraw::POINTS)
    }

    /// "Update map by room type".
    pub fn set_room_type_filter(&mut self, choice: Choice) -> ViewUpdate {
        let next = self.filter.with_room_type(choice);
        self.apply(next, Redraw::ALL)
    }

    fn apply(&mut self, next: FilterState, redraw: Redraw) -> ViewUpdate {
        log::debug!("Filter changed: {next}");
        self.view.refresh(&self.data, &next, redraw);
        self.filter = next;
        ViewUpdate {
            filter: self.filter.clone(),
            redraw,
            listings_count: self.listings_count(),
            zoom: self.zoom_target(),
        }
    }

    /// Transform fitting the selected borough into the map frame, or `None`
    /// when nothing spatial is selected.
    pub fn zoom_target(&self) -> Result<Option<ViewTransform>, ZoomError> {
        match (&self.filter.borough, &self.filter.neighborhood) {
            (Some(name), _) => {
                let bounds = self
                    .boroughs
                    .find(name)
                    .and_then(|b| b.bounds())
                    .ok_or_else(|| ZoomError::UnknownBorough(name.clone()))?;
                Ok(Some(ViewTransform::fit(
                    self.projection.project_rect(bounds),
                    self.config.map_frame,
                    self.config.fit_padding,
                    self.config.max_zoom,
                )))
            }
            (None, Some(neighborhood)) => Err(ZoomError::NoBoroughSelected {
                neighborhood: neighborhood.clone(),
            }),
            (None, None) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geography::boroughs::tests::TWO_SQUARES;

    fn row(
        borough: &str,
        neighborhood: &str,
        room: &str,
        review: &str,
        lon: f64,
        lat: f64,
    ) -> RawListing {
        RawListing {
            borough: borough.to_string(),
            neighborhood: neighborhood.to_string(),
            room_type: room.to_string(),
            review_score: review.to_string(),
            price: "$100".to_string(),
            longitude: lon.to_string(),
            latitude: lat.to_string(),
            ..RawListing::default()
        }
    }

    fn fixture() -> CrossFilter {
        let rows = vec![
            row("West", "Alpha", "Private room", "2", -73.95, 40.65),
            row("West", "Alpha", "Entire home/apt", "4", -73.96, 40.66),
            row("West", "Beta", "Private room", "5", -73.97, 40.64),
            row("East", "Gamma", "Private room", "1", -73.85, 40.65),
            row("East", "Gamma", "Shared room", "3", -73.84, 40.62),
            // Outside both squares: rated, but never on the map.
            row("East", "Delta", "Private room", "4", -73.50, 40.65),
        ];
        let boroughs = BoroughMap::from_geojson(TWO_SQUARES, "boro_name").unwrap();
        CrossFilter::new(&rows, boroughs, &ViewConfig::default())
    }

    #[test]
    fn points_outside_boroughs_are_not_mapped() {
        let cf = fixture();
        assert_eq!(cf.data().rated.len(), 6);
        assert_eq!(cf.data().mapped.len(), 5);
        assert_eq!(cf.points().len(), 5);
        assert_eq!(cf.listings_count(), 5);
        assert_eq!(cf.outlines().len(), 2);
    }

    #[test]
    fn room_type_alone_matches_every_listing_of_that_type() {
        let mut cf = fixture();
        let update = cf.set_room_type_filter("Private room".into());
        assert_eq!(update.listings_count, 3);
        assert!(update.redraw.bar && update.redraw.map && update.redraw.scatter);
        assert_eq!(update.zoom, Ok(None));
        assert!(cf
            .view()
            .mapped
            .iter()
            .all(|&i| cf.data().mapped[i].room_type == "Private room"));
    }

    #[test]
    fn borough_then_all_restores_everything() {
        let mut cf = fixture();
        let initial = cf.view().clone();

        let update = cf.set_borough_filter("West".into());
        assert_eq!(update.listings_count, 3);
        assert_eq!(cf.view().buckets.len(), 2);
        // The square fills the frame height, so the fit is the padding itself.
        let zoom = update.zoom.unwrap().unwrap();
        assert!((zoom.k - 0.9).abs() < 1e-9);

        let update = cf.set_borough_filter(Choice::All);
        assert_eq!(update.zoom, Ok(Some(ViewTransform::IDENTITY)));
        assert_eq!(cf.view(), &initial);
    }

    #[test]
    fn neighborhood_narrows_points_but_not_bars() {
        let mut cf = fixture();
        cf.set_borough_filter("West".into());
        let bars_before = cf.view().buckets.clone();

        let update = cf.set_neighborhood_filter("Alpha".into());
        assert_eq!(update.redraw, Redraw::POINTS);
        assert_eq!(update.listings_count, 2);
        assert_eq!(cf.view().buckets, bars_before);
        assert!(matches!(update.zoom, Ok(Some(_))));
    }

    #[test]
    fn neighborhood_without_borough_is_reported() {
        let mut cf = fixture();
        let update = cf.set_neighborhood_filter("Gamma".into());
        assert_eq!(update.listings_count, 2);
        assert_eq!(
            update.zoom,
            Err(ZoomError::NoBoroughSelected {
                neighborhood: "Gamma".to_string()
            })
        );
        let cleared = cf.set_neighborhood_filter(Choice::All);
        assert_eq!(cleared.zoom, Ok(None));
        assert_eq!(cleared.listings_count, 5);
    }

    #[test]
    fn unknown_borough_is_reported() {
        let mut cf = fixture();
        let update = cf.set_borough_filter("Staten Island".into());
        assert_eq!(update.listings_count, 0);
        assert_eq!(update.zoom, Err(ZoomError::UnknownBorough("Staten Island".to_string())));
    }

    const MAINLAND_AND_ISLET: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "properties": { "boro_name": "Mainland" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-74.2, 40.5], [-73.7, 40.5], [-73.7, 40.9], [-74.2, 40.9], [-74.2, 40.5]]]
                }
            },
            {
                "properties": { "boro_name": "Islet" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-74.0, 40.7], [-73.999, 40.7], [-73.999, 40.701], [-74.0, 40.701], [-74.0, 40.7]]]
                }
            }
        ]
    }"#;

    #[test]
    fn zoom_respects_configured_ceiling() {
        let rows = vec![row("Islet", "Rock", "Private room", "3", -73.9995, 40.7005)];

        let boroughs = BoroughMap::from_geojson(MAINLAND_AND_ISLET, "boro_name").unwrap();
        let mut cf = CrossFilter::new(&rows, boroughs, &ViewConfig::default());
        let zoom = cf.set_borough_filter("Islet".into()).zoom.unwrap().unwrap();
        assert_eq!(zoom.k, 8.0);

        let boroughs = BoroughMap::from_geojson(MAINLAND_AND_ISLET, "boro_name").unwrap();
        let config = ViewConfig {
            max_zoom: 3.0,
            ..ViewConfig::default()
        };
        let mut cf = CrossFilter::new(&rows, boroughs, &config);
        let update = cf.set_borough_filter("Islet".into());
        assert_eq!(update.zoom.unwrap().unwrap().k, 3.0);
        assert_eq!(update.listings_count, 1);
    }

    #[test]
    fn map_stays_put_without_a_borough() {
        let mut cf = fixture();
        assert_eq!(cf.set_room_type_filter("Shared room".into()).zoom, Ok(None));
        assert_eq!(cf.set_room_type_filter(Choice::All).zoom, Ok(None));

        cf.set_borough_filter("East".into());
        let update = cf.set_room_type_filter("Shared room".into());
        assert!(matches!(update.zoom, Ok(Some(t)) if t != ViewTransform::IDENTITY));
    }

    #[test]
    fn hover_finds_the_nearest_visible_listing() {
        let mut cf = fixture();
        let [x, y] = cf.points()[0];
        let near = |cf: &CrossFilter, at| cf.nearest_listing(at, 6.0).map(|l| l.review_score);

        assert_eq!(near(&cf, [x + 1.0, y]), Some(Some(2.0)));
        assert_eq!(near(&cf, [x + 100.0, y + 100.0]), None);

        // The nearest point is filtered out and the next one is too far.
        cf.set_room_type_filter("Shared room".into());
        assert_eq!(near(&cf, [x + 1.0, y]), None);
    }

    #[test]
    fn filter_order_does_not_matter() {
        let mut a = fixture();
        a.set_borough_filter("West".into());
        a.set_room_type_filter("Private room".into());

        let mut b = fixture();
        b.set_room_type_filter("Private room".into());
        b.set_borough_filter("West".into());

        assert_eq!(a.filter(), b.filter());
        assert_eq!(a.view(), b.view());
    }

    #[test]
    fn derive_matches_incremental_updates() {
        let mut cf = fixture();
        cf.set_borough_filter("East".into());
        cf.set_neighborhood_filter("Gamma".into());
        cf.set_room_type_filter("Private room".into());
        assert_eq!(cf.view(), &FilteredView::derive(cf.data(), cf.filter()));
    }
}
