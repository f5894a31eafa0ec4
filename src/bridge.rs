use crate::crossfilter::{CrossFilter, ViewUpdate};
use crate::data::filter::Choice;

/// A user interaction reported by one of the views.
///
/// Renderers never touch the filter themselves; they hand one of these back
/// to the frame loop, which routes it through [`dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    /// A borough outline was clicked on the map.
    BoroughClicked(String),
    /// A neighbourhood bar was clicked in the bar chart.
    NeighborhoodClicked(String),
    BoroughChosen(Choice),
    NeighborhoodChosen(Choice),
    RoomTypeChosen(Choice),
}

impl SelectionEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            SelectionEvent::BoroughClicked(_) => "map click",
            SelectionEvent::NeighborhoodClicked(_) => "bar click",
            SelectionEvent::BoroughChosen(_) => "borough selector",
            SelectionEvent::NeighborhoodChosen(_) => "neighbourhood selector",
            SelectionEvent::RoomTypeChosen(_) => "room type selector",
        }
    }
}

/// Route an interaction to the matching cross-filter operation.
///
/// Clicking the borough that is already selected clears it, so a second
/// click on the map zooms back out.
pub fn dispatch(crossfilter: &mut CrossFilter, event: SelectionEvent) -> ViewUpdate {
    log::debug!("Selection from {}: {event:?}", event.kind());
    match event {
        SelectionEvent::BoroughClicked(name) => {
            let choice = if crossfilter.filter().borough.as_deref() == Some(name.as_str()) {
                Choice::All
            } else {
                Choice::Only(name)
            };
            crossfilter.set_borough_filter(choice)
        }
        SelectionEvent::NeighborhoodClicked(name) => {
            crossfilter.set_neighborhood_filter(Choice::Only(name))
        }
        SelectionEvent::BoroughChosen(choice) => crossfilter.set_borough_filter(choice),
        SelectionEvent::NeighborhoodChosen(choice) => crossfilter.set_neighborhood_filter(choice),
        SelectionEvent::RoomTypeChosen(choice) => crossfilter.set_room_type_filter(choice),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewConfig;
    use crate::crossfilter::Redraw;
    use crate::data::model::RawListing;
    use crate::geography::boroughs::BoroughMap;
    use crate::geography::boroughs::tests::TWO_SQUARES;
    use crate::geography::projection::ViewTransform;

    fn crossfilter() -> CrossFilter {
        let row = |borough: &str, neighborhood: &str, lon: f64| RawListing {
            borough: borough.to_string(),
            neighborhood: neighborhood.to_string(),
            room_type: "Private room".to_string(),
            review_score: "4".to_string(),
            price: "$80".to_string(),
            longitude: lon.to_string(),
            latitude: "40.65".to_string(),
            ..RawListing::default()
        };
        let rows = vec![
            row("West", "Alpha", -73.95),
            row("West", "Beta", -73.96),
            row("East", "Gamma", -73.85),
        ];
        let boroughs = BoroughMap::from_geojson(TWO_SQUARES, "boro_name").unwrap();
        CrossFilter::new(&rows, boroughs, &ViewConfig::default())
    }

    #[test]
    fn map_click_selects_then_clears_borough() {
        let mut cf = crossfilter();
        let update = dispatch(&mut cf, SelectionEvent::BoroughClicked("West".into()));
        assert_eq!(update.filter.borough.as_deref(), Some("West"));
        assert_eq!(update.listings_count, 2);
        assert!(matches!(update.zoom, Ok(Some(t)) if t != ViewTransform::IDENTITY));

        let update = dispatch(&mut cf, SelectionEvent::BoroughClicked("West".into()));
        assert_eq!(update.filter.borough, None);
        assert_eq!(update.listings_count, 3);
        assert_eq!(update.zoom, Ok(Some(ViewTransform::IDENTITY)));
    }

    #[test]
    fn bar_click_selects_neighborhood() {
        let mut cf = crossfilter();
        dispatch(&mut cf, SelectionEvent::BoroughChosen("West".into()));
        let update = dispatch(&mut cf, SelectionEvent::NeighborhoodClicked("Beta".into()));
        assert_eq!(update.filter.neighborhood.as_deref(), Some("Beta"));
        assert_eq!(update.redraw, Redraw::POINTS);
        assert_eq!(update.listings_count, 1);
    }

    #[test]
    fn selector_all_clears() {
        let mut cf = crossfilter();
        dispatch(&mut cf, SelectionEvent::RoomTypeChosen("Shared room".into()));
        assert_eq!(cf.listings_count(), 0);
        let update = dispatch(&mut cf, SelectionEvent::RoomTypeChosen(Choice::All));
        assert!(update.filter.is_empty());
        assert_eq!(update.listings_count, 3);
    }
}
