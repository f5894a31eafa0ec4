use super::model::{Listing, LonLat, NormalizedData, RawListing};

// ---------------------------------------------------------------------------
// Category correction
// ---------------------------------------------------------------------------

/// Known misspellings of borough names in the published dataset.
const BOROUGH_CORRECTIONS: &[(&str, &str)] = &[("brookln", "Brooklyn"), ("manhatan", "Manhattan")];

/// Canonical spelling of a borough name. Values not in the correction table
/// pass through unchanged.
pub fn canonical_borough(name: &str) -> &str {
    BOROUGH_CORRECTIONS
        .iter()
        .find(|(wrong, _)| *wrong == name)
        .map(|(_, right)| *right)
        .unwrap_or(name)
}

// ---------------------------------------------------------------------------
// Numeric coercion
// ---------------------------------------------------------------------------

/// Parse a trimmed cell as a finite number. Empty cells are `None`.
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a price such as `"$1,060 "`: currency symbols and thousands
/// separators are stripped, and the result must be non-negative.
pub fn parse_price(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| !matches!(c, '$' | ',')).collect();
    parse_number(&cleaned).filter(|p| *p >= 0.0)
}

fn parse_year(text: &str) -> Option<i32> {
    parse_number(text)
        .filter(|y| y.fract() == 0.0 && *y >= f64::from(i32::MIN) && *y <= f64::from(i32::MAX))
        .map(|y| y as i32)
}

fn parse_location(lon: &str, lat: &str) -> Option<LonLat> {
    Some(LonLat::new(parse_number(lon)?, parse_number(lat)?))
}

/// Clean one raw row. Never fails: fields that do not parse become `None`.
pub fn clean_listing(raw: &RawListing) -> Listing {
    Listing {
        id: raw.id.trim().to_string(),
        name: raw.name.trim().to_string(),
        borough: canonical_borough(raw.borough.trim()).to_string(),
        neighborhood: raw.neighborhood.trim().to_string(),
        room_type: raw.room_type.trim().to_string(),
        price: parse_price(&raw.price),
        review_score: parse_number(&raw.review_score),
        construction_year: parse_year(&raw.construction_year),
        location: parse_location(&raw.longitude, &raw.latitude),
    }
}

// ---------------------------------------------------------------------------
// Validity rules
// ---------------------------------------------------------------------------

/// Bar-chart path: named borough and neighbourhood, positive review score.
pub fn is_rated(listing: &Listing) -> bool {
    !listing.borough.is_empty()
        && !listing.neighborhood.is_empty()
        && listing.review_score.is_some_and(|s| s > 0.0)
}

/// Map path: positive price and a coordinate in the western/northern
/// hemisphere quadrant the city lies in.
pub fn is_mappable(listing: &Listing) -> bool {
    listing.price.is_some_and(|p| p > 0.0)
        && listing
            .location
            .is_some_and(|loc| loc.lon < 0.0 && loc.lat > 0.0)
}

/// Clean every row and split the result into the rated and mapped sets.
/// Rows failing a path's rule are silently left out of that path.
pub fn normalize<'a>(raws: impl IntoIterator<Item = &'a RawListing>) -> NormalizedData {
    let mut rated = Vec::new();
    let mut mapped = Vec::new();
    let mut total = 0usize;

    for raw in raws {
        total += 1;
        let listing = clean_listing(raw);
        match (is_rated(&listing), is_mappable(&listing)) {
            (true, true) => {
                rated.push(listing.clone());
                mapped.push(listing);
            }
            (true, false) => rated.push(listing),
            (false, true) => mapped.push(listing),
            (false, false) => {}
        }
    }

    log::info!(
        "Normalized {total} rows: {} rated, {} mappable",
        rated.len(),
        mapped.len()
    );
    NormalizedData::new(rated, mapped)
}
