use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Source column names
// ---------------------------------------------------------------------------

/// Column headers of the listings table, as published in the Airbnb open data dump.
pub mod columns {
    pub const ID: &str = "id";
    pub const NAME: &str = "NAME";
    pub const BOROUGH: &str = "neighbourhood group";
    pub const NEIGHBORHOOD: &str = "neighbourhood";
    pub const ROOM_TYPE: &str = "room type";
    pub const PRICE: &str = "price";
    pub const REVIEW_SCORE: &str = "review rate number";
    pub const CONSTRUCTION_YEAR: &str = "Construction year";
    pub const LONGITUDE: &str = "long";
    pub const LATITUDE: &str = "lat";
}

// ---------------------------------------------------------------------------
// RawListing – one row exactly as read from the file
// ---------------------------------------------------------------------------

/// A listing row before any cleaning. Every cell is kept as text so that a
/// malformed value never fails the whole file; the normalizer decides what
/// to keep.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawListing {
    pub id: String,
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "neighbourhood group")]
    pub borough: String,
    #[serde(rename = "neighbourhood")]
    pub neighborhood: String,
    #[serde(rename = "room type")]
    pub room_type: String,
    pub price: String,
    #[serde(rename = "review rate number")]
    pub review_score: String,
    #[serde(rename = "Construction year")]
    pub construction_year: String,
    #[serde(rename = "long")]
    pub longitude: String,
    #[serde(rename = "lat")]
    pub latitude: String,
}

impl RawListing {
    /// Build a row from a column lookup. Used by the loaders whose cells are
    /// not plain strings (JSON records, Parquet batches).
    pub fn from_lookup(mut cell: impl FnMut(&str) -> String) -> Self {
        RawListing {
            id: cell(columns::ID),
            name: cell(columns::NAME),
            borough: cell(columns::BOROUGH),
            neighborhood: cell(columns::NEIGHBORHOOD),
            room_type: cell(columns::ROOM_TYPE),
            price: cell(columns::PRICE),
            review_score: cell(columns::REVIEW_SCORE),
            construction_year: cell(columns::CONSTRUCTION_YEAR),
            longitude: cell(columns::LONGITUDE),
            latitude: cell(columns::LATITUDE),
        }
    }
}

// ---------------------------------------------------------------------------
// Listing – a cleaned row
// ---------------------------------------------------------------------------

/// A geographic coordinate in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        LonLat { lon, lat }
    }
}

/// A normalized listing. Categorical fields are trimmed and the borough is
/// spelled canonically; numeric fields are `None` when the source cell did
/// not parse.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub id: String,
    pub name: String,
    pub borough: String,
    pub neighborhood: String,
    pub room_type: String,
    /// Nightly price in dollars.
    pub price: Option<f64>,
    /// Review rate number (1–5 in the published data).
    pub review_score: Option<f64>,
    pub construction_year: Option<i32>,
    pub location: Option<LonLat>,
}

/// Multi-line summary shown when hovering a listing on the map.
impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn or_missing<T: fmt::Display>(value: Option<T>) -> String {
            value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
        }

        writeln!(f, "Borough: {}", self.borough)?;
        writeln!(f, "Neighbourhood: {}", self.neighborhood)?;
        writeln!(f, "Price: {}", or_missing(self.price.map(|p| format!("${p:.0}"))))?;
        writeln!(f, "Room type: {}", self.room_type)?;
        writeln!(f, "Review rate number: {}", or_missing(self.review_score))?;
        write!(f, "Construction year: {}", or_missing(self.construction_year))
    }
}

// ---------------------------------------------------------------------------
// Catalog – distinct categorical values, for populating controls
// ---------------------------------------------------------------------------

/// Sorted distinct values of the three filterable columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub boroughs: BTreeSet<String>,
    /// Borough → neighbourhoods observed in it.
    pub neighborhoods: BTreeMap<String, BTreeSet<String>>,
    pub room_types: BTreeSet<String>,
}

impl Catalog {
    pub fn from_listings<'a>(listings: impl IntoIterator<Item = &'a Listing>) -> Self {
        let mut catalog = Catalog::default();
        for listing in listings {
            if !listing.borough.is_empty() {
                catalog.boroughs.insert(listing.borough.clone());
                if !listing.neighborhood.is_empty() {
                    catalog
                        .neighborhoods
                        .entry(listing.borough.clone())
                        .or_default()
                        .insert(listing.neighborhood.clone());
                }
            }
            if !listing.room_type.is_empty() {
                catalog.room_types.insert(listing.room_type.clone());
            }
        }
        catalog
    }

    /// Neighbourhoods of one borough, or of every borough when `None`.
    pub fn neighborhoods_in(&self, borough: Option<&str>) -> BTreeSet<&str> {
        match borough {
            Some(b) => self
                .neighborhoods
                .get(b)
                .map(|set| set.iter().map(String::as_str).collect())
                .unwrap_or_default(),
            None => self
                .neighborhoods
                .values()
                .flatten()
                .map(String::as_str)
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// NormalizedData – the complete cleaned dataset
// ---------------------------------------------------------------------------

/// The cleaned dataset, split by the path each chart needs.
///
/// `rated` feeds the review aggregate (bar chart); `mapped` feeds the map and
/// the scatter plot. A listing may appear in both.
#[derive(Debug, Clone, Default)]
pub struct NormalizedData {
    pub rated: Vec<Listing>,
    pub mapped: Vec<Listing>,
    pub catalog: Catalog,
}

impl NormalizedData {
    pub fn new(rated: Vec<Listing>, mapped: Vec<Listing>) -> Self {
        let catalog = Catalog::from_listings(rated.iter().chain(mapped.iter()));
        NormalizedData {
            rated,
            mapped,
            catalog,
        }
    }

    /// Keep only the mapped listings that satisfy `keep`. The catalog is
    /// rebuilt so controls never offer a value with no listings behind it.
    pub fn retain_mapped(&mut self, keep: impl FnMut(&Listing) -> bool) {
        self.mapped.retain(keep);
        self.catalog = Catalog::from_listings(self.rated.iter().chain(self.mapped.iter()));
    }

    /// Smallest and largest price over the mapped set.
    pub fn price_extent(&self) -> Option<(f64, f64)> {
        self.mapped
            .iter()
            .filter_map(|l| l.price)
            .fold(None, |acc, p| match acc {
                None => Some((p, p)),
                Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
            })
    }
}
