use anyhow::{Context, Result, bail};
use geo::{BoundingRect, Contains, Coord, LineString, MultiPolygon, Point, Polygon, Rect};
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use crate::data::model::LonLat;

// ---------------------------------------------------------------------------
// GeoJSON wire shapes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    properties: Option<Map<String, JsonValue>>,
    geometry: Option<Geometry>,
}

/// Positions are kept as `Vec<f64>` because GeoJSON allows an optional
/// third (altitude) element.
#[derive(Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
    #[serde(other)]
    Unsupported,
}

fn to_ring(positions: &[Vec<f64>]) -> Result<LineString<f64>> {
    positions
        .iter()
        .map(|p| match p.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => bail!("position has {} element(s), expected at least 2", p.len()),
        })
        .collect::<Result<Vec<_>>>()
        .map(LineString::new)
}

fn to_polygon(rings: &[Vec<Vec<f64>>]) -> Result<Option<Polygon<f64>>> {
    let Some((exterior, holes)) = rings.split_first() else {
        return Ok(None);
    };
    let interiors = holes.iter().map(|r| to_ring(r)).collect::<Result<Vec<_>>>()?;
    Ok(Some(Polygon::new(to_ring(exterior)?, interiors)))
}

fn to_shape(geometry: &Geometry) -> Result<Option<MultiPolygon<f64>>> {
    let polygons: Vec<Polygon<f64>> = match geometry {
        Geometry::Polygon { coordinates } => to_polygon(coordinates)?.into_iter().collect(),
        Geometry::MultiPolygon { coordinates } => coordinates
            .iter()
            .map(|p| to_polygon(p))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .flatten()
            .collect(),
        Geometry::Unsupported => return Ok(None),
    };
    Ok(Some(MultiPolygon::new(polygons)))
}

fn property_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// BoroughMap
// ---------------------------------------------------------------------------

/// One named borough boundary in lon/lat degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct Borough {
    pub name: String,
    pub shape: MultiPolygon<f64>,
}

impl Borough {
    pub fn contains(&self, at: LonLat) -> bool {
        self.shape.contains(&Point::new(at.lon, at.lat))
    }

    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.shape.bounding_rect()
    }
}

/// All borough boundaries of the city, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoroughMap {
    boroughs: Vec<Borough>,
}

impl BoroughMap {
    /// Parse a GeoJSON `FeatureCollection`. Each feature's display name is
    /// read from `name_property`; features without a name or without polygon
    /// geometry are skipped with a warning.
    pub fn from_geojson(text: &str, name_property: &str) -> Result<Self> {
        let collection: FeatureCollection =
            serde_json::from_str(text).context("parsing GeoJSON feature collection")?;

        let mut boroughs = Vec::with_capacity(collection.features.len());
        for (i, feature) in collection.features.iter().enumerate() {
            let name = feature
                .properties
                .as_ref()
                .and_then(|props| props.get(name_property))
                .and_then(property_text);
            let Some(name) = name else {
                log::warn!("Feature {i}: no '{name_property}' property, skipped");
                continue;
            };
            let shape = match &feature.geometry {
                Some(geometry) => {
                    to_shape(geometry).with_context(|| format!("Feature {i} ({name}): bad geometry"))?
                }
                None => None,
            };
            let Some(shape) = shape else {
                log::warn!("Feature {i} ({name}): not a polygon, skipped");
                continue;
            };
            boroughs.push(Borough { name, shape });
        }

        if boroughs.is_empty() {
            bail!("GeoJSON contains no named polygon features");
        }
        Ok(BoroughMap { boroughs })
    }

    pub fn len(&self) -> usize {
        self.boroughs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boroughs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Borough> {
        self.boroughs.iter()
    }

    pub fn find(&self, name: &str) -> Option<&Borough> {
        self.boroughs.iter().find(|b| b.name == name)
    }

    /// The borough whose boundary contains `at`, if any.
    pub fn locate(&self, at: LonLat) -> Option<&Borough> {
        self.boroughs.iter().find(|b| b.contains(at))
    }

    pub fn contains(&self, at: LonLat) -> bool {
        self.locate(at).is_some()
    }

    /// Bounding box of every borough together.
    pub fn extent(&self) -> Option<Rect<f64>> {
        self.boroughs
            .iter()
            .filter_map(Borough::bounds)
            .reduce(|a, b| {
                Rect::new(
                    Coord {
                        x: a.min().x.min(b.min().x),
                        y: a.min().y.min(b.min().y),
                    },
                    Coord {
                        x: a.max().x.max(b.max().x),
                        y: a.max().y.max(b.max().y),
                    },
                )
            })
    }
}
