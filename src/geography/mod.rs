//! Borough boundaries and the map plane they are drawn on.
//!
//! ```text
//!   GeoJSON ──► BoroughMap (lon/lat MultiPolygons)
//!                    │  extent
//!                    ▼
//!               Projection ──► map plane (frame units, y up)
//!                    │  borough bounds
//!                    ▼
//!               ViewTransform (pan + zoom, clamped)
//! ```

pub mod boroughs;
pub mod projection;
