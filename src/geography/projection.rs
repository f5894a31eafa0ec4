use geo::{Coord, Rect};

use crate::data::model::LonLat;

// ---------------------------------------------------------------------------
// Projection – lon/lat → map plane
// ---------------------------------------------------------------------------

/// Equirectangular projection scaled to fit a geographic extent inside a
/// drawing frame of `frame[0] × frame[1]` units.
///
/// Longitude is shrunk by `cos(latitude)` at the extent's centre so shapes
/// keep their proportions at city scale. The plane's y axis points north.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    center: Coord<f64>,
    lon_factor: f64,
    scale: f64,
    frame: [f64; 2],
}

impl Projection {
    pub fn fit(extent: Rect<f64>, frame: [f64; 2]) -> Self {
        let center = extent.center();
        let lon_factor = center.y.to_radians().cos().abs().max(f64::EPSILON);

        let span_x = extent.width() * lon_factor;
        let span_y = extent.height();
        let sx = if span_x > 0.0 { frame[0] / span_x } else { f64::INFINITY };
        let sy = if span_y > 0.0 { frame[1] / span_y } else { f64::INFINITY };
        let scale = sx.min(sy);

        Projection {
            center,
            lon_factor,
            scale: if scale.is_finite() { scale } else { 1.0 },
            frame,
        }
    }

    pub fn project(&self, at: LonLat) -> Coord<f64> {
        Coord {
            x: self.frame[0] / 2.0 + (at.lon - self.center.x) * self.lon_factor * self.scale,
            y: self.frame[1] / 2.0 + (at.lat - self.center.y) * self.scale,
        }
    }

    pub fn invert(&self, p: Coord<f64>) -> LonLat {
        LonLat::new(
            self.center.x + (p.x - self.frame[0] / 2.0) / (self.lon_factor * self.scale),
            self.center.y + (p.y - self.frame[1] / 2.0) / self.scale,
        )
    }

    /// Project a geographic bounding box. The projection is monotonic on both
    /// axes, so projecting the two corners is exact.
    pub fn project_rect(&self, rect: Rect<f64>) -> Rect<f64> {
        let min = self.project(LonLat::new(rect.min().x, rect.min().y));
        let max = self.project(LonLat::new(rect.max().x, rect.max().y));
        Rect::new(min, max)
    }
}

// ---------------------------------------------------------------------------
// ViewTransform – pan + zoom over the map plane
// ---------------------------------------------------------------------------

/// Uniform scale `k` followed by translation `(tx, ty)`, mapping map-plane
/// coordinates into the drawing frame: `p' = k · p + t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub k: f64,
    pub tx: f64,
    pub ty: f64,
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        k: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Centre `bounds` in the frame, scaled so it fills `padding` of the
    /// tighter frame dimension. The scale never exceeds `max_scale`.
    pub fn fit(bounds: Rect<f64>, frame: [f64; 2], padding: f64, max_scale: f64) -> Self {
        let ratio = (bounds.width() / frame[0]).max(bounds.height() / frame[1]);
        let k = if ratio > 0.0 {
            (padding / ratio).min(max_scale)
        } else {
            max_scale
        };
        let center = bounds.center();
        ViewTransform {
            k,
            tx: frame[0] / 2.0 - k * center.x,
            ty: frame[1] / 2.0 - k * center.y,
        }
    }

    pub fn apply(&self, p: Coord<f64>) -> Coord<f64> {
        Coord {
            x: self.k * p.x + self.tx,
            y: self.k * p.y + self.ty,
        }
    }

    /// The region of the map plane that lands inside the frame.
    pub fn visible_rect(&self, frame: [f64; 2]) -> Rect<f64> {
        Rect::new(
            Coord {
                x: -self.tx / self.k,
                y: -self.ty / self.k,
            },
            Coord {
                x: (frame[0] - self.tx) / self.k,
                y: (frame[1] - self.ty) / self.k,
            },
        )
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
