use geo::{Coord, Rect};

use crate::geography::projection::ViewTransform;

// ---------------------------------------------------------------------------
// Map camera – animated visible region
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
struct Transition {
    from: Rect<f64>,
    to: Rect<f64>,
    started_at: f64,
    duration: f64,
}

/// Tracks which part of the map plane is on screen and eases between
/// regions when the cross-filter asks for a new view transform.
///
/// Times are seconds on the UI clock (`egui::InputState::time`).
#[derive(Debug, Clone, PartialEq)]
pub struct MapCamera {
    frame: [f64; 2],
    shown: Rect<f64>,
    transition: Option<Transition>,
    /// The region must be pushed to the plot on the next frame.
    dirty: bool,
}

impl MapCamera {
    pub fn new(frame: [f64; 2]) -> Self {
        Self {
            frame,
            shown: ViewTransform::IDENTITY.visible_rect(frame),
            transition: None,
            dirty: true,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    /// Record the region the plot actually shows, so a later transition
    /// starts from wherever the user panned to.
    pub fn observe(&mut self, shown: Rect<f64>) {
        if self.transition.is_none() && !self.dirty {
            self.shown = shown;
        }
    }

    /// Start easing towards `target`. A transition already in flight is
    /// replaced, starting from the region it had reached.
    pub fn fly_to(&mut self, target: ViewTransform, now: f64, duration: f64) {
        let from = self.sample(now);
        let to = target.visible_rect(self.frame);
        if duration <= 0.0 {
            self.shown = to;
            self.transition = None;
            self.dirty = true;
            return;
        }
        self.transition = Some(Transition {
            from,
            to,
            started_at: now,
            duration,
        });
    }

    /// Region shown at `now` without advancing any state.
    pub fn sample(&self, now: f64) -> Rect<f64> {
        match &self.transition {
            Some(tr) => region_at(tr, now),
            None => self.shown,
        }
    }

    /// Region to force onto the plot this frame, or `None` when the plot may
    /// keep whatever the user has panned or zoomed to.
    pub fn frame_bounds(&mut self, now: f64) -> Option<Rect<f64>> {
        if let Some(tr) = self.transition {
            self.shown = region_at(&tr, now);
            if progress(&tr, now) >= 1.0 {
                self.transition = None;
            }
            self.dirty = false;
            return Some(self.shown);
        }
        if self.dirty {
            self.dirty = false;
            return Some(self.shown);
        }
        None
    }
}

fn progress(tr: &Transition, now: f64) -> f64 {
    ((now - tr.started_at) / tr.duration).clamp(0.0, 1.0)
}

fn region_at(tr: &Transition, now: f64) -> Rect<f64> {
    let t = progress(tr, now);
    if t >= 1.0 {
        tr.to
    } else {
        lerp_rect(tr.from, tr.to, ease_cubic_in_out(t))
    }
}

fn ease_cubic_in_out(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

fn lerp_rect(a: Rect<f64>, b: Rect<f64>, t: f64) -> Rect<f64> {
    let lerp = |p: Coord<f64>, q: Coord<f64>| Coord {
        x: p.x + (q.x - p.x) * t,
        y: p.y + (q.y - p.y) * t,
    };
    Rect::new(lerp(a.min(), b.min()), lerp(a.max(), b.max()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: [f64; 2] = [800.0, 350.0];

    fn zoomed() -> ViewTransform {
        ViewTransform {
            k: 4.0,
            tx: -400.0,
            ty: -200.0,
        }
    }

    #[test]
    fn first_frame_pushes_full_view_once() {
        let mut camera = MapCamera::new(FRAME);
        assert_eq!(camera.frame_bounds(0.0), Some(ViewTransform::IDENTITY.visible_rect(FRAME)));
        assert_eq!(camera.frame_bounds(0.1), None);
    }

    #[test]
    fn transition_ends_on_target() {
        let mut camera = MapCamera::new(FRAME);
        camera.frame_bounds(0.0);
        camera.fly_to(zoomed(), 1.0, 0.75);
        assert!(camera.is_animating());

        let midway = camera.frame_bounds(1.375).unwrap();
        let start = ViewTransform::IDENTITY.visible_rect(FRAME);
        let end = zoomed().visible_rect(FRAME);
        assert!(midway.width() < start.width() && midway.width() > end.width());

        assert_eq!(camera.frame_bounds(2.0), Some(end));
        assert!(!camera.is_animating());
        assert_eq!(camera.frame_bounds(2.1), None);
    }

    #[test]
    fn retarget_starts_from_current_region() {
        let mut camera = MapCamera::new(FRAME);
        camera.frame_bounds(0.0);
        camera.fly_to(zoomed(), 0.0, 1.0);
        let reached = camera.sample(0.5);
        camera.fly_to(ViewTransform::IDENTITY, 0.5, 1.0);
        assert_eq!(camera.sample(0.5), reached);
    }

    #[test]
    fn zero_duration_jumps() {
        let mut camera = MapCamera::new(FRAME);
        camera.frame_bounds(0.0);
        camera.fly_to(zoomed(), 0.0, 0.0);
        assert!(!camera.is_animating());
        assert_eq!(camera.frame_bounds(0.0), Some(zoomed().visible_rect(FRAME)));
    }

    #[test]
    fn observe_ignored_while_animating() {
        let mut camera = MapCamera::new(FRAME);
        camera.frame_bounds(0.0);
        let panned = Rect::new(Coord { x: 10.0, y: 10.0 }, Coord { x: 20.0, y: 20.0 });
        camera.observe(panned);
        assert_eq!(camera.sample(0.0), panned);

        camera.fly_to(zoomed(), 0.0, 1.0);
        camera.observe(Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }));
        assert_eq!(camera.sample(1.0), zoomed().visible_rect(FRAME));
    }

    #[test]
    fn easing_hits_endpoints() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
        assert!((ease_cubic_in_out(0.5) - 0.5).abs() < 1e-12);
    }
}
