use eframe::egui::{self, Align2, Color32, RichText, Sense, Stroke, Ui};
use egui_plot::{Plot, PlotBounds, PlotPoint, PlotPoints, Points, Polygon, Text};
use geo::{Coord, Rect};

use crate::bridge::SelectionEvent;
use crate::color::{ChartColors, PriceScale};
use crate::state::AppState;

/// Points are drawn in this many colour bands instead of one series each.
const PRICE_BANDS: usize = 16;
/// How close, in screen pixels, the pointer must be to hover a listing.
const HOVER_RADIUS_PX: f64 = 6.0;

// ---------------------------------------------------------------------------
// Map – borough outlines and listing points
// ---------------------------------------------------------------------------

/// Render the map. `now` is the UI clock, used to advance the camera.
/// Clicking inside a borough selects it. Hovering a listing shows its details
/// and thickens the outline of its borough.
pub fn map_view(ui: &mut Ui, state: &mut AppState, now: f64) -> Option<SelectionEvent> {
    let Some(cf) = &state.crossfilter else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a listings file and a borough file  (File → Open…)");
        });
        return None;
    };

    let frame = state.config.map_frame;
    let forced = state.camera.frame_bounds(now);
    let selected = cf.filter().borough.as_deref();
    let price_scale = state.price_scale;

    let mut bands: Vec<Vec<[f64; 2]>> = vec![Vec::new(); PRICE_BANDS];
    for &i in &cf.view().mapped {
        let band = cf.data().mapped[i]
            .price
            .zip(price_scale)
            .map_or(0, |(p, scale)| price_band(&scale, p));
        bands[band].push(cf.points()[i]);
    }

    let response = Plot::new("borough_map")
        .data_aspect(1.0)
        .view_aspect((frame[0] / frame[1]) as f32)
        .show_axes([false, false])
        .show_grid([false, false])
        .show_x(false)
        .show_y(false)
        .allow_boxed_zoom(false)
        .allow_double_click_reset(false)
        .show(ui, |plot_ui| {
            if let Some(r) = forced {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                    [r.min().x, r.min().y],
                    [r.max().x, r.max().y],
                ));
            }

            let pointer = plot_ui.pointer_coordinate();
            let px_per_unit = plot_ui.transform().dpos_dvalue_x().abs().max(f64::EPSILON);
            let radius = HOVER_RADIUS_PX / px_per_unit;
            let hovered = pointer.and_then(|p| cf.nearest_listing([p.x, p.y], radius));
            let hovered_borough = hovered.map(|l| l.borough.as_str());

            for outline in cf.outlines() {
                let is_selected = selected == Some(outline.name.as_str());
                let is_hovered = hovered_borough == Some(outline.name.as_str());
                let color = if is_selected {
                    ChartColors::SELECTED_OUTLINE
                } else {
                    ChartColors::OUTLINE
                };
                let width = if is_selected || is_hovered { 3.0 } else { 1.0 };
                let stroke = Stroke::new(width, color);
                for ring in &outline.rings {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(ring.clone()))
                            .fill_color(ChartColors::BOROUGH_FILL)
                            .stroke(stroke)
                            .allow_hover(false),
                    );
                }
            }

            for (band, points) in bands.into_iter().enumerate() {
                if points.is_empty() {
                    continue;
                }
                let color = price_scale.map_or(Color32::LIGHT_RED, |scale| {
                    scale.color_for(band_price(&scale, band))
                });
                plot_ui.points(
                    Points::new(points)
                        .color(color)
                        .radius(1.5)
                        .allow_hover(false),
                );
            }

            if let (Some(p), Some(listing)) = (pointer, hovered) {
                plot_ui.text(
                    Text::new(PlotPoint::new(p.x, p.y), RichText::new(listing.to_string()))
                        .anchor(Align2::LEFT_BOTTOM),
                );
            } else if let Some(p) = pointer {
                let at = cf.projection().invert(Coord { x: p.x, y: p.y });
                if let Some(borough) = cf.boroughs().locate(at) {
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(p.x, p.y),
                            RichText::new(&borough.name).strong(),
                        )
                        .anchor(Align2::LEFT_BOTTOM),
                    );
                }
            }

            let bounds = plot_ui.plot_bounds();
            (pointer, bounds)
        });

    let (pointer, bounds) = response.inner;
    state.camera.observe(Rect::new(
        Coord {
            x: bounds.min()[0],
            y: bounds.min()[1],
        },
        Coord {
            x: bounds.max()[0],
            y: bounds.max()[1],
        },
    ));

    if let Some(scale) = price_scale {
        price_legend(ui, &scale);
    }

    if !response.response.clicked() {
        return None;
    }
    let p = pointer?;
    let cf = state.crossfilter.as_ref()?;
    let at = cf.projection().invert(Coord { x: p.x, y: p.y });
    let borough = cf.boroughs().locate(at)?;
    Some(SelectionEvent::BoroughClicked(borough.name.clone()))
}

fn price_band(scale: &PriceScale, price: f64) -> usize {
    let band = (scale.fraction(price) * PRICE_BANDS as f32) as usize;
    band.min(PRICE_BANDS - 1)
}

/// Representative price at the middle of a band.
fn band_price(scale: &PriceScale, band: usize) -> f64 {
    let t = (band as f64 + 0.5) / PRICE_BANDS as f64;
    scale.min + t * (scale.max - scale.min)
}

/// A white→red gradient strip labelled with the price range.
fn price_legend(ui: &mut Ui, scale: &PriceScale) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("${:.0}", scale.min));
        let (rect, _) = ui.allocate_exact_size(egui::vec2(200.0, 12.0), Sense::hover());
        let step = rect.width() / PRICE_BANDS as f32;
        for band in 0..PRICE_BANDS {
            let slice = egui::Rect::from_min_size(
                egui::pos2(rect.left() + band as f32 * step, rect.top()),
                egui::vec2(step, rect.height()),
            );
            ui.painter()
                .rect_filled(slice, 0.0, scale.color_for(band_price(scale, band)));
        }
        ui.label(format!("${:.0}", scale.max));
        ui.label(RichText::new("price").weak());
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_cover_the_price_range() {
        let scale = PriceScale::new(0.0, 1600.0);
        assert_eq!(price_band(&scale, 0.0), 0);
        assert_eq!(price_band(&scale, 99.0), 0);
        assert_eq!(price_band(&scale, 100.0), 1);
        assert_eq!(price_band(&scale, 1600.0), PRICE_BANDS - 1);
        assert_eq!(price_band(&scale, 9999.0), PRICE_BANDS - 1);
    }

    #[test]
    fn band_price_sits_inside_its_band() {
        let scale = PriceScale::new(0.0, 1600.0);
        for band in 0..PRICE_BANDS {
            assert_eq!(price_band(&scale, band_price(&scale, band)), band);
        }
    }
}
