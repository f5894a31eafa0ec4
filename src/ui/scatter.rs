use std::collections::BTreeMap;

use eframe::egui::Ui;
use egui_plot::{Legend, Plot, Points};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Scatter plot – construction year against price
// ---------------------------------------------------------------------------

/// One point per listing in the filtered map view, one series per borough.
/// Listings without a construction year or price are left out.
pub fn scatter_plot(ui: &mut Ui, state: &AppState) {
    let Some(cf) = &state.crossfilter else {
        return;
    };

    let mut series: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for &i in &cf.view().mapped {
        let listing = &cf.data().mapped[i];
        let (Some(year), Some(price)) = (listing.construction_year, listing.price) else {
            continue;
        };
        series
            .entry(listing.borough.as_str())
            .or_default()
            .push([f64::from(year), price]);
    }

    Plot::new("year_price_scatter")
        .legend(Legend::default())
        .x_axis_label("Construction year")
        .y_axis_label("Price ($)")
        .label_formatter(|name, point| {
            if name.is_empty() {
                String::new()
            } else {
                format!("{name}\nbuilt {:.0}\n${:.0}", point.x, point.y)
            }
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (borough, points) in series {
                plot_ui.points(
                    Points::new(points)
                        .name(borough)
                        .color(state.borough_colors.color_for(borough))
                        .radius(2.0),
                );
            }
        });
}
