use eframe::egui;

use crate::state::AppState;
use crate::ui::{bar_chart, map, panels, scatter};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ListingsViewerApp {
    pub state: AppState,
}

impl ListingsViewerApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for ListingsViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|i| i.time);
        let mut events = Vec::new();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: selectors ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                events.extend(panels::side_panel(ui, &self.state));
            });

        // ---- Central panel: bar chart over map + scatter ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let bar_height = (ui.available_height() * 0.4).max(160.0);
            events.extend(bar_chart::bar_chart(ui, &self.state, bar_height));
            ui.separator();
            ui.columns(2, |cols| {
                events.extend(map::map_view(&mut cols[0], &mut self.state, now));
                scatter::scatter_plot(&mut cols[1], &self.state);
            });
        });

        for event in events {
            if let Some(update) = self.state.handle(event, now) {
                log::debug!(
                    "{} listings, redraw {:?}",
                    update.listings_count,
                    update.redraw
                );
            }
        }

        if self.state.camera.is_animating() {
            ctx.request_repaint();
        }
    }
}
