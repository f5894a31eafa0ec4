use std::collections::BTreeSet;

use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::bridge::SelectionEvent;
use crate::data::filter::{ALL, Choice};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – selectors and neighbourhood table
// ---------------------------------------------------------------------------

/// Render the left selector panel. Returns the selection the user made, if any.
pub fn side_panel(ui: &mut Ui, state: &AppState) -> Option<SelectionEvent> {
    ui.heading("Filters");
    ui.separator();

    let Some(cf) = &state.crossfilter else {
        ui.label("No data loaded.");
        return None;
    };

    let catalog = &cf.data().catalog;
    let filter = cf.filter();
    let mut event = None;

    ui.strong("Borough");
    if let Some(choice) = selector(
        ui,
        "borough",
        filter.borough.as_deref(),
        catalog.boroughs.iter().map(String::as_str),
        |name| RichText::new(name).color(state.borough_colors.color_for(name)),
    ) {
        event = Some(SelectionEvent::BoroughChosen(choice));
    }

    ui.strong("Neighbourhood");
    let neighborhoods: BTreeSet<&str> = catalog.neighborhoods_in(filter.borough.as_deref());
    if let Some(choice) = selector(
        ui,
        "neighbourhood",
        filter.neighborhood.as_deref(),
        neighborhoods.into_iter(),
        |name| RichText::new(name),
    ) {
        event = Some(SelectionEvent::NeighborhoodChosen(choice));
    }

    ui.strong("Room type");
    if let Some(choice) = selector(
        ui,
        "room_type",
        filter.room_type.as_deref(),
        catalog.room_types.iter().map(String::as_str),
        |name| RichText::new(name),
    ) {
        event = Some(SelectionEvent::RoomTypeChosen(choice));
    }

    ui.separator();
    ui.strong("Mean review by neighbourhood");
    if let Some(picked) = neighborhood_table(ui, state) {
        event = Some(picked);
    }

    event
}

/// A combo box offering "All" plus `values`.
fn selector<'a>(
    ui: &mut Ui,
    id: &str,
    current: Option<&str>,
    values: impl Iterator<Item = &'a str>,
    label: impl Fn(&'a str) -> RichText,
) -> Option<Choice> {
    let mut picked = None;
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.unwrap_or(ALL))
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            if ui.selectable_label(current.is_none(), ALL).clicked() {
                picked = Some(Choice::All);
            }
            for value in values {
                if ui
                    .selectable_label(current == Some(value), label(value))
                    .clicked()
                {
                    picked = Some(Choice::Only(value.to_string()));
                }
            }
        });
    ui.add_space(4.0);
    picked
}

/// The current aggregate as a table. Clicking a neighbourhood selects it.
fn neighborhood_table(ui: &mut Ui, state: &AppState) -> Option<SelectionEvent> {
    let cf = state.crossfilter.as_ref()?;
    let buckets = &cf.view().buckets;
    let selected = cf.filter().neighborhood.as_deref();
    let mut event = None;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto())
        .column(Column::remainder().at_least(90.0))
        .column(Column::auto())
        .column(Column::auto())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Borough");
            });
            header.col(|ui| {
                ui.strong("Neighbourhood");
            });
            header.col(|ui| {
                ui.strong("Mean");
            });
            header.col(|ui| {
                ui.strong("n");
            });
        })
        .body(|body| {
            body.rows(18.0, buckets.len(), |mut row| {
                let bucket = &buckets[row.index()];
                row.col(|ui| {
                    ui.label(
                        RichText::new(&bucket.borough)
                            .color(state.borough_colors.color_for(&bucket.borough)),
                    );
                });
                row.col(|ui| {
                    let is_selected = selected == Some(bucket.neighborhood.as_str());
                    if ui.selectable_label(is_selected, &bucket.neighborhood).clicked() {
                        event = Some(SelectionEvent::NeighborhoodClicked(bucket.neighborhood.clone()));
                    }
                });
                row.col(|ui| {
                    ui.label(format!("{:.3}", bucket.mean));
                });
                row.col(|ui| {
                    ui.label(bucket.count.to_string());
                });
            });
        });

    event
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open listings…").clicked() {
                open_listings_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open boroughs…").clicked() {
                open_boroughs_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(cf) = &state.crossfilter {
            ui.label(RichText::new(format!("Listings Count: {}", cf.listings_count())).strong());
            ui.separator();
            ui.label(cf.filter().to_string());
            ui.separator();
        }

        if state.loading {
            ui.spinner();
        }

        if let Some(msg) = &state.status_message {
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                ui.visuals().weak_text_color()
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_listings_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open listings")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.loading = true;
        state.open_listings(&path);
    }
}

pub fn open_boroughs_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open borough boundaries")
        .add_filter("GeoJSON", &["geojson", "json"])
        .pick_file();

    if let Some(path) = file {
        state.loading = true;
        state.open_boroughs(&path);
    }
}
