use eframe::egui::{Align2, RichText, Stroke, Ui};
use egui_plot::{Bar, BarChart, Plot, PlotPoint, Text};

use crate::bridge::SelectionEvent;
use crate::color::ChartColors;
use crate::data::aggregate::AggregateBucket;
use crate::state::AppState;

const BAR_WIDTH: f64 = 0.8;
const TITLE: &str = "Avg Review Rating per Neighborhood";
/// Plot-space offset of the borough labels below the baseline.
const LABEL_DROP: f64 = 0.1;

// ---------------------------------------------------------------------------
// Bar chart – mean review per neighbourhood
// ---------------------------------------------------------------------------

/// One bar per (borough, neighbourhood) bucket, in presentation order, coloured
/// by borough. Clicking a bar selects its neighbourhood.
pub fn bar_chart(ui: &mut Ui, state: &AppState, height: f32) -> Option<SelectionEvent> {
    let cf = state.crossfilter.as_ref()?;
    let buckets = &cf.view().buckets;
    let filter = cf.filter();

    let bars: Vec<Bar> = buckets
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let selected = filter.neighborhood.as_deref() == Some(b.neighborhood.as_str());
            let stroke = if selected {
                Stroke::new(2.5, ChartColors::HIGHLIGHT)
            } else {
                Stroke::NONE
            };
            Bar::new(i as f64, b.mean)
                .name(format!("{} / {}", b.borough, b.neighborhood))
                .fill(state.borough_colors.color_for(&b.borough))
                .stroke(stroke)
                .width(BAR_WIDTH)
        })
        .collect();

    let groups = borough_groups(buckets);

    ui.vertical_centered(|ui: &mut Ui| {
        ui.strong(TITLE);
    });
    let height = (height - ui.spacing().interact_size.y).max(80.0);

    let chart = BarChart::new(bars)
        .element_formatter(Box::new(|bar: &Bar, _chart: &BarChart| {
            format!("{}\nmean review {:.3}", bar.name, bar.value)
        }));

    let response = Plot::new("review_bar_chart")
        .height(height)
        .y_axis_label("Mean review")
        .show_axes([false, true])
        .show_x(false)
        .show_y(false)
        .include_y(-4.0 * LABEL_DROP)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);
            for (borough, middle) in &groups {
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(*middle, -LABEL_DROP),
                        RichText::new(*borough)
                            .strong()
                            .color(state.borough_colors.color_for(borough)),
                    )
                    .anchor(Align2::CENTER_TOP),
                );
            }
            plot_ui.pointer_coordinate()
        });

    if !response.response.clicked() {
        return None;
    }
    let pointer = response.inner?;
    let bucket = bar_at(buckets, pointer.x, pointer.y)?;
    Some(SelectionEvent::NeighborhoodClicked(bucket.neighborhood.clone()))
}

/// Each run of consecutive bars sharing a borough, with the x position of
/// the middle of the run.
fn borough_groups(buckets: &[AggregateBucket]) -> Vec<(&str, f64)> {
    let mut groups: Vec<(&str, usize, usize)> = Vec::new();
    for (i, bucket) in buckets.iter().enumerate() {
        match groups.last_mut() {
            Some((borough, _, last)) if *borough == bucket.borough => *last = i,
            _ => groups.push((bucket.borough.as_str(), i, i)),
        }
    }
    groups
        .into_iter()
        .map(|(borough, first, last)| (borough, (first + last) as f64 / 2.0))
        .collect()
}

/// The bucket whose bar covers plot position `(x, y)`.
fn bar_at(buckets: &[AggregateBucket], x: f64, y: f64) -> Option<&AggregateBucket> {
    let index = x.round();
    if index < 0.0 || (x - index).abs() > BAR_WIDTH / 2.0 {
        return None;
    }
    let bucket = buckets.get(index as usize)?;
    (y >= 0.0 && y <= bucket.mean).then_some(bucket)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(neighborhood: &str, mean: f64) -> AggregateBucket {
        in_borough("Brooklyn", neighborhood, mean)
    }

    fn in_borough(borough: &str, neighborhood: &str, mean: f64) -> AggregateBucket {
        AggregateBucket {
            borough: borough.to_string(),
            neighborhood: neighborhood.to_string(),
            mean,
            count: 1,
        }
    }

    #[test]
    fn hit_test_finds_bar_under_pointer() {
        let buckets = vec![bucket("Williamsburg", 3.0), bucket("Bushwick", 2.0)];
        assert_eq!(bar_at(&buckets, 0.1, 1.0).map(|b| b.neighborhood.as_str()), Some("Williamsburg"));
        assert_eq!(bar_at(&buckets, 1.3, 1.9).map(|b| b.neighborhood.as_str()), Some("Bushwick"));
    }

    #[test]
    fn hit_test_misses_gaps_and_space_above_bars() {
        let buckets = vec![bucket("Williamsburg", 3.0), bucket("Bushwick", 2.0)];
        assert!(bar_at(&buckets, 0.5, 1.0).is_none());
        assert!(bar_at(&buckets, 1.0, 2.5).is_none());
        assert!(bar_at(&buckets, 2.0, 1.0).is_none());
        assert!(bar_at(&buckets, -1.0, 1.0).is_none());
    }

    #[test]
    fn borough_labels_sit_under_the_middle_of_their_bars() {
        let buckets = vec![
            in_borough("Bronx", "Fordham", 4.0),
            in_borough("Brooklyn", "Bushwick", 3.5),
            in_borough("Brooklyn", "Park Slope", 3.0),
            in_borough("Brooklyn", "Williamsburg", 2.0),
            in_borough("Manhattan", "Harlem", 3.2),
            in_borough("Manhattan", "Midtown", 2.9),
        ];
        assert_eq!(
            borough_groups(&buckets),
            vec![("Bronx", 0.0), ("Brooklyn", 2.0), ("Manhattan", 4.5)]
        );
        assert!(borough_groups(&[]).is_empty());
    }
}
