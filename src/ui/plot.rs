use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Plot, PlotPoints, Points};

use crate::color::{generate_palette, PriceScale};
use crate::data::stats::{Aggregates, ConditionCounts};
use crate::ui::format::{dollars, format_thousands};

const CHART_HEIGHT: f32 = 320.0;
const SCATTER_BINS: usize = 12;

// ---------------------------------------------------------------------------
// Price distribution: mean price by model and by type
// ---------------------------------------------------------------------------

pub fn price_distribution(ui: &mut Ui, agg: &Aggregates) {
    ui.label("Compare the average price across models and vehicle types.");
    let palette = generate_palette(2);
    ui.columns(2, |cols| {
        cols[0].strong("By model");
        horizontal_bars(&mut cols[0], "price_by_model", &agg.price_by_model, palette[0]);
        cols[1].strong("By vehicle type");
        horizontal_bars(&mut cols[1], "price_by_type", &agg.price_by_type, palette[1]);
    });
}

/// One horizontal bar per label, in the order given (ascending by value).
fn horizontal_bars(ui: &mut Ui, id: &str, data: &[(String, f64)], color: Color32) {
    let bars: Vec<Bar> = data
        .iter()
        .enumerate()
        .map(|(i, (label, value))| Bar::new(i as f64, *value).name(label).fill(color))
        .collect();
    let labels: Vec<String> = data.iter().map(|(label, _)| label.clone()).collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .x_axis_label("Mean price ($)")
        .y_axis_formatter(move |mark: GridMark, _range| category_label(&labels, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().color(color));
        });
}

/// Axis text for a category chart: the label at an integer position, blank
/// between categories.
fn category_label(labels: &[String], value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Age vs odometer scatter, coloured by price
// ---------------------------------------------------------------------------

pub fn age_vs_odometer(ui: &mut Ui, agg: &Aggregates) {
    ui.label("How price varies with the age of the vehicle and its odometer reading.");
    let Some(scale) = PriceScale::from_prices(agg.age_vs_odometer.iter().map(|p| p[2])) else {
        return;
    };

    // egui_plot points share one colour per series, so bucket by price.
    let mut bins: Vec<Vec<[f64; 2]>> = vec![Vec::new(); SCATTER_BINS];
    for &[age, odometer, price] in &agg.age_vs_odometer {
        let bin = ((scale.position(price) * SCATTER_BINS as f32) as usize).min(SCATTER_BINS - 1);
        bins[bin].push([age, odometer]);
    }

    Plot::new("age_vs_odometer")
        .height(CHART_HEIGHT)
        .x_axis_label("Vehicle age (years)")
        .y_axis_label("Odometer")
        .show(ui, |plot_ui| {
            for (i, points) in bins.into_iter().enumerate() {
                if points.is_empty() {
                    continue;
                }
                let mid = (i as f32 + 0.5) / SCATTER_BINS as f32;
                let price = scale.price_at(mid);
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .color(scale.color_for(price).gamma_multiply(0.6))
                        .radius(2.5),
                );
            }
        });

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Price ($):");
        for (price, color) in scale.legend_entries(5) {
            ui.label(RichText::new(format!("■ {}", dollars(price))).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// Condition counts
// ---------------------------------------------------------------------------

pub fn condition_chart(ui: &mut Ui, conditions: &ConditionCounts) {
    ui.label(format!(
        "Listings by declared condition ({} in total).",
        format_thousands(conditions.total() as f64, 0)
    ));
    let palette = generate_palette(conditions.counts.len());
    let bars: Vec<Bar> = conditions
        .counts
        .iter()
        .zip(palette)
        .enumerate()
        .map(|(i, ((label, count), color))| {
            Bar::new(i as f64, *count as f64).name(label).fill(color)
        })
        .collect();
    let labels: Vec<String> = conditions.counts.iter().map(|(l, _)| l.to_string()).collect();

    Plot::new("condition_counts")
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .legend(Legend::default())
        .y_axis_label("Listings")
        .x_axis_formatter(move |mark: GridMark, _range| category_label(&labels, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });

    if conditions.other > 0 {
        ui.label(format!(
            "{} listings have a condition outside the standard scale.",
            format_thousands(conditions.other as f64, 0)
        ));
    }
}
