use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::VehicleTable;
use crate::state::{AppState, Exploration, ExploreState, ExploreTab};
use crate::ui::format::{dollars, format_thousands};
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Exploration page (central panel)
// ---------------------------------------------------------------------------

pub fn explore_page(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Vehicle Data Explorer");
    ui.label("Explore used-vehicle listings in the US with interactive filters and charts.");
    ui.add_space(6.0);

    let table = match state.ensure_dataset() {
        Ok(table) => table,
        Err(message) => {
            ui.label(RichText::new(message).color(Color32::RED));
            return;
        }
    };
    if table.is_empty() {
        ui.label(RichText::new("The dataset contains no listings.").color(Color32::YELLOW));
        return;
    }
    let explore = &mut state.explore;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            filters(ui, explore, &table);
            ui.separator();

            match &explore.exploration {
                Some(Exploration::EmptySelection) => {
                    ui.label(RichText::new("Please select at least one model.").color(Color32::YELLOW));
                }
                Some(Exploration::NoMatches) | None => {
                    ui.label(
                        RichText::new("No vehicles match the selected filters.").color(Color32::YELLOW),
                    );
                }
                Some(Exploration::Results(agg)) => {
                    ui.label(
                        RichText::new(format!(
                            "{} vehicles found matching your criteria.",
                            format_thousands(agg.summary.count as f64, 0)
                        ))
                        .strong(),
                    );
                    metrics(ui, &agg.summary);
                    ui.add_space(6.0);
                    tabs(ui, &mut explore.tab);
                    ui.separator();
                    match explore.tab {
                        ExploreTab::PriceDistribution => plot::price_distribution(ui, agg),
                        ExploreTab::AgeVsOdometer => plot::age_vs_odometer(ui, agg),
                        ExploreTab::Condition => plot::condition_chart(ui, &agg.conditions),
                        ExploreTab::Data => rows_table(ui, explore),
                    }
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Filter widgets
// ---------------------------------------------------------------------------

fn filters(ui: &mut Ui, explore: &mut ExploreState, table: &Arc<VehicleTable>) {
    ui.strong("Filters");

    ui.columns(2, |cols| {
        model_filter(&mut cols[0], explore, table);
        price_filter(&mut cols[1], explore, table);
    });

    // ---- Vehicle types ----
    let n_selected = explore.criteria.vehicle_types.len();
    let header = format!("Vehicle types  ({n_selected}/{})", table.vehicle_types.len());
    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt("type_filter")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            if ui.small_button("All").clicked() {
                explore.select_all_types();
            }
            ui.horizontal_wrapped(|ui: &mut Ui| {
                for vehicle_type in &table.vehicle_types {
                    let mut checked = explore.criteria.vehicle_types.contains(vehicle_type);
                    if ui.checkbox(&mut checked, vehicle_type).changed() {
                        explore.toggle_type(vehicle_type);
                    }
                }
            });
        });
}

fn model_filter(ui: &mut Ui, explore: &mut ExploreState, table: &VehicleTable) {
    let n_selected = explore.criteria.models.len();
    let header = format!("Models  ({n_selected}/{})", table.models.len());
    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt("model_filter")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if ui.small_button("None").clicked() {
                explore.clear_models();
            }
            ScrollArea::vertical()
                .id_salt("model_list")
                .max_height(220.0)
                .show(ui, |ui: &mut Ui| {
                    for model in &table.models {
                        let mut checked = explore.criteria.models.contains(model);
                        if ui.checkbox(&mut checked, model).changed() {
                            explore.toggle_model(model);
                        }
                    }
                });
        });

    let selected: Vec<&str> = explore.criteria.models.iter().map(String::as_str).collect();
    if !selected.is_empty() {
        ui.label(RichText::new(selected.join(", ")).small());
    }
}

fn price_filter(ui: &mut Ui, explore: &mut ExploreState, table: &VehicleTable) {
    ui.strong("Price range ($)");
    let Some((lo, hi)) = table.price_bounds() else {
        return;
    };
    let (lo, hi) = (lo.trunc(), hi.trunc());
    let (mut min, mut max) = explore.criteria.price_range;

    let min_changed = ui
        .add(egui::Slider::new(&mut min, lo..=hi).text("min").step_by(1.0))
        .changed();
    let max_changed = ui
        .add(egui::Slider::new(&mut max, lo..=hi).text("max").step_by(1.0))
        .changed();
    if min_changed || max_changed {
        explore.set_price_range(min, max);
    }
}

// ---------------------------------------------------------------------------
// Metrics and tabs
// ---------------------------------------------------------------------------

fn metrics(ui: &mut Ui, summary: &crate::data::stats::Summary) {
    ui.columns(3, |cols| {
        metric(&mut cols[0], "Average price", dollars(summary.mean_price));
        metric(
            &mut cols[1],
            "Average odometer",
            format!("{} km", format_thousands(summary.mean_odometer, 0)),
        );
        metric(&mut cols[2], "Average age", format!("{:.1} years", summary.mean_age));
    });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).small());
        ui.label(RichText::new(value).heading());
    });
}

fn tabs(ui: &mut Ui, tab: &mut ExploreTab) {
    ui.horizontal(|ui: &mut Ui| {
        ui.selectable_value(tab, ExploreTab::PriceDistribution, "Price distribution");
        ui.selectable_value(tab, ExploreTab::AgeVsOdometer, "Age vs odometer");
        ui.selectable_value(tab, ExploreTab::Condition, "Condition");
        ui.selectable_value(tab, ExploreTab::Data, "Data");
    });
}

// ---------------------------------------------------------------------------
// Filtered rows
// ---------------------------------------------------------------------------

const TABLE_COLUMNS: [&str; 10] = [
    "model",
    "model_year",
    "price",
    "condition",
    "fuel",
    "odometer",
    "transmission",
    "type",
    "vehicle_age",
    "date_posted",
];

fn rows_table(ui: &mut Ui, explore: &ExploreState) {
    let rows = explore.visible_rows();
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(400.0)
        .columns(Column::auto().at_least(60.0), TABLE_COLUMNS.len())
        .header(20.0, |mut header| {
            for name in TABLE_COLUMNS {
                header.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let r = rows[row.index()];
                let cells = [
                    r.model.clone(),
                    format!("{:.0}", r.model_year),
                    dollars(r.price),
                    r.condition.clone(),
                    r.fuel.clone(),
                    format_thousands(r.odometer, 0),
                    r.transmission.clone(),
                    r.vehicle_type.clone(),
                    format!("{:.1}", r.vehicle_age),
                    r.date_posted.to_string(),
                ];
                for cell in cells {
                    row.col(|ui: &mut Ui| {
                        ui.label(cell);
                    });
                }
            });
        });
}
