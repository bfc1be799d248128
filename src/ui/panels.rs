use eframe::egui::{self, RichText, Ui};

use crate::state::{AppState, Exploration, Page};

// ---------------------------------------------------------------------------
// Left side panel – navigation
// ---------------------------------------------------------------------------

/// Render the navigation sidebar.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Navigation");
    ui.separator();

    ui.strong("Page");
    let current = match state.page {
        Page::Explore => "Explore",
        Page::Predict => "Predict",
    };
    egui::ComboBox::from_id_salt("page_select")
        .selected_text(current)
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut state.page, Page::Explore, "Explore");
            ui.selectable_value(&mut state.page, Page::Predict, "Predict");
        });

    ui.separator();
    ui.label(RichText::new("Data source").small().strong());
    ui.label(RichText::new(state.resources.data_source().to_string()).small());
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top status bar.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Vehicle Price Explorer");
        ui.separator();

        if let Some(table) = &state.explore.table {
            let visible = match state.explore.exploration {
                Some(Exploration::Results(ref agg)) => agg.summary.count,
                _ => 0,
            };
            ui.label(format!("{} listings loaded, {visible} match", table.len()));
        }

        if state.predict.bundle.is_some() {
            ui.separator();
            ui.label("Price model ready");
        }
    });
}
