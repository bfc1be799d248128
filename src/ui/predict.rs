use eframe::egui::{self, Color32, RichText, Ui};

use crate::predict::features::CategoricalField;
use crate::state::{
    max_model_year, AppState, PredictState, PredictionOutcome, MAX_ODOMETER, MIN_MODEL_YEAR,
    ODOMETER_STEP,
};
use crate::ui::format::dollars_cents;

// ---------------------------------------------------------------------------
// Prediction page (central panel)
// ---------------------------------------------------------------------------

pub fn predict_page(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Vehicle Price Prediction");
    ui.label("Enter the details of a vehicle to estimate its market price.");
    ui.add_space(6.0);

    let bundle = match state.ensure_model() {
        Ok(bundle) => bundle,
        Err(message) => {
            ui.label(RichText::new(message).color(Color32::RED));
            return;
        }
    };
    let predict = &mut state.predict;

    egui::Grid::new("prediction_form")
        .num_columns(2)
        .spacing([24.0, 8.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("Model year");
            ui.add(egui::Slider::new(
                &mut predict.form.model_year,
                MIN_MODEL_YEAR..=max_model_year(),
            ));
            ui.end_row();

            ui.label("Odometer");
            ui.add(
                egui::Slider::new(&mut predict.form.odometer, 0..=MAX_ODOMETER)
                    .step_by(f64::from(ODOMETER_STEP)),
            );
            ui.end_row();

            for field in CategoricalField::ALL {
                ui.label(field_label(field));
                let options = bundle.encoder(field).sorted_classes();
                let selected = predict.category_mut(field);
                egui::ComboBox::from_id_salt(field.name())
                    .selected_text(selected.as_str())
                    .width(200.0)
                    .show_ui(ui, |ui: &mut Ui| {
                        for option in options {
                            let text = option.clone();
                            ui.selectable_value(selected, option, text);
                        }
                    });
                ui.end_row();
            }
        });

    ui.add_space(8.0);
    if ui.button(RichText::new("Estimate price").strong()).clicked() {
        predict.submit();
    }
    ui.add_space(8.0);
    outcome(ui, predict);
}

fn field_label(field: CategoricalField) -> &'static str {
    match field {
        CategoricalField::Model => "Model",
        CategoricalField::Condition => "Condition",
        CategoricalField::Fuel => "Fuel",
        CategoricalField::Transmission => "Transmission",
        CategoricalField::Type => "Vehicle type",
    }
}

// ---------------------------------------------------------------------------
// Result display
// ---------------------------------------------------------------------------

fn outcome(ui: &mut Ui, predict: &PredictState) {
    match &predict.outcome {
        None => {}
        Some(PredictionOutcome::Failed(message)) => {
            ui.label(RichText::new(format!("Prediction failed: {message}")).color(Color32::RED));
            ui.label("Please check the values entered.");
        }
        Some(PredictionOutcome::Price {
            price,
            input_json,
            feature_order,
            encoded_row,
        }) => {
            ui.label(
                RichText::new(format!("Estimated price: {}", dollars_cents(*price)))
                    .heading()
                    .color(Color32::LIGHT_GREEN),
            );
            egui::CollapsingHeader::new("Prediction details")
                .id_salt("prediction_details")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    ui.strong("Input");
                    ui.monospace(input_json.as_str());
                    ui.add_space(4.0);
                    ui.strong("Feature order");
                    ui.monospace(feature_order.join(", "));
                    ui.add_space(4.0);
                    ui.strong("Encoded row");
                    ui.monospace(format!("{encoded_row:?}"));
                });
        }
    }
}
