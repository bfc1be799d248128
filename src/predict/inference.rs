use serde::Serialize;

use super::bundle::ModelBundle;
use super::features::{CategoricalField, Feature, PerField};
use super::regressor::Regress;
use crate::error::PredictError;

/// Raw values from the prediction form, one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionInput {
    pub model_year: i32,
    pub model: String,
    pub condition: String,
    pub fuel: String,
    pub odometer: u32,
    pub transmission: String,
    #[serde(rename = "type")]
    pub vehicle_type: String,
}

impl PredictionInput {
    pub fn category(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::Model => &self.model,
            CategoricalField::Condition => &self.condition,
            CategoricalField::Fuel => &self.fuel,
            CategoricalField::Transmission => &self.transmission,
            CategoricalField::Type => &self.vehicle_type,
        }
    }
}

/// Encode the categorical fields and lay the row out in the bundle's feature
/// order. Fields are encoded model, condition, fuel, transmission, type; the
/// first unknown label is reported.
pub fn encode(bundle: &ModelBundle, input: &PredictionInput) -> Result<Vec<f64>, PredictError> {
    let mut codes = [0.0; 5];
    for (slot, field) in codes.iter_mut().zip(CategoricalField::ALL) {
        let label = input.category(field);
        let code = bundle
            .encoder(field)
            .encode(label)
            .ok_or_else(|| PredictError::UnknownCategory {
                field: field.name(),
                value: label.to_string(),
            })?;
        *slot = code as f64;
    }
    let codes = PerField::new(codes);

    Ok(bundle
        .feature_order()
        .iter()
        .map(|feature| match *feature {
            Feature::ModelYear => f64::from(input.model_year),
            Feature::Odometer => f64::from(input.odometer),
            Feature::Categorical(field) => *codes.get(field),
        })
        .collect())
}

/// Estimate the price of one vehicle.
pub fn predict(bundle: &ModelBundle, input: &PredictionInput) -> Result<f64, PredictError> {
    let row = encode(bundle, input)?;
    log::debug!("Encoded prediction row {row:?}");
    Ok(bundle.regressor().predict_row(&row))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::predict::bundle::tests::{linear_bundle, linear_bundle_json};

    fn reference_input() -> PredictionInput {
        PredictionInput {
            model_year: 2015,
            model: "Toyota".to_string(),
            condition: "good".to_string(),
            fuel: "gas".to_string(),
            odometer: 50_000,
            transmission: "automatic".to_string(),
            vehicle_type: "SUV".to_string(),
        }
    }

    #[test]
    fn known_categories_encode_to_their_codes() {
        let row = encode(&linear_bundle(), &reference_input()).unwrap();
        assert_eq!(row, vec![2015.0, 2.0, 2.0, 2.0, 50_000.0, 0.0, 0.0]);
    }

    #[test]
    fn reference_vehicle_has_a_pinned_price() {
        // -990000 + 1007500 + 2000 - 400 + 600 - 3125 - 0 + 0
        let price = predict(&linear_bundle(), &reference_input()).unwrap();
        assert_eq!(price, 16575.0);
        // Same answer every time.
        assert_eq!(predict(&linear_bundle(), &reference_input()).unwrap(), price);
    }

    #[test]
    fn unknown_category_names_field_and_value() {
        let mut input = reference_input();
        input.fuel = "steam".to_string();
        input.vehicle_type = "hovercraft".to_string();
        let err = predict(&linear_bundle(), &input).unwrap_err();
        assert_eq!(
            err,
            PredictError::UnknownCategory {
                field: "fuel",
                value: "steam".to_string()
            }
        );
    }

    #[test]
    fn labels_are_case_sensitive() {
        let mut input = reference_input();
        input.vehicle_type = "suv".to_string();
        assert!(matches!(
            encode(&linear_bundle(), &input),
            Err(PredictError::UnknownCategory { field: "type", .. })
        ));
    }

    #[test]
    fn rows_follow_the_declared_feature_order() {
        let mut doc = linear_bundle_json();
        doc["regressor"]["feature_names"] =
            json!(["odometer", "type", "transmission", "fuel", "condition", "model", "model_year"]);
        let bundle = ModelBundle::from_bytes(doc.to_string().as_bytes()).unwrap();

        let row = encode(&bundle, &reference_input()).unwrap();
        assert_eq!(row, vec![50_000.0, 0.0, 0.0, 2.0, 2.0, 2.0, 2015.0]);
    }

    #[test]
    fn forest_bundle_predicts_from_its_subset_of_features() {
        let mut doc = linear_bundle_json();
        doc["regressor"] = json!({
            "kind": "tree_ensemble",
            "feature_names": ["odometer", "model_year"],
            "combine": "mean",
            "trees": [
                [
                    { "feature": 0, "threshold": 100000.0, "left": 1, "right": 2 },
                    { "leaf": 15000.0 },
                    { "leaf": 8000.0 }
                ],
                [
                    { "feature": 1, "threshold": 2010.0, "left": 1, "right": 2 },
                    { "leaf": -1000.0 },
                    { "leaf": 2000.0 }
                ]
            ]
        });
        let bundle = ModelBundle::from_bytes(doc.to_string().as_bytes()).unwrap();
        assert_eq!(encode(&bundle, &reference_input()).unwrap(), vec![50_000.0, 2015.0]);
        assert_eq!(predict(&bundle, &reference_input()).unwrap(), 8500.0);
    }

    #[test]
    fn input_serializes_with_form_field_names() {
        let value = serde_json::to_value(reference_input()).unwrap();
        assert_eq!(value["type"], "SUV");
        assert_eq!(value["odometer"], 50_000);
    }
}
