use std::sync::Arc;

use chrono::Datelike;

use crate::cache::Resources;
use crate::data::filter::{filter, FilterCriteria};
use crate::data::model::{VehicleRecord, VehicleTable};
use crate::data::stats::{aggregate, Aggregates};
use crate::predict::bundle::ModelBundle;
use crate::predict::features::CategoricalField;
use crate::predict::inference::{encode, predict, PredictionInput};

pub const MIN_MODEL_YEAR: i32 = 1990;
pub const MAX_ODOMETER: u32 = 300_000;
pub const ODOMETER_STEP: u32 = 1_000;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Explore,
    Predict,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub resources: Arc<Resources>,
    pub page: Page,
    pub explore: ExploreState,
    pub predict: PredictState,
}

impl AppState {
    pub fn new(resources: Arc<Resources>) -> Self {
        Self {
            resources,
            page: Page::Explore,
            explore: ExploreState::default(),
            predict: PredictState::default(),
        }
    }

    /// Load the dataset on first visit and initialise filters from it.
    /// Returns the load error message when the exploration page cannot run.
    pub fn ensure_dataset(&mut self) -> Result<Arc<VehicleTable>, String> {
        if let Some(table) = &self.explore.table {
            return Ok(Arc::clone(table));
        }
        let table = self
            .resources
            .dataset()
            .map_err(|e| format!("Could not load vehicle data from {}: {e}", self.resources.data_source()))?;
        self.explore.set_table(Arc::clone(&table));
        Ok(table)
    }

    /// Load the model bundle on first visit and initialise the form from it.
    pub fn ensure_model(&mut self) -> Result<Arc<ModelBundle>, String> {
        if let Some(bundle) = &self.predict.bundle {
            return Ok(Arc::clone(bundle));
        }
        let bundle = self
            .resources
            .model_bundle()
            .map_err(|e| format!("Could not load the price model: {e}"))?;
        self.predict.set_bundle(Arc::clone(&bundle));
        Ok(bundle)
    }
}

// ---------------------------------------------------------------------------
// Exploration page
// ---------------------------------------------------------------------------

/// What the exploration page shows for the current criteria.
#[derive(Debug, Clone, PartialEq)]
pub enum Exploration {
    /// No model selected: advisory only, never the unfiltered table.
    EmptySelection,
    NoMatches,
    Results(Box<Aggregates>),
}

/// Chart tab shown below the metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExploreTab {
    #[default]
    PriceDistribution,
    AgeVsOdometer,
    Condition,
    Data,
}

#[derive(Default)]
pub struct ExploreState {
    pub table: Option<Arc<VehicleTable>>,
    pub tab: ExploreTab,
    pub criteria: FilterCriteria,
    pub exploration: Option<Exploration>,
}

impl ExploreState {
    pub fn set_table(&mut self, table: Arc<VehicleTable>) {
        self.criteria = FilterCriteria::defaults(&table);
        self.table = Some(table);
        self.refilter();
    }

    /// Recompute aggregates after a criteria change.
    pub fn refilter(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        let exploration = if !self.criteria.has_models() {
            log::warn!("No models selected; showing no listings");
            Exploration::EmptySelection
        } else {
            let rows = filter(table, &self.criteria);
            log::debug!("{} of {} listings match the filters", rows.len(), table.len());
            match aggregate(&rows) {
                Some(agg) => Exploration::Results(Box::new(agg)),
                None => Exploration::NoMatches,
            }
        };
        self.exploration = Some(exploration);
    }

    /// Records passing the current criteria, in table order.
    pub fn visible_rows(&self) -> Vec<&VehicleRecord> {
        match &self.table {
            Some(table) => filter(table, &self.criteria),
            None => Vec::new(),
        }
    }

    /// Toggle a single model in the selection.
    pub fn toggle_model(&mut self, model: &str) {
        toggle(&mut self.criteria.models, model);
        self.refilter();
    }

    /// Toggle a single vehicle type in the selection.
    pub fn toggle_type(&mut self, vehicle_type: &str) {
        toggle(&mut self.criteria.vehicle_types, vehicle_type);
        self.refilter();
    }

    pub fn set_price_range(&mut self, min: f64, max: f64) {
        self.criteria.price_range = (min.min(max), max.max(min));
        self.refilter();
    }

    pub fn select_all_types(&mut self) {
        if let Some(table) = &self.table {
            self.criteria.vehicle_types = table.vehicle_types.iter().cloned().collect();
            self.refilter();
        }
    }

    pub fn clear_models(&mut self) {
        self.criteria.models.clear();
        self.refilter();
    }
}

fn toggle(set: &mut std::collections::BTreeSet<String>, value: &str) {
    if !set.remove(value) {
        set.insert(value.to_string());
    }
}

// ---------------------------------------------------------------------------
// Prediction page
// ---------------------------------------------------------------------------

/// Result of the last form submission.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    Price {
        price: f64,
        /// The submitted input, pretty-printed.
        input_json: String,
        feature_order: Vec<&'static str>,
        /// The row the regressor was evaluated on.
        encoded_row: Vec<f64>,
    },
    Failed(String),
}

pub struct PredictState {
    pub bundle: Option<Arc<ModelBundle>>,
    pub form: PredictionInput,
    pub outcome: Option<PredictionOutcome>,
}

impl Default for PredictState {
    fn default() -> Self {
        Self {
            bundle: None,
            form: PredictionInput {
                model_year: 2015,
                model: String::new(),
                condition: String::new(),
                fuel: String::new(),
                odometer: 50_000,
                transmission: String::new(),
                vehicle_type: String::new(),
            },
            outcome: None,
        }
    }
}

impl PredictState {
    /// Keep the bundle and pre-select the first option of every combo box.
    pub fn set_bundle(&mut self, bundle: Arc<ModelBundle>) {
        for field in CategoricalField::ALL {
            let first = bundle.encoder(field).sorted_classes().into_iter().next();
            *self.category_mut(field) = first.unwrap_or_default();
        }
        self.bundle = Some(bundle);
        self.outcome = None;
    }

    pub fn category_mut(&mut self, field: CategoricalField) -> &mut String {
        match field {
            CategoricalField::Model => &mut self.form.model,
            CategoricalField::Condition => &mut self.form.condition,
            CategoricalField::Fuel => &mut self.form.fuel,
            CategoricalField::Transmission => &mut self.form.transmission,
            CategoricalField::Type => &mut self.form.vehicle_type,
        }
    }

    /// Run the form through the model and keep the outcome for display.
    pub fn submit(&mut self) {
        let Some(bundle) = &self.bundle else {
            return;
        };
        let result = predict(bundle, &self.form)
            .and_then(|price| Ok((price, encode(bundle, &self.form)?)));
        let outcome = match result {
            Ok((price, encoded_row)) => {
                log::info!("Estimated price {price:.2} for {:?}", self.form);
                PredictionOutcome::Price {
                    price,
                    input_json: serde_json::to_string_pretty(&self.form).unwrap_or_default(),
                    feature_order: bundle.feature_order().iter().map(|f| f.name()).collect(),
                    encoded_row,
                }
            }
            Err(e) => {
                log::warn!("Prediction rejected: {e}");
                PredictionOutcome::Failed(e.to_string())
            }
        };
        self.outcome = Some(outcome);
    }
}

/// Latest model year offered by the form.
pub fn max_model_year() -> i32 {
    chrono::Local::now().year()
}
