use std::collections::BTreeSet;

use super::model::{VehicleRecord, VehicleTable};

/// Brands pre-selected when the exploration page opens, in priority order.
const PREFERRED_MODELS: [&str; 5] = ["Ford", "Toyota", "Chevrolet", "Honda", "Nissan"];
const DEFAULT_MODEL_COUNT: usize = 3;

// ---------------------------------------------------------------------------
// Filter predicate
// ---------------------------------------------------------------------------

/// The user's current selection on the exploration page.
///
/// Unlike a per-column "nothing selected means show all" filter, an empty
/// `models` set selects nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub models: BTreeSet<String>,
    /// Inclusive price bounds `(min, max)`.
    pub price_range: (f64, f64),
    pub vehicle_types: BTreeSet<String>,
}

impl FilterCriteria {
    /// The initial selection for a freshly loaded table: up to three preferred
    /// brands (or the first three models), the interquartile price range
    /// truncated to whole dollars, and every vehicle type.
    pub fn defaults(table: &VehicleTable) -> Self {
        let preferred: BTreeSet<String> = PREFERRED_MODELS
            .iter()
            .filter(|m| table.models.iter().any(|t| t == *m))
            .take(DEFAULT_MODEL_COUNT)
            .map(|m| m.to_string())
            .collect();
        let models = if preferred.is_empty() {
            table.models.iter().take(DEFAULT_MODEL_COUNT).cloned().collect()
        } else {
            preferred
        };

        let price_range = match (table.price_bounds(), table.price_quantile(0.25), table.price_quantile(0.75)) {
            (Some((lo, hi)), Some(q1), Some(q3)) => {
                let (lo, hi) = (lo.trunc(), hi.trunc());
                (lo.max(q1.trunc()), hi.min(q3.trunc()))
            }
            _ => (0.0, 0.0),
        };

        FilterCriteria {
            models,
            price_range,
            vehicle_types: table.vehicle_types.iter().cloned().collect(),
        }
    }

    /// Whether at least one model is selected.
    pub fn has_models(&self) -> bool {
        !self.models.is_empty()
    }

    /// Whether a single record passes every predicate.
    pub fn matches(&self, record: &VehicleRecord) -> bool {
        let (min, max) = self.price_range;
        self.models.contains(&record.model)
            && record.price >= min
            && record.price <= max
            && self.vehicle_types.contains(&record.vehicle_type)
    }
}

/// Return indices of records that pass the criteria. Empty when no model is
/// selected.
pub fn filtered_indices(table: &VehicleTable, criteria: &FilterCriteria) -> Vec<usize> {
    if !criteria.has_models() {
        return Vec::new();
    }
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| criteria.matches(r))
        .map(|(i, _)| i)
        .collect()
}

/// Return the records that pass the criteria, in table order.
pub fn filter<'a>(table: &'a VehicleTable, criteria: &FilterCriteria) -> Vec<&'a VehicleRecord> {
    filtered_indices(table, criteria)
        .into_iter()
        .map(|i| &table.records[i])
        .collect()
}
