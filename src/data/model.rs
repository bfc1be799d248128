use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Fixed vocabularies
// ---------------------------------------------------------------------------

/// Declared vehicle conditions, best to worst. Charts and counts use this order.
pub const CONDITION_ORDER: [&str; 6] = ["new", "like new", "excellent", "good", "fair", "salvage"];

// ---------------------------------------------------------------------------
// RawVehicleRecord – one row as it comes out of the source
// ---------------------------------------------------------------------------

/// A listing row before cleaning. Every column is optional here; the cleaner
/// decides which gaps are filled and which are fatal.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawVehicleRecord {
    pub price: Option<f64>,
    pub model_year: Option<f64>,
    pub model: Option<String>,
    pub condition: Option<String>,
    pub cylinders: Option<f64>,
    pub fuel: Option<String>,
    pub odometer: Option<f64>,
    pub transmission: Option<String>,
    #[serde(rename = "type")]
    pub vehicle_type: Option<String>,
    pub paint_color: Option<String>,
    /// 1.0 / 0.0 in the source; `true` / `false` cells are accepted too.
    #[serde(default, deserialize_with = "flag_or_number")]
    pub is_4wd: Option<f64>,
    pub date_posted: Option<String>,
}

/// Read a cell that holds either a number or a boolean word (any case).
/// Empty cells are `None`.
fn flag_or_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(text) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let text = text.trim();
    if text.is_empty() {
        Ok(None)
    } else if text.eq_ignore_ascii_case("true") {
        Ok(Some(1.0))
    } else if text.eq_ignore_ascii_case("false") {
        Ok(Some(0.0))
    } else {
        text.parse::<f64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid flag '{text}'")))
    }
}

// ---------------------------------------------------------------------------
// VehicleRecord – one row of the cleaned table
// ---------------------------------------------------------------------------

/// A cleaned listing with its derived features.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleRecord {
    pub price: f64,
    /// Manufacturing year. Fractional when filled from an even-sized median.
    pub model_year: f64,
    /// Lowercased model label with brand names re-capitalized.
    pub model: String,
    pub condition: String,
    pub fuel: String,
    pub odometer: f64,
    pub transmission: String,
    pub vehicle_type: String,
    pub cylinders: f64,
    pub is_4wd: bool,
    pub paint_color: String,
    pub date_posted: NaiveDate,
    pub year_posted: i32,
    pub month_posted: u32,
    /// `year_posted - model_year`; may be negative for pre-release listings.
    pub vehicle_age: f64,
    /// `odometer / max(1, vehicle_age)`.
    pub mileage_per_year: f64,
}

// ---------------------------------------------------------------------------
// VehicleTable – the complete cleaned dataset
// ---------------------------------------------------------------------------

/// The cleaned dataset with pre-computed column indices.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleTable {
    pub records: Vec<VehicleRecord>,
    /// Sorted unique model labels.
    pub models: Vec<String>,
    /// Unique vehicle types in order of first appearance.
    pub vehicle_types: Vec<String>,
}

impl VehicleTable {
    /// Build column indices from the cleaned records.
    pub fn from_records(records: Vec<VehicleRecord>) -> Self {
        let models: BTreeSet<&str> = records.iter().map(|r| r.model.as_str()).collect();
        let models = models.into_iter().map(str::to_string).collect();

        let mut seen = BTreeSet::new();
        let mut vehicle_types = Vec::new();
        for r in &records {
            if seen.insert(r.vehicle_type.as_str()) {
                vehicle_types.push(r.vehicle_type.clone());
            }
        }

        VehicleTable {
            records,
            models,
            vehicle_types,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Lowest and highest listed price.
    pub fn price_bounds(&self) -> Option<(f64, f64)> {
        let mut prices = self.records.iter().map(|r| r.price);
        let first = prices.next()?;
        Some(prices.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }

    /// Price quantile with linear interpolation between closest ranks.
    pub fn price_quantile(&self, q: f64) -> Option<f64> {
        let mut prices: Vec<f64> = self.records.iter().map(|r| r.price).collect();
        prices.sort_by(f64::total_cmp);
        quantile_sorted(&prices, q)
    }
}

/// Linear-interpolated quantile of an ascending slice. `q` is clamped to [0, 1].
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A cleaned record with consistent derived fields.
    pub(crate) fn record(model: &str, vehicle_type: &str, price: f64) -> VehicleRecord {
        let date_posted = NaiveDate::from_ymd_opt(2019, 6, 1).unwrap();
        VehicleRecord {
            price,
            model_year: 2012.0,
            model: model.to_string(),
            condition: "good".to_string(),
            fuel: "gas".to_string(),
            odometer: 70_000.0,
            transmission: "automatic".to_string(),
            vehicle_type: vehicle_type.to_string(),
            cylinders: 6.0,
            is_4wd: false,
            paint_color: "unknown".to_string(),
            date_posted,
            year_posted: 2019,
            month_posted: 6,
            vehicle_age: 7.0,
            mileage_per_year: 10_000.0,
        }
    }

    #[test]
    fn indices_are_sorted_models_and_first_seen_types() {
        let table = VehicleTable::from_records(vec![
            record("Toyota camry", "sedan", 9000.0),
            record("Ford f-150", "truck", 15000.0),
            record("Toyota camry", "sedan", 7000.0),
            record("BMW x5", "SUV", 21000.0),
        ]);
        assert_eq!(table.models, vec!["BMW x5", "Ford f-150", "Toyota camry"]);
        assert_eq!(table.vehicle_types, vec!["sedan", "truck", "SUV"]);
        assert_eq!(table.price_bounds(), Some((7000.0, 21000.0)));
    }

    #[test]
    fn quantiles_interpolate_linearly() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&sorted, 0.0), Some(1.0));
        assert_eq!(quantile_sorted(&sorted, 0.25), Some(1.75));
        assert_eq!(quantile_sorted(&sorted, 0.5), Some(2.5));
        assert_eq!(quantile_sorted(&sorted, 1.0), Some(4.0));
        assert_eq!(quantile_sorted(&[], 0.5), None);
    }

    #[test]
    fn empty_table_has_no_bounds() {
        let table = VehicleTable::from_records(Vec::new());
        assert!(table.is_empty());
        assert_eq!(table.price_bounds(), None);
        assert_eq!(table.price_quantile(0.5), None);
    }
}
