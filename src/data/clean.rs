use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use super::model::{RawVehicleRecord, VehicleRecord, VehicleTable};
use crate::error::DataLoadError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Brand substrings re-capitalized after lowercasing, applied in this order.
/// Every occurrence is replaced in place, so "ford f-150" becomes "Ford f-150".
pub const BRAND_NAMES: [(&str, &str); 9] = [
    ("ford", "Ford"),
    ("chevrolet", "Chevrolet"),
    ("toyota", "Toyota"),
    ("honda", "Honda"),
    ("nissan", "Nissan"),
    ("jeep", "Jeep"),
    ("bmw", "BMW"),
    ("mercedes", "Mercedes"),
    ("hyundai", "Hyundai"),
];

/// Numeric columns whose gaps are filled with medians.
const FILLED_COLUMNS: [&str; 3] = ["model_year", "odometer", "cylinders"];
const MODEL_YEAR: usize = 0;
const ODOMETER: usize = 1;
const CYLINDERS: usize = 2;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Clean raw listings into a [`VehicleTable`].
///
/// Steps, in order:
/// 1. validate required columns and parse `date_posted`;
/// 2. default `is_4wd` to false and `paint_color` to "unknown";
/// 3. fill `model_year`, `odometer` and `cylinders` with the median of the
///    row's raw model group, then with the median of the whole column;
/// 4. normalize model labels (lowercase + brand re-capitalization);
/// 5. derive posting year/month, vehicle age and mileage per year.
pub fn clean(raw: Vec<RawVehicleRecord>) -> Result<VehicleTable, DataLoadError> {
    let mut rows = raw
        .into_iter()
        .enumerate()
        .map(|(i, r)| PartialRecord::validate(i, r))
        .collect::<Result<Vec<_>, _>>()?;

    for column in 0..FILLED_COLUMNS.len() {
        fill_with_group_median(&mut rows, column)?;
    }

    let records = rows.into_iter().map(PartialRecord::finish).collect();
    Ok(VehicleTable::from_records(records))
}

/// Lowercase a model label and re-capitalize known brand substrings.
pub fn normalize_model(label: &str) -> String {
    let mut model = label.to_lowercase();
    for (from, to) in BRAND_NAMES {
        if model.contains(from) {
            model = model.replace(from, to);
        }
    }
    model
}

/// Parse a posting date, accepting a bare date or a date-time.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

/// Median of the given values; mean of the two middle values for even counts.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

// ---------------------------------------------------------------------------
// Intermediate row
// ---------------------------------------------------------------------------

/// A row whose required columns are validated but whose numeric gaps are
/// still open.
struct PartialRecord {
    price: f64,
    raw_model: String,
    condition: String,
    fuel: String,
    transmission: String,
    vehicle_type: String,
    is_4wd: bool,
    paint_color: String,
    date_posted: NaiveDate,
    /// Indexed by the `FILLED_COLUMNS` positions.
    numeric: [Option<f64>; 3],
}

impl PartialRecord {
    fn validate(row: usize, raw: RawVehicleRecord) -> Result<Self, DataLoadError> {
        let price = present(raw.price).ok_or(DataLoadError::MissingField {
            row,
            column: "price",
        })?;
        let raw_model = required(row, "model", raw.model)?;
        let condition = required(row, "condition", raw.condition)?;
        let fuel = required(row, "fuel", raw.fuel)?;
        let transmission = required(row, "transmission", raw.transmission)?;
        let vehicle_type = required(row, "type", raw.vehicle_type)?;
        let date_text = required(row, "date_posted", raw.date_posted)?;
        let date_posted = parse_date(&date_text).ok_or(DataLoadError::InvalidValue {
            row,
            column: "date_posted",
            value: date_text,
        })?;

        let paint_color = raw
            .paint_color
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "unknown".to_string());

        Ok(PartialRecord {
            price,
            raw_model,
            condition,
            fuel,
            transmission,
            vehicle_type,
            is_4wd: present(raw.is_4wd).is_some_and(|v| v != 0.0),
            paint_color,
            date_posted,
            numeric: [
                present(raw.model_year),
                present(raw.odometer),
                present(raw.cylinders),
            ],
        })
    }

    /// Only called once every numeric gap has been filled.
    fn finish(self) -> VehicleRecord {
        let [model_year, odometer, cylinders] = self.numeric.map(|v| v.unwrap_or(f64::NAN));
        let year_posted = self.date_posted.year();
        let vehicle_age = f64::from(year_posted) - model_year;

        VehicleRecord {
            price: self.price,
            model_year,
            model: normalize_model(&self.raw_model),
            condition: self.condition,
            fuel: self.fuel,
            odometer,
            transmission: self.transmission,
            vehicle_type: self.vehicle_type,
            cylinders,
            is_4wd: self.is_4wd,
            paint_color: self.paint_color,
            date_posted: self.date_posted,
            year_posted,
            month_posted: self.date_posted.month(),
            vehicle_age,
            mileage_per_year: odometer / vehicle_age.max(1.0),
        }
    }
}

fn present(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

fn required(row: usize, column: &'static str, v: Option<String>) -> Result<String, DataLoadError> {
    v.map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(DataLoadError::MissingField { row, column })
}

// ---------------------------------------------------------------------------
// Median filling
// ---------------------------------------------------------------------------

/// Fill gaps in one numeric column: group median first, then the median of the
/// column after group filling.
fn fill_with_group_median(rows: &mut [PartialRecord], column: usize) -> Result<(), DataLoadError> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for r in rows.iter() {
        let values = groups.entry(r.raw_model.as_str()).or_default();
        if let Some(v) = r.numeric[column] {
            values.push(v);
        }
    }
    let group_medians: BTreeMap<String, f64> = groups
        .into_iter()
        .filter_map(|(model, mut values)| median(&mut values).map(|m| (model.to_string(), m)))
        .collect();

    for r in rows.iter_mut() {
        if r.numeric[column].is_none() {
            r.numeric[column] = group_medians.get(&r.raw_model).copied();
        }
    }

    if rows.iter().all(|r| r.numeric[column].is_some()) {
        return Ok(());
    }

    let mut filled: Vec<f64> = rows.iter().filter_map(|r| r.numeric[column]).collect();
    let global = median(&mut filled).ok_or(DataLoadError::EmptyColumn(FILLED_COLUMNS[column]))?;
    log::debug!(
        "{}: filling model groups without data with global median {global}",
        FILLED_COLUMNS[column]
    );
    for r in rows.iter_mut() {
        r.numeric[column].get_or_insert(global);
    }
    Ok(())
}
