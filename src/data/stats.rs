use std::collections::BTreeMap;

use super::model::{VehicleRecord, CONDITION_ORDER};

// ---------------------------------------------------------------------------
// Aggregates for the exploration page
// ---------------------------------------------------------------------------

/// Headline metrics of a filtered selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean_price: f64,
    pub mean_odometer: f64,
    pub mean_age: f64,
}

/// Condition counts in vocabulary order. Categories with no rows are reported
/// as zero; conditions outside the vocabulary are tallied in `other`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionCounts {
    pub counts: Vec<(&'static str, usize)>,
    pub other: usize,
}

impl ConditionCounts {
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum::<usize>() + self.other
    }
}

/// Everything the charts need, computed once per filter change.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregates {
    pub summary: Summary,
    /// Mean price per model, ascending by price.
    pub price_by_model: Vec<(String, f64)>,
    /// Mean price per vehicle type, ascending by price.
    pub price_by_type: Vec<(String, f64)>,
    pub conditions: ConditionCounts,
    /// `[vehicle_age, odometer, price]` per row.
    pub age_vs_odometer: Vec<[f64; 3]>,
}

/// Compute all aggregates. `None` for an empty selection.
pub fn aggregate(rows: &[&VehicleRecord]) -> Option<Aggregates> {
    Some(Aggregates {
        summary: summarize(rows)?,
        price_by_model: mean_price_by(rows, |r| &r.model),
        price_by_type: mean_price_by(rows, |r| &r.vehicle_type),
        conditions: condition_counts(rows),
        age_vs_odometer: rows
            .iter()
            .map(|r| [r.vehicle_age, r.odometer, r.price])
            .collect(),
    })
}

pub fn summarize(rows: &[&VehicleRecord]) -> Option<Summary> {
    if rows.is_empty() {
        return None;
    }
    let n = rows.len() as f64;
    let mean = |f: fn(&VehicleRecord) -> f64| rows.iter().map(|r| f(r)).sum::<f64>() / n;
    Some(Summary {
        count: rows.len(),
        mean_price: mean(|r| r.price),
        mean_odometer: mean(|r| r.odometer),
        mean_age: mean(|r| r.vehicle_age),
    })
}

/// Mean price per group, ascending by value. Ties keep group-label order.
pub fn mean_price_by(rows: &[&VehicleRecord], key: fn(&VehicleRecord) -> &String) -> Vec<(String, f64)> {
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for r in rows {
        let entry = groups.entry(key(r).as_str()).or_insert((0.0, 0));
        entry.0 += r.price;
        entry.1 += 1;
    }
    let mut means: Vec<(String, f64)> = groups
        .into_iter()
        .map(|(k, (sum, n))| (k.to_string(), sum / n as f64))
        .collect();
    means.sort_by(|a, b| a.1.total_cmp(&b.1));
    means
}

pub fn condition_counts(rows: &[&VehicleRecord]) -> ConditionCounts {
    let mut counts: Vec<(&'static str, usize)> = CONDITION_ORDER.iter().map(|c| (*c, 0)).collect();
    let mut other = 0;
    for r in rows {
        match counts.iter_mut().find(|(c, _)| *c == r.condition) {
            Some((_, n)) => *n += 1,
            None => other += 1,
        }
    }
    ConditionCounts { counts, other }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn with_condition(mut r: VehicleRecord, condition: &str) -> VehicleRecord {
        r.condition = condition.to_string();
        r
    }

    #[test]
    fn summary_means_cover_exactly_the_rows() {
        let mut a = record("Ford f-150", "pickup", 10000.0);
        a.odometer = 50_000.0;
        a.vehicle_age = 4.0;
        let mut b = record("Ford f-150", "pickup", 20000.0);
        b.odometer = 150_000.0;
        b.vehicle_age = 9.0;
        let rows = vec![&a, &b];

        let s = summarize(&rows).unwrap();
        assert_eq!(s.count, 2);
        assert_eq!(s.mean_price, 15000.0);
        assert_eq!(s.mean_odometer, 100_000.0);
        assert_eq!(s.mean_age, 6.5);
    }

    #[test]
    fn empty_selection_has_no_aggregates() {
        assert_eq!(summarize(&[]), None);
        assert_eq!(aggregate(&[]), None);
    }

    #[test]
    fn group_means_are_sorted_ascending() {
        let recs = [
            record("Toyota camry", "sedan", 9000.0),
            record("BMW x5", "SUV", 30000.0),
            record("Toyota camry", "sedan", 11000.0),
            record("Ford f-150", "truck", 4000.0),
            record("Ford f-150", "SUV", 6000.0),
        ];
        let rows: Vec<&VehicleRecord> = recs.iter().collect();

        let by_model = mean_price_by(&rows, |r| &r.model);
        assert_eq!(
            by_model,
            vec![
                ("Ford f-150".to_string(), 5000.0),
                ("Toyota camry".to_string(), 10000.0),
                ("BMW x5".to_string(), 30000.0),
            ]
        );
        let by_type = mean_price_by(&rows, |r| &r.vehicle_type);
        assert_eq!(
            by_type,
            vec![
                ("truck".to_string(), 4000.0),
                ("sedan".to_string(), 10000.0),
                ("SUV".to_string(), 18000.0),
            ]
        );
    }

    #[test]
    fn condition_counts_keep_every_category() {
        let recs = [
            with_condition(record("Ford f-150", "truck", 1.0), "good"),
            with_condition(record("Ford f-150", "truck", 2.0), "good"),
            with_condition(record("Ford f-150", "truck", 3.0), "salvage"),
            with_condition(record("Ford f-150", "truck", 4.0), "rusty"),
        ];
        let rows: Vec<&VehicleRecord> = recs.iter().collect();

        let counts = condition_counts(&rows);
        assert_eq!(
            counts.counts,
            vec![
                ("new", 0),
                ("like new", 0),
                ("excellent", 0),
                ("good", 2),
                ("fair", 0),
                ("salvage", 1),
            ]
        );
        assert_eq!(counts.other, 1);
        assert_eq!(counts.total(), rows.len());
    }

    #[test]
    fn scatter_points_follow_row_order() {
        let a = record("Jeep wrangler", "SUV", 18000.0);
        let agg = aggregate(&[&a]).unwrap();
        assert_eq!(agg.age_vs_odometer, vec![[7.0, 70_000.0, 18000.0]]);
        assert_eq!(agg.summary.count, 1);
    }
}
