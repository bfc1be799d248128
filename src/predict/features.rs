use std::fmt;

// ---------------------------------------------------------------------------
// Categorical fields
// ---------------------------------------------------------------------------

/// A form field that must be label-encoded before inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CategoricalField {
    Model,
    Condition,
    Fuel,
    Transmission,
    Type,
}

impl CategoricalField {
    /// Encoding order; also the order components are checked in.
    pub const ALL: [CategoricalField; 5] = [
        CategoricalField::Model,
        CategoricalField::Condition,
        CategoricalField::Fuel,
        CategoricalField::Transmission,
        CategoricalField::Type,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CategoricalField::Model => "model",
            CategoricalField::Condition => "condition",
            CategoricalField::Fuel => "fuel",
            CategoricalField::Transmission => "transmission",
            CategoricalField::Type => "type",
        }
    }

    /// Key of this field's encoder inside the bundle.
    pub fn component_key(self) -> &'static str {
        match self {
            CategoricalField::Model => "encoder_model",
            CategoricalField::Condition => "encoder_condition",
            CategoricalField::Fuel => "encoder_fuel",
            CategoricalField::Transmission => "encoder_transmission",
            CategoricalField::Type => "encoder_type",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// Model features
// ---------------------------------------------------------------------------

/// One column of the regressor's input row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Feature {
    ModelYear,
    Odometer,
    Categorical(CategoricalField),
}

impl Feature {
    /// Column order used when the regressor does not declare its own.
    pub const DEFAULT_ORDER: [Feature; 7] = [
        Feature::ModelYear,
        Feature::Categorical(CategoricalField::Model),
        Feature::Categorical(CategoricalField::Condition),
        Feature::Categorical(CategoricalField::Fuel),
        Feature::Odometer,
        Feature::Categorical(CategoricalField::Transmission),
        Feature::Categorical(CategoricalField::Type),
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::ModelYear => "model_year",
            Feature::Odometer => "odometer",
            Feature::Categorical(field) => field.name(),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "model_year" => Some(Feature::ModelYear),
            "odometer" => Some(Feature::Odometer),
            other => CategoricalField::ALL
                .into_iter()
                .find(|f| f.name() == other)
                .map(Feature::Categorical),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed-size table keyed by [`CategoricalField`].
#[derive(Debug, Clone, PartialEq)]
pub struct PerField<T>([T; 5]);

impl<T> PerField<T> {
    pub fn new(values: [T; 5]) -> Self {
        PerField(values)
    }

    pub fn get(&self, field: CategoricalField) -> &T {
        &self.0[field.index()]
    }
}
