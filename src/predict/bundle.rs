use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};

use super::encoder::LabelEncoder;
use super::features::{CategoricalField, Feature, PerField};
use super::regressor::{Regress, RegressionModel, Regressor};
use crate::error::{LoadFailure, ModelLoadError};

/// Components every bundle must carry, in the order they are checked.
pub const REQUIRED_COMPONENTS: [&str; 6] = [
    "regressor",
    "encoder_model",
    "encoder_condition",
    "encoder_fuel",
    "encoder_transmission",
    "encoder_type",
];

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

// ---------------------------------------------------------------------------
// ModelBundle
// ---------------------------------------------------------------------------

/// A trained regressor with one label encoder per categorical field and the
/// column order the regressor expects. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelBundle {
    regressor: RegressionModel,
    encoders: PerField<LabelEncoder>,
    feature_order: Vec<Feature>,
}

impl ModelBundle {
    pub fn regressor(&self) -> &RegressionModel {
        &self.regressor
    }

    pub fn encoder(&self, field: CategoricalField) -> &LabelEncoder {
        self.encoders.get(field)
    }

    /// Exact column order of the regressor's input row.
    pub fn feature_order(&self) -> &[Feature] {
        &self.feature_order
    }

    /// Parse a bundle from raw artifact bytes, gzip-compressed or not.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ModelLoadError> {
        let decompressed;
        let text = if data.starts_with(&GZIP_MAGIC) {
            let mut buf = Vec::new();
            GzDecoder::new(data).read_to_end(&mut buf)?;
            decompressed = buf;
            decompressed.as_slice()
        } else {
            data
        };

        let mut root = match serde_json::from_slice::<JsonValue>(text)? {
            JsonValue::Object(map) => map,
            _ => return Err(LoadFailure::invalid("bundle must be a JSON object").into()),
        };

        if let Some(missing) = REQUIRED_COMPONENTS.into_iter().find(|k| !root.contains_key(*k)) {
            return Err(ModelLoadError::MissingComponent(missing));
        }

        let regressor: Regressor = take_component(&mut root, "regressor")?;
        let encoders = PerField::new([
            take_component(&mut root, CategoricalField::Model.component_key())?,
            take_component(&mut root, CategoricalField::Condition.component_key())?,
            take_component(&mut root, CategoricalField::Fuel.component_key())?,
            take_component(&mut root, CategoricalField::Transmission.component_key())?,
            take_component(&mut root, CategoricalField::Type.component_key())?,
        ]);

        let feature_order = match &regressor.feature_names {
            Some(names) => resolve_feature_names(names)?,
            None => Feature::DEFAULT_ORDER.to_vec(),
        };
        regressor
            .model
            .validate(feature_order.len())
            .map_err(LoadFailure::invalid)?;

        Ok(ModelBundle {
            regressor: regressor.model,
            encoders,
            feature_order,
        })
    }
}

/// Load and validate a bundle from disk.
pub fn load_model_bundle(path: &Path) -> Result<ModelBundle, ModelLoadError> {
    let data = std::fs::read(path)?;
    ModelBundle::from_bytes(&data)
}

fn take_component<T: DeserializeOwned>(root: &mut Map<String, JsonValue>, key: &'static str) -> Result<T, ModelLoadError> {
    let value = root.remove(key).ok_or(ModelLoadError::MissingComponent(key))?;
    serde_json::from_value(value)
        .map_err(|e| LoadFailure::invalid(format!("component '{key}': {e}")).into())
}

fn resolve_feature_names(names: &[String]) -> Result<Vec<Feature>, LoadFailure> {
    if names.is_empty() {
        return Err(LoadFailure::invalid("regressor declares no features"));
    }
    let mut order: Vec<Feature> = Vec::with_capacity(names.len());
    for name in names {
        let feature = Feature::from_name(name)
            .ok_or_else(|| LoadFailure::invalid(format!("unknown feature '{name}'")))?;
        if order.contains(&feature) {
            return Err(LoadFailure::invalid(format!("feature '{name}' listed twice")));
        }
        order.push(feature);
    }
    Ok(order)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;

    use flate2::write::GzEncoder;
    use flate2::Compression;
    use serde_json::json;

    use super::*;

    /// A linear bundle with the default column order.
    ///
    /// price = -990000 + 500·year + 1000·model − 200·condition + 300·fuel
    ///         − 0.0625·odometer − 400·transmission + 250·type
    pub(crate) fn linear_bundle_json() -> JsonValue {
        json!({
            "regressor": {
                "kind": "linear",
                "intercept": -990000.0,
                "coefficients": [500.0, 1000.0, -200.0, 300.0, -0.0625, -400.0, 250.0]
            },
            "encoder_model": { "classes": ["BMW x5", "Ford f-150", "Toyota"] },
            "encoder_condition": { "classes": ["excellent", "fair", "good", "like new", "new", "salvage"] },
            "encoder_fuel": { "classes": ["diesel", "electric", "gas", "hybrid", "other"] },
            "encoder_transmission": { "classes": ["automatic", "manual", "other"] },
            "encoder_type": { "classes": ["SUV", "coupe", "pickup", "sedan", "truck"] }
        })
    }

    pub(crate) fn linear_bundle() -> ModelBundle {
        ModelBundle::from_bytes(linear_bundle_json().to_string().as_bytes()).unwrap()
    }

    fn gzip(bytes: &[u8]) -> Vec<u8> {
        let mut enc = GzEncoder::new(Vec::new(), Compression::fast());
        enc.write_all(bytes).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn complete_bundle_loads_with_default_order() {
        let bundle = linear_bundle();
        assert_eq!(bundle.feature_order(), &Feature::DEFAULT_ORDER);
        assert_eq!(bundle.encoder(CategoricalField::Fuel).encode("gas"), Some(2));
    }

    #[test]
    fn each_missing_component_is_named() {
        for key in REQUIRED_COMPONENTS {
            let mut doc = linear_bundle_json();
            doc.as_object_mut().unwrap().remove(key);
            let err = ModelBundle::from_bytes(doc.to_string().as_bytes()).unwrap_err();
            match err {
                ModelLoadError::MissingComponent(name) => assert_eq!(name, key),
                other => panic!("expected MissingComponent({key}), got {other:?}"),
            }
        }
    }

    #[test]
    fn first_missing_component_wins() {
        let mut doc = linear_bundle_json();
        let map = doc.as_object_mut().unwrap();
        map.remove("encoder_type");
        map.remove("encoder_condition");
        let err = ModelBundle::from_bytes(doc.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, ModelLoadError::MissingComponent("encoder_condition")));
    }

    #[test]
    fn gzip_and_plain_artifacts_load_identically() {
        let plain = linear_bundle_json().to_string();
        let from_gzip = ModelBundle::from_bytes(&gzip(plain.as_bytes())).unwrap();
        assert_eq!(from_gzip, linear_bundle());
    }

    #[test]
    fn declared_feature_names_set_the_order() {
        let mut doc = linear_bundle_json();
        doc["regressor"]["feature_names"] = json!(["type", "odometer", "model", "condition", "fuel", "model_year", "transmission"]);
        let bundle = ModelBundle::from_bytes(doc.to_string().as_bytes()).unwrap();
        assert_eq!(bundle.feature_order()[0], Feature::Categorical(CategoricalField::Type));
        assert_eq!(bundle.feature_order()[1], Feature::Odometer);
    }

    #[test]
    fn invalid_feature_lists_are_load_errors() {
        for names in [json!(["model_year", "colour"]), json!(["model_year", "model_year"]), json!([])] {
            let mut doc = linear_bundle_json();
            doc["regressor"]["feature_names"] = names;
            let err = ModelBundle::from_bytes(doc.to_string().as_bytes()).unwrap_err();
            assert!(matches!(err, ModelLoadError::Load(LoadFailure::Invalid(_))));
        }
    }

    #[test]
    fn coefficient_count_must_match_features() {
        let mut doc = linear_bundle_json();
        doc["regressor"]["coefficients"] = json!([1.0, 2.0]);
        let err = ModelBundle::from_bytes(doc.to_string().as_bytes()).unwrap_err();
        assert!(err.to_string().contains("2 coefficients but 7 features"));
    }

    #[test]
    fn corrupt_artifacts_are_load_errors() {
        let err = ModelBundle::from_bytes(b"\x1f\x8bnot really gzip").unwrap_err();
        assert!(matches!(err, ModelLoadError::Load(LoadFailure::Io(_))));

        let err = ModelBundle::from_bytes(b"{ truncated").unwrap_err();
        assert!(matches!(err, ModelLoadError::Load(LoadFailure::Json(_))));

        let err = ModelBundle::from_bytes(b"[1, 2, 3]").unwrap_err();
        assert!(matches!(err, ModelLoadError::Load(LoadFailure::Invalid(_))));
    }

    #[test]
    fn malformed_component_is_a_load_error() {
        let mut doc = linear_bundle_json();
        doc["encoder_fuel"] = json!({ "classes": "gas" });
        let err = ModelBundle::from_bytes(doc.to_string().as_bytes()).unwrap_err();
        assert!(err.to_string().contains("component 'encoder_fuel'"));
    }

    #[test]
    fn bundles_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&gzip(linear_bundle_json().to_string().as_bytes())).unwrap();
        assert_eq!(load_model_bundle(file.path()).unwrap(), linear_bundle());

        let err = load_model_bundle(Path::new("/no/such/model_bundle.json.gz")).unwrap_err();
        assert!(matches!(err, ModelLoadError::Load(LoadFailure::Io(_))));
    }
}
