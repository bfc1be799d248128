use std::path::PathBuf;
use std::time::Duration;

use crate::data::loader::DataSource;

pub const DEFAULT_DATA_SOURCE: &str =
    "https://raw.githubusercontent.com/Bokols/Prediccion-de-Precios-de-Vehiculos/main/data/vehicles_us.csv";
pub const DEFAULT_MODEL_PATH: &str = "model_bundle.json.gz";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

const ENV_DATA_SOURCE: &str = "VEHICLES_DATA_SOURCE";
const ENV_MODEL_PATH: &str = "VEHICLES_MODEL_PATH";
const ENV_HTTP_TIMEOUT: &str = "VEHICLES_HTTP_TIMEOUT_SECS";

/// Startup configuration. Read once; the values are fixed for the process.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_source: DataSource,
    pub model_path: PathBuf,
    pub http_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_source: DataSource::parse(DEFAULT_DATA_SOURCE),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    /// Build from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = AppConfig::default();

        if let Some(source) = get(ENV_DATA_SOURCE) {
            config.data_source = DataSource::parse(&source);
        }
        if let Some(path) = get(ENV_MODEL_PATH) {
            config.model_path = PathBuf::from(path.trim());
        }
        if let Some(raw) = get(ENV_HTTP_TIMEOUT) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.http_timeout = Duration::from_secs(secs),
                _ => log::warn!(
                    "Ignoring {ENV_HTTP_TIMEOUT}={raw:?}; using {DEFAULT_HTTP_TIMEOUT_SECS}s"
                ),
            }
        }
        config
    }
}
