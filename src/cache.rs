use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use crate::config::AppConfig;
use crate::data::loader::{load_dataset, DataSource};
use crate::data::model::VehicleTable;
use crate::error::{DataLoadError, ModelLoadError};
use crate::predict::bundle::{load_model_bundle, ModelBundle};

// ---------------------------------------------------------------------------
// Init-once cell
// ---------------------------------------------------------------------------

/// A value computed at most once and shared read-only afterwards.
///
/// The outcome of the first load is kept, failures included; there is no
/// invalidation.
pub struct Cached<T, E> {
    cell: OnceLock<Result<Arc<T>, E>>,
}

impl<T, E> Default for Cached<T, E> {
    fn default() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }
}

impl<T, E> Cached<T, E> {
    /// Return the cached outcome, running `load` only on first use.
    pub fn get_or_load(&self, load: impl FnOnce() -> Result<T, E>) -> Result<Arc<T>, &E> {
        match self.cell.get_or_init(|| load().map(Arc::new)) {
            Ok(value) => Ok(Arc::clone(value)),
            Err(e) => Err(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Process-wide resources
// ---------------------------------------------------------------------------

/// The dataset and model bundle, each loaded on first request and shared by
/// every page for the lifetime of the process.
pub struct Resources {
    data_source: DataSource,
    http_timeout: Duration,
    model_path: PathBuf,
    dataset: Cached<VehicleTable, DataLoadError>,
    model: Cached<ModelBundle, ModelLoadError>,
}

impl Resources {
    pub fn new(config: &AppConfig) -> Self {
        Resources {
            data_source: config.data_source.clone(),
            http_timeout: config.http_timeout,
            model_path: config.model_path.clone(),
            dataset: Cached::default(),
            model: Cached::default(),
        }
    }

    pub fn dataset(&self) -> Result<Arc<VehicleTable>, &DataLoadError> {
        self.dataset.get_or_load(|| {
            log::info!("Loading listings from {}", self.data_source);
            let result = load_dataset(&self.data_source, self.http_timeout);
            match &result {
                Ok(table) => log::info!(
                    "Loaded {} listings ({} models, {} vehicle types)",
                    table.len(),
                    table.models.len(),
                    table.vehicle_types.len()
                ),
                Err(e) => log::error!("Failed to load listings: {e}"),
            }
            result
        })
    }

    pub fn model_bundle(&self) -> Result<Arc<ModelBundle>, &ModelLoadError> {
        self.model.get_or_load(|| {
            log::info!("Loading model bundle from {}", self.model_path.display());
            let result = load_model_bundle(&self.model_path);
            match &result {
                Ok(bundle) => log::info!(
                    "Model bundle ready, feature order {:?}",
                    bundle.feature_order().iter().map(|f| f.name()).collect::<Vec<_>>()
                ),
                Err(e) => log::error!("Failed to load model bundle: {e}"),
            }
            result
        })
    }

    pub fn data_source(&self) -> &DataSource {
        &self.data_source
    }
}
