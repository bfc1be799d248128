use thiserror::Error;

// ---------------------------------------------------------------------------
// Dataset pipeline
// ---------------------------------------------------------------------------

/// Failure to fetch, parse or clean the listings dataset.
///
/// Fatal to the exploration page for the rest of the session.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("unsupported dataset source: {0}")]
    UnsupportedSource(String),

    #[error("row {row}: missing required value in column '{column}'")]
    MissingField { row: usize, column: &'static str },

    #[error("row {row}: invalid value '{value}' in column '{column}'")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("column '{0}' has no values to compute a median from")]
    EmptyColumn(&'static str),
}

// ---------------------------------------------------------------------------
// Model bundle
// ---------------------------------------------------------------------------

/// Failure to load the persisted model bundle.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("model bundle is missing required component '{0}'")]
    MissingComponent(&'static str),

    #[error("failed to load model bundle: {0}")]
    Load(#[from] LoadFailure),
}

/// The underlying reason a bundle could not be deserialized.
#[derive(Debug, Error)]
pub enum LoadFailure {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Invalid(String),
}

impl LoadFailure {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

impl From<std::io::Error> for ModelLoadError {
    fn from(e: std::io::Error) -> Self {
        Self::Load(LoadFailure::Io(e))
    }
}

impl From<serde_json::Error> for ModelLoadError {
    fn from(e: serde_json::Error) -> Self {
        Self::Load(LoadFailure::Json(e))
    }
}

// ---------------------------------------------------------------------------
// Inference
// ---------------------------------------------------------------------------

/// Failure while turning a form submission into a prediction.
#[derive(Debug, Error, PartialEq)]
pub enum PredictError {
    #[error("unknown {field} '{value}': not part of the model's vocabulary")]
    UnknownCategory { field: &'static str, value: String },
}
