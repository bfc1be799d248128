//! Prediction layer: the persisted model bundle and the adapter that turns a
//! form submission into a price.
//!
//! ```text
//!  model_bundle.json(.gz)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  bundle   │  components checked, encoders + regressor + feature order
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ inference  │  PredictionInput → encoded row → regressor → price
//!   └───────────┘
//! ```

pub mod bundle;
pub mod encoder;
pub mod features;
pub mod inference;
pub mod regressor;
