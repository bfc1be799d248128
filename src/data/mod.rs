/// Data layer: core types, loading, cleaning, filtering and aggregation.
///
/// Architecture:
/// ```text
///  remote .csv / local .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  fetch + parse → Vec<RawVehicleRecord>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean    │  fill gaps, normalize brands, derive features
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ VehicleTable │  Vec<VehicleRecord>, model/type indices
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐      ┌──────────┐
///   │  filter   │ ───▶ │  stats    │  means, grouped prices, condition counts
///   └──────────┘      └──────────┘
/// ```

pub mod clean;
pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
