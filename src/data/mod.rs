/// Data layer: core types and loading.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file, map voltage/displacement columns
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Sweep    │  Vec<Sample> in acquisition order
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
