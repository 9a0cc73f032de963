/// Data layer: core types, loading, cleaning, features, filtering, aggregation.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → RawTable (nullable fields)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean   │  fill defaults, drop untitled rows, parse dates → PaperTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ features │  word counts, in place
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  optional year range / journal selection
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  by-year, top journals, title words → Aggregates
///   └───────────┘
/// ```

pub mod aggregate;
pub mod clean;
pub mod features;
pub mod filter;
pub mod loader;
pub mod model;
