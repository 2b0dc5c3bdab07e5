/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .txt / .tsv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + validate → SalesTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  date → region → state → city → FilteredDataset
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌───────────┐  ┌──────────┐
///   │ aggregate │  │  export   │  filtered / full table → CSV
///   └───────────┘  └──────────┘
///    six views
/// ```

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod options;
