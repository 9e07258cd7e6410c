/// Data layer: core types, loading, filtering and the views built on top.
///
/// Architecture:
/// ```text
///  .xlsx / .ods / .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → Table   (cache: reuse per path)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table   │  Vec<Row>, distinct values per column
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  substring + numeric range predicates → new Table
///   └──────────┘
///        │
///        ├──► summary  count / mean / min / max, price series
///        └──► export   CSV
/// ```

pub mod cache;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod summary;
