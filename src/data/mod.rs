/// Data layer: core types, fetching, filtering and aggregation.
///
/// Architecture:
/// ```text
///  products endpoint (JSON)
///        │
///        ▼
///   ┌──────────┐
///   │  source   │  GET ?regiao=&ano= → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  AND of selections / ranges → subset
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  location / month / category / seller tables
///   └───────────┘
/// ```

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod model;
pub mod regions;
pub mod source;
