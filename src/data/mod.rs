//! Data layer: record model, generation, loading, filtering and summaries.
//!
//! Architecture:
//! ```text
//!  RecordGenerator          .csv / .json / .parquet
//!        │                          │
//!        ▼                          ▼
//!   ┌──────────┐              ┌──────────┐
//!   │ generator │              │  loader   │  parse file → RecordSet
//!   └──────────┘              └──────────┘
//!        │                          │
//!        └────────────┬─────────────┘
//!                     ▼
//!              ┌─────────────┐
//!              │  RecordSet   │  Arc<Schema>, Vec<Record>
//!              └─────────────┘
//!                     │
//!        ┌────────────┼──────────────┐
//!        ▼            ▼              ▼
//!   ┌────────┐   ┌────────┐    ┌──────────┐
//!   │ filter  │   │ stats   │    │  series   │  histogram / scatter
//!   └────────┘   └────────┘    └──────────┘
//! ```

pub mod cache;
pub mod filter;
pub mod generator;
pub mod loader;
pub mod model;
mod names;
pub mod series;
pub mod stats;
pub mod writer;
