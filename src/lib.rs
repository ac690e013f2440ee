//! Synthetic tabular records and the summaries an exploratory dashboard
//! draws from them.
//!
//! ```no_run
//! use rusty_eda::data::{filter::FilterSpec, generator, stats};
//!
//! let records = generator::generate(100, Some(1)).unwrap();
//! let only_a = rusty_eda::data::filter::filter(
//!     &records,
//!     &FilterSpec::default().allow("category", ["A"]),
//! )
//! .unwrap();
//! let summary = stats::describe(&only_a);
//! println!("{:?}", summary.numeric("sales"));
//! ```

pub mod config;
pub mod data;
pub mod error;

pub use data::filter::{filter, FilterSpec};
pub use data::generator::{generate, Profile, RecordGenerator};
pub use data::model::{FieldKind, FieldValue, RecordSet};
pub use data::stats::{category_counts, correlation_matrix, describe, null_counts};
pub use error::EdaError;
