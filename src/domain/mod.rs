//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - dataset rows and the loaded dataset (`Record`, `Dataset`)
//! - the filter value object (`FilterSpec`, `DateSelection`, `Choice`)
//! - aggregation vocabulary (`Measure`, `Reducer`, `RushWindow`, `NumericColumn`)
//! - canonical label orderings used when sorting grouped output

pub mod types;

pub use types::*;
