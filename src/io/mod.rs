//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - load-once memoization (`cache`)
//! - table and correlation exports (CSV/JSON) (`export`)

pub mod cache;
pub mod export;
pub mod ingest;

pub use cache::*;
pub use export::*;
pub use ingest::*;
