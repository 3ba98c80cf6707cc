//! Reporting: formatted terminal output and narrative insights.

pub mod format;
pub mod insights;

pub use format::*;
pub use insights::*;
