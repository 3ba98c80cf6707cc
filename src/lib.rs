//! `bike-dash` library crate.
//!
//! The binary (`bike-dash`) is a thin wrapper around this library so that:
//!
//! - filtering, aggregation and statistics are testable without a terminal
//! - the TUI and the printing commands share one computation pipeline

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod filter;
pub mod io;
pub mod math;
pub mod report;
pub mod stats;
pub mod tui;

#[cfg(test)]
mod testing;
