//! Numerical helpers: least squares.

pub mod ols;

pub use ols::*;
