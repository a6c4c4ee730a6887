//! Numeric primitives: single-predictor least squares and series transforms.

pub mod ols;
pub mod series;

pub use ols::*;
pub use series::*;
