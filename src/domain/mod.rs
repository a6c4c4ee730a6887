//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input selectors (`InputMode`, `RateLaw`, `Species`)
//! - model constants (`InitialConcentrations`)
//! - fit outputs (`KineticFit`, `TwoConstantFit`, `OrderSearchResult`, `ArrheniusFit`)
//! - run configuration derived from the CLI (`FitConfig`, `SimulationConfig`, ...)
//! - the JSON export schema (`ResultFile`)

pub mod types;

pub use types::*;
