//! `batch-kinetics` library crate.
//!
//! The binary (`kfit`) is a thin wrapper around this library so that:
//!
//! - the regression, linearization and order-search core is testable without
//!   spawning processes
//! - the model functions are reusable from other tools
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
