//! Unknown-order search.
//!
//! Responsibilities:
//!
//! - build the reaction-order candidate grid
//! - evaluate each candidate order (optionally in parallel)
//! - select the best order with a deterministic, scan-ordered reduction

pub mod order_grid;
pub mod order_search;

pub use order_grid::*;
pub use order_search::*;
