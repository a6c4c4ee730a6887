//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - result / linearized / sample exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
