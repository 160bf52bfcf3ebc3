//! Input/output helpers.
//!
//! - CSV ingest + schema validation (`ingest`)
//! - prediction and feature exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
