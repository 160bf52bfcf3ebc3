//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input records (`RawRecord`, `Record`)
//! - model input and output (`FeatureRow`, `PredictionResult`)
//! - run configuration (`BatchConfig`, `OutputTarget`)

pub mod types;

pub use types::*;
