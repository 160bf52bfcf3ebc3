//! Prediction orchestration over an injected `Predictor`.

pub mod prediction;

pub use prediction::*;
