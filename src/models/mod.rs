//! Sales prediction models.
//!
//! The rest of the crate only sees the `Predictor` trait; concrete models are
//! loaded from artifacts produced by an external training step.

pub mod linear;
pub mod predictor;

pub use linear::*;
pub use predictor::*;
