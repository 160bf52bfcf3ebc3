//! Model input construction from sales history.
//!
//! Calendar decomposition plus positional lag features over a chronologically
//! ordered series.

pub mod builder;

pub use builder::*;
