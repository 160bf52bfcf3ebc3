//! `salecast` library crate.
//!
//! The binary (`salecast`) is a thin wrapper around this library so that:
//!
//! - the feature pipeline is testable without spawning processes
//! - any trained model can be plugged in behind the `Predictor` trait
//! - presentation (CLI output, CSV export) stays separate from the core

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod features;
pub mod io;
pub mod logging;
pub mod models;
pub mod report;
pub mod service;
