//! Hourly forklift and truck energy loads for logistics buildings.

pub mod cli;
pub mod config;
pub mod error;
pub mod io;
/// Per-building demand series augmentation.
pub mod job;
pub mod logistics;
pub mod reporting;
/// Sequential and parallel batch dispatch.
pub mod runner;
pub mod schedule;
pub mod usage;
