//! Exploratory data analysis of LendingClub loan exports.
//!
//! The pipeline loads a CSV, draws a seeded sample, cleans it, writes
//! descriptive statistics to `EDA_Summary.txt` and renders three PNG charts.

pub mod charts;
pub mod data;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod stats;

pub use pipeline::{run, EdaConfig, EdaError, EdaOutcome, COMPLETION_MESSAGE};
