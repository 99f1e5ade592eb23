//! Stats module - Descriptive statistics and correlations

mod calculator;

pub use calculator::{CorrelationMatrix, Describe, Frequency, StatsCalculator};
