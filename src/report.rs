//! Summary Report Module
//! Builds the EDA summary from the sample table and writes it as plain text
//! (and optionally JSON).

use crate::data::{DataProcessor, ProcessorError, RATE_COLUMN, STATUS_COLUMN};
use crate::stats::{Describe, Frequency, StatsCalculator};
use polars::prelude::DataFrame;
use serde::Serialize;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// File name of the text summary.
pub const SUMMARY_FILE: &str = "EDA_Summary.txt";

/// Section headers in output order.
pub const SECTION_NAMES: [&str; 4] = [
    "Loan Amount",
    "Interest Rate",
    "Annual Income",
    "Loan Status Distribution",
];

const COLUMN_GAP: &str = "    ";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to read sample table: {0}")]
    Processor(#[from] ProcessorError),
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialize summary: {0}")]
    Json(#[from] serde_json::Error),
}

/// Descriptive statistics and status distribution of the sample table.
#[derive(Debug, Clone, Serialize)]
pub struct EdaSummary {
    pub loan_amount: Describe,
    pub interest_rate: Describe,
    pub annual_income: Describe,
    pub status_distribution: Vec<Frequency>,
}

impl EdaSummary {
    /// Summarize a cleaned sample table.
    pub fn from_sample(df: &DataFrame) -> Result<Self, ReportError> {
        let statuses = DataProcessor::string_values(df, STATUS_COLUMN)?;

        Ok(Self {
            loan_amount: StatsCalculator::describe(&DataProcessor::numeric_values(
                df,
                "loan_amnt",
            )?),
            interest_rate: StatsCalculator::describe(&DataProcessor::numeric_values(
                df,
                RATE_COLUMN,
            )?),
            annual_income: StatsCalculator::describe(&DataProcessor::numeric_values(
                df,
                "annual_inc",
            )?),
            status_distribution: StatsCalculator::value_frequencies(
                statuses.iter().flatten().map(String::as_str),
            ),
        })
    }

    /// Render the text report.
    pub fn render(&self) -> String {
        let bodies = [
            render_describe(&self.loan_amount),
            render_describe(&self.interest_rate),
            render_describe(&self.annual_income),
            render_distribution(STATUS_COLUMN, &self.status_distribution),
        ];

        SECTION_NAMES
            .iter()
            .zip(bodies)
            .map(|(name, body)| format!("--- {name} ---\n{body}\n\n"))
            .collect()
    }

    /// Write the text report, replacing any existing file.
    pub fn write_text(&self, path: &Path) -> Result<(), ReportError> {
        fs::write(path, self.render()).map_err(|source| io_error(path, source))?;
        info!(path = %path.display(), "wrote summary");
        Ok(())
    }

    /// Write the summary as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), ReportError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| io_error(path, source))?;
        info!(path = %path.display(), "wrote json summary");
        Ok(())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ReportError {
    ReportError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Two-column listing: labels left-aligned, values right-aligned.
fn render_listing(rows: &[(String, f64)]) -> String {
    let label_width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let values: Vec<String> = rows.iter().map(|(_, v)| format!("{v:.6}")).collect();
    let value_width = values.iter().map(String::len).max().unwrap_or(0);

    rows.iter()
        .zip(&values)
        .map(|((label, _), value)| {
            format!("{label:<label_width$}{COLUMN_GAP}{value:>value_width$}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_describe(stats: &Describe) -> String {
    let rows: Vec<(String, f64)> = stats
        .rows()
        .iter()
        .map(|(label, value)| (label.to_string(), *value))
        .collect();
    render_listing(&rows)
}

fn render_distribution(index_name: &str, freqs: &[Frequency]) -> String {
    let rows: Vec<(String, f64)> = freqs
        .iter()
        .map(|f| (f.value.clone(), f.proportion))
        .collect();
    if rows.is_empty() {
        return index_name.to_string();
    }
    format!("{index_name}\n{}", render_listing(&rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> EdaSummary {
        EdaSummary {
            loan_amount: StatsCalculator::describe(&[1000.0, 2000.0, 3000.0]),
            interest_rate: StatsCalculator::describe(&[10.0, 12.5]),
            annual_income: StatsCalculator::describe(&[]),
            status_distribution: StatsCalculator::value_frequencies([
                "Fully Paid",
                "Charged Off",
                "Fully Paid",
                "Fully Paid",
            ]),
        }
    }

    #[test]
    fn sections_appear_once_in_order() {
        let text = summary().render();
        let headers: Vec<&str> = text.lines().filter(|l| l.starts_with("--- ")).collect();
        assert_eq!(
            headers,
            vec![
                "--- Loan Amount ---",
                "--- Interest Rate ---",
                "--- Annual Income ---",
                "--- Loan Status Distribution ---",
            ]
        );
        assert!(text.ends_with("\n\n"));
    }

    #[test]
    fn describe_body_is_aligned() {
        let body = render_describe(&StatsCalculator::describe(&[1000.0, 2000.0, 3000.0]));
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "count       3.000000");
        assert_eq!(lines[1], "mean     2000.000000");
        assert_eq!(lines[3], "min      1000.000000");
        assert_eq!(lines[7], "max      3000.000000");
    }

    #[test]
    fn empty_column_renders_nan() {
        let body = render_describe(&Describe::default());
        assert!(body.starts_with("count    0.000000"));
        assert!(body.contains("mean          NaN"));
    }

    #[test]
    fn distribution_body_lists_proportions() {
        let text = summary().render();
        let section = text
            .split("--- Loan Status Distribution ---\n")
            .nth(1)
            .unwrap();
        let lines: Vec<&str> = section.lines().take(3).collect();
        assert_eq!(lines[0], "loan_status");
        assert_eq!(lines[1], "Fully Paid     0.750000");
        assert_eq!(lines[2], "Charged Off    0.250000");
    }

    #[test]
    fn writes_text_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let text_path = dir.path().join(SUMMARY_FILE);
        let json_path = dir.path().join("summary.json");

        let summary = summary();
        summary.write_text(&text_path).unwrap();
        summary.write_json(&json_path).unwrap();

        assert_eq!(fs::read_to_string(&text_path).unwrap(), summary.render());
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json["loan_amount"]["count"], 3);
        assert_eq!(json["status_distribution"][0]["value"], "Fully Paid");
    }
}
