//! Command line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use loan_eda::data::DEFAULT_INPUT_PATH;

#[derive(Parser)]
#[command(
    name = "loan-eda",
    version,
    about = "Exploratory data analysis of a LendingClub loan export",
    long_about = "Sample a loan CSV, derive a default label, write summary statistics to \
                  EDA_Summary.txt and render three PNG charts into the working directory."
)]
pub struct Cli {
    /// Loan CSV to analyse.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_INPUT_PATH)]
    pub input: PathBuf,

    /// Fail on loan_status values outside the known set instead of labelling them 0.
    #[arg(long = "strict-status")]
    pub strict_status: bool,

    /// Also write the summary as JSON to this path.
    #[arg(long = "summary-json", value_name = "PATH")]
    pub summary_json: Option<PathBuf>,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q to quiet).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
