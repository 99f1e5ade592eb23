//! Loan EDA - sample, summarize and chart a loan dataset.

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, LogFormatArg};
use loan_eda::data::{SampleConfig, StatusPolicy};
use loan_eda::logging::{init_logging, LogConfig, LogFormat};
use loan_eda::{EdaConfig, COMPLETION_MESSAGE};
use std::io::{self, IsTerminal};
use std::path::PathBuf;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(&log_config_from_cli(&cli)) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    match run(&cli) {
        Ok(()) => println!("{COMPLETION_MESSAGE}"),
        Err(error) => {
            eprintln!("error: {error:#}");
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = EdaConfig {
        input: cli.input.clone(),
        // outputs always land in the working directory
        output_dir: PathBuf::from("."),
        sample: SampleConfig {
            status_policy: if cli.strict_status {
                StatusPolicy::Strict
            } else {
                StatusPolicy::ClosedWorld
            },
            ..SampleConfig::default()
        },
        summary_json: cli.summary_json.clone(),
    };

    let outcome = loan_eda::run(&config)
        .with_context(|| format!("analysis of {} failed", config.input.display()))?;
    tracing::debug!(
        rows_loaded = outcome.rows_loaded,
        rows_kept = outcome.rows_kept,
        files = ?outcome.files,
        "run outcome"
    );
    Ok(())
}

fn log_config_from_cli(cli: &Cli) -> LogConfig {
    LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        format: match cli.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        },
        with_ansi: io::stderr().is_terminal(),
        use_env_filter: !cli.verbosity.is_present(),
    }
}
