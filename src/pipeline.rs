//! EDA pipeline: load, sample and clean, summarize, visualize.

use crate::charts::{
    ChartData, RenderError, StaticChartRenderer, GRADE_FILE, HEATMAP_FILE, HISTOGRAM_BINS,
    HISTOGRAM_FILE,
};
use crate::data::{
    DataLoader, DataProcessor, LoaderError, ProcessorError, SampleConfig, DEFAULT_INPUT_PATH,
};
use crate::report::{EdaSummary, ReportError, SUMMARY_FILE};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, info_span};

/// Printed on stdout after a successful run.
pub const COMPLETION_MESSAGE: &str = "EDA complete. Summary and plots saved.";

#[derive(Error, Debug)]
pub enum EdaError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Inputs and outputs of one run.
#[derive(Debug, Clone)]
pub struct EdaConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub sample: SampleConfig,
    /// Extra JSON copy of the summary; not written when `None`.
    pub summary_json: Option<PathBuf>,
}

impl Default for EdaConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT_PATH),
            output_dir: PathBuf::from("."),
            sample: SampleConfig::default(),
            summary_json: None,
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct EdaOutcome {
    pub rows_loaded: usize,
    pub rows_sampled: usize,
    pub rows_kept: usize,
    pub files: Vec<PathBuf>,
}

/// Run every stage in order. Any failure aborts the run.
pub fn run(config: &EdaConfig) -> Result<EdaOutcome, EdaError> {
    let span = info_span!("eda", input = %config.input.display());
    let _guard = span.enter();

    let raw = DataLoader::load_csv(&config.input)?;
    let rows_loaded = raw.height();
    debug!(columns = ?DataLoader::get_columns(&raw), "raw columns");
    let rows_sampled = rows_loaded.min(config.sample.sample_size);

    let sample = DataProcessor::prepare_sample(&raw, &config.sample)?;
    drop(raw);
    info!(rows_sampled, rows_kept = sample.height(), "sample table ready");

    let mut files = Vec::with_capacity(4);

    let summary = EdaSummary::from_sample(&sample)?;
    let summary_path = config.output_dir.join(SUMMARY_FILE);
    summary.write_text(&summary_path)?;
    files.push(summary_path);
    if let Some(json_path) = &config.summary_json {
        summary.write_json(json_path)?;
        files.push(json_path.clone());
    }

    let charts = ChartData::from_sample(&sample)?;

    let histogram_path = config.output_dir.join(HISTOGRAM_FILE);
    StaticChartRenderer::render_loan_amount_distribution(
        &charts.loan_amounts,
        HISTOGRAM_BINS,
        &histogram_path,
    )?;
    files.push(histogram_path);

    let grade_path = config.output_dir.join(GRADE_FILE);
    StaticChartRenderer::render_default_by_grade(&charts.grade_counts, &grade_path)?;
    files.push(grade_path);

    let heatmap_path = config.output_dir.join(HEATMAP_FILE);
    StaticChartRenderer::render_correlation_heatmap(&charts.correlation, &heatmap_path)?;
    files.push(heatmap_path);

    info!(files = files.len(), "eda finished");
    Ok(EdaOutcome {
        rows_loaded,
        rows_sampled,
        rows_kept: sample.height(),
        files,
    })
}
