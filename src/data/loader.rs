//! CSV Data Loader Module
//! Loads the raw loan table with Polars.

use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Fixed location of the LendingClub export analysed by default.
pub const DEFAULT_INPUT_PATH: &str = "/data/lendingclub/accepted_2007_to_2018Q4.csv";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
}

/// Handles CSV file loading with Polars.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file with a header row into memory.
    ///
    /// The schema is inferred from the whole file rather than a leading
    /// window, so a column that only turns non-numeric late in the file is
    /// still read with a single consistent type.
    pub fn load_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        if !path.is_file() {
            return Err(LoaderError::NotFound(path.to_path_buf()));
        }

        debug!(path = %path.display(), "reading csv");
        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(None)
            .finish()?
            .collect()?;

        info!(
            rows = df.height(),
            columns = df.width(),
            path = %path.display(),
            "loaded raw table"
        );
        Ok(df)
    }

    /// Get list of column names from a DataFrame.
    pub fn get_columns(df: &DataFrame) -> Vec<String> {
        df.get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}
