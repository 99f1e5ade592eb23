//! Data Processor Module
//! Sampling, projection and cleaning of the raw loan table.

use polars::prelude::*;
use std::collections::BTreeMap;
use std::num::ParseFloatError;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Columns kept in the sample table, in output order.
pub const COLUMNS_OF_INTEREST: [&str; 9] = [
    "loan_amnt",
    "int_rate",
    "annual_inc",
    "grade",
    "loan_status",
    "installment",
    "dti",
    "emp_length",
    "purpose",
];

/// Statuses counted as a default in `loan_status_binary`.
pub const DEFAULT_STATUSES: [&str; 4] = [
    "Charged Off",
    "Default",
    "Late (31-120 days)",
    "Late (16-30 days)",
];

/// Statuses accepted as non-default under [`StatusPolicy::Strict`].
pub const NON_DEFAULT_STATUSES: [&str; 5] = [
    "Fully Paid",
    "Current",
    "In Grace Period",
    "Does not meet the credit policy. Status:Fully Paid",
    "Does not meet the credit policy. Status:Charged Off",
];

pub const SAMPLE_SIZE: usize = 50_000;
pub const SAMPLE_SEED: u64 = 42;

pub const STATUS_COLUMN: &str = "loan_status";
pub const RATE_COLUMN: &str = "int_rate";
pub const TARGET_COLUMN: &str = "loan_status_binary";

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Column not found in input: {0}")]
    MissingColumn(String),
    #[error("Cannot convert int_rate value {value:?} at row {row} to a number: {source}")]
    InvalidPercentage {
        row: usize,
        value: String,
        #[source]
        source: ParseFloatError,
    },
    #[error("Unrecognized loan_status value: {0:?}")]
    UnknownStatus(String),
}

/// How `loan_status` values outside the known domain are labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPolicy {
    /// Anything not in the default set is labelled 0.
    #[default]
    ClosedWorld,
    /// Statuses outside the known domain abort the run.
    Strict,
}

/// Parameters of the sampling and cleaning stage.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub sample_size: usize,
    pub seed: u64,
    pub status_policy: StatusPolicy,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            sample_size: SAMPLE_SIZE,
            seed: SAMPLE_SEED,
            status_policy: StatusPolicy::default(),
        }
    }
}

/// Strip one trailing `%` and parse the remainder as a float.
///
/// Values without a `%` suffix are parsed as-is.
pub fn parse_percentage(raw: &str) -> Result<f64, ParseFloatError> {
    let trimmed = raw.trim();
    trimmed
        .strip_suffix('%')
        .unwrap_or(trimmed)
        .trim()
        .parse::<f64>()
}

/// 1 when the status is one of [`DEFAULT_STATUSES`], otherwise 0.
pub fn default_flag(status: &str) -> i32 {
    i32::from(DEFAULT_STATUSES.contains(&status))
}

fn is_known_status(status: &str) -> bool {
    DEFAULT_STATUSES.contains(&status) || NON_DEFAULT_STATUSES.contains(&status)
}

/// Handles sampling and cleaning operations.
pub struct DataProcessor;

impl DataProcessor {
    /// Draw `min(n, height)` rows without replacement, reproducible for a seed.
    pub fn sample_rows(df: &DataFrame, n: usize, seed: u64) -> Result<DataFrame, ProcessorError> {
        let n = n.min(df.height());
        let sampled = df.sample_n_literal(n, false, true, Some(seed))?;
        info!(rows = sampled.height(), seed, "sampled rows");
        Ok(sampled)
    }

    /// Project to the named columns, failing on the first one that is absent.
    pub fn select_columns(df: &DataFrame, names: &[&str]) -> Result<DataFrame, ProcessorError> {
        let present = df.get_column_names();
        if let Some(missing) = names
            .iter()
            .find(|name| !present.iter().any(|p| p.as_str() == **name))
        {
            return Err(ProcessorError::MissingColumn(missing.to_string()));
        }

        Ok(df.select(names.iter().copied())?)
    }

    /// Drop rows whose `loan_status` is null or empty.
    pub fn drop_missing_status(df: &DataFrame) -> Result<DataFrame, ProcessorError> {
        let statuses = Self::string_values(df, STATUS_COLUMN)?;
        let keep: Vec<bool> = statuses
            .iter()
            .map(|s| s.as_deref().is_some_and(|s| !s.is_empty()))
            .collect();

        let mask = BooleanChunked::new("keep".into(), keep);
        let filtered = df.filter(&mask)?;
        let dropped = df.height() - filtered.height();
        if dropped > 0 {
            info!(dropped, "dropped rows with missing loan_status");
        }
        Ok(filtered)
    }

    /// Replace `int_rate` with its numeric percentage value.
    pub fn parse_interest_rate(df: &mut DataFrame) -> Result<(), ProcessorError> {
        let raw = Self::string_values(df, RATE_COLUMN)?;
        let rates = raw
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                None => Ok(None),
                Some(value) => parse_percentage(&value)
                    .map(Some)
                    .map_err(|source| ProcessorError::InvalidPercentage { row, value, source }),
            })
            .collect::<Result<Vec<Option<f64>>, _>>()?;

        df.with_column(Column::new(RATE_COLUMN.into(), rates))?;
        Ok(())
    }

    /// Add the 0/1 `loan_status_binary` column.
    pub fn derive_default_flag(
        df: &mut DataFrame,
        policy: StatusPolicy,
    ) -> Result<(), ProcessorError> {
        let statuses = Self::string_values(df, STATUS_COLUMN)?;
        let mut unknown: BTreeMap<String, usize> = BTreeMap::new();
        let mut flags = Vec::with_capacity(statuses.len());

        for status in &statuses {
            let status = status.as_deref().unwrap_or_default();
            if !is_known_status(status) {
                if policy == StatusPolicy::Strict {
                    return Err(ProcessorError::UnknownStatus(status.to_string()));
                }
                *unknown.entry(status.to_string()).or_default() += 1;
            }
            flags.push(default_flag(status));
        }

        for (status, count) in &unknown {
            warn!(status = %status, count, "unrecognized loan_status labelled as non-default");
        }

        let defaults = flags.iter().filter(|&&f| f == 1).count();
        debug!(defaults, total = flags.len(), "derived loan_status_binary");
        df.with_column(Column::new(TARGET_COLUMN.into(), flags))?;
        Ok(())
    }

    /// Run the full sampling and cleaning stage.
    pub fn prepare_sample(
        df: &DataFrame,
        config: &SampleConfig,
    ) -> Result<DataFrame, ProcessorError> {
        let sampled = Self::sample_rows(df, config.sample_size, config.seed)?;
        let projected = Self::select_columns(&sampled, &COLUMNS_OF_INTEREST)?;
        let mut cleaned = Self::drop_missing_status(&projected)?;
        Self::parse_interest_rate(&mut cleaned)?;
        Self::derive_default_flag(&mut cleaned, config.status_policy)?;
        Ok(cleaned)
    }

    /// Column values rendered as text, nulls preserved.
    pub fn string_values(
        df: &DataFrame,
        name: &str,
    ) -> Result<Vec<Option<String>>, ProcessorError> {
        let column = df
            .column(name)
            .map_err(|_| ProcessorError::MissingColumn(name.to_string()))?;
        let as_text = column.cast(&DataType::String)?;
        let values = as_text
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();
        Ok(values)
    }

    /// Column values as floats, nulls and NaNs preserved as `None`.
    pub fn optional_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, ProcessorError> {
        let column = df
            .column(name)
            .map_err(|_| ProcessorError::MissingColumn(name.to_string()))?;
        let as_float = column.cast(&DataType::Float64)?;
        let values = as_float
            .f64()?
            .into_iter()
            .map(|v| v.filter(|v| !v.is_nan()))
            .collect();
        Ok(values)
    }

    /// Non-missing float values of a column.
    pub fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<f64>, ProcessorError> {
        Ok(Self::optional_values(df, name)?.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn loans() -> DataFrame {
        df!(
            "loan_amnt" => [1000i64, 2000, 3000, 4000, 5000],
            "int_rate" => ["13.5%", "0%", "7.25", " 9.1% ", "22%"],
            "annual_inc" => [Some(50000.0), None, Some(70000.0), Some(80000.0), Some(90000.0)],
            "grade" => ["A", "B", "C", "A", "B"],
            "loan_status" => [
                Some("Fully Paid"),
                Some("Charged Off"),
                None,
                Some(""),
                Some("Default"),
            ],
            "installment" => [30.5, 60.1, 90.7, 120.2, 150.9],
            "dti" => [10.0, 20.0, 30.0, 15.0, 5.0],
            "emp_length" => ["1 year", "2 years", "3 years", "10+ years", "< 1 year"],
            "purpose" => ["car", "debt_consolidation", "other", "car", "house"],
            "id" => [1i64, 2, 3, 4, 5]
        )
        .unwrap()
    }

    #[test]
    fn percentage_parsing() {
        assert_eq!(parse_percentage("13.5%").unwrap(), 13.5);
        assert_eq!(parse_percentage("0%").unwrap(), 0.0);
        assert_eq!(parse_percentage("7.25").unwrap(), 7.25);
        assert_eq!(parse_percentage(" 9.1% ").unwrap(), 9.1);
        assert!(parse_percentage("abc%").is_err());
        assert!(parse_percentage("%").is_err());
    }

    #[test]
    fn only_one_percent_sign_is_stripped() {
        assert!(parse_percentage("5%%").is_err());
    }

    #[test]
    fn default_flag_matches_exact_statuses() {
        for status in DEFAULT_STATUSES {
            assert_eq!(default_flag(status), 1);
        }
        assert_eq!(default_flag("Fully Paid"), 0);
        assert_eq!(default_flag("charged off"), 0);
        assert_eq!(default_flag("Does not meet the credit policy. Status:Charged Off"), 0);
        assert_eq!(default_flag(""), 0);
    }

    #[test]
    fn sampling_is_deterministic() {
        let df = loans();
        let a = DataProcessor::sample_rows(&df, 3, 42).unwrap();
        let b = DataProcessor::sample_rows(&df, 3, 42).unwrap();
        assert_eq!(a.height(), 3);
        assert!(a.equals_missing(&b));
    }

    #[test]
    fn sampling_caps_at_row_count() {
        let df = loans();
        let sampled = DataProcessor::sample_rows(&df, 50_000, 42).unwrap();
        assert_eq!(sampled.height(), 5);
    }

    #[test]
    fn select_reports_missing_column() {
        let df = loans().drop("dti").unwrap();
        let err = DataProcessor::select_columns(&df, &COLUMNS_OF_INTEREST).unwrap_err();
        assert!(matches!(err, ProcessorError::MissingColumn(name) if name == "dti"));
    }

    #[test]
    fn select_keeps_only_columns_of_interest() {
        let df = DataProcessor::select_columns(&loans(), &COLUMNS_OF_INTEREST).unwrap();
        assert_eq!(df.width(), 9);
        assert!(df.column("id").is_err());
    }

    #[test]
    fn drops_only_rows_without_status() {
        let df = DataProcessor::drop_missing_status(&loans()).unwrap();
        assert_eq!(df.height(), 3);
        // the row with a missing annual_inc survives
        let incomes = DataProcessor::optional_values(&df, "annual_inc").unwrap();
        assert!(incomes.contains(&None));
    }

    #[test]
    fn interest_rate_becomes_numeric() {
        let mut df = loans();
        DataProcessor::parse_interest_rate(&mut df).unwrap();
        assert_eq!(df.column("int_rate").unwrap().dtype(), &DataType::Float64);
        assert_eq!(
            DataProcessor::numeric_values(&df, "int_rate").unwrap(),
            vec![13.5, 0.0, 7.25, 9.1, 22.0]
        );
    }

    #[test]
    fn interest_rate_failure_names_the_value() {
        let mut df = df!("int_rate" => ["10%", "n/a%"]).unwrap();
        let err = DataProcessor::parse_interest_rate(&mut df).unwrap_err();
        match err {
            ProcessorError::InvalidPercentage { row, value, .. } => {
                assert_eq!(row, 1);
                assert_eq!(value, "n/a%");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_interest_rate_stays_missing() {
        let mut df = df!("int_rate" => [Some("10%"), None]).unwrap();
        DataProcessor::parse_interest_rate(&mut df).unwrap();
        assert_eq!(
            DataProcessor::optional_values(&df, "int_rate").unwrap(),
            vec![Some(10.0), None]
        );
    }

    #[test]
    fn closed_world_labels_unknown_as_zero() {
        let mut df = df!("loan_status" => ["Charged Off", "Something New", "Fully Paid"]).unwrap();
        DataProcessor::derive_default_flag(&mut df, StatusPolicy::ClosedWorld).unwrap();
        let flags: Vec<Option<i32>> = df
            .column(TARGET_COLUMN)
            .unwrap()
            .i32()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(flags, vec![Some(1), Some(0), Some(0)]);
    }

    #[test]
    fn strict_policy_rejects_unknown_status() {
        let mut df = df!("loan_status" => ["Current", "Something New"]).unwrap();
        let err = DataProcessor::derive_default_flag(&mut df, StatusPolicy::Strict).unwrap_err();
        assert!(matches!(err, ProcessorError::UnknownStatus(s) if s == "Something New"));
    }

    #[test]
    fn prepare_sample_runs_every_step() {
        let config = SampleConfig {
            sample_size: 10,
            ..SampleConfig::default()
        };
        let df = DataProcessor::prepare_sample(&loans(), &config).unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 10);
        assert_eq!(df.column("int_rate").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column(TARGET_COLUMN).unwrap().dtype(), &DataType::Int32);
    }

    proptest! {
        #[test]
        fn percentage_round_trips_formatted_floats(x in -1.0e6f64..1.0e6) {
            prop_assert_eq!(parse_percentage(&format!("{x}%")).unwrap(), x);
        }

        #[test]
        fn unknown_statuses_are_never_defaults(s in "[a-z ]{0,20}") {
            prop_assert_eq!(default_flag(&s), 0);
        }
    }
}
