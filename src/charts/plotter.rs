//! Chart Data Module
//! Turns the sample table into the series each static chart draws.

use crate::data::{DataProcessor, ProcessorError, TARGET_COLUMN};
use crate::stats::{CorrelationMatrix, StatsCalculator};
use polars::prelude::DataFrame;
use std::collections::BTreeMap;

pub const HISTOGRAM_BINS: usize = 40;

/// Columns of the correlation heatmap, in display order.
pub const CORRELATION_COLUMNS: [&str; 4] = ["loan_amnt", "installment", "annual_inc", "dti"];

/// Equal-width histogram over the data range.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramData {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl HistogramData {
    /// Bin values into `bins` equal-width buckets; the last bucket is closed.
    ///
    /// A constant column is spread over `value ± 0.5`.
    pub fn from_values(values: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return Self {
                edges: (0..=bins).map(|i| i as f64 / bins as f64).collect(),
                counts: vec![0; bins],
            };
        }

        let (mut lo, mut hi) = finite
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges = (0..=bins).map(|i| lo + width * i as f64).collect();
        let mut counts = vec![0; bins];
        for v in finite {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Self { edges, counts }
    }

    pub fn bin_width(&self) -> f64 {
        match (self.edges.first(), self.edges.get(1)) {
            (Some(a), Some(b)) => b - a,
            _ => 0.0,
        }
    }

    pub fn range(&self) -> (f64, f64) {
        (
            self.edges.first().copied().unwrap_or(0.0),
            self.edges.last().copied().unwrap_or(1.0),
        )
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// `(left, right, count)` per bin.
    pub fn bars(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(edge, &count)| (edge[0], edge[1], count))
    }
}

/// Row counts per grade, split by the binary default label.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeCounts {
    pub grades: Vec<String>,
    /// `[label 0, label 1]` per grade, aligned with `grades`.
    pub counts: Vec<[usize; 2]>,
}

impl GradeCounts {
    /// Count rows per (grade, label); rows missing either side are skipped.
    pub fn from_rows(grades: &[Option<String>], labels: &[Option<f64>]) -> Self {
        let mut by_grade: BTreeMap<&str, [usize; 2]> = BTreeMap::new();
        for (grade, label) in grades.iter().zip(labels) {
            let (Some(grade), Some(label)) = (grade.as_deref(), label) else {
                continue;
            };
            let slot = usize::from(*label >= 0.5);
            by_grade.entry(grade).or_default()[slot] += 1;
        }

        Self {
            grades: by_grade.keys().map(|g| g.to_string()).collect(),
            counts: by_grade.into_values().collect(),
        }
    }

    pub fn max_count(&self) -> usize {
        self.counts
            .iter()
            .flat_map(|c| c.iter().copied())
            .max()
            .unwrap_or(0)
    }
}

/// Everything the three charts need from the sample table.
#[derive(Debug, Clone)]
pub struct ChartData {
    pub loan_amounts: Vec<f64>,
    pub grade_counts: GradeCounts,
    pub correlation: CorrelationMatrix,
}

impl ChartData {
    pub fn from_sample(df: &DataFrame) -> Result<Self, ProcessorError> {
        let grades = DataProcessor::string_values(df, "grade")?;
        let labels = DataProcessor::optional_values(df, TARGET_COLUMN)?;

        let columns = CORRELATION_COLUMNS
            .iter()
            .map(|name| Ok((name.to_string(), DataProcessor::optional_values(df, name)?)))
            .collect::<Result<Vec<_>, ProcessorError>>()?;

        Ok(Self {
            loan_amounts: DataProcessor::numeric_values(df, "loan_amnt")?,
            grade_counts: GradeCounts::from_rows(&grades, &labels),
            correlation: StatsCalculator::correlation_matrix(&columns),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_bins_cover_range() {
        let values: Vec<f64> = (0..=100).map(f64::from).collect();
        let hist = HistogramData::from_values(&values, 40);
        assert_eq!(hist.counts.len(), 40);
        assert_eq!(hist.edges.len(), 41);
        assert_eq!(hist.range(), (0.0, 100.0));
        assert_eq!(hist.counts.iter().sum::<usize>(), 101);
        // max lands in the closed last bin
        assert_eq!(hist.bin_width(), 2.5);
        assert_eq!(hist.counts[39], 3);
    }

    #[test]
    fn histogram_of_constant_column() {
        let hist = HistogramData::from_values(&[7.0, 7.0], 4);
        assert_eq!(hist.range(), (6.5, 7.5));
        assert_eq!(hist.counts.iter().sum::<usize>(), 2);
    }

    #[test]
    fn histogram_of_nothing() {
        let hist = HistogramData::from_values(&[], 40);
        assert_eq!(hist.max_count(), 0);
        assert_eq!(hist.bars().count(), 40);
    }

    #[test]
    fn grade_counts_split_by_label() {
        let grades = vec![
            Some("B".to_string()),
            Some("A".to_string()),
            Some("B".to_string()),
            None,
            Some("A".to_string()),
        ];
        let labels = vec![Some(0.0), Some(1.0), Some(1.0), Some(1.0), Some(0.0)];
        let counts = GradeCounts::from_rows(&grades, &labels);

        assert_eq!(counts.grades, vec!["A", "B"]);
        assert_eq!(counts.counts, vec![[1, 1], [1, 1]]);
        assert_eq!(counts.max_count(), 1);
    }
}
