//! Statistics Calculator Module
//! Descriptive statistics, frequency distributions, correlations and kernel
//! density estimates.

use serde::Serialize;
use statrs::distribution::{Continuous, Normal};
use std::collections::HashMap;

/// Descriptive statistics of one numeric column.
#[derive(Debug, Clone, Serialize)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl Default for Describe {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q25: f64::NAN,
            median: f64::NAN,
            q75: f64::NAN,
            max: f64::NAN,
        }
    }
}

impl Describe {
    /// Labelled rows in display order.
    pub fn rows(&self) -> [(&'static str, f64); 8] {
        [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.q25),
            ("50%", self.median),
            ("75%", self.q75),
            ("max", self.max),
        ]
    }
}

/// Share of rows holding one category value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frequency {
    pub value: String,
    pub proportion: f64,
}

/// Square Pearson correlation matrix.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

/// Handles statistical calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics, ignoring NaN values.
    pub fn describe(values: &[f64]) -> Describe {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        let n = sorted.len();
        if n == 0 {
            return Describe::default();
        }
        sorted.sort_by(f64::total_cmp);

        let mean = sorted.iter().sum::<f64>() / n as f64;
        let std = if n > 1 {
            (sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
        } else {
            f64::NAN
        };

        Describe {
            count: n,
            mean,
            std,
            min: sorted[0],
            q25: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            q75: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Normalized value counts, most frequent first.
    ///
    /// Ties keep the order in which values were first seen.
    pub fn value_frequencies<'a, I>(values: I) -> Vec<Frequency>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut order: Vec<&str> = Vec::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for value in values {
            let count = counts.entry(value).or_insert_with(|| {
                order.push(value);
                0
            });
            *count += 1;
        }

        let total: usize = counts.values().sum();
        let mut ranked: Vec<(&str, usize)> = order.into_iter().map(|v| (v, counts[v])).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        ranked
            .into_iter()
            .map(|(value, count)| Frequency {
                value: value.to_string(),
                proportion: count as f64 / total as f64,
            })
            .collect()
    }

    /// Pearson correlation over the pairs where both sides are present.
    pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
        let pairs: Vec<(f64, f64)> = x
            .iter()
            .zip(y)
            .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
            .collect();
        let n = pairs.len();
        if n < 2 {
            return f64::NAN;
        }

        let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
        let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;
        let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
        for (a, b) in &pairs {
            let dx = a - mean_x;
            let dy = b - mean_y;
            sxy += dx * dy;
            sxx += dx * dx;
            syy += dy * dy;
        }

        if sxx == 0.0 || syy == 0.0 {
            return f64::NAN;
        }
        (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
    }

    /// Pairwise Pearson correlation matrix of the given columns.
    pub fn correlation_matrix(columns: &[(String, Vec<Option<f64>>)]) -> CorrelationMatrix {
        let values = columns
            .iter()
            .enumerate()
            .map(|(i, (_, x))| {
                columns
                    .iter()
                    .enumerate()
                    .map(|(j, (_, y))| {
                        let r = Self::pearson(x, y);
                        if i == j && !r.is_nan() {
                            1.0
                        } else {
                            r
                        }
                    })
                    .collect()
            })
            .collect();

        CorrelationMatrix {
            labels: columns.iter().map(|(name, _)| name.clone()).collect(),
            values,
        }
    }

    /// Gaussian kernel density estimate with Scott's bandwidth, evaluated at
    /// `points` evenly spaced positions over the data range.
    ///
    /// Returns an empty curve when the data has no spread.
    pub fn gaussian_kde(values: &[f64], points: usize) -> Vec<(f64, f64)> {
        let n = values.len();
        let summary = Self::describe(values);
        if n < 2 || points < 2 || !(summary.std > 0.0) {
            return Vec::new();
        }

        let bandwidth = summary.std * (n as f64).powf(-0.2);
        let Ok(kernel) = Normal::new(0.0, 1.0) else {
            return Vec::new();
        };

        let step = (summary.max - summary.min) / (points - 1) as f64;
        (0..points)
            .map(|i| {
                let x = summary.min + step * i as f64;
                let density = values
                    .iter()
                    .map(|v| kernel.pdf((x - v) / bandwidth))
                    .sum::<f64>()
                    / (n as f64 * bandwidth);
                (x, density)
            })
            .collect()
    }
}
