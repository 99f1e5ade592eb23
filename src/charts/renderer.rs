//! Static Chart Renderer
//! Draws the three EDA charts to PNG files with plotters.
//!
//! Every chart opens its own bitmap backend, draws, presents and drops it
//! before returning, so no drawing state carries over between charts.

use crate::charts::{GradeCounts, HistogramData};
use crate::stats::{CorrelationMatrix, StatsCalculator};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

pub const HISTOGRAM_FILE: &str = "loan_amount_distribution.png";
pub const GRADE_FILE: &str = "default_by_grade.png";
pub const HEATMAP_FILE: &str = "correlation_heatmap.png";

const FONT: &str = "sans-serif";

// Colors
const BAR_BLUE: RGBColor = RGBColor(76, 114, 176);
const BAR_ORANGE: RGBColor = RGBColor(221, 132, 82);
const KDE_LINE: RGBColor = RGBColor(49, 80, 135);
const GRID: RGBColor = RGBColor(234, 234, 242);
const DARK_TEXT: RGBColor = RGBColor(38, 38, 38);

/// Matplotlib "Blues", light to dark.
const BLUES: [RGBColor; 9] = [
    RGBColor(247, 251, 255),
    RGBColor(222, 235, 247),
    RGBColor(198, 219, 239),
    RGBColor(158, 202, 225),
    RGBColor(107, 174, 214),
    RGBColor(66, 146, 198),
    RGBColor(33, 113, 181),
    RGBColor(8, 81, 156),
    RGBColor(8, 48, 107),
];

/// Points on the density curve.
const KDE_POINTS: usize = 200;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to draw chart: {0}")]
    Drawing(String),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Drawing(err.to_string())
    }
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Histogram of loan amounts with a KDE curve scaled to counts.
    pub fn render_loan_amount_distribution(
        values: &[f64],
        bins: usize,
        path: &Path,
    ) -> Result<(), RenderError> {
        let hist = HistogramData::from_values(values, bins);
        let kde = StatsCalculator::gaussian_kde(values, KDE_POINTS);
        let scale = values.len() as f64 * hist.bin_width();
        let curve: Vec<(f64, f64)> = kde.into_iter().map(|(x, d)| (x, d * scale)).collect();

        let curve_max = curve.iter().map(|p| p.1).fold(0.0, f64::max);
        let y_max = (hist.max_count() as f64).max(curve_max).max(1.0) * 1.05;
        let (x_min, x_max) = hist.range();

        {
            let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
            root.fill(&WHITE)?;

            let mut chart = ChartBuilder::on(&root)
                .caption("Loan Amount Distribution", (FONT, 22))
                .margin(15)
                .x_label_area_size(45)
                .y_label_area_size(65)
                .build_cartesian_2d(x_min..x_max, 0f64..y_max)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .light_line_style(GRID)
                .x_desc("Loan Amount ($)")
                .y_desc("Count")
                .x_label_formatter(&|x| format!("{x:.0}"))
                .y_label_formatter(&|y| format!("{y:.0}"))
                .draw()?;

            chart.draw_series(hist.bars().map(|(left, right, count)| {
                Rectangle::new([(left, 0.0), (right, count as f64)], BAR_BLUE.mix(0.75).filled())
            }))?;
            chart.draw_series(hist.bars().map(|(left, right, count)| {
                Rectangle::new([(left, 0.0), (right, count as f64)], WHITE.stroke_width(1))
            }))?;

            if !curve.is_empty() {
                chart.draw_series(LineSeries::new(curve, KDE_LINE.stroke_width(2)))?;
            }

            root.present()?;
        }

        info!(path = %path.display(), bins, "wrote histogram");
        Ok(())
    }

    /// Side-by-side count bars per grade for labels 0 and 1.
    ///
    /// Grade `i` is centered at `x = i`; its labels are placed under the
    /// axis by hand since the axis itself is numeric.
    pub fn render_default_by_grade(counts: &GradeCounts, path: &Path) -> Result<(), RenderError> {
        let n = counts.grades.len().max(1);
        let y_max = (counts.max_count() as f64).max(1.0) * 1.1;

        {
            let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
            root.fill(&WHITE)?;

            let mut chart = ChartBuilder::on(&root)
                .caption("Loan Default Rate by Grade", (FONT, 22))
                .margin(15)
                .x_label_area_size(45)
                .y_label_area_size(65)
                .build_cartesian_2d(-0.5f64..n as f64 - 0.5, 0f64..y_max)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(0)
                .light_line_style(GRID)
                .x_desc("Credit Grade")
                .y_desc("Count")
                .y_label_formatter(&|y| format!("{y:.0}"))
                .draw()?;

            for (slot, color) in [BAR_BLUE, BAR_ORANGE].into_iter().enumerate() {
                let offset = slot as f64 * 0.4 - 0.4;
                chart
                    .draw_series(counts.counts.iter().enumerate().map(|(i, pair)| {
                        let left = i as f64 + offset;
                        let top = pair[slot] as f64;
                        Rectangle::new([(left, 0.0), (left + 0.4, top)], color.filled())
                    }))?
                    .label(format!("loan_status_binary = {slot}"))
                    .legend(move |(x, y)| {
                        Rectangle::new([(x, y - 6), (x + 12, y + 6)], color.filled())
                    });
            }

            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(WHITE.mix(0.8))
                .border_style(DARK_TEXT)
                .label_font((FONT, 14))
                .draw()?;

            let below = Pos::new(HPos::Center, VPos::Top);
            for (i, grade) in counts.grades.iter().enumerate() {
                let (x, y) = chart.backend_coord(&(i as f64, 0.0));
                root.draw(&Text::new(
                    grade.as_str(),
                    (x, y + 6),
                    TextStyle::from((FONT, 14).into_font()).pos(below),
                ))?;
            }

            root.present()?;
        }

        info!(path = %path.display(), grades = counts.grades.len(), "wrote grade chart");
        Ok(())
    }

    /// Annotated heatmap of a correlation matrix with a color bar.
    ///
    /// Cell `(i, j)` is centered at `x = j`, `y = k - 1 - i` so row 0 is on top.
    pub fn render_correlation_heatmap(
        matrix: &CorrelationMatrix,
        path: &Path,
    ) -> Result<(), RenderError> {
        let k = matrix.labels.len().max(1);
        let (v_min, v_max) = Self::value_range(matrix);
        let edge = k as f64 - 0.5;

        {
            let root = BitMapBackend::new(path, (1000, 800)).into_drawing_area();
            root.fill(&WHITE)?;
            let (main, side) = root.split_horizontally(860);

            let mut chart = ChartBuilder::on(&main)
                .caption("Correlation Heatmap", (FONT, 24))
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(100)
                .build_cartesian_2d(-0.5f64..edge, -0.5f64..edge)?;

            chart
                .configure_mesh()
                .disable_mesh()
                .x_labels(0)
                .y_labels(0)
                .draw()?;

            let cells: Vec<(usize, usize, f64)> = matrix
                .values
                .iter()
                .enumerate()
                .flat_map(|(i, row)| row.iter().enumerate().map(move |(j, &v)| (i, j, v)))
                .collect();

            chart.draw_series(cells.iter().map(|&(i, j, v)| {
                let x = j as f64;
                let y = (k - 1 - i) as f64;
                let fill = if v.is_nan() {
                    WHITE
                } else {
                    Self::blues(Self::normalize(v, v_min, v_max))
                };
                Rectangle::new([(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)], fill.filled())
            }))?;

            for &(i, j, v) in &cells {
                let text = Self::annotation(v);
                let fill = Self::blues(Self::normalize(v, v_min, v_max));
                let color = if !v.is_nan() && Self::is_dark(fill) {
                    WHITE
                } else {
                    DARK_TEXT
                };
                let style = TextStyle::from((FONT, 20).into_font())
                    .color(&color)
                    .pos(Pos::new(HPos::Center, VPos::Center));
                chart.draw_series(std::iter::once(Text::new(
                    text,
                    (j as f64, (k - 1 - i) as f64),
                    style,
                )))?;
            }

            let below = Pos::new(HPos::Center, VPos::Top);
            let left_of = Pos::new(HPos::Right, VPos::Center);
            for (idx, label) in matrix.labels.iter().enumerate() {
                let (x, y) = chart.backend_coord(&(idx as f64, -0.5));
                root.draw(&Text::new(
                    label.as_str(),
                    (x, y + 8),
                    TextStyle::from((FONT, 15).into_font()).pos(below),
                ))?;

                let (x, y) = chart.backend_coord(&(-0.5, (k - 1 - idx) as f64));
                root.draw(&Text::new(
                    label.as_str(),
                    (x - 8, y),
                    TextStyle::from((FONT, 15).into_font()).pos(left_of),
                ))?;
            }

            Self::draw_color_bar(&side, v_min, v_max)?;
            root.present()?;
        }

        debug!(columns = ?matrix.labels, "correlation matrix drawn");
        info!(path = %path.display(), "wrote correlation heatmap");
        Ok(())
    }

    fn draw_color_bar<DB: DrawingBackend>(
        area: &DrawingArea<DB, plotters::coord::Shift>,
        v_min: f64,
        v_max: f64,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        const STEPS: usize = 100;
        let mut bar = ChartBuilder::on(area)
            .margin_top(60)
            .margin_bottom(70)
            .margin_right(40)
            .y_label_area_size(0)
            .right_y_label_area_size(50)
            .build_cartesian_2d(0f64..1f64, v_min..v_max)?;

        bar.configure_mesh()
            .disable_mesh()
            .disable_x_axis()
            .y_label_formatter(&|v| format!("{v:.2}"))
            .label_style((FONT, 13))
            .draw()?;

        let step = (v_max - v_min) / STEPS as f64;
        bar.draw_series((0..STEPS).map(|s| {
            let lo = v_min + step * s as f64;
            let color = Self::blues((s as f64 + 0.5) / STEPS as f64);
            Rectangle::new([(0.0, lo), (1.0, lo + step)], color.filled())
        }))?;
        Ok(())
    }

    fn annotation(v: f64) -> String {
        if v.is_nan() {
            "nan".to_string()
        } else {
            format!("{v:.2}")
        }
    }

    /// Color scale limits over the defined cells, widened when flat.
    fn value_range(matrix: &CorrelationMatrix) -> (f64, f64) {
        let (lo, hi) = matrix
            .values
            .iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        if lo.is_infinite() {
            (0.0, 1.0)
        } else if lo == hi {
            (lo - 0.5, hi + 0.5)
        } else {
            (lo, hi)
        }
    }

    fn normalize(v: f64, lo: f64, hi: f64) -> f64 {
        ((v - lo) / (hi - lo)).clamp(0.0, 1.0)
    }

    /// Interpolate the Blues color map at `t` in `[0, 1]`.
    fn blues(t: f64) -> RGBColor {
        let scaled = t.clamp(0.0, 1.0) * (BLUES.len() - 1) as f64;
        let lower = scaled.floor() as usize;
        let upper = (lower + 1).min(BLUES.len() - 1);
        let frac = scaled - lower as f64;
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
        let (a, b) = (BLUES[lower], BLUES[upper]);
        RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
    }

    /// Relative luminance test used to pick white annotation text.
    fn is_dark(color: RGBColor) -> bool {
        let channel = |c: u8| {
            let c = c as f64 / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        let lum = 0.2126 * channel(color.0) + 0.7152 * channel(color.1) + 0.0722 * channel(color.2);
        lum <= 0.408
    }
}
