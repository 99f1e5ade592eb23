//! Charts module - Static chart rendering

mod plotter;
mod renderer;

pub use plotter::{ChartData, GradeCounts, HistogramData, CORRELATION_COLUMNS, HISTOGRAM_BINS};
pub use renderer::{
    RenderError, StaticChartRenderer, GRADE_FILE, HEATMAP_FILE, HISTOGRAM_FILE,
};
