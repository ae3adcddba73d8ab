//! Chart generation models

use std::path::PathBuf;

use chrono::NaiveDate;

/// A single closing price on a chart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// How the series is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartType {
    #[default]
    Line,
    Bar,
}

impl ChartType {
    /// "bar" selects bars; any other value falls back to a line plot
    pub fn from_form_value(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("bar") {
            ChartType::Bar
        } else {
            ChartType::Line
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Line => "line",
            ChartType::Bar => "bar",
        }
    }
}

/// Everything the renderer needs to draw one chart
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub symbol: String,
    pub chart_type: ChartType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Ascending by date, never empty
    pub points: Vec<PricePoint>,
}

impl ChartSpec {
    pub fn title(&self) -> String {
        format!(
            "{} Stock Price ({} to {})",
            self.symbol,
            self.start_date.format("%Y-%m-%d"),
            self.end_date.format("%Y-%m-%d")
        )
    }
}

/// A rendered chart on disk and the URL the page should display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartArtifact {
    pub path: PathBuf,
    pub url: String,
}
