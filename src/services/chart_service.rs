use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use chrono::{Datelike, NaiveDate, Utc};
use plotters::prelude::*;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{ChartArtifact, ChartSpec, ChartType, PricePoint};
use crate::utils::ChartError;

pub const CHART_FILE_STEM: &str = "stock_chart";
pub const CHART_URL_PREFIX: &str = "/static/images";
pub const CHART_WIDTH: u32 = 1200;
pub const CHART_HEIGHT: u32 = 600;
pub const DEFAULT_RETAINED_CHARTS: usize = 20;

const LINE_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Turns a chart spec into an image the page can link to
pub trait ChartRenderer: Send + Sync {
    fn render(&self, spec: &ChartSpec) -> Result<ChartArtifact, ChartError>;
}

/// Where each render lands on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactNaming {
    /// One shared file, overwritten by every request
    Fixed,
    /// A fresh file per request
    PerRequest,
}

/// PNG renderer writing under a static directory
pub struct PngChartRenderer {
    output_dir: PathBuf,
    naming: ArtifactNaming,
    width: u32,
    height: u32,
    last_stamp: AtomicI64,
    /// Per-request files still on disk, oldest first
    written: Mutex<VecDeque<PathBuf>>,
    retain: usize,
}

impl PngChartRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, naming: ArtifactNaming) -> Self {
        Self {
            output_dir: output_dir.into(),
            naming,
            width: CHART_WIDTH,
            height: CHART_HEIGHT,
            last_stamp: AtomicI64::new(0),
            written: Mutex::new(VecDeque::new()),
            retain: DEFAULT_RETAINED_CHARTS,
        }
    }

    /// Cap on per-request files kept on disk; at least the latest chart is always kept
    pub fn with_retention(mut self, retain: usize) -> Self {
        self.retain = retain.max(1);
        self
    }

    fn file_name(&self) -> String {
        match self.naming {
            ArtifactNaming::Fixed => format!("{}.png", CHART_FILE_STEM),
            ArtifactNaming::PerRequest => format!("{}_{}.png", CHART_FILE_STEM, Uuid::new_v4()),
        }
    }

    /// Microsecond clock value, bumped when two renders land in the same tick
    fn next_stamp(&self) -> i64 {
        let now = Utc::now().timestamp_micros();
        let previous = self
            .last_stamp
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or(now);
        now.max(previous + 1)
    }

    /// Record a freshly written per-request chart and delete the ones past the cap
    fn retire_old_charts(&self, path: &Path) {
        if self.naming == ArtifactNaming::Fixed {
            return;
        }

        let mut written = match self.written.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        written.push_back(path.to_path_buf());

        while written.len() > self.retain {
            let Some(old) = written.pop_front() else { break };
            match fs::remove_file(&old) {
                Ok(()) => debug!("Removed old chart {}", old.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove old chart {}: {}", old.display(), e),
            }
        }
    }
}

impl ChartRenderer for PngChartRenderer {
    fn render(&self, spec: &ChartSpec) -> Result<ChartArtifact, ChartError> {
        if spec.points.is_empty() {
            return Err(ChartError::NoData);
        }

        fs::create_dir_all(&self.output_dir)?;

        let file_name = self.file_name();
        let path = self.output_dir.join(&file_name);
        debug!("Drawing {} chart with {} points to {}", spec.chart_type.as_str(), spec.points.len(), path.display());

        draw_chart(&path, spec, self.width, self.height)?;
        self.retire_old_charts(&path);

        Ok(ChartArtifact {
            url: chart_url(&file_name, self.next_stamp()),
            path,
        })
    }
}

/// Display URL with a cache-busting `t` parameter
pub fn chart_url(file_name: &str, stamp: i64) -> String {
    format!("{}/{}?t={}", CHART_URL_PREFIX, file_name, stamp)
}

fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn format_day_number(value: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(value.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// X range in day numbers, padded by one day so single points and edge bars stay visible
fn x_range(points: &[PricePoint]) -> (f64, f64) {
    let first = points.first().map(|p| day_number(p.date)).unwrap_or(0.0);
    let last = points.last().map(|p| day_number(p.date)).unwrap_or(0.0);
    (first - 1.0, last + 1.0)
}

/// Bars start from zero; lines get 10% headroom around the observed prices
fn y_range(points: &[PricePoint], chart_type: ChartType) -> (f64, f64) {
    let min_price = points.iter().map(|p| p.close).fold(f64::INFINITY, f64::min);
    let max_price = points.iter().map(|p| p.close).fold(f64::NEG_INFINITY, f64::max);

    let price_range = (max_price - min_price).max(1e-8);
    let padding = price_range * 0.1;

    match chart_type {
        ChartType::Bar => (0.0_f64.min(min_price), max_price + padding),
        ChartType::Line => ((min_price - padding).max(0.0), max_price + padding),
    }
}

/// 80% of the tightest spacing between neighbouring points, in days
fn bar_width(points: &[PricePoint]) -> f64 {
    points
        .windows(2)
        .map(|w| (w[1].date - w[0].date).num_days() as f64)
        .filter(|gap| *gap > 0.0)
        .fold(None, |acc: Option<f64>, gap| Some(acc.map_or(gap, |a| a.min(gap))))
        .unwrap_or(1.0)
        * 0.8
}

fn draw_chart(path: &Path, spec: &ChartSpec, width: u32, height: u32) -> Result<(), ChartError> {
    let points = &spec.points;
    let (x_min, x_max) = x_range(points);
    let (y_min, y_max) = y_range(points, spec.chart_type);

    let backend = BitMapBackend::new(path, (width, height));
    let root = backend.into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| ChartError::Render(format!("Failed to fill canvas: {}", e)))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(spec.title(), ("sans-serif", 28.0).into_font())
        .margin(15)
        .x_label_area_size(90)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| ChartError::Render(format!("Failed to build chart: {}", e)))?;

    let tick_style = ("sans-serif", 13.0)
        .into_font()
        .transform(FontTransform::Rotate90);

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Adjusted Close Price (USD)")
        .x_labels(12)
        .x_label_style(tick_style)
        .x_label_formatter(&|v| format_day_number(*v))
        .y_label_formatter(&|v| format!("{:.2}", v))
        .draw()
        .map_err(|e| ChartError::Render(format!("Failed to draw mesh: {}", e)))?;

    match spec.chart_type {
        ChartType::Line => {
            chart
                .draw_series(LineSeries::new(
                    points.iter().map(|p| (day_number(p.date), p.close)),
                    LINE_COLOR.stroke_width(2),
                ))
                .map_err(|e| ChartError::Render(format!("Failed to draw line: {}", e)))?;
        }
        ChartType::Bar => {
            let half = bar_width(points) / 2.0;
            chart
                .draw_series(points.iter().map(|p| {
                    let x = day_number(p.date);
                    Rectangle::new([(x - half, 0.0), (x + half, p.close)], LINE_COLOR.filled())
                }))
                .map_err(|e| ChartError::Render(format!("Failed to draw bars: {}", e)))?;
        }
    }

    root.present()
        .map_err(|e| ChartError::Render(format!("Failed to write image: {}", e)))?;

    Ok(())
}
