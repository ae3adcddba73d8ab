//! Data models for the chart request pipeline
//!
//! Form input, validated requests and the chart artifacts produced from them.

pub mod chart;
pub mod request;

pub use chart::{ChartArtifact, ChartSpec, ChartType, PricePoint};
pub use request::{ChartForm, ChartRequest, ResolvedForm, SeriesDescriptor, TimeSeries};
