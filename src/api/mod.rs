//! Outbound market data providers

use async_trait::async_trait;
use serde_json::Value;

pub mod alphavantage;

pub use alphavantage::{AlphaVantageClient, ApiError, ProviderNotice};

/// Source of raw time series bodies, keyed by provider function name
///
/// The request pipeline only talks to this trait so the provider can be
/// swapped or counted in tests.
#[async_trait]
pub trait SeriesFetcher: Send + Sync {
    async fn fetch_series(&self, function: &str, symbol: &str) -> Result<Value, ApiError>;
}
