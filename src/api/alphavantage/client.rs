use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::Value;
use tracing::{debug, warn};

use super::models::{ApiError, ProviderNotice};
use crate::api::SeriesFetcher;

/// Alpha Vantage API client for historical price series
pub struct AlphaVantageClient {
    http_client: HttpClient,
    api_key: String,
    base_url: String,
}

impl AlphaVantageClient {
    /// Create a new Alpha Vantage client against `base_url`
    ///
    /// `timeout` bounds the whole request; `None` waits for the provider indefinitely.
    pub fn with_base_url(
        api_key: String,
        base_url: String,
        timeout: Option<Duration>,
    ) -> Result<Self, ApiError> {
        let mut builder = HttpClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| ApiError::RequestError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn map_send_error(e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout(e.to_string())
        } else {
            ApiError::RequestError(e.to_string())
        }
    }

    /// Parse error response based on HTTP status code
    async fn handle_error_response(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> ApiError {
        let status_code = status.as_u16();
        let body_text = response.text().await.unwrap_or_default();

        match status_code {
            429 => {
                warn!("Alpha Vantage rate limited the request: {}", body_text);
                ApiError::RateLimited(body_text)
            }
            500..=599 => {
                warn!("Server error {}: {}", status_code, body_text);
                ApiError::ServerError(status_code, body_text)
            }
            _ => ApiError::HttpError(status_code, body_text),
        }
    }

    /// GET /query?function={function}&symbol={symbol}&apikey={key}
    ///
    /// Returns the parsed JSON body as-is. Alpha Vantage answers quota and symbol
    /// problems with a 200 and a notice object, so callers still have to look for
    /// the series key themselves.
    pub async fn get_time_series(&self, function: &str, symbol: &str) -> Result<Value, ApiError> {
        let url = format!("{}/query", self.base_url);
        debug!("GET {} function={} symbol={}", url, function, symbol);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("function", function),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(Self::map_send_error)?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        let body = response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(e.to_string())
            } else {
                ApiError::DeserializationError(format!("Failed to parse response: {}", e))
            }
        })?;

        if let Some(message) = ProviderNotice::from_body(&body).message() {
            warn!("Alpha Vantage notice for {} ({}): {}", symbol, function, message);
        }

        Ok(body)
    }
}

#[async_trait]
impl SeriesFetcher for AlphaVantageClient {
    async fn fetch_series(&self, function: &str, symbol: &str) -> Result<Value, ApiError> {
        self.get_time_series(function, symbol).await
    }
}
