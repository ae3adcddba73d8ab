use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::models::request::{DEFAULT_CHART_TYPE, DEFAULT_TIME_SERIES};
use crate::models::{ChartArtifact, ChartForm, ChartRequest, ChartSpec, ChartType, ResolvedForm, TimeSeries};
use crate::services::series_service;
use crate::utils::ChartError;
use crate::AppState;

/// Apply form defaults; nothing is validated here
pub fn resolve_form(form: ChartForm, symbols: &[String]) -> ResolvedForm {
    let or_default = |value: Option<String>, default: &str| {
        value
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| default.to_string())
    };

    ResolvedForm {
        symbol: or_default(
            form.stock_symbol,
            symbols.first().map(String::as_str).unwrap_or(""),
        ),
        chart_type: or_default(form.chart_type, DEFAULT_CHART_TYPE),
        time_series: or_default(form.time_series, DEFAULT_TIME_SERIES),
        start_date: or_default(form.start_date, ""),
        end_date: or_default(form.end_date, ""),
    }
}

/// Parse a `YYYY-MM-DD` form date
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ChartError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ChartError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// Check everything that can be checked without the network
///
/// Order: API key, series, dates. Each failure stops the request before the fetch.
pub fn build_request(config: &Config, form: &ResolvedForm) -> Result<ChartRequest, ChartError> {
    if !config.has_api_key() {
        return Err(ChartError::ApiKeyNotSet);
    }

    let series = TimeSeries::from_form_value(&form.time_series).ok_or_else(|| {
        debug!("Unrecognized time series '{}'", form.time_series);
        ChartError::InvalidSeries
    })?;

    let start_date = parse_date("start date", &form.start_date)?;
    let end_date = parse_date("end date", &form.end_date)?;
    if end_date < start_date {
        return Err(ChartError::EndBeforeStart);
    }

    Ok(ChartRequest {
        symbol: form.symbol.clone(),
        chart_type: ChartType::from_form_value(&form.chart_type),
        series,
        start_date,
        end_date,
    })
}

/// Run one submitted form through fetch, validation, filtering and rendering
pub async fn generate_chart(state: &AppState, form: &ResolvedForm) -> Result<ChartArtifact, ChartError> {
    let request = build_request(&state.config, form)?;
    let descriptor = request.series.descriptor();

    info!(
        "Fetching {} for {} ({} to {})",
        descriptor.function, request.symbol, request.start_date, request.end_date
    );
    let body = state
        .fetcher
        .fetch_series(descriptor.function, &request.symbol)
        .await?;

    let records = series_service::validate_response(&body, &descriptor, &request.symbol)?;
    let points = series_service::extract_series(
        records,
        descriptor.close_field,
        request.start_date,
        request.end_date,
    )?;
    info!("{} points in range for {}", points.len(), request.symbol);

    let spec = ChartSpec {
        symbol: request.symbol,
        chart_type: request.chart_type,
        start_date: request.start_date,
        end_date: request.end_date,
        points,
    };

    let artifact = state.renderer.render(&spec)?;
    info!("Chart written to {}", artifact.path.display());
    Ok(artifact)
}

/// Outcome of a form submission: exactly one of `chart_url` / `error` is set
#[derive(Debug, Clone)]
pub struct ChartOutcome {
    pub chart_url: Option<String>,
    pub error: Option<String>,
}

/// Like `generate_chart`, but every failure becomes the message shown on the page
pub async fn handle_submission(state: &AppState, form: &ResolvedForm) -> ChartOutcome {
    match generate_chart(state, form).await {
        Ok(artifact) => ChartOutcome {
            chart_url: Some(artifact.url),
            error: None,
        },
        Err(e) => {
            if e.is_user_error() {
                warn!("Chart request for '{}' rejected: {}", form.symbol, e);
            } else {
                error!("Chart request for '{}' failed: {}", form.symbol, e);
            }
            ChartOutcome {
                chart_url: None,
                error: Some(e.to_string()),
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::{ApiError, SeriesFetcher};
    use crate::services::chart_service::ChartRenderer;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Fetcher returning a canned body and counting calls
    pub struct MockFetcher {
        pub response: Result<Value, ApiError>,
        pub calls: AtomicUsize,
    }

    impl MockFetcher {
        pub fn returning(body: Value) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(body),
                calls: AtomicUsize::new(0),
            })
        }

        pub fn failing(err: ApiError) -> Arc<Self> {
            Arc::new(Self {
                response: Err(err),
                calls: AtomicUsize::new(0),
            })
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SeriesFetcher for MockFetcher {
        async fn fetch_series(&self, _function: &str, _symbol: &str) -> Result<Value, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone()
        }
    }

    /// Renderer that records specs and hands out a fixed path with a counter stamp
    #[derive(Default)]
    pub struct RecordingRenderer {
        pub specs: Mutex<Vec<ChartSpec>>,
    }

    impl ChartRenderer for RecordingRenderer {
        fn render(&self, spec: &ChartSpec) -> Result<ChartArtifact, ChartError> {
            let mut specs = self.specs.lock().unwrap();
            specs.push(spec.clone());
            Ok(ChartArtifact {
                path: "static/images/stock_chart.png".into(),
                url: format!("/static/images/stock_chart.png?t={}", specs.len()),
            })
        }
    }

    pub fn test_config() -> Config {
        Config {
            api_key: "test-key".to_string(),
            ..Config::default()
        }
    }

    pub fn test_state(fetcher: Arc<MockFetcher>, renderer: Arc<RecordingRenderer>) -> AppState {
        AppState {
            config: test_config(),
            fetcher,
            renderer,
        }
    }

    pub fn aapl_daily_body() -> Value {
        json!({
            "Meta Data": { "2. Symbol": "AAPL" },
            "Time Series (Daily)": {
                "2024-01-05": { "4. close": "181.18", "5. adjusted close": "180.43" },
                "2024-01-04": { "4. close": "181.91", "5. adjusted close": "181.15" },
                "2024-01-03": { "4. close": "184.25", "5. adjusted close": "183.49" },
                "2024-01-02": { "4. close": "185.64", "5. adjusted close": "184.87" },
                "2024-01-01": { "4. close": "186.00", "5. adjusted close": "185.20" }
            }
        })
    }

    fn form(series: &str, start: &str, end: &str) -> ResolvedForm {
        ResolvedForm {
            symbol: "AAPL".to_string(),
            chart_type: "line".to_string(),
            time_series: series.to_string(),
            start_date: start.to_string(),
            end_date: end.to_string(),
        }
    }

    #[test]
    fn test_resolve_form_defaults() {
        let symbols = vec!["AAPL".to_string(), "MSFT".to_string()];
        let resolved = resolve_form(ChartForm::default(), &symbols);
        assert_eq!(resolved.symbol, "AAPL");
        assert_eq!(resolved.chart_type, "line");
        assert_eq!(resolved.time_series, "TIME_SERIES_DAILY_ADJUSTED");
        assert_eq!(resolved.start_date, "");

        let resolved = resolve_form(ChartForm::default(), &[]);
        assert_eq!(resolved.symbol, "");
    }

    #[test]
    fn test_resolve_form_keeps_submitted_values() {
        let submitted = ChartForm {
            stock_symbol: Some(" IBM ".to_string()),
            chart_type: Some("bar".to_string()),
            time_series: Some("TIME_SERIES_WEEKLY".to_string()),
            start_date: Some("2023-01-01".to_string()),
            end_date: Some("2023-12-31".to_string()),
        };
        let resolved = resolve_form(submitted, &["AAPL".to_string()]);
        assert_eq!(resolved.symbol, "IBM");
        assert_eq!(resolved.chart_type, "bar");
        assert_eq!(resolved.end_date, "2023-12-31");
    }

    #[test]
    fn test_parse_date_names_field() {
        assert!(parse_date("start date", "2024-02-29").is_ok());
        let err = parse_date("end date", "2023-02-29").unwrap_err();
        assert!(matches!(err, ChartError::InvalidDate { field: "end date", .. }));
        assert!(parse_date("start date", "01/02/2024").is_err());
    }

    #[tokio::test]
    async fn test_end_to_end_daily_adjusted() {
        let fetcher = MockFetcher::returning(aapl_daily_body());
        let renderer = Arc::new(RecordingRenderer::default());
        let state = test_state(fetcher.clone(), renderer.clone());

        let artifact = generate_chart(&state, &form("TIME_SERIES_DAILY_ADJUSTED", "2024-01-01", "2024-01-05"))
            .await
            .unwrap();
        assert!(artifact.url.starts_with("/static/images/stock_chart.png?t="));
        assert_eq!(fetcher.call_count(), 1);

        let specs = renderer.specs.lock().unwrap();
        let spec = &specs[0];
        assert_eq!(spec.points.len(), 5);
        assert!(spec.points.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(spec.points[0].close, 185.20);
        let title = spec.title();
        assert!(title.contains("AAPL"));
        assert!(title.contains("2024-01-01"));
        assert!(title.contains("2024-01-05"));
    }

    #[tokio::test]
    async fn test_end_before_start() {
        let fetcher = MockFetcher::returning(aapl_daily_body());
        let state = test_state(fetcher.clone(), Arc::new(RecordingRenderer::default()));

        let outcome = handle_submission(&state, &form("TIME_SERIES_DAILY_ADJUSTED", "2024-01-05", "2024-01-01")).await;
        assert_eq!(
            outcome.error.as_deref(),
            Some("Error: End date cannot be before the start date.")
        );
        assert!(outcome.chart_url.is_none());
        assert_eq!(fetcher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_series_makes_no_call() {
        let fetcher = MockFetcher::returning(aapl_daily_body());
        let state = test_state(fetcher.clone(), Arc::new(RecordingRenderer::default()));

        let outcome = handle_submission(&state, &form("TIME_SERIES_INTRADAY", "2024-01-01", "2024-01-05")).await;
        assert_eq!(outcome.error.as_deref(), Some("Invalid time series selected."));
        assert_eq!(fetcher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_key_makes_no_call() {
        let fetcher = MockFetcher::returning(aapl_daily_body());
        let mut state = test_state(fetcher.clone(), Arc::new(RecordingRenderer::default()));
        state.config.api_key = crate::config::API_KEY_PLACEHOLDER.to_string();

        let err = generate_chart(&state, &form("TIME_SERIES_DAILY_ADJUSTED", "2024-01-01", "2024-01-05"))
            .await
            .unwrap_err();
        assert!(matches!(err, ChartError::ApiKeyNotSet));
        assert_eq!(fetcher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unparseable_date_is_distinct_error() {
        let fetcher = MockFetcher::returning(aapl_daily_body());
        let state = test_state(fetcher.clone(), Arc::new(RecordingRenderer::default()));

        let err = generate_chart(&state, &form("TIME_SERIES_DAILY_ADJUSTED", "", "2024-01-05"))
            .await
            .unwrap_err();
        assert!(matches!(err, ChartError::InvalidDate { field: "start date", .. }));
        assert_eq!(fetcher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_provider_error_names_symbol() {
        let fetcher = MockFetcher::returning(json!({
            "Error Message": "Invalid API call. Please retry or visit the documentation."
        }));
        let renderer = Arc::new(RecordingRenderer::default());
        let state = test_state(fetcher, renderer.clone());

        let outcome = handle_submission(&state, &form("TIME_SERIES_MONTHLY", "2024-01-01", "2024-01-05")).await;
        let error = outcome.error.unwrap();
        assert!(error.contains("AAPL"));
        assert!(error.contains("Invalid API call"));
        assert!(outcome.chart_url.is_none());
        assert!(renderer.specs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_records() {
        let fetcher = MockFetcher::returning(aapl_daily_body());
        let state = test_state(fetcher, Arc::new(RecordingRenderer::default()));

        let outcome = handle_submission(&state, &form("TIME_SERIES_DAILY_ADJUSTED", "2023-06-01", "2023-06-30")).await;
        assert_eq!(
            outcome.error.as_deref(),
            Some("No data available for the selected date range.")
        );
    }

    #[tokio::test]
    async fn test_network_failure_message() {
        let fetcher = MockFetcher::failing(ApiError::RequestError("connection refused".into()));
        let state = test_state(fetcher.clone(), Arc::new(RecordingRenderer::default()));

        let outcome = handle_submission(&state, &form("TIME_SERIES_DAILY_ADJUSTED", "2024-01-01", "2024-01-05")).await;
        assert_eq!(
            outcome.error.as_deref(),
            Some("Network error: Request Error: connection refused")
        );
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn test_repeated_request_gets_fresh_url() {
        let fetcher = MockFetcher::returning(aapl_daily_body());
        let state = test_state(fetcher, Arc::new(RecordingRenderer::default()));
        let submitted = form("TIME_SERIES_DAILY_ADJUSTED", "2024-01-01", "2024-01-05");

        let first = generate_chart(&state, &submitted).await.unwrap();
        let second = generate_chart(&state, &submitted).await.unwrap();
        assert_eq!(first.path, second.path);
        assert_ne!(first.url, second.url);
    }
}
