use thiserror::Error;

use crate::api::ApiError;

/// Everything that can stop a chart request; `Display` is the text shown on the page
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("API Key is not set. Please set ALPHAVANTAGE_API_KEY in your environment or .env file.")]
    ApiKeyNotSet,

    #[error("Invalid time series selected.")]
    InvalidSeries,

    #[error("Error: Invalid {field} '{value}'. Dates must use the YYYY-MM-DD format.")]
    InvalidDate { field: &'static str, value: String },

    #[error("Error: End date cannot be before the start date.")]
    EndBeforeStart,

    #[error("Network error: {0}")]
    Network(ApiError),

    #[error("An unexpected error occurred: {0}")]
    InvalidResponse(String),

    #[error("Could not retrieve data for symbol {symbol}. Error: {message}")]
    Provider { symbol: String, message: String },

    #[error("Error: The provider returned an invalid date '{0}'.")]
    InvalidRecordDate(String),

    #[error("Error: The record for {date} has no '{field}' value.")]
    MissingField { date: String, field: String },

    #[error("Error: Invalid price '{value}' for {date}.")]
    InvalidPrice { date: String, value: String },

    #[error("No data available for the selected date range.")]
    NoData,

    #[error("Failed to render chart: {0}")]
    Render(String),

    #[error("Failed to write chart: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ApiError> for ChartError {
    fn from(err: ApiError) -> Self {
        if err.is_transport() {
            ChartError::Network(err)
        } else {
            ChartError::InvalidResponse(err.to_string())
        }
    }
}

impl ChartError {
    /// Failures caused by what the user submitted rather than by the provider or the server
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ChartError::ApiKeyNotSet
                | ChartError::InvalidSeries
                | ChartError::InvalidDate { .. }
                | ChartError::EndBeforeStart
                | ChartError::NoData
        )
    }
}
