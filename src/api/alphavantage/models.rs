use serde_json::Value;
use thiserror::Error;

/// Free-text notices Alpha Vantage puts at the top level of a response
/// instead of the requested series
#[derive(Debug, Clone, Default)]
pub struct ProviderNotice {
    /// Rate limit note (5 calls/minute on the free tier)
    pub note: Option<String>,
    /// Unknown symbol or function
    pub error_message: Option<String>,
    /// Premium endpoint or daily quota text
    pub information: Option<String>,
}

impl ProviderNotice {
    /// Pull the notice fields out of a parsed body, ignoring everything else
    ///
    /// Each key is read on its own, so a malformed sibling never hides a usable one.
    pub fn from_body(body: &Value) -> Self {
        let text = |key: &str| {
            body.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
        };

        Self {
            note: text("Note"),
            error_message: text("Error Message"),
            information: text("Information"),
        }
    }

    /// The most relevant message, rate limit note first
    pub fn message(&self) -> Option<&str> {
        self.note
            .as_deref()
            .or(self.error_message.as_deref())
            .or(self.information.as_deref())
    }
}

/// Errors raised while talking to the provider
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// 429 Too Many Requests
    #[error("Rate Limited ({0})")]
    RateLimited(String),
    /// 5xx Server Error
    #[error("Server Error ({0}): {1}")]
    ServerError(u16, String),
    /// Other non-success HTTP status
    #[error("HTTP Error ({0}): {1}")]
    HttpError(u16, String),
    /// Request did not complete within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),
    /// Connection or transport failure
    #[error("Request Error: {0}")]
    RequestError(String),
    /// Body was not valid JSON
    #[error("Deserialization Error: {0}")]
    DeserializationError(String),
}

impl ApiError {
    /// Transport-level failures, as opposed to an unreadable body
    pub fn is_transport(&self) -> bool {
        !matches!(self, ApiError::DeserializationError(_))
    }
}
