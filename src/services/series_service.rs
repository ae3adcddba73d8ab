use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::api::ProviderNotice;
use crate::models::{PricePoint, SeriesDescriptor};
use crate::utils::ChartError;

const UNKNOWN_API_ERROR: &str = "Unknown API error";

/// Find the per-date records for `descriptor` in a provider body
///
/// A body without the series key is a provider-side failure; its own notice text
/// is surfaced when there is one.
pub fn validate_response<'a>(
    body: &'a Value,
    descriptor: &SeriesDescriptor,
    symbol: &str,
) -> Result<&'a Map<String, Value>, ChartError> {
    let Some(series) = body.get(descriptor.series_key) else {
        let notice = ProviderNotice::from_body(body);
        return Err(ChartError::Provider {
            symbol: symbol.to_string(),
            message: notice.message().unwrap_or(UNKNOWN_API_ERROR).to_string(),
        });
    };

    series.as_object().ok_or_else(|| {
        ChartError::InvalidResponse(format!(
            "'{}' is not a date-indexed object",
            descriptor.series_key
        ))
    })
}

/// Convert every record, then keep the ones inside `[start, end]`, oldest first
///
/// Conversion runs over the whole series so a malformed record fails the request
/// even when it lies outside the window.
pub fn extract_series(
    records: &Map<String, Value>,
    close_field: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<PricePoint>, ChartError> {
    let mut points = Vec::with_capacity(records.len());

    for (date_str, record) in records {
        let date = parse_record_date(date_str)?;
        let close = parse_close(date_str, record, close_field)?;
        points.push(PricePoint { date, close });
    }

    points.retain(|p| p.date >= start && p.date <= end);

    if points.is_empty() {
        return Err(ChartError::NoData);
    }

    points.sort_by_key(|p| p.date);
    Ok(points)
}

/// Accepts plain dates and the "YYYY-MM-DD HH:MM:SS" stamps used by intraday series
fn parse_record_date(date_str: &str) -> Result<NaiveDate, ChartError> {
    let trimmed = date_str.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .map_err(|_| ChartError::InvalidRecordDate(date_str.to_string()))
}

/// Prices arrive as strings ("185.64"); bare JSON numbers are accepted too
fn parse_close(date_str: &str, record: &Value, close_field: &str) -> Result<f64, ChartError> {
    let value = record
        .get(close_field)
        .filter(|v| !v.is_null())
        .ok_or_else(|| ChartError::MissingField {
            date: date_str.to_string(),
            field: close_field.to_string(),
        })?;

    let invalid = || ChartError::InvalidPrice {
        date: date_str.to_string(),
        value: match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    };

    let close = match value {
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| invalid())?,
        Value::Number(n) => n.as_f64().ok_or_else(invalid)?,
        _ => return Err(invalid()),
    };

    if !close.is_finite() {
        return Err(invalid());
    }

    Ok(close)
}
