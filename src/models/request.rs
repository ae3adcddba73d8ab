//! Chart request models

use chrono::NaiveDate;
use serde::Deserialize;

use super::chart::ChartType;

pub const DEFAULT_CHART_TYPE: &str = "line";
pub const DEFAULT_TIME_SERIES: &str = "TIME_SERIES_DAILY_ADJUSTED";

/// Form fields as posted by the browser; any of them may be missing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartForm {
    pub stock_symbol: Option<String>,
    pub chart_type: Option<String>,
    pub time_series: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Form values with defaults applied, echoed back into the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedForm {
    pub symbol: String,
    pub chart_type: String,
    pub time_series: String,
    pub start_date: String,
    pub end_date: String,
}

/// A fully validated request, ready for the provider
#[derive(Debug, Clone)]
pub struct ChartRequest {
    pub symbol: String,
    pub chart_type: ChartType,
    pub series: TimeSeries,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Series granularities offered by the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSeries {
    DailyAdjusted,
    Weekly,
    Monthly,
}

/// Where a series lives in the provider's API and response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesDescriptor {
    /// `function=` query value
    pub function: &'static str,
    /// Top-level response key holding the per-date records
    pub series_key: &'static str,
    /// Record field holding the closing price
    pub close_field: &'static str,
}

impl TimeSeries {
    pub const ALL: [TimeSeries; 3] = [
        TimeSeries::DailyAdjusted,
        TimeSeries::Weekly,
        TimeSeries::Monthly,
    ];

    /// Map the form's `time_series` value; `None` for anything unrecognized
    pub fn from_form_value(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|series| series.descriptor().function == value.trim())
    }

    pub fn descriptor(&self) -> SeriesDescriptor {
        match self {
            TimeSeries::DailyAdjusted => SeriesDescriptor {
                function: "TIME_SERIES_DAILY_ADJUSTED",
                series_key: "Time Series (Daily)",
                close_field: "5. adjusted close",
            },
            TimeSeries::Weekly => SeriesDescriptor {
                function: "TIME_SERIES_WEEKLY",
                series_key: "Weekly Time Series",
                close_field: "4. close",
            },
            TimeSeries::Monthly => SeriesDescriptor {
                function: "TIME_SERIES_MONTHLY",
                series_key: "Monthly Time Series",
                close_field: "4. close",
            },
        }
    }

    /// Option text shown in the form
    pub fn label(&self) -> &'static str {
        match self {
            TimeSeries::DailyAdjusted => "Daily (adjusted)",
            TimeSeries::Weekly => "Weekly",
            TimeSeries::Monthly => "Monthly",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_mapping() {
        let daily = TimeSeries::from_form_value("TIME_SERIES_DAILY_ADJUSTED").unwrap();
        assert_eq!(daily.descriptor().series_key, "Time Series (Daily)");
        assert_eq!(daily.descriptor().close_field, "5. adjusted close");

        let weekly = TimeSeries::from_form_value("TIME_SERIES_WEEKLY").unwrap();
        assert_eq!(weekly.descriptor().series_key, "Weekly Time Series");
        assert_eq!(weekly.descriptor().close_field, "4. close");

        let monthly = TimeSeries::from_form_value("TIME_SERIES_MONTHLY").unwrap();
        assert_eq!(monthly.descriptor().series_key, "Monthly Time Series");
    }

    #[test]
    fn test_unknown_series_is_none() {
        assert!(TimeSeries::from_form_value("TIME_SERIES_INTRADAY").is_none());
        assert!(TimeSeries::from_form_value("").is_none());
        assert!(TimeSeries::from_form_value("time_series_weekly").is_none());
    }
}
