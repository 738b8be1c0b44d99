//! FRED API integration for Treasury yields and the VIX close.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::data::{DataSource, DataUnavailable, DateWindow, parse_value};
use crate::domain::SeriesMap;
use crate::error::AppError;

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const OBS_LIMIT: usize = 100_000;
const TIMEOUT: Duration = Duration::from_secs(30);

/// 10-year constant-maturity Treasury yield, percent.
pub const SERIES_TREASURY_10Y: &str = "DGS10";
/// CBOE VIX daily close.
pub const SERIES_VIX: &str = "VIXCLS";

pub struct FredClient {
    client: Client,
    api_key: String,
}

impl FredClient {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("FRED_API_KEY")
            .map_err(|_| AppError::config("Missing FRED_API_KEY in environment (.env)."))?;
        Self::new(api_key)
    }

    pub fn new(api_key: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(TIMEOUT)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
        })
    }
}

impl DataSource for FredClient {
    fn name(&self) -> &str {
        "fred"
    }

    fn fetch_series(&self, series_id: &str, window: &DateWindow) -> Result<SeriesMap, DataUnavailable> {
        let limit = OBS_LIMIT.to_string();
        let start = window.start.to_string();
        let mut req = self.client.get(BASE_URL).query(&[
            ("series_id", series_id),
            ("api_key", self.api_key.as_str()),
            ("file_type", "json"),
            ("sort_order", "asc"),
            ("limit", limit.as_str()),
            ("observation_start", start.as_str()),
        ]);
        if let Some(end) = window.end {
            req = req.query(&[("observation_end", end.to_string())]);
        }

        debug!(series = series_id, "requesting FRED observations");
        let resp = req
            .send()
            .map_err(|e| DataUnavailable::new(series_id, format!("FRED request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(DataUnavailable::new(
                series_id,
                format!("FRED request failed with status {}", resp.status()),
            ));
        }

        let body: ObservationsResponse = resp
            .json()
            .map_err(|e| DataUnavailable::new(series_id, format!("failed to parse FRED response: {e}")))?;

        observations_to_series(series_id, body, window)
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

fn observations_to_series(
    series_id: &str,
    body: ObservationsResponse,
    window: &DateWindow,
) -> Result<SeriesMap, DataUnavailable> {
    let mut out = SeriesMap::new();
    for obs in body.observations {
        // Holidays come back as "." and are simply absent from the series.
        let Some(value) = parse_value(&obs.value) else {
            continue;
        };
        let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d")
            .map_err(|e| DataUnavailable::new(series_id, format!("invalid FRED date '{}': {e}", obs.date)))?;
        if window.contains(date) {
            out.insert(date, value);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> DateWindow {
        DateWindow::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), None).unwrap()
    }

    #[test]
    fn observations_skip_missing_values() {
        let body: ObservationsResponse = serde_json::from_str(
            r#"{"observations":[
                {"date":"2024-01-02","value":"3.95"},
                {"date":"2024-01-15","value":"."},
                {"date":"2024-01-16","value":"4.07"}
            ]}"#,
        )
        .unwrap();

        let series = observations_to_series("DGS10", body, &window()).unwrap();
        assert_eq!(series.len(), 2);
        let first = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert!((series[&first] - 3.95).abs() < 1e-12);
    }

    #[test]
    fn observations_reject_bad_dates() {
        let body: ObservationsResponse =
            serde_json::from_str(r#"{"observations":[{"date":"01/02/2024","value":"3.95"}]}"#).unwrap();
        let err = observations_to_series("DGS10", body, &window()).unwrap_err();
        assert_eq!(err.series, "DGS10");
    }

    #[test]
    fn observations_respect_window() {
        let body: ObservationsResponse = serde_json::from_str(
            r#"{"observations":[{"date":"2023-12-29","value":"3.88"},{"date":"2024-01-02","value":"3.95"}]}"#,
        )
        .unwrap();
        let series = observations_to_series("DGS10", body, &window()).unwrap();
        assert_eq!(series.len(), 1);
    }
}
