//! Yahoo Finance chart API for daily closes (LQD, HYG, TLT, ^VIX).

use std::time::Duration;

use chrono::{DateTime, NaiveTime};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::data::{DataSource, DataUnavailable, DateWindow};
use crate::domain::SeriesMap;
use crate::error::AppError;

const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const TIMEOUT: Duration = Duration::from_secs(30);
// The endpoint rejects requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; credit-stress/0.1)";

pub const SYMBOL_IG: &str = "LQD";
pub const SYMBOL_HY: &str = "HYG";
pub const SYMBOL_TREASURY_ETF: &str = "TLT";
pub const SYMBOL_VIX: &str = "^VIX";

pub struct YahooClient {
    client: Client,
}

impl YahooClient {
    pub fn new() -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl DataSource for YahooClient {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn fetch_series(&self, series_id: &str, window: &DateWindow) -> Result<SeriesMap, DataUnavailable> {
        let period1 = window.start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let period2 = match window.end {
            Some(end) => end.succ_opt().unwrap_or(end).and_time(NaiveTime::MIN).and_utc().timestamp(),
            None => chrono::Utc::now().timestamp(),
        };

        let url = format!("{BASE_URL}/{}", series_id.replace('^', "%5E"));
        debug!(symbol = series_id, %url, "requesting Yahoo chart");

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
            ])
            .send()
            .map_err(|e| DataUnavailable::new(series_id, format!("Yahoo request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(DataUnavailable::new(
                series_id,
                format!("Yahoo request failed with status {}", resp.status()),
            ));
        }

        let body: ChartResponse = resp
            .json()
            .map_err(|e| DataUnavailable::new(series_id, format!("failed to parse Yahoo response: {e}")))?;

        chart_to_series(series_id, body, window)
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

fn chart_to_series(series_id: &str, body: ChartResponse, window: &DateWindow) -> Result<SeriesMap, DataUnavailable> {
    if let Some(err) = body.chart.error {
        return Err(DataUnavailable::new(
            series_id,
            format!(
                "Yahoo error {}: {}",
                err.code.unwrap_or_default(),
                err.description.unwrap_or_default()
            ),
        ));
    }

    let result = body
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| DataUnavailable::new(series_id, "empty Yahoo chart result"))?;

    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    if closes.len() != result.timestamp.len() {
        return Err(DataUnavailable::new(
            series_id,
            format!(
                "Yahoo timestamps ({}) and closes ({}) differ in length",
                result.timestamp.len(),
                closes.len()
            ),
        ));
    }

    let mut out = SeriesMap::new();
    for (ts, close) in result.timestamp.into_iter().zip(closes) {
        let Some(close) = close.filter(|v| v.is_finite()) else {
            continue;
        };
        let date = DateTime::from_timestamp(ts, 0)
            .ok_or_else(|| DataUnavailable::new(series_id, format!("invalid timestamp {ts}")))?
            .date_naive();
        if window.contains(date) {
            out.insert(date, close);
        }
    }
    Ok(out)
}
