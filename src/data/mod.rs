//! Market data sources.
//!
//! Every source speaks the same contract: given a series id and a date window,
//! return a `SeriesMap` or a `DataUnavailable`. The pipeline never sees HTTP,
//! files or random number generators directly.
//!
//! - `fred`: FRED observations API (Treasury yields, VIXCLS)
//! - `yahoo`: Yahoo Finance chart API (ETF and index closes)
//! - `sample`: deterministic synthetic market for offline runs
//! - `crate::io::ingest::CsvSource`: one CSV file per series

use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

use crate::domain::{CorporateQuote, RawSeriesBundle, SeriesMap};
use crate::error::AppError;

pub mod fred;
pub mod sample;
pub mod yahoo;

pub use fred::FredClient;
pub use sample::{SyntheticConfig, SyntheticMarket};
pub use yahoo::YahooClient;

/// A source could not deliver a series.
#[derive(Debug, Clone, Error)]
#[error("series '{series}' unavailable: {reason}")]
pub struct DataUnavailable {
    pub series: String,
    pub reason: String,
}

impl DataUnavailable {
    pub fn new(series: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            series: series.into(),
            reason: reason.into(),
        }
    }
}

/// Inclusive date range. `end = None` means "up to the latest observation".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: Option<NaiveDate>) -> Result<Self, AppError> {
        if let Some(end) = end {
            if end < start {
                return Err(AppError::config(format!("end date {end} is before start date {start}")));
            }
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && self.end.is_none_or(|end| date <= end)
    }
}

pub trait DataSource {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn fetch_series(&self, series_id: &str, window: &DateWindow) -> Result<SeriesMap, DataUnavailable>;
}

/// Which series ids to request for each column of the bundle.
#[derive(Debug, Clone)]
pub struct SeriesPlan {
    pub ig: Option<String>,
    pub hy: Option<String>,
    pub treasury: String,
    /// Treasury ETF prices, read only for `CorporateQuote::Relative`.
    pub treasury_etf: Option<String>,
    pub vix: String,
    pub quote: CorporateQuote,
}

/// The source responsible for each column.
pub struct Sources<'a> {
    pub corporate: &'a dyn DataSource,
    pub treasury: &'a dyn DataSource,
    pub vix: &'a dyn DataSource,
}

impl<'a> Sources<'a> {
    /// Use one source for every column.
    pub fn single(source: &'a dyn DataSource) -> Self {
        Self {
            corporate: source,
            treasury: source,
            vix: source,
        }
    }
}

/// Fetch every series named by `plan` and assemble the raw bundle.
///
/// Any source failure aborts the run as `AppError::Data`.
pub fn fetch_bundle(plan: &SeriesPlan, window: &DateWindow, sources: &Sources<'_>) -> Result<RawSeriesBundle, AppError> {
    if plan.ig.is_none() && plan.hy.is_none() {
        return Err(AppError::data("at least one corporate series (IG or HY) is required"));
    }

    let ig = match &plan.ig {
        Some(id) => Some(fetch_one(sources.corporate, id, window)?),
        None => None,
    };
    let hy = match &plan.hy {
        Some(id) => Some(fetch_one(sources.corporate, id, window)?),
        None => None,
    };
    let treasury = fetch_one(sources.treasury, &plan.treasury, window)?;
    // The Treasury ETF trades alongside the corporate ETFs.
    let treasury_etf = match (plan.quote, &plan.treasury_etf) {
        (CorporateQuote::Relative, Some(id)) => Some(fetch_one(sources.corporate, id, window)?),
        (CorporateQuote::Relative, None) => {
            return Err(AppError::data("relative spreads need a Treasury ETF series id"));
        }
        _ => None,
    };
    let vix = fetch_one(sources.vix, &plan.vix, window)?;

    Ok(RawSeriesBundle {
        ig_proxy: ig,
        hy_proxy: hy,
        treasury,
        treasury_etf,
        vix,
        quote: plan.quote,
    })
}

fn fetch_one(source: &dyn DataSource, series_id: &str, window: &DateWindow) -> Result<SeriesMap, AppError> {
    let series = source.fetch_series(series_id, window)?;
    if series.is_empty() {
        return Err(DataUnavailable::new(series_id, "no observations in requested window").into());
    }
    info!(
        source = source.name(),
        series = series_id,
        observations = series.len(),
        "fetched series"
    );
    Ok(series)
}

/// Parse a numeric observation, rejecting blanks, FRED's `.` marker and non-finite values.
pub(crate) fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}
