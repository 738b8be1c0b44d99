//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between pipeline stages by value
//! - exported to CSV/JSON
//! - constructed directly in tests without any I/O

use std::collections::BTreeMap;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A single date-indexed series. `BTreeMap` keeps dates unique and ordered.
pub type SeriesMap = BTreeMap<NaiveDate, f64>;

/// Which logical column a raw series feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKey {
    IgProxy,
    HyProxy,
    Treasury,
    /// Treasury ETF prices (TLT-like), used by `CorporateQuote::Relative`.
    TreasuryEtf,
    Vix,
}

impl SeriesKey {
    pub fn label(self) -> &'static str {
        match self {
            SeriesKey::IgProxy => "IG proxy",
            SeriesKey::HyProxy => "HY proxy",
            SeriesKey::Treasury => "Treasury",
            SeriesKey::TreasuryEtf => "Treasury ETF",
            SeriesKey::Vix => "VIX",
        }
    }
}

/// How the corporate (IG/HY) series are quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CorporateQuote {
    /// Direct yields, in the configured `YieldUnit`.
    Yield,
    /// ETF price levels; spreads go through the `PriceProxy` transform.
    Price,
    /// ETF price levels measured against a Treasury ETF: the spread is the
    /// rolling mean of `(treasury_etf_return - corporate_return)` in bps.
    Relative,
}

/// Unit of Treasury and direct corporate yield inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum YieldUnit {
    /// `4.25` means 4.25% (FRED `DGS10` convention).
    Percent,
    /// `0.0425` means 4.25%.
    Decimal,
}

impl YieldUnit {
    /// Basis points per one unit of input.
    pub fn bps_per_unit(self) -> f64 {
        match self {
            YieldUnit::Percent => 100.0,
            YieldUnit::Decimal => 10_000.0,
        }
    }

    /// Convert an input value to a decimal rate.
    pub fn to_decimal(self, value: f64) -> f64 {
        match self {
            YieldUnit::Percent => value / 100.0,
            YieldUnit::Decimal => value,
        }
    }

    pub fn to_percent(self, value: f64) -> f64 {
        match self {
            YieldUnit::Percent => value,
            YieldUnit::Decimal => value * 100.0,
        }
    }
}

/// How dates that are missing from some series are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentPolicy {
    /// Keep only dates present in every series. Nothing is fabricated.
    Intersection,
    /// Union of dates; carry the last observation forward up to
    /// `max_fill_gap_days` consecutive missing dates, drop the date beyond that.
    #[value(name = "forward-fill")]
    ForwardFill,
}

/// ETF price → yield approximation.
///
/// With daily simple returns `r_t = P_t / P_{t-1} - 1`:
///
/// `yield_t = base_yield - sensitivity * mean(r_{t-window+1} ..= r_t)`
///
/// Yields are decimal rates. Rows without a full window of returns have no
/// yield estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceProxy {
    pub base_yield: f64,
    pub sensitivity: f64,
    pub window: usize,
}

impl PriceProxy {
    /// Investment-grade defaults (LQD-like duration).
    pub fn investment_grade() -> Self {
        Self {
            base_yield: 0.04,
            sensitivity: 15.0,
            window: 20,
        }
    }

    /// High-yield defaults (HYG-like).
    pub fn high_yield() -> Self {
        Self {
            base_yield: 0.06,
            sensitivity: 20.0,
            window: 20,
        }
    }
}

/// Options recognized by `run_analysis`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// VIX level above which an observation is labeled stress.
    pub stress_threshold: f64,
    pub alignment_policy: AlignmentPolicy,
    /// Longest run of consecutive missing dates that forward-fill may bridge.
    pub max_fill_gap_days: usize,
    /// Minimum number of aligned rows required to proceed.
    pub min_overlap_observations: usize,
    pub yield_unit: YieldUnit,
    pub ig_proxy: PriceProxy,
    pub hy_proxy: PriceProxy,
    /// Window (rows) for rolling spread/VIX correlation.
    pub rolling_window: usize,
    /// Smoothing window (rows) of the relative-performance spread.
    pub relative_window: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            stress_threshold: 30.0,
            alignment_policy: AlignmentPolicy::Intersection,
            max_fill_gap_days: 5,
            min_overlap_observations: 30,
            yield_unit: YieldUnit::Percent,
            ig_proxy: PriceProxy::investment_grade(),
            hy_proxy: PriceProxy::high_yield(),
            rolling_window: 60,
            relative_window: 20,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.stress_threshold.is_finite() {
            return Err(AppError::config("stress threshold must be finite"));
        }
        if self.min_overlap_observations < 3 {
            return Err(AppError::config("min overlap observations must be at least 3"));
        }
        if self.rolling_window < 3 {
            return Err(AppError::config("rolling window must be at least 3"));
        }
        if self.relative_window == 0 {
            return Err(AppError::config("relative window must be > 0"));
        }
        for (name, proxy) in [("IG", &self.ig_proxy), ("HY", &self.hy_proxy)] {
            if proxy.window == 0 {
                return Err(AppError::config(format!("{name} proxy window must be > 0")));
            }
            if !(proxy.base_yield.is_finite() && proxy.sensitivity.is_finite()) {
                return Err(AppError::config(format!("{name} proxy parameters must be finite")));
            }
        }
        Ok(())
    }
}

/// Raw inputs to one analysis run, as delivered by the data sources.
#[derive(Debug, Clone)]
pub struct RawSeriesBundle {
    pub ig_proxy: Option<SeriesMap>,
    pub hy_proxy: Option<SeriesMap>,
    pub treasury: SeriesMap,
    /// Required only for `CorporateQuote::Relative`.
    pub treasury_etf: Option<SeriesMap>,
    pub vix: SeriesMap,
    pub quote: CorporateQuote,
}

impl RawSeriesBundle {
    /// Supplied series in column order (IG, HY, Treasury, Treasury ETF, VIX).
    pub fn columns(&self) -> Vec<(SeriesKey, &SeriesMap)> {
        let mut out = Vec::with_capacity(5);
        if let Some(ig) = &self.ig_proxy {
            out.push((SeriesKey::IgProxy, ig));
        }
        if let Some(hy) = &self.hy_proxy {
            out.push((SeriesKey::HyProxy, hy));
        }
        out.push((SeriesKey::Treasury, &self.treasury));
        if let Some(etf) = &self.treasury_etf {
            out.push((SeriesKey::TreasuryEtf, etf));
        }
        out.push((SeriesKey::Vix, &self.vix));
        out
    }

    /// Spread series this bundle asks the analysis to report on.
    pub fn supplied_kinds(&self) -> Vec<SpreadKind> {
        let mut out = Vec::with_capacity(2);
        if self.ig_proxy.is_some() {
            out.push(SpreadKind::InvestmentGrade);
        }
        if self.hy_proxy.is_some() {
            out.push(SpreadKind::HighYield);
        }
        out
    }
}

/// Which fields of an `Observation` were carried forward rather than observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilledFields {
    pub ig_proxy: bool,
    pub hy_proxy: bool,
    pub treasury: bool,
    pub treasury_etf: bool,
    pub vix: bool,
}

impl FilledFields {
    pub fn mark(&mut self, key: SeriesKey) {
        match key {
            SeriesKey::IgProxy => self.ig_proxy = true,
            SeriesKey::HyProxy => self.hy_proxy = true,
            SeriesKey::Treasury => self.treasury = true,
            SeriesKey::TreasuryEtf => self.treasury_etf = true,
            SeriesKey::Vix => self.vix = true,
        }
    }

    pub fn any(&self) -> bool {
        self.ig_proxy || self.hy_proxy || self.treasury || self.treasury_etf || self.vix
    }
}

/// One aligned trading date.
///
/// Corporate fields are `None` only when that series was not supplied at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub ig_proxy: Option<f64>,
    pub hy_proxy: Option<f64>,
    pub treasury_yield: f64,
    /// Treasury ETF price; `None` when that series was not supplied.
    pub treasury_etf: Option<f64>,
    pub vix_level: f64,
    pub filled: FilledFields,
}

/// What the aligner did to produce the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentReport {
    pub policy: AlignmentPolicy,
    /// Size of the candidate calendar (union of all input dates).
    pub candidate_dates: usize,
    pub filled_cells: usize,
    pub dropped_dates: Vec<NaiveDate>,
}

/// Ordered, date-unique table of observations.
#[derive(Debug, Clone)]
pub struct AlignedSeries {
    rows: Vec<Observation>,
    report: AlignmentReport,
}

impl AlignedSeries {
    /// Build a table, checking that dates are strictly increasing.
    pub fn new(rows: Vec<Observation>, report: AlignmentReport) -> Result<Self, AppError> {
        if let Some(w) = rows.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(AppError::data(format!(
                "aligned dates out of order: {} followed by {}",
                w[0].date, w[1].date
            )));
        }
        Ok(Self { rows, report })
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn report(&self) -> &AlignmentReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }
}

/// Derived spreads for one aligned date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadObservation {
    pub date: NaiveDate,
    pub ig_spread_bps: Option<f64>,
    pub hy_spread_bps: Option<f64>,
    pub treasury_yield_pct: f64,
    pub vix_level: f64,
}

impl SpreadObservation {
    pub fn spread(&self, kind: SpreadKind) -> Option<f64> {
        match kind {
            SpreadKind::InvestmentGrade => self.ig_spread_bps,
            SpreadKind::HighYield => self.hy_spread_bps,
        }
    }
}

/// The two spread series the analysis reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadKind {
    InvestmentGrade,
    HighYield,
}

impl SpreadKind {
    pub const ALL: [SpreadKind; 2] = [SpreadKind::InvestmentGrade, SpreadKind::HighYield];

    pub fn display_name(self) -> &'static str {
        match self {
            SpreadKind::InvestmentGrade => "Investment Grade",
            SpreadKind::HighYield => "High Yield",
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            SpreadKind::InvestmentGrade => "ig",
            SpreadKind::HighYield => "hy",
        }
    }
}

/// Market regime label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    Normal,
    Stress,
}

impl Regime {
    pub fn as_str(self) -> &'static str {
        match self {
            Regime::Normal => "normal",
            Regime::Stress => "stress",
        }
    }
}

/// One named scalar result. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStatistic {
    metric_name: String,
    value: f64,
    sample_size: usize,
}

impl SummaryStatistic {
    pub fn new(metric_name: impl Into<String>, value: f64, sample_size: usize) -> Self {
        Self {
            metric_name: metric_name.into(),
            value,
            sample_size,
        }
    }

    pub fn metric_name(&self) -> &str {
        &self.metric_name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(date: NaiveDate) -> Observation {
        Observation {
            date,
            ig_proxy: Some(5.0),
            hy_proxy: None,
            treasury_yield: 4.0,
            treasury_etf: None,
            vix_level: 20.0,
            filled: FilledFields::default(),
        }
    }

    fn report() -> AlignmentReport {
        AlignmentReport {
            policy: AlignmentPolicy::Intersection,
            candidate_dates: 2,
            filled_cells: 0,
            dropped_dates: Vec::new(),
        }
    }

    #[test]
    fn aligned_series_rejects_duplicate_dates() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let err = AlignedSeries::new(vec![obs(d), obs(d)], report()).unwrap_err();
        assert!(matches!(err, AppError::Data(_)));
    }

    #[test]
    fn aligned_series_accepts_increasing_dates() {
        let d1 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let table = AlignedSeries::new(vec![obs(d1), obs(d2)], report()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.first_date(), Some(d1));
        assert_eq!(table.last_date(), Some(d2));
    }

    #[test]
    fn yield_unit_conversions() {
        assert_eq!(YieldUnit::Percent.bps_per_unit(), 100.0);
        assert!((YieldUnit::Percent.to_decimal(4.25) - 0.0425).abs() < 1e-15);
        assert!((YieldUnit::Decimal.to_percent(0.0425) - 4.25).abs() < 1e-12);
    }

    #[test]
    fn default_config_is_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.stress_threshold, 30.0);
        assert_eq!(config.max_fill_gap_days, 5);
        assert_eq!(config.min_overlap_observations, 30);
    }

    #[test]
    fn bundle_lists_supplied_series() {
        let one = |v: f64| SeriesMap::from([(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), v)]);
        let bundle = RawSeriesBundle {
            ig_proxy: None,
            hy_proxy: Some(one(80.0)),
            treasury: one(4.0),
            treasury_etf: Some(one(90.0)),
            vix: one(20.0),
            quote: CorporateQuote::Relative,
        };
        assert_eq!(bundle.supplied_kinds(), vec![SpreadKind::HighYield]);
        let keys: Vec<SeriesKey> = bundle.columns().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![SeriesKey::HyProxy, SeriesKey::Treasury, SeriesKey::TreasuryEtf, SeriesKey::Vix]
        );
    }

    #[test]
    fn config_rejects_zero_proxy_window() {
        let mut config = AnalysisConfig::default();
        config.hy_proxy.window = 0;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }
}
