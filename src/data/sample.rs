//! Synthetic market generator for offline runs.
//!
//! Produces a business-day calendar of VIX, 10y Treasury, IG/HY yields and
//! ETF prices (LQD, HYG and the long Treasury ETF TLT) whose dynamics loosely resemble 2020-era credit markets:
//!
//! - VIX follows a mean-reverting log process with occasional upward jumps
//! - Treasury yields follow a bounded random walk
//! - spreads load linearly on VIX plus idiosyncratic noise
//! - ETF prices move by `-duration × Δyield` plus carry
//!
//! Each series independently loses a small fraction of days so alignment has
//! real gaps to resolve. Output is fully determined by the seed.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Weekday};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::data::{DataSource, DataUnavailable, DateWindow};
use crate::domain::SeriesMap;
use crate::error::AppError;

pub const IG_PRICE_ID: &str = "LQD";
pub const HY_PRICE_ID: &str = "HYG";
pub const IG_YIELD_ID: &str = "IG_YIELD";
pub const HY_YIELD_ID: &str = "HY_YIELD";
pub const TREASURY_ID: &str = "DGS10";
pub const TREASURY_ETF_ID: &str = "TLT";
pub const VIX_ID: &str = "^VIX";

const VIX_LONG_RUN: f64 = 18.0;
const VIX_KAPPA: f64 = 0.05;
const VIX_SIGMA: f64 = 0.07;
const VIX_JUMP_PROB: f64 = 0.01;
const VIX_JUMP: f64 = 0.6;

const TSY_START_PCT: f64 = 1.8;
const TSY_STEP_PCT: f64 = 0.04;

// Spread = base + beta * (VIX - long run) + noise, floored.
const IG_BASE_BPS: f64 = 90.0;
const IG_BETA: f64 = 5.0;
const IG_NOISE_BPS: f64 = 6.0;
const IG_FLOOR_BPS: f64 = 40.0;
const HY_BASE_BPS: f64 = 350.0;
const HY_BETA: f64 = 18.0;
const HY_NOISE_BPS: f64 = 20.0;
const HY_FLOOR_BPS: f64 = 200.0;

const IG_DURATION: f64 = 8.5;
const HY_DURATION: f64 = 3.8;
const TREASURY_ETF_DURATION: f64 = 17.0;
const TRADING_DAYS: f64 = 252.0;

#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub start: NaiveDate,
    /// Number of business days to generate.
    pub days: usize,
    pub seed: u64,
    /// Per-series probability that a given day is missing.
    pub missing_prob: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2020, 1, 2).unwrap_or_default(),
            days: 1400,
            seed: 42,
            missing_prob: 0.02,
        }
    }
}

/// A generated market, served through the `DataSource` contract.
#[derive(Debug, Clone)]
pub struct SyntheticMarket {
    series: HashMap<&'static str, SeriesMap>,
}

impl SyntheticMarket {
    pub fn generate(config: &SyntheticConfig) -> Result<Self, AppError> {
        if config.days == 0 {
            return Err(AppError::config("synthetic day count must be > 0"));
        }
        if !(0.0..1.0).contains(&config.missing_prob) {
            return Err(AppError::config("missing probability must be in [0, 1)"));
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| AppError::config(format!("Noise distribution error: {e}")))?;

        let dates = business_days(config.start, config.days);
        let mut columns: HashMap<&'static str, Vec<f64>> = HashMap::new();

        let mut log_vix = VIX_LONG_RUN.ln();
        let mut tsy = TSY_START_PCT;
        let mut ig_price = 120.0;
        let mut hy_price = 85.0;
        let mut tlt_price = 140.0;
        let mut prev_tsy: Option<f64> = None;
        let mut prev_ig_yield: Option<f64> = None;
        let mut prev_hy_yield: Option<f64> = None;

        for _ in &dates {
            let jump = if rng.r#gen::<f64>() < VIX_JUMP_PROB { VIX_JUMP } else { 0.0 };
            log_vix += VIX_KAPPA * (VIX_LONG_RUN.ln() - log_vix) + VIX_SIGMA * normal.sample(&mut rng) + jump;
            let vix = (log_vix.exp() * 100.0).round() / 100.0;

            tsy = (tsy + TSY_STEP_PCT * normal.sample(&mut rng)).clamp(0.5, 6.0);

            let ig_bps = (IG_BASE_BPS + IG_BETA * (vix - VIX_LONG_RUN) + IG_NOISE_BPS * normal.sample(&mut rng))
                .max(IG_FLOOR_BPS);
            let hy_bps = (HY_BASE_BPS + HY_BETA * (vix - VIX_LONG_RUN) + HY_NOISE_BPS * normal.sample(&mut rng))
                .max(HY_FLOOR_BPS);
            let ig_yield = tsy + ig_bps / 100.0;
            let hy_yield = tsy + hy_bps / 100.0;

            ig_price = next_price(ig_price, prev_ig_yield, ig_yield, IG_DURATION);
            hy_price = next_price(hy_price, prev_hy_yield, hy_yield, HY_DURATION);
            tlt_price = next_price(tlt_price, prev_tsy, tsy, TREASURY_ETF_DURATION);
            prev_tsy = Some(tsy);
            prev_ig_yield = Some(ig_yield);
            prev_hy_yield = Some(hy_yield);

            columns.entry(VIX_ID).or_default().push(vix);
            columns.entry(TREASURY_ID).or_default().push(tsy);
            columns.entry(IG_YIELD_ID).or_default().push(ig_yield);
            columns.entry(HY_YIELD_ID).or_default().push(hy_yield);
            columns.entry(IG_PRICE_ID).or_default().push(ig_price);
            columns.entry(HY_PRICE_ID).or_default().push(hy_price);
            columns.entry(TREASURY_ETF_ID).or_default().push(tlt_price);
        }

        // Deterministic id order so the RNG stream is reproducible.
        let mut series = HashMap::new();
        for id in [
            VIX_ID,
            TREASURY_ID,
            IG_YIELD_ID,
            HY_YIELD_ID,
            IG_PRICE_ID,
            HY_PRICE_ID,
            TREASURY_ETF_ID,
        ] {
            let values = columns.remove(id).unwrap_or_default();
            let mut map = SeriesMap::new();
            for (date, value) in dates.iter().zip(values) {
                if rng.r#gen::<f64>() >= config.missing_prob {
                    map.insert(*date, value);
                }
            }
            series.insert(id, map);
        }

        Ok(Self { series })
    }

    #[cfg(test)]
    pub(crate) fn series(&self, id: &str) -> Option<&SeriesMap> {
        self.series.get(id)
    }
}

impl DataSource for SyntheticMarket {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch_series(&self, series_id: &str, window: &DateWindow) -> Result<SeriesMap, DataUnavailable> {
        let series = self
            .series
            .get(series_id)
            .ok_or_else(|| DataUnavailable::new(series_id, "not produced by the synthetic market"))?;
        Ok(series
            .iter()
            .filter(|(d, _)| window.contains(**d))
            .map(|(d, v)| (*d, *v))
            .collect())
    }
}

/// Price update from a yield change (percent) plus one day of carry.
fn next_price(price: f64, prev_yield_pct: Option<f64>, yield_pct: f64, duration: f64) -> f64 {
    let Some(prev) = prev_yield_pct else {
        return price;
    };
    let dy = (yield_pct - prev) / 100.0;
    let carry = yield_pct / 100.0 / TRADING_DAYS;
    (price * (1.0 - duration * dy + carry)).max(1.0)
}

fn business_days(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(n);
    let mut d = start;
    while out.len() < n {
        if !matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
            out.push(d);
        }
        match d.succ_opt() {
            Some(next) => d = next,
            None => break,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> SyntheticConfig {
        SyntheticConfig {
            days: 300,
            ..SyntheticConfig::default()
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let a = SyntheticMarket::generate(&small()).unwrap();
        let b = SyntheticMarket::generate(&small()).unwrap();
        assert_eq!(a.series(VIX_ID), b.series(VIX_ID));
        assert_eq!(a.series(HY_PRICE_ID), b.series(HY_PRICE_ID));
    }

    #[test]
    fn business_days_skip_weekends() {
        // 2024-01-05 is a Friday.
        let days = business_days(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(), 2);
        assert_eq!(days[1], NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
    }

    #[test]
    fn series_have_gaps_but_mostly_complete() {
        let market = SyntheticMarket::generate(&small()).unwrap();
        for id in [VIX_ID, TREASURY_ID, IG_PRICE_ID, HY_YIELD_ID, TREASURY_ETF_ID] {
            let n = market.series(id).unwrap().len();
            assert!(n > 250 && n <= 300, "{id}: {n}");
        }
    }

    #[test]
    fn values_are_in_plausible_ranges() {
        let market = SyntheticMarket::generate(&small()).unwrap();
        assert!(market.series(VIX_ID).unwrap().values().all(|v| *v > 3.0 && *v < 300.0));
        assert!(market.series(TREASURY_ID).unwrap().values().all(|v| (0.5..=6.0).contains(v)));
        assert!(market.series(IG_PRICE_ID).unwrap().values().all(|v| *v >= 1.0));
        assert!(market.series(TREASURY_ETF_ID).unwrap().values().all(|v| *v >= 1.0));
    }

    #[test]
    fn unknown_series_is_unavailable() {
        let market = SyntheticMarket::generate(&small()).unwrap();
        let window = DateWindow::new(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), None).unwrap();
        assert!(market.fetch_series("SPY", &window).is_err());
    }

    #[test]
    fn zero_days_is_rejected() {
        let config = SyntheticConfig {
            days: 0,
            ..SyntheticConfig::default()
        };
        assert!(SyntheticMarket::generate(&config).is_err());
    }
}
