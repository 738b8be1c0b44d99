//! Credit spread derivation.
//!
//! `spread_bps = corporate_yield - treasury_yield`, expressed in basis points.
//!
//! When the corporate series are direct yields, the difference is taken in the
//! input unit and scaled by `YieldUnit::bps_per_unit`. When they are ETF prices,
//! each price column first goes through the `PriceProxy` transform (see
//! `domain::PriceProxy`) to get a decimal yield estimate. In relative mode no
//! yield is estimated at all: the spread is the rolling mean of
//! `(treasury_etf_return - corporate_return) * 10_000` over
//! `AnalysisConfig::relative_window` rows.
//!
//! One `SpreadObservation` is produced per aligned row. A spread is `None` when
//! its input is absent (series not supplied, or proxy window not yet full);
//! nothing is imputed.

use tracing::debug;

use crate::domain::{AlignedSeries, AnalysisConfig, CorporateQuote, Observation, PriceProxy, SpreadObservation, YieldUnit};

const BPS_PER_DECIMAL: f64 = 10_000.0;

pub fn compute_spreads(aligned: &AlignedSeries, quote: CorporateQuote, config: &AnalysisConfig) -> Vec<SpreadObservation> {
    if aligned.is_empty() {
        return Vec::new();
    }
    let rows = aligned.rows();
    let unit = config.yield_unit;

    let (ig, hy) = match quote {
        CorporateQuote::Yield => (
            direct_spreads(rows, |o| o.ig_proxy, unit),
            direct_spreads(rows, |o| o.hy_proxy, unit),
        ),
        CorporateQuote::Price => (
            proxy_spreads(rows, |o| o.ig_proxy, &config.ig_proxy, unit),
            proxy_spreads(rows, |o| o.hy_proxy, &config.hy_proxy, unit),
        ),
        CorporateQuote::Relative => (
            relative_spreads(rows, |o| o.ig_proxy, config.relative_window),
            relative_spreads(rows, |o| o.hy_proxy, config.relative_window),
        ),
    };

    let out: Vec<SpreadObservation> = rows
        .iter()
        .zip(ig.into_iter().zip(hy))
        .map(|(o, (ig, hy))| SpreadObservation {
            date: o.date,
            ig_spread_bps: ig,
            hy_spread_bps: hy,
            treasury_yield_pct: unit.to_percent(o.treasury_yield),
            vix_level: o.vix_level,
        })
        .collect();

    debug!(
        rows = out.len(),
        ig = out.iter().filter(|s| s.ig_spread_bps.is_some()).count(),
        hy = out.iter().filter(|s| s.hy_spread_bps.is_some()).count(),
        ?quote,
        "computed spreads"
    );
    out
}

fn direct_spreads(rows: &[Observation], column: impl Fn(&Observation) -> Option<f64>, unit: YieldUnit) -> Vec<Option<f64>> {
    rows.iter()
        .map(|o| column(o).map(|y| (y - o.treasury_yield) * unit.bps_per_unit()))
        .collect()
}

fn proxy_spreads(
    rows: &[Observation],
    column: impl Fn(&Observation) -> Option<f64>,
    proxy: &PriceProxy,
    unit: YieldUnit,
) -> Vec<Option<f64>> {
    let prices: Vec<Option<f64>> = rows.iter().map(&column).collect();
    price_proxy_yields(&prices, proxy)
        .into_iter()
        .zip(rows)
        .map(|(y, o)| y.map(|y| (y - unit.to_decimal(o.treasury_yield)) * BPS_PER_DECIMAL))
        .collect()
}

/// Rolling mean of the Treasury ETF's outperformance over `column`, in bps.
fn relative_spreads(rows: &[Observation], column: impl Fn(&Observation) -> Option<f64>, window: usize) -> Vec<Option<f64>> {
    let corporate: Vec<Option<f64>> = rows.iter().map(&column).collect();
    let treasury: Vec<Option<f64>> = rows.iter().map(|o| o.treasury_etf).collect();

    let excess: Vec<Option<f64>> = simple_returns(&treasury)
        .into_iter()
        .zip(simple_returns(&corporate))
        .map(|(t, c)| Some((t? - c?) * BPS_PER_DECIMAL))
        .collect();
    trailing_means(&excess, window)
}

/// Decimal yield estimates from a price column (same length as `prices`).
pub fn price_proxy_yields(prices: &[Option<f64>], proxy: &PriceProxy) -> Vec<Option<f64>> {
    trailing_means(&simple_returns(prices), proxy.window)
        .into_iter()
        .map(|mean| mean.map(|m| proxy.base_yield - proxy.sensitivity * m))
        .collect()
}

fn simple_returns(prices: &[Option<f64>]) -> Vec<Option<f64>> {
    (0..prices.len())
        .map(|i| {
            if i == 0 {
                return None;
            }
            match (prices[i - 1], prices[i]) {
                (Some(prev), Some(curr)) if prev != 0.0 => Some(curr / prev - 1.0),
                _ => None,
            }
        })
        .collect()
}

/// Mean of the `window` values ending at each row. Row 0 never has a return,
/// so the first complete window ends at row `window`.
fn trailing_means(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if window == 0 || i < window {
                return None;
            }
            let sum: Option<f64> = values[i + 1 - window..=i].iter().copied().sum();
            sum.map(|s| s / window as f64)
        })
        .collect()
}
