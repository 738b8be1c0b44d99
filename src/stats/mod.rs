//! Statistics engine.
//!
//! Computes, over the full aligned sample:
//!
//! - Pearson correlation of each spread series with VIX (+ p-value, stars)
//! - regime-conditional means, risk premium and stress fraction
//! - a descriptive profile per series (level, dispersion, bands, VIX trend)
//! - rolling correlation with VIX
//!
//! Results are snapshots; nothing here updates incrementally.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::domain::{AnalysisConfig, Regime, SpreadKind, SpreadObservation, SummaryStatistic};
use crate::error::AppError;

pub mod conditional;
pub mod correlation;
pub mod profile;
pub mod rolling;

pub use conditional::{GroupMean, RegimeMeans, StressSummary, conditional_means, regime_means, stress_summary};
pub use correlation::{Correlation, Significance, correlate_with_vix, p_value, pearson};
pub use profile::{SpreadProfile, spread_profile};
pub use rolling::{RollingCorrelation, rolling_correlation};

/// Everything computed for one spread series.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesStatistics {
    pub kind: SpreadKind,
    pub profile: SpreadProfile,
    pub correlation: Correlation,
    pub regime_means: RegimeMeans,
    pub rolling: RollingCorrelation,
}

/// The full result set consumed by reports and exports.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisStatistics {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub observations: usize,
    pub latest_treasury_pct: f64,
    pub latest_vix: f64,
    pub stress: StressSummary,
    pub series: Vec<SeriesStatistics>,
    /// Mean HY spread minus mean IG spread, when both are present.
    pub hy_ig_premium_bps: Option<f64>,
}

impl AnalysisStatistics {
    pub fn series(&self, kind: SpreadKind) -> Option<&SeriesStatistics> {
        self.series.iter().find(|s| s.kind == kind)
    }

    /// Flatten into named scalars. Absent quantities are omitted, never zeroed.
    pub fn summary_statistics(&self) -> Vec<SummaryStatistic> {
        let total = self.stress.total_count;
        let mut out = vec![
            SummaryStatistic::new("observations", total as f64, total),
            SummaryStatistic::new("stress_count", self.stress.stress_count as f64, total),
            SummaryStatistic::new("normal_count", self.stress.normal_count as f64, total),
            SummaryStatistic::new("stress_fraction", self.stress.stress_fraction, total),
        ];

        for s in &self.series {
            let name = |metric: &str| format!("{}_{metric}", s.kind.short_name());
            let p = &s.profile;
            out.push(SummaryStatistic::new(name("mean_bps"), p.mean_bps, p.n));
            if let Some(std) = p.std_dev_bps {
                out.push(SummaryStatistic::new(name("std_bps"), std, p.n));
            }
            out.push(SummaryStatistic::new(name("latest_bps"), p.latest_bps, 1));

            let c = &s.correlation;
            out.push(SummaryStatistic::new(name("vix_correlation"), c.coefficient, c.sample_size));
            out.push(SummaryStatistic::new(name("vix_p_value"), c.p_value, c.sample_size));

            let m = &s.regime_means;
            if let Some(v) = m.normal.mean {
                out.push(SummaryStatistic::new(name("normal_mean_bps"), v, m.normal.count));
            }
            if let Some(v) = m.stress.mean {
                out.push(SummaryStatistic::new(name("stress_mean_bps"), v, m.stress.count));
            }
            if let Some(v) = m.risk_premium {
                out.push(SummaryStatistic::new(
                    name("risk_premium_bps"),
                    v,
                    m.normal.count + m.stress.count,
                ));
            }
            if let Some(trend) = p.vix_trend {
                out.push(SummaryStatistic::new(name("vix_slope_bps"), trend.slope, trend.n));
            }
        }

        if let Some(premium) = self.hy_ig_premium_bps {
            out.push(SummaryStatistic::new("hy_ig_premium_bps", premium, total));
        }
        out
    }
}

/// Statistics for every series in `kinds`.
///
/// Each requested series must have at least one spread value; a supplied series
/// whose spreads are all undefined (for example a proxy window longer than the
/// sample) is `InsufficientData`, not silently dropped.
pub fn compute_statistics(
    spreads: &[SpreadObservation],
    labels: &[Regime],
    kinds: &[SpreadKind],
    config: &AnalysisConfig,
) -> Result<AnalysisStatistics, AppError> {
    if spreads.len() != labels.len() {
        return Err(AppError::data(format!(
            "{} spread rows but {} regime labels",
            spreads.len(),
            labels.len()
        )));
    }
    let (first, last) = match (spreads.first(), spreads.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return Err(AppError::insufficient("no spread observations")),
    };

    let stress = stress_summary(labels, config.stress_threshold)?;

    let mut series = Vec::new();
    for kind in SpreadKind::ALL.into_iter().filter(|k| kinds.contains(k)) {
        let profile = spread_profile(spreads, kind).ok_or_else(|| {
            AppError::insufficient(format!("{} series was supplied but yields no spreads", kind.display_name()))
        })?;
        let correlation = correlate_with_vix(spreads, kind)?
            .ok_or_else(|| AppError::insufficient(format!("no {} spreads", kind.display_name())))?;
        let regime_means = regime_means(spreads, labels, kind)?
            .ok_or_else(|| AppError::insufficient(format!("no {} spreads", kind.display_name())))?;
        let rolling = rolling_correlation(spreads, kind, config.rolling_window);

        info!(
            series = kind.short_name(),
            n = profile.n,
            correlation = correlation.coefficient,
            p_value = correlation.p_value,
            risk_premium = ?regime_means.risk_premium,
            "series statistics"
        );

        series.push(SeriesStatistics {
            kind,
            profile,
            correlation,
            regime_means,
            rolling,
        });
    }

    if series.is_empty() {
        return Err(AppError::insufficient("no spread series to analyze"));
    }

    let mean_of = |kind: SpreadKind| series.iter().find(|s| s.kind == kind).map(|s| s.profile.mean_bps);
    let hy_ig_premium_bps = match (mean_of(SpreadKind::HighYield), mean_of(SpreadKind::InvestmentGrade)) {
        (Some(hy), Some(ig)) => Some(hy - ig),
        _ => None,
    };

    Ok(AnalysisStatistics {
        period_start: first.date,
        period_end: last.date,
        observations: spreads.len(),
        latest_treasury_pct: last.treasury_yield_pct,
        latest_vix: last.vix_level,
        stress,
        series,
        hy_ig_premium_bps,
    })
}
