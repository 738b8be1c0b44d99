//! Per-series descriptive profile: level, dispersion, bands and VIX trend.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{SpreadKind, SpreadObservation};
use crate::math::{LinearFit, fit_line, mean, min_max, sample_std};
use crate::regime::{BandCounts, classify_bands};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpreadProfile {
    pub kind: SpreadKind,
    pub n: usize,
    pub mean_bps: f64,
    pub std_dev_bps: Option<f64>,
    pub min_bps: f64,
    pub max_bps: f64,
    pub latest_bps: f64,
    pub latest_date: NaiveDate,
    pub bands: BandCounts,
    /// `spread = intercept + slope * vix`.
    pub vix_trend: Option<LinearFit>,
}

/// Profile of the rows where `kind` is present; `None` if there are none.
pub fn spread_profile(spreads: &[SpreadObservation], kind: SpreadKind) -> Option<SpreadProfile> {
    let rows: Vec<(NaiveDate, f64, f64)> = spreads
        .iter()
        .filter_map(|s| s.spread(kind).map(|v| (s.date, v, s.vix_level)))
        .collect();
    let (latest_date, latest_bps, _) = *rows.last()?;

    let values: Vec<f64> = rows.iter().map(|(_, v, _)| *v).collect();
    let vix: Vec<f64> = rows.iter().map(|(_, _, x)| *x).collect();
    let (min_bps, max_bps) = min_max(&values)?;

    Some(SpreadProfile {
        kind,
        n: values.len(),
        mean_bps: mean(&values)?,
        std_dev_bps: sample_std(&values),
        min_bps,
        max_bps,
        latest_bps,
        latest_date,
        bands: classify_bands(&values)?,
        vix_trend: fit_line(&vix, &values),
    })
}
