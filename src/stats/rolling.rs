//! Rolling spread/VIX correlation.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{SpreadKind, SpreadObservation};
use crate::stats::correlation::coefficient;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingCorrelation {
    pub kind: SpreadKind,
    pub window: usize,
    /// One entry per input row. `None` until the window is full, when it
    /// contains a missing spread, or when either side is constant.
    pub points: Vec<(NaiveDate, Option<f64>)>,
}

impl RollingCorrelation {
    pub fn latest(&self) -> Option<(NaiveDate, f64)> {
        self.points.iter().rev().find_map(|(d, v)| v.map(|v| (*d, v)))
    }

    pub fn range(&self) -> Option<(f64, f64)> {
        let values: Vec<f64> = self.points.iter().filter_map(|(_, v)| *v).collect();
        crate::math::min_max(&values)
    }
}

pub fn rolling_correlation(spreads: &[SpreadObservation], kind: SpreadKind, window: usize) -> RollingCorrelation {
    let points = spreads
        .iter()
        .enumerate()
        .map(|(i, row)| {
            if window < 2 || i + 1 < window {
                return (row.date, None);
            }
            let slice = &spreads[i + 1 - window..=i];
            let x: Option<Vec<f64>> = slice.iter().map(|s| s.spread(kind)).collect();
            let value = x.and_then(|x| {
                let vix: Vec<f64> = slice.iter().map(|s| s.vix_level).collect();
                coefficient(&x, &vix)
            });
            (row.date, value)
        })
        .collect();

    RollingCorrelation { kind, window, points }
}
