//! Regime-conditional spread statistics.

use serde::Serialize;

use crate::domain::{Regime, SpreadKind, SpreadObservation};
use crate::error::AppError;
use crate::math::mean;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    /// `None` when the group is empty.
    pub mean: Option<f64>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegimeMeans {
    pub kind: SpreadKind,
    pub normal: GroupMean,
    pub stress: GroupMean,
    /// Stress mean minus normal mean; `None` if either regime is empty.
    pub risk_premium: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressSummary {
    pub threshold: f64,
    pub stress_count: usize,
    pub normal_count: usize,
    pub total_count: usize,
    pub stress_fraction: f64,
}

/// Count regimes over every labeled observation.
pub fn stress_summary(labels: &[Regime], threshold: f64) -> Result<StressSummary, AppError> {
    if labels.is_empty() {
        return Err(AppError::insufficient("no labeled observations"));
    }
    let stress_count = labels.iter().filter(|r| **r == Regime::Stress).count();
    let total_count = labels.len();
    Ok(StressSummary {
        threshold,
        stress_count,
        normal_count: total_count - stress_count,
        total_count,
        stress_fraction: stress_count as f64 / total_count as f64,
    })
}

/// Mean and count of `values` split by `labels` (normal, stress).
pub fn conditional_means(values: &[f64], labels: &[Regime]) -> Result<(GroupMean, GroupMean), AppError> {
    if values.len() != labels.len() {
        return Err(AppError::data(format!(
            "{} values but {} regime labels",
            values.len(),
            labels.len()
        )));
    }

    let split = |regime: Regime| -> GroupMean {
        let group: Vec<f64> = values
            .iter()
            .zip(labels)
            .filter(|(_, r)| **r == regime)
            .map(|(v, _)| *v)
            .collect();
        GroupMean {
            mean: mean(&group),
            count: group.len(),
        }
    };

    Ok((split(Regime::Normal), split(Regime::Stress)))
}

/// Regime means for one spread series; `Ok(None)` if the series is absent.
pub fn regime_means(
    spreads: &[SpreadObservation],
    labels: &[Regime],
    kind: SpreadKind,
) -> Result<Option<RegimeMeans>, AppError> {
    if spreads.len() != labels.len() {
        return Err(AppError::data(format!(
            "{} spread rows but {} regime labels",
            spreads.len(),
            labels.len()
        )));
    }

    let (values, kept): (Vec<f64>, Vec<Regime>) = spreads
        .iter()
        .zip(labels)
        .filter_map(|(s, r)| s.spread(kind).map(|v| (v, *r)))
        .unzip();
    if values.is_empty() {
        return Ok(None);
    }

    let (normal, stress) = conditional_means(&values, &kept)?;
    let risk_premium = match (stress.mean, normal.mean) {
        (Some(s), Some(n)) => Some(s - n),
        _ => None,
    };

    Ok(Some(RegimeMeans {
        kind,
        normal,
        stress,
        risk_premium,
    }))
}
