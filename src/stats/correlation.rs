//! Pearson correlation with a two-sided significance test.
//!
//! Under the null of zero correlation,
//!
//! `t = r * sqrt((n - 2) / (1 - r^2))`
//!
//! follows a Student-t distribution with `n - 2` degrees of freedom.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::domain::{SpreadKind, SpreadObservation};
use crate::error::AppError;

/// Fewer points than this and the coefficient is not reported.
pub const MIN_CORRELATION_SAMPLE: usize = 3;

/// Conventional star rating for a p-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Significance {
    NotSignificant,
    P05,
    P01,
    P001,
}

impl Significance {
    pub fn from_p_value(p: f64) -> Self {
        if p < 0.001 {
            Significance::P001
        } else if p < 0.01 {
            Significance::P01
        } else if p < 0.05 {
            Significance::P05
        } else {
            Significance::NotSignificant
        }
    }

    pub fn stars(self) -> &'static str {
        match self {
            Significance::NotSignificant => "",
            Significance::P05 => "*",
            Significance::P01 => "**",
            Significance::P001 => "***",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correlation {
    pub kind: SpreadKind,
    pub coefficient: f64,
    pub p_value: f64,
    pub sample_size: usize,
    pub significance: Significance,
}

/// Pearson coefficient, or `None` when either side has no variance.
pub(crate) fn coefficient(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }
    let mx = x[..n].iter().sum::<f64>() / n as f64;
    let my = y[..n].iter().sum::<f64>() / n as f64;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x[..n].iter().zip(&y[..n]) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Pearson correlation coefficient and two-sided p-value.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<(f64, f64), AppError> {
    if x.len() != y.len() {
        return Err(AppError::data(format!(
            "correlation inputs differ in length ({} vs {})",
            x.len(),
            y.len()
        )));
    }
    if x.len() < MIN_CORRELATION_SAMPLE {
        return Err(AppError::insufficient(format!(
            "correlation needs at least {MIN_CORRELATION_SAMPLE} observations, got {}",
            x.len()
        )));
    }
    let r = coefficient(x, y)
        .ok_or_else(|| AppError::insufficient("correlation undefined for a constant series"))?;
    let p = p_value(r, x.len())?;
    Ok((r, p))
}

/// Two-sided p-value for a Pearson coefficient over `n` points.
pub fn p_value(r: f64, n: usize) -> Result<f64, AppError> {
    if n < MIN_CORRELATION_SAMPLE {
        return Err(AppError::insufficient("p-value needs at least 3 observations"));
    }
    if r.abs() >= 1.0 {
        return Ok(0.0);
    }
    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r * r)).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| AppError::insufficient(format!("Student-t distribution error: {e}")))?;
    Ok((2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0))
}

/// Correlate a spread series with VIX over the rows where the spread exists.
///
/// Returns `Ok(None)` if the series was not supplied at all.
pub fn correlate_with_vix(spreads: &[SpreadObservation], kind: SpreadKind) -> Result<Option<Correlation>, AppError> {
    let (x, vix): (Vec<f64>, Vec<f64>) = spreads
        .iter()
        .filter_map(|s| s.spread(kind).map(|v| (v, s.vix_level)))
        .unzip();
    if x.is_empty() {
        return Ok(None);
    }

    let (coefficient, p_value) = pearson(&x, &vix)
        .map_err(|e| AppError::insufficient(format!("{} vs VIX: {e}", kind.display_name())))?;

    Ok(Some(Correlation {
        kind,
        coefficient,
        p_value,
        sample_size: x.len(),
        significance: Significance::from_p_value(p_value),
    }))
}
