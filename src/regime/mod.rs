//! Market regime labeling.
//!
//! - `RegimeClassifier`: stress vs normal from the VIX level
//! - `bands`: tight / normal / wide spread levels by percentile

use serde::{Deserialize, Serialize};

use crate::domain::{Regime, SpreadObservation};
use crate::error::AppError;

pub mod bands;

pub use bands::{BandCounts, SpreadBand, classify_bands};

pub const DEFAULT_STRESS_THRESHOLD: f64 = 30.0;

/// Labels an observation `Stress` iff `vix_level > threshold`.
///
/// The inequality is strict: a VIX print exactly at the threshold is `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeClassifier {
    threshold: f64,
}

impl Default for RegimeClassifier {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_STRESS_THRESHOLD,
        }
    }
}

impl RegimeClassifier {
    pub fn new(threshold: f64) -> Result<Self, AppError> {
        if !threshold.is_finite() {
            return Err(AppError::config("stress threshold must be finite"));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn label(&self, vix_level: f64) -> Regime {
        if vix_level > self.threshold {
            Regime::Stress
        } else {
            Regime::Normal
        }
    }

    /// One label per observation, in input order.
    pub fn classify(&self, spreads: &[SpreadObservation]) -> Vec<Regime> {
        spreads.iter().map(|s| self.label(s.vix_level)).collect()
    }
}
