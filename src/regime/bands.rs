//! Spread level bands.
//!
//! A spread is `Tight` at or below its 25th percentile, `Wide` at or above its
//! 75th percentile, and `Normal` strictly in between. Percentiles use linear
//! interpolation between order statistics.

use serde::Serialize;

use crate::math::quantile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpreadBand {
    Tight,
    Normal,
    Wide,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandCounts {
    pub p25: f64,
    pub p75: f64,
    pub tight: usize,
    pub normal: usize,
    pub wide: usize,
    pub total: usize,
}

impl BandCounts {
    pub fn pct(&self, band: SpreadBand) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let n = match band {
            SpreadBand::Tight => self.tight,
            SpreadBand::Normal => self.normal,
            SpreadBand::Wide => self.wide,
        };
        n as f64 / self.total as f64 * 100.0
    }
}

/// Band counts for a spread series; `None` when `values` is empty.
pub fn classify_bands(values: &[f64]) -> Option<BandCounts> {
    let p25 = quantile(values, 0.25)?;
    let p75 = quantile(values, 0.75)?;

    let mut counts = BandCounts {
        p25,
        p75,
        tight: 0,
        normal: 0,
        wide: 0,
        total: values.len(),
    };
    for v in values {
        // Tight wins ties when p25 == p75.
        if *v <= p25 {
            counts.tight += 1;
        } else if *v >= p75 {
            counts.wide += 1;
        } else {
            counts.normal += 1;
        }
    }
    Some(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_split_by_quartiles() {
        let values: Vec<f64> = (1..=9).map(f64::from).collect();
        let counts = classify_bands(&values).unwrap();
        assert!((counts.p25 - 3.0).abs() < 1e-12);
        assert!((counts.p75 - 7.0).abs() < 1e-12);
        assert_eq!((counts.tight, counts.normal, counts.wide), (3, 3, 3));
        assert!((counts.pct(SpreadBand::Wide) - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_series_has_no_bands() {
        assert!(classify_bands(&[]).is_none());
    }
}
