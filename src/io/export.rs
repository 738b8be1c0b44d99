//! Export results to CSV/JSON.
//!
//! The exports are meant to be easy to consume in spreadsheets, plotting
//! scripts or downstream jobs.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::domain::{AnalysisConfig, Regime, SpreadObservation, SummaryStatistic};
use crate::error::AppError;
use crate::stats::AnalysisStatistics;

#[derive(Debug, Serialize)]
struct SpreadRow {
    date: String,
    ig_spread_bps: Option<f64>,
    hy_spread_bps: Option<f64>,
    treasury_yield_pct: f64,
    vix: f64,
    regime: &'static str,
}

/// Full JSON payload: the config used plus every computed statistic.
#[derive(Debug, Serialize)]
struct SummaryDocument<'a> {
    config: &'a AnalysisConfig,
    summary: &'a [SummaryStatistic],
    statistics: &'a AnalysisStatistics,
}

/// Write per-date spreads and regime labels to a CSV file.
pub fn write_spreads_csv(path: &Path, spreads: &[SpreadObservation], regimes: &[Regime]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_spreads(file, spreads, regimes)?;
    info!(path = %path.display(), rows = spreads.len(), "wrote spreads CSV");
    Ok(())
}

pub fn write_spreads<W: Write>(writer: W, spreads: &[SpreadObservation], regimes: &[Regime]) -> Result<(), AppError> {
    if spreads.len() != regimes.len() {
        return Err(AppError::data(format!(
            "{} spread rows but {} regime labels",
            spreads.len(),
            regimes.len()
        )));
    }

    let mut out = csv::Writer::from_writer(writer);
    for (s, regime) in spreads.iter().zip(regimes) {
        out.serialize(SpreadRow {
            date: s.date.to_string(),
            ig_spread_bps: s.ig_spread_bps,
            hy_spread_bps: s.hy_spread_bps,
            treasury_yield_pct: s.treasury_yield_pct,
            vix: s.vix_level,
            regime: regime.as_str(),
        })
        .map_err(|e| AppError::io(format!("Failed to write export CSV row: {e}")))?;
    }
    out.flush()
        .map_err(|e| AppError::io(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write statistics and the config that produced them as pretty JSON.
pub fn write_summary_json(
    path: &Path,
    statistics: &AnalysisStatistics,
    summary: &[SummaryStatistic],
    config: &AnalysisConfig,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create summary JSON '{}': {e}", path.display())))?;
    write_summary(file, statistics, summary, config)?;
    info!(path = %path.display(), metrics = summary.len(), "wrote summary JSON");
    Ok(())
}

pub fn write_summary<W: Write>(
    writer: W,
    statistics: &AnalysisStatistics,
    summary: &[SummaryStatistic],
    config: &AnalysisConfig,
) -> Result<(), AppError> {
    let doc = SummaryDocument {
        config,
        summary,
        statistics,
    };
    serde_json::to_writer_pretty(writer, &doc)
        .map_err(|e| AppError::io(format!("Failed to write summary JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    use crate::domain::SpreadKind;
    use crate::regime::RegimeClassifier;
    use crate::stats::compute_statistics;

    fn spreads() -> Vec<SpreadObservation> {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        (0..40)
            .map(|i| {
                let vix = if i % 5 == 0 { 33.0 } else { 15.0 + (i % 6) as f64 };
                SpreadObservation {
                    date: start + Duration::days(i),
                    ig_spread_bps: (i != 1).then_some(90.0 + vix),
                    hy_spread_bps: Some(310.0 + 8.0 * vix),
                    treasury_yield_pct: 4.1,
                    vix_level: vix,
                }
            })
            .collect()
    }

    #[test]
    fn spreads_csv_has_header_and_blank_missing_cells() {
        let data = spreads();
        let regimes = RegimeClassifier::default().classify(&data);
        let mut buf = Vec::new();
        write_spreads(&mut buf, &data, &regimes).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 41);
        assert_eq!(lines[0], "date,ig_spread_bps,hy_spread_bps,treasury_yield_pct,vix,regime");
        assert!(lines[1].starts_with("2024-03-01,123.0,574.0,4.1,33.0,stress"));
        assert!(lines[2].starts_with("2024-03-02,,"));
        assert!(lines[2].ends_with(",normal"));
    }

    #[test]
    fn mismatched_labels_are_rejected() {
        let data = spreads();
        let err = write_spreads(Vec::new(), &data, &[]).unwrap_err();
        assert!(matches!(err, AppError::Data(_)));
    }

    #[test]
    fn summary_json_contains_config_and_metrics() {
        let data = spreads();
        let regimes = RegimeClassifier::default().classify(&data);
        let config = AnalysisConfig::default();
        let stats = compute_statistics(&data, &regimes, &SpreadKind::ALL, &config).unwrap();
        let summary = stats.summary_statistics();

        let mut buf = Vec::new();
        write_summary(&mut buf, &stats, &summary, &config).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(json["config"]["stress_threshold"], 30.0);
        assert_eq!(json["statistics"]["stress"]["stress_count"], 8);
        let names: Vec<&str> = json["summary"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|s| s["metric_name"].as_str())
            .collect();
        assert!(names.contains(&"hy_vix_correlation"));
        assert!(names.contains(&"ig_risk_premium_bps"));
    }
}
