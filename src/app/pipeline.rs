//! Shared analysis pipeline used by every front-end command.
//!
//! raw series -> aligned table -> spreads -> regime labels -> statistics
//!
//! `run_analysis` is pure: no I/O, no global state. The commands in `app`
//! only differ in where the raw bundle comes from.

use tracing::info;

use crate::data::{DateWindow, SeriesPlan, Sources, fetch_bundle};
use crate::domain::{AlignedSeries, AnalysisConfig, RawSeriesBundle, Regime, SpreadObservation, SummaryStatistic};
use crate::error::AppError;
use crate::regime::RegimeClassifier;
use crate::stats::AnalysisStatistics;

/// All computed outputs of a single analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub aligned: AlignedSeries,
    pub spreads: Vec<SpreadObservation>,
    pub regimes: Vec<Regime>,
    pub statistics: AnalysisStatistics,
    pub summary: Vec<SummaryStatistic>,
}

/// Execute the full pipeline over an already-fetched bundle.
pub fn run_analysis(bundle: &RawSeriesBundle, config: &AnalysisConfig) -> Result<AnalysisOutput, AppError> {
    config.validate()?;

    // 1) Align on date.
    let aligned = crate::align::align(bundle, config)?;

    // 2) Derive spreads (one row per aligned date).
    let spreads = crate::spread::compute_spreads(&aligned, bundle.quote, config);

    // 3) Label regimes.
    let classifier = RegimeClassifier::new(config.stress_threshold)?;
    let regimes = classifier.classify(&spreads);

    // 4) Aggregate over the series the bundle supplied.
    let statistics = crate::stats::compute_statistics(&spreads, &regimes, &bundle.supplied_kinds(), config)?;
    let summary = statistics.summary_statistics();

    info!(
        rows = aligned.len(),
        threshold = classifier.threshold(),
        stress_days = statistics.stress.stress_count,
        metrics = summary.len(),
        "analysis complete"
    );

    Ok(AnalysisOutput {
        aligned,
        spreads,
        regimes,
        statistics,
        summary,
    })
}

/// Fetch through `sources`, then run the pipeline.
pub fn fetch_and_run(
    plan: &SeriesPlan,
    window: &DateWindow,
    sources: &Sources<'_>,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, AppError> {
    let bundle = fetch_bundle(plan, window, sources)?;
    run_analysis(&bundle, config)
}
