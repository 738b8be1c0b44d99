//! Date alignment of independently sourced series.
//!
//! Sources disagree about which days exist (exchange holidays, FRED `.` rows,
//! late prints). This module turns N `SeriesMap`s into one table with exactly
//! one row per date, following an explicit `AlignmentPolicy`:
//!
//! - `Intersection`: a date survives only if every series observed it.
//! - `ForwardFill`: the candidate calendar is the union of all dates. A series
//!   that is missing on a date repeats its last observation, as long as it has
//!   been missing for at most `max_fill_gap_days` consecutive candidate dates.
//!   Past that bound, or before the series' first observation, the date is
//!   dropped. Filled cells are flagged on the row.
//!
//! Every dropped date is listed in the `AlignmentReport`.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::domain::{
    AlignedSeries, AlignmentPolicy, AlignmentReport, AnalysisConfig, CorporateQuote, FilledFields, Observation,
    RawSeriesBundle, SeriesKey, SeriesMap,
};
use crate::error::AppError;

/// One surviving date with a value for every input column.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow {
    pub date: NaiveDate,
    pub values: Vec<f64>,
    /// `filled[i]` is true when `values[i]` was carried forward.
    pub filled: Vec<bool>,
}

#[derive(Debug, Clone)]
pub struct AlignedColumns {
    pub rows: Vec<AlignedRow>,
    pub candidate_dates: usize,
    pub dropped_dates: Vec<NaiveDate>,
}

impl AlignedColumns {
    pub fn filled_cells(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.filled.iter().filter(|f| **f).count())
            .sum()
    }
}

/// Align any number of series under `policy`.
pub fn align_columns(series: &[&SeriesMap], policy: AlignmentPolicy, max_fill_gap_days: usize) -> AlignedColumns {
    let calendar: BTreeSet<NaiveDate> = series.iter().flat_map(|s| s.keys().copied()).collect();
    let candidate_dates = calendar.len();

    let mut rows = Vec::with_capacity(candidate_dates);
    let mut dropped_dates = Vec::new();

    match policy {
        AlignmentPolicy::Intersection => {
            for date in calendar {
                let values: Option<Vec<f64>> = series.iter().map(|s| s.get(&date).copied()).collect();
                match values {
                    Some(values) => rows.push(AlignedRow {
                        date,
                        filled: vec![false; values.len()],
                        values,
                    }),
                    None => dropped_dates.push(date),
                }
            }
        }
        AlignmentPolicy::ForwardFill => {
            let mut last: Vec<Option<f64>> = vec![None; series.len()];
            let mut missing_run: Vec<usize> = vec![0; series.len()];

            for date in calendar {
                let mut values = Vec::with_capacity(series.len());
                let mut filled = Vec::with_capacity(series.len());
                let mut complete = true;

                for (i, s) in series.iter().enumerate() {
                    if let Some(v) = s.get(&date) {
                        last[i] = Some(*v);
                        missing_run[i] = 0;
                        values.push(*v);
                        filled.push(false);
                        continue;
                    }

                    // The run keeps counting even across dropped dates.
                    missing_run[i] += 1;
                    match last[i] {
                        Some(prev) if missing_run[i] <= max_fill_gap_days => {
                            values.push(prev);
                            filled.push(true);
                        }
                        _ => complete = false,
                    }
                }

                if complete {
                    rows.push(AlignedRow { date, values, filled });
                } else {
                    dropped_dates.push(date);
                }
            }
        }
    }

    AlignedColumns {
        rows,
        candidate_dates,
        dropped_dates,
    }
}

/// Align a raw bundle into the analysis table.
///
/// Fails with `AppError::Alignment` when fewer than
/// `config.min_overlap_observations` rows remain.
pub fn align(bundle: &RawSeriesBundle, config: &AnalysisConfig) -> Result<AlignedSeries, AppError> {
    if bundle.ig_proxy.is_none() && bundle.hy_proxy.is_none() {
        return Err(AppError::data("at least one corporate series (IG or HY) is required"));
    }
    if bundle.quote == CorporateQuote::Relative && bundle.treasury_etf.is_none() {
        return Err(AppError::data("relative spreads need a Treasury ETF price series"));
    }

    let columns = bundle.columns();
    let keys: Vec<SeriesKey> = columns.iter().map(|(k, _)| *k).collect();
    let maps: Vec<&SeriesMap> = columns.iter().map(|(_, m)| *m).collect();

    for (key, map) in &columns {
        debug!(series = key.label(), observations = map.len(), "alignment input");
    }

    let aligned = align_columns(&maps, config.alignment_policy, config.max_fill_gap_days);
    let filled_cells = aligned.filled_cells();

    if aligned.rows.len() < config.min_overlap_observations {
        return Err(AppError::Alignment {
            observations: aligned.rows.len(),
            required: config.min_overlap_observations,
        });
    }

    let rows = aligned
        .rows
        .into_iter()
        .map(|row| to_observation(&keys, row))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        policy = ?config.alignment_policy,
        candidates = aligned.candidate_dates,
        kept = rows.len(),
        dropped = aligned.dropped_dates.len(),
        filled = filled_cells,
        "aligned series"
    );

    let report = AlignmentReport {
        policy: config.alignment_policy,
        candidate_dates: aligned.candidate_dates,
        filled_cells,
        dropped_dates: aligned.dropped_dates,
    };

    AlignedSeries::new(rows, report)
}

fn to_observation(keys: &[SeriesKey], row: AlignedRow) -> Result<Observation, AppError> {
    let mut ig_proxy = None;
    let mut hy_proxy = None;
    let mut treasury = None;
    let mut treasury_etf = None;
    let mut vix = None;
    let mut filled = FilledFields::default();

    for ((key, value), was_filled) in keys.iter().zip(&row.values).zip(&row.filled) {
        match key {
            SeriesKey::IgProxy => ig_proxy = Some(*value),
            SeriesKey::HyProxy => hy_proxy = Some(*value),
            SeriesKey::Treasury => treasury = Some(*value),
            SeriesKey::TreasuryEtf => treasury_etf = Some(*value),
            SeriesKey::Vix => vix = Some(*value),
        }
        if *was_filled {
            filled.mark(*key);
        }
    }

    let missing = |key: SeriesKey| AppError::data(format!("{} column missing on {}", key.label(), row.date));
    Ok(Observation {
        date: row.date,
        ig_proxy,
        hy_proxy,
        treasury_yield: treasury.ok_or_else(|| missing(SeriesKey::Treasury))?,
        treasury_etf,
        vix_level: vix.ok_or_else(|| missing(SeriesKey::Vix))?,
        filled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day(i: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(i)
    }

    fn series(days: impl IntoIterator<Item = i64>, value: f64) -> SeriesMap {
        days.into_iter().map(|i| (day(i), value + i as f64)).collect()
    }

    fn config(policy: AlignmentPolicy, min_overlap: usize) -> AnalysisConfig {
        AnalysisConfig {
            alignment_policy: policy,
            min_overlap_observations: min_overlap,
            ..AnalysisConfig::default()
        }
    }

    fn bundle(ig: SeriesMap, treasury: SeriesMap, vix: SeriesMap) -> RawSeriesBundle {
        RawSeriesBundle {
            ig_proxy: Some(ig),
            hy_proxy: None,
            treasury,
            treasury_etf: None,
            vix,
            quote: CorporateQuote::Yield,
        }
    }

    #[test]
    fn intersection_keeps_common_dates_only() {
        let a = series(0..50, 100.0);
        let b = series(10..60, 200.0);
        let out = align_columns(&[&a, &b], AlignmentPolicy::Intersection, 5);

        assert_eq!(out.rows.len(), 40);
        assert_eq!(out.candidate_dates, 60);
        assert_eq!(out.dropped_dates.len(), 20);
        assert!(out.rows.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(out.filled_cells(), 0);
        assert_eq!(out.rows[0].date, day(10));
        assert_eq!(out.rows[0].values, vec![110.0, 210.0]);
    }

    #[test]
    fn forward_fill_bridges_short_gaps() {
        let a = series(0..20, 0.0);
        // b misses days 5, 6, 7.
        let b = series((0..20).filter(|i| !(5..8).contains(i)), 100.0);
        let out = align_columns(&[&a, &b], AlignmentPolicy::ForwardFill, 5);

        assert_eq!(out.rows.len(), 20);
        assert!(out.dropped_dates.is_empty());
        assert_eq!(out.filled_cells(), 3);
        let row7 = out.rows.iter().find(|r| r.date == day(7)).unwrap();
        assert_eq!(row7.values[1], 104.0);
        assert_eq!(row7.filled, vec![false, true]);
    }

    #[test]
    fn forward_fill_drops_beyond_max_gap() {
        let a = series(0..20, 0.0);
        // b misses days 5..=11 (7 consecutive dates); only the first 2 may be filled.
        let b = series((0..20).filter(|i| !(5..12).contains(i)), 100.0);
        let out = align_columns(&[&a, &b], AlignmentPolicy::ForwardFill, 2);

        assert_eq!(out.rows.len(), 15);
        assert_eq!(out.dropped_dates, (7..12).map(day).collect::<Vec<_>>());
        assert_eq!(out.filled_cells(), 2);
    }

    #[test]
    fn forward_fill_never_fills_before_first_observation() {
        let a = series(0..10, 0.0);
        let b = series(3..10, 100.0);
        let out = align_columns(&[&a, &b], AlignmentPolicy::ForwardFill, 5);
        assert_eq!(out.rows.len(), 7);
        assert_eq!(out.dropped_dates, vec![day(0), day(1), day(2)]);
    }

    #[test]
    fn forward_fill_with_zero_gap_matches_intersection() {
        let a = series((0..30).filter(|i| i % 4 != 0), 0.0);
        let b = series((0..30).filter(|i| i % 5 != 0), 0.0);
        let ff = align_columns(&[&a, &b], AlignmentPolicy::ForwardFill, 0);
        let ix = align_columns(&[&a, &b], AlignmentPolicy::Intersection, 0);
        assert_eq!(ff.rows, ix.rows);
    }

    #[test]
    fn align_builds_observations() {
        let b = bundle(series(0..40, 5.0), series(0..40, 4.0), series(0..40, 20.0));
        let table = align(&b, &config(AlignmentPolicy::Intersection, 30)).unwrap();
        assert_eq!(table.len(), 40);
        let first = &table.rows()[0];
        assert_eq!(first.ig_proxy, Some(5.0));
        assert_eq!(first.hy_proxy, None);
        assert_eq!(first.treasury_yield, 4.0);
        assert_eq!(first.vix_level, 20.0);
        assert!(!first.filled.any());
    }

    #[test]
    fn align_flags_filled_fields() {
        let vix = series((0..40).filter(|i| *i != 12), 20.0);
        let b = bundle(series(0..40, 5.0), series(0..40, 4.0), vix);
        let table = align(&b, &config(AlignmentPolicy::ForwardFill, 30)).unwrap();
        assert_eq!(table.len(), 40);
        assert_eq!(table.report().filled_cells, 1);
        let row = table.rows().iter().find(|r| r.date == day(12)).unwrap();
        assert!(row.filled.vix && !row.filled.treasury);
        assert_eq!(row.vix_level, 31.0);
    }

    #[test]
    fn align_fails_when_overlap_too_small() {
        let b = bundle(series(0..40, 5.0), series(35..80, 4.0), series(0..80, 20.0));
        let err = align(&b, &AnalysisConfig::default()).unwrap_err();
        match err {
            AppError::Alignment { observations, required } => {
                assert_eq!(observations, 5);
                assert_eq!(required, 30);
            }
            other => panic!("expected alignment error, got {other:?}"),
        }
    }

    #[test]
    fn align_requires_a_corporate_series() {
        let mut b = bundle(series(0..40, 5.0), series(0..40, 4.0), series(0..40, 20.0));
        b.ig_proxy = None;
        assert!(matches!(align(&b, &AnalysisConfig::default()), Err(AppError::Data(_))));
    }

    #[test]
    fn relative_quote_requires_and_aligns_treasury_etf() {
        let mut b = bundle(series(0..40, 5.0), series(0..40, 4.0), series(0..40, 20.0));
        b.quote = CorporateQuote::Relative;
        assert!(matches!(align(&b, &AnalysisConfig::default()), Err(AppError::Data(_))));

        b.treasury_etf = Some(series(2..40, 90.0));
        let table = align(&b, &AnalysisConfig::default()).unwrap();
        assert_eq!(table.len(), 38);
        assert_eq!(table.rows()[0].treasury_etf, Some(92.0));
    }
}
