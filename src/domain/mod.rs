//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw input containers (`SeriesMap`, `RawSeriesBundle`)
//! - the aligned table (`Observation`, `AlignedSeries`)
//! - derived values (`SpreadObservation`, `Regime`, `SummaryStatistic`)
//! - run configuration (`AnalysisConfig`)

pub mod types;

pub use types::*;
