//! Reporting: human-readable summaries of an analysis run.
//!
//! Reports consume `AnalysisStatistics` only; they never recompute anything.

pub mod format;

pub use format::{format_summary, format_summary_table};
