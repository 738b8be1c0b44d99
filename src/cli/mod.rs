//! Command-line parsing for the credit spread / market stress analyzer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the alignment/statistics code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::data::fred::SERIES_TREASURY_10Y;
use crate::data::yahoo::{SYMBOL_HY, SYMBOL_IG, SYMBOL_TREASURY_ETF, SYMBOL_VIX};
use crate::domain::{AlignmentPolicy, CorporateQuote, YieldUnit};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "spread", version, about = "Credit spreads vs market stress (VIX)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch LQD/HYG/VIX from Yahoo and the 10y Treasury from FRED, then analyze.
    Fetch(FetchArgs),
    /// Analyze series stored as `<dir>/<id>.csv` files with `date,value` columns.
    Csv(CsvArgs),
    /// Analyze a deterministic synthetic market (no network).
    Simulate(SimulateArgs),
}

/// Options shared by every analysis command.
#[derive(Debug, Args, Clone)]
pub struct AnalysisArgs {
    /// First date to include (YYYY-MM-DD).
    #[arg(long, default_value = "2020-01-01")]
    pub start: NaiveDate,

    /// Last date to include (YYYY-MM-DD); defaults to the latest available.
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// VIX level above which a day counts as stress.
    #[arg(long, default_value_t = 30.0)]
    pub threshold: f64,

    /// How dates missing from some series are handled.
    #[arg(long, value_enum, default_value_t = AlignmentPolicy::Intersection)]
    pub policy: AlignmentPolicy,

    /// Longest run of missing dates forward-fill may bridge.
    #[arg(long, default_value_t = 5)]
    pub max_fill_gap: usize,

    /// Minimum aligned observations required to run (at least 3).
    #[arg(long, default_value_t = 30)]
    pub min_overlap: usize,

    /// Unit of Treasury and direct corporate yields.
    #[arg(long, value_enum, default_value_t = YieldUnit::Percent)]
    pub yield_unit: YieldUnit,

    /// Window (rows) for rolling spread/VIX correlation.
    #[arg(long, default_value_t = 60)]
    pub rolling_window: usize,

    /// IG price proxy: base yield (decimal).
    #[arg(long, default_value_t = 0.04)]
    pub ig_base_yield: f64,

    /// IG price proxy: sensitivity to mean daily return.
    #[arg(long, default_value_t = 15.0)]
    pub ig_sensitivity: f64,

    /// HY price proxy: base yield (decimal).
    #[arg(long, default_value_t = 0.06)]
    pub hy_base_yield: f64,

    /// HY price proxy: sensitivity to mean daily return.
    #[arg(long, default_value_t = 20.0)]
    pub hy_sensitivity: f64,

    /// Price proxy return window (rows), shared by IG and HY.
    #[arg(long, default_value_t = 20)]
    pub proxy_window: usize,

    /// Relative-performance spread window (rows).
    #[arg(long, default_value_t = 20)]
    pub relative_window: usize,

    /// Also print every summary statistic as a table.
    #[arg(long)]
    pub table: bool,

    /// Export per-date spreads and regime labels to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export statistics (and the config used) to JSON.
    #[arg(long = "export-summary")]
    pub export_summary: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct FetchArgs {
    #[command(flatten)]
    pub analysis: AnalysisArgs,

    /// Investment-grade ETF symbol.
    #[arg(long, default_value = SYMBOL_IG)]
    pub ig: String,

    /// High-yield ETF symbol.
    #[arg(long, default_value = SYMBOL_HY)]
    pub hy: String,

    /// Skip the investment-grade series.
    #[arg(long)]
    pub no_ig: bool,

    /// Skip the high-yield series.
    #[arg(long)]
    pub no_hy: bool,

    /// FRED Treasury series id.
    #[arg(long, default_value = SERIES_TREASURY_10Y)]
    pub treasury: String,

    /// Yahoo VIX symbol.
    #[arg(long, default_value = SYMBOL_VIX)]
    pub vix: String,

    /// Take VIX from FRED (`VIXCLS`) instead of Yahoo.
    #[arg(long)]
    pub vix_from_fred: bool,

    /// Measure spreads as Treasury ETF outperformance instead of proxy yields.
    #[arg(long)]
    pub relative: bool,

    /// Treasury ETF symbol used by `--relative`.
    #[arg(long, default_value = SYMBOL_TREASURY_ETF)]
    pub treasury_etf: String,
}

#[derive(Debug, Args, Clone)]
pub struct CsvArgs {
    #[command(flatten)]
    pub analysis: AnalysisArgs,

    /// Directory containing the series files.
    #[arg(long, value_name = "DIR")]
    pub dir: PathBuf,

    /// IG series id (file stem).
    #[arg(long)]
    pub ig: Option<String>,

    /// HY series id (file stem).
    #[arg(long)]
    pub hy: Option<String>,

    /// Treasury series id (file stem).
    #[arg(long, default_value = "treasury")]
    pub treasury: String,

    /// VIX series id (file stem).
    #[arg(long, default_value = "vix")]
    pub vix: String,

    /// Treasury ETF price series id (file stem); required by `--quote relative`.
    #[arg(long)]
    pub treasury_etf: Option<String>,

    /// Whether IG/HY files hold yields or ETF prices.
    #[arg(long, value_enum, default_value_t = CorporateQuote::Price)]
    pub quote: CorporateQuote,
}

#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub analysis: AnalysisArgs,

    /// Business days to generate (from `--start`).
    #[arg(long, default_value_t = 1400)]
    pub days: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Per-series probability that a day is missing.
    #[arg(long, default_value_t = 0.02)]
    pub missing_prob: f64,

    /// Analyze synthetic ETF prices, direct yields or relative performance.
    #[arg(long, value_enum, default_value_t = CorporateQuote::Price)]
    pub quote: CorporateQuote,
}
