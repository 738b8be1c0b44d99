//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - builds the data sources for the chosen command
//! - runs the shared analysis pipeline
//! - prints the report
//! - writes optional exports

use clap::Parser;
use tracing::info;

use crate::cli::{AnalysisArgs, Command, CsvArgs, FetchArgs, SimulateArgs};
use crate::data::fred::SERIES_VIX;
use crate::data::sample::{
    HY_PRICE_ID, HY_YIELD_ID, IG_PRICE_ID, IG_YIELD_ID, TREASURY_ETF_ID, TREASURY_ID, VIX_ID,
};
use crate::data::{DataSource, DateWindow, FredClient, SeriesPlan, Sources, SyntheticConfig, SyntheticMarket, YahooClient};
use crate::domain::{AnalysisConfig, CorporateQuote, PriceProxy};
use crate::error::AppError;
use crate::io::CsvSource;

pub mod pipeline;

/// Entry point for the `spread` binary.
pub fn run() -> Result<(), AppError> {
    // `spread` and `spread --threshold 25` behave like `spread simulate ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fetch(args) => handle_fetch(args),
        Command::Csv(args) => handle_csv(args),
        Command::Simulate(args) => handle_simulate(args),
    }
}

fn handle_fetch(args: FetchArgs) -> Result<(), AppError> {
    let config = analysis_config_from_args(&args.analysis);
    let window = DateWindow::new(args.analysis.start, args.analysis.end)?;

    let yahoo = YahooClient::new()?;
    let fred = FredClient::from_env()?;

    let quote = if args.relative {
        CorporateQuote::Relative
    } else {
        CorporateQuote::Price
    };
    let plan = SeriesPlan {
        ig: (!args.no_ig).then(|| args.ig.clone()),
        hy: (!args.no_hy).then(|| args.hy.clone()),
        treasury: args.treasury.clone(),
        treasury_etf: args.relative.then(|| args.treasury_etf.clone()),
        vix: if args.vix_from_fred {
            SERIES_VIX.to_string()
        } else {
            args.vix.clone()
        },
        quote,
    };
    let vix_source: &dyn DataSource = if args.vix_from_fred { &fred } else { &yahoo };
    let sources = Sources {
        corporate: &yahoo,
        treasury: &fred,
        vix: vix_source,
    };

    info!(start = %window.start, end = ?window.end, "fetching live market data");
    let output = pipeline::fetch_and_run(&plan, &window, &sources, &config)?;
    emit(&output, &config, &args.analysis)
}

fn handle_csv(args: CsvArgs) -> Result<(), AppError> {
    let config = analysis_config_from_args(&args.analysis);
    let window = DateWindow::new(args.analysis.start, args.analysis.end)?;
    if args.ig.is_none() && args.hy.is_none() {
        return Err(AppError::config("csv: pass --ig and/or --hy with a series id"));
    }
    if args.quote == CorporateQuote::Relative && args.treasury_etf.is_none() {
        return Err(AppError::config("csv: --quote relative needs --treasury-etf"));
    }

    let source = CsvSource::new(args.dir.clone());
    let plan = SeriesPlan {
        ig: args.ig.clone(),
        hy: args.hy.clone(),
        treasury: args.treasury.clone(),
        treasury_etf: args.treasury_etf.clone(),
        vix: args.vix.clone(),
        quote: args.quote,
    };

    let output = pipeline::fetch_and_run(&plan, &window, &Sources::single(&source), &config)?;
    emit(&output, &config, &args.analysis)
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let config = analysis_config_from_args(&args.analysis);
    let window = DateWindow::new(args.analysis.start, args.analysis.end)?;

    let market = SyntheticMarket::generate(&SyntheticConfig {
        start: args.analysis.start,
        days: args.days,
        seed: args.seed,
        missing_prob: args.missing_prob,
    })?;

    let (ig, hy) = match args.quote {
        CorporateQuote::Price | CorporateQuote::Relative => (IG_PRICE_ID, HY_PRICE_ID),
        CorporateQuote::Yield => (IG_YIELD_ID, HY_YIELD_ID),
    };
    let plan = SeriesPlan {
        ig: Some(ig.to_string()),
        hy: Some(hy.to_string()),
        treasury: TREASURY_ID.to_string(),
        treasury_etf: Some(TREASURY_ETF_ID.to_string()),
        vix: VIX_ID.to_string(),
        quote: args.quote,
    };

    let output = pipeline::fetch_and_run(&plan, &window, &Sources::single(&market), &config)?;
    emit(&output, &config, &args.analysis)
}

/// Print the report and write any requested exports.
fn emit(output: &pipeline::AnalysisOutput, config: &AnalysisConfig, args: &AnalysisArgs) -> Result<(), AppError> {
    let report = output.aligned.report();
    if report.filled_cells > 0 || !report.dropped_dates.is_empty() {
        info!(
            filled = report.filled_cells,
            dropped = report.dropped_dates.len(),
            candidates = report.candidate_dates,
            "alignment adjustments"
        );
    }

    println!("{}", crate::report::format_summary(&output.statistics));
    if args.table {
        println!("{}", crate::report::format_summary_table(&output.summary));
    }

    if let Some(path) = &args.export {
        crate::io::write_spreads_csv(path, &output.spreads, &output.regimes)?;
    }
    if let Some(path) = &args.export_summary {
        crate::io::write_summary_json(path, &output.statistics, &output.summary, config)?;
    }
    Ok(())
}

pub fn analysis_config_from_args(args: &AnalysisArgs) -> AnalysisConfig {
    AnalysisConfig {
        stress_threshold: args.threshold,
        alignment_policy: args.policy,
        max_fill_gap_days: args.max_fill_gap,
        min_overlap_observations: args.min_overlap,
        yield_unit: args.yield_unit,
        ig_proxy: PriceProxy {
            base_yield: args.ig_base_yield,
            sensitivity: args.ig_sensitivity,
            window: args.proxy_window,
        },
        hy_proxy: PriceProxy {
            base_yield: args.hy_base_yield,
            sensitivity: args.hy_sensitivity,
            window: args.proxy_window,
        },
        relative_window: args.relative_window,
        rolling_window: args.rolling_window,
    }
}

/// Rewrite argv so `spread` defaults to `spread simulate`.
///
/// Rules:
/// - `spread`                      -> `spread simulate`
/// - `spread --threshold 25 ...`   -> `spread simulate --threshold 25 ...`
/// - `spread --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("simulate".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "simulate".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::domain::{AlignmentPolicy, YieldUnit};

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_simulate() {
        assert_eq!(rewrite_args(argv(&["spread"])), argv(&["spread", "simulate"]));
        assert_eq!(
            rewrite_args(argv(&["spread", "--threshold", "25"])),
            argv(&["spread", "simulate", "--threshold", "25"])
        );
        assert_eq!(rewrite_args(argv(&["spread", "--help"])), argv(&["spread", "--help"]));
        assert_eq!(rewrite_args(argv(&["spread", "csv", "--dir", "d"])), argv(&["spread", "csv", "--dir", "d"]));
    }

    #[test]
    fn defaults_match_analysis_config() {
        let cli = Cli::parse_from(["spread", "simulate"]);
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        let config = analysis_config_from_args(&args.analysis);
        let expected = AnalysisConfig::default();

        assert_eq!(config.stress_threshold, expected.stress_threshold);
        assert_eq!(config.alignment_policy, expected.alignment_policy);
        assert_eq!(config.max_fill_gap_days, expected.max_fill_gap_days);
        assert_eq!(config.min_overlap_observations, expected.min_overlap_observations);
        assert_eq!(config.yield_unit, expected.yield_unit);
        assert_eq!(config.ig_proxy, expected.ig_proxy);
        assert_eq!(config.hy_proxy, expected.hy_proxy);
        assert_eq!(config.relative_window, expected.relative_window);
        assert_eq!(config.rolling_window, expected.rolling_window);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn min_overlap_below_three_is_rejected() {
        let cli = Cli::parse_from(["spread", "simulate", "--min-overlap", "2"]);
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        let config = analysis_config_from_args(&args.analysis);
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn flags_flow_into_config() {
        let cli = Cli::parse_from([
            "spread",
            "simulate",
            "--threshold",
            "25",
            "--policy",
            "forward-fill",
            "--yield-unit",
            "decimal",
            "--proxy-window",
            "10",
            "--quote",
            "relative",
            "--relative-window",
            "15",
        ]);
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        let config = analysis_config_from_args(&args.analysis);
        assert_eq!(config.stress_threshold, 25.0);
        assert_eq!(config.alignment_policy, AlignmentPolicy::ForwardFill);
        assert_eq!(config.yield_unit, YieldUnit::Decimal);
        assert_eq!(config.ig_proxy.window, 10);
        assert_eq!(config.hy_proxy.window, 10);
        assert_eq!(config.relative_window, 15);
        assert_eq!(args.quote, CorporateQuote::Relative);
    }
}
