//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the statistics code stays clean and testable
//! - output changes are localized

use crate::domain::SummaryStatistic;
use crate::regime::SpreadBand;
use crate::stats::{AnalysisStatistics, SeriesStatistics};

/// Format the full analysis summary.
pub fn format_summary(stats: &AnalysisStatistics) -> String {
    let mut out = String::new();

    out.push_str("=== spread - Credit Spreads vs Market Stress ===\n");
    out.push_str(&format!("Period: {} to {}\n", stats.period_start, stats.period_end));
    out.push_str(&format!("Observations: {}\n", stats.observations));

    out.push_str("\nCurrent levels:\n");
    out.push_str(&format!("  10Y Treasury: {:.2}%\n", stats.latest_treasury_pct));
    out.push_str(&format!("  VIX: {:.2}\n", stats.latest_vix));
    for s in &stats.series {
        let p = &s.profile;
        out.push_str(&format!(
            "  {} spread: {:.0} bps (avg {:.0}, as of {})\n",
            s.kind.display_name(),
            p.latest_bps,
            p.mean_bps,
            p.latest_date
        ));
    }

    out.push_str("\nCorrelation with VIX:\n");
    for s in &stats.series {
        let c = &s.correlation;
        out.push_str(&format!(
            "  {:<15} r={:>6.3}{:<3} (p={}, n={})\n",
            s.kind.display_name(),
            c.coefficient,
            c.significance.stars(),
            fmt_p(c.p_value),
            c.sample_size
        ));
    }

    let st = &stats.stress;
    out.push_str(&format!("\nStress periods (VIX > {}):\n", st.threshold));
    out.push_str(&format!(
        "  {} of {} days ({:.1}%)\n",
        st.stress_count,
        st.total_count,
        st.stress_fraction * 100.0
    ));

    out.push_str("\nSpreads by regime:\n");
    for s in &stats.series {
        out.push_str(&format_regime_line(s));
    }

    out.push_str("\nSpread volatility:\n");
    for s in &stats.series {
        let p = &s.profile;
        out.push_str(&format!(
            "  {:<15} std={} range=[{:.0}, {:.0}] bps\n",
            s.kind.display_name(),
            fmt_opt_bps(p.std_dev_bps),
            p.min_bps,
            p.max_bps
        ));
    }

    out.push_str("\nSpread vs VIX trend:\n");
    for s in &stats.series {
        match s.profile.vix_trend {
            Some(fit) => out.push_str(&format!(
                "  {:<15} {:+.1} bps per VIX point, {:.0} bps implied at VIX {}\n",
                s.kind.display_name(),
                fit.slope,
                fit.predict(st.threshold),
                st.threshold
            )),
            None => out.push_str(&format!("  {:<15} n/a (VIX constant)\n", s.kind.display_name())),
        }
    }

    if let Some(premium) = stats.hy_ig_premium_bps {
        out.push_str(&format!("\nHY premium over IG: {premium:.0} bps\n"));
    }

    out.push_str("\nSpread bands (p25 / p75):\n");
    for s in &stats.series {
        let b = &s.profile.bands;
        out.push_str(&format!(
            "  {:<15} tight<={:.0} wide>={:.0} | tight {:.1}% normal {:.1}% wide {:.1}%\n",
            s.kind.display_name(),
            b.p25,
            b.p75,
            b.pct(SpreadBand::Tight),
            b.pct(SpreadBand::Normal),
            b.pct(SpreadBand::Wide)
        ));
    }

    out.push_str("\nRolling correlation with VIX:\n");
    for s in &stats.series {
        let r = &s.rolling;
        match (r.latest(), r.range()) {
            (Some((date, latest)), Some((lo, hi))) => out.push_str(&format!(
                "  {:<15} {}d latest={latest:.3} ({date}) range=[{lo:.3}, {hi:.3}]\n",
                s.kind.display_name(),
                r.window
            )),
            _ => out.push_str(&format!(
                "  {:<15} {}d n/a (not enough complete windows)\n",
                s.kind.display_name(),
                r.window
            )),
        }
    }

    out
}

fn format_regime_line(s: &SeriesStatistics) -> String {
    let m = &s.regime_means;
    format!(
        "  {:<15} normal={} (n={}) stress={} (n={}) premium={}\n",
        s.kind.display_name(),
        fmt_opt_bps(m.normal.mean),
        m.normal.count,
        fmt_opt_bps(m.stress.mean),
        m.stress.count,
        fmt_opt_bps(m.risk_premium)
    )
}

/// Format summary statistics as a two-column table.
pub fn format_summary_table(stats: &[SummaryStatistic]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<26} {:>14} {:>8}\n", "metric", "value", "n"));
    out.push_str(&format!("{:-<26} {:-<14} {:-<8}\n", "", "", ""));
    for s in stats {
        out.push_str(&format!(
            "{:<26} {:>14.4} {:>8}\n",
            s.metric_name(),
            s.value(),
            s.sample_size()
        ));
    }
    out
}

fn fmt_opt_bps(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.0} bps"),
        None => "n/a".to_string(),
    }
}

fn fmt_p(p: f64) -> String {
    if p < 1e-4 { format!("{p:.2e}") } else { format!("{p:.4}") }
}
