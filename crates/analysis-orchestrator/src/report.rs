//! Plain-text rendering of single analyses and whole batches.

use crate::BatchReport;
use analysis_core::{AnalysisResult, ChecklistResult, Metric, VerdictKind};
use chrono::{DateTime, Utc};

const RULE_WIDTH: usize = 70;
const SECTION_WIDTH: usize = 50;
const BATCH_WIDTH: usize = 80;

fn gate_label(gate_pass: Option<bool>) -> &'static str {
    match gate_pass {
        Some(true) => "PASS",
        Some(false) => "FAIL",
        None => "N/A",
    }
}

fn or_na(value: Option<f64>, render: impl Fn(f64) -> String) -> String {
    value.map(render).unwrap_or_else(|| "N/A".to_string())
}

fn market_cap(value: Option<f64>) -> String {
    match value {
        Some(v) if v > 1e9 => format!("{:.1}B", v / 1e9),
        Some(v) => format!("{:.0} Cr", v / 1e7),
        None => "N/A".to_string(),
    }
}

fn above_below(flag: Option<bool>) -> &'static str {
    match flag {
        Some(true) => "(Above)",
        Some(false) => "(Below)",
        None => "N/A",
    }
}

fn criteria_lines(out: &mut String, gate: &ChecklistResult) {
    for c in &gate.criteria {
        out.push_str(&format!("\n  [{}] {}: {}", c.status.label(), c.name, c.detail));
    }
}

/// Full three-gate report for one symbol.
pub fn format(result: &AnalysisResult) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let section = "-".repeat(SECTION_WIDTH);
    let f = &result.fundamentals;
    let fg = &result.fundamental_gate;
    let val = &result.valuation;
    let tech = &result.technical;
    let ma = &tech.moving_averages;
    let sr = &tech.support_resistance;
    let verdict = &result.verdict;

    let mut out = format!(
        "\n{rule}\n {} - 3-GATE ANALYSIS\n {} | Sector: {} ({})\n Market Cap: {} | Data: {}\n{rule}\n",
        result.symbol,
        result.timestamp.format("%Y-%m-%d %H:%M"),
        f.industry.as_deref().unwrap_or("Unknown"),
        result.sector,
        market_cap(f.get(Metric::MarketCap)),
        f.data_source_label(),
    );

    out.push_str(&format!(
        "\nGATE 1: FUNDAMENTAL QUALITY ({}/{} assessed = {:.0}%)\n  >> {}\n{section}",
        fg.score,
        fg.assessed,
        fg.pass_rate(),
        gate_label(fg.gate_pass),
    ));
    criteria_lines(&mut out, fg);

    out.push_str(&format!(
        "\n\nGATE 2: VALUATION ({})\n  >> {}\n{section}",
        val.verdict,
        gate_label(val.gate_pass),
    ));
    for signal in &val.signals {
        out.push_str(&format!("\n  {} [{:+}]", signal.description, signal.weight));
    }
    for note in &val.notes {
        out.push_str(&format!("\n  {}", note));
    }
    out.push_str(&format!(
        "\n  Key: P/E={} | P/B={} | ROE={} | ROCE={} | DivYld={} | Promoter={}",
        or_na(f.get(Metric::Pe), |v| format!("{:.1}", v)),
        or_na(f.get(Metric::Pb), |v| format!("{:.2}", v)),
        or_na(f.get(Metric::Roe), |v| format!("{:.1}%", v)),
        or_na(f.get(Metric::Roce), |v| format!("{:.1}%", v)),
        or_na(f.get(Metric::DividendYield), |v| format!("{:.2}%", v)),
        or_na(f.controlling_holding().map(|(v, _)| v), |v| format!("{:.1}%", v)),
    ));

    let flags = &result.red_flags;
    if flags.flags.is_empty() {
        out.push_str("\n\n  RED FLAGS: None");
    } else {
        out.push_str(&format!(
            "\n\nRED FLAGS ({} found){}\n{section}",
            flags.flags.len(),
            if flags.critical { " ** CRITICAL **" } else { "" },
        ));
        for flag in &flags.flags {
            out.push_str(&format!("\n  !! {}", flag));
        }
    }

    let tg = &result.technical_gate;
    out.push_str(&format!(
        "\n\nGATE 3: TECHNICAL ({}/{} = {:.1}%)\n  >> {}\n{section}",
        tg.score,
        tg.total,
        tg.score as f64 / tg.total.max(1) as f64 * 100.0,
        gate_label(tg.gate_pass),
    ));
    out.push_str(&format!(
        "\n  Price: {:.2} | 52W: {:.2}-{:.2} ({:.1}% off high, {:.1}% above low)",
        ma.current_price, sr.low_52w, sr.high_52w, sr.distance_from_high_pct, sr.distance_from_low_pct,
    ));
    out.push_str(&format!(
        "\n  50-DMA: {} {} | 200-DMA: {} {}",
        or_na(ma.ma_50, |v| format!("{:.2}", v)),
        above_below(ma.above_50),
        or_na(ma.ma_200, |v| format!("{:.2}", v)),
        above_below(ma.above_200),
    ));
    out.push_str(&format!(
        "\n  RSI: {:.2} | MFI: {:.2} | MACD: {} | Vol: {:.2}x (10d avg {:.0})",
        tech.rsi,
        tech.mfi,
        if tech.macd.bullish { "Bullish" } else { "Bearish" },
        tech.volume.ratio,
        tech.volume.avg_10,
    ));
    out.push_str(&format!(
        "\n  Pattern: {} | Trend: {}",
        tech.candlestick.describe(),
        tech.candlestick.prior_trend,
    ));
    out.push_str(&format!(
        "\n  S&R: {:.2} / {:.2} <<< {:.2} >>> {:.2} / {:.2}",
        sr.strong_support, sr.immediate_support, ma.current_price, sr.immediate_resistance, sr.strong_resistance,
    ));
    out.push_str(&format!(
        "\n  RRR: {:.2}:1 {} | Risk {:.1}% / Reward {:.1}%",
        tech.risk_reward.ratio,
        if tech.risk_reward.valid { "(Valid)" } else { "(Too Low)" },
        tech.risk_reward.risk_pct,
        tech.risk_reward.reward_pct,
    ));
    criteria_lines(&mut out, tg);

    out.push_str(&format!(
        "\n\n{rule}\n VERDICT: {} (Confidence: {})\n Gates: Fundamental={} | Valuation={} | Technical={}\n{rule}\n Action: {}",
        verdict.kind,
        verdict.confidence,
        gate_label(fg.gate_pass),
        gate_label(val.gate_pass),
        gate_label(tg.gate_pass),
        verdict.action,
    ));
    if verdict.position_pct > 0 {
        out.push_str(&format!("\n Position: {}% of portfolio", verdict.position_pct));
    }
    if let Some(setup) = &verdict.trade_setup {
        out.push_str(&format!(
            "\n\n TRADE SETUP\n Entry:    {:.2}\n Stoploss: {:.2}\n Target 1: {:.2} (book 40%)\n Target 2: {:.2} (book 40%)\n Target 3: {:.2} (trail SL)",
            setup.entry, setup.stoploss, setup.target_1, setup.target_2, setup.target_3,
        ));
    }

    out.push('\n');
    out.push_str(&rule);
    out.push('\n');
    out
}

fn group_label(kind: VerdictKind) -> &'static str {
    match kind {
        VerdictKind::Buy => "BUY RECOMMENDATIONS",
        VerdictKind::Accumulate => "ACCUMULATE (add on dips)",
        VerdictKind::Wait => "WATCHLIST (WAIT)",
        VerdictKind::Avoid => "AVOID",
        VerdictKind::Skip => "SKIP",
    }
}

/// Summary table, verdict groups, every detailed report, then the symbols
/// that could not be analyzed.
pub fn format_batch(report: &BatchReport, generated_at: DateTime<Utc>) -> String {
    let banner = "#".repeat(BATCH_WIDTH);
    let analyzed: Vec<&AnalysisResult> = report.analyzed().collect();

    let mut out = format!(
        "\n{banner}\n 3-GATE STOCK ANALYSIS | {}\n Quality + Valuation + Timing | Positional (1-6 months)\n{banner}\n\n",
        generated_at.format("%Y-%m-%d %H:%M"),
    );
    out.push_str(&format!(
        "{:<14} {:<10} {:<7} {:<7} {:<7} {:<11} {:<6} {:<12} {:<8}\n{}\n",
        "Symbol", "Price", "P/E", "ROE", "Fund", "Value", "Tech", "Verdict", "Conf",
        "-".repeat(BATCH_WIDTH),
    ));
    for r in &analyzed {
        out.push_str(&format!(
            "{:<14} {:<10.2} {:<7} {:<7} {:<7} {:<11} {:<6} {:<12} {:<8}\n",
            r.symbol.as_str(),
            r.technical.current_price(),
            or_na(r.fundamentals.get(Metric::Pe), |v| format!("{:.1}", v)),
            or_na(r.fundamentals.get(Metric::Roe), |v| format!("{:.0}%", v)),
            format!("{}/{}", r.fundamental_gate.score, r.fundamental_gate.assessed),
            r.valuation.verdict.as_str(),
            format!("{}/{}", r.technical_gate.score, r.technical_gate.total),
            r.verdict.kind.as_str(),
            r.verdict.confidence.to_string(),
        ));
    }
    out.push_str(&format!("\n{banner}\n"));

    for kind in VerdictKind::ALL {
        let group: Vec<&&AnalysisResult> = analyzed.iter().filter(|r| r.verdict.kind == kind).collect();
        if group.is_empty() {
            continue;
        }
        out.push_str(&format!("\n{}:\n", group_label(kind)));
        for r in group {
            out.push_str(&format!(
                "  - {} @ {:.2} (Fund: {}/{}, Val: {}, Tech: {}/{})\n",
                r.symbol,
                r.technical.current_price(),
                r.fundamental_gate.score,
                r.fundamental_gate.assessed,
                r.valuation.verdict,
                r.technical_gate.score,
                r.technical_gate.total,
            ));
        }
    }

    out.push_str(&format!("\n\nDETAILED ANALYSIS\n{}", "=".repeat(BATCH_WIDTH)));
    for r in &analyzed {
        out.push_str(&format(r));
    }

    let failures: Vec<(&str, String)> = report.failures().map(|(s, e)| (s, e.to_string())).collect();
    if !failures.is_empty() {
        out.push_str("\n\nUNRESOLVED:\n");
        for (symbol, reason) in failures {
            out.push_str(&format!("  - {}: {}\n", symbol, reason));
        }
    }
    if !report.skipped.is_empty() {
        out.push_str(&format!("\n\nNOT STARTED (cancelled):\n  {}\n", report.skipped.join(", ")));
    }

    out
}
