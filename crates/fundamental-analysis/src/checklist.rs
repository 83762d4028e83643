//! Gate 1: ten-point fundamental quality rubric, one per sector family.
//!
//! Every criterion is tri-state. Missing inputs make a criterion not-assessed
//! rather than failed, and the gate is judged on what could be assessed.

use analysis_core::{
    ChecklistResult, Criterion, CriterionStatus, FundamentalSnapshot, Metric, SectorCategory,
};

pub const FUNDAMENTAL_CRITERIA: usize = 10;

/// Minimum assessed criteria before the pass-rate rule applies.
pub const MIN_ASSESSED: usize = 5;
pub const MIN_PASS_RATE: f64 = 0.7;
/// Score that passes regardless of how much was assessed.
pub const OUTRIGHT_PASS_SCORE: usize = 7;

/// Assumed borrowing rate for the interest-coverage proxy.
const ASSUMED_INTEREST_RATE: f64 = 0.08;

const NA: &str = "Data N/A";

/// `None` when nothing could be assessed.
pub fn fundamental_gate(score: usize, assessed: usize) -> Option<bool> {
    if assessed == 0 {
        return None;
    }
    Some(
        (assessed >= MIN_ASSESSED && score as f64 / assessed as f64 >= MIN_PASS_RATE)
            || score >= OUTRIGHT_PASS_SCORE,
    )
}

fn judge(name: &str, passed: bool, detail: String) -> Criterion {
    Criterion::new(name, CriterionStatus::from_bool(passed), detail)
}

fn threshold<P, D>(name: &str, value: Option<f64>, pass: P, detail: D) -> Criterion
where
    P: Fn(f64) -> bool,
    D: Fn(f64) -> String,
{
    match value {
        Some(v) => judge(name, pass(v), detail(v)),
        None => Criterion::not_assessed(name, NA),
    }
}

pub fn fundamental_checklist(snap: &FundamentalSnapshot, sector: SectorCategory) -> ChecklistResult {
    let criteria = if sector.is_financial() {
        financial_criteria(snap, sector)
    } else {
        general_criteria(snap)
    };
    ChecklistResult::tally(criteria, FUNDAMENTAL_CRITERIA, fundamental_gate)
}

fn general_criteria(snap: &FundamentalSnapshot) -> Vec<Criterion> {
    let get = |m: Metric| snap.get(m);
    let mut out = Vec::with_capacity(FUNDAMENTAL_CRITERIA);

    let margin = get(Metric::GrossMargin).or_else(|| get(Metric::OperatingMargin));
    out.push(threshold("profit_margin", margin, |m| m > 20.0, |m| {
        format!("Margin: {:.1}% (need >20%)", m)
    }));

    let roe = get(Metric::Roe);
    out.push(threshold("roe", roe, |v| v > 15.0, |v| format!("ROE: {:.1}% (need >15%)", v)));

    out.push(match (get(Metric::Roce), get(Metric::Roa), roe) {
        (Some(roce), _, _) => judge("roce", roce > 15.0, format!("ROCE: {:.1}% (need >15%)", roce)),
        (None, Some(roa), _) => judge("roce", roa > 5.0, format!("ROA: {:.1}% (proxy, need >5%)", roa)),
        (None, None, Some(roe)) if roe > 20.0 => {
            judge("roce", true, format!("ROE {:.1}% strong (ROCE likely >15%)", roe))
        }
        _ => Criterion::not_assessed("roce", NA),
    });

    let de = get(Metric::DeRatio);
    out.push(threshold("debt_equity", de, |v| v < 1.0, |v| format!("D/E: {:.2} (need <1)", v)));

    let ocf = get(Metric::Ocf);
    out.push(match (de, ocf, get(Metric::TotalDebt)) {
        (Some(de), _, _) if de < 0.05 => judge("interest_coverage", true, "Nearly debt-free".into()),
        (_, Some(ocf), Some(debt)) if debt > 0.0 => {
            let coverage = ocf / (debt * ASSUMED_INTEREST_RATE);
            judge(
                "interest_coverage",
                coverage > 3.0,
                format!("Est. coverage: {:.1}x (need >3x)", coverage),
            )
        }
        _ => Criterion::not_assessed("interest_coverage", NA),
    });

    out.push(threshold("ocf", ocf, |v| v > 0.0, |v| format!("OCF: {:.0} Cr", v / 1e7)));

    out.push(match (get(Metric::RevCagr3y), get(Metric::RevenueGrowthQoq)) {
        (Some(cagr), _) => judge("rev_growth", cagr > 10.0, format!("Rev CAGR 3Y: {:.1}% (need >10%)", cagr)),
        (None, Some(qoq)) => judge("rev_growth", qoq > 10.0, format!("Rev Growth QoQ: {:.1}% (need >10%)", qoq)),
        (None, None) => Criterion::not_assessed("rev_growth", NA),
    });

    out.push(match (get(Metric::PatCagr3y), get(Metric::EarningsGrowthQoq)) {
        (Some(cagr), _) => judge("pat_growth", cagr > 12.0, format!("PAT CAGR 3Y: {:.1}% (need >12%)", cagr)),
        (None, Some(qoq)) => judge(
            "pat_growth",
            qoq > 12.0,
            format!("Earnings Growth QoQ: {:.1}% (need >12%)", qoq),
        ),
        (None, None) => Criterion::not_assessed("pat_growth", NA),
    });

    out.push(match snap.controlling_holding() {
        Some((holding, kind)) => judge(
            "promoter",
            holding > 50.0,
            format!("{}: {:.1}% (need >50%)", capitalize(kind.label()), holding),
        ),
        None => Criterion::not_assessed("promoter", NA),
    });

    out.push(threshold("fcf", get(Metric::Fcf), |v| v > 0.0, |v| format!("FCF: {:.0} Cr", v / 1e7)));

    out
}

fn financial_criteria(snap: &FundamentalSnapshot, sector: SectorCategory) -> Vec<Criterion> {
    let get = |m: Metric| snap.get(m);
    let pb = get(Metric::Pb);
    let mut out = Vec::with_capacity(FUNDAMENTAL_CRITERIA);

    out.push(threshold("roe", get(Metric::Roe), |v| v > 12.0, |v| format!("ROE: {:.1}% (need >12%)", v)));
    out.push(threshold("roa", get(Metric::Roa), |v| v > 1.0, |v| format!("ROA: {:.1}% (need >1%)", v)));

    out.push(match (get(Metric::Gnpa), pb) {
        (Some(gnpa), _) => judge("gnpa", gnpa < 3.0, format!("GNPA: {:.2}% (need <3%)", gnpa)),
        (None, Some(pb)) => judge("gnpa", pb < 3.0, format!("P/B: {:.2} (proxy, need <3 for banks)", pb)),
        (None, None) => Criterion::not_assessed("gnpa", "GNPA data N/A"),
    });

    out.push(match (get(Metric::Nnpa), pb) {
        (Some(nnpa), _) => judge("nnpa", nnpa < 1.5, format!("NNPA: {:.2}% (need <1.5%)", nnpa)),
        (None, Some(pb)) => judge(
            "nnpa",
            pb < 3.0,
            format!("P/B: {:.2} (NNPA data N/A, using P/B proxy)", pb),
        ),
        (None, None) => Criterion::not_assessed("nnpa", "NNPA data N/A"),
    });

    out.push(threshold("rev_growth", get(Metric::RevCagr3y), |v| v > 10.0, |v| {
        format!("Rev CAGR 3Y: {:.1}% (need >10%)", v)
    }));
    out.push(threshold("pat_growth", get(Metric::PatCagr3y), |v| v > 12.0, |v| {
        format!("PAT CAGR 3Y: {:.1}% (need >12%)", v)
    }));

    // Banking promoters are capped by the regulator.
    let (need, note) = match sector {
        SectorCategory::Banking => (20.0, " (RBI cap applies)"),
        _ => (50.0, ""),
    };
    out.push(match snap.controlling_holding() {
        Some((holding, kind)) => judge(
            "promoter",
            holding >= need,
            format!("{}: {:.1}% (need >={}%{})", capitalize(kind.label()), holding, need, note),
        ),
        None => Criterion::not_assessed("promoter", NA),
    });

    out.push(threshold("dividend", get(Metric::DividendYield), |v| v > 0.5, |v| {
        format!("Div Yield: {:.2}%", v)
    }));
    out.push(threshold("pe_value", get(Metric::Pe), |v| v < 20.0, |v| {
        format!("P/E: {:.1} (need <20 for banks)", v)
    }));
    out.push(threshold("pb_value", pb, |v| v < 3.0, |v| format!("P/B: {:.2} (need <3 for banks)", v)));

    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
