use analysis_core::{FundamentalSnapshot, Metric, RedFlag, RedFlagReport, SectorCategory};

pub const MAX_DEBT_EQUITY: f64 = 3.0;
pub const MIN_CONTROLLING_HOLDING: f64 = 10.0;
/// Widely-held companies are exempt from the low-holding flag.
pub const WIDELY_HELD_INSTITUTIONAL: f64 = 70.0;

/// Instant disqualifiers. Cash-flow and leverage flags do not apply to lenders.
pub fn detect_red_flags(snap: &FundamentalSnapshot, sector: SectorCategory) -> RedFlagReport {
    let mut flags = Vec::new();

    if !sector.is_financial() {
        if let Some(ocf) = snap.get(Metric::Ocf).filter(|v| *v < 0.0) {
            flags.push(RedFlag::NegativeOperatingCashFlow { ocf });
        }
        if let Some(de_ratio) = snap.get(Metric::DeRatio).filter(|v| *v > MAX_DEBT_EQUITY) {
            flags.push(RedFlag::ExtremeDebt { de_ratio });
        }
    }

    if let Some(roe) = snap.get(Metric::Roe).filter(|v| *v < 0.0) {
        flags.push(RedFlag::NegativeRoe { roe });
    }

    let institutional = snap.get(Metric::FiiHolding).unwrap_or(0.0) + snap.get(Metric::DiiHolding).unwrap_or(0.0);
    if let Some((holding, holder)) = snap.controlling_holding() {
        if holding < MIN_CONTROLLING_HOLDING && institutional < WIDELY_HELD_INSTITUTIONAL {
            flags.push(RedFlag::LowControllingHolding { holding, holder });
        }
    }

    let report = RedFlagReport::new(flags);
    if report.critical {
        tracing::warn!("Critical red flags: {:?}", report.flags);
    }
    report
}
