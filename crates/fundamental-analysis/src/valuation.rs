//! Gate 2: independent valuation lenses summed into one verdict.

use analysis_core::{round_to, FundamentalSnapshot, Metric, SectorCategory, ValuationAssessment, ValuationSignal};

/// Benchmark bond yield the earnings yield is compared against.
pub const BOND_YIELD_PCT: f64 = 7.0;

/// Upper bounds for cheap, fair and expensive P/E. At or above the last is very expensive.
pub const BANKING_PE_BANDS: (f64, f64, f64) = (10.0, 15.0, 25.0);
pub const DEFAULT_PE_BANDS: (f64, f64, f64) = (15.0, 25.0, 40.0);

fn signal(signals: &mut Vec<ValuationSignal>, weight: i32, description: String) {
    signals.push(ValuationSignal { description, weight });
}

/// PEG tier: strictly below 0.5 is very cheap, so exactly 0.5 is cheap.
pub fn peg_tier(peg: f64) -> (i32, &'static str) {
    if peg < 0.5 {
        (2, "Very Cheap")
    } else if peg < 1.0 {
        (1, "Cheap")
    } else if peg <= 2.0 {
        (0, "Fair")
    } else if peg <= 5.0 {
        (-1, "Expensive")
    } else {
        (-2, "Extreme")
    }
}

pub fn assess_valuation(snap: &FundamentalSnapshot, sector: SectorCategory) -> ValuationAssessment {
    let mut signals = Vec::new();
    let mut notes = Vec::new();

    // Loss-making companies have no meaningful P/E-based lens.
    let pe = snap.get(Metric::Pe);
    let positive_pe = pe.filter(|v| *v > 0.0);
    if let Some(pe) = pe.filter(|v| *v <= 0.0) {
        notes.push(format!("P/E: {:.1} (loss-making)", pe));
    }

    let growth = snap
        .get(Metric::PatCagr3y)
        .filter(|g| *g != 0.0)
        .or_else(|| snap.get(Metric::EarningsGrowthQoq));
    let peg = match (positive_pe, growth) {
        (Some(pe), Some(g)) if g > 0.0 => Some(round_to(pe / g, 2)),
        _ => None,
    };
    if let Some(peg) = peg {
        let (weight, label) = peg_tier(peg);
        signal(&mut signals, weight, format!("PEG: {} ({})", peg, label));
    }

    if let Some(pe) = positive_pe {
        let (cheap, fair, expensive) = match sector {
            SectorCategory::Banking => BANKING_PE_BANDS,
            _ => DEFAULT_PE_BANDS,
        };
        let (weight, label) = if pe < cheap {
            (1, "Cheap")
        } else if pe < fair {
            (0, "Fair")
        } else if pe < expensive {
            (-1, "Expensive")
        } else {
            (-2, "Very Expensive")
        };
        signal(&mut signals, weight, format!("P/E: {:.1} ({})", pe, label));
    }

    match (snap.get(Metric::Pb), snap.get(Metric::Roe)) {
        (Some(pb), Some(roe)) if sector.is_financial() => {
            let (weight, label) = if pb < 1.5 && roe > 15.0 {
                (2, "Value")
            } else if pb < 2.5 && roe > 12.0 {
                (0, "Fair")
            } else {
                (-1, "Expensive")
            };
            signal(&mut signals, weight, format!("P/B: {:.2} with ROE {:.0}% ({})", pb, roe, label));
        }
        (Some(pb), Some(roe)) => {
            let (weight, description) = if pb < 3.0 && roe > 15.0 {
                (1, format!("P/B: {:.2} with ROE {:.0}% (Reasonable)", pb, roe))
            } else if pb < 6.0 && roe > 20.0 {
                (0, format!("P/B: {:.2} with ROE {:.0}% (Fair for high-ROE)", pb, roe))
            } else if pb < 8.0 {
                (-1, format!("P/B: {:.2} (Expensive)", pb))
            } else {
                (-2, format!("P/B: {:.2} (Very Expensive)", pb))
            };
            signal(&mut signals, weight, description);
        }
        (Some(pb), None) => notes.push(format!("P/B: {:.2}", pb)),
        _ => {}
    }

    if let Some(pe) = positive_pe {
        let ey = round_to(100.0 / pe, 2);
        let (weight, label) = if ey > BOND_YIELD_PCT * 1.5 {
            (1, ">> Bond 7% (Attractive)")
        } else if ey > BOND_YIELD_PCT {
            (0, "> Bond 7% (OK)")
        } else {
            (-1, "< Bond 7% (Unattractive)")
        };
        signal(&mut signals, weight, format!("Earnings Yield: {:.1}% {}", ey, label));
    }

    match snap.get(Metric::DividendYield) {
        Some(dy) if dy > 3.0 => signal(&mut signals, 1, format!("Div Yield: {:.2}% (Strong income)", dy)),
        Some(dy) if dy > 1.5 => notes.push(format!("Div Yield: {:.2}%", dy)),
        _ => {}
    }

    if let Some(ev) = snap.get(Metric::EvEbitda) {
        let (weight, label) = if ev < 10.0 {
            (1, "Cheap")
        } else if ev < 20.0 {
            (0, "Fair")
        } else {
            (-1, "Expensive")
        };
        signal(&mut signals, weight, format!("EV/EBITDA: {:.1} ({})", ev, label));
    }

    ValuationAssessment::from_signals(signals, notes, peg)
}
