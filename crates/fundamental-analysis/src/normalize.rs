//! Percent-versus-fraction normalization for primary-provider fields.
//!
//! The primary provider mixes conventions: some fields arrive as fractions
//! (0.15), some as percentages (15), and debt/equity arrives as a percentage
//! (45 meaning 0.45). These heuristics tell them apart by magnitude alone, so
//! values near a threshold are inherently ambiguous. The thresholds are kept
//! exactly as calibrated against observed provider output.

use analysis_core::round_to;

/// Raw debt/equity above this is a percentage and gets divided by 100.
pub const DEBT_EQUITY_PERCENT_ABOVE: f64 = 10.0;

/// Ratios with absolute value under this are fractions and get scaled ×100.
pub const FRACTION_BELOW: f64 = 5.0;

/// Dividend yield under this is a fraction.
pub const DIVIDEND_FRACTION_BELOW: f64 = 0.20;

/// Dividend yield at or above this is implausible and dropped.
pub const DIVIDEND_IMPLAUSIBLE_FROM: f64 = 20.0;

/// Insider holding under this is a fraction.
pub const HOLDING_FRACTION_BELOW: f64 = 2.0;

/// Debt/equity as a plain ratio.
pub fn debt_to_equity(raw: f64) -> f64 {
    if raw > DEBT_EQUITY_PERCENT_ABOVE {
        round_to(raw / 100.0, 2)
    } else {
        raw
    }
}

/// ROE, ROA, margins and growth rates on a 0-100 scale.
pub fn ratio_percent(raw: f64) -> f64 {
    if raw.abs() < FRACTION_BELOW {
        round_to(raw * 100.0, 2)
    } else {
        raw
    }
}

/// Dividend yield on a 0-100 scale, or `None` when the value is implausible.
pub fn dividend_yield(raw: f64) -> Option<f64> {
    if raw < DIVIDEND_FRACTION_BELOW {
        Some(round_to(raw * 100.0, 2))
    } else if raw < DIVIDEND_IMPLAUSIBLE_FROM {
        Some(round_to(raw, 2))
    } else {
        None
    }
}

/// Insider holding on a 0-100 scale.
pub fn holding_percent(raw: f64) -> f64 {
    if raw < HOLDING_FRACTION_BELOW {
        round_to(raw * 100.0, 2)
    } else {
        raw
    }
}
