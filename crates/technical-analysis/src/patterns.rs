use analysis_core::{Bar, CandlePattern, CandleColour, CandlestickReading, Trend};
use std::collections::BTreeSet;

/// Sessions inspected for patterns, and how many of those get single-candle checks.
const PATTERN_WINDOW: usize = 5;
const SINGLE_CANDLE_CHECKS: usize = 3;

/// Sessions back used for the prior-trend comparison.
const TREND_LOOKBACK: usize = 20;

struct Anatomy {
    body: f64,
    upper_shadow: f64,
    lower_shadow: f64,
    range: f64,
}

impl Anatomy {
    fn of(bar: &Bar) -> Self {
        Self {
            body: (bar.close - bar.open).abs(),
            upper_shadow: bar.high - bar.open.max(bar.close),
            lower_shadow: bar.open.min(bar.close) - bar.low,
            range: bar.high - bar.low,
        }
    }
}

fn is_green(bar: &Bar) -> bool {
    bar.close > bar.open
}

fn is_red(bar: &Bar) -> bool {
    bar.close < bar.open
}

/// Classify one candle. Checks run in order and the first match wins.
fn single_candle(bar: &Bar) -> Option<CandlePattern> {
    let a = Anatomy::of(bar);
    if a.range <= 0.0 {
        return None;
    }

    if a.body / a.range < 0.1 {
        Some(CandlePattern::Doji)
    } else if a.lower_shadow > 2.0 * a.body && a.upper_shadow < 0.5 * a.body {
        Some(CandlePattern::Hammer)
    } else if a.upper_shadow > 2.0 * a.body && a.lower_shadow < 0.5 * a.body {
        Some(CandlePattern::InvertedHammer)
    } else if a.body / a.range > 0.9 {
        if is_green(bar) {
            Some(CandlePattern::BullishMarubozu)
        } else {
            Some(CandlePattern::BearishMarubozu)
        }
    } else {
        None
    }
}

/// Two-session engulfing, body against body, strict inequalities.
fn engulfing(prev: &Bar, curr: &Bar) -> Option<CandlePattern> {
    if is_red(prev) && is_green(curr) && curr.open < prev.close && curr.close > prev.open {
        Some(CandlePattern::BullishEngulfing)
    } else if is_green(prev) && is_red(curr) && curr.open > prev.close && curr.close < prev.open {
        Some(CandlePattern::BearishEngulfing)
    } else {
        None
    }
}

/// Trend from the latest close against the close `TREND_LOOKBACK - 1` sessions earlier.
pub fn prior_trend(bars: &[Bar]) -> Trend {
    if bars.len() < TREND_LOOKBACK {
        return Trend::Unknown;
    }
    let latest = bars[bars.len() - 1].close;
    let earlier = bars[bars.len() - TREND_LOOKBACK].close;
    if latest > earlier {
        Trend::Up
    } else {
        Trend::Down
    }
}

/// Detect candlestick patterns over the most recent sessions.
pub fn detect_patterns(bars: &[Bar]) -> Option<CandlestickReading> {
    let last = bars.last()?;
    let recent = &bars[bars.len().saturating_sub(PATTERN_WINDOW)..];
    let mut patterns = BTreeSet::new();

    for bar in &recent[recent.len().saturating_sub(SINGLE_CANDLE_CHECKS)..] {
        if let Some(p) = single_candle(bar) {
            patterns.insert(p);
        }
    }

    if let [.., prev, curr] = recent {
        if let Some(p) = engulfing(prev, curr) {
            patterns.insert(p);
        }
    }

    Some(CandlestickReading {
        patterns,
        prior_trend: prior_trend(bars),
        last_candle: if is_green(last) { CandleColour::Green } else { CandleColour::Red },
    })
}
