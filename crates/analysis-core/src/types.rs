use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum number of sessions a price series needs before any gate runs.
pub const MIN_SESSIONS: usize = 50;

/// Suffixes of the two domestic exchanges.
pub const DOMESTIC_SUFFIXES: [&str; 2] = [".NS", ".BO"];

/// OHLCV bar data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Canonical, exchange-qualified ticker. Always uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Ticker without a domestic exchange suffix.
    pub fn base(&self) -> &str {
        DOMESTIC_SUFFIXES
            .iter()
            .find_map(|suffix| self.0.strip_suffix(suffix))
            .unwrap_or(&self.0)
    }

    pub fn is_domestic(&self) -> bool {
        DOMESTIC_SUFFIXES.iter().any(|s| self.0.ends_with(s))
    }

    pub fn is_index(&self) -> bool {
        self.0.contains('^')
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Basic instrument metadata returned alongside a price history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstrumentMeta {
    pub currency: Option<String>,
    pub exchange: Option<String>,
    pub long_name: Option<String>,
    pub regular_market_price: Option<f64>,
}

/// What a price-history provider hands back for one symbol.
#[derive(Debug, Clone, Default)]
pub struct PriceHistory {
    pub bars: Vec<Bar>,
    pub meta: InstrumentMeta,
}

/// Date-ordered daily sessions for one resolved symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: Symbol,
    bars: Vec<Bar>,
    meta: InstrumentMeta,
}

impl PriceSeries {
    pub fn new(symbol: Symbol, mut bars: Vec<Bar>, meta: InstrumentMeta) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        Self { symbol, bars, meta }
    }

    /// Keep only sessions that fall inside the trailing `days` window ending at `now`.
    pub fn trailing(self, now: DateTime<Utc>, days: i64) -> Self {
        let cutoff = now - Duration::days(days);
        let bars = self.bars.into_iter().filter(|b| b.timestamp >= cutoff).collect();
        Self { bars, ..self }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn meta(&self) -> &InstrumentMeta {
        &self.meta
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn is_usable(&self) -> bool {
        self.bars.len() >= MIN_SESSIONS
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

/// Round to `places` decimals, half away from zero.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(days_ago: i64, close: f64) -> Bar {
        Bar {
            timestamp: Utc::now() - Duration::days(days_ago),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn test_symbol_is_uppercased_and_trimmed() {
        let s = Symbol::new("  tcs.ns ");
        assert_eq!(s.as_str(), "TCS.NS");
        assert_eq!(s.base(), "TCS");
        assert!(s.is_domestic());
        assert!(!s.is_index());
    }

    #[test]
    fn test_symbol_base_keeps_foreign_suffix() {
        let s = Symbol::new("BRK.B");
        assert_eq!(s.base(), "BRK.B");
        assert!(!s.is_domestic());
    }

    #[test]
    fn test_series_sorted_by_date() {
        let series = PriceSeries::new(
            Symbol::new("X"),
            vec![bar(1, 2.0), bar(3, 1.0), bar(0, 3.0)],
            InstrumentMeta::default(),
        );
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.last().map(|b| b.close), Some(3.0));
    }

    #[test]
    fn test_trailing_window_drops_old_sessions() {
        let series = PriceSeries::new(
            Symbol::new("X"),
            vec![bar(400, 1.0), bar(10, 2.0), bar(1, 3.0)],
            InstrumentMeta::default(),
        )
        .trailing(Utc::now(), 365);
        assert_eq!(series.len(), 2);
        assert!(!series.is_usable());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(-0.125, 1), -0.1);
        assert_eq!(round_to(0.5, 0), 1.0);
    }
}
