use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdReading {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    pub bullish: bool,
}

/// Moving averages of closing price. `above_*` is `None` when the average is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingAverages {
    pub current_price: f64,
    pub ma_20: Option<f64>,
    pub ma_50: Option<f64>,
    pub ma_200: Option<f64>,
    pub above_50: Option<bool>,
    pub above_200: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupportResistance {
    pub high_52w: f64,
    pub low_52w: f64,
    pub pivot: f64,
    pub immediate_support: f64,
    pub immediate_resistance: f64,
    pub strong_support: f64,
    pub strong_resistance: f64,
    pub distance_from_high_pct: f64,
    pub distance_from_low_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeStats {
    pub current: f64,
    pub avg_10: f64,
    pub avg_20: f64,
    pub ratio: f64,
    pub above_average: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternBias {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CandlePattern {
    Doji,
    Hammer,
    InvertedHammer,
    BullishMarubozu,
    BearishMarubozu,
    BullishEngulfing,
    BearishEngulfing,
}

impl CandlePattern {
    pub fn bias(&self) -> PatternBias {
        match self {
            CandlePattern::Doji => PatternBias::Neutral,
            CandlePattern::Hammer
            | CandlePattern::InvertedHammer
            | CandlePattern::BullishMarubozu
            | CandlePattern::BullishEngulfing => PatternBias::Bullish,
            CandlePattern::BearishMarubozu | CandlePattern::BearishEngulfing => PatternBias::Bearish,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CandlePattern::Doji => "Doji",
            CandlePattern::Hammer => "Hammer",
            CandlePattern::InvertedHammer => "Inverted Hammer",
            CandlePattern::BullishMarubozu => "Bullish Marubozu",
            CandlePattern::BearishMarubozu => "Bearish Marubozu",
            CandlePattern::BullishEngulfing => "Bullish Engulfing",
            CandlePattern::BearishEngulfing => "Bearish Engulfing",
        }
    }
}

impl fmt::Display for CandlePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Up,
    Down,
    Unknown,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trend::Up => "Uptrend",
            Trend::Down => "Downtrend",
            Trend::Unknown => "Unknown",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandleColour {
    Green,
    Red,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandlestickReading {
    pub patterns: BTreeSet<CandlePattern>,
    pub prior_trend: Trend,
    pub last_candle: CandleColour,
}

impl CandlestickReading {
    pub fn has_pattern(&self) -> bool {
        !self.patterns.is_empty()
    }

    pub fn describe(&self) -> String {
        if self.patterns.is_empty() {
            return "No clear pattern".to_string();
        }
        self.patterns
            .iter()
            .map(CandlePattern::name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// `valid` is false when the current price sits at or below immediate support.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskReward {
    pub ratio: f64,
    pub risk_pct: f64,
    pub reward_pct: f64,
    pub valid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSnapshot {
    pub rsi: f64,
    pub macd: MacdReading,
    pub mfi: f64,
    pub moving_averages: MovingAverages,
    pub support_resistance: SupportResistance,
    pub volume: VolumeStats,
    pub candlestick: CandlestickReading,
    pub risk_reward: RiskReward,
}

impl TechnicalSnapshot {
    pub fn current_price(&self) -> f64 {
        self.moving_averages.current_price
    }
}
