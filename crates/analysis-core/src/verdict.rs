use crate::{
    ChecklistResult, FundamentalSnapshot, RedFlagReport, SectorCategory, Symbol, TechnicalSnapshot,
    ValuationAssessment,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictKind {
    Buy,
    Accumulate,
    Wait,
    Avoid,
    Skip,
}

impl VerdictKind {
    pub const ALL: [VerdictKind; 5] = [
        VerdictKind::Buy,
        VerdictKind::Accumulate,
        VerdictKind::Wait,
        VerdictKind::Avoid,
        VerdictKind::Skip,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictKind::Buy => "BUY",
            VerdictKind::Accumulate => "ACCUMULATE",
            VerdictKind::Wait => "WAIT",
            VerdictKind::Avoid => "AVOID",
            VerdictKind::Skip => "SKIP",
        }
    }

    pub fn carries_trade(&self) -> bool {
        matches!(self, VerdictKind::Buy | VerdictKind::Accumulate)
    }
}

impl fmt::Display for VerdictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Confidence::High => "HIGH",
            Confidence::Medium => "MEDIUM",
            Confidence::Low => "LOW",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeSetup {
    pub entry: f64,
    pub stoploss: f64,
    pub target_1: f64,
    pub target_2: f64,
    pub target_3: f64,
    pub position_pct: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub kind: VerdictKind,
    pub confidence: Confidence,
    pub action: String,
    pub position_pct: u8,
    pub trade_setup: Option<TradeSetup>,
}

/// Everything produced by one analysis run. Re-analysis builds a new value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub symbol: Symbol,
    pub timestamp: DateTime<Utc>,
    pub sector: SectorCategory,
    pub fundamentals: FundamentalSnapshot,
    pub fundamental_gate: ChecklistResult,
    pub valuation: ValuationAssessment,
    pub red_flags: RedFlagReport,
    pub technical: TechnicalSnapshot,
    pub technical_gate: ChecklistResult,
    pub verdict: Verdict,
}
