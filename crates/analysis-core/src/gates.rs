use crate::HolderKind;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectorCategory {
    Banking,
    Nbfc,
    General,
}

impl SectorCategory {
    /// Lenders get the banking rubric and are exempt from the leverage and cash-flow flags.
    pub fn is_financial(&self) -> bool {
        matches!(self, SectorCategory::Banking | SectorCategory::Nbfc)
    }
}

impl fmt::Display for SectorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SectorCategory::Banking => "BANKING",
            SectorCategory::Nbfc => "NBFC",
            SectorCategory::General => "GENERAL",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionStatus {
    Pass,
    Fail,
    NotAssessed,
}

impl CriterionStatus {
    pub fn from_bool(passed: bool) -> Self {
        if passed {
            CriterionStatus::Pass
        } else {
            CriterionStatus::Fail
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CriterionStatus::Pass => "PASS",
            CriterionStatus::Fail => "FAIL",
            CriterionStatus::NotAssessed => " N/A",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub name: String,
    pub status: CriterionStatus,
    pub detail: String,
}

impl Criterion {
    pub fn new(name: &str, status: CriterionStatus, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            detail: detail.into(),
        }
    }

    pub fn not_assessed(name: &str, detail: impl Into<String>) -> Self {
        Self::new(name, CriterionStatus::NotAssessed, detail)
    }
}

/// Ordered criteria of one checklist gate plus the tallies derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistResult {
    pub criteria: Vec<Criterion>,
    pub score: usize,
    pub assessed: usize,
    pub total: usize,
    pub normalized: f64,
    pub gate_pass: Option<bool>,
}

impl ChecklistResult {
    /// Tally `criteria` and decide the gate with `rule(score, assessed)`.
    /// `total` is the rubric size, which never varies with data availability.
    pub fn tally<F>(criteria: Vec<Criterion>, total: usize, rule: F) -> Self
    where
        F: Fn(usize, usize) -> Option<bool>,
    {
        let score = criteria
            .iter()
            .filter(|c| c.status == CriterionStatus::Pass)
            .count();
        let assessed = criteria
            .iter()
            .filter(|c| c.status != CriterionStatus::NotAssessed)
            .count();
        let normalized = if assessed > 0 {
            crate::round_to(score as f64 / assessed as f64 * 10.0, 1)
        } else {
            0.0
        };

        Self {
            criteria,
            score,
            assessed,
            total,
            normalized,
            gate_pass: rule(score, assessed),
        }
    }

    pub fn passed(&self) -> bool {
        self.gate_pass.unwrap_or(false)
    }

    pub fn pass_rate(&self) -> f64 {
        crate::round_to(self.score as f64 / self.assessed.max(1) as f64 * 100.0, 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValuationVerdict {
    Cheap,
    Fair,
    Rich,
    Extreme,
    NotAvailable,
}

impl ValuationVerdict {
    /// Verdict depends only on the summed lens weights.
    pub fn from_score(sum: i32) -> Self {
        if sum >= 3 {
            ValuationVerdict::Cheap
        } else if sum >= 0 {
            ValuationVerdict::Fair
        } else if sum >= -2 {
            ValuationVerdict::Rich
        } else {
            ValuationVerdict::Extreme
        }
    }

    pub fn gate_pass(&self) -> Option<bool> {
        match self {
            ValuationVerdict::Cheap | ValuationVerdict::Fair => Some(true),
            ValuationVerdict::Rich | ValuationVerdict::Extreme => Some(false),
            ValuationVerdict::NotAvailable => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValuationVerdict::Cheap => "CHEAP",
            ValuationVerdict::Fair => "FAIR",
            ValuationVerdict::Rich => "RICH",
            ValuationVerdict::Extreme => "EXTREME",
            ValuationVerdict::NotAvailable => "N/A",
        }
    }
}

impl fmt::Display for ValuationVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationSignal {
    pub description: String,
    pub weight: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationAssessment {
    pub signals: Vec<ValuationSignal>,
    /// Observations that carry no weight (e.g. P/B without ROE).
    pub notes: Vec<String>,
    pub score_sum: i32,
    pub peg: Option<f64>,
    pub verdict: ValuationVerdict,
    pub gate_pass: Option<bool>,
}

impl ValuationAssessment {
    pub fn from_signals(signals: Vec<ValuationSignal>, notes: Vec<String>, peg: Option<f64>) -> Self {
        if signals.is_empty() {
            return Self {
                signals,
                notes,
                score_sum: 0,
                peg,
                verdict: ValuationVerdict::NotAvailable,
                gate_pass: None,
            };
        }

        let score_sum = signals.iter().map(|s| s.weight).sum();
        let verdict = ValuationVerdict::from_score(score_sum);
        Self {
            signals,
            notes,
            score_sum,
            peg,
            verdict,
            gate_pass: verdict.gate_pass(),
        }
    }

    pub fn passed(&self) -> bool {
        self.gate_pass.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RedFlag {
    NegativeOperatingCashFlow { ocf: f64 },
    ExtremeDebt { de_ratio: f64 },
    NegativeRoe { roe: f64 },
    LowControllingHolding { holding: f64, holder: HolderKind },
}

impl RedFlag {
    pub fn is_critical(&self) -> bool {
        matches!(self, RedFlag::ExtremeDebt { .. } | RedFlag::NegativeRoe { .. })
    }
}

impl fmt::Display for RedFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedFlag::NegativeOperatingCashFlow { ocf } => {
                write!(f, "Negative Operating Cash Flow: {:.0} Cr", ocf / 1e7)
            }
            RedFlag::ExtremeDebt { de_ratio } => write!(f, "Extreme Debt/Equity: {:.2} (>3x)", de_ratio),
            RedFlag::NegativeRoe { roe } => write!(f, "Negative ROE: {:.1}%", roe),
            RedFlag::LowControllingHolding { holding, holder } => {
                write!(f, "Very low {} holding: {:.1}%", holder.label(), holding)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedFlagReport {
    pub flags: Vec<RedFlag>,
    pub critical: bool,
}

impl RedFlagReport {
    pub fn new(flags: Vec<RedFlag>) -> Self {
        let critical = flags.iter().any(RedFlag::is_critical);
        Self { flags, critical }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria(statuses: &[CriterionStatus]) -> Vec<Criterion> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, s)| Criterion::new(&format!("c{}", i), *s, ""))
            .collect()
    }

    #[test]
    fn test_tally_counts() {
        use CriterionStatus::*;
        let result = ChecklistResult::tally(
            criteria(&[Pass, Fail, NotAssessed, Pass]),
            10,
            |score, _| Some(score >= 2),
        );
        assert_eq!(result.score, 2);
        assert_eq!(result.assessed, 3);
        assert_eq!(result.total, 10);
        assert!((result.normalized - 6.7).abs() < 1e-9);
        assert_eq!(result.gate_pass, Some(true));
    }

    #[test]
    fn test_tally_all_not_assessed() {
        let result = ChecklistResult::tally(
            criteria(&[CriterionStatus::NotAssessed; 3]),
            10,
            |_, assessed| if assessed == 0 { None } else { Some(true) },
        );
        assert_eq!(result.normalized, 0.0);
        assert_eq!(result.pass_rate(), 0.0);
        assert!(!result.passed());
    }

    #[test]
    fn test_verdict_depends_only_on_sum() {
        for sum in -8..8 {
            let a = ValuationAssessment::from_signals(
                vec![ValuationSignal { description: "a".into(), weight: sum }],
                vec![],
                None,
            );
            let b = ValuationAssessment::from_signals(
                vec![
                    ValuationSignal { description: "b".into(), weight: sum - 1 },
                    ValuationSignal { description: "c".into(), weight: 1 },
                ],
                vec![],
                None,
            );
            assert_eq!(a.verdict, b.verdict);
            assert_eq!(a.gate_pass, b.gate_pass);
        }
    }

    #[test]
    fn test_verdict_bands() {
        assert_eq!(ValuationVerdict::from_score(3), ValuationVerdict::Cheap);
        assert_eq!(ValuationVerdict::from_score(0), ValuationVerdict::Fair);
        assert_eq!(ValuationVerdict::from_score(2), ValuationVerdict::Fair);
        assert_eq!(ValuationVerdict::from_score(-1), ValuationVerdict::Rich);
        assert_eq!(ValuationVerdict::from_score(-2), ValuationVerdict::Rich);
        assert_eq!(ValuationVerdict::from_score(-3), ValuationVerdict::Extreme);
    }

    #[test]
    fn test_no_signals_is_not_available() {
        let v = ValuationAssessment::from_signals(vec![], vec!["P/B: 2.00".into()], None);
        assert_eq!(v.verdict, ValuationVerdict::NotAvailable);
        assert_eq!(v.gate_pass, None);
    }

    #[test]
    fn test_red_flag_criticality() {
        let report = RedFlagReport::new(vec![RedFlag::NegativeOperatingCashFlow { ocf: -1e7 }]);
        assert!(!report.critical);

        let report = RedFlagReport::new(vec![
            RedFlag::LowControllingHolding { holding: 5.0, holder: HolderKind::Insider },
            RedFlag::ExtremeDebt { de_ratio: 4.0 },
        ]);
        assert!(report.critical);
        assert_eq!(report.flags[1].to_string(), "Extreme Debt/Equity: 4.00 (>3x)");
    }
}
