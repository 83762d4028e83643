//! Final decision table over the three gates and the red-flag report.

use analysis_core::{
    ChecklistResult, Confidence, RedFlagReport, SupportResistance, TradeSetup, ValuationAssessment,
    ValuationVerdict, Verdict, VerdictKind,
};

/// Normalized fundamental score needed for a high-confidence buy.
pub const HIGH_CONVICTION_FUNDAMENTAL: f64 = 8.0;
/// Technical score needed for a high-confidence buy.
pub const HIGH_CONVICTION_TECHNICAL: usize = 6;
/// Technical score at which a failed timing gate still allows accumulation.
pub const ACCUMULATE_TECHNICAL: usize = 4;
/// Technical score at which cheap-but-weak names are worth researching.
pub const RESEARCH_TECHNICAL: usize = 5;

pub const HIGH_CONVICTION_POSITION: u8 = 8;
pub const STANDARD_POSITION: u8 = 5;
pub const ACCUMULATE_POSITION: u8 = 4;

fn verdict(kind: VerdictKind, confidence: Confidence, action: String, position_pct: u8) -> Verdict {
    Verdict { kind, confidence, action, position_pct, trade_setup: None }
}

/// Pure function of its inputs; `levels` and `current_price` only shape the
/// action text and trade setup.
pub fn synthesize(
    fundamental: &ChecklistResult,
    valuation: &ValuationAssessment,
    technical: &ChecklistResult,
    red_flags: &RedFlagReport,
    levels: &SupportResistance,
    current_price: f64,
) -> Verdict {
    let g1 = fundamental.passed();
    let g2 = valuation.passed();
    let g3 = technical.passed();
    let tech_score = technical.score;
    let support = levels.immediate_support;

    let mut out = if red_flags.critical {
        let reasons: Vec<String> = red_flags.flags.iter().take(2).map(ToString::to_string).collect();
        verdict(
            VerdictKind::Avoid,
            Confidence::High,
            format!("Critical red flags: {}", reasons.join("; ")),
            0,
        )
    } else if g1 && g2 && g3 {
        let fair_or_cheap = matches!(valuation.verdict, ValuationVerdict::Cheap | ValuationVerdict::Fair);
        if fundamental.normalized >= HIGH_CONVICTION_FUNDAMENTAL
            && tech_score >= HIGH_CONVICTION_TECHNICAL
            && fair_or_cheap
        {
            verdict(
                VerdictKind::Buy,
                Confidence::High,
                format!("Strong setup. Enter at {:.2}, SL at {:.2}", current_price, support),
                HIGH_CONVICTION_POSITION,
            )
        } else {
            verdict(
                VerdictKind::Buy,
                Confidence::Medium,
                format!("Enter on dip to {:.2}", support),
                STANDARD_POSITION,
            )
        }
    } else if g1 && g2 {
        if tech_score >= ACCUMULATE_TECHNICAL {
            verdict(
                VerdictKind::Accumulate,
                Confidence::Medium,
                format!("Fundamentally strong. Accumulate on dips near {:.2}", support),
                ACCUMULATE_POSITION,
            )
        } else {
            verdict(
                VerdictKind::Wait,
                Confidence::Low,
                "Good business but poor timing. Wait for technical setup.".to_string(),
                0,
            )
        }
    } else if g1 {
        verdict(
            VerdictKind::Wait,
            Confidence::Medium,
            format!("Quality stock but {} valuation. Wait for correction.", valuation.verdict),
            0,
        )
    } else if g2 {
        if tech_score >= RESEARCH_TECHNICAL {
            verdict(
                VerdictKind::Wait,
                Confidence::Low,
                "Cheap valuation but weak fundamentals. Needs more research.".to_string(),
                0,
            )
        } else {
            verdict(
                VerdictKind::Avoid,
                Confidence::Medium,
                format!(
                    "Weak fundamentals ({}/{} criteria). Cheap for a reason.",
                    fundamental.score, fundamental.assessed
                ),
                0,
            )
        }
    } else if g3 {
        verdict(
            VerdictKind::Skip,
            Confidence::High,
            "Only technical signals, no fundamental/valuation support.".to_string(),
            0,
        )
    } else {
        let failed: Vec<&str> = [(g1, "Quality"), (g2, "Valuation"), (g3, "Timing")]
            .iter()
            .filter(|(passed, _)| !passed)
            .map(|(_, name)| *name)
            .collect();
        verdict(
            VerdictKind::Avoid,
            Confidence::High,
            format!("Failed gates: {}", failed.join(", ")),
            0,
        )
    };

    if out.kind.carries_trade() {
        let entry = if out.kind == VerdictKind::Buy && out.confidence == Confidence::High {
            current_price
        } else {
            support
        };
        out.trade_setup = Some(TradeSetup {
            entry,
            stoploss: levels.strong_support,
            target_1: levels.immediate_resistance,
            target_2: levels.strong_resistance,
            target_3: levels.high_52w,
            position_pct: out.position_pct,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{Criterion, CriterionStatus, RedFlag, ValuationSignal};

    fn checklist(score: usize, assessed: usize, total: usize, gate_pass: Option<bool>) -> ChecklistResult {
        let criteria: Vec<Criterion> = (0..total)
            .map(|i| {
                let status = if i < score {
                    CriterionStatus::Pass
                } else if i < assessed {
                    CriterionStatus::Fail
                } else {
                    CriterionStatus::NotAssessed
                };
                Criterion::new(&format!("c{}", i), status, "")
            })
            .collect();
        ChecklistResult::tally(criteria, total, |_, _| gate_pass)
    }

    fn valuation(weight: i32) -> ValuationAssessment {
        ValuationAssessment::from_signals(
            vec![ValuationSignal { description: "lens".into(), weight }],
            Vec::new(),
            None,
        )
    }

    fn levels() -> SupportResistance {
        SupportResistance {
            high_52w: 150.0,
            low_52w: 80.0,
            pivot: 101.0,
            immediate_support: 97.0,
            immediate_resistance: 108.0,
            strong_support: 92.0,
            strong_resistance: 115.0,
            distance_from_high_pct: 33.33,
            distance_from_low_pct: 25.0,
        }
    }

    fn run(g1: ChecklistResult, g2: ValuationAssessment, g3: ChecklistResult, flags: RedFlagReport) -> Verdict {
        synthesize(&g1, &g2, &g3, &flags, &levels(), 100.0)
    }

    #[test]
    fn test_high_conviction_buy() {
        let v = run(checklist(9, 10, 10, Some(true)), valuation(1), checklist(7, 7, 7, Some(true)), RedFlagReport::default());
        assert_eq!((v.kind, v.confidence, v.position_pct), (VerdictKind::Buy, Confidence::High, 8));
        let setup = v.trade_setup.unwrap();
        assert_eq!(setup.entry, 100.0);
        assert_eq!(setup.stoploss, 92.0);
        assert_eq!((setup.target_1, setup.target_2, setup.target_3), (108.0, 115.0, 150.0));
        assert_eq!(v.action, "Strong setup. Enter at 100.00, SL at 97.00");
    }

    #[test]
    fn test_medium_buy_enters_at_support() {
        let v = run(checklist(7, 10, 10, Some(true)), valuation(1), checklist(7, 7, 7, Some(true)), RedFlagReport::default());
        assert_eq!((v.kind, v.confidence, v.position_pct), (VerdictKind::Buy, Confidence::Medium, 5));
        assert_eq!(v.trade_setup.unwrap().entry, 97.0);
    }

    #[test]
    fn test_critical_flag_overrides_everything() {
        let flags = RedFlagReport::new(vec![RedFlag::ExtremeDebt { de_ratio: 4.0 }]);
        let v = run(checklist(10, 10, 10, Some(true)), valuation(3), checklist(7, 7, 7, Some(true)), flags);
        assert_eq!((v.kind, v.confidence), (VerdictKind::Avoid, Confidence::High));
        assert_eq!(v.action, "Critical red flags: Extreme Debt/Equity: 4.00 (>3x)");
        assert!(v.trade_setup.is_none());
    }

    #[test]
    fn test_accumulate_or_wait_when_timing_fails() {
        let v = run(checklist(8, 10, 10, Some(true)), valuation(0), checklist(4, 7, 7, Some(false)), RedFlagReport::default());
        assert_eq!((v.kind, v.position_pct), (VerdictKind::Accumulate, 4));
        assert_eq!(v.trade_setup.unwrap().entry, 97.0);

        let v = run(checklist(8, 10, 10, Some(true)), valuation(0), checklist(3, 7, 7, Some(false)), RedFlagReport::default());
        assert_eq!((v.kind, v.confidence), (VerdictKind::Wait, Confidence::Low));
        assert!(v.trade_setup.is_none());
    }

    #[test]
    fn test_quality_but_rich() {
        let v = run(checklist(8, 10, 10, Some(true)), valuation(-1), checklist(7, 7, 7, Some(true)), RedFlagReport::default());
        assert_eq!((v.kind, v.confidence), (VerdictKind::Wait, Confidence::Medium));
        assert_eq!(v.action, "Quality stock but RICH valuation. Wait for correction.");
    }

    #[test]
    fn test_cheap_but_weak() {
        let v = run(checklist(2, 8, 10, Some(false)), valuation(3), checklist(5, 7, 7, Some(true)), RedFlagReport::default());
        assert_eq!((v.kind, v.confidence), (VerdictKind::Wait, Confidence::Low));

        let v = run(checklist(2, 8, 10, Some(false)), valuation(3), checklist(4, 7, 7, Some(false)), RedFlagReport::default());
        assert_eq!((v.kind, v.confidence), (VerdictKind::Avoid, Confidence::Medium));
        assert_eq!(v.action, "Weak fundamentals (2/8 criteria). Cheap for a reason.");
    }

    #[test]
    fn test_only_timing_passes() {
        let v = run(checklist(2, 8, 10, Some(false)), valuation(-3), checklist(6, 7, 7, Some(true)), RedFlagReport::default());
        assert_eq!((v.kind, v.confidence), (VerdictKind::Skip, Confidence::High));
    }

    #[test]
    fn test_nothing_passes_lists_failed_gates() {
        let v = run(checklist(0, 0, 10, None), valuation(-3), checklist(2, 7, 7, Some(false)), RedFlagReport::default());
        assert_eq!((v.kind, v.confidence), (VerdictKind::Avoid, Confidence::High));
        assert_eq!(v.action, "Failed gates: Quality, Valuation, Timing");
    }

    #[test]
    fn test_only_buy_and_accumulate_carry_setups() {
        let cases = [
            run(checklist(9, 10, 10, Some(true)), valuation(1), checklist(7, 7, 7, Some(true)), RedFlagReport::default()),
            run(checklist(8, 10, 10, Some(true)), valuation(0), checklist(4, 7, 7, Some(false)), RedFlagReport::default()),
            run(checklist(8, 10, 10, Some(true)), valuation(-1), checklist(7, 7, 7, Some(true)), RedFlagReport::default()),
            run(checklist(2, 8, 10, Some(false)), valuation(-3), checklist(6, 7, 7, Some(true)), RedFlagReport::default()),
        ];
        for v in cases {
            assert_eq!(v.trade_setup.is_some(), v.kind.carries_trade());
        }
    }
}
