use analysis_core::{ChecklistResult, Criterion, CriterionStatus, PatternBias, TechnicalSnapshot, Trend};

pub const TECHNICAL_CRITERIA: usize = 7;
pub const TECHNICAL_PASS_SCORE: usize = 5;
pub const SUPPORT_PROXIMITY_PCT: f64 = 4.0;
pub const MIN_RISK_REWARD: f64 = 1.5;
pub const RSI_OVERBOUGHT: f64 = 70.0;

/// Whether the prior trend sets up the detected patterns.
///
/// Any bullish pattern needs a prior downtrend. Otherwise any bearish pattern
/// needs a prior uptrend. Neutral-only readings pass; no pattern fails.
fn trend_supports_patterns(snap: &TechnicalSnapshot) -> bool {
    let reading = &snap.candlestick;
    if !reading.has_pattern() {
        return false;
    }

    let has = |bias: PatternBias| reading.patterns.iter().any(|p| p.bias() == bias);
    if has(PatternBias::Bullish) {
        reading.prior_trend == Trend::Down
    } else if has(PatternBias::Bearish) {
        reading.prior_trend == Trend::Up
    } else {
        true
    }
}

fn rsi_zone(rsi: f64) -> &'static str {
    if rsi < 30.0 {
        "Oversold"
    } else if rsi > RSI_OVERBOUGHT {
        "Overbought"
    } else {
        "Neutral"
    }
}

fn fmt_flag(flag: Option<bool>) -> &'static str {
    match flag {
        Some(true) => "yes",
        Some(false) => "no",
        None => "N/A",
    }
}

/// Gate 3: seven boolean timing criteria. Passes at five or more.
pub fn technical_checklist(snap: &TechnicalSnapshot) -> ChecklistResult {
    let mut criteria = Vec::with_capacity(TECHNICAL_CRITERIA);
    let current = snap.current_price();

    let has_pattern = snap.candlestick.has_pattern();
    criteria.push(Criterion::new(
        "candlestick",
        CriterionStatus::from_bool(has_pattern),
        snap.candlestick.describe(),
    ));

    let trend_detail = if has_pattern {
        format!("Prior trend: {}", snap.candlestick.prior_trend)
    } else {
        "No pattern to validate".to_string()
    };
    criteria.push(Criterion::new(
        "prior_trend",
        CriterionStatus::from_bool(trend_supports_patterns(snap)),
        trend_detail,
    ));

    let support_dist = if current > 0.0 {
        (current - snap.support_resistance.immediate_support).abs() * 100.0 / current
    } else {
        f64::INFINITY
    };
    criteria.push(Criterion::new(
        "support_proximity",
        CriterionStatus::from_bool(support_dist <= SUPPORT_PROXIMITY_PCT),
        format!("Support {:.1}% away (need <={}%)", support_dist, SUPPORT_PROXIMITY_PCT),
    ));

    criteria.push(Criterion::new(
        "volume",
        CriterionStatus::from_bool(snap.volume.above_average),
        format!("Volume ratio: {}x", snap.volume.ratio),
    ));

    let rrr = &snap.risk_reward;
    criteria.push(Criterion::new(
        "risk_reward",
        CriterionStatus::from_bool(rrr.valid && rrr.ratio >= MIN_RISK_REWARD),
        format!("RRR: {}:1 (need >={}:1)", rrr.ratio, MIN_RISK_REWARD),
    ));

    let indicators_ok = snap.macd.bullish && snap.rsi < RSI_OVERBOUGHT;
    criteria.push(Criterion::new(
        "indicators",
        CriterionStatus::from_bool(indicators_ok),
        format!(
            "RSI: {} ({}), MACD: {}",
            snap.rsi,
            rsi_zone(snap.rsi),
            if snap.macd.bullish { "Bullish" } else { "Bearish" }
        ),
    ));

    let ma = &snap.moving_averages;
    let dow_ok = ma.above_50.unwrap_or(false) && ma.above_200.unwrap_or(true);
    criteria.push(Criterion::new(
        "dow_theory",
        CriterionStatus::from_bool(dow_ok),
        format!(
            "Above 50-DMA: {}, Above 200-DMA: {}",
            fmt_flag(ma.above_50),
            fmt_flag(ma.above_200)
        ),
    ));

    ChecklistResult::tally(criteria, TECHNICAL_CRITERIA, |score, _| Some(score >= TECHNICAL_PASS_SCORE))
}
