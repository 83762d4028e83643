use analysis_core::{round_to, Bar, MovingAverages, RiskReward, SupportResistance, VolumeStats};

/// Simple Moving Average
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - period + 1);
    for i in period - 1..data.len() {
        let sum: f64 = data[i + 1 - period..=i].iter().sum();
        result.push(sum / period as f64);
    }
    result
}

/// Exponential Moving Average, recursive form seeded with the first observation.
///
/// Output has the same length as the input.
pub fn ema(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.is_empty() {
        return vec![];
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut result = Vec::with_capacity(data.len());
    result.push(data[0]);

    for i in 1..data.len() {
        let prev = result[i - 1];
        result.push(alpha * data[i] + (1.0 - alpha) * prev);
    }

    result
}

/// Map average gain/loss to the 0-100 oscillator scale.
///
/// A window with no losses reads 100 when there were gains and 50 when price
/// did not move at all.
fn oscillator(gain: f64, loss: f64) -> f64 {
    if loss == 0.0 {
        return if gain > 0.0 { 100.0 } else { 50.0 };
    }
    100.0 - 100.0 / (1.0 + gain / loss)
}

/// Relative Strength Index over rolling `period`-session means of gains and losses.
///
/// One value per complete window, oldest first.
pub fn rsi(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period + 1 {
        return vec![];
    }

    let mut gains = Vec::with_capacity(data.len() - 1);
    let mut losses = Vec::with_capacity(data.len() - 1);

    for i in 1..data.len() {
        let change = data[i] - data[i - 1];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(change.abs());
        }
    }

    gains
        .windows(period)
        .zip(losses.windows(period))
        .map(|(g, l)| {
            let avg_gain = g.iter().sum::<f64>() / period as f64;
            let avg_loss = l.iter().sum::<f64>() / period as f64;
            oscillator(avg_gain, avg_loss)
        })
        .collect()
}

/// MACD (Moving Average Convergence Divergence)
pub struct MacdResult {
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl MacdResult {
    /// Latest (macd, signal, histogram), if any.
    pub fn last(&self) -> Option<(f64, f64, f64)> {
        Some((
            *self.macd_line.last()?,
            *self.signal_line.last()?,
            *self.histogram.last()?,
        ))
    }
}

pub fn macd(data: &[f64], fast_period: usize, slow_period: usize, signal_period: usize) -> MacdResult {
    if fast_period == 0 || slow_period == 0 || signal_period == 0 || slow_period < fast_period {
        return MacdResult { macd_line: vec![], signal_line: vec![], histogram: vec![] };
    }

    let ema_fast = ema(data, fast_period);
    let ema_slow = ema(data, slow_period);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(ema_slow.iter())
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema(&macd_line, signal_period);
    let histogram = macd_line
        .iter()
        .zip(signal_line.iter())
        .map(|(m, s)| m - s)
        .collect();

    MacdResult {
        macd_line,
        signal_line,
        histogram,
    }
}

/// Money Flow Index: volume-weighted RSI over typical price.
pub fn mfi(bars: &[Bar], period: usize) -> Vec<f64> {
    if period == 0 || bars.len() < period + 1 {
        return vec![];
    }

    let typical: Vec<f64> = bars.iter().map(|b| (b.high + b.low + b.close) / 3.0).collect();
    let mut positive = Vec::with_capacity(bars.len() - 1);
    let mut negative = Vec::with_capacity(bars.len() - 1);

    for i in 1..bars.len() {
        let flow = typical[i] * bars[i].volume;
        let delta = typical[i] - typical[i - 1];
        positive.push(if delta > 0.0 { flow } else { 0.0 });
        negative.push(if delta < 0.0 { flow } else { 0.0 });
    }

    positive
        .windows(period)
        .zip(negative.windows(period))
        .map(|(p, n)| oscillator(p.iter().sum(), n.iter().sum()))
        .collect()
}

/// 20/50/200-session averages of close with above/below flags.
///
/// An average needs a full window; the flags compare unrounded values.
pub fn moving_averages(closes: &[f64]) -> Option<MovingAverages> {
    let current = *closes.last()?;
    let latest = |period: usize| sma(closes, period).last().copied();

    let ma_20 = latest(20);
    let ma_50 = latest(50);
    let ma_200 = latest(200);

    Some(MovingAverages {
        current_price: round_to(current, 2),
        ma_20: ma_20.map(|v| round_to(v, 2)),
        ma_50: ma_50.map(|v| round_to(v, 2)),
        ma_200: ma_200.map(|v| round_to(v, 2)),
        above_50: ma_50.map(|ma| current > ma),
        above_200: ma_200.map(|ma| current > ma),
    })
}

/// Classic pivot levels over the trailing `lookback` sessions, plus the
/// high/low of the whole series.
pub fn pivot_levels(bars: &[Bar], lookback: usize) -> Option<SupportResistance> {
    let last = bars.last()?;
    let recent = &bars[bars.len().saturating_sub(lookback.max(1))..];

    let high_52w = bars.iter().map(|b| b.high).fold(f64::MIN, f64::max);
    let low_52w = bars.iter().map(|b| b.low).fold(f64::MAX, f64::min);
    let recent_high = recent.iter().map(|b| b.high).fold(f64::MIN, f64::max);
    let recent_low = recent.iter().map(|b| b.low).fold(f64::MAX, f64::min);
    let current = last.close;

    let pivot = (recent_high + recent_low + current) / 3.0;
    let range = recent_high - recent_low;

    let pct = |num: f64, den: f64| if den != 0.0 { round_to(num / den * 100.0, 2) } else { 0.0 };

    Some(SupportResistance {
        high_52w: round_to(high_52w, 2),
        low_52w: round_to(low_52w, 2),
        pivot: round_to(pivot, 2),
        immediate_support: round_to(2.0 * pivot - recent_high, 2),
        immediate_resistance: round_to(2.0 * pivot - recent_low, 2),
        strong_support: round_to(pivot - range, 2),
        strong_resistance: round_to(pivot + range, 2),
        distance_from_high_pct: pct(high_52w - current, current),
        distance_from_low_pct: pct(current - low_52w, low_52w),
    })
}

/// Latest volume against its trailing 10- and 20-session means.
pub fn volume_stats(bars: &[Bar]) -> Option<VolumeStats> {
    let current = bars.last()?.volume;
    let mean_tail = |n: usize| {
        let tail = &bars[bars.len().saturating_sub(n)..];
        tail.iter().map(|b| b.volume).sum::<f64>() / tail.len() as f64
    };
    let avg_10 = mean_tail(10);
    let avg_20 = mean_tail(20);

    Some(VolumeStats {
        current,
        avg_10: avg_10.trunc(),
        avg_20: avg_20.trunc(),
        ratio: if avg_10 > 0.0 { round_to(current / avg_10, 2) } else { 0.0 },
        above_average: current >= avg_10,
    })
}

/// Reward over risk, measured from `current` to resistance and support.
pub fn risk_reward(current: f64, support: f64, resistance: f64) -> RiskReward {
    let risk = current - support;
    let reward = resistance - current;

    if risk <= 0.0 || current <= 0.0 {
        return RiskReward {
            ratio: 0.0,
            risk_pct: 0.0,
            reward_pct: 0.0,
            valid: false,
        };
    }

    RiskReward {
        ratio: round_to(reward / risk, 2),
        risk_pct: round_to(risk / current * 100.0, 2),
        reward_pct: round_to(reward / current * 100.0, 2),
        valid: true,
    }
}
