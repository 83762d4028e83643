use crate::indicators::{macd, mfi, moving_averages, pivot_levels, risk_reward, rsi, volume_stats};
use crate::patterns::detect_patterns;
use analysis_core::{round_to, AnalysisError, Bar, MacdReading, TechnicalSnapshot, MIN_SESSIONS};

/// Builds a [`TechnicalSnapshot`] from a daily price series.
#[derive(Debug, Clone)]
pub struct TechnicalIndicatorEngine {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub mfi_period: usize,
    pub pivot_lookback: usize,
}

impl Default for TechnicalIndicatorEngine {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            mfi_period: 14,
            pivot_lookback: 20,
        }
    }
}

impl TechnicalIndicatorEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self, bars: &[Bar]) -> Result<TechnicalSnapshot, AnalysisError> {
        if bars.len() < MIN_SESSIONS {
            return Err(AnalysisError::InsufficientData(format!(
                "Need at least {} sessions, got {}",
                MIN_SESSIONS,
                bars.len()
            )));
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let insufficient = |what: &str| AnalysisError::InsufficientData(format!("Cannot compute {}", what));

        let rsi_value = rsi(&closes, self.rsi_period)
            .last()
            .copied()
            .ok_or_else(|| insufficient("RSI"))?;

        let macd_result = macd(&closes, self.macd_fast, self.macd_slow, self.macd_signal);
        let (macd_line, signal_line, histogram) = macd_result.last().ok_or_else(|| insufficient("MACD"))?;

        let mfi_value = mfi(bars, self.mfi_period)
            .last()
            .copied()
            .ok_or_else(|| insufficient("MFI"))?;

        let moving_averages = moving_averages(&closes).ok_or_else(|| insufficient("moving averages"))?;
        let support_resistance =
            pivot_levels(bars, self.pivot_lookback).ok_or_else(|| insufficient("pivot levels"))?;
        let volume = volume_stats(bars).ok_or_else(|| insufficient("volume statistics"))?;
        let candlestick = detect_patterns(bars).ok_or_else(|| insufficient("candlestick patterns"))?;

        let risk_reward = risk_reward(
            moving_averages.current_price,
            support_resistance.immediate_support,
            support_resistance.immediate_resistance,
        );

        Ok(TechnicalSnapshot {
            rsi: round_to(rsi_value, 2),
            macd: MacdReading {
                macd: round_to(macd_line, 2),
                signal: round_to(signal_line, 2),
                histogram: round_to(histogram, 2),
                bullish: macd_line > signal_line,
            },
            mfi: round_to(mfi_value, 2),
            moving_averages,
            support_resistance,
            volume,
            candlestick,
            risk_reward,
        })
    }
}
