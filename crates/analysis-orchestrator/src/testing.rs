//! In-memory providers for orchestrator tests.

use analysis_core::{
    Bar, InstrumentMeta, PriceHistory, PriceHistoryProvider, PrimaryFundamentals, PrimaryFundamentalsProvider,
    ProviderError,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// `n` daily sessions ending today, drifting upward with a small zig-zag.
pub fn bars(n: usize, start: f64) -> Vec<Bar> {
    let now = Utc::now();
    (0..n)
        .map(|i| {
            let wiggle = [0.0, 1.2, -0.8, 0.6, -1.0][i % 5];
            let close = start + i as f64 * 0.3 + wiggle;
            Bar {
                timestamp: now - Duration::days((n - 1 - i) as i64),
                open: close - 0.4,
                high: close + 1.0,
                low: close - 1.2,
                close,
                volume: 1_000_000.0 + (i % 7) as f64 * 50_000.0,
            }
        })
        .collect()
}

#[derive(Default)]
pub struct MockPrices {
    series: HashMap<String, Vec<Bar>>,
    pub calls: AtomicUsize,
}

impl MockPrices {
    pub fn with(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.series.insert(symbol.to_string(), bars);
        self
    }
}

#[async_trait]
impl PriceHistoryProvider for MockPrices {
    async fn fetch_history(&self, symbol: &str) -> Result<PriceHistory, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.series
            .get(symbol)
            .map(|bars| PriceHistory { bars: bars.clone(), meta: InstrumentMeta::default() })
            .ok_or_else(|| ProviderError::NotFound(symbol.to_string()))
    }
}

#[derive(Default)]
pub struct MockPrimary {
    fundamentals: HashMap<String, PrimaryFundamentals>,
}

impl MockPrimary {
    pub fn with(mut self, symbol: &str, values: &[(&str, f64)], industry: Option<&str>) -> Self {
        let fundamentals = PrimaryFundamentals {
            values: values.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            industry: industry.map(String::from),
            ..PrimaryFundamentals::default()
        };
        self.fundamentals.insert(symbol.to_string(), fundamentals);
        self
    }
}

#[async_trait]
impl PrimaryFundamentalsProvider for MockPrimary {
    async fn fetch_fundamentals(&self, symbol: &str) -> Result<PrimaryFundamentals, ProviderError> {
        self.fundamentals
            .get(symbol)
            .cloned()
            .ok_or_else(|| ProviderError::Unavailable(format!("no fundamentals for {}", symbol)))
    }
}
