use crate::{PriceHistory, PrimaryFundamentals, ProviderError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Daily OHLCV history for roughly the trailing year, keyed by canonical symbol.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    async fn fetch_history(&self, symbol: &str) -> Result<PriceHistory, ProviderError>;
}

/// Broad-market fundamentals as a flat metric mapping.
#[async_trait]
pub trait PrimaryFundamentalsProvider: Send + Sync {
    async fn fetch_fundamentals(&self, symbol: &str) -> Result<PrimaryFundamentals, ProviderError>;
}

/// Raw markup of the domestic company profile page for `slug`.
#[async_trait]
pub trait SecondaryFundamentalsProvider: Send + Sync {
    async fn fetch_company_page(&self, slug: &str) -> Result<String, ProviderError>;
}

/// Read-only broker quotes. Instruments use the broker's `EXCHANGE:TICKER` form.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn last_prices(&self, instruments: &[String]) -> Result<HashMap<String, f64>, ProviderError>;
}

/// Read-through price cache used by quote lookups only.
pub trait QuoteCache: Send + Sync {
    fn get(&self, symbol: &str) -> Option<f64>;
    fn set(&self, symbol: &str, price: f64, ttl: Duration);
}
