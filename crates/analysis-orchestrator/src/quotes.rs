//! Last-price lookups for watchlists and dashboards. The gates never read from here.

use analysis_core::{PriceHistoryProvider, QuoteCache, QuoteProvider};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_QUOTE_TTL: Duration = Duration::from_secs(30);

struct CacheEntry {
    price: f64,
    cached_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_fresh(&self) -> bool {
        self.cached_at.elapsed() < self.ttl
    }
}

/// Concurrent map with per-entry expiry. Stale entries are evicted on read.
#[derive(Default)]
pub struct InMemoryQuoteCache {
    entries: DashMap<String, CacheEntry>,
}

impl InMemoryQuoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl QuoteCache for InMemoryQuoteCache {
    fn get(&self, symbol: &str) -> Option<f64> {
        if let Some(entry) = self.entries.get(symbol) {
            if entry.is_fresh() {
                return Some(entry.price);
            }
        }
        self.entries.remove_if(symbol, |_, entry| !entry.is_fresh());
        None
    }

    fn set(&self, symbol: &str, price: f64, ttl: Duration) {
        self.entries.insert(
            symbol.to_string(),
            CacheEntry { price, cached_at: Instant::now(), ttl },
        );
    }
}

/// Broker instrument for a domestic listing, e.g. `INFY.NS` -> `NSE:INFY`.
pub fn broker_instrument(symbol: &str) -> Option<String> {
    if let Some(base) = symbol.strip_suffix(".NS") {
        Some(format!("NSE:{}", base))
    } else {
        symbol.strip_suffix(".BO").map(|base| format!("BSE:{}", base))
    }
}

pub struct QuoteService {
    cache: Arc<dyn QuoteCache>,
    broker: Option<Arc<dyn QuoteProvider>>,
    prices: Arc<dyn PriceHistoryProvider>,
    ttl: Duration,
}

impl QuoteService {
    pub fn new(
        cache: Arc<dyn QuoteCache>,
        broker: Option<Arc<dyn QuoteProvider>>,
        prices: Arc<dyn PriceHistoryProvider>,
        ttl: Duration,
    ) -> Self {
        Self { cache, broker, prices, ttl }
    }

    /// Symbols that no source can price are left out of the result.
    pub async fn last_prices(&self, symbols: &[String]) -> HashMap<String, f64> {
        let mut found = HashMap::new();
        let mut missing = Vec::new();

        for symbol in symbols {
            match self.cache.get(symbol) {
                Some(price) => {
                    tracing::debug!("Quote cache hit for {}", symbol);
                    found.insert(symbol.clone(), price);
                }
                None => missing.push(symbol.clone()),
            }
        }
        if missing.is_empty() {
            return found;
        }

        let mut fresh = HashMap::new();

        if let Some(broker) = &self.broker {
            let mapped: HashMap<String, String> = missing
                .iter()
                .filter_map(|s| broker_instrument(s).map(|instrument| (instrument, s.clone())))
                .collect();
            if !mapped.is_empty() {
                let instruments: Vec<String> = mapped.keys().cloned().collect();
                match broker.last_prices(&instruments).await {
                    Ok(quotes) => {
                        for (instrument, price) in quotes {
                            if let Some(symbol) = mapped.get(&instrument) {
                                fresh.insert(symbol.clone(), price);
                            }
                        }
                    }
                    Err(e) => tracing::warn!("Broker quotes unavailable: {}", e),
                }
            }
        }

        for symbol in missing.iter() {
            if fresh.contains_key(symbol) {
                continue;
            }
            match self.prices.fetch_history(symbol).await {
                Ok(history) => match history.bars.last() {
                    Some(bar) => {
                        fresh.insert(symbol.clone(), bar.close);
                    }
                    None => tracing::warn!("No bars to price {}", symbol),
                },
                Err(e) => tracing::warn!("Failed to price {}: {}", symbol, e),
            }
        }

        for (symbol, price) in fresh {
            self.cache.set(&symbol, price, self.ttl);
            found.insert(symbol, price);
        }
        found
    }
}
