use analysis_core::{AnalysisError, PriceHistoryProvider, PriceSeries, Symbol, MIN_SESSIONS};
use chrono::Utc;
use std::sync::Arc;

/// Trailing window a resolved series must cover.
pub const LOOKBACK_DAYS: i64 = 365;

/// Listings to try, in order. Qualified symbols and indices are tried as given;
/// bare tickers are tried bare, then on each domestic exchange.
pub fn candidates(symbol: &str) -> Vec<String> {
    let s = symbol.trim().to_uppercase();
    if s.contains(".NS") || s.contains(".BO") || s.contains('^') || s.contains('.') {
        vec![s]
    } else {
        vec![s.clone(), format!("{}.NS", s), format!("{}.BO", s)]
    }
}

pub struct SymbolResolver {
    prices: Arc<dyn PriceHistoryProvider>,
}

impl SymbolResolver {
    pub fn new(prices: Arc<dyn PriceHistoryProvider>) -> Self {
        Self { prices }
    }

    /// First candidate with at least [`MIN_SESSIONS`] sessions in the trailing year.
    pub async fn resolve(&self, symbol: &str) -> Result<PriceSeries, AnalysisError> {
        for candidate in candidates(symbol) {
            let history = match self.prices.fetch_history(&candidate).await {
                Ok(history) => history,
                Err(e) => {
                    tracing::debug!("No history for {}: {}", candidate, e);
                    continue;
                }
            };

            let series = PriceSeries::new(Symbol::new(&candidate), history.bars, history.meta)
                .trailing(Utc::now(), LOOKBACK_DAYS);
            if series.is_usable() {
                tracing::info!("Resolved {} to {} ({} sessions)", symbol, candidate, series.len());
                return Ok(series);
            }
            tracing::debug!("{} has only {} sessions", candidate, series.len());
        }

        Err(AnalysisError::InsufficientData(format!(
            "no listing of {} has {} sessions in the last {} days",
            symbol.trim().to_uppercase(),
            MIN_SESSIONS,
            LOOKBACK_DAYS
        )))
    }
}
