use analysis_core::{
    AnalysisError, AnalysisResult, PriceHistoryProvider, PrimaryFundamentalsProvider, SecondaryFundamentalsProvider,
};
use chrono::Utc;
use fundamental_analysis::{assess_valuation, classify, detect_red_flags, fundamental_checklist, FundamentalsAggregator};
use std::sync::Arc;
use technical_analysis::{technical_checklist, TechnicalIndicatorEngine};

pub mod batch;
pub mod quotes;
pub mod report;
pub mod resolver;
pub mod verdict;

#[cfg(test)]
mod testing;

pub use batch::{BatchItem, BatchOptions, BatchReport};
pub use quotes::{InMemoryQuoteCache, QuoteService};
pub use report::{format, format_batch};
pub use resolver::SymbolResolver;
pub use verdict::synthesize;

/// Runs the three-gate pipeline for one symbol at a time.
pub struct GateAnalyzer {
    resolver: SymbolResolver,
    fundamentals: FundamentalsAggregator,
    engine: TechnicalIndicatorEngine,
}

impl GateAnalyzer {
    pub fn new(
        prices: Arc<dyn PriceHistoryProvider>,
        primary: Arc<dyn PrimaryFundamentalsProvider>,
        secondary: Option<Arc<dyn SecondaryFundamentalsProvider>>,
    ) -> Self {
        Self {
            resolver: SymbolResolver::new(prices),
            fundamentals: FundamentalsAggregator::new(primary, secondary),
            engine: TechnicalIndicatorEngine::default(),
        }
    }

    pub fn with_engine(mut self, engine: TechnicalIndicatorEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Fails only when no listing of `symbol` has enough price history.
    /// Fundamentals problems degrade to not-assessed criteria instead.
    pub async fn analyze(&self, symbol: &str) -> Result<AnalysisResult, AnalysisError> {
        tracing::info!("Starting 3-gate analysis for {}", symbol);

        let series = self.resolver.resolve(symbol).await?;
        let technical = self.engine.snapshot(series.bars())?;
        let current_price = technical.current_price();

        let fundamentals = self.fundamentals.aggregate(series.symbol(), Some(current_price)).await;
        let sector = classify(fundamentals.sector.as_deref(), fundamentals.industry.as_deref());

        let fundamental_gate = fundamental_checklist(&fundamentals, sector);
        let valuation = assess_valuation(&fundamentals, sector);
        let red_flags = detect_red_flags(&fundamentals, sector);
        let technical_gate = technical_checklist(&technical);

        let verdict = synthesize(
            &fundamental_gate,
            &valuation,
            &technical_gate,
            &red_flags,
            &technical.support_resistance,
            current_price,
        );

        tracing::info!(
            "{}: {} ({}) | fundamental {}/{} | valuation {} | technical {}/{}",
            series.symbol(),
            verdict.kind,
            verdict.confidence,
            fundamental_gate.score,
            fundamental_gate.assessed,
            valuation.verdict,
            technical_gate.score,
            technical_gate.total
        );

        Ok(AnalysisResult {
            symbol: series.symbol().clone(),
            timestamp: Utc::now(),
            sector,
            fundamentals,
            fundamental_gate,
            valuation,
            red_flags,
            technical,
            technical_gate,
            verdict,
        })
    }
}
