use crate::GateAnalyzer;
use analysis_core::{AnalysisError, AnalysisResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Symbols analyzed at the same time.
    pub max_concurrency: usize,
    /// Pause before starting each symbol after the first.
    pub request_delay: Duration,
    /// Checked between symbols; a running analysis always finishes.
    pub cancel: CancellationToken,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            request_delay: Duration::from_millis(500),
            cancel: CancellationToken::new(),
        }
    }
}

#[derive(Debug)]
pub struct BatchItem {
    pub symbol: String,
    pub outcome: Result<AnalysisResult, AnalysisError>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    /// One entry per started symbol, in input order.
    pub items: Vec<BatchItem>,
    /// Symbols never started because the batch was cancelled.
    pub skipped: Vec<String>,
}

impl BatchReport {
    pub fn analyzed(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.items.iter().filter_map(|item| item.outcome.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &AnalysisError)> {
        self.items
            .iter()
            .filter_map(|item| item.outcome.as_ref().err().map(|e| (item.symbol.as_str(), e)))
    }
}

impl GateAnalyzer {
    /// Analyze many symbols with bounded concurrency. One symbol's failure never
    /// affects the others.
    pub async fn batch(self: &Arc<Self>, symbols: &[String], options: BatchOptions) -> BatchReport {
        tracing::info!("Starting 3-gate batch of {} symbols", symbols.len());

        let semaphore = Arc::new(Semaphore::new(options.max_concurrency.max(1)));
        let (tx, mut rx) = mpsc::unbounded_channel::<(usize, Result<AnalysisResult, AnalysisError>)>();
        let mut tasks = JoinSet::new();
        let mut started = 0;

        for (index, symbol) in symbols.iter().enumerate() {
            if index > 0 && !options.request_delay.is_zero() {
                tokio::select! {
                    _ = options.cancel.cancelled() => break,
                    _ = tokio::time::sleep(options.request_delay) => {}
                }
            }

            let permit = tokio::select! {
                _ = options.cancel.cancelled() => break,
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };
            if options.cancel.is_cancelled() {
                break;
            }

            let analyzer = Arc::clone(self);
            let tx = tx.clone();
            let symbol = symbol.clone();
            tasks.spawn(async move {
                let _permit = permit;
                let outcome = analyzer.analyze(&symbol).await;
                if let Err(e) = &outcome {
                    tracing::warn!("Failed to analyze {}: {}", symbol, e);
                }
                // Receiver outlives every worker
                let _ = tx.send((index, outcome));
            });
            started += 1;
        }
        drop(tx);

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Task error: {}", e);
            }
        }

        let mut outcomes: Vec<Option<Result<AnalysisResult, AnalysisError>>> =
            std::iter::repeat_with(|| None).take(started).collect();
        while let Some((index, outcome)) = rx.recv().await {
            outcomes[index] = Some(outcome);
        }

        let items: Vec<BatchItem> = symbols
            .iter()
            .zip(outcomes)
            .map(|(symbol, outcome)| BatchItem {
                symbol: symbol.clone(),
                outcome: outcome.unwrap_or_else(|| {
                    Err(AnalysisError::Task(format!("worker for {} ended without a result", symbol)))
                }),
            })
            .collect();
        let skipped = symbols[started..].to_vec();

        if !skipped.is_empty() {
            tracing::warn!("Batch cancelled, {} symbols not started", skipped.len());
        }
        tracing::info!(
            "Batch complete: {}/{} analyzed",
            items.iter().filter(|i| i.outcome.is_ok()).count(),
            symbols.len()
        );

        BatchReport { items, skipped }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{bars, MockPrices, MockPrimary};

    fn analyzer(prices: MockPrices) -> Arc<GateAnalyzer> {
        Arc::new(GateAnalyzer::new(Arc::new(prices), Arc::new(MockPrimary::default()), None))
    }

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn fast() -> BatchOptions {
        BatchOptions {
            max_concurrency: 2,
            request_delay: Duration::ZERO,
            cancel: CancellationToken::new(),
        }
    }

    #[tokio::test]
    async fn test_results_keep_input_order_and_isolate_failures() {
        let prices = MockPrices::default()
            .with("AAA", bars(120, 50.0))
            .with("CCC", bars(120, 70.0))
            .with("DDD", bars(120, 90.0));
        let report = analyzer(prices)
            .batch(&symbols(&["AAA", "BBB", "CCC", "DDD"]), fast())
            .await;

        let order: Vec<&str> = report.items.iter().map(|i| i.symbol.as_str()).collect();
        assert_eq!(order, vec!["AAA", "BBB", "CCC", "DDD"]);
        assert!(report.items[0].outcome.is_ok());
        assert!(report.items[1].outcome.as_ref().unwrap_err().is_insufficient_data());
        assert!(report.items[2].outcome.is_ok());
        assert_eq!(report.analyzed().count(), 3);
        assert_eq!(report.failures().count(), 1);
        assert!(report.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_before_start_skips_everything() {
        let options = fast();
        options.cancel.cancel();
        let report = analyzer(MockPrices::default().with("AAA", bars(120, 50.0)))
            .batch(&symbols(&["AAA", "BBB"]), options)
            .await;

        assert!(report.items.is_empty());
        assert_eq!(report.skipped, symbols(&["AAA", "BBB"]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_between_symbols() {
        let options = BatchOptions {
            max_concurrency: 1,
            request_delay: Duration::from_secs(10),
            cancel: CancellationToken::new(),
        };
        let cancel = options.cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(15)).await;
            cancel.cancel();
        });

        let prices = MockPrices::default()
            .with("AAA", bars(120, 50.0))
            .with("BBB", bars(120, 60.0))
            .with("CCC", bars(120, 70.0));
        let report = analyzer(prices).batch(&symbols(&["AAA", "BBB", "CCC"]), options).await;

        // AAA starts at 0s, BBB at 10s, the cancel lands during the wait for CCC
        assert_eq!(report.items.len(), 2);
        assert!(report.items.iter().all(|i| i.outcome.is_ok()));
        assert_eq!(report.skipped, symbols(&["CCC"]));
    }
}
