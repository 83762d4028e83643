//! Three-gate stock analysis from the command line.
//!
//! ```bash
//! # Analyze symbols given on the command line (or $WATCHLIST when none are given)
//! gate-cli analyze RELIANCE TCS.NS AAPL
//!
//! # Last traded prices, served from the quote cache when fresh
//! gate-cli quotes INFY.NS MSFT
//! ```

use std::sync::Arc;

use analysis_core::{PriceHistoryProvider, PrimaryFundamentalsProvider, SecondaryFundamentalsProvider};
use analysis_orchestrator::{format_batch, BatchOptions, GateAnalyzer, InMemoryQuoteCache, QuoteService};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use screener_client::ScreenerClient;
use tokio_util::sync::CancellationToken;
use yahoo_client::YahooClient;

mod config;

use config::GateConfig;

#[derive(Parser)]
#[command(name = "gate-cli")]
#[command(about = "Quality, valuation and timing gates for equities", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the three-gate analysis and save the batch report
    Analyze {
        /// Symbols (e.g. RELIANCE, TCS.NS, INFY.BO, AAPL). Defaults to WATCHLIST.
        symbols: Vec<String>,

        /// Print the report without writing it to RESULTS_DIR
        #[arg(long, default_value = "false")]
        no_save: bool,
    },

    /// Print last traded prices
    Quotes {
        /// Symbols to price. Defaults to WATCHLIST.
        symbols: Vec<String>,
    },
}

fn init_tracing() {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(filter()).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter()).init();
    }
}

fn symbols_or_watchlist(symbols: Vec<String>, config: &GateConfig) -> Result<Vec<String>> {
    let symbols: Vec<String> = if symbols.is_empty() {
        config.watchlist.clone()
    } else {
        symbols
            .iter()
            .flat_map(|s| s.split(','))
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect()
    };
    if symbols.is_empty() {
        anyhow::bail!("No symbols given and WATCHLIST is empty");
    }
    Ok(symbols)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    std::panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
        tracing::error!("PANIC: {info}");
    }));

    let cli = Cli::parse();
    let config = GateConfig::from_env()?;
    tracing::info!(
        "Configuration loaded (timeout {}s, {} req/min, concurrency {}, secondary {})",
        config.http_timeout.as_secs(),
        config.yahoo_rate_limit,
        config.batch_concurrency,
        if config.screener_enabled { "on" } else { "off" }
    );

    let yahoo = Arc::new(YahooClient::new(
        config.yahoo_base_url.clone(),
        config.http_timeout,
        config.yahoo_rate_limit,
    ));

    match cli.command.unwrap_or(Commands::Analyze { symbols: Vec::new(), no_save: false }) {
        Commands::Analyze { symbols, no_save } => {
            let symbols = symbols_or_watchlist(symbols, &config)?;
            run_analysis(&config, yahoo, symbols, !no_save).await
        }
        Commands::Quotes { symbols } => {
            let symbols = symbols_or_watchlist(symbols, &config)?;
            let quotes = QuoteService::new(
                Arc::new(InMemoryQuoteCache::new()),
                None,
                yahoo as Arc<dyn PriceHistoryProvider>,
                config.quote_cache_ttl,
            );
            let prices = quotes.last_prices(&symbols).await;
            for symbol in &symbols {
                match prices.get(symbol) {
                    Some(price) => println!("{:<14} {:>12.2}", symbol, price),
                    None => println!("{:<14} {:>12}", symbol, "N/A"),
                }
            }
            Ok(())
        }
    }
}

async fn run_analysis(config: &GateConfig, yahoo: Arc<YahooClient>, symbols: Vec<String>, save: bool) -> Result<()> {
    let secondary: Option<Arc<dyn SecondaryFundamentalsProvider>> = if config.screener_enabled {
        Some(Arc::new(ScreenerClient::new(config.screener_base_url.clone(), config.http_timeout)))
    } else {
        None
    };
    let analyzer = Arc::new(GateAnalyzer::new(
        yahoo.clone() as Arc<dyn PriceHistoryProvider>,
        yahoo as Arc<dyn PrimaryFundamentalsProvider>,
        secondary,
    ));

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing symbols in flight");
            on_ctrl_c.cancel();
        }
    });

    let options = BatchOptions {
        max_concurrency: config.batch_concurrency,
        request_delay: config.batch_delay,
        cancel,
    };
    let report = analyzer.batch(&symbols, options).await;

    let generated_at = Utc::now();
    let text = format_batch(&report, generated_at);
    println!("{}", text);

    if save {
        tokio::fs::create_dir_all(&config.results_dir)
            .await
            .with_context(|| format!("Failed to create {}", config.results_dir.display()))?;
        let path = config
            .results_dir
            .join(format!("analysis_{}.txt", generated_at.format("%Y%m%d_%H%M")));
        tokio::fs::write(&path, &text)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Report saved to {}", path.display());
    }

    Ok(())
}
