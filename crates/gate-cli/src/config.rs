use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct GateConfig {
    // Symbols analyzed when none are given on the command line
    pub watchlist: Vec<String>,

    // Outbound HTTP
    pub http_timeout: Duration,
    pub yahoo_rate_limit: usize, // requests per minute
    pub yahoo_base_url: String,
    pub screener_base_url: String,
    pub screener_enabled: bool,

    // Batch
    pub batch_concurrency: usize,
    pub batch_delay: Duration,

    // Output
    pub results_dir: PathBuf,

    // Quote lookups
    pub quote_cache_ttl: Duration,
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .unwrap_or_else(|| default.to_string())
        .trim()
        .parse()
        .with_context(|| format!("{} is not a valid value", key))
}

impl GateConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config = Self {
            watchlist: lookup("WATCHLIST")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect(),

            http_timeout: Duration::from_secs(parse_or(&lookup, "HTTP_TIMEOUT_SECS", "15")?),
            yahoo_rate_limit: parse_or(&lookup, "YAHOO_RATE_LIMIT", "120")?,
            yahoo_base_url: lookup("YAHOO_BASE_URL")
                .unwrap_or_else(|| yahoo_client::DEFAULT_BASE_URL.to_string()),
            screener_base_url: lookup("SCREENER_BASE_URL")
                .unwrap_or_else(|| screener_client::DEFAULT_BASE_URL.to_string()),
            screener_enabled: parse_or(&lookup, "SCREENER_ENABLED", "true")?,

            batch_concurrency: parse_or(&lookup, "BATCH_CONCURRENCY", "4")?,
            batch_delay: Duration::from_millis(parse_or(&lookup, "BATCH_DELAY_MS", "500")?),

            results_dir: PathBuf::from(
                lookup("RESULTS_DIR").unwrap_or_else(|| "analysis_results".to_string()),
            ),

            quote_cache_ttl: Duration::from_secs(parse_or(&lookup, "QUOTE_CACHE_TTL_SECS", "30")?),
        };

        if config.batch_concurrency == 0 {
            anyhow::bail!("BATCH_CONCURRENCY must be at least 1");
        }
        if config.yahoo_rate_limit == 0 {
            anyhow::bail!("YAHOO_RATE_LIMIT must be at least 1");
        }

        Ok(config)
    }
}
