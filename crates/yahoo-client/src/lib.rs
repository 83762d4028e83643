//! Chart and quote-summary client for the primary market-data provider.

pub mod chart;
pub mod summary;

pub use chart::parse_chart;
pub use summary::{parse_summary, SUMMARY_MODULES};

use analysis_core::{PriceHistory, PriceHistoryProvider, PrimaryFundamentals, PrimaryFundamentalsProvider, ProviderError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

const MAX_ATTEMPTS: u32 = 3;
const RETRY_WAIT: Duration = Duration::from_secs(15);

/// Sliding-window rate limiter: at most `max_requests` per `window` duration.
#[derive(Clone)]
struct RateLimiter {
    timestamps: Arc<Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: Arc::new(Mutex::new(VecDeque::new())),
            max_requests: max_requests.max(1),
            window,
        }
    }

    async fn acquire(&self) {
        loop {
            let mut ts = self.timestamps.lock().await;
            let now = Instant::now();

            while let Some(&front) = ts.front() {
                if now.duration_since(front) >= self.window {
                    ts.pop_front();
                } else {
                    break;
                }
            }

            if ts.len() < self.max_requests {
                ts.push_back(now);
                return;
            }
            let oldest = ts.front().copied().unwrap_or(now);

            // Wait for the oldest request to leave the window
            let sleep_dur = (oldest + self.window).saturating_duration_since(now) + Duration::from_millis(50);
            drop(ts);
            tracing::debug!("Rate limiter: waiting {:.1}s for a Yahoo slot", sleep_dur.as_secs_f64());
            tokio::time::sleep(sleep_dur).await;
        }
    }
}

fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Unavailable("request timed out".to_string())
    } else {
        ProviderError::Unavailable(e.to_string())
    }
}

#[derive(Clone)]
pub struct YahooClient {
    base_url: String,
    client: Client,
    rate_limiter: RateLimiter,
    retry_wait: Duration,
}

impl YahooClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration, requests_per_minute: usize) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            rate_limiter: RateLimiter::new(requests_per_minute, Duration::from_secs(60)),
            retry_wait: RETRY_WAIT,
        }
    }

    #[cfg(test)]
    fn with_retry_wait(mut self, wait: Duration) -> Self {
        self.retry_wait = wait;
        self
    }

    /// GET `path` with rate limiting and automatic 429 retry, returning the body.
    async fn get_text(&self, path: &str, query: &[(&str, &str)], symbol: &str) -> Result<String, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        let request = self
            .client
            .get(&url)
            .query(query)
            .build()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        for attempt in 1..=MAX_ATTEMPTS {
            self.rate_limiter.acquire().await;
            let req_clone = request
                .try_clone()
                .ok_or_else(|| ProviderError::Unavailable("cannot clone request".to_string()))?;
            let response = self.client.execute(req_clone).await.map_err(transport_error)?;

            match response.status() {
                StatusCode::TOO_MANY_REQUESTS => {
                    tracing::warn!(
                        "Yahoo 429 rate limited, waiting {}s before retry {}/{}",
                        self.retry_wait.as_secs(),
                        attempt,
                        MAX_ATTEMPTS
                    );
                    tokio::time::sleep(self.retry_wait).await;
                }
                StatusCode::NOT_FOUND => return Err(ProviderError::NotFound(symbol.to_string())),
                status if !status.is_success() => {
                    // Error bodies usually still carry the provider's error object
                    let body = response.text().await.unwrap_or_default();
                    if body.contains("\"error\"") {
                        return Ok(body);
                    }
                    return Err(ProviderError::Unavailable(format!("HTTP {}", status)));
                }
                _ => return response.text().await.map_err(transport_error),
            }
        }

        Err(ProviderError::Unavailable(format!(
            "rate limited by Yahoo after {} retries",
            MAX_ATTEMPTS
        )))
    }

    /// Daily bars for the trailing year.
    pub async fn get_chart(&self, symbol: &str) -> Result<PriceHistory, ProviderError> {
        let path = format!("/v8/finance/chart/{}", symbol);
        let body = self
            .get_text(&path, &[("range", "1y"), ("interval", "1d")], symbol)
            .await?;
        parse_chart(symbol, &body)
    }

    pub async fn get_summary(&self, symbol: &str) -> Result<PrimaryFundamentals, ProviderError> {
        let path = format!("/v10/finance/quoteSummary/{}", symbol);
        let body = self.get_text(&path, &[("modules", SUMMARY_MODULES)], symbol).await?;
        parse_summary(symbol, &body)
    }
}

#[async_trait]
impl PriceHistoryProvider for YahooClient {
    async fn fetch_history(&self, symbol: &str) -> Result<PriceHistory, ProviderError> {
        self.get_chart(symbol).await
    }
}

#[async_trait]
impl PrimaryFundamentalsProvider for YahooClient {
    async fn fetch_fundamentals(&self, symbol: &str) -> Result<PrimaryFundamentals, ProviderError> {
        self.get_summary(symbol).await
    }
}
