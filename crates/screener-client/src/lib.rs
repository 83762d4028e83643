//! Fetches company profile pages from the secondary fundamentals site.
//!
//! Parsing lives with the aggregator; this crate only moves bytes and maps
//! HTTP outcomes onto [`ProviderError`].

use analysis_core::{ProviderError, SecondaryFundamentalsProvider};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.screener.in";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Clone)]
pub struct ScreenerClient {
    base_url: String,
    client: Client,
}

impl ScreenerClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn company_url(&self, slug: &str) -> String {
        format!("{}/company/{}/", self.base_url, slug)
    }

    pub async fn get_company_page(&self, slug: &str) -> Result<String, ProviderError> {
        let url = self.company_url(slug);
        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::warn!("Company page fetch failed for {}: {}", slug, e);
            ProviderError::Unavailable(e.to_string())
        })?;

        match response.status() {
            StatusCode::OK => response
                .text()
                .await
                .map_err(|e| ProviderError::Unavailable(e.to_string())),
            StatusCode::NOT_FOUND => {
                tracing::warn!("No company page for {}", slug);
                Err(ProviderError::NotFound(slug.to_string()))
            }
            status => {
                tracing::warn!("Company page returned {} for {}", status, slug);
                Err(ProviderError::Unavailable(format!("HTTP {}", status)))
            }
        }
    }
}

#[async_trait]
impl SecondaryFundamentalsProvider for ScreenerClient {
    async fn fetch_company_page(&self, slug: &str) -> Result<String, ProviderError> {
        self.get_company_page(slug).await
    }
}
