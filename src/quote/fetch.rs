//! Upstream quote fetcher
//!
//! Talks to a ZenQuotes-shaped API: a GET returning a one-element JSON array
//! of `{"q": "...", "a": "..."}` objects.

use serde::Deserialize;
use tracing::warn;

use crate::quote::Quote;
use crate::types::TrackerError;

/// One element of the upstream response array
#[derive(Debug, Deserialize)]
struct UpstreamQuote {
    q: String,
    a: String,
}

/// HTTP client for the quote upstream
#[derive(Clone)]
pub struct QuoteFetcher {
    http_client: reqwest::Client,
    url: String,
}

impl QuoteFetcher {
    pub fn new(url: impl Into<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            url: url.into(),
        }
    }

    /// Fetch a random quote from the upstream API.
    ///
    /// An empty array or blank fields count as an upstream failure so the
    /// caller falls back to the cache.
    pub async fn fetch(&self) -> Result<Quote, TrackerError> {
        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| TrackerError::Upstream(format!("Quote API request failed: {}", e)))?;

        if !response.status().is_success() {
            warn!("Quote API returned status {}", response.status());
            return Err(TrackerError::Upstream(format!(
                "Quote API returned status {}",
                response.status()
            )));
        }

        let quotes: Vec<UpstreamQuote> = response
            .json()
            .await
            .map_err(|e| TrackerError::Upstream(format!("Invalid quote API response: {}", e)))?;

        let first = quotes
            .into_iter()
            .next()
            .ok_or_else(|| TrackerError::Upstream("Quote API returned no quotes".into()))?;

        if first.q.is_empty() || first.a.is_empty() {
            return Err(TrackerError::Upstream("Invalid quote data from API".into()));
        }

        Ok(Quote {
            quote: first.q,
            author: first.a,
        })
    }
}
