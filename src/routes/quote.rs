//! Motivational quote endpoint
//!
//! GET /api/quote?refresh=bool - serves the cached quote while it is fresh,
//! otherwise fetches from the upstream API. Upstream failures degrade to the
//! last cached quote, then to a static fallback; the dashboard never sees a
//! hard failure it cannot render.

use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::quote::{FALLBACK_AUTHOR, FALLBACK_QUOTE};
use crate::routes::{json_response, BoxBody};
use crate::server::AppState;

/// Body served when the upstream fails and nothing is cached
#[derive(Debug, Serialize)]
struct QuoteFallbackResponse {
    message: String,
    error: String,
    quote: String,
    author: String,
}

/// Whether the request asked to bypass the cache
fn wants_refresh(query: Option<&str>) -> bool {
    let Some(query) = query else {
        return false;
    };

    query
        .split('&')
        .filter_map(|p| p.split_once('='))
        .any(|(key, value)| key == "refresh" && value == "true")
}

/// GET /api/quote
pub async fn handle_quote_request(
    query: Option<&str>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let bypass_cache = wants_refresh(query);

    if !bypass_cache {
        if let Some(cached) = state.quote_cache.get_fresh() {
            return json_response(StatusCode::OK, &cached);
        }
    }

    match state.quote_fetcher.fetch().await {
        Ok(quote) => {
            state.quote_cache.set(quote.clone());
            json_response(StatusCode::OK, &quote)
        }
        Err(e) => {
            warn!("Quote API error: {}", e);

            // Serve the cached quote even if it has expired
            if let Some(stale) = state.quote_cache.get_stale() {
                return json_response(StatusCode::OK, &stale);
            }

            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &QuoteFallbackResponse {
                    message: "Error fetching quote".into(),
                    error: e.to_string(),
                    quote: FALLBACK_QUOTE.into(),
                    author: FALLBACK_AUTHOR.into(),
                },
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wants_refresh() {
        assert!(wants_refresh(Some("refresh=true")));
        assert!(wants_refresh(Some("foo=bar&refresh=true")));

        assert!(!wants_refresh(Some("refresh=false")));
        assert!(!wants_refresh(Some("refresh=1")));
        assert!(!wants_refresh(Some("foo=bar")));
        assert!(!wants_refresh(Some("")));
        assert!(!wants_refresh(None));
    }
}
