//! Motivational quote service
//!
//! A thin proxy over a third-party quote API with a TTL cache. The cache is
//! an explicit object injected into the serving handler; it is never cleared
//! on upstream failure so stale quotes can be served while the API is down.

pub mod cache;
pub mod fetch;

pub use cache::{Quote, QuoteCache};
pub use fetch::QuoteFetcher;

/// Fallback returned when the upstream fails and nothing is cached
pub const FALLBACK_QUOTE: &str = "Stay motivated, keep pushing forward!";
pub const FALLBACK_AUTHOR: &str = "Unknown";
