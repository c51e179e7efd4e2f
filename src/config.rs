//! Configuration from environment variables

use std::env;

/// Default sampled-stream endpoint.
pub const DEFAULT_STREAM_URL: &str = "https://api.twitter.com/2/tweets/sample/stream";

/// Environment variable holding the bearer credential for the stream.
pub const BEARER_TOKEN_ENV: &str = "STREAM_BEARER_TOKEN";

/// Configuration loaded from environment variables
///
/// Loaded once at startup with sensible defaults; a `.env` file is honored
/// when present.
#[derive(Debug, Clone)]
pub struct Config {
    /// Source endpoint for the long-lived stream connection
    pub stream_url: String,

    /// Bearer credential for the stream; absence is non-fatal and is
    /// reported through the aggregator status instead
    pub bearer_token: Option<String>,

    /// Capacity of the top-keyword ranking table
    pub top_keywords_size: usize,

    /// Processor sleep between polls of an empty queue (milliseconds)
    pub poll_delay_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `STREAM_URL` (default: the sampled-stream endpoint)
    /// - `STREAM_BEARER_TOKEN` (no default; optional)
    /// - `TOP_KEYWORDS_SIZE` (default: 10)
    /// - `POLL_DELAY_MS` (default: 500)
    pub fn from_env() -> Self {
        Self {
            stream_url: env::var("STREAM_URL").unwrap_or_else(|_| DEFAULT_STREAM_URL.to_string()),

            bearer_token: env::var(BEARER_TOKEN_ENV).ok().filter(|t| !t.is_empty()),

            top_keywords_size: env::var("TOP_KEYWORDS_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),

            poll_delay_ms: env::var("POLL_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(500),
        }
    }
}
