// src/config/pipeline.rs
//! Static tuning for the news pipeline. Nothing here is read from the
//! environment; the feed registry (`ingest::config`) is the only external input.

use std::time::Duration;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(15 * 60);
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(6);
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(30 * 24 * 3600);
pub const DEFAULT_MAX_PER_FEED: usize = 8;
pub const DEFAULT_MAX_DIVERSITY: usize = 3;
pub const DEFAULT_MAX_TOTAL: usize = 30;
pub const DEFAULT_MIN_RELEVANCE: u8 = 2;

/// How a feed URL is reached. Channels are tried in order; first success wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalChannel {
    /// Plain GET against the feed URL.
    Direct,
    /// Pass-through proxy: `prefix` + percent-encoded feed URL.
    Proxy { prefix: String },
}

impl RetrievalChannel {
    pub fn proxy(prefix: &str) -> Self {
        Self::Proxy {
            prefix: prefix.to_string(),
        }
    }

    /// Final request URL for `feed_url` through this channel.
    pub fn request_url(&self, feed_url: &str) -> String {
        match self {
            Self::Direct => feed_url.to_string(),
            Self::Proxy { prefix } => {
                let encoded: String =
                    url::form_urlencoded::byte_serialize(feed_url.as_bytes()).collect();
                format!("{prefix}{encoded}")
            }
        }
    }

    /// Short name for logs/metrics.
    pub fn label(&self) -> &str {
        match self {
            Self::Direct => "direct",
            Self::Proxy { prefix } => prefix.as_str(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub cache_ttl: Duration,
    /// Per attempt, per channel.
    pub fetch_timeout: Duration,
    /// Freshness window; older items are rejected as stale.
    pub max_age: Duration,
    pub max_per_feed: usize,
    /// Max articles per source id in the final list.
    pub max_diversity: usize,
    pub max_total: usize,
    /// Relevance gate for non-strict sources.
    pub min_relevance: u8,
    pub excerpt_budget: usize,
    /// Excerpts this short (or shorter) are dropped.
    pub excerpt_min_len: usize,
    pub channels: Vec<RetrievalChannel>,
    pub user_agent: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_age: DEFAULT_MAX_AGE,
            max_per_feed: DEFAULT_MAX_PER_FEED,
            max_diversity: DEFAULT_MAX_DIVERSITY,
            max_total: DEFAULT_MAX_TOTAL,
            min_relevance: DEFAULT_MIN_RELEVANCE,
            excerpt_budget: 220,
            excerpt_min_len: 20,
            channels: vec![
                RetrievalChannel::Direct,
                RetrievalChannel::proxy("https://api.allorigins.win/raw?url="),
                RetrievalChannel::proxy("https://corsproxy.io/?url="),
            ],
            user_agent: format!("nuclear-news/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl PipelineConfig {
    /// Zero caps, zero timeout and an empty channel list fall back to defaults.
    pub fn sanitized(mut self) -> Self {
        if self.max_per_feed == 0 {
            self.max_per_feed = DEFAULT_MAX_PER_FEED;
        }
        if self.max_diversity == 0 {
            self.max_diversity = DEFAULT_MAX_DIVERSITY;
        }
        if self.max_total == 0 {
            self.max_total = DEFAULT_MAX_TOTAL;
        }
        if self.fetch_timeout.is_zero() {
            self.fetch_timeout = DEFAULT_FETCH_TIMEOUT;
        }
        if self.channels.is_empty() {
            self.channels.push(RetrievalChannel::Direct);
        }
        self.min_relevance = self.min_relevance.min(crate::relevance::MAX_RELEVANCE);
        self
    }
}
