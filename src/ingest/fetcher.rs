// src/ingest/fetcher.rs
//! Feed fetching over ordered retrieval channels.
//!
//! Each attempt is bounded by the per-attempt timeout; the first channel that
//! returns a body wins. Parsed items are cached per source id for the cache TTL,
//! so a hit skips the network entirely.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheStore, MemoryCache};
use crate::config::{PipelineConfig, RetrievalChannel};
use crate::ingest::parser::parse_feed;
use crate::ingest::types::{RawItem, SourceDescriptor};

/// Byte transport: one GET returning the body as text.
#[async_trait]
pub trait FeedTransport: Send + Sync {
    async fn get_text(&self, url: &str, timeout: Duration) -> Result<String>;
}

/// reqwest-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .context("building http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedTransport for HttpTransport {
    async fn get_text(&self, url: &str, timeout: Duration) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .context("feed http get()")?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("HTTP {}", status.as_u16()));
        }
        resp.text().await.context("feed http .text()")
    }
}

pub struct Fetcher {
    transport: Arc<dyn FeedTransport>,
    channels: Vec<RetrievalChannel>,
    timeout: Duration,
    ttl: Duration,
    cache: Arc<dyn CacheStore<Vec<RawItem>>>,
}

fn cache_key(source: &SourceDescriptor) -> String {
    format!("feed_{}", source.id)
}

impl Fetcher {
    pub fn new(transport: Arc<dyn FeedTransport>, cfg: &PipelineConfig) -> Self {
        Self::with_cache(transport, cfg, Arc::new(MemoryCache::new()))
    }

    pub fn with_cache(
        transport: Arc<dyn FeedTransport>,
        cfg: &PipelineConfig,
        cache: Arc<dyn CacheStore<Vec<RawItem>>>,
    ) -> Self {
        Self {
            transport,
            channels: cfg.channels.clone(),
            timeout: cfg.fetch_timeout,
            ttl: cfg.cache_ttl,
            cache,
        }
    }

    /// Raw body for `source`, trying channels in order.
    pub async fn fetch_text(&self, source: &SourceDescriptor) -> Result<String> {
        let mut last_err: Option<anyhow::Error> = None;

        for channel in &self.channels {
            let url = channel.request_url(&source.url);
            counter!("news_feed_fetch_total", "channel" => channel.label().to_string())
                .increment(1);

            let attempt = self.transport.get_text(&url, self.timeout);
            match tokio::time::timeout(self.timeout, attempt).await {
                Ok(Ok(body)) => return Ok(body),
                Ok(Err(e)) => {
                    tracing::debug!(
                        target: "ingest",
                        source = %source.id,
                        channel = channel.label(),
                        error = %e,
                        "channel failed"
                    );
                    last_err = Some(e);
                }
                Err(_) => {
                    tracing::debug!(
                        target: "ingest",
                        source = %source.id,
                        channel = channel.label(),
                        timeout_ms = self.timeout.as_millis() as u64,
                        "channel timed out"
                    );
                    last_err = Some(anyhow!("timed out after {} ms", self.timeout.as_millis()));
                }
            }
        }

        let err = last_err.unwrap_or_else(|| anyhow!("no retrieval channels configured"));
        Err(err.context(format!("all channels failed for {}", source.id)))
    }

    /// Parsed items for `source`, at most `max_items`, served from cache when fresh.
    pub async fn fetch_items(
        &self,
        source: &SourceDescriptor,
        max_items: usize,
    ) -> Result<Vec<RawItem>> {
        let key = cache_key(source);
        if let Some(hit) = self.cache.get(&key) {
            counter!("news_cache_hits_total", "scope" => "feed").increment(1);
            tracing::debug!(
                target: "ingest",
                source = %source.id,
                items = hit.len(),
                "feed cache hit"
            );
            return Ok(hit);
        }

        let body = self.fetch_text(source).await?;

        let t0 = std::time::Instant::now();
        let items = parse_feed(&body, source, max_items)?;
        histogram!("news_feed_parse_ms").record(t0.elapsed().as_secs_f64() * 1000.0);
        counter!("news_items_parsed_total").increment(items.len() as u64);

        self.cache.set(&key, items.clone(), self.ttl);
        Ok(items)
    }
}
