// src/ingest/mod.rs
pub mod config;
pub mod fetcher;
pub mod parser;
pub mod types;

use anyhow::Result;
use chrono::Utc;
use futures::future::{join_all, FutureExt};
use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram,
};
use once_cell::sync::OnceCell;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::cache::{CacheStore, MemoryCache};
use crate::config::PipelineConfig;
use crate::curated::curated;
use crate::ingest::fetcher::{FeedTransport, Fetcher, HttpTransport};
use crate::ingest::types::{Article, SourceDescriptor};
use crate::rejections::{RejectionLog, RejectionRecord};
use crate::single_flight::SingleFlight;
use crate::transform::transform;

/// Cache key of the aggregated article list.
pub const AGGREGATE_KEY: &str = "nuclear_news_v3";

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "news_feed_fetch_total",
            "Feed fetch attempts, per retrieval channel."
        );
        describe_counter!(
            "news_feed_errors_total",
            "Sources that failed on every channel or returned an unparseable document."
        );
        describe_counter!("news_items_parsed_total", "Raw items parsed from feeds.");
        describe_counter!("news_rejections_total", "Items rejected, by reason code.");
        describe_counter!("news_cache_hits_total", "Cache hits, by scope (feed|aggregate).");
        describe_counter!(
            "news_fallback_total",
            "Cycles that served the curated list because nothing live survived."
        );
        describe_histogram!("news_aggregate_ms", "Aggregation cycle time in milliseconds.");
        describe_histogram!("news_feed_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!(
            "news_aggregate_last_run_ts",
            "Unix ts when the aggregation cycle last ran."
        );
    });
}

/// Dedup by URL (first seen wins), newest first, at most `max_diversity` per
/// source id, then truncate to `max_total`.
///
/// The sort is stable and runs before the diversity cap, so each source keeps
/// its most recent items.
pub fn rank(articles: Vec<Article>, max_diversity: usize, max_total: usize) -> Vec<Article> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique: Vec<Article> = articles
        .into_iter()
        .filter(|a| seen.insert(a.url.clone()))
        .collect();

    unique.sort_by_key(|a| std::cmp::Reverse(a.sort_ts()));

    let mut per_source: HashMap<String, usize> = HashMap::new();
    unique
        .into_iter()
        .filter(|a| {
            let n = per_source.entry(a.source_id.clone()).or_insert(0);
            if *n >= max_diversity {
                return false;
            }
            *n += 1;
            true
        })
        .take(max_total)
        .collect()
}

struct Inner {
    registry: Vec<SourceDescriptor>,
    cfg: PipelineConfig,
    fetcher: Fetcher,
    articles: Arc<dyn CacheStore<Vec<Article>>>,
    flights: Arc<SingleFlight<Vec<Article>>>,
    rejections: RejectionLog,
}

/// Aggregator over the feed registry. Cheap to clone.
#[derive(Clone)]
pub struct NewsService {
    inner: Arc<Inner>,
}

impl NewsService {
    pub fn new(
        registry: Vec<SourceDescriptor>,
        cfg: PipelineConfig,
        transport: Arc<dyn FeedTransport>,
    ) -> Self {
        Self::with_caches(
            registry,
            cfg,
            transport,
            Arc::new(MemoryCache::new()),
            Arc::new(MemoryCache::new()),
        )
    }

    /// Same as `new`, with caller-provided cache stores.
    pub fn with_caches(
        registry: Vec<SourceDescriptor>,
        cfg: PipelineConfig,
        transport: Arc<dyn FeedTransport>,
        feed_cache: Arc<dyn CacheStore<Vec<types::RawItem>>>,
        article_cache: Arc<dyn CacheStore<Vec<Article>>>,
    ) -> Self {
        let cfg = cfg.sanitized();
        let fetcher = Fetcher::with_cache(transport, &cfg, feed_cache);
        Self {
            inner: Arc::new(Inner {
                registry,
                cfg,
                fetcher,
                articles: article_cache,
                flights: Arc::new(SingleFlight::new()),
                rejections: RejectionLog::default(),
            }),
        }
    }

    /// Service backed by the reqwest transport.
    pub fn http(registry: Vec<SourceDescriptor>, cfg: PipelineConfig) -> Result<Self> {
        let transport = HttpTransport::new(&cfg.user_agent)?;
        Ok(Self::new(registry, cfg, Arc::new(transport)))
    }

    pub fn registry(&self) -> &[SourceDescriptor] {
        &self.inner.registry
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.inner.cfg
    }

    /// Current article list: cached if fresh, otherwise one shared refresh.
    ///
    /// Source failures never surface here; when nothing live survives the
    /// curated list is returned. `Err` only if the refresh itself panicked.
    pub async fn aggregate(&self) -> Result<Vec<Article>> {
        ensure_metrics_described();

        if let Some(hit) = self.inner.articles.get(AGGREGATE_KEY) {
            counter!("news_cache_hits_total", "scope" => "aggregate").increment(1);
            tracing::debug!(target: "ingest", articles = hit.len(), "aggregate cache hit");
            return Ok(hit);
        }

        let inner = Arc::clone(&self.inner);
        self.inner
            .flights
            .run(AGGREGATE_KEY, move || {
                async move { inner.refresh().await }.boxed()
            })
            .await
    }

    /// Curated list, no network.
    pub fn curated(&self) -> Vec<Article> {
        curated()
    }

    /// Drop the aggregate entry so the next `aggregate` regenerates.
    /// Per-source caches are left alone.
    pub fn clear_cache(&self) {
        self.inner.articles.remove(AGGREGATE_KEY);
        tracing::info!(target: "ingest", "aggregate cache cleared");
    }

    /// Rejections recorded by the most recent refresh.
    pub fn rejections(&self) -> Vec<RejectionRecord> {
        self.inner.rejections.snapshot()
    }
}

impl Inner {
    async fn refresh(&self) -> Vec<Article> {
        // A caller may have missed the cache just before the previous flight stored it.
        if let Some(hit) = self.articles.get(AGGREGATE_KEY) {
            return hit;
        }

        let t0 = std::time::Instant::now();
        let now = Utc::now();
        self.rejections.reset();

        let fetches = self.registry.iter().map(|src| async move {
            let outcome = self.fetcher.fetch_items(src, self.cfg.max_per_feed).await;
            (src, outcome)
        });
        let outcomes = join_all(fetches).await;

        let mut valid = Vec::new();
        for (src, outcome) in outcomes {
            match outcome {
                Ok(items) => {
                    tracing::info!(
                        target: "ingest",
                        source = %src.id,
                        items = items.len(),
                        "feed ok"
                    );
                    for item in &items {
                        match transform(item, src, &self.cfg, now) {
                            Ok(article) => valid.push(article),
                            Err(why) => {
                                counter!("news_rejections_total", "reason" => why.code())
                                    .increment(1);
                                self.rejections.record(&item.title, &src.id, &why);
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(target: "ingest", error = ?e, source = %src.id, "feed failed");
                    counter!("news_feed_errors_total").increment(1);
                }
            }
        }

        let mut articles = rank(valid, self.cfg.max_diversity, self.cfg.max_total);
        if articles.is_empty() {
            tracing::warn!(target: "ingest", "no live articles survived; serving curated list");
            counter!("news_fallback_total").increment(1);
            articles = curated();
        }

        let tally = self.rejections.tally();
        if !tally.is_empty() {
            tracing::info!(target: "ingest", ?tally, "rejections");
        }
        let sources: HashSet<&str> = articles.iter().map(|a| a.source.as_str()).collect();
        tracing::info!(
            target: "ingest",
            articles = articles.len(),
            sources = sources.len(),
            "aggregation complete"
        );

        histogram!("news_aggregate_ms").record(t0.elapsed().as_secs_f64() * 1000.0);
        gauge!("news_aggregate_last_run_ts").set(now.timestamp() as f64);

        self.articles
            .set(AGGREGATE_KEY, articles.clone(), self.cfg.cache_ttl);
        articles
    }
}
