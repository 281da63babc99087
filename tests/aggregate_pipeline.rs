// tests/aggregate_pipeline.rs
//
// End-to-end aggregation against a scripted in-memory transport.
//
// Covered:
// - duplicate links across sources collapse to one article
// - per-source diversity cap keeps the most recent items
// - non-article links and off-topic items are rejected with reason codes
// - failing / malformed sources are isolated
// - all sources timing out → curated list, unchanged
// - a timed-out channel falls through to the next channel
// - cache hit skips the network; clear_cache forces a refresh
// - expired cache entries regenerate
// - concurrent callers share one refresh

mod common;

use chrono::{Duration as ChronoDuration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use common::{feed_url, item, rss, source, test_config, Item, MockTransport, Script};
use nuclear_news::cache::{CacheStore, MemoryCache};
use nuclear_news::config::{PipelineConfig, RetrievalChannel};
use nuclear_news::curated::curated;
use nuclear_news::ingest::AGGREGATE_KEY;
use nuclear_news::{Article, NewsService};

fn assert_invariants(articles: &[Article], max_diversity: usize) {
    let urls: HashSet<_> = articles.iter().map(|a| a.url.as_str()).collect();
    assert_eq!(urls.len(), articles.len(), "urls must be unique");

    let mut per_source: HashMap<&str, usize> = HashMap::new();
    for a in articles {
        *per_source.entry(a.source_id.as_str()).or_default() += 1;
    }
    assert!(per_source.values().all(|n| *n <= max_diversity), "diversity cap: {per_source:?}");

    assert!(
        articles.windows(2).all(|w| w[0].sort_ts() >= w[1].sort_ts()),
        "must be newest first"
    );

    let window = Utc::now() - ChronoDuration::days(30);
    for a in articles.iter().filter(|a| !a.is_fallback) {
        assert!(a.published_at.expect("live article has a date") >= window);
    }
}

#[tokio::test]
async fn duplicate_links_across_sources_collapse_to_one() {
    let transport = MockTransport::new()
        .script(
            &feed_url("a"),
            Script::Body(rss(&[
                item(
                    "Utility signs SMR deal",
                    "https://news.test/articles/smr-deal?utm_source=a",
                    3,
                ),
                item("Reactor restart approved", "https://a.test/news/reactor-restart", 4),
            ])),
        )
        .script(
            &feed_url("b"),
            Script::Body(rss(&[item(
                "Utility signs SMR deal (wire copy)",
                "https://news.google.com/read?url=https%3A%2F%2Fnews.test%2Farticles%2Fsmr-deal",
                2,
            )])),
        );
    let svc = NewsService::new(
        vec![source("a", true), source("b", true)],
        test_config(),
        Arc::new(transport),
    );

    let out = svc.aggregate().await.unwrap();
    let hits: Vec<_> = out
        .iter()
        .filter(|a| a.url == "https://news.test/articles/smr-deal")
        .collect();
    assert_eq!(hits.len(), 1);
    // registry order decides which copy survives
    assert_eq!(hits[0].source_id, "a");
    assert_eq!(out.len(), 2);
    assert_invariants(&out, 3);
}

#[tokio::test]
async fn diversity_cap_keeps_three_most_recent_per_source() {
    let titles: Vec<String> = (0..10).map(|i| format!("Reactor update number {i}")).collect();
    let links: Vec<String> = (0..10)
        .map(|i| format!("https://a.test/news/reactor-update-{i}"))
        .collect();
    // item i is (10 - i) hours old: items 7, 8, 9 are the freshest
    let items: Vec<Item<'_>> = (0..10)
        .map(|i| item(&titles[i], &links[i], 10 - i as i64))
        .collect();

    let transport = MockTransport::new()
        .script(&feed_url("a"), Script::Body(rss(&items)))
        .script(
            &feed_url("b"),
            Script::Body(rss(&[item(
                "Uranium enrichment plant expands",
                "https://b.test/enrichment-expands",
                5,
            )])),
        );
    let mut cfg = test_config();
    cfg.max_per_feed = 10;
    let svc = NewsService::new(
        vec![source("a", true), source("b", true)],
        cfg,
        Arc::new(transport),
    );

    let out = svc.aggregate().await.unwrap();
    let from_a: Vec<&str> = out
        .iter()
        .filter(|a| a.source_id == "a")
        .map(|a| a.title.as_str())
        .collect();
    assert_eq!(
        from_a,
        vec!["Reactor update number 9", "Reactor update number 8", "Reactor update number 7"]
    );
    assert_eq!(out.len(), 4);
    assert_invariants(&out, 3);
}

#[tokio::test]
async fn non_article_and_off_topic_items_are_rejected() {
    let transport = MockTransport::new()
        .script(
            &feed_url("strict"),
            Script::Body(rss(&[
                item("Safety coverage", "https://strict.test/tag/safety", 1),
                item("Bakery opens downtown", "https://strict.test/bakery-opens", 1),
            ])),
        )
        .script(
            &feed_url("loose"),
            Script::Body(rss(&[
                item("Bakery opens downtown", "https://loose.test/bakery-opens", 1),
                item(
                    "New reactor design clears NRC review",
                    "https://loose.test/reactor-review",
                    1,
                ),
            ])),
        );
    let svc = NewsService::new(
        vec![source("strict", true), source("loose", false)],
        test_config(),
        Arc::new(transport),
    );

    let out = svc.aggregate().await.unwrap();
    let urls: HashSet<_> = out.iter().map(|a| a.url.as_str()).collect();
    assert!(!urls.contains("https://strict.test/tag/safety"));
    assert!(urls.contains("https://strict.test/bakery-opens"));
    assert!(!urls.contains("https://loose.test/bakery-opens"));
    assert!(urls.contains("https://loose.test/reactor-review"));

    let rejections = svc.rejections();
    let reasons: HashSet<_> = rejections.iter().map(|r| r.reason.as_str()).collect();
    assert!(reasons.contains("non-article-url"));
    assert!(reasons.contains("off-topic"));
    let off = rejections.iter().find(|r| r.reason == "off-topic").unwrap();
    assert_eq!(off.source_id, "loose");
    assert_eq!(off.detail, "off-topic: score 0");
}

#[tokio::test]
async fn stale_items_are_rejected_with_age() {
    let transport = MockTransport::new().script(
        &feed_url("a"),
        Script::Body(rss(&[
            item("Old reactor story", "https://a.test/old-reactor-story", 45 * 24),
            item("Fresh reactor story", "https://a.test/fresh-reactor-story", 1),
        ])),
    );
    let svc = NewsService::new(vec![source("a", true)], test_config(), Arc::new(transport));

    let out = svc.aggregate().await.unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].title, "Fresh reactor story");

    let rej = svc.rejections();
    assert_eq!(rej.len(), 1);
    assert_eq!(rej[0].reason, "stale");
    assert_eq!(rej[0].detail, "stale: 45d");
}

#[tokio::test]
async fn failing_sources_are_isolated() {
    let transport = MockTransport::new()
        .script(&feed_url("down"), Script::Fail("HTTP 503"))
        .script(&feed_url("broken"), Script::Body("<rss><channel><item>".into()))
        .script(
            &feed_url("ok"),
            Script::Body(rss(&[item("Fusion plasma record", "https://ok.test/fusion-record", 2)])),
        );
    let svc = NewsService::new(
        vec![source("down", true), source("broken", true), source("ok", true)],
        test_config(),
        Arc::new(transport),
    );

    let out = svc.aggregate().await.unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].source_id, "ok");
    assert!(!out[0].is_fallback);
}

#[tokio::test(start_paused = true)]
async fn all_sources_timing_out_serves_curated_list() {
    let slow = || Script::Delay(Duration::from_secs(30), rss(&[]));
    let transport = MockTransport::new()
        .script(&feed_url("a"), slow())
        .script(&feed_url("b"), slow())
        .script(&feed_url("c"), slow());
    let svc = NewsService::new(
        vec![source("a", true), source("b", true), source("c", false)],
        test_config(),
        Arc::new(transport),
    );

    let out = svc.aggregate().await.unwrap();
    assert_eq!(out, curated());
    assert!(out.iter().all(|a| a.is_fallback && a.published_at.is_none()));
}

#[tokio::test(start_paused = true)]
async fn slow_channel_falls_through_to_next() {
    let relay = RetrievalChannel::proxy("https://relay.test/raw?url=");
    let cfg = PipelineConfig {
        channels: vec![RetrievalChannel::Direct, relay.clone()],
        ..test_config()
    };
    let body = rss(&[item("Reactor restart approved", "https://a.test/reactor-restart", 1)]);
    let transport = Arc::new(
        MockTransport::new()
            .script(&feed_url("a"), Script::Delay(Duration::from_secs(30), rss(&[])))
            .script(&relay.request_url(&feed_url("a")), Script::Body(body)),
    );
    let svc = NewsService::new(vec![source("a", true)], cfg, transport.clone());

    let out = svc.aggregate().await.unwrap();
    assert_eq!(transport.calls(), 2);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].url, "https://a.test/reactor-restart");
    assert!(!out[0].is_fallback);
}

#[tokio::test]
async fn empty_registry_serves_curated_list() {
    let svc = NewsService::new(vec![], test_config(), Arc::new(MockTransport::new()));
    assert_eq!(svc.aggregate().await.unwrap(), curated());
}

#[tokio::test]
async fn cache_hit_skips_network_and_clear_forces_refresh() {
    let transport = Arc::new(MockTransport::new().script(
        &feed_url("a"),
        Script::Body(rss(&[item("Reactor story", "https://a.test/reactor-story", 1)])),
    ));
    let article_cache: Arc<MemoryCache<Vec<Article>>> = Arc::new(MemoryCache::new());
    let svc = NewsService::with_caches(
        vec![source("a", true)],
        test_config(),
        transport.clone(),
        Arc::new(MemoryCache::new()),
        article_cache.clone(),
    );

    let first = svc.aggregate().await.unwrap();
    assert_eq!(transport.calls(), 1);
    let second = svc.aggregate().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(transport.calls(), 1);

    svc.clear_cache();
    assert!(article_cache.get(AGGREGATE_KEY).is_none());

    let third = svc.aggregate().await.unwrap();
    assert_eq!(third, first);
    assert!(article_cache.get(AGGREGATE_KEY).is_some());
    // per-source cache is still fresh
    assert_eq!(transport.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn expired_aggregate_regenerates() {
    let transport = Arc::new(MockTransport::new().script(
        &feed_url("a"),
        Script::Body(rss(&[item("Reactor story", "https://a.test/reactor-story", 1)])),
    ));
    let cfg = test_config();
    let ttl = cfg.cache_ttl;
    let svc = NewsService::new(vec![source("a", true)], cfg, transport.clone());

    svc.aggregate().await.unwrap();
    tokio::time::advance(ttl - Duration::from_secs(1)).await;
    svc.aggregate().await.unwrap();
    assert_eq!(transport.calls(), 1);

    tokio::time::advance(Duration::from_secs(2)).await;
    let out = svc.aggregate().await.unwrap();
    assert_eq!(transport.calls(), 2);
    assert_eq!(out[0].url, "https://a.test/reactor-story");
}

#[tokio::test]
async fn concurrent_callers_share_one_refresh() {
    let body = rss(&[item("Reactor story", "https://a.test/reactor-story", 1)]);
    let transport = Arc::new(
        MockTransport::new()
            .script(&feed_url("a"), Script::Delay(Duration::from_millis(50), body.clone()))
            .script(&feed_url("b"), Script::Delay(Duration::from_millis(50), body)),
    );
    let svc = NewsService::new(
        vec![source("a", true), source("b", true)],
        test_config(),
        transport.clone(),
    );

    let mut joins = Vec::new();
    for _ in 0..6 {
        let svc = svc.clone();
        joins.push(tokio::spawn(async move { svc.aggregate().await.unwrap() }));
    }
    let mut results = Vec::new();
    for j in joins {
        results.push(j.await.unwrap());
    }

    assert_eq!(transport.calls(), 2, "one fetch per source");
    assert!(results.windows(2).all(|w| w[0] == w[1]));
}

#[tokio::test]
async fn invariants_hold_on_mixed_input() {
    let a_titles: Vec<String> = (0..8).map(|i| format!("Reactor fleet report {i}")).collect();
    let a_links: Vec<String> = (0..8).map(|i| format!("https://a.test/fleet-report-{i}")).collect();
    let a_items: Vec<Item<'_>> = (0..8)
        .map(|i| item(&a_titles[i], &a_links[i], (i as i64) * 7))
        .collect();

    let transport = MockTransport::new()
        .script(&feed_url("a"), Script::Body(rss(&a_items)))
        .script(
            &feed_url("b"),
            Script::Body(rss(&[
                // duplicate of a's first item through an amp variant
                item("Reactor fleet report (amp)", "https://a.test/fleet-report-0/amp", 1),
                item("Uranium price climbs", "https://b.test/uranium-price-climbs", 30),
                item("Old news", "https://b.test/old-news", 24 * 40),
                item("Weather", "https://b.test/weather-today", 2),
            ])),
        )
        .script(&feed_url("c"), Script::Fail("connection reset"));
    let svc = NewsService::new(
        vec![source("a", true), source("b", false), source("c", true)],
        test_config(),
        Arc::new(transport),
    );

    let out = svc.aggregate().await.unwrap();
    assert_invariants(&out, 3);
    assert!(out.len() <= 30);
    assert!(out.iter().any(|a| a.source_id == "b"));
    assert!(!out.iter().any(|a| a.url == "https://b.test/weather-today"));
}
