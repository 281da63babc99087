// tests/common/mod.rs
//
// Shared helpers: a scripted in-memory transport and small feed builders.
// Dates are generated relative to "now" so freshness checks stay green.
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use nuclear_news::config::{PipelineConfig, RetrievalChannel};
use nuclear_news::SourceDescriptor;

#[derive(Clone, Debug)]
pub enum Script {
    Body(String),
    Fail(&'static str),
    /// Sleep, then answer with the body.
    Delay(Duration, String),
}

#[derive(Default)]
pub struct MockTransport {
    scripts: Mutex<HashMap<String, Script>>,
    calls: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, url: &str, s: Script) -> Self {
        self.scripts.lock().unwrap().insert(url.to_string(), s);
        self
    }

    pub fn set(&self, url: &str, s: Script) {
        self.scripts.lock().unwrap().insert(url.to_string(), s);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl nuclear_news::ingest::fetcher::FeedTransport for MockTransport {
    async fn get_text(&self, url: &str, _timeout: Duration) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let script = self.scripts.lock().unwrap().get(url).cloned();
        match script {
            Some(Script::Body(b)) => Ok(b),
            Some(Script::Fail(msg)) => Err(anyhow!("{msg}")),
            Some(Script::Delay(d, b)) => {
                tokio::time::sleep(d).await;
                Ok(b)
            }
            None => Err(anyhow!("HTTP 404")),
        }
    }
}

/// Direct channel only, short timeout.
pub fn test_config() -> PipelineConfig {
    PipelineConfig {
        channels: vec![RetrievalChannel::Direct],
        fetch_timeout: Duration::from_millis(200),
        ..PipelineConfig::default()
    }
}

pub fn feed_url(id: &str) -> String {
    format!("https://{id}.test/feed")
}

pub fn source(id: &str, strict: bool) -> SourceDescriptor {
    SourceDescriptor::new(id, &format!("Source {id}"), &feed_url(id), 8, strict)
}

/// RFC 2822 timestamp `hours_ago` hours before now.
pub fn hours_ago(hours: i64) -> String {
    (Utc::now() - ChronoDuration::hours(hours)).to_rfc2822()
}

pub struct Item<'a> {
    pub title: &'a str,
    pub link: &'a str,
    pub published: String,
    pub description: &'a str,
}

pub fn item<'a>(title: &'a str, link: &'a str, hours: i64) -> Item<'a> {
    Item {
        title,
        link,
        published: hours_ago(hours),
        description: "",
    }
}

pub fn rss(items: &[Item<'_>]) -> String {
    let mut s = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel><title>t</title>"#,
    );
    for it in items {
        s.push_str(&format!(
            "<item><title>{}</title><link>{}</link><pubDate>{}</pubDate><description><![CDATA[{}]]></description></item>",
            it.title, it.link, it.published, it.description
        ));
    }
    s.push_str("</channel></rss>");
    s
}
