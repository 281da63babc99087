// src/ingest/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of the feed registry. Immutable after startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub id: String,
    pub name: String,
    pub url: String,
    /// Reputation score, roughly 0..=10.
    pub trust: u8,
    /// `false` means items must pass the keyword relevance gate.
    #[serde(default = "default_strict")]
    pub strict: bool,
}

fn default_strict() -> bool {
    true
}

impl SourceDescriptor {
    pub fn new(id: &str, name: &str, url: &str, trust: u8, strict: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            url: url.to_string(),
            trust,
            strict,
        }
    }
}

/// Unvalidated syndication entry straight out of the parser.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawItem {
    pub title: String,
    pub link: String,
    /// Raw markup, not yet stripped.
    pub description: String,
    pub published: String,
    pub source_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    Policy,
    Expansion,
    Markets,
    Research,
    Safety,
    Innovation,
    Industry,
}

impl Tag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Policy => "Policy",
            Tag::Expansion => "Expansion",
            Tag::Markets => "Markets",
            Tag::Research => "Research",
            Tag::Safety => "Safety",
            Tag::Innovation => "Innovation",
            Tag::Industry => "Industry",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated, scored article. The URL is unique within any returned list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub source: String,
    pub tag: Tag,
    /// `None` only for curated fallback entries.
    pub published_at: Option<DateTime<Utc>>,
    pub date_label: String,
    pub relevance_score: u8,
    pub engagement_score: u8,
    pub excerpt: Option<String>,
    pub why_it_matters: String,
    pub newsletter_cta: String,
    pub source_id: String,
    pub is_fallback: bool,
}

impl Article {
    /// Sort key: unix seconds, missing timestamps count as the epoch.
    pub fn sort_ts(&self) -> i64 {
        self.published_at.map(|d| d.timestamp()).unwrap_or(0)
    }
}
