// src/transform.rs
//! Item validator/transformer: `RawItem` + `SourceDescriptor` → `Article` or a
//! `Rejection` carrying a stable reason code.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fmt;

use crate::canonical::{canonicalize, is_article_url};
use crate::config::PipelineConfig;
use crate::ingest::types::{Article, RawItem, SourceDescriptor};
use crate::relevance::{infer_tag, relevance_score, why_it_matters};
use crate::scoring::engagement_score;
use crate::text::{excerpt, relative_label, strip_html};

pub const NEWSLETTER_CTA: &str = "Get weekly updates on the nuclear renaissance";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    MissingTitle,
    MissingUrl,
    NonArticleUrl,
    MissingDate,
    Stale { age_days: i64 },
    OffTopic { score: u8 },
}

impl Rejection {
    /// Stable code used for tallies and metrics labels.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::MissingTitle => "missing-title",
            Rejection::MissingUrl => "missing-url",
            Rejection::NonArticleUrl => "non-article-url",
            Rejection::MissingDate => "missing-date",
            Rejection::Stale { .. } => "stale",
            Rejection::OffTopic { .. } => "off-topic",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Stale { age_days } => write!(f, "stale: {age_days}d"),
            Rejection::OffTopic { score } => write!(f, "off-topic: score {score}"),
            other => f.write_str(other.code()),
        }
    }
}

/// Best-effort timestamp parsing across the formats feeds actually emit.
pub fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // RFC 2822 with a weekday that doesn't match the date: drop the weekday.
    if let Some((_, rest)) = s.split_once(", ") {
        let rest = rest
            .trim()
            .replace(" GMT", " +0000")
            .replace(" UTC", " +0000");
        if let Ok(dt) = DateTime::parse_from_str(&rest, "%d %b %Y %H:%M:%S %z") {
            return Some(dt.with_timezone(&Utc));
        }
    }
    // ISO-8601 with a basic-format offset (`+0000`).
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Validate one raw item and build the scored article.
pub fn transform(
    item: &RawItem,
    source: &SourceDescriptor,
    cfg: &PipelineConfig,
    now: DateTime<Utc>,
) -> Result<Article, Rejection> {
    let title = item.title.trim();
    if title.is_empty() {
        return Err(Rejection::MissingTitle);
    }

    let link = item.link.trim();
    if link.is_empty() {
        return Err(Rejection::MissingUrl);
    }
    let url = canonicalize(link);
    if url::Url::parse(&url).is_err() {
        return Err(Rejection::MissingUrl);
    }
    if !is_article_url(&url) {
        return Err(Rejection::NonArticleUrl);
    }

    let published = parse_published(&item.published).ok_or(Rejection::MissingDate)?;
    let age = now - published;
    if age.num_seconds() > cfg.max_age.as_secs() as i64 {
        return Err(Rejection::Stale {
            age_days: (age.num_seconds() as f64 / 86_400.0).round() as i64,
        });
    }

    let description = strip_html(&item.description);
    let relevance = relevance_score(title, &description);
    if !source.strict && relevance < cfg.min_relevance {
        return Err(Rejection::OffTopic { score: relevance });
    }

    let tag = infer_tag(title, &description);
    Ok(Article {
        title: title.to_string(),
        url,
        source: source.name.clone(),
        tag,
        published_at: Some(published),
        date_label: relative_label(published, now),
        relevance_score: relevance,
        engagement_score: engagement_score(title, source.trust, relevance, Some(published), now),
        excerpt: excerpt(&description, cfg.excerpt_budget, cfg.excerpt_min_len),
        why_it_matters: why_it_matters(tag).to_string(),
        newsletter_cta: NEWSLETTER_CTA.to_string(),
        source_id: source.id.clone(),
        is_fallback: false,
    })
}
