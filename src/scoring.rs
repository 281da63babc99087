//! Engagement score (0..=100).
//!
//! Composite of:
//! - recency bucket (35 / 30 / 25 / 18 / 12 / 7 / 3),
//! - source trust × 2, capped at 20,
//! - relevance × 2.5, capped at 25,
//! - title heuristics: readable length (+8), contains a digit (+5),
//!   contains `?` (+4), non-empty (+3).

use chrono::{DateTime, Utc};

pub const MAX_ENGAGEMENT: u8 = 100;

/// Upper bound in hours (exclusive) → points. Anything older gets `OLDEST_POINTS`.
const RECENCY_BUCKETS: &[(f64, f64)] = &[
    (1.0, 35.0),
    (6.0, 30.0),
    (24.0, 25.0),
    (48.0, 18.0),
    (168.0, 12.0),
    (720.0, 7.0),
];
const OLDEST_POINTS: f64 = 3.0;

const TRUST_CAP: f64 = 20.0;
const RELEVANCE_CAP: f64 = 25.0;

pub fn recency_points(published: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(p) = published else {
        return 0.0;
    };
    let hours = (now - p).num_seconds() as f64 / 3600.0;
    RECENCY_BUCKETS
        .iter()
        .find(|(limit, _)| hours < *limit)
        .map(|(_, pts)| *pts)
        .unwrap_or(OLDEST_POINTS)
}

pub fn title_points(title: &str) -> f64 {
    let len = title.chars().count();
    let mut s = 0.0;
    if (40..=100).contains(&len) {
        s += 8.0;
    }
    if title.chars().any(|c| c.is_ascii_digit()) {
        s += 5.0;
    }
    if title.contains('?') {
        s += 4.0;
    }
    if len > 0 {
        s += 3.0;
    }
    s
}

pub fn engagement_score(
    title: &str,
    trust: u8,
    relevance: u8,
    published: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> u8 {
    let total = recency_points(published, now)
        + (trust as f64 * 2.0).min(TRUST_CAP)
        + (relevance as f64 * 2.5).min(RELEVANCE_CAP)
        + title_points(title);
    total.min(MAX_ENGAGEMENT as f64).round() as u8
}
