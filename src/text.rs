// src/text.rs
//! Text helpers: markup stripping, excerpts, relative-time labels.

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;

/// Unwrap CDATA, strip tags, then decode entities and collapse whitespace.
///
/// Entities are decoded after stripping, so `&lt;` in prose stays text.
pub fn strip_html(s: &str) -> String {
    static RE_CDATA: OnceCell<Regex> = OnceCell::new();
    let re_cdata =
        RE_CDATA.get_or_init(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").expect("cdata regex"));
    let out = re_cdata.replace_all(s, "$1");

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?s)<[^>]+>").expect("tag regex"));
    let out = re_tags.replace_all(&out, " ");

    let out = html_escape::decode_html_entities(&out).replace('\u{00A0}', " ");

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"));
    re_ws.replace_all(&out, " ").trim().to_string()
}

/// Sentence fragments terminated by `.`, `!` or `?` (terminators kept).
pub fn sentences(text: &str) -> Vec<String> {
    static RE_SENT: OnceCell<Regex> = OnceCell::new();
    let re = RE_SENT.get_or_init(|| Regex::new(r"[^.!?]+[.!?]+").expect("sentence regex"));
    re.find_iter(text)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// First one or two sentences of `plain`, within `budget` chars.
///
/// If the first sentence alone overruns the budget it is cut on a word
/// boundary with an ellipsis. Results of `min_len` chars or fewer yield `None`.
pub fn excerpt(plain: &str, budget: usize, min_len: usize) -> Option<String> {
    let sents = sentences(plain);
    let mut out = String::new();

    for s in sents.iter().take(2) {
        let extra = if out.is_empty() { 0 } else { 1 };
        if out.chars().count() + extra + s.chars().count() > budget {
            if out.is_empty() {
                out = cut_on_word(s, budget);
            }
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(s);
    }

    if out.chars().count() > min_len {
        Some(out)
    } else {
        None
    }
}

fn cut_on_word(s: &str, budget: usize) -> String {
    let room = budget.saturating_sub(1);
    let head: String = s.chars().take(room).collect();
    let head = match head.rfind(' ') {
        Some(i) if i > 0 => &head[..i],
        _ => head.as_str(),
    };
    format!("{}…", head.trim_end_matches([',', ';', ':', ' ']))
}

/// Human label for the age of `published` relative to `now`.
pub fn relative_label(published: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let hours = (now - published).num_hours();
    let days = hours / 24;
    if hours < 1 {
        "Just now".to_string()
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days < 7 {
        format!("{days}d ago")
    } else if days > 365 {
        published.format("%b %-d, %Y").to_string()
    } else {
        published.format("%b %-d").to_string()
    }
}

/// Truncate to `max` chars (char-safe), for log/diagnostic fields.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
