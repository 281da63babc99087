//! # URL canonicalization & classification
//!
//! Pure helpers used by the transformer:
//! - `canonicalize` unwraps aggregator redirect links, drops tracking params,
//!   AMP markers and duplicate path slashes.
//! - `is_article_url` rejects index-style pages (tags, pagination, feeds,
//!   authors, static pages, archives, searches).
//!
//! Both are deterministic and do no I/O.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Query parameters that only carry attribution/tracking.
const TRACKING_PARAMS: &[&str] = &[
    "ref", "fbclid", "gclid", "mc_cid", "mc_eid", "_ga",
];

/// Redirector hosts and the query parameter carrying the real target.
const REDIRECTORS: &[(&str, &str)] = &[
    ("news.google.com", "url"),
    ("www.google.com", "q"),
    ("google.com", "q"),
    ("l.facebook.com", "u"),
    ("lm.facebook.com", "u"),
];

static RE_MULTI_SLASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"/{2,}").expect("multi-slash regex"));

static NON_ARTICLE: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^/+$",
        r"(?i)^/(tag|tags|topic|topics|category|categories)(/|$)",
        r"(?i)^/(page|p)/\d+",
        r"(?i)/page/\d+/?$",
        r"(?i)/(feed|rss)(/|$|\?)",
        r"(?i)^/(author|authors|contributor|contributors)(/|$)",
        r"(?i)^/(about|contact|subscribe|newsletter)(/|$)",
        r"(?i)^/(archive|archives)(/|$)",
        r"[?&]s=",
        r"[?&](q|search)=",
        r"[?&](page|p)=\d+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("non-article regex"))
    .collect()
});

fn is_tracking_param(key: &str) -> bool {
    let k = key.to_ascii_lowercase();
    k.starts_with("utm_") || TRACKING_PARAMS.contains(&k.as_str())
}

/// Normalize a link. Unparseable input is returned trimmed but otherwise untouched.
pub fn canonicalize(raw: &str) -> String {
    let raw = raw.trim();
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_string();
    };

    // Unwrap redirectors first; the inner target gets the full treatment.
    let param = url
        .host_str()
        .and_then(|h| REDIRECTORS.iter().find(|(host, _)| *host == h))
        .map(|(_, param)| *param);
    if let Some(param) = param {
        let inner = url
            .query_pairs()
            .find(|(k, _)| k == param)
            .map(|(_, v)| v.into_owned());
        if let Some(inner) = inner {
            if Url::parse(&inner).is_ok() {
                return canonicalize(&inner);
            }
        }
    }

    let mut path = RE_MULTI_SLASH.replace_all(url.path(), "/").into_owned();
    while path.ends_with("/amp") || path.ends_with("/amp/") {
        let cut = path.trim_end_matches('/').len() - "/amp".len();
        path.truncate(cut);
    }
    if path.is_empty() {
        path.push('/');
    }
    url.set_path(&path);

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, v)| !is_tracking_param(k) && !(k == "amp" && v == "1"))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
    url.set_fragment(None);

    url.to_string()
}

/// True if the URL looks like a single article rather than an index page.
pub fn is_article_url(raw: &str) -> bool {
    let Ok(url) = Url::parse(raw.trim()) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    let path = url.path();
    if path.is_empty() || path == "/" {
        return false;
    }

    let probe = match url.query() {
        Some(q) => format!("{path}?{q}"),
        None => path.to_string(),
    };
    if NON_ARTICLE.iter().any(|re| re.is_match(&probe)) {
        return false;
    }

    match path.split('/').filter(|s| !s.is_empty()).last() {
        Some(last) => last.chars().any(|c| c.is_ascii_alphabetic()),
        None => false,
    }
}
