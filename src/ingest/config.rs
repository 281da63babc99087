// src/ingest/config.rs
//! Feed registry loading.
//!
//! Lookup order:
//! 1) `$NEWS_FEEDS_PATH` (must exist)
//! 2) `config/feeds.toml`
//! 3) `config/feeds.json`
//! 4) built-in seed
use anyhow::{anyhow, Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::types::SourceDescriptor;

pub const ENV_FEEDS_PATH: &str = "NEWS_FEEDS_PATH";

#[derive(serde::Deserialize)]
struct FeedsFile {
    #[serde(default)]
    feeds: Vec<SourceDescriptor>,
}

/// Built-in registry used when no file is configured.
pub fn default_seed() -> Vec<SourceDescriptor> {
    vec![
        SourceDescriptor::new(
            "wnn",
            "World Nuclear News",
            "https://www.world-nuclear-news.org/rss",
            10,
            true,
        ),
        SourceDescriptor::new("nucnet", "NucNet", "https://www.nucnet.org/feed", 10, true),
        SourceDescriptor::new(
            "ans",
            "ANS Nuclear Newswire",
            "https://www.ans.org/news/rss/",
            9,
            true,
        ),
        SourceDescriptor::new(
            "nrc_news",
            "US Nuclear Regulatory Commission",
            "https://www.nrc.gov/public-involve/rss?feed=news",
            10,
            true,
        ),
        SourceDescriptor::new(
            "power_mag",
            "Power Magazine",
            "https://www.powermag.com/feed/",
            7,
            false,
        ),
        SourceDescriptor::new(
            "neutron_bytes",
            "Neutron Bytes",
            "https://neutronbytes.com/feed/",
            7,
            true,
        ),
        SourceDescriptor::new(
            "nei_mag",
            "Nuclear Engineering International",
            "https://www.neimagazine.com/rss/",
            8,
            true,
        ),
        SourceDescriptor::new("iaea", "IAEA", "https://www.iaea.org/feeds/topnews", 10, false),
        SourceDescriptor::new(
            "doe_ne",
            "US Dept of Energy – Nuclear",
            "https://www.energy.gov/ne/rss.xml",
            9,
            true,
        ),
        SourceDescriptor::new(
            "eia_energy",
            "EIA Today in Energy",
            "https://www.eia.gov/rss/todayinenergy.xml",
            8,
            false,
        ),
        SourceDescriptor::new(
            "mining_uranium",
            "Mining.com – Uranium",
            "https://www.mining.com/feed/?s=uranium",
            7,
            true,
        ),
        SourceDescriptor::new(
            "atomic_insights",
            "Atomic Insights",
            "https://atomicinsights.com/feed/",
            7,
            true,
        ),
        SourceDescriptor::new(
            "env_progress",
            "Environmental Progress",
            "https://environmentalprogress.org/feed",
            8,
            true,
        ),
        SourceDescriptor::new(
            "breakthrough",
            "Breakthrough Institute",
            "https://thebreakthrough.org/feed",
            7,
            false,
        ),
    ]
}

/// Load a registry from an explicit path. Supports TOML or JSON.
pub fn load_registry_from(path: &Path) -> Result<Vec<SourceDescriptor>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feed registry from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let feeds = parse_registry(&content, ext.as_str())
        .with_context(|| format!("parsing feed registry {}", path.display()))?;
    let cleaned = clean_registry(feeds);
    if cleaned.is_empty() {
        tracing::warn!(path = %path.display(), "feed registry is empty; using built-in seed");
        return Ok(default_seed());
    }
    Ok(cleaned)
}

/// Load the registry using env var + fallbacks (see module docs).
pub fn load_registry_default() -> Result<Vec<SourceDescriptor>> {
    if let Ok(p) = std::env::var(ENV_FEEDS_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_registry_from(&pb);
        }
        return Err(anyhow!("{ENV_FEEDS_PATH} points to non-existent path"));
    }
    let toml_p = PathBuf::from("config/feeds.toml");
    if toml_p.exists() {
        return load_registry_from(&toml_p);
    }
    let json_p = PathBuf::from("config/feeds.json");
    if json_p.exists() {
        return load_registry_from(&json_p);
    }
    Ok(default_seed())
}

fn parse_registry(s: &str, hint_ext: &str) -> Result<Vec<SourceDescriptor>> {
    if hint_ext == "json" {
        return parse_json(s);
    }
    if hint_ext == "toml" {
        return parse_toml(s);
    }
    parse_toml(s).or_else(|_| parse_json(s))
}

fn parse_toml(s: &str) -> Result<Vec<SourceDescriptor>> {
    let f: FeedsFile = toml::from_str(s)?;
    Ok(f.feeds)
}

/// Accepts either `{"feeds": [...]}` or a bare array.
fn parse_json(s: &str) -> Result<Vec<SourceDescriptor>> {
    if let Ok(f) = serde_json::from_str::<FeedsFile>(s) {
        return Ok(f.feeds);
    }
    Ok(serde_json::from_str::<Vec<SourceDescriptor>>(s)?)
}

/// Trim fields, drop blank ids/urls, keep the first entry per id.
fn clean_registry(feeds: Vec<SourceDescriptor>) -> Vec<SourceDescriptor> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(feeds.len());
    for mut f in feeds {
        f.id = f.id.trim().to_string();
        f.url = f.url.trim().to_string();
        f.name = f.name.trim().to_string();
        if f.id.is_empty() || f.url.is_empty() {
            continue;
        }
        if f.name.is_empty() {
            f.name = f.id.clone();
        }
        if seen.insert(f.id.clone()) {
            out.push(f);
        }
    }
    out
}
