// src/relevance.rs
//! Topic relevance gate and category inference.
//!
//! - `relevance_score`: distinct nuclear keyword hits × 2, capped at 10.
//! - `infer_tag`: ordered regex rules, first match wins, default `Industry`.
//! - `why_it_matters`: fixed one-liner per category.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ingest::types::Tag;

pub const MAX_RELEVANCE: u8 = 10;
const POINTS_PER_HIT: u8 = 2;

/// Lowercase substrings; each distinct hit counts once.
pub const NUCLEAR_KEYWORDS: &[&str] = &[
    "nuclear",
    "reactor",
    "uranium",
    "fission",
    "fusion",
    "smr",
    "haleu",
    "enrichment",
    "plutonium",
    "candu",
    "vver",
    "thorium",
    "westinghouse",
    "nuscale",
    "oklo",
    "cameco",
    "centrus",
    "iter",
    "tokamak",
    "kairos",
    "terrapower",
    "x-energy",
    "darlington",
    "vogtle",
    "iaea",
    "nrc",
    "decommission",
    "spent fuel",
    "nuclear waste",
    "gigawatt",
    "megawatt",
    "baseload",
    "decarbonization",
    "zero-carbon",
    "low-carbon",
    "gen iv",
    "fast reactor",
    "pressurized water",
    "boiling water",
    "microreactor",
];

/// Keywords from `NUCLEAR_KEYWORDS` present in `title + description`.
pub fn matched_keywords(title: &str, description: &str) -> Vec<&'static str> {
    let text = format!("{title} {description}").to_lowercase();
    NUCLEAR_KEYWORDS
        .iter()
        .copied()
        .filter(|kw| text.contains(kw))
        .collect()
}

/// Relevance in 0..=10.
pub fn relevance_score(title: &str, description: &str) -> u8 {
    let hits = matched_keywords(title, description).len();
    let raw = hits.saturating_mul(POINTS_PER_HIT as usize);
    raw.min(MAX_RELEVANCE as usize) as u8
}

/* ----------------------------
Tag rules (order matters)
---------------------------- */

struct TagRule {
    tag: Tag,
    re: Regex,
}

const TAG_PATTERNS: &[(Tag, &str)] = &[
    (
        Tag::Policy,
        r"(?i)policy|regulat|legislation|government|NRC|IAEA|permit|licens|\bban\b|treaty|approval",
    ),
    (
        Tag::Expansion,
        r"(?i)construction|build|new reactor|new plant|SMR|modular|deploy|commission|startup|breaks ground",
    ),
    (
        Tag::Markets,
        r"(?i)uranium.*price|price.*uranium|stock|market|invest|billion|deal|acqui|merger|revenue|earnings|funding",
    ),
    (
        Tag::Research,
        r"(?i)fusion|research|study|scientist|breakthrough|experiment|ITER|plasma|demonstration|prototype",
    ),
    (
        Tag::Safety,
        r"(?i)safety|incident|shutdown|leak|radiation|emergency|risk|inspection|accident|contamin",
    ),
    (
        Tag::Innovation,
        r"(?i)advanced|microreactor|molten salt|thorium|fast reactor|next.gen|generation IV|gen[- ]?4",
    ),
];

static TAG_RULES: Lazy<Vec<TagRule>> = Lazy::new(|| {
    TAG_PATTERNS
        .iter()
        .map(|(tag, pat)| TagRule {
            tag: *tag,
            re: Regex::new(pat).expect("tag rule regex"),
        })
        .collect()
});

/// Classify by the first matching rule; `Industry` when nothing matches.
pub fn infer_tag(title: &str, description: &str) -> Tag {
    let text = format!("{title} {description}");
    TAG_RULES
        .iter()
        .find(|r| r.re.is_match(&text))
        .map(|r| r.tag)
        .unwrap_or(Tag::Industry)
}

pub fn why_it_matters(tag: Tag) -> &'static str {
    match tag {
        Tag::Policy => {
            "Policy decisions determine which energy technologies get built, and how fast."
        }
        Tag::Expansion => {
            "Every new reactor adds around-the-clock zero-carbon electricity to the grid."
        }
        Tag::Markets => {
            "Capital flows reveal where smart money is going in the clean energy transition."
        }
        Tag::Research => "Today's research milestones become tomorrow's operating power plants.",
        Tag::Safety => {
            "Transparency about safety events is how the nuclear industry earns public trust."
        }
        Tag::Innovation => {
            "Next-generation designs could make nuclear faster, cheaper, and safer to deploy."
        }
        Tag::Industry => "Industry moves show how the global nuclear fleet is evolving right now.",
    }
}
