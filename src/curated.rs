//! Fixed curated articles, served when no live article survives a cycle and
//! as the zero-network "instant" list.

use crate::ingest::types::{Article, Tag};
use crate::relevance::why_it_matters;
use crate::transform::NEWSLETTER_CTA;

pub const CURATED_SOURCE_ID: &str = "curated";
pub const CURATED_RELEVANCE: u8 = 10;
pub const CURATED_ENGAGEMENT: u8 = 35;

struct CuratedEntry {
    title: &'static str,
    source: &'static str,
    tag: Tag,
    url: &'static str,
    date_label: &'static str,
}

const CURATED: &[CuratedEntry] = &[
    CuratedEntry {
        title: "Microsoft restarts Three Mile Island to power its data centers with nuclear",
        source: "Reuters",
        tag: Tag::Industry,
        url: "https://www.reuters.com/business/energy/microsoft-deal-resurrect-three-mile-island-nuclear-plant-2024-09-20/",
        date_label: "Sep 2024",
    },
    CuratedEntry {
        title: "Google signs deal for nuclear power from Kairos Power's small modular reactors",
        source: "Reuters",
        tag: Tag::Innovation,
        url: "https://www.reuters.com/technology/google-inks-deal-nuclear-power-kairos-power-2024-10-14/",
        date_label: "Oct 2024",
    },
    CuratedEntry {
        title: "Amazon signs nuclear energy agreements for multiple advanced reactors",
        source: "Amazon",
        tag: Tag::Industry,
        url: "https://www.aboutamazon.com/news/sustainability/amazon-nuclear-energy-small-modular-reactor-agreements",
        date_label: "Oct 2024",
    },
    CuratedEntry {
        title: "Ontario breaks ground on Canada's first commercial small modular reactor",
        source: "OPG",
        tag: Tag::Expansion,
        url: "https://www.opg.com/media-room/news-releases/2025/ontario-power-generation-breaks-ground-on-canadas-first-commercial-smr/",
        date_label: "Jan 2025",
    },
    CuratedEntry {
        title: "COP28: 22 nations pledge to triple nuclear capacity by 2050",
        source: "World Nuclear News",
        tag: Tag::Policy,
        url: "https://www.world-nuclear-news.org/articles/cop-28-world-leaders-call-for-tripling-of-nuclear-capacity",
        date_label: "Dec 2023",
    },
    CuratedEntry {
        title: "TerraPower begins construction on Natrium sodium-cooled fast reactor in Wyoming",
        source: "TerraPower",
        tag: Tag::Innovation,
        url: "https://www.terrapower.com/natrium-construction-begins-in-kemmerer-wyoming/",
        date_label: "Jun 2024",
    },
    CuratedEntry {
        title: "France extends nuclear reactor lifespans to 60 years with safety investment",
        source: "Reuters",
        tag: Tag::Policy,
        url: "https://www.reuters.com/business/energy/france-plans-extend-nuclear-reactor-lifespans-60-years-2024-11-15/",
        date_label: "Nov 2024",
    },
    CuratedEntry {
        title: "EU taxonomy officially includes nuclear as sustainable investment",
        source: "European Commission",
        tag: Tag::Policy,
        url: "https://finance.ec.europa.eu/sustainable-finance/tools-and-standards/eu-taxonomy-sustainable-activities_en",
        date_label: "2023",
    },
    CuratedEntry {
        title: "Rolls-Royce SMR secures UK government backing for factory-built reactor programme",
        source: "Rolls-Royce",
        tag: Tag::Industry,
        url: "https://www.rolls-royce.com/media/press-releases/2024/rolls-royce-smr-secures-uk-government-backing-for-factory.aspx",
        date_label: "Oct 2024",
    },
    CuratedEntry {
        title: "Poland signs agreement with Westinghouse for six AP1000 reactors",
        source: "World Nuclear News",
        tag: Tag::Expansion,
        url: "https://www.world-nuclear-news.org/articles/poland-and-westinghouse-sign-nuclear-power-plant-project-agreement",
        date_label: "Oct 2024",
    },
    CuratedEntry {
        title: "Kairos Power receives NRC construction permit for Hermes test reactor",
        source: "Kairos Power",
        tag: Tag::Research,
        url: "https://kairospower.com/press-releases/kairos-power-receives-construction-permit-from-the-nrc/",
        date_label: "Dec 2023",
    },
    CuratedEntry {
        title: "US DOE invests $900 million in advanced nuclear reactor demonstrations",
        source: "Department of Energy",
        tag: Tag::Research,
        url: "https://www.energy.gov/ne/articles/doe-announces-900-million-advanced-nuclear-reactor-demonstrations",
        date_label: "Nov 2023",
    },
];

/// The curated list, in fixed order. No network, never empty.
pub fn curated() -> Vec<Article> {
    CURATED
        .iter()
        .map(|c| Article {
            title: c.title.to_string(),
            url: c.url.to_string(),
            source: c.source.to_string(),
            tag: c.tag,
            published_at: None,
            date_label: c.date_label.to_string(),
            relevance_score: CURATED_RELEVANCE,
            engagement_score: CURATED_ENGAGEMENT,
            excerpt: None,
            why_it_matters: why_it_matters(c.tag).to_string(),
            newsletter_cta: NEWSLETTER_CTA.to_string(),
            source_id: CURATED_SOURCE_ID.to_string(),
            is_fallback: true,
        })
        .collect()
}
