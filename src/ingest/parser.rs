// src/ingest/parser.rs
//! RSS / Atom parsing.
//!
//! The document is read into a small element tree with `quick_xml`'s pull
//! reader, the dialect is picked from the root element (`ROOT_MARKERS`), and
//! fields are pulled per the dialect's `FieldTable`. Adding a dialect variant
//! means adding a marker and a table, not another branch.

use anyhow::{anyhow, bail, Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::ingest::types::{RawItem, SourceDescriptor};
use crate::text::strip_html;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Rss,
    Atom,
}

/// Root element name → dialect. RSS 1.0 (`rdf:RDF`) shares the RSS table.
const ROOT_MARKERS: &[(&str, Dialect)] = &[
    ("rss", Dialect::Rss),
    ("rdf:RDF", Dialect::Rss),
    ("feed", Dialect::Atom),
];

#[derive(Debug, Clone, Copy)]
enum LinkRule {
    /// `<link>` text, then `href`; falls back to an `http` `<guid>`.
    TextWithPermalink { permalink: &'static str },
    /// `<link rel="alternate" href=..>` or a `<link>` without `rel`.
    AlternateHref,
}

/// Candidate element names per field, in priority order.
#[derive(Debug)]
struct FieldTable {
    entry: &'static str,
    title: &'static [&'static str],
    link: LinkRule,
    description: &'static [&'static str],
    published: &'static [&'static str],
}

const RSS_FIELDS: FieldTable = FieldTable {
    entry: "item",
    title: &["title", "dc:title"],
    link: LinkRule::TextWithPermalink { permalink: "guid" },
    description: &["description", "content:encoded", "summary", "content"],
    published: &["pubDate", "dc:date", "published", "updated"],
};

const ATOM_FIELDS: FieldTable = FieldTable {
    entry: "entry",
    title: &["title"],
    link: LinkRule::AlternateHref,
    description: &["summary", "content", "description"],
    published: &["published", "updated", "issued", "modified", "dc:date"],
};

impl Dialect {
    fn fields(self) -> &'static FieldTable {
        match self {
            Dialect::Rss => &RSS_FIELDS,
            Dialect::Atom => &ATOM_FIELDS,
        }
    }
}

/* ----------------------------
Minimal element tree
---------------------------- */

#[derive(Debug, Default)]
struct Node {
    name: String,
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn from_start(e: &BytesStart<'_>) -> Self {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let attrs = e
            .attributes()
            .flatten()
            .map(|a| {
                let key = String::from_utf8_lossy(a.key.as_ref()).into_owned();
                let val = match a.unescape_value() {
                    Ok(v) => v.into_owned(),
                    Err(_) => {
                        let raw = String::from_utf8_lossy(&a.value);
                        html_escape::decode_html_entities(&raw).into_owned()
                    }
                };
                (key, val)
            })
            .collect();
        Self {
            name,
            attrs,
            ..Self::default()
        }
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Text of this node and all descendants in document order.
    fn full_text(&self) -> &str {
        &self.text
    }

    /// Attach a closed child; its text joins ours, space-separated.
    fn adopt(&mut self, child: Node) {
        self.text.push(' ');
        if !child.text.is_empty() {
            self.text.push_str(&child.text);
            self.text.push(' ');
        }
        self.children.push(child);
    }

    /// Depth-first collection of elements named `name` (not descending into matches).
    fn collect<'a>(&'a self, name: &str, out: &mut Vec<&'a Node>) {
        for c in &self.children {
            if c.name == name {
                out.push(c);
            } else {
                c.collect(name, out);
            }
        }
    }
}

fn read_tree(xml: &str) -> Result<Node> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Node> = vec![Node::default()];

    loop {
        let event = reader
            .read_event()
            .map_err(|e| anyhow!("xml error at byte {}: {}", reader.buffer_position(), e))?;
        match event {
            Event::Start(e) => stack.push(Node::from_start(&e)),
            Event::Empty(e) => {
                let node = Node::from_start(&e);
                if let Some(parent) = stack.last_mut() {
                    parent.adopt(node);
                }
            }
            Event::End(_) => {
                let node = stack.pop().context("unbalanced end tag")?;
                match stack.last_mut() {
                    Some(parent) => parent.adopt(node),
                    None => bail!("unbalanced end tag"),
                }
            }
            Event::Text(t) => {
                let s = match t.unescape() {
                    Ok(s) => s.into_owned(),
                    // HTML entities (&nbsp; etc.) aren't valid XML; decode them leniently.
                    Err(_) => html_escape::decode_html_entities(&String::from_utf8_lossy(&t))
                        .into_owned(),
                };
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&s);
                }
            }
            Event::CData(c) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() != 1 {
        bail!("unclosed elements at end of document");
    }
    let doc = stack.pop().context("empty element stack")?;
    if doc.children.is_empty() {
        bail!("empty document");
    }
    Ok(doc)
}

/// Pick the dialect from the document's root element.
pub fn detect_dialect(xml: &str) -> Result<Dialect> {
    let doc = read_tree(xml)?;
    dialect_of(&doc)
}

fn dialect_of(doc: &Node) -> Result<Dialect> {
    let root = doc.children.first().context("document has no root element")?;
    ROOT_MARKERS
        .iter()
        .find(|(marker, _)| root.name.eq_ignore_ascii_case(marker))
        .map(|(_, d)| *d)
        .ok_or_else(|| anyhow!("unrecognized feed root <{}>", root.name))
}

fn first_text(entry: &Node, names: &[&str]) -> String {
    names
        .iter()
        .filter_map(|n| entry.child(n))
        .map(|n| n.full_text())
        .find(|t| !t.trim().is_empty())
        .unwrap_or_default()
        .to_string()
}

fn extract_link(entry: &Node, rule: LinkRule) -> String {
    match rule {
        LinkRule::TextWithPermalink { permalink } => {
            let mut link = entry
                .child("link")
                .map(|l| {
                    let t = l.full_text().trim().to_string();
                    if t.is_empty() {
                        l.attr("href").unwrap_or_default().trim().to_string()
                    } else {
                        t
                    }
                })
                .unwrap_or_default();
            if !link.starts_with("http") {
                if let Some(guid) = entry.child(permalink) {
                    let g = guid.full_text().trim().to_string();
                    if g.starts_with("http") {
                        link = g;
                    }
                }
            }
            link
        }
        LinkRule::AlternateHref => {
            let links: Vec<&Node> = entry.children.iter().filter(|c| c.name == "link").collect();
            let preferred = links
                .iter()
                .find(|l| matches!(l.attr("rel"), None | Some("alternate")))
                .or_else(|| links.first());
            match preferred {
                Some(l) => match l.attr("href") {
                    Some(h) if !h.trim().is_empty() => h.trim().to_string(),
                    _ => l.full_text().trim().to_string(),
                },
                None => String::new(),
            }
        }
    }
}

/// Parse a feed document into at most `max_items` raw items for `source`.
///
/// Entries without a usable title or link are dropped. A malformed or
/// unrecognized document is an error.
pub fn parse_feed(xml: &str, source: &SourceDescriptor, max_items: usize) -> Result<Vec<RawItem>> {
    let doc = read_tree(xml).with_context(|| format!("parsing feed xml for {}", source.id))?;
    let dialect = dialect_of(&doc).with_context(|| format!("detecting dialect for {}", source.id))?;
    let table = dialect.fields();

    let mut entries = Vec::new();
    doc.collect(table.entry, &mut entries);

    let items = entries
        .into_iter()
        .map(|e| RawItem {
            title: strip_html(&first_text(e, table.title)),
            link: extract_link(e, table.link),
            description: first_text(e, table.description),
            published: first_text(e, table.published).trim().to_string(),
            source_id: source.id.clone(),
        })
        .filter(|it| !it.title.is_empty() && !it.link.is_empty())
        .take(max_items)
        .collect();

    Ok(items)
}
