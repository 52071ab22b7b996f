//! Pattern based extraction for documents a strict reader rejects.
//!
//! Devices and music services occasionally return DIDL with unescaped
//! ampersands, unknown entities or truncated elements. These helpers pull the
//! interesting values out anyway.

use std::sync::OnceLock;

use regex::Regex;

use crate::common::didl::{DidlDocument, DidlKind, DidlObject, ALBUM_ART_TAGS, DATE_TAGS};
use crate::common::escape::unescape_xml;

const SCRAPED_TAGS: &[&str] = &["title", "class", "creator", "album", "res", "desc", "resMD"];

fn object_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?s)<(?:[\w-]+:)?(item|container)\b([^>]*?)(?:/>|>(.*?)</(?:[\w-]+:)?(?:item|container)\s*>)",
        )
        .expect("object pattern is valid")
    })
}

fn root_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<DIDL-Lite\b[^>]*>").expect("root pattern is valid"))
}

fn object_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<(?:[\w-]+:)?(?:item|container)\b[^>]*?\sid\s*=\s*["']([^"']*)["']"#)
            .expect("id pattern is valid")
    })
}

/// Whether the text looks like it holds DIDL children at all
pub fn mentions_objects(xml: &str) -> bool {
    object_regex().is_match(xml)
}

/// Text of the first `<tag>` (any namespace prefix), unescaped and trimmed
pub fn tag_text(xml: &str, tag: &str) -> Option<String> {
    tag_match(xml, tag).map(|(_, text)| text).filter(|t| !t.is_empty())
}

/// Value of `name="..."` within an opening tag's attribute text
pub fn attribute(attrs: &str, name: &str) -> Option<String> {
    let pattern = format!(r#"(?:^|\s){}\s*=\s*["']([^"']*)["']"#, regex::escape(name));
    let re = Regex::new(&pattern).ok()?;
    re.captures(attrs)
        .and_then(|c| c.get(1))
        .map(|m| unescape_xml(m.as_str()))
}

/// `id` attribute of the first item or container
pub fn first_object_id(xml: &str) -> Option<String> {
    object_id_regex()
        .captures(xml)
        .and_then(|c| c.get(1))
        .map(|m| unescape_xml(m.as_str()))
        .filter(|id| !id.is_empty())
}

/// Rebuild a document from whatever objects can be recognized
pub fn scrape_document(xml: &str) -> DidlDocument {
    let root = root_regex().find(xml).map(|m| m.as_str().to_string());

    let objects = object_regex()
        .captures_iter(xml)
        .filter_map(|caps| {
            let kind = match caps.get(1)?.as_str() {
                "container" => DidlKind::Container,
                _ => DidlKind::Item,
            };
            let attrs = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let body = caps.get(3).map(|m| m.as_str()).unwrap_or("");
            let raw = caps.get(0)?.as_str().to_string();

            let mut fields = Vec::new();
            let tags = SCRAPED_TAGS.iter().chain(ALBUM_ART_TAGS).chain(DATE_TAGS);
            for tag in tags {
                if let Some((tag_attrs, text)) = tag_match(body, tag) {
                    if *tag == "res" {
                        for attr in ["protocolInfo", "duration"] {
                            if let Some(value) = attribute(&tag_attrs, attr) {
                                fields.push((format!("res@{}", attr), value));
                            }
                        }
                    }
                    if !text.is_empty() {
                        fields.push((tag.to_string(), text));
                    }
                }
            }

            Some(DidlObject::from_parts(
                kind,
                attribute(attrs, "id").unwrap_or_default(),
                attribute(attrs, "parentID").unwrap_or_default(),
                fields,
                raw,
            ))
        })
        .collect();

    DidlDocument::from_parts(root, objects)
}

fn tag_match(xml: &str, tag: &str) -> Option<(String, String)> {
    let pattern = format!(
        r"(?s)<(?:[\w-]+:)?{tag}\b([^>]*)>(.*?)</(?:[\w-]+:)?{tag}\s*>",
        tag = regex::escape(tag)
    );
    let re = Regex::new(&pattern).ok()?;
    let caps = re.captures(xml)?;
    let attrs = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
    let text = caps
        .get(2)
        .map(|m| unescape_xml(m.as_str().trim()))
        .unwrap_or_default();
    Some((attrs, text))
}
