//! `getMetadata` result parser

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::common::didl::{ALBUM_ART_TAGS, DATE_TAGS};
use crate::error::{ParseError, ParseResult};

/// Browsable collection or playable media
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Collection,
    Metadata,
}

/// One `<mediaCollection>` or `<mediaMetadata>` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaEntry {
    pub kind: MediaKind,
    pub id: String,
    /// Descendant element text keyed by local name, first occurrence wins
    fields: Vec<(String, String)>,
}

impl MediaEntry {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn title(&self) -> Option<&str> {
        self.field("title")
    }

    /// SMAPI item type such as `track`, `episode`, `stream` or `program`
    pub fn item_type(&self) -> Option<&str> {
        self.field("itemType")
    }

    /// Stream URI when the service supplies one
    pub fn uri(&self) -> Option<&str> {
        self.field("uri").or_else(|| self.field("streamUrl"))
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.field("mimeType")
    }

    pub fn album_art(&self) -> Option<&str> {
        ALBUM_ART_TAGS.iter().find_map(|tag| self.field(tag))
    }

    /// Every date the entry carries, in preference order
    pub fn dates(&self) -> Vec<&str> {
        DATE_TAGS.iter().filter_map(|tag| self.field(tag)).collect()
    }
}

/// Parse every media entry of a `getMetadata` result, in document order.
///
/// The result may be the bare `<getMetadataResult>` or any document that
/// contains one; entries are found at any depth.
pub fn parse_metadata_result(xml: &str) -> ParseResult<Vec<MediaEntry>> {
    let mut reader = Reader::from_str(xml);
    let mut entries = Vec::new();
    let mut current: Option<(MediaKind, Vec<(String, String)>)> = None;
    let mut stack: Vec<(String, String)> = Vec::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ParseError::XmlDeserializationFailed(e.to_string()))?;
        match event {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if current.is_some() {
                    stack.push((name, String::new()));
                } else if let Some(kind) = media_kind(&name) {
                    current = Some((kind, Vec::new()));
                }
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if current.is_none() {
                    if let Some(kind) = media_kind(&name) {
                        entries.push(finish(kind, Vec::new()));
                    }
                }
            }
            Event::End(_) => {
                if let Some((_, fields)) = current.as_mut() {
                    match stack.pop() {
                        Some((name, text)) => {
                            let text = text.trim();
                            if !text.is_empty() && !fields.iter().any(|(k, _)| *k == name) {
                                fields.push((name, text.to_string()));
                            }
                        }
                        None => {
                            if let Some((kind, fields)) = current.take() {
                                entries.push(finish(kind, fields));
                            }
                        }
                    }
                }
            }
            Event::Text(t) => {
                if let Some((_, buffer)) = stack.last_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| ParseError::XmlDeserializationFailed(e.to_string()))?;
                    buffer.push_str(&text);
                }
            }
            Event::CData(c) => {
                if let Some((_, buffer)) = stack.last_mut() {
                    buffer.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if current.is_some() {
        return Err(ParseError::InvalidXmlStructure("unterminated media entry".to_string()));
    }
    Ok(entries)
}

fn media_kind(name: &str) -> Option<MediaKind> {
    match name {
        "mediaCollection" => Some(MediaKind::Collection),
        "mediaMetadata" => Some(MediaKind::Metadata),
        _ => None,
    }
}

fn finish(kind: MediaKind, fields: Vec<(String, String)>) -> MediaEntry {
    let id = fields
        .iter()
        .find(|(k, _)| k == "id")
        .map(|(_, v)| v.clone())
        .unwrap_or_default();
    MediaEntry { kind, id, fields }
}
