//! DIDL-Lite documents for media metadata
//!
//! ContentDirectory answers `Browse` with a DIDL-Lite document holding any
//! mix of `<container>` and `<item>` children:
//!
//! ```xml
//! <DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/" ...>
//!   <container id="SQ:3" parentID="SQ:" restricted="true">
//!     <dc:title>Evening</dc:title>
//!     <upnp:class>object.container.playlistContainer</upnp:class>
//!     <res protocolInfo="file:*:audio/mpegurl:*">file:///jffs/settings/savedqueues.rsq#3</res>
//!   </container>
//!   <item id="ep:2" parentID="show:123">
//!     <dc:title>Episode 2</dc:title>
//!     <upnp:originalBroadcastDate>2024-01-08</upnp:originalBroadcastDate>
//!     <res protocolInfo="http-get:*:audio/mpeg:*">https://cdn.example/ep2.mp3</res>
//!   </item>
//! </DIDL-Lite>
//! ```
//!
//! Children are kept in document order together with their raw XML so a
//! single one can be handed back to a renderer as standalone metadata under
//! the original root namespaces.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::common::escape::escape_xml;
use crate::common::scrape;
use crate::error::{ParseError, ParseResult};

/// Tags carrying artwork, in order of preference
pub const ALBUM_ART_TAGS: &[&str] = &["albumArtURI", "albumArtUri", "albumArt", "logo"];

/// Tags carrying a publication date, in order of preference
pub const DATE_TAGS: &[&str] = &["originalBroadcastDate", "date", "releaseDate"];

/// Root element used when a document has to be produced from scratch
pub const DIDL_ROOT: &str = r#"<DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/" xmlns:r="urn:schemas-rinconnetworks-com:metadata-1-0/" xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/">"#;

/// Whether a DIDL child is browsable or playable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DidlKind {
    Container,
    Item,
}

impl DidlKind {
    fn from_tag(name: &str) -> Option<Self> {
        match name {
            "container" => Some(DidlKind::Container),
            "item" => Some(DidlKind::Item),
            _ => None,
        }
    }
}

/// One `<container>` or `<item>` of a DIDL-Lite document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DidlObject {
    pub kind: DidlKind,
    pub id: String,
    pub parent_id: String,
    /// Child element text keyed by local name, attributes as `element@attr`.
    /// Only the first occurrence of a name is kept.
    fields: Vec<(String, String)>,
    raw: String,
    standalone: String,
}

impl DidlObject {
    pub(crate) fn from_parts(
        kind: DidlKind,
        id: String,
        parent_id: String,
        fields: Vec<(String, String)>,
        raw: String,
    ) -> Self {
        Self {
            kind,
            id,
            parent_id,
            fields,
            raw,
            standalone: String::new(),
        }
    }

    /// Text of the first child element with this local name
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First present field among `names`, in the given order
    pub fn first_of(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| self.field(name))
    }

    pub fn title(&self) -> Option<&str> {
        self.field("title")
    }

    /// UPnP class such as `object.item.audioItem.musicTrack`
    pub fn class(&self) -> Option<&str> {
        self.field("class")
    }

    pub fn creator(&self) -> Option<&str> {
        self.field("creator")
    }

    /// The `<res>` URI
    pub fn uri(&self) -> Option<&str> {
        self.field("res")
    }

    pub fn protocol_info(&self) -> Option<&str> {
        self.field("res@protocolInfo")
    }

    pub fn album_art(&self) -> Option<&str> {
        self.first_of(ALBUM_ART_TAGS)
    }

    /// Every date the object carries, in [`DATE_TAGS`] order
    pub fn dates(&self) -> Vec<&str> {
        DATE_TAGS.iter().filter_map(|tag| self.field(tag)).collect()
    }

    /// The `<desc>` text, for music service content this is the
    /// `SA_RINCON<sid>_<account>` marker
    pub fn desc(&self) -> Option<&str> {
        self.field("desc")
    }

    /// Embedded `<r:resMD>` metadata, already unescaped
    pub fn res_md(&self) -> Option<&str> {
        self.field("resMD")
    }

    pub fn is_container(&self) -> bool {
        self.kind == DidlKind::Container
    }

    /// The object's own XML as it appeared in the document
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The object wrapped in the document root, ready to send as metadata
    pub fn meta_data(&self) -> &str {
        &self.standalone
    }
}

/// A parsed DIDL-Lite document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DidlDocument {
    root: String,
    objects: Vec<DidlObject>,
}

impl DidlDocument {
    pub(crate) fn from_parts(root: Option<String>, mut objects: Vec<DidlObject>) -> Self {
        let root = root.unwrap_or_else(|| DIDL_ROOT.to_string());
        for object in &mut objects {
            object.standalone = format!("{}{}</DIDL-Lite>", root, object.raw);
        }
        Self { root, objects }
    }

    /// Strict parse, any malformed markup is an error
    pub fn parse(xml: &str) -> ParseResult<Self> {
        let mut reader = Reader::from_str(xml);
        let mut root = None;
        let mut objects = Vec::new();
        let mut current: Option<ObjectBuilder> = None;

        loop {
            let before = reader.buffer_position();
            let event = reader.read_event().map_err(|e| {
                ParseError::XmlDeserializationFailed(format!("DIDL-Lite at byte {}: {}", before, e))
            })?;

            match event {
                Event::Start(e) => {
                    let name = local_name(&e);
                    if let Some(builder) = current.as_mut() {
                        builder.open(&name, &e)?;
                    } else if let Some(kind) = DidlKind::from_tag(&name) {
                        current = Some(ObjectBuilder::new(kind, &e, before)?);
                    } else if name == "DIDL-Lite" && root.is_none() {
                        root = Some(xml[before..reader.buffer_position()].trim().to_string());
                    }
                }
                Event::Empty(e) => {
                    let name = local_name(&e);
                    if let Some(builder) = current.as_mut() {
                        builder.open(&name, &e)?;
                        builder.close();
                    } else if let Some(kind) = DidlKind::from_tag(&name) {
                        let builder = ObjectBuilder::new(kind, &e, before)?;
                        let end = reader.buffer_position();
                        objects.push(builder.finish(&xml[before..end]));
                    }
                }
                Event::End(_) => {
                    let object_closed = match current.as_mut() {
                        Some(builder) if builder.stack.is_empty() => true,
                        Some(builder) => {
                            builder.close();
                            false
                        }
                        None => false,
                    };
                    if object_closed {
                        if let Some(builder) = current.take() {
                            let start = builder.start;
                            let end = reader.buffer_position();
                            objects.push(builder.finish(&xml[start..end]));
                        }
                    }
                }
                Event::Text(t) => {
                    if let Some(builder) = current.as_mut() {
                        let text = t
                            .unescape()
                            .map_err(|e| ParseError::XmlDeserializationFailed(e.to_string()))?;
                        builder.text(&text);
                    }
                }
                Event::CData(c) => {
                    if let Some(builder) = current.as_mut() {
                        builder.text(&String::from_utf8_lossy(&c.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(builder) = current {
            return Err(ParseError::InvalidXmlStructure(format!(
                "unterminated {:?} {}",
                builder.kind, builder.id
            )));
        }

        Ok(Self::from_parts(root, objects))
    }

    /// Strict parse with a pattern based fallback.
    ///
    /// Never fails: markup the strict reader rejects is scraped instead, and
    /// text with no recognizable object yields an empty document.
    pub fn parse_lenient(xml: &str) -> Self {
        match Self::parse(xml) {
            Ok(doc) if !doc.objects.is_empty() || !scrape::mentions_objects(xml) => doc,
            _ => scrape::scrape_document(xml),
        }
    }

    pub fn objects(&self) -> &[DidlObject] {
        &self.objects
    }

    pub fn into_objects(self) -> Vec<DidlObject> {
        self.objects
    }

    pub fn first(&self) -> Option<&DidlObject> {
        self.objects.first()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// The opening root tag with its namespace declarations
    pub fn root_tag(&self) -> &str {
        &self.root
    }
}

struct ObjectBuilder {
    kind: DidlKind,
    id: String,
    parent_id: String,
    start: usize,
    fields: Vec<(String, String)>,
    stack: Vec<(String, String)>,
}

impl ObjectBuilder {
    fn new(kind: DidlKind, element: &BytesStart<'_>, start: usize) -> ParseResult<Self> {
        let mut id = String::new();
        let mut parent_id = String::new();
        for (key, value) in attributes(element)? {
            match key.as_str() {
                "id" => id = value,
                "parentID" => parent_id = value,
                _ => {}
            }
        }
        Ok(Self {
            kind,
            id,
            parent_id,
            start,
            fields: Vec::new(),
            stack: Vec::new(),
        })
    }

    fn open(&mut self, name: &str, element: &BytesStart<'_>) -> ParseResult<()> {
        for (key, value) in attributes(element)? {
            self.record(format!("{}@{}", name, key), value);
        }
        self.stack.push((name.to_string(), String::new()));
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if let Some((_, buffer)) = self.stack.last_mut() {
            buffer.push_str(text);
        }
    }

    fn close(&mut self) {
        if let Some((name, text)) = self.stack.pop() {
            let text = text.trim();
            if !text.is_empty() {
                self.record(name, text.to_string());
            }
        }
    }

    fn record(&mut self, key: String, value: String) {
        if !self.fields.iter().any(|(existing, _)| *existing == key) {
            self.fields.push((key, value));
        }
    }

    fn finish(self, raw: &str) -> DidlObject {
        DidlObject::from_parts(self.kind, self.id, self.parent_id, self.fields, raw.to_string())
    }
}

fn local_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}

fn attributes(element: &BytesStart<'_>) -> ParseResult<Vec<(String, String)>> {
    let mut out = Vec::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| ParseError::InvalidXmlStructure(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| ParseError::XmlDeserializationFailed(e.to_string()))?;
        out.push((key, value.into_owned()));
    }
    Ok(out)
}

/// A single item to synthesize, used when content has no DIDL of its own
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewDidlItem {
    pub id: String,
    pub parent_id: String,
    pub title: String,
    pub class: String,
    pub uri: Option<String>,
    pub protocol_info: Option<String>,
    pub album_art: Option<String>,
    pub desc: Option<String>,
}

impl NewDidlItem {
    /// Render as a complete DIDL-Lite document
    pub fn to_xml(&self) -> String {
        let mut body = format!(
            r#"<item id="{}" parentID="{}" restricted="true"><dc:title>{}</dc:title><upnp:class>{}</upnp:class>"#,
            escape_xml(&self.id),
            escape_xml(&self.parent_id),
            escape_xml(&self.title),
            escape_xml(&self.class),
        );
        if let Some(art) = &self.album_art {
            body.push_str(&format!("<upnp:albumArtURI>{}</upnp:albumArtURI>", escape_xml(art)));
        }
        if let Some(uri) = &self.uri {
            let protocol = self.protocol_info.as_deref().unwrap_or("sonos.com-http:*:audio/mpeg:*");
            body.push_str(&format!(
                r#"<res protocolInfo="{}">{}</res>"#,
                escape_xml(protocol),
                escape_xml(uri)
            ));
        }
        if let Some(desc) = &self.desc {
            body.push_str(&format!(
                r#"<desc id="cdudn" nameSpace="urn:schemas-rinconnetworks-com:metadata-1-0/">{}</desc>"#,
                escape_xml(desc)
            ));
        }
        format!("{}{}</item></DIDL-Lite>", DIDL_ROOT, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BROWSE: &str = r#"<DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/" xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/"><container id="SQ:3" parentID="SQ:" restricted="true"><dc:title>Evening</dc:title><upnp:class>object.container.playlistContainer</upnp:class><res protocolInfo="file:*:audio/mpegurl:*">file:///jffs/settings/savedqueues.rsq#3</res></container><item id="ep:2" parentID="show:123"><dc:title>Fish &amp; Chips</dc:title><upnp:class>object.item.audioItem.podcast</upnp:class><upnp:originalBroadcastDate>2024-01-08</upnp:originalBroadcastDate><dc:date>2024-01-09</dc:date><upnp:albumArtURI>https://cdn.example/2.jpg</upnp:albumArtURI><res protocolInfo="http-get:*:audio/mpeg:*" duration="0:41:00">https://cdn.example/ep2.mp3</res></item></DIDL-Lite>"#;

    #[test]
    fn test_parse_containers_and_items_in_order() {
        let doc = DidlDocument::parse(BROWSE).unwrap();
        assert_eq!(doc.len(), 2);

        let container = &doc.objects()[0];
        assert!(container.is_container());
        assert_eq!(container.id, "SQ:3");
        assert_eq!(container.parent_id, "SQ:");
        assert_eq!(container.title(), Some("Evening"));
        assert_eq!(container.uri(), Some("file:///jffs/settings/savedqueues.rsq#3"));

        let item = &doc.objects()[1];
        assert_eq!(item.kind, DidlKind::Item);
        assert_eq!(item.title(), Some("Fish & Chips"));
        assert_eq!(item.protocol_info(), Some("http-get:*:audio/mpeg:*"));
        assert_eq!(item.field("res@duration"), Some("0:41:00"));
        assert_eq!(item.album_art(), Some("https://cdn.example/2.jpg"));
        assert_eq!(item.dates(), vec!["2024-01-08", "2024-01-09"]);
    }

    #[test]
    fn test_meta_data_keeps_root_namespaces() {
        let doc = DidlDocument::parse(BROWSE).unwrap();
        let meta = doc.objects()[1].meta_data();
        assert!(meta.starts_with(r#"<DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/""#));
        assert!(meta.contains(r#"<item id="ep:2" parentID="show:123">"#));
        assert!(meta.ends_with("</item></DIDL-Lite>"));
        assert!(!meta.contains("SQ:3"));

        // The standalone fragment parses back to the same object
        let reparsed = DidlDocument::parse(meta).unwrap();
        assert_eq!(reparsed.len(), 1);
        assert_eq!(reparsed.objects()[0].id, "ep:2");
    }

    #[test]
    fn test_album_art_fallback_tags() {
        let xml = r#"<DIDL-Lite><item id="1" parentID="0"><r:logo xmlns:r="urn:r">https://logo</r:logo></item></DIDL-Lite>"#;
        let doc = DidlDocument::parse(xml).unwrap();
        assert_eq!(doc.objects()[0].album_art(), Some("https://logo"));
    }

    #[test]
    fn test_res_md_and_desc_are_exposed() {
        let xml = r#"<DIDL-Lite><item id="FV:2/7" parentID="FV:2"><dc:title xmlns:dc="d">Show</dc:title><r:resMD xmlns:r="r">&lt;DIDL-Lite&gt;&lt;item id="show%3a123"&gt;&lt;/item&gt;&lt;/DIDL-Lite&gt;</r:resMD><desc id="cdudn">SA_RINCON2311_X_#Svc2311-0-Token</desc></item></DIDL-Lite>"#;
        let object = DidlDocument::parse(xml).unwrap().into_objects().remove(0);
        assert_eq!(
            object.res_md(),
            Some(r#"<DIDL-Lite><item id="show%3a123"></item></DIDL-Lite>"#)
        );
        assert_eq!(object.desc(), Some("SA_RINCON2311_X_#Svc2311-0-Token"));
        assert_eq!(object.field("desc@id"), Some("cdudn"));
    }

    #[test]
    fn test_empty_and_self_closing() {
        let doc = DidlDocument::parse(r#"<DIDL-Lite xmlns="urn:x"></DIDL-Lite>"#).unwrap();
        assert!(doc.is_empty());

        let doc = DidlDocument::parse(r#"<DIDL-Lite><item id="a" parentID="b"/></DIDL-Lite>"#).unwrap();
        assert_eq!(doc.first().map(|o| o.id.as_str()), Some("a"));
        assert_eq!(doc.first().map(|o| o.raw()), Some(r#"<item id="a" parentID="b"/>"#));
    }

    #[test]
    fn test_strict_parse_rejects_broken_markup() {
        assert!(DidlDocument::parse(r#"<DIDL-Lite><item id="a"><dc:title>x</item></DIDL-Lite>"#).is_err());
        assert!(DidlDocument::parse(r#"<DIDL-Lite><item id="a">"#).is_err());
    }

    #[test]
    fn test_lenient_parse_recovers_broken_markup() {
        let broken = r#"<DIDL-Lite><item id="ep:1" parentID="show:1"><dc:title>Tom &amp Jerry</dc:title><res>https://cdn/1.mp3</res></item></DIDL-Lite>"#;
        assert!(DidlDocument::parse(broken).is_err());

        let doc = DidlDocument::parse_lenient(broken);
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.objects()[0].id, "ep:1");
        assert_eq!(doc.objects()[0].uri(), Some("https://cdn/1.mp3"));
    }

    #[test]
    fn test_lenient_parse_of_garbage_is_empty() {
        assert!(DidlDocument::parse_lenient("not xml at all").is_empty());
        assert!(DidlDocument::parse_lenient("").is_empty());
    }

    #[test]
    fn test_new_item_renders_parseable_didl() {
        let item = NewDidlItem {
            id: "ep:9".to_string(),
            parent_id: "show:1".to_string(),
            title: "Q&A".to_string(),
            class: "object.item.audioItem.podcast".to_string(),
            uri: Some("x-sonos-http:ep%3a9?sid=254&flags=8224&sn=1".to_string()),
            desc: Some("SA_RINCON65031_".to_string()),
            ..Default::default()
        };
        let xml = item.to_xml();
        let doc = DidlDocument::parse(&xml).unwrap();
        let object = doc.first().unwrap();
        assert_eq!(object.title(), Some("Q&A"));
        assert_eq!(object.uri(), Some("x-sonos-http:ep%3a9?sid=254&flags=8224&sn=1"));
        assert_eq!(object.desc(), Some("SA_RINCON65031_"));
    }
}
