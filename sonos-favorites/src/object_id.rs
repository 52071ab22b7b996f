//! Content directory object identifiers
//!
//! Favorites carry their target's object id in several places and several
//! encodings. Devices only accept the percent-encoded wire form; a bare `:`
//! in a browse `ObjectID` is the usual cause of a 701 fault.

use std::borrow::Cow;
use std::sync::OnceLock;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;
use sonos_parser::common::scrape;
use sonos_parser::DidlDocument;

use crate::favorites::FavoriteRecord;

/// Characters encoded when an id is not already in wire form. `/` stays as is.
const OBJECT_ID_RESERVED: &AsciiSet = &CONTROLS
    .add(b':')
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'%')
    .add(b'&');

/// Query parameters that may carry an object id, in lookup order
const ID_QUERY_KEYS: &[&str] = &["id", "objectId", "oid", "cid"];

fn escape_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"%[0-9A-Fa-f]{2}").expect("escape pattern is valid"))
}

/// Whether `id` already contains a `%XX` escape sequence
pub fn is_percent_encoded(id: &str) -> bool {
    escape_regex().is_match(id)
}

/// Bring an object id into wire form.
///
/// Ids that already contain an escape are returned unchanged, everything else
/// has its reserved characters encoded. Applying it twice changes nothing.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if is_percent_encoded(trimmed) {
        return trimmed.to_string();
    }
    utf8_percent_encode(trimmed, OBJECT_ID_RESERVED).to_string()
}

/// Percent-decode an id for display and comparison
pub fn decode(id: &str) -> String {
    percent_decode_str(id).decode_utf8_lossy().into_owned()
}

/// Whether two ids name the same object regardless of encoding or hex case
pub fn same_object(a: &str, b: &str) -> bool {
    a == b || decode(a) == decode(b)
}

/// Derive the id used to browse a favorite's target.
///
/// First non-empty of: the explicit raw id, the id of the first object in the
/// embedded metadata, an id carried in the URI query, the favorite's own
/// content directory id. The result is in wire form.
pub fn derive_canonical_id(favorite: &FavoriteRecord) -> String {
    candidate_ids(favorite)
        .into_iter()
        .next()
        .map(|id| normalize(&id))
        .unwrap_or_default()
}

/// Every id a favorite can be reached by, in derivation order, without
/// duplicates and without empty entries
pub fn candidate_ids(favorite: &FavoriteRecord) -> Vec<String> {
    let sources = [
        favorite.raw_object_id.clone(),
        metadata_object_id(&favorite.meta_data),
        favorite.uri.as_deref().and_then(query_object_id),
        Some(favorite.item_id.clone()),
    ];

    let mut ids: Vec<String> = Vec::new();
    for id in sources.into_iter().flatten() {
        let id = id.trim().to_string();
        if !id.is_empty() && !ids.iter().any(|seen| same_object(seen, &id)) {
            ids.push(id);
        }
    }
    ids
}

/// Id of the first item or container in a DIDL fragment
pub fn metadata_object_id(meta_data: &str) -> Option<String> {
    if meta_data.trim().is_empty() {
        return None;
    }
    match DidlDocument::parse(meta_data) {
        Ok(doc) => doc
            .first()
            .map(|object| object.id.clone())
            .filter(|id| !id.is_empty()),
        Err(_) => scrape::first_object_id(meta_data),
    }
}

/// Object id carried in a URI's query string, percent-decoded
pub fn query_object_id(uri: &str) -> Option<String> {
    let (_, query) = uri.split_once('?')?;
    let params: Vec<(&str, Cow<'_, str>)> = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (key.trim_start_matches("amp;"), percent_decode_str(value).decode_utf8_lossy()))
        .collect();

    ID_QUERY_KEYS.iter().find_map(|wanted| {
        params
            .iter()
            .find(|(key, value)| key == wanted && !value.is_empty())
            .map(|(_, value)| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("show:123", "show%3A123")]
    #[case("show%3A123", "show%3A123")]
    #[case("10fe2664show%3a123", "10fe2664show%3a123")]
    #[case("A:ALBUM/Blue Train", "A%3AALBUM/Blue%20Train")]
    #[case("FV:2/13", "FV%3A2/13")]
    #[case("plain", "plain")]
    #[case("50%off", "50%25off")]
    #[case("", "")]
    fn test_normalize(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize(raw), expected);
    }

    #[test]
    fn test_decode_and_compare() {
        assert_eq!(decode("show%3A123"), "show:123");
        assert!(same_object("show%3a123", "show:123"));
        assert!(same_object("show%3A123", "show%3a123"));
        assert!(!same_object("show:123", "show:124"));
    }

    #[rstest]
    #[case("x-sonosapi-hls:stream?sid=254&id=show%3A9&flags=8232", Some("show:9"))]
    #[case("x-sonosapi-radio:r?sid=2&amp;objectId=station:1", Some("station:1"))]
    #[case("x-sonosapi-radio:r?sid=2&cid=&oid=o1", Some("o1"))]
    #[case("x-sonosapi-radio:r?sid=2", None)]
    #[case("x-file-cifs://nas/a.mp3", None)]
    fn test_query_object_id(#[case] uri: &str, #[case] expected: Option<&str>) {
        assert_eq!(query_object_id(uri).as_deref(), expected);
    }

    #[test]
    fn test_metadata_object_id_strict_and_scraped() {
        let meta = r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/"><container id="10fe2064show%3a123" parentID="p"></container></DIDL-Lite>"#;
        assert_eq!(metadata_object_id(meta).as_deref(), Some("10fe2064show%3a123"));

        // Unescaped ampersand, only the pattern extraction copes
        let broken = r#"<DIDL-Lite><item id="ep:7" parentID="p"><dc:title>A & B</dc:title></item></DIDL-Lite>"#;
        assert_eq!(metadata_object_id(broken).as_deref(), Some("ep:7"));
        assert_eq!(metadata_object_id(""), None);
    }

    fn favorite() -> FavoriteRecord {
        FavoriteRecord {
            item_id: "FV:2/13".to_string(),
            title: "Morning Show".to_string(),
            meta_data: r#"<DIDL-Lite><container id="meta:1" parentID="p"></container></DIDL-Lite>"#.to_string(),
            uri: Some("x-rincon-cpcontainer:x?sid=1&id=uri:1".to_string()),
            raw_object_id: Some("show:123".to_string()),
            ..FavoriteRecord::default()
        }
    }

    #[test]
    fn test_derivation_order() {
        let mut fav = favorite();
        assert_eq!(derive_canonical_id(&fav), "show%3A123");
        fav.raw_object_id = None;
        assert_eq!(derive_canonical_id(&fav), "meta%3A1");
        fav.meta_data.clear();
        assert_eq!(derive_canonical_id(&fav), "uri%3A1");
        fav.uri = None;
        assert_eq!(derive_canonical_id(&fav), "FV%3A2/13");
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let mut fav = favorite();
        fav.canonical_object_id = derive_canonical_id(&fav);
        assert_eq!(derive_canonical_id(&fav), fav.canonical_object_id);
    }

    #[test]
    fn test_candidates_skip_duplicates() {
        let mut fav = favorite();
        fav.raw_object_id = Some("meta%3A1".to_string());
        assert_eq!(candidate_ids(&fav), vec!["meta%3A1", "uri:1", "FV:2/13"]);
    }
}
