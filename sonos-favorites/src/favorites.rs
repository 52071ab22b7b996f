//! Favorites snapshot
//!
//! Favorites live in a content directory container (`FV:2`). Each entry wraps
//! the real target: its `res` URI and an escaped `r:resMD` DIDL fragment
//! describing it. The cache is rebuilt wholesale on every refresh.

use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sonos_api::services::content_directory::{browse, BrowseOperation, BROWSE_DIRECT_CHILDREN};
use sonos_api::SonosClient;
use sonos_parser::{DidlDocument, DidlObject};

use crate::error::Result;
use crate::object_id::{self, derive_canonical_id, same_object};

/// URI schemes that name a container the device expands into its queue
pub(crate) const CONTAINER_URI_SCHEMES: &[&str] = &["x-rincon-cpcontainer:", "x-rincon-playlist:"];

fn marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"SA_RINCON(\d+)_(\S*)").expect("marker pattern is valid"))
}

/// One favorite as stored on the household
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteRecord {
    /// The favorite's own id in the favorites container, e.g. `FV:2/13`
    pub item_id: String,
    pub title: String,
    /// Wire-form id used to browse the target
    pub canonical_object_id: String,
    /// The target's id as the metadata spells it
    pub raw_object_id: Option<String>,
    pub uri: Option<String>,
    /// DIDL-Lite describing the target, sent along with the URI
    pub meta_data: String,
    pub is_container: bool,
    /// Provider account marker from the `desc` block
    pub account_id: Option<String>,
    pub album_art: Option<String>,
}

/// Music service account a favorite belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAccount {
    /// Numeric service id as used in `sid=` URI parameters
    pub service_id: String,
    /// Account token after the `SA_RINCON<n>_` prefix
    pub account: String,
    /// Serial number of the account binding, `sn=` in URIs
    pub serial: Option<String>,
}

impl FavoriteRecord {
    /// Build a record from one child of the favorites container
    pub fn from_didl(object: &DidlObject) -> Self {
        let meta_data = object.res_md().unwrap_or_default().trim().to_string();
        let target = if meta_data.is_empty() {
            None
        } else {
            DidlDocument::parse_lenient(&meta_data).into_objects().into_iter().next()
        };

        let uri = object.uri().map(str::trim).filter(|u| !u.is_empty()).map(str::to_string);
        let class = target.as_ref().and_then(|t| t.class()).or_else(|| object.class());
        let is_container = target.as_ref().is_some_and(|t| t.is_container())
            || class.is_some_and(|c| c.starts_with("object.container"))
            || uri.as_deref().map_or(true, |u| CONTAINER_URI_SCHEMES.iter().any(|s| u.starts_with(s)));

        let mut record = FavoriteRecord {
            item_id: object.id.clone(),
            title: object.title().unwrap_or_default().to_string(),
            canonical_object_id: String::new(),
            raw_object_id: target.as_ref().map(|t| t.id.clone()).filter(|id| !id.is_empty()),
            uri,
            account_id: target
                .as_ref()
                .and_then(|t| t.desc())
                .or_else(|| object.desc())
                .map(str::to_string),
            album_art: object
                .album_art()
                .or_else(|| target.as_ref().and_then(|t| t.album_art()))
                .map(str::to_string),
            meta_data,
            is_container,
        };
        record.canonical_object_id = derive_canonical_id(&record);
        record
    }

    /// Provider account, when the metadata carries an `SA_RINCON` marker
    pub fn service_account(&self) -> Option<ServiceAccount> {
        let marker = self
            .account_id
            .as_deref()
            .filter(|m| marker_regex().is_match(m))
            .map(str::to_string)
            .or_else(|| sonos_parser::common::scrape::tag_text(&self.meta_data, "desc"))?;
        let caps = marker_regex().captures(&marker)?;
        let rincon: u32 = caps.get(1)?.as_str().parse().ok()?;
        let account = caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();

        let query_sid = self.uri.as_deref().and_then(|u| query_value(u, "sid"));
        // Account markers encode the service as sid * 256 + 7
        let service_id = query_sid.unwrap_or_else(|| {
            if rincon & 0xff == 7 {
                (rincon >> 8).to_string()
            } else {
                rincon.to_string()
            }
        });

        Some(ServiceAccount {
            service_id,
            account,
            serial: self.uri.as_deref().and_then(|u| query_value(u, "sn")),
        })
    }

    /// Whether `id` names this favorite under any known spelling
    pub fn matches(&self, id: &str) -> bool {
        let id = id.trim();
        if id.is_empty() {
            return false;
        }
        [
            Some(self.item_id.as_str()),
            Some(self.canonical_object_id.as_str()),
            self.raw_object_id.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|known| !known.is_empty())
        .any(|known| same_object(known, id) || object_id::normalize(known) == object_id::normalize(id))
    }
}

fn query_value(uri: &str, key: &str) -> Option<String> {
    let (_, query) = uri.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, v)| k.trim_start_matches("amp;") == key && !v.is_empty())
        .map(|(_, v)| v.to_string())
}

/// Read-mostly snapshot of the household's favorites
#[derive(Debug, Default)]
pub struct FavoritesCache {
    records: RwLock<Arc<Vec<FavoriteRecord>>>,
}

impl FavoritesCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Browse the favorites container on `ip` and replace the snapshot.
    ///
    /// Returns the number of favorites now cached.
    pub fn refresh(&self, client: &SonosClient, ip: &str, container: &str, page_size: u32) -> Result<usize> {
        let page_size = page_size.max(1);
        let mut records = Vec::new();
        let mut start = 0u32;

        loop {
            let request = browse(
                container.to_string(),
                BROWSE_DIRECT_CHILDREN.to_string(),
                "*".to_string(),
                start,
                page_size,
                String::new(),
            );
            let page = client.execute::<BrowseOperation>(ip, &request)?;
            let objects = page.document_lenient().into_objects();
            let returned = objects.len() as u32;
            records.extend(objects.iter().map(FavoriteRecord::from_didl));

            start += returned;
            if returned == 0 || start >= page.total_matches {
                break;
            }
        }

        tracing::info!(ip, container, count = records.len(), "favorites refreshed");
        let count = records.len();
        self.replace(records);
        Ok(count)
    }

    /// Swap in a new snapshot, last writer wins
    pub fn replace(&self, records: Vec<FavoriteRecord>) {
        *self.records.write() = Arc::new(records);
    }

    /// The current snapshot
    pub fn all(&self) -> Arc<Vec<FavoriteRecord>> {
        Arc::clone(&self.records.read())
    }

    /// Look a favorite up by item id, canonical id or raw id in any encoding
    pub fn find(&self, id: &str) -> Option<FavoriteRecord> {
        self.records.read().iter().find(|record| record.matches(id)).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAVORITE_ITEM: &str = r#"<DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/" xmlns:r="urn:schemas-rinconnetworks-com:metadata-1-0/" xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/"><item id="FV:2/13" parentID="FV:2" restricted="false"><dc:title>Morning Show</dc:title><upnp:class>object.itemobject.item.sonos-favorite</upnp:class><upnp:albumArtURI>https://art/show.jpg</upnp:albumArtURI><res protocolInfo="x-rincon-cpcontainer:*:*:*">x-rincon-cpcontainer:1006206cshow%3a123?sid=254&amp;flags=8300&amp;sn=3</res><r:resMD>&lt;DIDL-Lite xmlns:dc=&quot;http://purl.org/dc/elements/1.1/&quot; xmlns:upnp=&quot;urn:schemas-upnp-org:metadata-1-0/upnp/&quot; xmlns=&quot;urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/&quot;&gt;&lt;container id=&quot;1006206cshow%3a123&quot; parentID=&quot;1006206c&quot; restricted=&quot;true&quot;&gt;&lt;dc:title&gt;Morning Show&lt;/dc:title&gt;&lt;upnp:class&gt;object.container.playlistContainer&lt;/upnp:class&gt;&lt;desc id=&quot;cdudn&quot; nameSpace=&quot;urn:schemas-rinconnetworks-com:metadata-1-0/&quot;&gt;SA_RINCON65031_X_#Svc65031-0-Token&lt;/desc&gt;&lt;/container&gt;&lt;/DIDL-Lite&gt;</r:resMD></item></DIDL-Lite>"#;

    fn record() -> FavoriteRecord {
        let doc = DidlDocument::parse(FAVORITE_ITEM).unwrap();
        FavoriteRecord::from_didl(&doc.objects()[0])
    }

    #[test]
    fn test_record_from_favorites_entry() {
        let fav = record();
        assert_eq!(fav.item_id, "FV:2/13");
        assert_eq!(fav.title, "Morning Show");
        assert!(fav.is_container);
        assert_eq!(fav.raw_object_id.as_deref(), Some("1006206cshow%3a123"));
        assert_eq!(fav.canonical_object_id, "1006206cshow%3a123");
        assert_eq!(fav.account_id.as_deref(), Some("SA_RINCON65031_X_#Svc65031-0-Token"));
        assert_eq!(fav.album_art.as_deref(), Some("https://art/show.jpg"));
        assert!(fav.meta_data.starts_with("<DIDL-Lite"));
    }

    #[test]
    fn test_service_account() {
        let account = record().service_account().unwrap();
        assert_eq!(account.service_id, "254");
        assert_eq!(account.account, "X_#Svc65031-0-Token");
        assert_eq!(account.serial.as_deref(), Some("3"));

        let mut fav = record();
        fav.uri = None;
        assert_eq!(fav.service_account().unwrap().service_id, "254");

        fav.account_id = None;
        fav.meta_data.clear();
        assert_eq!(fav.service_account(), None);
    }

    #[test]
    fn test_matches_any_spelling() {
        let fav = record();
        assert!(fav.matches("FV:2/13"));
        assert!(fav.matches("FV%3A2/13"));
        assert!(fav.matches("1006206cshow:123"));
        assert!(fav.matches("1006206cshow%3A123"));
        assert!(!fav.matches("FV:2/14"));
        assert!(!fav.matches(""));
    }

    #[test]
    fn test_cache_replace_is_wholesale() {
        let cache = FavoritesCache::new();
        cache.replace(vec![record()]);
        assert_eq!(cache.len(), 1);
        assert!(cache.find("FV:2/13").is_some());

        cache.replace(Vec::new());
        assert!(cache.is_empty());
        assert!(cache.find("FV:2/13").is_none());
    }

    #[test]
    fn test_direct_item_is_not_container() {
        let xml = r#"<DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/"><item id="FV:2/4" parentID="FV:2"><dc:title>Radio</dc:title><res>x-sonosapi-stream:s1234?sid=254&amp;flags=8224&amp;sn=0</res></item></DIDL-Lite>"#;
        let doc = DidlDocument::parse(xml).unwrap();
        let fav = FavoriteRecord::from_didl(&doc.objects()[0]);
        assert!(!fav.is_container);
        assert_eq!(fav.raw_object_id, None);
        assert_eq!(fav.canonical_object_id, "FV%3A2/4");
    }
}
