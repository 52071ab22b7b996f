//! Container browsing with fallback strategies
//!
//! A favorite that points at a show or feed has to be expanded into its
//! children before anything can be played. Devices and providers disagree on
//! how, so three strategies are tried in a fixed order until one yields items:
//!
//! 1. ContentDirectory `Browse` of the direct children
//! 2. the same browse with an alternate id, only after an invalid object id fault
//! 3. MusicServices `GetMetadata`, only for favorites with a provider account
//!
//! Running out of strategies is not an error. The caller gets an empty list
//! and, from [`BrowseCascade::browse_with_report`], a message to show.

use std::fmt;
use std::sync::Arc;

use sonos_api::services::content_directory::{browse_children, BrowseOperation};
use sonos_api::services::music_services::{get_metadata, GetMetadataOperation};
use sonos_api::{ApiError, SonosClient};
use sonos_parser::{DidlObject, MediaEntry, MediaKind, NewDidlItem, DATE_TAGS};

use crate::favorites::{FavoriteRecord, FavoritesCache, ServiceAccount};
use crate::object_id::{self, normalize};
use crate::transport::PlaybackTarget;

/// SMAPI flags for a synthesized `x-sonos-http:` stream URI
const SMAPI_STREAM_FLAGS: u32 = 8224;

/// One child of a browsed container, whatever strategy produced it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowseResultItem {
    /// Id as the source spelled it
    pub id: String,
    /// Wire-form id for browsing this child further
    pub browse_id: String,
    pub title: String,
    /// `originalBroadcastDate`
    pub broadcast_date: Option<String>,
    /// `dc:date`
    pub alternate_broadcast_date: Option<String>,
    pub release_date: Option<String>,
    /// UPnP class, e.g. `object.item.audioItem.musicTrack`
    pub class_hint: String,
    pub uri: Option<String>,
    /// Standalone DIDL-Lite for this child
    pub meta_data: String,
    pub album_art: Option<String>,
}

impl BrowseResultItem {
    /// Build from a DIDL child of a ContentDirectory result
    pub fn from_didl(object: &DidlObject) -> Self {
        let default_class = if object.is_container() { "object.container" } else { "object.item" };
        Self {
            id: object.id.clone(),
            browse_id: normalize(&object.id),
            title: object.title().unwrap_or_default().to_string(),
            broadcast_date: date_field(|tag| object.field(tag), 0),
            alternate_broadcast_date: date_field(|tag| object.field(tag), 1),
            release_date: date_field(|tag| object.field(tag), 2),
            class_hint: object.class().unwrap_or(default_class).to_string(),
            uri: object.uri().map(str::to_string).filter(|u| !u.is_empty()),
            meta_data: object.meta_data().to_string(),
            album_art: object.album_art().map(str::to_string),
        }
    }

    /// Build from a SMAPI entry, synthesizing DIDL and a stream URI as needed
    pub fn from_media_entry(entry: &MediaEntry, favorite: &FavoriteRecord, account: &ServiceAccount) -> Self {
        let class_hint = smapi_class(entry).to_string();
        let uri = entry
            .uri()
            .map(str::to_string)
            .or_else(|| (entry.kind == MediaKind::Metadata).then(|| smapi_stream_uri(&entry.id, account)));
        let title = entry.title().unwrap_or_default().to_string();
        let album_art = entry.album_art().map(str::to_string);

        let meta_data = NewDidlItem {
            id: normalize(&entry.id),
            parent_id: favorite
                .raw_object_id
                .clone()
                .unwrap_or_else(|| favorite.canonical_object_id.clone()),
            title: title.clone(),
            class: class_hint.clone(),
            uri: uri.clone(),
            protocol_info: entry.mime_type().map(|mime| format!("sonos.com-http:*:{}:*", mime)),
            album_art: album_art.clone(),
            desc: favorite.account_id.clone(),
        }
        .to_xml();

        Self {
            id: entry.id.clone(),
            browse_id: normalize(&entry.id),
            title,
            broadcast_date: date_field(|tag| entry.field(tag), 0),
            alternate_broadcast_date: date_field(|tag| entry.field(tag), 1),
            release_date: date_field(|tag| entry.field(tag), 2),
            class_hint,
            uri,
            meta_data,
            album_art,
        }
    }

    /// Candidate dates in preference order
    pub fn dates(&self) -> impl Iterator<Item = &str> {
        [&self.broadcast_date, &self.alternate_broadcast_date, &self.release_date]
            .into_iter()
            .filter_map(|d| d.as_deref())
    }

    /// First date present, unparsed
    pub fn date(&self) -> Option<&str> {
        self.dates().next()
    }

    pub fn is_container(&self) -> bool {
        self.class_hint.starts_with("object.container")
    }

    /// The URI and metadata to hand to the transport, `None` without a URI
    pub fn playback_target(&self) -> Option<PlaybackTarget> {
        self.uri
            .as_ref()
            .map(|uri| PlaybackTarget::new(uri.clone(), self.meta_data.clone()))
    }
}

fn date_field<'a>(field: impl Fn(&str) -> Option<&'a str>, index: usize) -> Option<String> {
    DATE_TAGS
        .get(index)
        .and_then(|&tag| field(tag))
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

fn smapi_class(entry: &MediaEntry) -> &'static str {
    match (entry.kind, entry.item_type()) {
        (MediaKind::Collection, _) => "object.container.playlistContainer",
        (_, Some("stream")) | (_, Some("program")) => "object.item.audioItem.audioBroadcast",
        _ => "object.item.audioItem.musicTrack",
    }
}

fn smapi_stream_uri(id: &str, account: &ServiceAccount) -> String {
    format!(
        "x-sonos-http:{}?sid={}&flags={}&sn={}",
        normalize(id),
        account.service_id,
        SMAPI_STREAM_FLAGS,
        account.serial.as_deref().unwrap_or("0")
    )
}

/// SMAPI id for a content directory id: percent-decoded, without the
/// 8 hex digit flag prefix devices put in front of provider ids
pub fn smapi_id(object_id: &str) -> String {
    let decoded = object_id::decode(object_id);
    match decoded.get(..8) {
        Some(prefix) if decoded.len() > 8 && prefix.chars().all(|c| c.is_ascii_hexdigit()) => {
            decoded[8..].to_string()
        }
        _ => decoded,
    }
}

/// The strategies of the cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowseStrategy {
    Direct,
    Reresolved,
    AlternateProtocol,
}

impl fmt::Display for BrowseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BrowseStrategy::Direct => "direct browse",
            BrowseStrategy::Reresolved => "re-resolved browse",
            BrowseStrategy::AlternateProtocol => "music service metadata",
        })
    }
}

/// What a single strategy did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyAttempt {
    pub strategy: BrowseStrategy,
    /// Id the strategy sent to the device
    pub object_id: String,
    pub items: usize,
    pub error: Option<ApiError>,
}

/// Items plus a record of how they were found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowseOutcome {
    pub items: Vec<BrowseResultItem>,
    /// Strategy that produced `items`, `None` when exhausted
    pub strategy: Option<BrowseStrategy>,
    pub attempts: Vec<StrategyAttempt>,
    /// Explanation when every strategy came back empty
    pub message: Option<String>,
}

impl BrowseOutcome {
    pub fn is_exhausted(&self) -> bool {
        self.items.is_empty()
    }

    fn record(&mut self, strategy: BrowseStrategy, object_id: &str, result: &Result<Vec<BrowseResultItem>, ApiError>) {
        let (items, error) = match result {
            Ok(items) => (items.len(), None),
            Err(e) => (0, Some(e.clone())),
        };
        tracing::debug!(%strategy, object_id, items, error = ?error, "browse strategy finished");
        self.attempts.push(StrategyAttempt {
            strategy,
            object_id: object_id.to_string(),
            items,
            error,
        });
    }

    fn finish(mut self, strategy: BrowseStrategy, items: Vec<BrowseResultItem>) -> Self {
        self.items = items;
        self.strategy = Some(strategy);
        self
    }

    fn exhausted(mut self, object_id: &str) -> Self {
        let tried: Vec<String> = self.attempts.iter().map(|a| a.strategy.to_string()).collect();
        let message = format!(
            "No playable entries found for {} (tried {})",
            object_id::decode(object_id),
            tried.join(", ")
        );
        tracing::info!(object_id, attempts = self.attempts.len(), "browse cascade exhausted");
        self.message = Some(message);
        self
    }
}

/// Expands container ids into their children
#[derive(Debug, Clone)]
pub struct BrowseCascade {
    client: SonosClient,
    favorites: Arc<FavoritesCache>,
    page_size: u32,
}

impl BrowseCascade {
    pub fn new(client: SonosClient, favorites: Arc<FavoritesCache>, page_size: u32) -> Self {
        Self {
            client,
            favorites,
            page_size: page_size.max(1),
        }
    }

    /// Children of `object_id`, empty when every strategy came back empty
    pub fn browse(&self, object_id: &str, device_ip: &str, favorite: Option<&FavoriteRecord>) -> Vec<BrowseResultItem> {
        self.browse_with_report(object_id, device_ip, favorite).items
    }

    /// Like [`browse`](Self::browse), also reporting the strategies tried
    pub fn browse_with_report(
        &self,
        object_id: &str,
        device_ip: &str,
        favorite: Option<&FavoriteRecord>,
    ) -> BrowseOutcome {
        let mut outcome = BrowseOutcome::default();
        let wire_id = normalize(object_id);
        // Resolved lazily, the cache is only consulted when a fallback needs it
        let mut known: Option<Option<FavoriteRecord>> = favorite.map(|f| Some(f.clone()));
        let mut lookup = |cache: &FavoritesCache| -> Option<FavoriteRecord> {
            known.get_or_insert_with(|| cache.find(object_id)).clone()
        };

        let direct = self.direct(&wire_id, device_ip);
        outcome.record(BrowseStrategy::Direct, &wire_id, &direct);
        match direct {
            Ok(items) if !items.is_empty() => return outcome.finish(BrowseStrategy::Direct, items),
            Err(e) if e.is_invalid_object_id() => {
                let alternate = lookup(&self.favorites).and_then(|fav| alternate_id(&fav, &wire_id));
                match alternate {
                    Some(alt) => {
                        tracing::debug!(failed = %wire_id, alternate = %alt, "retrying browse with alternate id");
                        let retried = self.direct(&alt, device_ip);
                        outcome.record(BrowseStrategy::Reresolved, &alt, &retried);
                        if let Ok(items) = retried {
                            if !items.is_empty() {
                                return outcome.finish(BrowseStrategy::Reresolved, items);
                            }
                        }
                    }
                    None => tracing::debug!(failed = %wire_id, "no alternate id to retry with"),
                }
            }
            _ => {}
        }

        if let Some(fav) = lookup(&self.favorites) {
            if let Some(account) = fav.service_account() {
                let id = smapi_id(fav.raw_object_id.as_deref().unwrap_or(object_id));
                let result = self.alternate_protocol(&id, device_ip, &fav, &account);
                outcome.record(BrowseStrategy::AlternateProtocol, &id, &result);
                if let Ok(items) = result {
                    if !items.is_empty() {
                        return outcome.finish(BrowseStrategy::AlternateProtocol, items);
                    }
                }
            }
        }

        outcome.exhausted(&wire_id)
    }

    fn direct(&self, wire_id: &str, device_ip: &str) -> Result<Vec<BrowseResultItem>, ApiError> {
        let response = self
            .client
            .execute::<BrowseOperation>(device_ip, &browse_children(wire_id, self.page_size))?;
        Ok(response
            .document_lenient()
            .objects()
            .iter()
            .map(BrowseResultItem::from_didl)
            .collect())
    }

    fn alternate_protocol(
        &self,
        smapi_id: &str,
        device_ip: &str,
        favorite: &FavoriteRecord,
        account: &ServiceAccount,
    ) -> Result<Vec<BrowseResultItem>, ApiError> {
        let request = get_metadata(
            smapi_id.to_string(),
            0,
            self.page_size,
            false,
            account.service_id.clone(),
            account.account.clone(),
        );
        let response = self.client.execute::<GetMetadataOperation>(device_ip, &request)?;
        Ok(response
            .entries
            .iter()
            .map(|entry| BrowseResultItem::from_media_entry(entry, favorite, account))
            .collect())
    }
}

/// First of the favorite's raw id and metadata id whose wire form differs
/// from the id that was just rejected
fn alternate_id(favorite: &FavoriteRecord, failed: &str) -> Option<String> {
    [
        favorite.raw_object_id.clone(),
        object_id::metadata_object_id(&favorite.meta_data),
    ]
    .into_iter()
    .flatten()
    .map(|id| normalize(&id))
    .find(|id| !id.is_empty() && id != failed)
}
