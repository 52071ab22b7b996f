//! Favorite playback across a speaker group
//!
//! [`PlaybackOrchestrator`] ties the pieces together: find the favorite,
//! expand it when it is a container, pick the newest entry, group the
//! requested devices and start playback on the coordinator. Callers that only
//! need part of that depend on the capability traits instead of the type.

use std::sync::Arc;

use sonos_api::services::rendering_control::{get_volume, set_volume, GetVolumeOperation, SetVolumeOperation};
use sonos_api::SonosClient;

use crate::address::{DeviceAddressCache, TopologySource, ZoneGroupTopologySource};
use crate::browse::{BrowseCascade, BrowseOutcome, BrowseResultItem, BrowseStrategy};
use crate::config::OrchestratorConfig;
use crate::episode::pick_latest;
use crate::error::{PlaybackError, Result};
use crate::favorites::{FavoriteRecord, FavoritesCache};
use crate::group::{DeviceGroup, GroupCoordinator};
use crate::ids::DeviceId;
use crate::notify::{Notification, NotificationSink, TracingSink};
use crate::transport::{PlaybackTarget, TransportCommitter};

const MASTER_CHANNEL: &str = "Master";

/// Looks up device addresses
pub trait AddressResolvable {
    fn resolve_address(&self, device: &DeviceId) -> Result<String>;
}

/// Forms device groups
pub trait Groupable {
    /// Group `device_ids` under the first one
    fn form_group(&self, device_ids: &[DeviceId]) -> Result<DeviceGroup>;
}

/// Starts playback
pub trait Playable {
    /// Resolve a favorite and play it on the requested devices
    fn play_favorite(&self, request: &PlaybackRequest) -> Result<PlaybackOutcome>;

    /// Start an already resolved target on a group
    fn commit(&self, group: &DeviceGroup, target: &PlaybackTarget) -> Result<()>;
}

/// What to play and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackRequest {
    /// Any id the favorite is known by
    pub favorite_id: String,
    /// Target devices, the first one coordinates
    pub device_ids: Vec<DeviceId>,
}

impl PlaybackRequest {
    pub fn new<I, D>(favorite_id: impl Into<String>, device_ids: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<DeviceId>,
    {
        Self {
            favorite_id: favorite_id.into(),
            device_ids: device_ids.into_iter().map(Into::into).collect(),
        }
    }
}

/// Result of a playback request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Playback was committed
    Started {
        group: DeviceGroup,
        target: PlaybackTarget,
        /// The browsed entry that was chosen, `None` for a direct favorite
        item: Option<BrowseResultItem>,
        strategy: Option<BrowseStrategy>,
    },
    /// The favorite resolved to nothing playable
    NothingToPlay { title: String, message: String },
}

impl PlaybackOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, PlaybackOutcome::Started { .. })
    }

    pub fn target(&self) -> Option<&PlaybackTarget> {
        match self {
            PlaybackOutcome::Started { target, .. } => Some(target),
            PlaybackOutcome::NothingToPlay { .. } => None,
        }
    }
}

/// Resolves favorites and plays them on device groups
#[derive(Debug)]
pub struct PlaybackOrchestrator {
    config: OrchestratorConfig,
    client: SonosClient,
    favorites: Arc<FavoritesCache>,
    addresses: Arc<DeviceAddressCache>,
    cascade: BrowseCascade,
    groups: GroupCoordinator,
    committer: TransportCommitter,
    sink: Arc<dyn NotificationSink>,
}

impl PlaybackOrchestrator {
    /// Orchestrator over HTTP with the configured timeouts
    pub fn new(config: OrchestratorConfig, topology: Arc<dyn TopologySource>) -> Self {
        let client = SonosClient::with_timeouts(config.soap_connect_timeout(), config.soap_read_timeout());
        Self::with_client(config, client, topology)
    }

    /// Orchestrator whose topology comes from the configured bootstrap device
    pub fn from_config(config: OrchestratorConfig) -> Result<Self> {
        let bootstrap = config
            .bootstrap_address
            .clone()
            .ok_or_else(|| PlaybackError::Config("no bootstrap address configured".to_string()))?;
        let client = SonosClient::with_timeouts(config.soap_connect_timeout(), config.soap_read_timeout());
        let topology = Arc::new(ZoneGroupTopologySource::new(client.clone(), bootstrap));
        Ok(Self::with_client(config, client, topology))
    }

    pub fn with_client(config: OrchestratorConfig, client: SonosClient, topology: Arc<dyn TopologySource>) -> Self {
        let favorites = Arc::new(FavoritesCache::new());
        let addresses = Arc::new(DeviceAddressCache::new());
        Self {
            cascade: BrowseCascade::new(client.clone(), Arc::clone(&favorites), config.browse_page_size),
            groups: GroupCoordinator::new(client.clone(), Arc::clone(&addresses), topology),
            committer: TransportCommitter::new(client.clone(), config.uri_retry_delay(), config.play_delay()),
            sink: Arc::new(TracingSink),
            config,
            client,
            favorites,
            addresses,
        }
    }

    /// Send notifications somewhere other than the log
    pub fn with_notification_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn favorites(&self) -> &FavoritesCache {
        &self.favorites
    }

    pub fn addresses(&self) -> &DeviceAddressCache {
        &self.addresses
    }

    /// Reload the favorites list from `device`
    pub fn refresh_favorites(&self, device: &DeviceId) -> Result<usize> {
        let ip = self.resolve_address(device)?;
        self.favorites.refresh(
            &self.client,
            &ip,
            &self.config.favorites_container,
            self.config.browse_page_size,
        )
    }

    /// Children of a container favorite, browsed on `device`
    pub fn browse_favorite(&self, favorite_id: &str, device: &DeviceId) -> Result<BrowseOutcome> {
        let ip = self.resolve_address(device)?;
        let favorite = self.find_favorite(favorite_id, device)?;
        Ok(self
            .cascade
            .browse_with_report(&favorite.canonical_object_id, &ip, Some(&favorite)))
    }

    pub fn set_volume(&self, device: &DeviceId, volume: u8) -> Result<()> {
        let ip = self.resolve_address(device)?;
        self.client
            .execute::<SetVolumeOperation>(&ip, &set_volume(MASTER_CHANNEL.to_string(), volume))?;
        tracing::debug!(device = %device, volume, "volume set");
        Ok(())
    }

    pub fn volume(&self, device: &DeviceId) -> Result<u8> {
        let ip = self.resolve_address(device)?;
        let response = self
            .client
            .execute::<GetVolumeOperation>(&ip, &get_volume(MASTER_CHANNEL.to_string()))?;
        Ok(response.current_volume)
    }

    /// Take a device out of its group
    pub fn leave_group(&self, device: &DeviceId) -> Result<()> {
        self.groups.leave_group(device)
    }

    /// Cached favorite, or one refresh from `device` before giving up
    fn find_favorite(&self, favorite_id: &str, device: &DeviceId) -> Result<FavoriteRecord> {
        if let Some(favorite) = self.favorites.find(favorite_id) {
            return Ok(favorite);
        }
        tracing::debug!(favorite_id, "favorite not cached, refreshing");
        self.refresh_favorites(device)?;
        self.favorites
            .find(favorite_id)
            .ok_or_else(|| PlaybackError::FavoriteNotFound(favorite_id.to_string()))
    }

    fn nothing_to_play(&self, title: &str, message: String) -> PlaybackOutcome {
        self.sink.notify(Notification::warning(title, message.clone()));
        PlaybackOutcome::NothingToPlay {
            title: title.to_string(),
            message,
        }
    }

    fn play_resolved(
        &self,
        favorite: &FavoriteRecord,
        device_ids: &[DeviceId],
        target: PlaybackTarget,
        item: Option<BrowseResultItem>,
        strategy: Option<BrowseStrategy>,
    ) -> Result<PlaybackOutcome> {
        let group = self.form_group(device_ids)?;
        if let Err(e) = self.committer.commit(&group, &target) {
            self.sink
                .notify(Notification::error(favorite.title.as_str(), format!("Could not start playback: {}", e)));
            return Err(e);
        }
        Ok(PlaybackOutcome::Started {
            group,
            target,
            item,
            strategy,
        })
    }
}

impl AddressResolvable for PlaybackOrchestrator {
    fn resolve_address(&self, device: &DeviceId) -> Result<String> {
        self.groups.resolve_address(device)
    }
}

impl Groupable for PlaybackOrchestrator {
    fn form_group(&self, device_ids: &[DeviceId]) -> Result<DeviceGroup> {
        self.groups.form_group(device_ids)
    }
}

impl Playable for PlaybackOrchestrator {
    fn play_favorite(&self, request: &PlaybackRequest) -> Result<PlaybackOutcome> {
        let coordinator = request.device_ids.first().ok_or(PlaybackError::EmptyDeviceList)?;
        let favorite = self.find_favorite(&request.favorite_id, coordinator)?;
        tracing::info!(
            favorite = %favorite.title,
            container = favorite.is_container,
            devices = request.device_ids.len(),
            "playing favorite"
        );

        if !favorite.is_container {
            return match PlaybackTarget::from_favorite(&favorite) {
                Some(target) => self.play_resolved(&favorite, &request.device_ids, target, None, None),
                None => Ok(self.nothing_to_play(&favorite.title, "Favorite has no playable URI".to_string())),
            };
        }

        let ip = self.resolve_address(coordinator)?;
        let outcome = self
            .cascade
            .browse_with_report(&favorite.canonical_object_id, &ip, Some(&favorite));
        if outcome.is_exhausted() {
            let message = outcome
                .message
                .unwrap_or_else(|| "Favorite has no playable entries".to_string());
            return Ok(self.nothing_to_play(&favorite.title, message));
        }

        let Some(item) = pick_latest(&outcome.items) else {
            return Ok(self.nothing_to_play(&favorite.title, "Favorite has no playable entries".to_string()));
        };
        tracing::debug!(item = %item.id, date = ?item.date(), "picked latest entry");

        match item.playback_target() {
            Some(target) => {
                let item = item.clone();
                self.play_resolved(&favorite, &request.device_ids, target, Some(item), outcome.strategy)
            }
            None => Ok(self.nothing_to_play(
                &favorite.title,
                format!("Latest entry '{}' has no playable URI", item.title),
            )),
        }
    }

    fn commit(&self, group: &DeviceGroup, target: &PlaybackTarget) -> Result<()> {
        self.committer.commit(group, target)
    }
}
