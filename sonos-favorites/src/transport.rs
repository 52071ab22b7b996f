//! Committing playback on a group's coordinator
//!
//! Containers go through the queue, single tracks and streams are set as the
//! transport URI directly. Either way the URI-set step gets one retry after a
//! short delay, and play is only sent after a fixed settle delay.

use std::thread;
use std::time::Duration;

use sonos_api::services::av_transport::{
    add_uri_to_queue, play, remove_all_tracks_from_queue, seek, set_av_transport_uri, AddURIToQueueOperation,
    PlayOperation, RemoveAllTracksFromQueueOperation, SeekOperation, SetAVTransportURIOperation,
};
use sonos_api::SonosClient;
use sonos_parser::common::scrape;

use crate::error::Result;
use crate::favorites::{FavoriteRecord, CONTAINER_URI_SCHEMES};
use crate::group::DeviceGroup;

/// How a target has to be handed to the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetClass {
    /// Expanded into the coordinator's queue
    Queue,
    /// Set as the transport URI
    Direct,
}

/// A resolved URI with its DIDL-Lite metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackTarget {
    pub uri: String,
    pub meta_data: String,
}

impl PlaybackTarget {
    pub fn new(uri: impl Into<String>, meta_data: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            meta_data: meta_data.into(),
        }
    }

    /// Target of a directly playable favorite
    pub fn from_favorite(favorite: &FavoriteRecord) -> Option<Self> {
        favorite
            .uri
            .as_ref()
            .map(|uri| Self::new(uri.clone(), favorite.meta_data.clone()))
    }

    /// The UPnP class declared in the metadata
    pub fn declared_class(&self) -> Option<String> {
        scrape::tag_text(&self.meta_data, "class")
    }

    /// Queue for container classes and container URI schemes, direct otherwise
    pub fn class(&self) -> TargetClass {
        let container_class = self
            .declared_class()
            .is_some_and(|class| class.starts_with("object.container"));
        let container_uri = CONTAINER_URI_SCHEMES
            .iter()
            .any(|scheme| self.uri.starts_with(scheme));
        if container_class || container_uri {
            TargetClass::Queue
        } else {
            TargetClass::Direct
        }
    }
}

/// Sends the URI-set and play commands in order
#[derive(Debug, Clone)]
pub struct TransportCommitter {
    client: SonosClient,
    uri_retry_delay: Duration,
    play_delay: Duration,
}

impl TransportCommitter {
    pub fn new(client: SonosClient, uri_retry_delay: Duration, play_delay: Duration) -> Self {
        Self {
            client,
            uri_retry_delay,
            play_delay,
        }
    }

    /// Start `target` on the group's coordinator.
    ///
    /// Only a failed `Play` is returned as an error. Earlier steps are logged
    /// and playback is attempted anyway.
    pub fn commit(&self, group: &DeviceGroup, target: &PlaybackTarget) -> Result<()> {
        let ip = group.coordinator_address.as_str();
        let class = target.class();
        tracing::info!(coordinator = %group.coordinator_id, uri = %target.uri, ?class, "committing playback");

        match class {
            TargetClass::Queue => {
                if let Err(e) = self
                    .client
                    .execute::<RemoveAllTracksFromQueueOperation>(ip, &remove_all_tracks_from_queue())
                {
                    tracing::warn!(error = %e, "clearing the queue failed");
                }

                let enqueued = self.with_retry("AddURIToQueue", || {
                    self.client.execute::<AddURIToQueueOperation>(
                        ip,
                        &add_uri_to_queue(target.uri.clone(), target.meta_data.clone(), 0, false),
                    )
                });

                if let Err(e) = self.client.execute::<SetAVTransportURIOperation>(
                    ip,
                    &set_av_transport_uri(group.coordinator_id.queue_uri(), String::new()),
                ) {
                    tracing::warn!(error = %e, "selecting the queue as source failed");
                }

                let track = enqueued
                    .map(|response| response.first_track_number_enqueued)
                    .unwrap_or(1)
                    .max(1);
                if let Err(e) = self
                    .client
                    .execute::<SeekOperation>(ip, &seek("TRACK_NR".to_string(), track.to_string()))
                {
                    tracing::warn!(track, error = %e, "seek to enqueued track failed, playing from current position");
                }
            }
            TargetClass::Direct => {
                self.with_retry("SetAVTransportURI", || {
                    self.client.execute::<SetAVTransportURIOperation>(
                        ip,
                        &set_av_transport_uri(target.uri.clone(), target.meta_data.clone()),
                    )
                });
            }
        }

        thread::sleep(self.play_delay);
        self.client.execute::<PlayOperation>(ip, &play("1".to_string()))?;
        tracing::info!(coordinator = %group.coordinator_id, "playback started");
        Ok(())
    }

    /// Run the URI-set step, once more after `uri_retry_delay` if it fails
    fn with_retry<T>(&self, step: &str, op: impl Fn() -> sonos_api::Result<T>) -> Option<T> {
        let first = match op() {
            Ok(value) => return Some(value),
            Err(e) => e,
        };
        tracing::warn!(step, error = %first, delay = ?self.uri_retry_delay, "URI-set failed, retrying once");
        thread::sleep(self.uri_retry_delay);
        match op() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(step, error = %e, "URI-set failed again, issuing play anyway");
                None
            }
        }
    }
}
