//! Shared fixtures for the orchestrator tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use soap_client::mock::MockTransport;
use sonos_api::SonosClient;
use sonos_favorites::{
    derive_canonical_id, FavoriteRecord, Notification, NotificationSink, OrchestratorConfig, PlaybackOrchestrator,
    StaticTopology, TopologyEntry,
};
use sonos_parser::{escape_xml, DIDL_ROOT};

pub const KITCHEN: &str = "RINCON_000E58A0000101400";
pub const DEN: &str = "RINCON_000E58A0000201400";
pub const PATIO: &str = "RINCON_000E58A0000301400";

pub const KITCHEN_IP: &str = "10.0.0.1";
pub const DEN_IP: &str = "10.0.0.2";
pub const PATIO_IP: &str = "10.0.0.3";

pub fn household() -> StaticTopology {
    StaticTopology::new(vec![
        TopologyEntry::new(KITCHEN, KITCHEN_IP, "Kitchen"),
        TopologyEntry::new(DEN, DEN_IP, "Den"),
        TopologyEntry::new(PATIO, PATIO_IP, "Patio"),
    ])
}

pub fn fast_config() -> OrchestratorConfig {
    OrchestratorConfig::default()
        .with_uri_retry_delay(Duration::from_millis(5))
        .with_play_delay(Duration::from_millis(5))
}

pub fn client() -> (Arc<MockTransport>, SonosClient) {
    let mock = Arc::new(MockTransport::new());
    (mock.clone(), SonosClient::with_transport(mock))
}

pub fn orchestrator() -> (Arc<MockTransport>, Arc<RecordingSink>, PlaybackOrchestrator) {
    let (mock, client) = client();
    let sink = Arc::new(RecordingSink::default());
    let orchestrator = PlaybackOrchestrator::with_client(fast_config(), client, Arc::new(household()))
        .with_notification_sink(sink.clone());
    (mock, sink, orchestrator)
}

/// Notifications collected in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    received: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn received(&self) -> Vec<Notification> {
        self.received.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.received.lock().unwrap().push(notification);
    }
}

/// A DIDL item with an optional `dc:date`
pub fn episode(id: &str, title: &str, date: Option<&str>, uri: &str) -> String {
    let date = date
        .map(|d| format!("<dc:date>{}</dc:date>", d))
        .unwrap_or_default();
    format!(
        r#"<item id="{id}" parentID="show:123" restricted="true"><dc:title>{title}</dc:title><upnp:class>object.item.audioItem.musicTrack</upnp:class>{date}<res protocolInfo="http-get:*:audio/mpeg:*">{uri}</res></item>"#,
        id = id,
        title = title,
        date = date,
        uri = escape_xml(uri)
    )
}

/// Inner XML of a `BrowseResponse` carrying `children`
pub fn browse_result(children: &[String]) -> String {
    let didl = format!("{}{}</DIDL-Lite>", DIDL_ROOT, children.concat());
    format!(
        "<Result>{}</Result><NumberReturned>{n}</NumberReturned><TotalMatches>{n}</TotalMatches><UpdateID>1</UpdateID>",
        escape_xml(&didl),
        n = children.len()
    )
}

/// A podcast favorite with a raw id and no provider account
pub fn show_favorite(raw_id: &str) -> FavoriteRecord {
    let mut favorite = FavoriteRecord {
        item_id: "FV:2/13".to_string(),
        title: "Morning Show".to_string(),
        raw_object_id: Some(raw_id.to_string()),
        is_container: true,
        ..FavoriteRecord::default()
    };
    favorite.canonical_object_id = derive_canonical_id(&favorite);
    favorite
}

/// Metadata carrying a music service account marker
pub fn provider_meta(id: &str) -> String {
    format!(
        r#"{}<container id="{}" parentID="p" restricted="true"><dc:title>Show</dc:title><upnp:class>object.container.playlistContainer</upnp:class><desc id="cdudn" nameSpace="urn:schemas-rinconnetworks-com:metadata-1-0/">SA_RINCON65031_X_#Svc65031-0-Token</desc></container></DIDL-Lite>"#,
        DIDL_ROOT,
        escape_xml(id)
    )
}
